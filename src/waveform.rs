//! Sampled waveform data type
//!
//! See [`Waveform`].

use crate::numbers::*;
use crate::spectrum::{self, SpectralFrame};

/// Real valued samples with a specified sample rate
///
/// Sample `n` is taken at time `n / sample_rate`. Passing the sample rate
/// along with the data allows each processing step (quantization, spectral
/// analysis) to be aware of the time grid without extra arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform<Flt = f64> {
    /// Sample rate in hertz
    pub sample_rate: f64,
    /// Sample data
    pub samples: Vec<Flt>,
}

impl<Flt> Waveform<Flt>
where
    Flt: Float,
{
    /// Wrap existing sample data
    pub fn new(sample_rate: f64, samples: Vec<Flt>) -> Self {
        Self {
            sample_rate,
            samples,
        }
    }
    /// Waveform of `len` zero samples
    pub fn zeros(sample_rate: f64, len: usize) -> Self {
        Self::new(sample_rate, vec![Flt::zero(); len])
    }
    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    /// True if there are no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
    /// Sample instants in seconds
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        let sample_rate = self.sample_rate;
        (0..self.samples.len()).map(move |n| n as f64 / sample_rate)
    }
    /// Largest absolute sample value (zero for an empty waveform)
    pub fn peak(&self) -> Flt {
        self.samples
            .iter()
            .fold(Flt::zero(), |peak, sample| peak.max(sample.abs()))
    }
    /// Apply a closure to every sample, keeping the sample rate
    pub fn map<F: FnMut(Flt) -> Flt>(&self, func: F) -> Self {
        Self::new(self.sample_rate, self.samples.iter().copied().map(func).collect())
    }
    /// Multiply every sample with `factor`
    pub fn scaled(&self, factor: Flt) -> Self {
        self.map(|sample| sample * factor)
    }
    /// Hann-windowed power spectrum of this waveform
    ///
    /// Shortcut for [`spectrum::analyze`].
    pub fn spectrum(&self) -> SpectralFrame {
        spectrum::analyze(&self.samples, self.sample_rate)
    }
}
