//! Windowed power spectrum of real valued records
//!
//! The record is multiplied with a [window] and transformed with an
//! `N`-point FFT. Only the non-negative frequency bins `0 ..= N/2` are kept,
//! since the spectrum of a real signal is Hermitian.
//!
//! Powers are the squared magnitudes of the raw transform output. They are
//! not normalized to amplitude; every metric computed from a
//! [`SpectralFrame`] is a ratio, so a shared scale factor cancels.
//!
//! [window]: crate::windowing

use crate::flt;
use crate::numbers::*;
use crate::windowing::{Hann, Window};

use rustfft::{Fft, FftPlanner};
use tracing::debug;

use std::sync::Arc;

/// Non-negative half of a power spectrum
///
/// `frequencies` is strictly increasing and has the same length as `power`.
/// All powers are non-negative.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralFrame {
    /// Bin center frequencies in hertz, `k · sample_rate / fft_len`
    pub frequencies: Vec<f64>,
    /// Squared magnitude per bin
    pub power: Vec<f64>,
    /// Sample rate of the analyzed record
    pub sample_rate: f64,
    /// Length of the transform (number of samples in the record)
    pub fft_len: usize,
}

impl SpectralFrame {
    /// Frame without any bins (result of analyzing an empty record)
    pub fn empty(sample_rate: f64) -> Self {
        Self {
            frequencies: Vec::new(),
            power: Vec::new(),
            sample_rate,
            fft_len: 0,
        }
    }
    /// Number of bins
    pub fn len(&self) -> usize {
        self.power.len()
    }
    /// True if the frame has no bins
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
    /// Frequency resolution in hertz (`0.0` for an empty frame)
    pub fn bin_width(&self) -> f64 {
        if self.fft_len == 0 {
            0.0
        } else {
            self.sample_rate / self.fft_len as f64
        }
    }
    /// Index of the bin nearest to `frequency`
    ///
    /// There is no interpolation. On an exact midpoint between two bins the
    /// lower bin wins. Returns `None` only for an empty frame.
    pub fn bin_index(&self, frequency: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &bin_frequency) in self.frequencies.iter().enumerate() {
            let distance = (bin_frequency - frequency).abs();
            match best {
                Some((_, best_distance)) if !(distance < best_distance) => (),
                _ => best = Some((idx, distance)),
            }
        }
        best.map(|(idx, _)| idx)
    }
    /// Sum of all bin powers
    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }
    /// Index of the strongest bin (first one on ties)
    pub fn peak(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &power) in self.power.iter().enumerate() {
            match best {
                Some((_, best_power)) if !(power > best_power) => (),
                _ => best = Some((idx, power)),
            }
        }
        best.map(|(idx, _)| idx)
    }
    /// Bin powers in decibels (`−∞` for empty bins)
    pub fn power_db(&self) -> Vec<f64> {
        self.power.iter().map(|&power| 10.0 * power.log10()).collect()
    }
}

/// Reusable spectral analyzer
///
/// The FFT plan and the window coefficients are kept for the last record
/// length, so analyzing many records of the same length plans only once.
pub struct SpectrumAnalyzer<Flt, W = Hann>
where
    Flt: Float,
{
    window: W,
    planner: FftPlanner<Flt>,
    previous_len: Option<usize>,
    fft: Option<Arc<dyn Fft<Flt>>>,
    window_values: Vec<Flt>,
    buffer: Vec<Complex<Flt>>,
}

impl<Flt> SpectrumAnalyzer<Flt, Hann>
where
    Flt: Float,
{
    /// Analyzer using a [`Hann`] window
    pub fn new() -> Self {
        Self::with_window(Hann)
    }
}

impl<Flt> Default for SpectrumAnalyzer<Flt, Hann>
where
    Flt: Float,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Flt, W> SpectrumAnalyzer<Flt, W>
where
    Flt: Float,
    W: Window,
{
    /// Analyzer using the given window
    pub fn with_window(window: W) -> Self {
        Self {
            window,
            planner: FftPlanner::new(),
            previous_len: None,
            fft: None,
            window_values: Vec::new(),
            buffer: Vec::new(),
        }
    }
    /// Compute the windowed power spectrum of `samples`
    pub fn analyze(&mut self, samples: &[Flt], sample_rate: f64) -> SpectralFrame {
        let n: usize = samples.len();
        if n == 0 {
            return SpectralFrame::empty(sample_rate);
        }
        if self.previous_len != Some(n) {
            debug!(fft_len = n, "planning forward FFT");
            self.fft = Some(self.planner.plan_fft_forward(n));
            self.window_values.clear();
            self.window_values.reserve_exact(n);
            for value in self.window.coefficients(n) {
                self.window_values.push(flt!(value));
            }
            self.previous_len = Some(n);
        }
        let Some(fft) = self.fft.as_ref() else {
            return SpectralFrame::empty(sample_rate);
        };
        self.buffer.clear();
        self.buffer.reserve(n);
        for (&sample, &weight) in samples.iter().zip(self.window_values.iter()) {
            self.buffer.push(Complex::new(sample * weight, Flt::zero()));
        }
        fft.process(&mut self.buffer);
        let bins = n / 2 + 1;
        let mut frequencies = Vec::with_capacity(bins);
        let mut power = Vec::with_capacity(bins);
        for (k, value) in self.buffer[..bins].iter().enumerate() {
            frequencies.push(k as f64 * sample_rate / n as f64);
            let re = to_f64(value.re);
            let im = to_f64(value.im);
            power.push(re * re + im * im);
        }
        SpectralFrame {
            frequencies,
            power,
            sample_rate,
            fft_len: n,
        }
    }
}

/// Hann-windowed power spectrum of `samples`
///
/// # Example
///
/// ```
/// use adcmetrics::spectrum::analyze;
///
/// let frame = analyze(&[1.0, 1.0, 1.0, 1.0], 8000.0);
/// assert_eq!(frame.frequencies, vec![0.0, 2000.0, 4000.0]);
/// assert_eq!(frame.peak(), Some(0));
/// ```
pub fn analyze<Flt: Float>(samples: &[Flt], sample_rate: f64) -> SpectralFrame {
    SpectrumAnalyzer::<Flt>::new().analyze(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::assert_approx;
    use crate::windowing::Rectangular;
    #[test]
    fn test_constant_record_hann() {
        let frame = analyze(&[1.0f64, 1.0, 1.0, 1.0], 48000.0);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.fft_len, 4);
        assert_approx(frame.frequencies[1], 12000.0);
        assert_approx(frame.frequencies[2], 24000.0);
        assert_approx(frame.power[0], 2.25);
        assert_approx(frame.power[1], 1.125);
        assert_approx(frame.power[2], 0.0);
    }
    #[test]
    fn test_constant_record_rectangular() {
        let mut analyzer = SpectrumAnalyzer::<f32, _>::with_window(Rectangular);
        let frame = analyzer.analyze(&[1.0, 1.0, 1.0], 48000.0);
        assert_eq!(frame.len(), 2);
        assert_approx(frame.power[0], 9.0);
        assert_approx(frame.power[1], 0.0);
    }
    #[test]
    fn test_odd_length_bins() {
        let frame = analyze(&[0.0f64; 5], 10.0);
        assert_eq!(frame.frequencies, vec![0.0, 2.0, 4.0]);
        assert_eq!(frame.total_power(), 0.0);
    }
    #[test]
    fn test_empty_record() {
        let frame = analyze::<f64>(&[], 10.0);
        assert!(frame.is_empty());
        assert_eq!(frame.bin_index(1.0), None);
        assert_eq!(frame.peak(), None);
        assert_eq!(frame.bin_width(), 0.0);
    }
    #[test]
    fn test_sine_peak() {
        let samples: Vec<f64> = (0..1000)
            .map(|n| (2.0 * std::f64::consts::PI * 100.0 * n as f64 / 1000.0).sin())
            .collect();
        let frame = analyze(&samples, 1000.0);
        assert_eq!(frame.len(), 501);
        assert_approx(frame.bin_width(), 1.0);
        assert_eq!(frame.peak(), Some(100));
    }
    #[test]
    fn test_bin_index_nearest_and_ties() {
        let frame = analyze(&[0.0f64; 1000], 1000.0);
        assert_eq!(frame.bin_index(100.0), Some(100));
        assert_eq!(frame.bin_index(100.4), Some(100));
        assert_eq!(frame.bin_index(100.6), Some(101));
        assert_eq!(frame.bin_index(100.5), Some(100));
        assert_eq!(frame.bin_index(-20.0), Some(0));
        assert_eq!(frame.bin_index(1e9), Some(500));
    }
    #[test]
    fn test_analyzer_reuse_across_lengths() {
        let mut analyzer = SpectrumAnalyzer::<f64>::new();
        let first = analyzer.analyze(&[1.0; 4], 4.0);
        let second = analyzer.analyze(&[1.0; 8], 4.0);
        let third = analyzer.analyze(&[1.0; 4], 4.0);
        assert_eq!(first, third);
        assert_eq!(second.len(), 5);
    }
    #[test]
    fn test_power_db() {
        let frame = SpectralFrame {
            frequencies: vec![0.0, 1.0],
            power: vec![100.0, 0.0],
            sample_rate: 2.0,
            fft_len: 2,
        };
        let db = frame.power_db();
        assert_approx(db[0], 20.0);
        assert_eq!(db[1], f64::NEG_INFINITY);
    }
}
