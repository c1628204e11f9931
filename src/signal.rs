//! Synthetic test signals
//!
//! [`synthesize`] produces a sine with optional harmonics and additive
//! Gaussian noise, [`periodic`] produces the standard periodic shapes. Both
//! sample the half-open interval `[0, duration)` at `t_n = n / sample_rate`
//! for `n = 0 .. floor(sample_rate · duration)`.
//!
//! Entropy for the noise term comes from a caller supplied [`NoiseSource`],
//! so that tests can use a fixed seed or a fixed sequence.

use crate::error::{require_non_negative, require_positive, Error, Result};
use crate::flt;
use crate::numbers::*;
use crate::waveform::Waveform;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use std::f64::consts::PI;

/// Upper limit for the number of samples in a synthesized record
pub const MAX_SAMPLES: usize = 1 << 28;

/// Source of standard normal draws used for additive noise
pub trait NoiseSource {
    /// Draw one value from the normal distribution with mean `0` and standard
    /// deviation `1`
    fn standard_normal(&mut self) -> f64;
}

impl<N: NoiseSource + ?Sized> NoiseSource for &mut N {
    fn standard_normal(&mut self) -> f64 {
        (**self).standard_normal()
    }
}

/// Gaussian noise drawn from a random number generator
#[derive(Clone, Debug)]
pub struct GaussianNoise<R> {
    rng: R,
}

impl<R: Rng> GaussianNoise<R> {
    /// Draw noise from `rng`
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl GaussianNoise<ChaCha8Rng> {
    /// Deterministic noise stream for the given seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseSource for GaussianNoise<R> {
    fn standard_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }
}

/// Stub noise source cycling through a fixed list of values
///
/// An empty list behaves like [`Silence`].
#[derive(Clone, Debug, Default)]
pub struct FixedSequence {
    values: Vec<f64>,
    position: usize,
}

impl FixedSequence {
    /// Cycle through `values`
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
    /// Number of values drawn so far
    pub fn drawn(&self) -> usize {
        self.position
    }
}

impl NoiseSource for FixedSequence {
    fn standard_normal(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}

/// Noise source which always yields zero
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl NoiseSource for Silence {
    fn standard_normal(&mut self) -> f64 {
        0.0
    }
}

/// Harmonic tone added on top of the fundamental
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Harmonic {
    /// Amplitude of the harmonic tone (not scaled by the fundamental's
    /// amplitude)
    pub relative_amplitude: f64,
    /// Integer multiple of the fundamental frequency (at least `2`)
    pub multiple: u32,
}

impl Harmonic {
    /// Harmonic of order `multiple` with the given amplitude
    pub fn new(relative_amplitude: f64, multiple: u32) -> Self {
        Self {
            relative_amplitude,
            multiple,
        }
    }
}

impl From<(f64, u32)> for Harmonic {
    fn from((relative_amplitude, multiple): (f64, u32)) -> Self {
        Self::new(relative_amplitude, multiple)
    }
}

/// Parameters of a sine test tone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneParams {
    /// Fundamental frequency in hertz
    pub fundamental_freq: f64,
    /// Sample rate in hertz
    pub sample_rate: f64,
    /// Record length in seconds
    pub duration: f64,
    /// Amplitude of the fundamental
    pub amplitude: f64,
    /// Additional harmonic tones
    pub harmonics: Vec<Harmonic>,
    /// Standard deviation of the additive Gaussian noise
    pub noise_std: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            fundamental_freq: 1e3,
            sample_rate: 100e3,
            duration: 0.01,
            amplitude: 1.0,
            harmonics: Vec::new(),
            noise_std: 0.0,
        }
    }
}

impl ToneParams {
    /// Reject parameters which would give an empty or ill-defined record
    pub fn validate(&self) -> Result<()> {
        require_positive("fundamental_freq", self.fundamental_freq)?;
        require_non_negative("noise_std", self.noise_std)?;
        if !self.amplitude.is_finite() {
            return Err(Error::invalid("amplitude", self.amplitude, "must be finite"));
        }
        for harmonic in self.harmonics.iter() {
            if harmonic.multiple < 2 {
                return Err(Error::invalid(
                    "harmonic multiple",
                    harmonic.multiple,
                    "must be at least 2",
                ));
            }
            if !harmonic.relative_amplitude.is_finite() {
                return Err(Error::invalid(
                    "harmonic amplitude",
                    harmonic.relative_amplitude,
                    "must be finite",
                ));
            }
        }
        sample_count(self.sample_rate, self.duration)?;
        Ok(())
    }
}

/// Number of samples in `[0, duration)` at the given rate
pub fn sample_count(sample_rate: f64, duration: f64) -> Result<usize> {
    require_positive("sample_rate", sample_rate)?;
    require_positive("duration", duration)?;
    let count = (sample_rate * duration).floor();
    if count < 1.0 {
        return Err(Error::invalid(
            "duration",
            duration,
            "record must contain at least one sample",
        ));
    }
    if count > MAX_SAMPLES as f64 {
        return Err(Error::invalid("duration", duration, "record is too long"));
    }
    Ok(count as usize)
}

/// Synthesize a sine with harmonics and additive Gaussian noise
///
/// Sample `n` is
/// *amplitude·sin(2π·f0·t_n) + Σ h.amp·sin(2π·f0·h.mult·t_n) + noise_std·z_n*,
/// where `z_n` is drawn from `noise`. No entropy is consumed if
/// `noise_std` is zero.
///
/// # Example
///
/// ```
/// use adcmetrics::signal::{synthesize, GaussianNoise, ToneParams};
///
/// let params = ToneParams {
///     fundamental_freq: 10e3,
///     sample_rate: 200e3,
///     noise_std: 1e-4,
///     ..Default::default()
/// };
/// let waveform = synthesize::<f64, _>(&params, &mut GaussianNoise::seeded(7)).unwrap();
/// assert_eq!(waveform.len(), 2000);
/// ```
pub fn synthesize<Flt, N>(params: &ToneParams, noise: &mut N) -> Result<Waveform<Flt>>
where
    Flt: Float,
    N: NoiseSource + ?Sized,
{
    params.validate()?;
    let n_samples = sample_count(params.sample_rate, params.duration)?;
    let omega = 2.0 * PI * params.fundamental_freq;
    let mut samples = Vec::with_capacity(n_samples);
    for n in 0..n_samples {
        let t = n as f64 / params.sample_rate;
        let mut value = params.amplitude * (omega * t).sin();
        for harmonic in params.harmonics.iter() {
            value += harmonic.relative_amplitude * (omega * harmonic.multiple as f64 * t).sin();
        }
        if params.noise_std > 0.0 {
            value += params.noise_std * noise.standard_normal();
        }
        samples.push(flt!(value));
    }
    Ok(Waveform::new(params.sample_rate, samples))
}

/// Synthesize a test tone from individual arguments
///
/// See [`synthesize`].
pub fn synthesize_tone<Flt, N>(
    fundamental_freq: f64,
    sample_rate: f64,
    duration: f64,
    amplitude: f64,
    harmonics: &[Harmonic],
    noise_std: f64,
    noise: &mut N,
) -> Result<Waveform<Flt>>
where
    Flt: Float,
    N: NoiseSource + ?Sized,
{
    let params = ToneParams {
        fundamental_freq,
        sample_rate,
        duration,
        amplitude,
        harmonics: harmonics.to_vec(),
        noise_std,
    };
    synthesize(&params, noise)
}

/// Shape of a periodic waveform
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveShape {
    /// Sine
    Sine,
    /// `+1` for the first half of each period, `−1` for the second half
    Square,
    /// Symmetric ramp from `−1` up to `+1` and back
    Triangle,
    /// Rising ramp from `−1` to `+1`, then jump back
    Sawtooth,
}

impl WaveShape {
    /// Value in `[−1, 1]` at the given `phase` (in cycles, `0 <= phase < 1`)
    pub fn value_at(self, phase: f64) -> f64 {
        match self {
            WaveShape::Sine => (2.0 * PI * phase).sin(),
            WaveShape::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveShape::Triangle => ramp(phase, 0.5),
            WaveShape::Sawtooth => ramp(phase, 1.0),
        }
    }
}

/// Piecewise-linear ramp rising over the first `width` of a period and
/// falling over the rest
fn ramp(phase: f64, width: f64) -> f64 {
    if phase < width {
        -1.0 + 2.0 * phase / width
    } else {
        1.0 - 2.0 * (phase - width) / (1.0 - width)
    }
}

/// Synthesize a periodic waveform with period `1 / fundamental_freq`
pub fn periodic<Flt: Float>(
    shape: WaveShape,
    fundamental_freq: f64,
    sample_rate: f64,
    duration: f64,
    amplitude: f64,
) -> Result<Waveform<Flt>> {
    require_positive("fundamental_freq", fundamental_freq)?;
    let n_samples = sample_count(sample_rate, duration)?;
    let samples = (0..n_samples)
        .map(|n| {
            let phase = (fundamental_freq * n as f64 / sample_rate).rem_euclid(1.0);
            flt!(amplitude * shape.value_at(phase))
        })
        .collect();
    Ok(Waveform::new(sample_rate, samples))
}
