//! Re-export of certain important items

pub use super::error::{Error, Result};
pub use super::metrics::{extract_metrics, MetricReport, DEFAULT_HARMONICS};
pub use super::numbers::{Complex, Float};
pub use super::quantizer::{quantize, QuantizationSpec, Quantizer, QuantizerPolicy};
pub use super::signal::{
    periodic, synthesize, FixedSequence, GaussianNoise, Harmonic, NoiseSource, Silence,
    ToneParams, WaveShape,
};
pub use super::spectrum::{analyze, SpectralFrame, SpectrumAnalyzer};
pub use super::sweep::{run_sweep, SweepConfig, SweepGrid};
pub use super::waveform::Waveform;
pub use super::windowing::{Blackman, Hamming, Hann, Rectangular, Window as _};
