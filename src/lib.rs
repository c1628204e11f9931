//! Synthetic test signals and ADC quality metrics
//!
//! The pipeline is
//! [synthesis] → [quantization] → [spectral analysis] → [metric extraction],
//! yielding SNR, THD, SINAD, SFDR and ENOB of a simulated converter.
//! [`sweep`] runs that pipeline over a grid of bit depths, noise levels and
//! amplitudes.
//!
//! # Example
//!
//! ```
//! use adcmetrics::prelude::*;
//!
//! let params = ToneParams {
//!     fundamental_freq: 10e3,
//!     sample_rate: 200e3,
//!     duration: 0.01,
//!     amplitude: 0.8,
//!     harmonics: vec![Harmonic::new(0.05, 2), Harmonic::new(0.02, 3)],
//!     noise_std: 1e-4,
//! };
//! let waveform = synthesize::<f64, _>(&params, &mut GaussianNoise::seeded(1)).unwrap();
//! let quantized = Quantizer::fixed_reference(12, 1.0).unwrap().quantize(&waveform);
//! let report = extract_metrics(&quantized.spectrum(), 10e3, DEFAULT_HARMONICS);
//! assert!((report.thd_db + 23.44).abs() < 0.5);
//! ```
//!
//! [synthesis]: signal
//! [quantization]: quantizer
//! [spectral analysis]: spectrum
//! [metric extraction]: metrics

#![warn(missing_docs)]

pub mod error;
pub mod math;
pub mod metrics;
pub mod numbers;
pub mod prelude;
pub mod quantizer;
pub mod signal;
pub mod spectrum;
pub mod sweep;
pub mod waveform;
pub mod windowing;

pub use error::{Error, Result};
