//! Parameter sweeps over bit depth × noise level × amplitude
//!
//! A [`SweepGrid`] describes the Cartesian product of those three axes and
//! hands out its points lazily. [`run_sweep`] runs the whole pipeline
//! (synthesis, quantization, spectral analysis, metric extraction) for every
//! point. Points are independent of each other and are processed in
//! parallel; results are returned in grid order.
//!
//! Every point draws its noise from its own ChaCha8 stream seeded with
//! `seed + index`, so results do not depend on the number of threads.

use crate::error::{Error, Result};
use crate::metrics::{extract_metrics, FiniteMetrics, MetricReport, DEFAULT_HARMONICS};
use crate::quantizer::{QuantizationSpec, Quantizer, QuantizerPolicy};
use crate::signal::{synthesize, GaussianNoise, Harmonic, ToneParams};
use crate::spectrum::SpectrumAnalyzer;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Axes of a parameter sweep
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepGrid {
    /// Converter bit depths
    pub bit_depths: Vec<u32>,
    /// Standard deviations of the additive noise
    pub noise_stds: Vec<f64>,
    /// Amplitudes of the fundamental
    pub amplitudes: Vec<f64>,
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            bit_depths: vec![8, 10, 12],
            noise_stds: vec![0.0001, 0.001, 0.005, 0.01],
            amplitudes: vec![0.8, 0.5],
        }
    }
}

/// One combination of sweep parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Bit depth
    pub bits: u32,
    /// Noise standard deviation
    pub noise_std: f64,
    /// Amplitude of the fundamental
    pub amplitude: f64,
}

impl SweepGrid {
    /// Number of points
    pub fn len(&self) -> usize {
        self.bit_depths.len() * self.noise_stds.len() * self.amplitudes.len()
    }
    /// True if any axis is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Point at position `index` in iteration order
    pub fn point(&self, index: usize) -> Option<SweepPoint> {
        if index >= self.len() {
            return None;
        }
        let per_bits = self.noise_stds.len() * self.amplitudes.len();
        let rest = index % per_bits;
        Some(SweepPoint {
            bits: self.bit_depths[index / per_bits],
            noise_std: self.noise_stds[rest / self.amplitudes.len()],
            amplitude: self.amplitudes[rest % self.amplitudes.len()],
        })
    }
    /// Iterate over all points, amplitude varying fastest and bit depth
    /// slowest
    ///
    /// # Example
    ///
    /// ```
    /// use adcmetrics::sweep::SweepGrid;
    ///
    /// let grid = SweepGrid {
    ///     bit_depths: vec![8, 12],
    ///     noise_stds: vec![0.001],
    ///     amplitudes: vec![0.8, 0.5],
    /// };
    /// let bits: Vec<u32> = grid.points().map(|point| point.bits).collect();
    /// assert_eq!(bits, vec![8, 8, 12, 12]);
    /// ```
    pub fn points(&self) -> SweepPoints<'_> {
        SweepPoints {
            grid: self,
            index: 0,
        }
    }
}

/// Iterator returned by [`SweepGrid::points`]
#[derive(Clone, Debug)]
pub struct SweepPoints<'a> {
    grid: &'a SweepGrid,
    index: usize,
}

impl<'a> Iterator for SweepPoints<'a> {
    type Item = SweepPoint;
    fn next(&mut self) -> Option<SweepPoint> {
        let point = self.grid.point(self.index)?;
        self.index += 1;
        Some(point)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for SweepPoints<'a> {}

/// Configuration of a sweep
///
/// Missing fields take their default, so a configuration file only needs to
/// list what differs:
///
/// ```
/// use adcmetrics::sweep::SweepConfig;
///
/// let config = SweepConfig::from_toml_str(r#"
///     policy = "fixed-reference"
///     [grid]
///     bit_depths = [12]
/// "#).unwrap();
/// assert_eq!(config.grid.bit_depths, vec![12]);
/// assert_eq!(config.grid.amplitudes, vec![0.8, 0.5]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Fundamental frequency in hertz
    pub fundamental_freq: f64,
    /// Sample rate in hertz
    pub sample_rate: f64,
    /// Record length in seconds
    pub duration: f64,
    /// Harmonic tones added to every record
    pub harmonics: Vec<Harmonic>,
    /// Quantizer policy
    pub policy: QuantizerPolicy,
    /// Full-scale half-range of the quantizer
    pub reference_range: f64,
    /// Number of harmonics examined by the metric extraction
    pub n_harmonics: u32,
    /// Base seed of the noise streams
    pub seed: u64,
    /// Sweep axes
    pub grid: SweepGrid,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            fundamental_freq: 10e3,
            sample_rate: 200e3,
            duration: 0.01,
            harmonics: vec![Harmonic::new(0.05, 2), Harmonic::new(0.02, 3)],
            policy: QuantizerPolicy::AutoScaled,
            reference_range: 1.0,
            n_harmonics: DEFAULT_HARMONICS,
            seed: 0,
            grid: SweepGrid::default(),
        }
    }
}

impl SweepConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SweepConfig = toml::from_str(text).map_err(Error::Config)?;
        config.validate()?;
        Ok(config)
    }
    /// Tone parameters of a sweep point
    pub fn tone(&self, point: &SweepPoint) -> ToneParams {
        ToneParams {
            fundamental_freq: self.fundamental_freq,
            sample_rate: self.sample_rate,
            duration: self.duration,
            amplitude: point.amplitude,
            harmonics: self.harmonics.clone(),
            noise_std: point.noise_std,
        }
    }
    /// Quantizer of a sweep point
    pub fn quantizer(&self, point: &SweepPoint) -> Result<Quantizer> {
        Quantizer::new(
            QuantizationSpec::new(point.bits, self.reference_range)?,
            self.policy,
        )
    }
    /// Check every axis value before anything is computed
    pub fn validate(&self) -> Result<()> {
        for &bits in self.grid.bit_depths.iter() {
            self.quantizer(&SweepPoint {
                bits,
                noise_std: 0.0,
                amplitude: 1.0,
            })?;
        }
        for &noise_std in self.grid.noise_stds.iter() {
            for &amplitude in self.grid.amplitudes.iter() {
                self.tone(&SweepPoint {
                    bits: 1,
                    noise_std,
                    amplitude,
                })
                .validate()?;
            }
        }
        Ok(())
    }
}

/// Result of one sweep point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepRecord {
    /// Parameters
    pub point: SweepPoint,
    /// Measured metrics
    pub report: MetricReport,
}

/// Tabular view of a [`SweepRecord`]
///
/// Non-finite metrics are `None`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepRow {
    /// Bit depth
    pub bits: u32,
    /// Noise standard deviation
    pub noise_std: f64,
    /// Amplitude
    pub amp: f64,
    /// SNR in dB
    pub snr_db: Option<f64>,
    /// THD in dB
    pub thd_db: Option<f64>,
    /// SINAD in dB
    pub sinad_db: Option<f64>,
    /// Effective number of bits
    pub enob: Option<f64>,
}

impl SweepRecord {
    /// Row of the result table
    pub fn row(&self) -> SweepRow {
        let FiniteMetrics {
            snr_db,
            thd_db,
            sinad_db,
            enob_bits,
            ..
        } = self.report.finite();
        SweepRow {
            bits: self.point.bits,
            noise_std: self.point.noise_std,
            amp: self.point.amplitude,
            snr_db,
            thd_db,
            sinad_db,
            enob: enob_bits,
        }
    }
}

/// Run the pipeline for the point at position `index` of the grid
pub fn run_point(
    config: &SweepConfig,
    analyzer: &mut SpectrumAnalyzer<f64>,
    index: usize,
    point: SweepPoint,
) -> Result<SweepRecord> {
    let mut noise = GaussianNoise::seeded(config.seed.wrapping_add(index as u64));
    let waveform = synthesize::<f64, _>(&config.tone(&point), &mut noise)?;
    let quantized = config.quantizer(&point)?.quantize(&waveform);
    let frame = analyzer.analyze(&quantized.samples, quantized.sample_rate);
    let report = extract_metrics(&frame, config.fundamental_freq, config.n_harmonics);
    trace!(
        index,
        bits = point.bits,
        noise_std = point.noise_std,
        amplitude = point.amplitude,
        snr_db = report.snr_db,
        "sweep point done"
    );
    Ok(SweepRecord { point, report })
}

/// Run all points of the sweep
///
/// The configuration is validated once up front. Records are returned in the
/// order of [`SweepGrid::points`].
pub fn run_sweep(config: &SweepConfig) -> Result<Vec<SweepRecord>> {
    config.validate()?;
    let points: Vec<SweepPoint> = config.grid.points().collect();
    debug!(points = points.len(), policy = ?config.policy, "running sweep");
    points
        .into_par_iter()
        .enumerate()
        .map_init(SpectrumAnalyzer::<f64>::new, |analyzer, (index, point)| {
            run_point(config, analyzer, index, point)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    fn small_config() -> SweepConfig {
        SweepConfig {
            fundamental_freq: 1000.0,
            sample_rate: 16000.0,
            duration: 0.016,
            grid: SweepGrid {
                bit_depths: vec![6, 10],
                noise_stds: vec![0.0, 0.01],
                amplitudes: vec![0.9, 0.4],
            },
            seed: 42,
            ..Default::default()
        }
    }
    #[test]
    fn test_default_grid() {
        let grid = SweepGrid::default();
        assert_eq!(grid.len(), 24);
        let points: Vec<SweepPoint> = grid.points().collect();
        assert_eq!(points.len(), 24);
        assert_eq!(
            points[0],
            SweepPoint {
                bits: 8,
                noise_std: 0.0001,
                amplitude: 0.8
            }
        );
        assert_eq!(points[1].amplitude, 0.5);
        assert_eq!(points[2].noise_std, 0.001);
        assert_eq!(points[8].bits, 10);
        assert_eq!(points[23].bits, 12);
        assert_eq!(points[23].noise_std, 0.01);
        assert_eq!(points[23].amplitude, 0.5);
    }
    #[test]
    fn test_points_restartable() {
        let grid = SweepGrid::default();
        let mut points = grid.points();
        assert_eq!(points.len(), 24);
        points.next();
        assert_eq!(points.len(), 23);
        let first: Vec<SweepPoint> = grid.points().collect();
        let second: Vec<SweepPoint> = grid.points().collect();
        assert_eq!(first, second);
        assert_eq!(grid.point(24), None);
    }
    #[test]
    fn test_empty_axis() {
        let grid = SweepGrid {
            noise_stds: vec![],
            ..Default::default()
        };
        assert!(grid.is_empty());
        assert_eq!(grid.points().count(), 0);
        assert_eq!(grid.point(0), None);
    }
    #[test]
    fn test_run_sweep_order_and_determinism() {
        let config = small_config();
        let records = run_sweep(&config).unwrap();
        assert_eq!(records.len(), 8);
        for (record, point) in records.iter().zip(config.grid.points()) {
            assert_eq!(record.point, point);
        }
        assert_eq!(records, run_sweep(&config).unwrap());
        let mut analyzer = SpectrumAnalyzer::new();
        for (index, point) in config.grid.points().enumerate() {
            let record = run_point(&config, &mut analyzer, index, point).unwrap();
            assert_eq!(record, records[index]);
        }
    }
    #[test]
    fn test_rejects_invalid_axis_values() {
        let mut config = small_config();
        config.grid.bit_depths.push(0);
        assert!(matches!(
            run_sweep(&config),
            Err(Error::InvalidParameter { name: "bits", .. })
        ));
        let mut config = small_config();
        config.grid.noise_stds.push(-1.0);
        assert!(run_sweep(&config).is_err());
    }
    #[test]
    fn test_reference_range_only_checked_for_fixed_reference() {
        let mut config = small_config();
        config.policy = QuantizerPolicy::AutoScaled;
        config.reference_range = 0.0;
        assert_eq!(run_sweep(&config).unwrap().len(), config.grid.len());
        config.policy = QuantizerPolicy::FixedReference;
        assert!(matches!(
            run_sweep(&config),
            Err(Error::InvalidParameter { name: "reference_range", .. })
        ));
    }
    #[test]
    fn test_from_toml_str() {
        let config = SweepConfig::from_toml_str(
            r#"
            fundamental_freq = 1000.0
            sample_rate = 48000.0
            harmonics = [{ relative_amplitude = 0.1, multiple = 2 }]
            seed = 9
            "#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.harmonics, vec![Harmonic::new(0.1, 2)]);
        assert_eq!(config.duration, 0.01);
        assert_eq!(config.grid, SweepGrid::default());
        assert!(matches!(
            SweepConfig::from_toml_str("seed = \"zero\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            SweepConfig::from_toml_str("sample_rate = 0.0"),
            Err(Error::InvalidParameter { name: "sample_rate", .. })
        ));
    }
    #[test]
    fn test_row_hides_non_finite() {
        let record = SweepRecord {
            point: SweepPoint {
                bits: 8,
                noise_std: 0.001,
                amplitude: 0.8,
            },
            report: MetricReport {
                snr_db: f64::INFINITY,
                thd_db: -40.12345,
                sinad_db: 30.0,
                sfdr_db: 50.0,
                enob_bits: 4.69,
            },
        };
        let row = record.row();
        assert_eq!(row.bits, 8);
        assert_eq!(row.amp, 0.8);
        assert_eq!(row.snr_db, None);
        assert_eq!(row.thd_db, Some(-40.123));
        assert_eq!(row.sinad_db, Some(30.0));
        assert_eq!(row.enob, Some(4.69));
    }
}
