//! ADC quality metrics (SNR, THD, SINAD, SFDR, ENOB)
//!
//! All metrics are computed from a [`SpectralFrame`] and the nominal
//! fundamental frequency. They are pure functions of their inputs and never
//! fail; degenerate spectra yield `±∞` (or `0.0` for ENOB), see
//! [`power_ratio_db`].
//!
//! Power aggregation differs between metrics:
//!
//! * the signal power used by SNR, SINAD and SFDR sums the fundamental bin
//!   and its two neighbors (the main lobe of the Hann window),
//! * THD compares single harmonic bins against the single fundamental bin,
//! * the noise power is everything outside the fundamental's three bins and
//!   therefore still contains the harmonic power which SINAD adds again.

use crate::math::{enob_from_sinad, power_ratio_db};
use crate::numbers::*;
use crate::spectrum::SpectralFrame;

use serde::Serialize;

/// Number of harmonics examined by default (orders `2 ..= 5`)
pub const DEFAULT_HARMONICS: u32 = 5;

/// Metrics of one analyzed record
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MetricReport {
    /// Signal-to-noise ratio in dB
    pub snr_db: f64,
    /// Total harmonic distortion in dB (relative to the fundamental)
    pub thd_db: f64,
    /// Signal-to-noise-and-distortion ratio in dB
    pub sinad_db: f64,
    /// Spurious-free dynamic range in dB
    pub sfdr_db: f64,
    /// Effective number of bits
    pub enob_bits: f64,
}

/// [`MetricReport`] with non-finite values replaced by `None` and the rest
/// rounded to three decimals
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FiniteMetrics {
    /// SNR in dB, if finite
    pub snr_db: Option<f64>,
    /// THD in dB, if finite
    pub thd_db: Option<f64>,
    /// SINAD in dB, if finite
    pub sinad_db: Option<f64>,
    /// SFDR in dB, if finite
    pub sfdr_db: Option<f64>,
    /// ENOB, if finite
    pub enob_bits: Option<f64>,
}

fn finite_rounded(value: f64) -> Option<f64> {
    value.is_finite().then(|| (value * 1000.0).round() / 1000.0)
}

impl MetricReport {
    /// Table view of the report
    pub fn finite(&self) -> FiniteMetrics {
        FiniteMetrics {
            snr_db: finite_rounded(self.snr_db),
            thd_db: finite_rounded(self.thd_db),
            sinad_db: finite_rounded(self.sinad_db),
            sfdr_db: finite_rounded(self.sfdr_db),
            enob_bits: finite_rounded(self.enob_bits),
        }
    }
}

/// Harmonic examined by [`measure_powers`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HarmonicBin {
    /// Multiple of the fundamental frequency
    pub order: u32,
    /// Nominal frequency in hertz
    pub frequency: f64,
    /// Nearest bin
    pub bin: usize,
    /// Power of that single bin
    pub power: f64,
}

/// Intermediate powers from which the metrics are derived
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PowerBreakdown {
    /// Bin nearest to the fundamental (`None` for an empty frame)
    pub fundamental_bin: Option<usize>,
    /// Power of the fundamental bin and its direct neighbors
    pub signal_power: f64,
    /// Power of the single fundamental bin
    pub fundamental_power: f64,
    /// Power of all bins
    pub total_power: f64,
    /// `total_power − signal_power`
    pub noise_power: f64,
    /// Harmonics which fit into the frame
    pub harmonics: Vec<HarmonicBin>,
    /// Sum of the harmonic bin powers
    pub harmonic_power: f64,
    /// Strongest bin outside the fundamental's three bins
    pub max_spurious_power: f64,
}

/// Locate fundamental and harmonics and sum up their powers
///
/// Harmonics of order `2 ..= n_harmonics` are examined. A harmonic is skipped
/// when its frequency lies more than half a bin above the highest bin, i.e.
/// when it would not fall into the frame. The search stops at the first such
/// harmonic.
pub fn measure_powers(
    frame: &SpectralFrame,
    fundamental_freq: f64,
    n_harmonics: u32,
) -> PowerBreakdown {
    let power = &frame.power;
    let total_power: f64 = frame.total_power();
    let Some(fund_idx) = frame.bin_index(fundamental_freq) else {
        return PowerBreakdown {
            fundamental_bin: None,
            signal_power: 0.0,
            fundamental_power: 0.0,
            total_power,
            noise_power: 0.0,
            harmonics: Vec::new(),
            harmonic_power: 0.0,
            max_spurious_power: 0.0,
        };
    };
    let lo = fund_idx.saturating_sub(1);
    let hi = (fund_idx + 1).min(power.len() - 1);
    let signal_power: f64 = power[lo..=hi].iter().sum();
    let upper_limit = frame.frequencies[frame.len() - 1] + frame.bin_width() / 2.0;
    let mut harmonics = Vec::new();
    for order in 2..=n_harmonics {
        let frequency = fundamental_freq * order as f64;
        if frequency > upper_limit {
            // higher orders lie even further above the frame
            break;
        }
        let Some(bin) = frame.bin_index(frequency) else {
            continue;
        };
        harmonics.push(HarmonicBin {
            order,
            frequency,
            bin,
            power: power[bin],
        });
    }
    let harmonic_power: f64 = harmonics.iter().map(|harmonic| harmonic.power).sum();
    let max_spurious_power = power
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx < lo || idx > hi)
        .fold(0.0f64, |max, (_, &value)| max.max(value));
    PowerBreakdown {
        fundamental_bin: Some(fund_idx),
        signal_power,
        fundamental_power: power[fund_idx],
        total_power,
        noise_power: total_power - signal_power,
        harmonics,
        harmonic_power,
        max_spurious_power,
    }
}

impl PowerBreakdown {
    /// Derive the metrics
    pub fn report(&self) -> MetricReport {
        let snr_db = power_ratio_db(self.signal_power, self.noise_power);
        let thd_db = power_ratio_db(self.harmonic_power, self.fundamental_power);
        let sinad_db = power_ratio_db(self.signal_power, self.noise_power + self.harmonic_power);
        let sfdr_db = power_ratio_db(self.signal_power, self.max_spurious_power);
        MetricReport {
            snr_db,
            thd_db,
            sinad_db,
            sfdr_db,
            enob_bits: enob_from_sinad(sinad_db),
        }
    }
}

/// Compute SNR, THD, SINAD, SFDR and ENOB of an analyzed record
///
/// # Example
///
/// ```
/// use adcmetrics::metrics::{extract_metrics, DEFAULT_HARMONICS};
/// use adcmetrics::spectrum::SpectralFrame;
///
/// let frame = SpectralFrame {
///     frequencies: vec![0.0, 1.0, 2.0, 3.0, 4.0],
///     power: vec![0.0, 1.0, 4.0, 1.0, 0.0],
///     sample_rate: 8.0,
///     fft_len: 8,
/// };
/// let report = extract_metrics(&frame, 2.0, DEFAULT_HARMONICS);
/// assert_eq!(report.snr_db, f64::INFINITY);
/// ```
pub fn extract_metrics(
    frame: &SpectralFrame,
    fundamental_freq: f64,
    n_harmonics: u32,
) -> MetricReport {
    measure_powers(frame, fundamental_freq, n_harmonics).report()
}

/// SNR in dB measured in the time domain as mean power of `original` over
/// mean power of `original − quantized`
///
/// Returns `+∞` if both records are identical.
pub fn time_domain_snr_db<Flt: Float>(original: &[Flt], quantized: &[Flt]) -> f64 {
    let n = original.len().min(quantized.len());
    if n == 0 {
        return f64::INFINITY;
    }
    let mut signal_power: f64 = 0.0;
    let mut error_power: f64 = 0.0;
    for (&original, &quantized) in original.iter().zip(quantized.iter()) {
        let value = to_f64(original);
        let error = value - to_f64(quantized);
        signal_power += value * value;
        error_power += error * error;
    }
    power_ratio_db(signal_power / n as f64, error_power / n as f64)
}
