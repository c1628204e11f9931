//! Uniform midrise quantization
//!
//! Two policies are provided, see [`QuantizerPolicy`]. They are not
//! equivalent: the auto-scaled policy never clips but its noise floor follows
//! the peak of the input, while the fixed-reference policy saturates outside
//! `±reference_range` but has a fixed, predictable noise floor.
//!
//! Both policies round to the nearest level with ties away from zero.

use crate::error::{require_positive, Error, Result};
use crate::flt;
use crate::numbers::*;
use crate::waveform::Waveform;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest supported bit depth
pub const MAX_BITS: u32 = 32;

/// Scaling policy of a [`Quantizer`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantizerPolicy {
    /// Normalize by the record's own peak `vmax` and quantize with the scale
    /// factor `2^bits / 2 − 1`:
    /// *round(s / vmax · scale) / scale · vmax*
    #[default]
    AutoScaled,
    /// Clip to `±reference_range` and quantize with
    /// `LSB = 2 · reference_range / 2^bits`:
    /// *round(clipped / LSB) · LSB*
    FixedReference,
}

/// Bit depth and full-scale range of a converter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantizationSpec {
    /// Number of bits (`1 ..= MAX_BITS`)
    pub bits: u32,
    /// Full-scale half-range (the input range is `±reference_range`)
    pub reference_range: f64,
}

impl QuantizationSpec {
    /// Validated specification
    pub fn new(bits: u32, reference_range: f64) -> Result<Self> {
        let spec = Self {
            bits,
            reference_range,
        };
        spec.validate()?;
        Ok(spec)
    }
    /// Check the bit depth
    ///
    /// The reference range is only checked by [`Quantizer::new`] for the
    /// [`FixedReference`] policy, which is the only one reading it.
    ///
    /// [`FixedReference`]: QuantizerPolicy::FixedReference
    pub fn validate(&self) -> Result<()> {
        if self.bits < 1 {
            return Err(Error::invalid("bits", self.bits, "must be at least 1"));
        }
        if self.bits > MAX_BITS {
            return Err(Error::invalid("bits", self.bits, "exceeds supported bit depth"));
        }
        Ok(())
    }
    /// Number of representable levels, `2^bits`
    pub fn levels(&self) -> f64 {
        2f64.powi(self.bits as i32)
    }
    /// Step size of the fixed-reference policy, `2 · reference_range / 2^bits`
    pub fn lsb(&self) -> f64 {
        2.0 * self.reference_range / self.levels()
    }
}

/// Uniform midrise quantizer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantizer {
    spec: QuantizationSpec,
    policy: QuantizerPolicy,
}

impl Quantizer {
    /// Quantizer with the given specification and policy
    pub fn new(spec: QuantizationSpec, policy: QuantizerPolicy) -> Result<Self> {
        spec.validate()?;
        if policy == QuantizerPolicy::FixedReference {
            require_positive("reference_range", spec.reference_range)?;
        }
        Ok(Self { spec, policy })
    }
    /// Auto-scaled quantizer with `bits` bits
    pub fn auto_scaled(bits: u32) -> Result<Self> {
        Self::new(QuantizationSpec::new(bits, 1.0)?, QuantizerPolicy::AutoScaled)
    }
    /// Fixed-reference quantizer with `bits` bits and range
    /// `±reference_range`
    pub fn fixed_reference(bits: u32, reference_range: f64) -> Result<Self> {
        Self::new(
            QuantizationSpec::new(bits, reference_range)?,
            QuantizerPolicy::FixedReference,
        )
    }
    /// Bit depth and range
    pub fn spec(&self) -> QuantizationSpec {
        self.spec
    }
    /// Scaling policy
    pub fn policy(&self) -> QuantizerPolicy {
        self.policy
    }
    /// Quantize a waveform, keeping its sample rate
    pub fn quantize<Flt: Float>(&self, waveform: &Waveform<Flt>) -> Waveform<Flt> {
        Waveform::new(waveform.sample_rate, self.quantize_samples(&waveform.samples))
    }
    /// Quantize raw samples
    pub fn quantize_samples<Flt: Float>(&self, samples: &[Flt]) -> Vec<Flt> {
        match self.policy {
            QuantizerPolicy::AutoScaled => self.auto_scaled_samples(samples),
            QuantizerPolicy::FixedReference => self.fixed_reference_samples(samples),
        }
    }
    fn auto_scaled_samples<Flt: Float>(&self, samples: &[Flt]) -> Vec<Flt> {
        let scale = self.spec.levels() / 2.0 - 1.0;
        if scale == 0.0 {
            // one bit leaves a single level at zero
            return vec![Flt::zero(); samples.len()];
        }
        let peak = samples
            .iter()
            .fold(0.0f64, |peak, &sample| peak.max(to_f64(sample).abs()));
        let vmax = if peak > 0.0 { peak } else { 1.0 };
        samples
            .iter()
            .map(|&sample| {
                let level = (to_f64(sample) / vmax * scale).round();
                flt!(level / scale * vmax)
            })
            .collect()
    }
    fn fixed_reference_samples<Flt: Float>(&self, samples: &[Flt]) -> Vec<Flt> {
        let range = self.spec.reference_range;
        let lsb = self.spec.lsb();
        let mut clipped: usize = 0;
        let output = samples
            .iter()
            .map(|&sample| {
                let value = to_f64(sample);
                if value.abs() > range {
                    clipped += 1;
                }
                let bounded = value.clamp(-range, range);
                flt!((bounded / lsb).round() * lsb)
            })
            .collect();
        if clipped > 0 {
            debug!(
                clipped,
                total = samples.len(),
                reference_range = range,
                "fixed-reference quantizer saturated"
            );
        }
        output
    }
}

/// Quantize `waveform` with the given bit depth, range and policy
///
/// # Example
///
/// ```
/// use adcmetrics::quantizer::{quantize, QuantizerPolicy};
/// use adcmetrics::waveform::Waveform;
///
/// let waveform = Waveform::new(1000.0, vec![0.1, 0.3, -2.0]);
/// let quantized = quantize(&waveform, 2, 1.0, QuantizerPolicy::FixedReference).unwrap();
/// assert_eq!(quantized.samples, vec![0.0, 0.5, -1.0]);
/// ```
pub fn quantize<Flt: Float>(
    waveform: &Waveform<Flt>,
    bits: u32,
    reference_range: f64,
    policy: QuantizerPolicy,
) -> Result<Waveform<Flt>> {
    let quantizer = Quantizer::new(QuantizationSpec::new(bits, reference_range)?, policy)?;
    Ok(quantizer.quantize(waveform))
}

/// Per-sample quantization error, `original − quantized`
pub fn quantization_error<Flt: Float>(original: &[Flt], quantized: &[Flt]) -> Vec<Flt> {
    original
        .iter()
        .zip(quantized.iter())
        .map(|(&original, &quantized)| original - quantized)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::assert_approx;
    use proptest::prelude::*;
    #[test]
    fn test_levels_and_lsb() {
        let spec = QuantizationSpec::new(12, 1.0).unwrap();
        assert_eq!(spec.levels(), 4096.0);
        assert_approx(spec.lsb(), 2.0 / 4096.0);
        assert_approx(QuantizationSpec::new(3, 0.5).unwrap().lsb(), 0.125);
    }
    #[test]
    fn test_fixed_reference() {
        let quantizer = Quantizer::fixed_reference(2, 1.0).unwrap();
        let output = quantizer.quantize_samples(&[0.1f64, 0.26, -0.74, 1.7, -3.0, 0.25, -0.25]);
        assert_eq!(output, vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.5, -0.5]);
    }
    #[test]
    fn test_auto_scaled() {
        let quantizer = Quantizer::auto_scaled(3).unwrap();
        let output = quantizer.quantize_samples(&[0.5f64, -1.0, 0.2, 0.1]);
        assert_approx(output[0], 2.0 / 3.0);
        assert_approx(output[1], -1.0);
        assert_approx(output[2], 1.0 / 3.0);
        assert_approx(output[3], 0.0);
    }
    #[test]
    fn test_auto_scaled_follows_peak() {
        let quantizer = Quantizer::auto_scaled(4).unwrap();
        let input = Waveform::new(100.0, vec![0.3f64, -0.7, 0.04, 0.6]);
        let small = quantizer.quantize(&input);
        let large = quantizer.quantize(&input.scaled(10.0));
        for (a, b) in small.samples.iter().zip(large.samples.iter()) {
            assert_approx(a * 10.0, *b);
        }
        assert_approx(large.peak(), 7.0);
    }
    #[test]
    fn test_fixed_reference_clips() {
        let input = Waveform::new(100.0, vec![5.0f32, -5.0]);
        let output = quantize(&input, 8, 0.5, QuantizerPolicy::FixedReference).unwrap();
        assert_eq!(output.samples, vec![0.5, -0.5]);
    }
    #[test]
    fn test_zero_input() {
        let zeros = Waveform::<f64>::zeros(100.0, 8);
        for policy in [QuantizerPolicy::AutoScaled, QuantizerPolicy::FixedReference] {
            let output = quantize(&zeros, 6, 1.0, policy).unwrap();
            assert!(output.samples.iter().all(|&x| x == 0.0));
            assert_eq!(output.len(), 8);
        }
    }
    #[test]
    fn test_single_bit() {
        let input = Waveform::new(100.0, vec![0.9f64, -0.2, 0.6]);
        let auto = quantize(&input, 1, 1.0, QuantizerPolicy::AutoScaled).unwrap();
        assert_eq!(auto.samples, vec![0.0, 0.0, 0.0]);
        let fixed = quantize(&input, 1, 1.0, QuantizerPolicy::FixedReference).unwrap();
        assert_eq!(fixed.samples, vec![1.0, 0.0, 1.0]);
    }
    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            Quantizer::auto_scaled(0),
            Err(Error::InvalidParameter { name: "bits", .. })
        ));
        assert!(Quantizer::auto_scaled(MAX_BITS + 1).is_err());
        assert!(Quantizer::fixed_reference(8, 0.0).is_err());
        assert!(Quantizer::fixed_reference(8, f64::NAN).is_err());
        let waveform = Waveform::<f64>::zeros(1.0, 1);
        assert!(quantize(&waveform, 0, 1.0, QuantizerPolicy::FixedReference).is_err());
        assert!(matches!(
            quantize(&waveform, 8, -1.0, QuantizerPolicy::FixedReference),
            Err(Error::InvalidParameter { name: "reference_range", .. })
        ));
    }
    #[test]
    fn test_auto_scaled_ignores_reference_range() {
        let waveform = Waveform::new(1.0, vec![0.5f64, -1.0]);
        for reference_range in [0.0, -2.0, f64::NAN] {
            let quantized =
                quantize(&waveform, 8, reference_range, QuantizerPolicy::AutoScaled).unwrap();
            assert_eq!(quantized, Quantizer::auto_scaled(8).unwrap().quantize(&waveform));
        }
        assert!(quantize(&waveform, 0, 0.0, QuantizerPolicy::AutoScaled).is_err());
    }
    #[test]
    fn test_quantization_error() {
        let error = quantization_error(&[1.0f64, 0.5], &[0.75, 0.5]);
        assert_eq!(error, vec![0.25, 0.0]);
    }
    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Holder {
            policy: QuantizerPolicy,
        }
        let holder: Holder = toml::from_str(r#"policy = "fixed-reference""#).unwrap();
        assert_eq!(holder.policy, QuantizerPolicy::FixedReference);
    }
    proptest! {
        #[test]
        fn fixed_reference_error_within_half_lsb(
            bits in 1u32..=16,
            samples in proptest::collection::vec(-1.0f64..1.0, 1..64),
        ) {
            let quantizer = Quantizer::fixed_reference(bits, 1.0).unwrap();
            let lsb = quantizer.spec().lsb();
            let output = quantizer.quantize_samples(&samples);
            for error in quantization_error(&samples, &output) {
                prop_assert!(error.abs() <= lsb / 2.0 + 1e-12, "error {} lsb {}", error, lsb);
            }
        }
        #[test]
        fn auto_scaled_never_exceeds_peak(
            bits in 2u32..=16,
            samples in proptest::collection::vec(-10.0f64..10.0, 1..64),
        ) {
            let quantizer = Quantizer::auto_scaled(bits).unwrap();
            let peak = samples.iter().fold(0.0f64, |p, x| p.max(x.abs()));
            for value in quantizer.quantize_samples(&samples) {
                prop_assert!(value.abs() <= peak * (1.0 + 1e-12));
            }
        }
    }
}
