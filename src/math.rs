//! Decibel arithmetic used by the metric computations

/// Ratio of two powers in decibels, *10·log10(numerator / denominator)*
///
/// Degenerate cases never produce NaN:
///
/// * a denominator `<= 0` yields `+∞` (nothing to compare against),
/// * a zero numerator over a positive denominator yields `−∞`.
///
/// # Example
///
/// ```
/// use adcmetrics::math::power_ratio_db;
///
/// assert!((power_ratio_db(100.0, 1.0) - 20.0).abs() < 1e-12);
/// assert_eq!(power_ratio_db(1.0, 0.0), f64::INFINITY);
/// assert_eq!(power_ratio_db(0.0, 1.0), f64::NEG_INFINITY);
/// ```
pub fn power_ratio_db(numerator: f64, denominator: f64) -> f64 {
    if !(denominator > 0.0) {
        f64::INFINITY
    } else {
        10.0 * (numerator / denominator).log10()
    }
}

/// Effective number of bits for a given SINAD, *(SINAD − 1.76) / 6.02*
///
/// A SINAD of `−∞` maps to `0.0`; `+∞` maps to `+∞`.
pub fn enob_from_sinad(sinad_db: f64) -> f64 {
    if sinad_db == f64::NEG_INFINITY {
        0.0
    } else {
        (sinad_db - 1.76) / 6.02
    }
}

/// Theoretical SNR ceiling of an ideal `bits`-bit converter driven by a
/// full-scale sine, *6.02·bits + 1.76*
pub fn ideal_snr_db(bits: u32) -> f64 {
    6.02 * bits as f64 + 1.76
}
