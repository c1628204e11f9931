//! Window functions

use std::f64::consts::PI;

/// Window function
pub trait Window {
    /// Get value at position `x` (where `x` ranges from `-1.0` to `1.0`)
    fn relative_value_at(&self, x: f64) -> f64;
    /// Sample the window symmetrically at `n` points
    ///
    /// Point `idx` is taken at `x = 2·idx/(n−1) − 1`, so both ends of the
    /// record land exactly on the window's edges. A single point is `1.0`.
    fn coefficients(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let last = (n - 1) as f64;
                (0..n)
                    .map(|idx| self.relative_value_at(2.0 * idx as f64 / last - 1.0))
                    .collect()
            }
        }
    }
}

/// Rectangular window
#[derive(Clone, Copy, Debug, Default)]
pub struct Rectangular;

impl Window for Rectangular {
    fn relative_value_at(&self, _: f64) -> f64 {
        1.0
    }
}

/// Hann window
///
/// Sampled with [`Window::coefficients`], this is
/// *w\[n\] = 0.5 − 0.5·cos(2πn/(N−1))*.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hann;

impl Window for Hann {
    fn relative_value_at(&self, x: f64) -> f64 {
        0.5 + 0.5 * (PI * x).cos()
    }
}

/// Hamming window
#[derive(Clone, Copy, Debug, Default)]
pub struct Hamming;

impl Window for Hamming {
    fn relative_value_at(&self, x: f64) -> f64 {
        0.54 + 0.46 * (PI * x).cos()
    }
}

/// Blackman window
#[derive(Clone, Copy, Debug, Default)]
pub struct Blackman;

impl Window for Blackman {
    fn relative_value_at(&self, x: f64) -> f64 {
        0.42 + 0.5 * (PI * x).cos() + 0.08 * (2.0 * PI * x).cos()
    }
}
