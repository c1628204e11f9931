//! Generic floats and complex numbers
//!
//! This module re-exports [`num::Complex`] as [`Complex`] and provides a
//! [`Float`] trait, which is implemented by [`f32`] and [`f64`].
//!
//! Sample data may be stored in either precision. Powers and metrics are
//! always reported as [`f64`], see [`to_f64`].

use rustfft::FftNum;

use std::marker::{Send, Sync};

pub use num::Complex;

/// Trait implemented for [`f32`] and [`f64`]
///
/// This trait is used as bound on functions which support single and double
/// precision sample data.
/// It should not be relied upon that this trait is implemented for other types
/// than [`f32`] or [`f64`].
///
/// See [`flt!`] for an example on how to write functions working with generic
/// floats.
///
/// [`flt!`]: crate::flt
pub trait Float
where
    Self: 'static + Send + Sync,
    Self: num::traits::Float,
    Self: num::traits::FloatConst,
    Self: num::traits::NumAssignOps,
    Self: FftNum,
{
}
impl<T> Float for T
where
    T: 'static + Send + Sync,
    T: num::traits::Float,
    T: num::traits::FloatConst,
    T: num::traits::NumAssignOps,
    T: FftNum,
{
}

/// Macro to convert number into a generic [`Float`] type, which must be in
/// scope as "`Flt`"
///
/// # Example
///
/// ```
/// use adcmetrics::{flt, numbers::Float};
///
/// fn half_scale<Flt: Float>(full_scale: Flt) -> Flt {
///     full_scale / flt!(2)
/// }
///
/// assert_eq!(half_scale(3.0f32), 1.5);
/// ```
#[macro_export]
macro_rules! flt {
    ($x:expr) => {
        Flt::from($x).expect("could not convert number into float")
    };
}

/// Widen a generic float to [`f64`]
///
/// Conversion of `f32` or `f64` into `f64` cannot fail; non-finite values are
/// preserved.
pub fn to_f64<Flt: Float>(x: Flt) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}
