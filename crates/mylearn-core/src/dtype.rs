use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Element type of features, labels and fitted parameters (`f32` or `f64`).
///
/// Class labels travel as floats too; tree and naive Bayes estimators read
/// them back as integer class ids.
pub trait Float:
    Copy
    + Default
    + PartialOrd
    + Debug
    + Display
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
    + Serialize
    + for<'de> Deserialize<'de>
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    const HALF: Self;
    const EPSILON: Self;
    const NEG_INFINITY: Self;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn from_usize(v: usize) -> Self;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn ln(self) -> Self;
    fn log2(self) -> Self;
    fn round(self) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;
    fn is_nan(self) -> bool;
    fn is_finite(self) -> bool;
    /// IEEE 754 total order; NaN sorts after every number.
    fn total_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! impl_float {
    ($t:ident) => {
        impl Float for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const HALF: Self = 0.5;
            const EPSILON: Self = $t::EPSILON;
            const NEG_INFINITY: Self = $t::NEG_INFINITY;

            fn from_f64(v: f64) -> Self {
                v as $t
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_usize(v: usize) -> Self {
                v as $t
            }

            fn abs(self) -> Self {
                $t::abs(self)
            }
            fn sqrt(self) -> Self {
                $t::sqrt(self)
            }
            fn ln(self) -> Self {
                $t::ln(self)
            }
            fn log2(self) -> Self {
                $t::log2(self)
            }
            fn round(self) -> Self {
                $t::round(self)
            }
            fn max(self, other: Self) -> Self {
                $t::max(self, other)
            }
            fn min(self, other: Self) -> Self {
                $t::min(self, other)
            }
            fn is_nan(self) -> bool {
                $t::is_nan(self)
            }
            fn is_finite(self) -> bool {
                $t::is_finite(self)
            }
            fn total_cmp(&self, other: &Self) -> Ordering {
                $t::total_cmp(self, other)
            }
        }
    };
}

impl_float!(f32);
impl_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn largest<T: Float>(values: &[T]) -> T {
        values.iter().copied().fold(T::NEG_INFINITY, Float::max)
    }

    #[test]
    fn test_generic_over_widths() {
        assert_eq!(largest(&[1.0f32, 3.0, 2.0]), 3.0);
        assert_eq!(largest(&[-1.0f64, -3.0]), -1.0);
        assert_eq!(<f32 as Float>::from_usize(3).to_f64(), 3.0);
    }

    #[test]
    fn test_total_cmp_orders_nan_last() {
        let mut v = vec![2.0, f64::NAN, -1.0];
        v.sort_by(Float::total_cmp);
        assert_eq!(&v[..2], &[-1.0, 2.0]);
        assert!(Float::is_nan(v[2]));
    }
}
