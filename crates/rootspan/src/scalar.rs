//! Scalar abstraction over the working precision.
//!
//! The bracketing solvers are generic over [`Scalar`], which extends
//! [`num_traits::Float`] with the handful of operations the solvers need
//! beyond arithmetic: constant injection, adjacent representable values,
//! and a midpoint.
//!
//! For native binary floats the midpoint halves the distance along the
//! *representable-value axis* by averaging bit patterns, so a bracket
//! collapses to an adjacent pair within mantissa + exponent bits worth of
//! steps (64 for `f64`). Types without a fixed-width binary representation
//! keep the algebraic default and report [`Scalar::BITWISE_MIDPOINT`] as
//! `false`, which makes [`crate::solvers::bisection`] delegate to
//! [`crate::solvers::toms748`].

use std::fmt;

use num_traits::Float;

/// Scalar type usable by the bracketing solvers.
pub trait Scalar: Float + fmt::Debug + fmt::Display {
    /// Whether [`Scalar::middle`] advances along the representable-value
    /// axis rather than the real line.
    const BITWISE_MIDPOINT: bool;

    /// Injects an `f64` constant into this type.
    fn of(value: f64) -> Self;

    /// A value between `self` and `other` suitable for bisection.
    ///
    /// The default is the algebraic midpoint `x + (y - x) / 2`, which is
    /// the correct fallback for arbitrary-precision representations.
    fn middle(self, other: Self) -> Self {
        self + (other - self) / Self::of(2.0)
    }

    /// The next representable value toward positive infinity.
    ///
    /// Types with no fixed-width representation may keep the identity
    /// default; adjacency-based termination then degrades to the scaled
    /// tolerance test.
    fn next_up(self) -> Self {
        self
    }

    /// The next representable value toward negative infinity.
    fn next_down(self) -> Self {
        self
    }
}

macro_rules! impl_binary_scalar {
    ($float:ty) => {
        impl Scalar for $float {
            const BITWISE_MIDPOINT: bool = true;

            #[allow(clippy::cast_possible_truncation)]
            fn of(value: f64) -> Self {
                value as $float
            }

            fn middle(self, other: Self) -> Self {
                if !self.is_finite() || !other.is_finite() {
                    return self + other;
                }
                // A midpoint straddling zero would stall the exponent
                // halving, so split exactly at zero instead.
                if (self > 0.0 && other < 0.0) || (self < 0.0 && other > 0.0) {
                    return 0.0;
                }
                let negate = self < 0.0 || other < 0.0;
                let mid = (self.abs().to_bits() + other.abs().to_bits()) >> 1;
                let unsigned = <$float>::from_bits(mid);
                if negate {
                    -unsigned
                } else {
                    unsigned
                }
            }

            fn next_up(self) -> Self {
                if self.is_nan() || self == <$float>::INFINITY {
                    return self;
                }
                if self == 0.0 {
                    return <$float>::from_bits(1);
                }
                let bits = self.to_bits();
                let next = if self > 0.0 { bits + 1 } else { bits - 1 };
                <$float>::from_bits(next)
            }

            fn next_down(self) -> Self {
                -Scalar::next_up(-self)
            }
        }
    };
}

impl_binary_scalar!(f32);
impl_binary_scalar!(f64);
