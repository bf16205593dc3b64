//! Fixed-point scalar convention for curvature magnitudes.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of fractional bits carried by curvature values.
///
/// A raw value of `256` represents `1.0`.
pub const CURVATURE_FRACTIONAL_BITS: u32 = 8;

/// Threshold on `|k1 - k2|` above which the principal directions are
/// considered distinct and the pose fully defined.
///
/// Equal to `(1 << CURVATURE_FRACTIONAL_BITS) - 1`, i.e. just under `1.0`.
pub const PRINCIPAL_CURVATURE_THRESHOLD_FP: FixedPoint =
    FixedPoint::from_bits((1 << CURVATURE_FRACTIONAL_BITS) - 1);

/// A signed real value scaled by `2^CURVATURE_FRACTIONAL_BITS`.
///
/// # Example
///
/// ```
/// use surface_features::FixedPoint;
///
/// let k = FixedPoint::from_int(-2);
/// assert_eq!(k.to_bits(), -512);
/// assert_eq!(k.integer_part(), -2);
///
/// // Arithmetic shift floors toward negative infinity
/// assert_eq!(FixedPoint::from_bits(-1).integer_part(), -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FixedPoint(i32);

impl FixedPoint {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw fixed-point value.
    #[must_use]
    pub const fn from_bits(bits: i32) -> Self {
        Self(bits)
    }

    /// Converts an integer to fixed point.
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self(value << CURVATURE_FRACTIONAL_BITS)
    }

    /// Returns the raw scaled value.
    #[must_use]
    pub const fn to_bits(self) -> i32 {
        self.0
    }

    /// Integer part, via arithmetic right shift.
    #[must_use]
    pub const fn integer_part(self) -> i32 {
        self.0 >> CURVATURE_FRACTIONAL_BITS
    }

    /// Absolute difference between two values, in raw units.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.integer_part(), self.0)
    }
}
