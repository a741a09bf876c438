//! The totally-ordered time domain the rest of the engine is generic over.
//!
//! §3 requires "Integers and fixed-point are both supported"; this
//! is modeled as a trait rather than a single concrete type so the engine
//! itself never hard-codes an integer width.

use std::fmt;
use std::hash::Hash;
use std::ops::{Add, Sub};

/// A point (or duration) in the engine's abstract time domain.
///
/// `infinity()` must compare greater than any value a real workload can
/// produce; implementations reserve headroom so that `infinity() + infinity()`
/// does not wrap.
pub trait TimeBound:
    Copy
    + Clone
    + Ord
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn infinity() -> Self;
    fn epsilon() -> Self;
    fn deadline_miss_tolerance() -> Self;

    fn saturating_add(self, rhs: Self) -> Self {
        if self == Self::infinity() || rhs == Self::infinity() {
            Self::infinity()
        } else {
            self + rhs
        }
    }
}

impl TimeBound for i64 {
    fn zero() -> Self {
        0
    }

    // Leave enough headroom that a couple of additions of `infinity()`
    // still fit in an i64 without wrapping.
    fn infinity() -> Self {
        i64::MAX / 4
    }

    fn epsilon() -> Self {
        1
    }

    fn deadline_miss_tolerance() -> Self {
        0
    }
}

/// A fixed-point time value: an `i64` scaled by [`Fixed::SCALE`].
///
/// Exists to exercise the "fixed-point is supported" requirement without
/// dragging in a decimal-arithmetic dependency; callers pick the scale that
/// matches the granularity their workload file uses (e.g. microseconds).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Fixed(pub i64);

impl Fixed {
    pub const SCALE: i64 = 1000;

    pub fn from_integer(units: i64) -> Self {
        Fixed(units * Self::SCALE)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / Self::SCALE, (self.0 % Self::SCALE).abs())
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 + rhs.0)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0 - rhs.0)
    }
}

impl TimeBound for Fixed {
    fn zero() -> Self {
        Fixed(0)
    }

    fn infinity() -> Self {
        Fixed(i64::MAX / 4)
    }

    fn epsilon() -> Self {
        Fixed(1)
    }

    fn deadline_miss_tolerance() -> Self {
        Fixed(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_infinity_dominates() {
        assert!(i64::infinity() > 1_000_000_000);
        assert_eq!(i64::infinity().saturating_add(i64::infinity()), i64::infinity());
    }

    #[test]
    fn fixed_roundtrips_integers() {
        let three = Fixed::from_integer(3);
        assert_eq!(format!("{three}"), "3.000");
        assert_eq!(three + Fixed(500), Fixed(3500));
    }
}
