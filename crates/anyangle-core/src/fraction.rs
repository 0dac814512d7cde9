//! Exact rational numbers for grid geometry.
//!
//! Line-of-sight intervals end at x-coordinates obtained by projecting grid
//! corners through a source vertex. Those coordinates are rational, and the
//! scanner must tell exactly whether one lands on a grid line, so they are
//! kept as reduced fractions instead of floats.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// A rational number `numer / denom` in lowest terms with `denom > 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "FractionParts"))]
pub struct Fraction {
    numer: i64,
    denom: i64,
}

/// A denominator of zero was supplied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ZeroDenominator;

impl fmt::Display for ZeroDenominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fraction with zero denominator")
    }
}

impl std::error::Error for ZeroDenominator {}

/// Unchecked wire form; deserialized fractions are reduced through
/// [`Fraction::try_new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct FractionParts {
    numer: i64,
    denom: i64,
}

#[cfg(feature = "serde")]
impl TryFrom<FractionParts> for Fraction {
    type Error = ZeroDenominator;

    fn try_from(parts: FractionParts) -> Result<Self, Self::Error> {
        Self::try_new(parts.numer, parts.denom)
    }
}

fn gcd(mut a: i64, mut b: i64) -> i64 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Fraction {
    /// Zero.
    pub const ZERO: Self = Self { numer: 0, denom: 1 };

    /// Create `numer / denom`, reduced.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn new(numer: i64, denom: i64) -> Self {
        match Self::try_new(numer, denom) {
            Ok(f) => f,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create `numer / denom`, reduced, or fail on a zero denominator.
    pub fn try_new(numer: i64, denom: i64) -> Result<Self, ZeroDenominator> {
        if denom == 0 {
            return Err(ZeroDenominator);
        }
        let g = gcd(numer, denom);
        let sign = if denom < 0 { -1 } else { 1 };
        Ok(Self {
            numer: sign * numer / g,
            denom: sign * denom / g,
        })
    }

    /// The whole number `n`.
    #[inline]
    pub const fn whole(n: i64) -> Self {
        Self { numer: n, denom: 1 }
    }

    #[inline]
    pub const fn numer(self) -> i64 {
        self.numer
    }

    #[inline]
    pub const fn denom(self) -> i64 {
        self.denom
    }

    /// Whether the value is an integer.
    #[inline]
    pub const fn is_whole(self) -> bool {
        self.denom == 1
    }

    /// Largest integer not greater than the value.
    #[inline]
    pub const fn floor(self) -> i64 {
        self.numer.div_euclid(self.denom)
    }

    /// Smallest integer not less than the value.
    #[inline]
    pub const fn ceil(self) -> i64 {
        -(-self.numer).div_euclid(self.denom)
    }

    /// `self * num / den`, reduced.
    pub fn mul_div(self, num: i64, den: i64) -> Self {
        Self::new(self.numer * num, self.denom * den)
    }

    /// Lossy conversion, for display and distances only.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Self::whole(n)
    }
}

impl From<i32> for Fraction {
    fn from(n: i32) -> Self {
        Self::whole(n as i64)
    }
}

impl Add for Fraction {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.numer * rhs.denom + rhs.numer * self.denom,
            self.denom * rhs.denom,
        )
    }
}

impl Sub for Fraction {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.numer * rhs.denom - rhs.numer * self.denom,
            self.denom * rhs.denom,
        )
    }
}

// Adding an integer keeps the denominator and cannot break lowest terms.
impl Add<i64> for Fraction {
    type Output = Self;
    #[inline]
    fn add(self, rhs: i64) -> Self {
        Self {
            numer: self.numer + rhs * self.denom,
            denom: self.denom,
        }
    }
}

impl Sub<i64> for Fraction {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: i64) -> Self {
        Self {
            numer: self.numer - rhs * self.denom,
            denom: self.denom,
        }
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numer as i128 * other.denom as i128).cmp(&(other.numer as i128 * self.denom as i128))
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<i64> for Fraction {
    fn eq(&self, other: &i64) -> bool {
        self.denom == 1 && self.numer == *other
    }
}

impl PartialOrd<i64> for Fraction {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.numer.cmp(&(other * self.denom)))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_zero_denominator() {
        assert_eq!(Fraction::try_new(1, 0), Err(ZeroDenominator));
        assert_eq!(Fraction::try_new(4, 2), Ok(Fraction::whole(2)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_restores_invariants() {
        let f: Fraction = serde_json::from_str(r#"{"numer":4,"denom":2}"#).unwrap();
        assert!(f.is_whole());
        assert_eq!(f, 2_i64);
        let f: Fraction = serde_json::from_str(r#"{"numer":2,"denom":-4}"#).unwrap();
        assert_eq!(f, Fraction::new(-1, 2));
        assert_eq!(f.denom(), 2);
        assert!(serde_json::from_str::<Fraction>(r#"{"numer":1,"denom":0}"#).is_err());

        let third = Fraction::new(5, 15);
        let json = serde_json::to_string(&third).unwrap();
        assert_eq!(json, r#"{"numer":1,"denom":3}"#);
        assert_eq!(serde_json::from_str::<Fraction>(&json).unwrap(), third);
    }

    #[test]
    fn new_reduces_and_normalizes_sign() {
        let f = Fraction::new(6, -4);
        assert_eq!(f.numer(), -3);
        assert_eq!(f.denom(), 2);
        assert_eq!(Fraction::new(0, -7), Fraction::ZERO);
        assert_eq!(Fraction::new(-10, -5), Fraction::whole(2));
    }

    #[test]
    #[should_panic]
    fn zero_denominator_panics() {
        let _ = Fraction::new(1, 0);
    }

    #[test]
    fn floor_and_ceil() {
        assert_eq!(Fraction::new(7, 2).floor(), 3);
        assert_eq!(Fraction::new(7, 2).ceil(), 4);
        assert_eq!(Fraction::new(-7, 2).floor(), -4);
        assert_eq!(Fraction::new(-7, 2).ceil(), -3);
        assert_eq!(Fraction::whole(5).floor(), 5);
        assert_eq!(Fraction::whole(5).ceil(), 5);
        assert_eq!(Fraction::whole(-5).ceil(), -5);
    }

    #[test]
    fn whole_test() {
        assert!(Fraction::new(8, 4).is_whole());
        assert!(!Fraction::new(8, 3).is_whole());
        assert!(Fraction::ZERO.is_whole());
    }

    #[test]
    fn arithmetic() {
        let a = Fraction::new(1, 3);
        let b = Fraction::new(1, 6);
        assert_eq!(a + b, Fraction::new(1, 2));
        assert_eq!(a - b, Fraction::new(1, 6));
        assert_eq!(a + 2i64, Fraction::new(7, 3));
        assert_eq!(a - 1i64, Fraction::new(-2, 3));
        assert_eq!(Fraction::new(3, 4).mul_div(2, 3), Fraction::new(1, 2));
    }

    #[test]
    fn projection_through_source() {
        // (x - sx) * (dy + 1) / dy + sx with sx = 3, x = 5/2, dy = 2.
        let x = Fraction::new(5, 2);
        let projected = (x - 3i64).mul_div(3, 2) + 3i64;
        assert_eq!(projected, Fraction::new(9, 4));
        assert!(!projected.is_whole());
    }

    #[test]
    fn ordering_against_fractions_and_integers() {
        let half = Fraction::new(1, 2);
        let third = Fraction::new(1, 3);
        assert!(third < half);
        assert!(half > 0i64);
        assert!(half < 1i64);
        assert!(Fraction::new(-1, 2) < 0i64);
        assert!(Fraction::whole(2) == 2i64);
        assert!(Fraction::new(4, 2) <= 2i64);
        assert!(Fraction::new(5, 2) != 2i64);
        assert_eq!(Fraction::new(2, 4).cmp(&half), Ordering::Equal);
    }

    #[test]
    fn display() {
        assert_eq!(Fraction::new(3, 6).to_string(), "1/2");
        assert_eq!(Fraction::whole(-4).to_string(), "-4");
    }
}
