//! String and floating-point conversion

use super::{Int, SMALL_MAX};
use num_bigint::{BigInt, ParseBigIntError};
use num_traits::ToPrimitive;
use std::fmt;
use std::str::FromStr;

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Int::Small(v) => fmt::Display::fmt(v, f),
            Int::Large(b) => fmt::Display::fmt(b, f),
        }
    }
}

impl FromStr for Int {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Word-sized literals parse without touching the heap.
        if let Ok(v) = i64::from_str(s) {
            if (-SMALL_MAX..=SMALL_MAX).contains(&v) {
                return Ok(Int::Small(v));
            }
        }
        BigInt::from_str(s).map(Int::from_bigint)
    }
}

impl Int {
    /// Mantissa/exponent form: returns `(d, e)` with `value = d * 2^e`,
    /// `0.5 <= |d| < 1` (and `(0.0, 0)` for zero). The mantissa keeps the
    /// leading 53 bits of the magnitude.
    pub fn to_f64_2exp(&self) -> (f64, i64) {
        if self.is_zero() {
            return (0.0, 0);
        }
        let nbits = self.bits();
        let mant = if nbits <= 53 {
            let top = match self {
                Int::Small(v) => v.unsigned_abs(),
                Int::Large(b) => b.magnitude().to_u64().expect("53-bit magnitude"),
            };
            top as f64 / (1u64 << nbits) as f64
        } else {
            let top = self
                .abs()
                .shr(nbits - 53)
                .to_u64()
                .expect("53-bit window");
            top as f64 / (1u64 << 53) as f64
        };
        let signed = if self.is_negative() { -mant } else { mant };
        (signed, nbits as i64)
    }

    /// Nearest-double approximation; overflows to infinity for huge values.
    pub fn to_f64(&self) -> f64 {
        match self {
            Int::Small(v) => *v as f64,
            Int::Large(b) => b.to_f64().unwrap_or(f64::INFINITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        for s in [
            "0",
            "1",
            "-1",
            "4611686018427387903",
            "-4611686018427387904",
            "123456789012345678901234567890123456789",
            "-99999999999999999999999999999999999999999999",
        ] {
            let x = Int::from_str(s).unwrap();
            assert_eq!(x.to_string(), s);
            assert_eq!(Int::from_str(&x.to_string()).unwrap(), x);
        }
    }

    #[test]
    fn test_parse_canonical_form() {
        // At the boundary the parser must pick the same form arithmetic does.
        let max = Int::from_str("4611686018427387903").unwrap();
        assert!(max.is_small());
        let over = Int::from_str("4611686018427387904").unwrap();
        assert!(!over.is_small());
        assert_eq!(&over - 1, max);
    }

    #[test]
    fn test_parse_error() {
        assert!(Int::from_str("12x34").is_err());
        assert!(Int::from_str("").is_err());
    }

    #[test]
    fn test_f64_2exp() {
        let (d, e) = Int::from(1i64).to_f64_2exp();
        assert_eq!((d, e), (0.5, 1));

        let (d, e) = Int::from(-6i64).to_f64_2exp();
        assert_eq!((d, e), (-0.75, 3));

        let big = Int::from(3i64).shl(200);
        let (d, e) = big.to_f64_2exp();
        assert_eq!(e, 202);
        assert!((d - 0.75).abs() < 1e-15);
        assert!((0.5..1.0).contains(&d));

        assert_eq!(Int::zero().to_f64_2exp(), (0.0, 0));
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Int::from(-42i64).to_f64(), -42.0);
        let big = Int::from(1i64).shl(100);
        assert_eq!(big.to_f64(), 2f64.powi(100));
    }
}
