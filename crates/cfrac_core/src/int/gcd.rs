//! GCD and extended GCD
//!
//! Word-sized operands use binary GCD. Multi-word operands are reduced with
//! bulk Lehmer steps on the two leading words, and very large operands go
//! through the half-GCD engine first, which advances the Euclidean sequence
//! in softly-linear time. The extended form tracks only the first cofactor
//! through the reduction and recovers the second by exact division at the
//! end.

use super::Int;
use crate::mat22::Mat22;
use crate::words::{lehmer_step_pair, lehmer_step_row};

/// Operand size, in bits, above which a GCD reduction step goes through the
/// recursive half-GCD engine instead of word-level Lehmer steps.
const HGCD_CUTOFF: u64 = 4096;

/// Binary GCD on words.
pub(crate) fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    let shift = (a | b).trailing_zeros();
    a >>= a.trailing_zeros();
    loop {
        b >>= b.trailing_zeros();
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        b -= a;
        if b == 0 {
            return a << shift;
        }
    }
}

pub(crate) fn gcd_u128(mut a: u128, mut b: u128) -> u128 {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    let shift = (a | b).trailing_zeros();
    a >>= a.trailing_zeros();
    loop {
        b >>= b.trailing_zeros();
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }
        b -= a;
        if b == 0 {
            return a << shift;
        }
    }
}

pub(crate) fn coprime_u64(a: u64, b: u64) -> bool {
    gcd_u64(a, b) == 1
}

pub(crate) fn coprime_u128(a: u128, b: u128) -> bool {
    gcd_u128(a, b) == 1
}

/// Word extended Euclid: returns `(g, s, t)` with `g = s*a + t*b`.
fn xgcd_words(mut a: u64, mut b: u64) -> (u64, i128, i128) {
    let (mut s0, mut s1) = (1i128, 0i128);
    let (mut t0, mut t1) = (0i128, 1i128);
    while b != 0 {
        let q = a / b;
        let r = a % b;
        a = b;
        b = r;
        let s2 = s0 - q as i128 * s1;
        s0 = s1;
        s1 = s2;
        let t2 = t0 - q as i128 * t1;
        t0 = t1;
        t1 = t2;
    }
    (a, s0, t0)
}

impl Int {
    /// Greatest common divisor, always nonnegative; `gcd(0, 0) == 0`.
    pub fn gcd(&self, other: &Int) -> Int {
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => {
                Int::from(gcd_u64(a.unsigned_abs(), b.unsigned_abs()))
            }
            _ => {
                let mut a = self.abs();
                let mut b = other.abs();
                if a.is_zero() {
                    return b;
                }
                if b.is_zero() {
                    return a;
                }
                if a < b {
                    std::mem::swap(&mut a, &mut b);
                }
                loop {
                    if b.bits() <= 62 {
                        let r = a.div_rem_trunc(&b).1;
                        let bw = b.to_u64().expect("word-sized by bit check");
                        let rw = r.to_u64().expect("remainder below a word-sized divisor");
                        return Int::from(gcd_u64(bw, rw));
                    }
                    if a == b {
                        return a;
                    }
                    if b.bits() >= HGCD_CUTOFF {
                        let mut m = Mat22::identity();
                        crate::hgcd::hgcd(&mut a, &mut b, &mut m, None);
                        if !m.is_identity() {
                            continue;
                        }
                    }
                    if lehmer_step_pair(&mut a, &mut b) > 0 {
                        continue;
                    }
                    let r = a.div_rem_floor(&b).1;
                    a = std::mem::replace(&mut b, r);
                    if b.is_zero() {
                        return a;
                    }
                }
            }
        }
    }

    /// Extended GCD: returns `(g, x, y)` with `g = self*x + other*y` and
    /// `g >= 0`. Zero operands follow the usual conventions:
    /// `xgcd(a, 0) = (|a|, sign(a), 0)` and symmetrically.
    pub fn xgcd(&self, other: &Int) -> (Int, Int, Int) {
        if self.is_zero() && other.is_zero() {
            return (Int::zero(), Int::zero(), Int::zero());
        }
        if self.is_zero() {
            return (other.abs(), Int::zero(), Int::from(i64::from(other.sign())));
        }
        if other.is_zero() {
            return (self.abs(), Int::from(i64::from(self.sign())), Int::zero());
        }

        let a0 = self.abs();
        let b0 = other.abs();

        if let (Int::Small(a), Int::Small(b)) = (&a0, &b0) {
            let (g, s, t) = xgcd_words(*a as u64, *b as u64);
            let mut x = Int::from(s);
            let mut y = Int::from(t);
            if self.is_negative() {
                x = -&x;
            }
            if other.is_negative() {
                y = -&y;
            }
            return (Int::from(g), x, y);
        }

        // Reduce the ordered pair (a, b), a >= b, tracking how the larger
        // original operand contributes to each: a = ua*hi + _, b = ub*hi + _.
        let swapped = a0 < b0;
        let (hi, lo) = if swapped { (&b0, &a0) } else { (&a0, &b0) };
        let mut a = hi.clone();
        let mut b = lo.clone();
        let mut ua = Int::one();
        let mut ub = Int::zero();

        while !b.is_zero() {
            if a.bits() <= 62 && b.bits() <= 62 {
                let aw = a.to_u64().expect("word-sized by bit check");
                let bw = b.to_u64().expect("word-sized by bit check");
                let (g, s, t) = xgcd_words(aw, bw);
                ua = &(&ua * &Int::from(s)) + &(&ub * &Int::from(t));
                a = Int::from(g);
                break;
            }
            if a > b && b.bits() > 62 {
                if b.bits() >= HGCD_CUTOFF {
                    let mut m = Mat22::identity();
                    crate::hgcd::hgcd(&mut a, &mut b, &mut m, None);
                    if !m.is_identity() {
                        m.apply_inv_pair(&mut ua, &mut ub);
                        continue;
                    }
                }
                if lehmer_step_row(&mut a, &mut b, &mut ua, &mut ub, &Int::zero()) > 0 {
                    continue;
                }
            }
            let (q, r) = a.div_rem_floor(&b);
            a = std::mem::replace(&mut b, r);
            let next = &ua - &(&q * &ub);
            ua = std::mem::replace(&mut ub, next);
        }

        let g = a;
        // g = ua*hi + y*lo, so y is recovered exactly.
        let (y_for_lo, rem) = (&g - &(hi * &ua)).div_rem_trunc(lo);
        debug_assert!(rem.is_zero());

        let (mut x, mut y) = if swapped { (y_for_lo, ua) } else { (ua, y_for_lo) };
        if self.is_negative() {
            x = -&x;
        }
        if other.is_negative() {
            y = -&y;
        }
        (g, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_integer::Integer;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;
    use std::str::FromStr;

    fn random_int(rng: &mut XorShiftRng, bits: u64) -> Int {
        let mut x = Int::zero();
        for i in 0..bits {
            if rng.gen::<bool>() {
                x.set_bit(i, true);
            }
        }
        x.set_bit(bits.saturating_sub(1), true);
        x
    }

    #[test]
    fn test_gcd_words() {
        assert_eq!(gcd_u64(0, 0), 0);
        assert_eq!(gcd_u64(0, 7), 7);
        assert_eq!(gcd_u64(12, 18), 6);
        assert_eq!(gcd_u64(35, 64), 1);
        assert_eq!(gcd_u128(1 << 100, 1 << 60), 1 << 60);
    }

    #[test]
    fn test_gcd_small() {
        assert_eq!(Int::from(240i64).gcd(&Int::from(46i64)), Int::from(2i64));
        assert_eq!(Int::from(-240i64).gcd(&Int::from(46i64)), Int::from(2i64));
        assert_eq!(Int::zero().gcd(&Int::from(-5i64)), Int::from(5i64));
        assert_eq!(Int::zero().gcd(&Int::zero()), Int::zero());
    }

    #[test]
    fn test_gcd_matches_reference() {
        let mut rng = XorShiftRng::from_seed([7u8; 16]);
        for bits in [40u64, 80, 200, 700, 3000, 9000] {
            let a = random_int(&mut rng, bits);
            let b = random_int(&mut rng, bits / 2 + 1);
            let got = a.gcd(&b);
            let expect = a.to_bigint().gcd(&b.to_bigint());
            assert_eq!(got.to_bigint(), expect, "gcd at {} bits", bits);
        }
    }

    #[test]
    fn test_gcd_shared_factor() {
        let mut rng = XorShiftRng::from_seed([9u8; 16]);
        let f = random_int(&mut rng, 300);
        let a = &random_int(&mut rng, 200) * &f;
        let b = &random_int(&mut rng, 180) * &f;
        let g = a.gcd(&b);
        assert!(a.is_divisible_by(&g));
        assert!(b.is_divisible_by(&g));
        // The planted factor divides the gcd.
        assert!(g.is_divisible_by(&f));
    }

    #[test]
    fn test_xgcd_example() {
        // 240 and 46: g = 2 = 240*(-9) + 46*47.
        let (g, x, y) = Int::from(240i64).xgcd(&Int::from(46i64));
        assert_eq!(g, Int::from(2i64));
        assert_eq!(x, Int::from(-9i64));
        assert_eq!(y, Int::from(47i64));
    }

    #[test]
    fn test_xgcd_signs_and_zero() {
        let (g, x, y) = Int::from(-7i64).xgcd(&Int::zero());
        assert_eq!((g, x, y), (Int::from(7i64), Int::from(-1i64), Int::zero()));

        let (g, x, y) = Int::zero().xgcd(&Int::from(11i64));
        assert_eq!((g, x, y), (Int::from(11i64), Int::zero(), Int::one()));

        let a = Int::from_str("-565721958").unwrap();
        let b = Int::from_str("4486780496").unwrap();
        let (g, x, y) = a.xgcd(&b);
        assert_eq!(g, Int::from(2i64));
        assert_eq!(&(&a * &x) + &(&b * &y), g);
    }

    #[test]
    fn test_xgcd_bezout_random() {
        let mut rng = XorShiftRng::from_seed([1u8; 16]);
        for bits in [30u64, 63, 100, 250, 900, 5000] {
            for _ in 0..4 {
                let mut a = random_int(&mut rng, bits);
                let mut b = random_int(&mut rng, (bits * 2 / 3).max(2));
                if rng.gen::<bool>() {
                    a = -&a;
                }
                if rng.gen::<bool>() {
                    b = -&b;
                }
                let (g, x, y) = a.xgcd(&b);
                assert!(!g.is_negative());
                assert_eq!(&(&a * &x) + &(&b * &y), g, "bezout at {} bits", bits);
                assert_eq!(g.to_bigint(), a.to_bigint().gcd(&b.to_bigint()));
            }
        }
    }

    #[test]
    fn test_xgcd_equal_operands() {
        let a = Int::from_str("123456789123456789123456789").unwrap();
        let (g, x, y) = a.xgcd(&a);
        assert_eq!(g, a);
        assert_eq!(&(&a * &x) + &(&a * &y), g);
    }
}
