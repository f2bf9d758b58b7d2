//! Division with explicit rounding
//!
//! Four quotient/remainder pairs are provided, differing only in how the
//! quotient is rounded when the division is inexact:
//!
//! - truncating: quotient rounded toward zero, `sign(r) == sign(a)`
//! - floor: quotient rounded toward -inf, `sign(r) == sign(b)`
//! - ceiling: quotient rounded toward +inf, `sign(r) == -sign(b)`
//! - Euclidean: `0 <= r < |b|`
//!
//! All satisfy `a == q*b + r` exactly. Division by zero is fatal.

use super::Int;
use num_integer::Integer;

impl Int {
    /// Truncating division, quotient and remainder.
    pub fn div_rem_trunc(&self, other: &Int) -> (Int, Int) {
        check_divisor(other);
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => (Int::from(a / b), Int::from(a % b)),
            _ => {
                let (q, r) = self.big().div_rem(&other.big());
                (Int::from_bigint(q), Int::from_bigint(r))
            }
        }
    }

    /// Floor division, quotient and remainder.
    pub fn div_rem_floor(&self, other: &Int) -> (Int, Int) {
        check_divisor(other);
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => {
                let (mut q, mut r) = (a / b, a % b);
                if r != 0 && (r < 0) != (*b < 0) {
                    q -= 1;
                    r += b;
                }
                (Int::from(q), Int::from(r))
            }
            _ => {
                let (q, r) = self.big().div_mod_floor(&other.big());
                (Int::from_bigint(q), Int::from_bigint(r))
            }
        }
    }

    /// Ceiling division, quotient and remainder.
    pub fn div_rem_ceil(&self, other: &Int) -> (Int, Int) {
        check_divisor(other);
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => {
                let (mut q, mut r) = (a / b, a % b);
                if r != 0 && (r < 0) == (*b < 0) {
                    q += 1;
                    r -= b;
                }
                (Int::from(q), Int::from(r))
            }
            _ => {
                // Round the floor result up when inexact; floor leaves the
                // remainder with the divisor's sign, so one correction step
                // suffices.
                let (q, r) = self.div_rem_floor(other);
                if r.is_zero() {
                    (q, r)
                } else {
                    (&q + 1, &r - other)
                }
            }
        }
    }

    /// Euclidean division: the remainder is always in `[0, |b|)`.
    pub fn div_rem_euclid(&self, other: &Int) -> (Int, Int) {
        check_divisor(other);
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => {
                (Int::from(a.div_euclid(*b)), Int::from(a.rem_euclid(*b)))
            }
            _ => {
                let (q, r) = self.div_rem_trunc(other);
                if r.is_negative() {
                    if other.is_positive() {
                        (&q - 1, &r + other)
                    } else {
                        (&q + 1, &r - other)
                    }
                } else {
                    (q, r)
                }
            }
        }
    }

    /// Floor quotient only.
    pub fn div_floor(&self, other: &Int) -> Int {
        self.div_rem_floor(other).0
    }

    /// Floor remainder only.
    pub fn rem_floor(&self, other: &Int) -> Int {
        self.div_rem_floor(other).1
    }

    /// Euclidean remainder only.
    pub fn rem_euclid(&self, other: &Int) -> Int {
        self.div_rem_euclid(other).1
    }

    /// Whether `other` divides `self` exactly. Zero divides only zero.
    pub fn is_divisible_by(&self, other: &Int) -> bool {
        if other.is_zero() {
            return self.is_zero();
        }
        self.div_rem_trunc(other).1.is_zero()
    }
}

fn check_divisor(d: &Int) {
    if d.is_zero() {
        panic!("division by zero");
    }
}
