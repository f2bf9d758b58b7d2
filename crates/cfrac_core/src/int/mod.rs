//! Tagged small/large signed integer
//!
//! An [`Int`] is either a single machine word (`Small`) or an owned
//! arbitrary-precision value (`Large`). Values stay in whichever form is
//! canonical for their magnitude: every constructor and every arithmetic
//! result demotes a heap value back to the inline form as soon as its
//! magnitude fits. Canonical form is what makes the derived `Eq` and `Hash`
//! agree with numeric equality.
//!
//! Arithmetic between two `Small` values never touches the heap; the word
//! fast paths compute in `i64`/`i128` and promote only when the result
//! leaves the inline range.

mod convert;
mod div;
mod gcd;

pub(crate) use gcd::{coprime_u128, coprime_u64, gcd_u64};

use num_bigint::BigInt;
use num_integer::Roots;
use num_traits::{Signed, ToPrimitive};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Largest magnitude stored inline: one sign bit and one tag bit are kept in
/// reserve, so the inline range is symmetric around zero.
pub const SMALL_MAX: i64 = (1i64 << 62) - 1;

/// Arbitrary-precision signed integer with an inline fast path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Int {
    /// Inline value, `|v| <= SMALL_MAX`.
    Small(i64),
    /// Heap value, magnitude strictly above `SMALL_MAX`.
    Large(Box<BigInt>),
}

impl Int {
    pub fn zero() -> Self {
        Int::Small(0)
    }

    pub fn one() -> Self {
        Int::Small(1)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Int::Small(0))
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Int::Small(1))
    }

    /// True when the value is held inline.
    pub fn is_small(&self) -> bool {
        matches!(self, Int::Small(_))
    }

    /// Sign of the value: -1, 0 or +1.
    pub fn sign(&self) -> i32 {
        match self {
            Int::Small(v) => v.signum() as i32,
            Int::Large(b) => {
                if b.is_negative() {
                    -1
                } else {
                    1
                }
            }
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sign() < 0
    }

    pub fn is_positive(&self) -> bool {
        self.sign() > 0
    }

    /// Bit length of the magnitude; zero has bit length 0.
    pub fn bits(&self) -> u64 {
        match self {
            Int::Small(0) => 0,
            Int::Small(v) => 64 - u64::from(v.unsigned_abs().leading_zeros()),
            Int::Large(b) => b.bits(),
        }
    }

    pub fn abs(&self) -> Int {
        match self {
            Int::Small(v) => Int::Small(v.abs()),
            Int::Large(b) => {
                if b.is_negative() {
                    Int::Large(Box::new(-&**b))
                } else {
                    self.clone()
                }
            }
        }
    }

    /// The value times two.
    pub fn double(&self) -> Int {
        self.shl(1)
    }

    /// Left shift; promotes when the result leaves the inline range.
    pub fn shl(&self, k: u64) -> Int {
        match self {
            Int::Small(0) => Int::Small(0),
            Int::Small(v) if k <= 62 && v.unsigned_abs() <= (SMALL_MAX as u64) >> k => {
                Int::Small(v << k)
            }
            _ => Int::from_bigint(&*self.big() << usize::try_from(k).expect("shift fits usize")),
        }
    }

    /// Right shift, rounding toward negative infinity (the shift of a
    /// negative value behaves like floor division by a power of two).
    pub fn shr(&self, k: u64) -> Int {
        match self {
            Int::Small(v) => {
                if k >= 63 {
                    Int::Small(if *v < 0 { -1 } else { 0 })
                } else {
                    Int::Small(v >> k)
                }
            }
            Int::Large(b) => {
                Int::from_bigint(&**b >> usize::try_from(k).expect("shift fits usize"))
            }
        }
    }

    /// Bit `i` of a nonnegative value.
    pub fn bit(&self, i: u64) -> bool {
        debug_assert!(!self.is_negative());
        match self {
            Int::Small(v) => {
                if i >= 63 {
                    false
                } else {
                    (*v >> i) & 1 == 1
                }
            }
            Int::Large(b) => b.magnitude().bit(i),
        }
    }

    /// Set or clear bit `i` of a nonnegative value.
    pub fn set_bit(&mut self, i: u64, value: bool) {
        debug_assert!(!self.is_negative());
        match self {
            Int::Small(v) if i < 62 => {
                if value {
                    *v |= 1i64 << i;
                } else {
                    *v &= !(1i64 << i);
                }
            }
            _ => {
                let mut mag = self.big().magnitude().clone();
                mag.set_bit(i, value);
                *self = Int::from_bigint(BigInt::from(mag));
            }
        }
    }

    /// Integer square root of a nonnegative value.
    pub fn sqrt(&self) -> Int {
        debug_assert!(!self.is_negative());
        match self {
            Int::Small(v) => Int::Small((*v as u64).sqrt() as i64),
            Int::Large(b) => Int::from_bigint(BigInt::from(b.magnitude().sqrt())),
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Int::Small(v) => Some(*v),
            Int::Large(b) => b.to_i64(),
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Int::Small(v) => u64::try_from(*v).ok(),
            Int::Large(b) => b.to_u64(),
        }
    }

    pub fn to_u128(&self) -> Option<u128> {
        match self {
            Int::Small(v) => u128::try_from(*v).ok(),
            Int::Large(b) => b.to_u128(),
        }
    }

    /// Copy out as a `num_bigint::BigInt`, whichever form the value is in.
    pub fn to_bigint(&self) -> BigInt {
        self.big().into_owned()
    }

    /// Compare magnitudes, ignoring signs.
    pub fn cmp_abs(&self, other: &Int) -> Ordering {
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => a.unsigned_abs().cmp(&b.unsigned_abs()),
            (Int::Small(_), Int::Large(_)) => Ordering::Less,
            (Int::Large(_), Int::Small(_)) => Ordering::Greater,
            (Int::Large(a), Int::Large(b)) => a.magnitude().cmp(b.magnitude()),
        }
    }

    /// Demote a heap value whose magnitude has shrunk back into the inline
    /// range. Idempotent; arithmetic already returns canonical results, so
    /// this is only observable when called twice.
    pub fn normalize(&mut self) {
        if let Int::Large(b) = self {
            if let Some(v) = b.to_i64() {
                if (-SMALL_MAX..=SMALL_MAX).contains(&v) {
                    *self = Int::Small(v);
                }
            }
        }
    }

    /// Canonicalizing constructor from a heap value.
    pub(crate) fn from_bigint(v: BigInt) -> Int {
        match v.to_i64() {
            Some(s) if (-SMALL_MAX..=SMALL_MAX).contains(&s) => Int::Small(s),
            _ => Int::Large(Box::new(v)),
        }
    }

    fn from_i128(v: i128) -> Int {
        if (-(SMALL_MAX as i128)..=SMALL_MAX as i128).contains(&v) {
            Int::Small(v as i64)
        } else {
            Int::Large(Box::new(BigInt::from(v)))
        }
    }

    /// Borrow the value as a `BigInt`, materializing one only for `Small`.
    pub(crate) fn big(&self) -> Cow<'_, BigInt> {
        match self {
            Int::Small(v) => Cow::Owned(BigInt::from(*v)),
            Int::Large(b) => Cow::Borrowed(&**b),
        }
    }
}

impl Default for Int {
    fn default() -> Self {
        Int::zero()
    }
}

impl From<i64> for Int {
    fn from(v: i64) -> Self {
        if (-SMALL_MAX..=SMALL_MAX).contains(&v) {
            Int::Small(v)
        } else {
            Int::Large(Box::new(BigInt::from(v)))
        }
    }
}

impl From<u64> for Int {
    fn from(v: u64) -> Self {
        if v <= SMALL_MAX as u64 {
            Int::Small(v as i64)
        } else {
            Int::Large(Box::new(BigInt::from(v)))
        }
    }
}

impl From<i32> for Int {
    fn from(v: i32) -> Self {
        Int::Small(v as i64)
    }
}

impl From<u32> for Int {
    fn from(v: u32) -> Self {
        Int::Small(v as i64)
    }
}

impl From<i128> for Int {
    fn from(v: i128) -> Self {
        Int::from_i128(v)
    }
}

impl From<u128> for Int {
    fn from(v: u128) -> Self {
        if v <= SMALL_MAX as u128 {
            Int::Small(v as i64)
        } else {
            Int::Large(Box::new(BigInt::from(v)))
        }
    }
}

impl From<BigInt> for Int {
    fn from(v: BigInt) -> Self {
        Int::from_bigint(v)
    }
}

impl PartialOrd for Int {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Int {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Int::Small(a), Int::Small(b)) => a.cmp(b),
            // A canonical Large has magnitude above every Small.
            (Int::Small(_), Int::Large(b)) => {
                if b.is_negative() {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (Int::Large(a), Int::Small(_)) => {
                if a.is_negative() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (Int::Large(a), Int::Large(b)) => a.as_ref().cmp(b.as_ref()),
        }
    }
}

impl Neg for &Int {
    type Output = Int;

    fn neg(self) -> Int {
        match self {
            Int::Small(v) => Int::Small(-v),
            Int::Large(b) => Int::Large(Box::new(-&**b)),
        }
    }
}

impl Neg for Int {
    type Output = Int;

    fn neg(self) -> Int {
        -&self
    }
}

impl Add for &Int {
    type Output = Int;

    fn add(self, rhs: &Int) -> Int {
        match (self, rhs) {
            // |a| + |b| <= 2 * SMALL_MAX < i64::MAX, so no overflow check.
            (Int::Small(a), Int::Small(b)) => Int::from(a + b),
            _ => Int::from_bigint(&*self.big() + &*rhs.big()),
        }
    }
}

impl Sub for &Int {
    type Output = Int;

    fn sub(self, rhs: &Int) -> Int {
        match (self, rhs) {
            (Int::Small(a), Int::Small(b)) => Int::from(a - b),
            _ => Int::from_bigint(&*self.big() - &*rhs.big()),
        }
    }
}

impl Mul for &Int {
    type Output = Int;

    fn mul(self, rhs: &Int) -> Int {
        match (self, rhs) {
            (Int::Small(a), Int::Small(b)) => Int::from_i128(*a as i128 * *b as i128),
            _ => Int::from_bigint(&*self.big() * &*rhs.big()),
        }
    }
}

impl Add for Int {
    type Output = Int;

    fn add(self, rhs: Int) -> Int {
        &self + &rhs
    }
}

impl Sub for Int {
    type Output = Int;

    fn sub(self, rhs: Int) -> Int {
        &self - &rhs
    }
}

impl Mul for Int {
    type Output = Int;

    fn mul(self, rhs: Int) -> Int {
        &self * &rhs
    }
}

impl Add<i64> for &Int {
    type Output = Int;

    fn add(self, rhs: i64) -> Int {
        match self {
            Int::Small(a) => Int::from_i128(*a as i128 + rhs as i128),
            Int::Large(b) => Int::from_bigint(&**b + BigInt::from(rhs)),
        }
    }
}

impl Sub<i64> for &Int {
    type Output = Int;

    fn sub(self, rhs: i64) -> Int {
        match self {
            Int::Small(a) => Int::from_i128(*a as i128 - rhs as i128),
            Int::Large(b) => Int::from_bigint(&**b - BigInt::from(rhs)),
        }
    }
}

impl Mul<i64> for &Int {
    type Output = Int;

    fn mul(self, rhs: i64) -> Int {
        match self {
            Int::Small(a) => Int::from_i128(*a as i128 * rhs as i128),
            Int::Large(b) => Int::from_bigint(&**b * BigInt::from(rhs)),
        }
    }
}

impl Mul<u64> for &Int {
    type Output = Int;

    fn mul(self, rhs: u64) -> Int {
        match self {
            Int::Small(a) => Int::from_i128(*a as i128 * rhs as i128),
            Int::Large(b) => Int::from_bigint(&**b * BigInt::from(rhs)),
        }
    }
}

// The in-place forms compute into a temporary before writing, so the
// right-hand side may alias the destination.
impl AddAssign<&Int> for Int {
    fn add_assign(&mut self, rhs: &Int) {
        *self = &*self + rhs;
    }
}

impl SubAssign<&Int> for Int {
    fn sub_assign(&mut self, rhs: &Int) {
        *self = &*self - rhs;
    }
}

impl MulAssign<&Int> for Int {
    fn mul_assign(&mut self, rhs: &Int) {
        *self = &*self * rhs;
    }
}
