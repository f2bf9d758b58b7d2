//! 2x2 quotient accumulation matrix
//!
//! A [`Mat22`] collects continued-fraction steps as a product of elementary
//! matrices `[[q, 1], [1, 0]]`. Entries are nonnegative; the sign of the
//! determinant is tracked separately and is always +1 or -1, so the inverse
//! is the adjugate up to sign and applying it needs no division.

use crate::int::Int;
use std::mem;

/// 2x2 matrix of nonnegative big integers with determinant +1 or -1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mat22 {
    pub a11: Int,
    pub a12: Int,
    pub a21: Int,
    pub a22: Int,
    pub det: i32,
}

impl Mat22 {
    /// The identity, determinant +1.
    pub fn identity() -> Self {
        Mat22 {
            a11: Int::one(),
            a12: Int::zero(),
            a21: Int::zero(),
            a22: Int::one(),
            det: 1,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.det == 1
            && self.a11.is_one()
            && self.a12.is_zero()
            && self.a21.is_zero()
            && self.a22.is_one()
    }

    /// Largest bit length among the four entries.
    pub fn bits(&self) -> u64 {
        self.a11
            .bits()
            .max(self.a12.bits())
            .max(self.a21.bits())
            .max(self.a22.bits())
    }

    /// Record one continued-fraction term: right-multiply by
    /// `[[q, 1], [1, 0]]`, flipping the determinant.
    pub fn rmul_elem(&mut self, q: &Int) {
        debug_assert!(!q.is_negative());
        let t = &(&self.a11 * q) + &self.a12;
        self.a12 = mem::replace(&mut self.a11, t);
        let t = &(&self.a21 * q) + &self.a22;
        self.a22 = mem::replace(&mut self.a21, t);
        self.det = -self.det;
        self.debug_check();
    }

    /// Undo [`rmul_elem`](Self::rmul_elem): right-multiply by the inverse of
    /// the elementary matrix for `q`. Only meaningful as a retraction; the
    /// nonnegativity of entries is restored, not guaranteed mid-flight.
    pub fn rmul_elem_inv(&mut self, q: &Int) {
        let t = &self.a11 - &(q * &self.a12);
        self.a11 = mem::replace(&mut self.a12, t);
        let t = &self.a21 - &(q * &self.a22);
        self.a21 = mem::replace(&mut self.a22, t);
        self.det = -self.det;
        self.debug_check();
    }

    /// Right-multiply by another matrix.
    pub fn rmul(&mut self, other: &Mat22) {
        let b11 = &(&self.a11 * &other.a11) + &(&self.a12 * &other.a21);
        let b12 = &(&self.a11 * &other.a12) + &(&self.a12 * &other.a22);
        let b21 = &(&self.a21 * &other.a11) + &(&self.a22 * &other.a21);
        let b22 = &(&self.a21 * &other.a12) + &(&self.a22 * &other.a22);
        self.a11 = b11;
        self.a12 = b12;
        self.a21 = b21;
        self.a22 = b22;
        self.det *= other.det;
        self.debug_check();
    }

    /// Right-multiply by the inverse of `other`; since `det(other)` is a
    /// unit, the inverse is its adjugate times the determinant sign.
    pub fn rmul_inv(&mut self, other: &Mat22) {
        let mut b11 = &(&self.a11 * &other.a22) - &(&self.a12 * &other.a21);
        let mut b12 = &(&self.a12 * &other.a11) - &(&self.a11 * &other.a12);
        let mut b21 = &(&self.a21 * &other.a22) - &(&self.a22 * &other.a21);
        let mut b22 = &(&self.a22 * &other.a11) - &(&self.a21 * &other.a12);
        if other.det < 0 {
            b11 = -&b11;
            b12 = -&b12;
            b21 = -&b21;
            b22 = -&b22;
        }
        self.a11 = b11;
        self.a12 = b12;
        self.a21 = b21;
        self.a22 = b22;
        self.det *= other.det;
        self.debug_check();
    }

    /// Apply the inverse to a column vector in place:
    /// `(x, y) <- M^-1 (x, y)`.
    pub fn apply_inv_pair(&self, x: &mut Int, y: &mut Int) {
        let nx = &(&self.a22 * &*x) - &(&self.a12 * &*y);
        let ny = &(&self.a11 * &*y) - &(&self.a21 * &*x);
        if self.det >= 0 {
            *x = nx;
            *y = ny;
        } else {
            *x = -&nx;
            *y = -&ny;
        }
    }

    /// Apply the inverse to two column vectors at once.
    pub fn apply_inv_quad(&self, xn: &mut Int, xd: &mut Int, yn: &mut Int, yd: &mut Int) {
        self.apply_inv_pair(xn, xd);
        self.apply_inv_pair(yn, yd);
    }

    /// Forward action on a column vector:
    /// `(x, y) <- (a11*x + a12*y, a21*x + a22*y)`.
    pub fn apply_pair(&self, x: &mut Int, y: &mut Int) {
        let nx = &(&self.a11 * &*x) + &(&self.a12 * &*y);
        let ny = &(&self.a21 * &*x) + &(&self.a22 * &*y);
        *x = nx;
        *y = ny;
    }

    fn debug_check(&self) {
        debug_assert!(self.det == 1 || self.det == -1);
        debug_assert_eq!(
            &(&self.a11 * &self.a22) - &(&self.a12 * &self.a21),
            Int::from(i64::from(self.det)),
            "determinant identity"
        );
    }
}

impl Default for Mat22 {
    fn default() -> Self {
        Mat22::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    fn det_of(m: &Mat22) -> Int {
        &(&m.a11 * &m.a22) - &(&m.a12 * &m.a21)
    }

    #[test]
    fn test_identity() {
        let m = Mat22::identity();
        assert!(m.is_identity());
        assert_eq!(det_of(&m), Int::one());
        assert_eq!(m.bits(), 1);
    }

    #[test]
    fn test_elem_and_inverse() {
        let mut m = Mat22::identity();
        let q = Int::from(3i64);
        m.rmul_elem(&q);
        assert_eq!(m.a11, Int::from(3i64));
        assert_eq!(m.a12, Int::one());
        assert_eq!(m.a21, Int::one());
        assert_eq!(m.a22, Int::zero());
        assert_eq!(m.det, -1);

        m.rmul_elem_inv(&q);
        assert!(m.is_identity());
    }

    #[test]
    fn test_invariant_under_random_sequences() {
        let mut rng = XorShiftRng::from_seed([3u8; 16]);
        let mut m = Mat22::identity();
        let mut history: Vec<Int> = Vec::new();
        for _ in 0..200 {
            if rng.gen_range(0..4) == 0 && !history.is_empty() {
                let q = history.pop().expect("nonempty");
                m.rmul_elem_inv(&q);
            } else {
                let q = Int::from(rng.gen_range(0i64..1000));
                m.rmul_elem(&q);
                history.push(q);
            }
            assert!(m.det == 1 || m.det == -1);
            assert_eq!(det_of(&m), Int::from(i64::from(m.det)));
        }
        // Unwind completely back to the identity.
        while let Some(q) = history.pop() {
            m.rmul_elem_inv(&q);
        }
        assert!(m.is_identity());
    }

    #[test]
    fn test_rmul_rmul_inv_cancel() {
        let mut a = Mat22::identity();
        for q in [2i64, 5, 1, 7] {
            a.rmul_elem(&Int::from(q));
        }
        let mut b = Mat22::identity();
        for q in [3i64, 1, 4] {
            b.rmul_elem(&Int::from(q));
        }
        let snapshot = a.clone();
        a.rmul(&b);
        assert_eq!(a.det, snapshot.det * b.det);
        assert_eq!(det_of(&a), Int::from(i64::from(a.det)));
        a.rmul_inv(&b);
        assert_eq!(a, snapshot);
    }

    #[test]
    fn test_apply_inverse_undoes_forward() {
        let mut m = Mat22::identity();
        for q in [1i64, 2, 2, 9, 4] {
            m.rmul_elem(&Int::from(q));
        }
        let mut x = Int::from(1234567i64);
        let mut y = Int::from(7654i64);
        let (x0, y0) = (x.clone(), y.clone());
        m.apply_pair(&mut x, &mut y);
        m.apply_inv_pair(&mut x, &mut y);
        assert_eq!((x, y), (x0, y0));
    }
}
