//! Word-level half-GCD
//!
//! The Lehmer strategy runs Euclidean steps on the two leading machine
//! words of the operands, with a word-sized 2x2 matrix, and commits a
//! quotient only while it is provably valid for every full-precision pair
//! consistent with the truncated view. The validity test is the same
//! interval predicate the full engine uses, evaluated at word scale:
//! with current pair `(a, b)` and candidate matrix `N`, the step is kept iff
//! the open interval `N^-1 (a/(b+1), (a+1)/b)` lies entirely above 1.

use crate::int::Int;
use crate::mat22::Mat22;

/// Word analogue of [`Mat22`]: entries fit one machine word, determinant is
/// a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WordMat {
    pub m11: u64,
    pub m12: u64,
    pub m21: u64,
    pub m22: u64,
    pub det: i8,
}

impl WordMat {
    pub fn identity() -> Self {
        WordMat {
            m11: 1,
            m12: 0,
            m21: 0,
            m22: 1,
            det: 1,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == WordMat::identity()
    }

    pub fn to_mat22(self) -> Mat22 {
        Mat22 {
            a11: Int::from(self.m11),
            a12: Int::from(self.m12),
            a21: Int::from(self.m21),
            a22: Int::from(self.m22),
            det: i32::from(self.det),
        }
    }
}

/// Speculative Euclidean reduction of a double-word pair.
///
/// Requires `a > b > 0`. Runs at most `max_terms` division steps, stopping
/// early when a quotient or a matrix entry would overflow a word, or when
/// the word-scale validity predicate rejects the step. When `stop` is
/// nonzero, additionally refuses any step whose word remainder is not
/// safely above `stop` (the margin covers the truncation error bound, the
/// sum of the candidate matrix entries), so the full-precision remainder is
/// guaranteed to stay above `stop << shift`.
///
/// Returns the accumulated matrix and the committed quotients.
pub(crate) fn hgcd_words(
    mut a: u128,
    mut b: u128,
    max_terms: usize,
    stop: u128,
) -> (WordMat, Vec<u64>) {
    debug_assert!(a > b && b > 0);
    let mut m = WordMat::identity();
    let mut terms = Vec::new();

    while terms.len() < max_terms && b != 0 {
        let q = a / b;
        let r = a % b;

        let q64 = match u64::try_from(q) {
            Ok(v) => v,
            Err(_) => break,
        };

        // Candidate entries; the second column is the current first column.
        let n11 = m.m11 as u128 * q + m.m12 as u128;
        let n21 = m.m21 as u128 * q + m.m22 as u128;
        if n11 > u64::MAX as u128 || n21 > u64::MAX as u128 {
            break;
        }
        let (n12, n22) = (m.m11 as u128, m.m21 as u128);
        let ndet = -m.det;

        // Validity for the candidate pair (b, r).
        let ok = if ndet == 1 {
            r > n21 && b - r >= n11 + n12
        } else {
            r > n11 && b - r >= n21 + n22
        };
        if !ok {
            break;
        }

        if stop != 0 {
            let margin = n11 + n12 + n21 + n22;
            match stop.checked_add(margin) {
                Some(bound) if r > bound => {}
                _ => break,
            }
        }

        m = WordMat {
            m11: n11 as u64,
            m12: n12 as u64,
            m21: n21 as u64,
            m22: n22 as u64,
            det: ndet,
        };
        a = b;
        b = r;
        terms.push(q64);
    }

    (m, terms)
}

/// The two leading machine words of a nonnegative value, as the floor of
/// `x / 2^k`. The caller picks `k` so the result fits 128 bits.
pub(crate) fn shifted_u128(x: &Int, k: u64) -> u128 {
    debug_assert!(!x.is_negative());
    x.shr(k).to_u128().expect("two-word leading window")
}

/// One bulk Lehmer reduction of a big pair. Returns the number of Euclidean
/// steps applied (zero when no step could be validated).
pub(crate) fn lehmer_step_pair(a: &mut Int, b: &mut Int) -> usize {
    let mut d0 = Int::zero();
    let mut d1 = Int::zero();
    lehmer_step(a, b, &mut d0, &mut d1, &Int::zero(), false)
}

/// One bulk Lehmer reduction of a big pair, with a cofactor row carried
/// along under the same transformation. `stop` bounds the reduction from
/// below: no step may take `b` to `stop` or less.
pub(crate) fn lehmer_step_row(
    a: &mut Int,
    b: &mut Int,
    row0: &mut Int,
    row1: &mut Int,
    stop: &Int,
) -> usize {
    lehmer_step(a, b, row0, row1, stop, true)
}

fn lehmer_step(
    a: &mut Int,
    b: &mut Int,
    row0: &mut Int,
    row1: &mut Int,
    stop: &Int,
    with_row: bool,
) -> usize {
    debug_assert!(*a > *b && b.is_positive());
    let k = a.bits().saturating_sub(128);
    let wa = shifted_u128(a, k);
    let wb = match b.shr(k).to_u128() {
        Some(v) => v,
        None => return 0,
    };
    if wb == 0 || wa <= wb {
        return 0;
    }
    let wstop = if stop.is_zero() {
        0
    } else {
        match stop.shr(k).to_u128() {
            // The target is at or above the truncated window: nothing to do.
            Some(v) => match v.checked_add(1) {
                Some(v1) if v1 < wb => v1,
                _ => return 0,
            },
            None => return 0,
        }
    };

    let (wm, wq) = hgcd_words(wa, wb, usize::MAX, wstop);
    if wq.is_empty() {
        return 0;
    }
    let m = wm.to_mat22();
    m.apply_inv_pair(a, b);
    if with_row {
        m.apply_inv_pair(row0, row1);
    }
    debug_assert!(*a > *b && b.is_positive());
    wq.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_hgcd_reconstructs_input() {
        let (a0, b0) = (0xfedc_ba98_7654_3210_u128 << 40, 0x1234_5678_9abc_def0_u128 << 40);
        let (m, terms) = hgcd_words(a0, b0, usize::MAX, 0);
        assert!(!terms.is_empty());

        // Forward action of the matrix rebuilds the original pair from the
        // reduced one.
        let mut x = Int::from(a0);
        let mut y = Int::from(b0);
        m.to_mat22().apply_inv_pair(&mut x, &mut y);
        assert!(x > y && y.is_positive());
        let mut rx = x.clone();
        let mut ry = y.clone();
        m.to_mat22().apply_pair(&mut rx, &mut ry);
        assert_eq!(rx, Int::from(a0));
        assert_eq!(ry, Int::from(b0));

        // The committed quotients are the leading Euclidean quotients.
        let (mut ea, mut eb) = (a0, b0);
        for &q in &terms {
            let expect = ea / eb;
            assert_eq!(u128::from(q), expect);
            let r = ea % eb;
            ea = eb;
            eb = r;
        }
    }

    #[test]
    fn test_word_hgcd_respects_budget() {
        let (_, terms) = hgcd_words(0xffff_ffff_ffff_fff1, 0x1000_0000_0000_0001, 2, 0);
        assert!(terms.len() <= 2);
    }

    #[test]
    fn test_word_hgcd_fibonacci_tail() {
        // Consecutive Fibonacci numbers give all-ones quotients; the run
        // must stop strictly before the pair is exhausted.
        let (mut f0, mut f1) = (1u128, 1u128);
        for _ in 0..80 {
            let f2 = f0 + f1;
            f0 = f1;
            f1 = f2;
        }
        let (m, terms) = hgcd_words(f1, f0, usize::MAX, 0);
        assert!(!terms.is_empty());
        let mut x = Int::from(f1);
        let mut y = Int::from(f0);
        m.to_mat22().apply_inv_pair(&mut x, &mut y);
        assert!(x > y && y.is_positive());
    }

    #[test]
    fn test_lehmer_step_pair_matches_euclid() {
        let mut a = Int::from(0x0123_4567_89ab_cdef_u64).shl(200);
        let mut b = Int::from(0x0000_ffff_1234_5678_u64).shl(190);
        let a0 = a.clone();
        let b0 = b.clone();
        let n = lehmer_step_pair(&mut a, &mut b);
        assert!(n > 0);

        // Replay the same number of schoolbook steps.
        let (mut ea, mut eb) = (a0, b0);
        for _ in 0..n {
            let r = ea.div_rem_floor(&eb).1;
            ea = std::mem::replace(&mut eb, r);
        }
        assert_eq!((a, b), (ea, eb));
    }

    #[test]
    fn test_lehmer_step_row_stop_bound() {
        let mut a = Int::from(0x0123_4567_89ab_cdef_u64).shl(300);
        let mut b = Int::from(0x0000_ffff_1234_5678_u64).shl(295);
        let stop = Int::one().shl(250);
        let mut r0 = Int::zero();
        let mut r1 = Int::one();
        lehmer_step_row(&mut a, &mut b, &mut r0, &mut r1, &stop);
        assert!(b > stop, "reduction must not cross the stop bound");
    }
}
