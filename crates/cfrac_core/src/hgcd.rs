//! Half-GCD engine
//!
//! Advances the Euclidean algorithm on a pair `a > b > 0` by roughly half
//! its remaining steps, accumulating the quotients into a [`Mat22`]. Every
//! committed quotient is valid not just for `a/b` but for every real in the
//! uncertainty interval `(a/(b+1), (a+1)/b)`; the `ok` predicate below is
//! the exact characterization of that property and is the invariant the
//! whole engine preserves.
//!
//! Three strategies, picked by the gap between the operand size and the
//! accumulated matrix size:
//!
//! - `gauss`: one schoolbook division step, applied speculatively and
//!   retracted if the invariant would break;
//! - `lehmer`: a run of word-sized steps on the two leading machine words,
//!   committed in bulk;
//! - `split`: shift the pair down by half the excess bit length, recurse on
//!   the truncated pair, and apply the sub-matrix at full precision. This
//!   is what makes the engine softly linear, O(M(n) log n) instead of the
//!   O(n^2) of repeated schoolbook steps.
//!
//! Bulk applications are validated after the fact and rolled back one
//! quotient at a time until the invariant holds again; "cannot proceed" is
//! a terminal state, not an error.

use crate::int::Int;
use crate::mat22::Mat22;
use crate::terms::TermList;
use crate::words::{hgcd_words, shifted_u128};
use std::mem;

/// Below this excess (operand bits minus matrix bits), schoolbook steps.
pub(crate) const HGCD_LEHMER_CUTOFF: u64 = 192;
/// Above this excess, the recursive split strategy.
pub(crate) const HGCD_SPLIT_CUTOFF: u64 = 4096;

enum State {
    Dispatch,
    Gauss,
    Lehmer,
    Split,
    Done,
}

/// The progress invariant: with accumulated matrix `m` and current pair
/// `(a, b)`, the open interval `m^-1 (a/(b+1), (a+1)/b)` consists only of
/// reals above 1.
pub(crate) fn hgcd_ok(m: &Mat22, a: &Int, b: &Int) -> bool {
    if !b.is_positive() || a <= b {
        return false;
    }
    let amb = a - b;
    if m.det == 1 {
        *b > m.a21 && amb >= &m.a11 + &m.a12
    } else {
        *b > m.a11 && amb >= &m.a21 + &m.a22
    }
}

/// Half-GCD reduction of `(a, b)`, in place.
///
/// Requires `a > b > 0`. On return `m` holds the accumulated quotient
/// matrix (reset to the identity on entry), the pair has been replaced by
/// `m^-1` applied to the input, and the `ok` invariant holds for the final
/// state whenever any progress was made. When `s` is given, the committed
/// quotients are appended to it and its capacity bounds the reduction.
pub fn hgcd(a: &mut Int, b: &mut Int, m: &mut Mat22, mut s: Option<&mut TermList>) {
    debug_assert!(*a > *b && b.is_positive());
    *m = Mat22::identity();

    let mut state = State::Dispatch;
    loop {
        state = match state {
            State::Dispatch => {
                if s.as_deref().map_or(false, |s| s.is_full()) {
                    State::Done
                } else {
                    let excess = a.bits().saturating_sub(m.bits());
                    if excess < HGCD_LEHMER_CUTOFF {
                        State::Gauss
                    } else if excess < HGCD_SPLIT_CUTOFF {
                        State::Lehmer
                    } else {
                        State::Split
                    }
                }
            }
            State::Gauss => gauss_step(a, b, m, s.as_deref_mut()),
            State::Lehmer => lehmer_bulk(a, b, m, s.as_deref_mut()),
            State::Split => split_rounds(a, b, m, s.as_deref_mut()),
            State::Done => break,
        };
    }
    debug_assert!(m.is_identity() || hgcd_ok(m, a, b));
}

/// One speculative schoolbook step.
fn gauss_step(a: &mut Int, b: &mut Int, m: &mut Mat22, s: Option<&mut TermList>) -> State {
    if s.as_deref().map_or(false, |s| s.is_full()) {
        return State::Done;
    }
    let (q, r) = a.div_rem_floor(b);
    m.rmul_elem(&q);
    if hgcd_ok(m, b, &r) {
        *a = mem::replace(b, r);
        if let Some(s) = s {
            s.push(q);
        }
        State::Dispatch
    } else {
        m.rmul_elem_inv(&q);
        State::Done
    }
}

/// Bulk word-level steps on the two leading machine words.
fn lehmer_bulk(a: &mut Int, b: &mut Int, m: &mut Mat22, s: Option<&mut TermList>) -> State {
    let k = a.bits().saturating_sub(128);
    let wb = match b.shr(k).to_u128() {
        Some(v) => v,
        None => return State::Gauss,
    };
    if wb == 0 {
        return State::Gauss;
    }
    let wa = shifted_u128(a, k);
    if wa <= wb {
        return State::Gauss;
    }

    let budget = s.as_deref().map_or(usize::MAX, |s| s.remaining());
    if budget == 0 {
        return State::Done;
    }
    let (wm, mut wq) = hgcd_words(wa, wb, budget, 0);
    if wq.is_empty() {
        return State::Gauss;
    }

    let sub = wm.to_mat22();
    sub.apply_inv_pair(a, b);
    m.rmul(&sub);

    // Validate the bulk application; roll back the newest quotients until
    // the invariant holds again.
    loop {
        if hgcd_ok(m, a, b) {
            break;
        }
        match wq.pop() {
            Some(q) => {
                let qi = Int::from(q);
                m.rmul_elem_inv(&qi);
                let prev = &(&qi * &*a) + &*b;
                *b = mem::replace(a, prev);
            }
            None => break,
        }
    }
    if wq.is_empty() {
        return State::Gauss;
    }
    if let Some(s) = s {
        s.append_words(&wq);
    }
    State::Gauss
}

/// Up to two rounds of truncate-recurse-apply, then a schoolbook step.
fn split_rounds(a: &mut Int, b: &mut Int, m: &mut Mat22, mut s: Option<&mut TermList>) -> State {
    for _ in 0..2 {
        let excess = a.bits().saturating_sub(m.bits());
        if excess < HGCD_SPLIT_CUTOFF {
            break;
        }
        let k = (a.bits() + m.bits()) / 2;
        let mut sa = a.shr(k);
        let mut sb = b.shr(k);
        if !sb.is_positive() || sa <= sb {
            break;
        }

        let budget = s.as_deref().map_or(usize::MAX, |s| s.remaining());
        if budget == 0 {
            return State::Done;
        }
        let mut n = Mat22::identity();
        let mut sub_terms = TermList::new(budget);
        hgcd(&mut sa, &mut sb, &mut n, Some(&mut sub_terms));
        if n.is_identity() {
            break;
        }

        n.apply_inv_pair(a, b);
        m.rmul(&n);

        loop {
            if hgcd_ok(m, a, b) {
                break;
            }
            match sub_terms.pop() {
                Some(q) => {
                    m.rmul_elem_inv(&q);
                    let prev = &(&q * &*a) + &*b;
                    *b = mem::replace(a, prev);
                }
                None => break,
            }
        }
        if sub_terms.is_empty() {
            break;
        }
        if let Some(s) = s.as_deref_mut() {
            for q in sub_terms.iter() {
                s.push(q.clone());
            }
        }
    }
    State::Gauss
}
