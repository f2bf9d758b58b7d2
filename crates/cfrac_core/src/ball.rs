//! Continued fractions of rational balls
//!
//! A [`Ball`] is either an exact rational point or a closed interval of
//! rationals. The engine below emits continued-fraction terms that are
//! valid for *every* value in the ball: a term is committed only when the
//! transformed ball still lies entirely above 1 with its endpoints in
//! order. For an interval this means the output is the common convergent
//! prefix of all reals in it; the engine stops, without error, as soon as
//! the two endpoints disagree on the next quotient.
//!
//! The strategy mix mirrors the pair engine: schoolbook steps, bulk
//! word-level Lehmer steps, and two divide-and-conquer shortcuts. An exact
//! point is truncated into an interval ball and recursed on (`split`); an
//! interval whose endpoints agree on enough leading bits is handed to the
//! plain pair engine on a truncated pair whose uncertainty interval
//! provably contains the ball (`chop`).

use crate::hgcd::hgcd;
use crate::int::Int;
use crate::mat22::Mat22;
use crate::terms::TermList;
use std::mem;

/// Operand size below which only schoolbook steps are used.
const BALL_LEHMER_CUTOFF: u64 = 192;
/// Operand size above which the divide-and-conquer strategies kick in.
const BALL_SPLIT_CUTOFF: u64 = 4096;
/// Minimum number of agreeing leading bits before `chop` pays off.
const CHOP_AGREE_CUTOFF: u64 = 192;

/// An exact rational point, or a closed interval of rationals.
///
/// The left endpoint lives in `num/den`; when `exact` is false the right
/// endpoint lives in `right_num/right_den` (unused otherwise). The engine
/// keeps every endpoint above 1 and the interval ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ball {
    pub num: Int,
    pub den: Int,
    pub right_num: Int,
    pub right_den: Int,
    pub exact: bool,
}

impl Ball {
    /// An exact point `num/den`.
    pub fn exact(num: Int, den: Int) -> Self {
        Ball {
            num,
            den,
            right_num: Int::zero(),
            right_den: Int::zero(),
            exact: true,
        }
    }

    /// The closed interval `[num/den, right_num/right_den]`.
    pub fn interval(num: Int, den: Int, right_num: Int, right_den: Int) -> Self {
        Ball {
            num,
            den,
            right_num,
            right_den,
            exact: false,
        }
    }

    /// The engine invariant: every value in the ball is above 1, and the
    /// endpoints of an interval are ordered.
    pub fn is_valid(&self) -> bool {
        if !self.den.is_positive() || self.num <= self.den {
            return false;
        }
        if self.exact {
            return true;
        }
        if !self.right_den.is_positive() || self.right_num <= self.right_den {
            return false;
        }
        &self.num * &self.right_den <= &self.right_num * &self.den
    }
}

enum State {
    Dispatch,
    Gauss,
    Lehmer,
    Split,
    Chop,
    Done,
}

/// Emit continued-fraction terms valid for every value of `x`, in place.
///
/// Terms are appended to `s` up to its capacity; when `m` is given it
/// accumulates the product of the elementary quotient matrices (reset to
/// the identity on entry). On return `x` holds the transformed ball, still
/// satisfying [`Ball::is_valid`]. Termination without a full list means the
/// remaining quotient is genuinely undetermined (interval endpoints
/// disagree) or the exact remainder is an integer.
pub fn ball_get_cfrac(s: &mut TermList, mut m: Option<&mut Mat22>, x: &mut Ball) {
    debug_assert!(x.is_valid());
    if let Some(m) = m.as_deref_mut() {
        *m = Mat22::identity();
    }

    let mut state = State::Dispatch;
    loop {
        state = match state {
            State::Dispatch => {
                if s.is_full() {
                    State::Done
                } else {
                    let bits = x.num.bits();
                    if bits < BALL_LEHMER_CUTOFF {
                        State::Gauss
                    } else if bits < BALL_SPLIT_CUTOFF {
                        State::Lehmer
                    } else if x.exact {
                        State::Split
                    } else {
                        State::Chop
                    }
                }
            }
            State::Gauss => gauss_term(x, &mut m, s),
            State::Lehmer => lehmer_bulk(x, &mut m, s),
            State::Split => split_exact(x, &mut m, s),
            State::Chop => chop_interval(x, &mut m, s),
            State::Done => break,
        };
    }
    debug_assert!(x.is_valid());
}

/// One term from the floor of the left endpoint, committed only when the
/// whole transformed ball stays above 1.
fn gauss_term(x: &mut Ball, m: &mut Option<&mut Mat22>, s: &mut TermList) -> State {
    if s.is_full() {
        return State::Done;
    }
    let (q, r) = x.num.div_rem_floor(&x.den);
    if !r.is_positive() {
        // The left endpoint is exactly an integer: no further term is
        // valid for it.
        return State::Done;
    }
    if x.exact {
        // x <- den / r.
        let old_den = mem::replace(&mut x.den, r);
        x.num = old_den;
    } else {
        // The right endpoint must want the same integer part, strictly:
        // right < q + 1, otherwise a point of the ball maps to <= 1.
        let bound = &(&q + 1) * &x.right_den;
        if x.right_num >= bound {
            return State::Done;
        }
        // x <- 1/(x - q) reverses the interval: the old right endpoint
        // becomes the new left one.
        let new_ld = &x.right_num - &(&q * &x.right_den);
        let new_ln = x.right_den.clone();
        let new_rd = r;
        let new_rn = mem::replace(&mut x.den, new_ld);
        x.num = new_ln;
        x.right_num = new_rn;
        x.right_den = new_rd;
    }
    if let Some(m) = m.as_deref_mut() {
        m.rmul_elem(&q);
    }
    s.push(q);
    State::Dispatch
}

/// Undo one committed term: the forward elementary step.
fn unstep(x: &mut Ball, q: &Int) {
    if x.exact {
        let new_num = &(q * &x.num) + &x.den;
        x.den = mem::replace(&mut x.num, new_num);
    } else {
        let b_num = &(q * &x.right_num) + &x.right_den;
        let b_den = x.right_num.clone();
        let b_rnum = &(q * &x.num) + &x.den;
        let b_rden = x.num.clone();
        x.num = b_num;
        x.den = b_den;
        x.right_num = b_rnum;
        x.right_den = b_rden;
    }
}

/// Apply a bulk matrix inverse to the ball. A negative determinant makes
/// the Moebius action order-reversing, so the endpoints swap.
fn apply_bulk(x: &mut Ball, sub: &Mat22) {
    if x.exact {
        sub.apply_inv_pair(&mut x.num, &mut x.den);
    } else {
        sub.apply_inv_quad(&mut x.num, &mut x.den, &mut x.right_num, &mut x.right_den);
        if sub.det < 0 {
            mem::swap(&mut x.num, &mut x.right_num);
            mem::swap(&mut x.den, &mut x.right_den);
        }
    }
}

/// Bulk word-level steps on the two leading words of the left endpoint,
/// validated against the whole ball.
fn lehmer_bulk(x: &mut Ball, m: &mut Option<&mut Mat22>, s: &mut TermList) -> State {
    let k = x.num.bits().saturating_sub(128);
    let wa = match x.num.shr(k).to_u128() {
        Some(v) => v,
        None => return State::Gauss,
    };
    let wb = match x.den.shr(k).to_u128() {
        Some(v) => v,
        None => return State::Gauss,
    };
    if wb == 0 || wa <= wb {
        return State::Gauss;
    }
    if s.remaining() == 0 {
        return State::Done;
    }

    let (wm, mut wq) = crate::words::hgcd_words(wa, wb, s.remaining(), 0);
    if wq.is_empty() {
        return State::Gauss;
    }
    let sub = wm.to_mat22();
    apply_bulk(x, &sub);

    let mut popped: Vec<u64> = Vec::new();
    loop {
        if x.is_valid() {
            break;
        }
        match wq.pop() {
            Some(q) => {
                unstep(x, &Int::from(q));
                popped.push(q);
            }
            None => break,
        }
    }
    if wq.is_empty() {
        // Fully retracted; the ball is back to its previous state.
        return State::Gauss;
    }
    if let Some(m) = m.as_deref_mut() {
        m.rmul(&sub);
        for &q in &popped {
            m.rmul_elem_inv(&Int::from(q));
        }
    }
    s.append_words(&wq);
    State::Gauss
}

/// Divide and conquer on an exact point: truncating the fraction yields an
/// interval ball containing it, whose common terms are computed recursively
/// at half size.
fn split_exact(x: &mut Ball, m: &mut Option<&mut Mat22>, s: &mut TermList) -> State {
    for _ in 0..2 {
        let nb = x.num.bits();
        if nb < BALL_SPLIT_CUTOFF {
            break;
        }
        let k = nb / 2;
        let tn = x.num.shr(k);
        let td = x.den.shr(k);
        if !td.is_positive() {
            break;
        }
        let mut sub_ball = Ball::interval(tn.clone(), &td + 1, &tn + 1, td);
        if !sub_ball.is_valid() {
            break;
        }
        if s.remaining() == 0 {
            return State::Done;
        }
        let mut sub_m = Mat22::identity();
        let mut sub_s = TermList::new(s.remaining());
        ball_get_cfrac(&mut sub_s, Some(&mut sub_m), &mut sub_ball);
        if sub_m.is_identity() {
            break;
        }

        sub_m.apply_inv_pair(&mut x.num, &mut x.den);
        let mut popped: Vec<Int> = Vec::new();
        loop {
            if x.is_valid() {
                break;
            }
            match sub_s.pop() {
                Some(q) => {
                    unstep(x, &q);
                    popped.push(q);
                }
                None => break,
            }
        }
        if sub_s.is_empty() {
            break;
        }
        if let Some(m) = m.as_deref_mut() {
            m.rmul(&sub_m);
            for q in &popped {
                m.rmul_elem_inv(q);
            }
        }
        for q in sub_s.iter() {
            s.push(q.clone());
        }
    }
    State::Gauss
}

/// Shortcut for an interval whose endpoints agree on many leading bits:
/// run the plain pair engine on a truncation of the left endpoint whose
/// uncertainty interval contains the whole ball.
fn chop_interval(x: &mut Ball, m: &mut Option<&mut Mat22>, s: &mut TermList) -> State {
    // Tail bit count: the number of leading bits the endpoints agree on,
    // from the closed form width (R - L) = diff / (den * right_den).
    let diff = &(&x.right_num * &x.den) - &(&x.num * &x.right_den);
    debug_assert!(!diff.is_negative());
    let scale = x.den.bits() + x.right_den.bits();
    let agree = if diff.is_zero() {
        u64::MAX
    } else {
        scale.saturating_sub(diff.bits())
    };
    if agree < CHOP_AGREE_CUTOFF {
        return State::Lehmer;
    }

    // Keep roughly (agree - 64) denominator bits; the slack absorbs the
    // position of the ball inside the truncated uncertainty interval.
    let k = x.den.bits().saturating_sub(agree.saturating_sub(64));
    let a = x.num.shr(k);
    let b = x.den.shr(k);
    if !b.is_positive() || a <= b {
        return State::Lehmer;
    }
    // Containment on the right: R < (A+1)/B. (The left endpoint is inside
    // by construction of the floor truncation.)
    let lhs = &x.right_num * &b;
    let rhs = &(&a + 1) * &x.right_den;
    if lhs >= rhs {
        return State::Lehmer;
    }
    if s.remaining() == 0 {
        return State::Done;
    }

    let mut ha = a;
    let mut hb = b;
    let mut hm = Mat22::identity();
    let mut sub_s = TermList::new(s.remaining());
    hgcd(&mut ha, &mut hb, &mut hm, Some(&mut sub_s));
    if hm.is_identity() {
        return State::Lehmer;
    }

    apply_bulk(x, &hm);
    let mut popped: Vec<Int> = Vec::new();
    loop {
        if x.is_valid() {
            break;
        }
        match sub_s.pop() {
            Some(q) => {
                unstep(x, &q);
                popped.push(q);
            }
            None => break,
        }
    }
    if sub_s.is_empty() {
        return State::Lehmer;
    }
    if let Some(m) = m.as_deref_mut() {
        m.rmul(&hm);
        for q in &popped {
            m.rmul_elem_inv(q);
        }
    }
    for q in sub_s.iter() {
        s.push(q.clone());
    }
    State::Dispatch
}

/// Continued-fraction expansion of `num/den` with at most `limit` terms.
///
/// Returns the terms and a remainder `(rn, rd)` in `[0, 1)` such that the
/// value equals the terms with `rn/rd` added to the innermost one;
/// the remainder is `0/1` exactly when the expansion completed. The
/// expansion is canonical: every term after the first is positive, and a
/// completed expansion ends with a term of at least 2 whenever it has more
/// than one term.
pub fn cfrac(num: &Int, den: &Int, limit: usize) -> (TermList, (Int, Int)) {
    if den.is_zero() {
        panic!("division by zero");
    }
    assert!(limit >= 1, "term budget must be positive");
    let (n0, d0) = if den.is_negative() {
        (-num, -den)
    } else {
        (num.clone(), den.clone())
    };

    let mut terms = TermList::new(limit);
    let (q0, r) = n0.div_rem_floor(&d0);
    terms.push(q0);
    if r.is_zero() {
        return (terms, (Int::zero(), Int::one()));
    }
    if terms.is_full() {
        return (terms, (r, d0));
    }

    // Tail d0/r > 1; the engine takes it from here.
    let mut ball = Ball::exact(d0, r);
    ball_get_cfrac(&mut terms, None, &mut ball);

    // Finish the exact expansion schoolbook-style within the budget.
    while !terms.is_full() {
        let (q, r) = ball.num.div_rem_floor(&ball.den);
        if r.is_zero() {
            terms.push(q);
            return (terms, (Int::zero(), Int::one()));
        }
        terms.push(q);
        let old_den = mem::replace(&mut ball.den, r);
        ball.num = old_den;
    }
    (terms, (ball.den, ball.num))
}

/// Fold a term sequence and remainder back into a rational. Exact inverse
/// of [`cfrac`]: folding its output reproduces the input pair (reduced by
/// the common factor when the expansion completed).
pub fn cfrac_to_rational(terms: &[Int], rem_num: &Int, rem_den: &Int) -> (Int, Int) {
    assert!(!terms.is_empty(), "term sequence must be nonempty");
    let k = terms.len();
    let mut num = &(&terms[k - 1] * rem_den) + rem_num;
    let mut den = rem_den.clone();
    for i in (0..k - 1).rev() {
        let new_num = &(&terms[i] * &num) + &den;
        den = mem::replace(&mut num, new_num);
    }
    (num, den)
}

/// Upper bound on the number of continued-fraction terms of any rational
/// with the given denominator: worst case is the Fibonacci-like all-ones
/// expansion, about `bits / log2(golden ratio)` terms.
pub fn cfrac_bound(den: &Int) -> usize {
    (den.bits() as f64 * 1.4404) as usize + 3
}
