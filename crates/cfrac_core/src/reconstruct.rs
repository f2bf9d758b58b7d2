//! Rational reconstruction
//!
//! Recovers the unique rational `n/d` with `|n| <= N`, `0 < d <= D`,
//! `gcd(n, d) = 1` and `n == a*d (mod m)` from a residue `a` modulo `m`,
//! provided `2*N*D < m`. The extended Euclidean algorithm runs on `(m, a)`,
//! tracking one cofactor row, until the remainder first drops to `N` or
//! below; the stopping state gives the candidate, which still has to pass
//! the size and coprimality checks (failure there is a routine outcome,
//! reported as `None`).
//!
//! Three regimes, picked by the size of `m` for speed, not correctness:
//! a one-word loop, a two-word loop on `u128`/`i128`, and a big-integer
//! loop accelerated by bulk Lehmer steps and, far from the target, by the
//! half-GCD engine on right-shifted operands.

use crate::hgcd::hgcd;
use crate::int::{coprime_u128, coprime_u64, Int};
use crate::mat22::Mat22;
use crate::terms::TermList;
use crate::words::lehmer_step_row;
use std::mem;

/// Excess (bits of the remainder above the target) below which the large
/// regime takes schoolbook steps.
const RR_LEHMER_CUTOFF: u64 = 192;
/// Excess above which the large regime calls the half-GCD engine.
const RR_HGCD_CUTOFF: u64 = 2048;

/// Strategy counters for one reconstruction, in the large regime; the word
/// regimes count their division steps as `gauss_steps`.
#[derive(Debug, Clone, Default)]
pub struct ReconstructStats {
    pub gauss_steps: usize,
    pub lehmer_steps: usize,
    pub hgcd_calls: usize,
}

/// What a bulk Lehmer sub-step achieved.
enum LehmerOutcome {
    /// No word quotient could be validated; take a schoolbook step instead.
    NoProgress,
    /// The pair was reduced but the target was not reached; dispatch again.
    Progress,
    /// The remainder landed in the stopping window `A > N >= B`.
    Target,
}

/// One Lehmer sub-step of the large regime. While the pair is wider than
/// two words this runs the truncated bulk step, which deliberately stops
/// short of the target; once the pair fits two words the quotients are
/// exact and the loop runs precisely to the stopping window.
fn lehmer_toward_target(
    a: &mut Int,
    b: &mut Int,
    t0: &mut Int,
    t1: &mut Int,
    n_bound: &Int,
) -> LehmerOutcome {
    if let (Some(mut wa), Some(mut wb)) = (a.to_u128(), b.to_u128()) {
        let n_word = n_bound.to_u128().unwrap_or(u128::MAX);
        let mut steps = 0usize;
        while wb > n_word {
            let q = wa / wb;
            let r = wa % wb;
            wa = wb;
            wb = r;
            let qi = Int::from(q);
            let t2 = &*t0 - &(&qi * &*t1);
            *t0 = mem::replace(t1, t2);
            steps += 1;
        }
        *a = Int::from(wa);
        *b = Int::from(wb);
        return if steps == 0 {
            LehmerOutcome::NoProgress
        } else {
            LehmerOutcome::Target
        };
    }
    if lehmer_step_row(a, b, t0, t1, n_bound) == 0 {
        LehmerOutcome::NoProgress
    } else {
        LehmerOutcome::Progress
    }
}

/// Rational reconstruction of `a` modulo `m` under the bounds
/// `|n| <= n_bound`, `0 < d <= d_bound`.
///
/// # Arguments
/// * `a` - residue, `0 <= a < m`
/// * `m` - positive modulus with `2 * n_bound * d_bound < m`
///
/// # Returns
/// `Some((n, d))` with `gcd(n, d) = 1` when the unique such rational
/// exists, `None` otherwise.
pub fn reconstruct(a: &Int, m: &Int, n_bound: &Int, d_bound: &Int) -> Option<(Int, Int)> {
    reconstruct_with_stats(a, m, n_bound, d_bound).0
}

/// [`reconstruct`] with the default balanced bounds
/// `N = D = floor(sqrt((m-1)/2))`.
pub fn reconstruct_balanced(a: &Int, m: &Int) -> Option<(Int, Int)> {
    if m.is_zero() {
        panic!("division by zero");
    }
    let half = (m - 1).div_rem_trunc(&Int::from(2i64)).0;
    let bound = half.sqrt();
    if !bound.is_positive() {
        return None;
    }
    reconstruct(a, m, &bound, &bound)
}

/// [`reconstruct`], also reporting which strategies did the work.
pub fn reconstruct_with_stats(
    a: &Int,
    m: &Int,
    n_bound: &Int,
    d_bound: &Int,
) -> (Option<(Int, Int)>, ReconstructStats) {
    if m.is_zero() {
        panic!("division by zero");
    }
    debug_assert!(m.is_positive());
    debug_assert!(!a.is_negative() && a < m);
    debug_assert!(n_bound.is_positive() && d_bound.is_positive());
    // Uniqueness of the answer needs 2*N*D < m; the search itself does
    // not, so looser bounds return some valid representative.

    let mut stats = ReconstructStats::default();
    let result = if m.bits() <= 62 {
        reconstruct_small(
            a.to_u64().expect("residue below a one-word modulus"),
            m.to_u64().expect("one-word modulus"),
            // Bounds at or above m all behave alike; saturate oversized ones.
            n_bound.to_u64().unwrap_or(u64::MAX),
            d_bound.to_u64().unwrap_or(u64::MAX),
            &mut stats,
        )
    } else if m.bits() <= 126 {
        reconstruct_medium(
            a.to_u128().expect("residue below a two-word modulus"),
            m.to_u128().expect("two-word modulus"),
            n_bound.to_u128().unwrap_or(u128::MAX),
            d_bound.to_u128().unwrap_or(u128::MAX),
            &mut stats,
        )
    } else {
        reconstruct_large(a, m, n_bound, d_bound, &mut stats)
    };
    (result, stats)
}

fn reconstruct_small(
    a: u64,
    m: u64,
    n: u64,
    d: u64,
    stats: &mut ReconstructStats,
) -> Option<(Int, Int)> {
    let (mut r0, mut r1) = (m, a);
    let (mut t0, mut t1) = (0i64, 1i64);
    while r1 > n {
        let q = r0 / r1;
        let r2 = r0 - q * r1;
        r0 = r1;
        r1 = r2;
        // |t| stays below m, so the update fits after a widening multiply.
        let t2 = t0 as i128 - q as i128 * t1 as i128;
        t0 = t1;
        t1 = t2 as i64;
        stats.gauss_steps += 1;
    }
    debug_assert!(t1 != 0);
    let den = t1.unsigned_abs();
    if den > d || !coprime_u64(r1, den) {
        return None;
    }
    let num = if t1 < 0 { -(r1 as i64) } else { r1 as i64 };
    Some((Int::from(num), Int::from(den)))
}

fn reconstruct_medium(
    a: u128,
    m: u128,
    n: u128,
    d: u128,
    stats: &mut ReconstructStats,
) -> Option<(Int, Int)> {
    let (mut r0, mut r1) = (m, a);
    let (mut t0, mut t1) = (0i128, 1i128);
    while r1 > n {
        let q = r0 / r1;
        let r2 = r0 - q * r1;
        r0 = r1;
        r1 = r2;
        let t2 = t0 - q as i128 * t1;
        t0 = t1;
        t1 = t2;
        stats.gauss_steps += 1;
    }
    debug_assert!(t1 != 0);
    let den = t1.unsigned_abs();
    if den > d || !coprime_u128(r1, den) {
        return None;
    }
    let num = if t1 < 0 {
        -Int::from(r1)
    } else {
        Int::from(r1)
    };
    Some((num, Int::from(den)))
}

fn reconstruct_large(
    a: &Int,
    m: &Int,
    n_bound: &Int,
    d_bound: &Int,
    stats: &mut ReconstructStats,
) -> Option<(Int, Int)> {
    let mut big_a = m.clone();
    let mut big_b = a.clone();
    let mut t0 = Int::zero();
    let mut t1 = Int::one();

    while big_b > *n_bound {
        let excess = big_a.bits().saturating_sub(n_bound.bits());

        if excess >= RR_HGCD_CUTOFF {
            // Shift the pair down so the engine's natural halfway stopping
            // point still lands above the target remainder size.
            let k = big_a.bits().saturating_sub(2 * (excess - 32));
            let mut sa = big_a.shr(k);
            let mut sb = big_b.shr(k);
            if sb.is_positive() && sa > sb {
                let mut sub = Mat22::identity();
                let mut sub_terms = TermList::new(usize::MAX);
                hgcd(&mut sa, &mut sb, &mut sub, Some(&mut sub_terms));
                stats.hgcd_calls += 1;
                if !sub.is_identity() {
                    sub.apply_inv_quad(&mut big_a, &mut big_b, &mut t0, &mut t1);
                    // The stopping index is the first with B <= N; retract
                    // any quotients that carried A itself past the target.
                    while big_a <= *n_bound {
                        match sub_terms.pop() {
                            Some(q) => {
                                let p = &(&q * &big_a) + &big_b;
                                big_b = mem::replace(&mut big_a, p);
                                let p = &(&q * &t0) + &t1;
                                t1 = mem::replace(&mut t0, p);
                            }
                            None => break,
                        }
                    }
                    if !sub_terms.is_empty() {
                        continue;
                    }
                }
            }
        }

        if big_a.bits() <= 128 || excess >= RR_LEHMER_CUTOFF {
            match lehmer_toward_target(&mut big_a, &mut big_b, &mut t0, &mut t1, n_bound) {
                LehmerOutcome::NoProgress => {}
                LehmerOutcome::Progress => {
                    stats.lehmer_steps += 1;
                    continue;
                }
                LehmerOutcome::Target => {
                    stats.lehmer_steps += 1;
                    break;
                }
            }
        }

        let (q, r) = big_a.div_rem_floor(&big_b);
        big_a = mem::replace(&mut big_b, r);
        let t2 = &t0 - &(&q * &t1);
        t0 = mem::replace(&mut t1, t2);
        stats.gauss_steps += 1;
    }

    debug_assert!(big_a > *n_bound);
    debug_assert!(!t1.is_zero());
    let (num, den) = if t1.is_negative() {
        (-&big_b, -&t1)
    } else {
        (big_b.clone(), t1.clone())
    };
    if den > *d_bound || !big_b.gcd(&den).is_one() {
        return None;
    }
    Some((num, den))
}
