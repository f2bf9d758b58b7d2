//! Randomized cross-module round trips
//!
//! Seeded properties that tie the public pieces together: string parsing,
//! GCD against the reference implementation, continued fractions folded
//! back through the matrix action, and reconstruction at the size-regime
//! boundaries.

use cfrac_core::{cfrac, cfrac_bound, cfrac_to_rational, hgcd, reconstruct, Int, Mat22, TermList};
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
fn string_roundtrip_random() {
    let mut rng = XorShiftRng::from_seed([51u8; 16]);
    for bits in [8u64, 60, 63, 64, 200, 2000] {
        for _ in 0..8 {
            let mut x = random_int(&mut rng, bits);
            if rng.gen::<bool>() {
                x = -&x;
            }
            let parsed = Int::from_str(&x.to_string()).expect("own output parses");
            assert_eq!(parsed, x);
        }
    }
}

#[test]
fn gcd_agrees_with_num_bigint() {
    let mut rng = XorShiftRng::from_seed([53u8; 16]);
    for bits in [31u64, 62, 63, 127, 500, 5000] {
        let a = random_int(&mut rng, bits);
        let b = random_int(&mut rng, bits * 2 / 3 + 1);
        assert_eq!(a.gcd(&b).to_bigint(), a.to_bigint().gcd(&b.to_bigint()));
    }
}

#[test]
fn hgcd_commutes_with_matrix_action() {
    let mut rng = XorShiftRng::from_seed([59u8; 16]);
    for bits in [100u64, 1000, 5000] {
        let b = random_int(&mut rng, bits);
        let a = &b + &random_int(&mut rng, bits - 1);
        let mut x = a.clone();
        let mut y = b.clone();
        let mut m = Mat22::identity();
        hgcd(&mut x, &mut y, &mut m, None);
        let mut ra = x.clone();
        let mut rb = y.clone();
        m.apply_pair(&mut ra, &mut rb);
        assert_eq!((ra, rb), (a, b));
    }
}

#[test]
fn cfrac_convergents_reconstruct() {
    let mut rng = XorShiftRng::from_seed([61u8; 16]);
    for bits in [60u64, 300, 2000] {
        let mut d = random_int(&mut rng, bits);
        let mut n = &(&d * &Int::from(5i64)) + &random_int(&mut rng, bits - 1);
        let g = n.gcd(&d);
        n = n.div_rem_trunc(&g).0;
        d = d.div_rem_trunc(&g).0;
        let (terms, rem) = cfrac(&n, &d, cfrac_bound(&d));
        assert!(rem.0.is_zero());
        let (rn, rd) = cfrac_to_rational(terms.terms(), &rem.0, &rem.1);
        assert_eq!((rn, rd), (n, d));
    }
}

#[test]
fn reconstruction_at_regime_boundaries() {
    let mut rng = XorShiftRng::from_seed([67u8; 16]);
    // One-word, two-word, and big moduli either side of the cutoffs.
    for m_bits in [61u64, 62, 63, 125, 126, 127, 128, 260] {
        let mut m = random_int(&mut rng, m_bits);
        m.set_bit(0, true);
        let bound_bits = m_bits / 3;
        let mut n = random_int(&mut rng, bound_bits.saturating_sub(1).max(1));
        n.set_bit(0, true);
        let d = Int::one().shl(u64::from(rng.gen::<u8>() % (bound_bits as u8 - 1)).max(1));
        if rng.gen::<bool>() {
            n = -&n;
        }
        let bound = random_int(&mut rng, bound_bits);
        if n.cmp_abs(&bound).is_gt() || d > bound {
            continue;
        }
        // a = n/d mod m via the extended GCD.
        let (g, x, _) = d.xgcd(&m);
        assert!(g.is_one());
        let a = (&n * &x).rem_euclid(&m);
        assert_eq!(
            reconstruct(&a, &m, &bound, &bound),
            Some((n, d)),
            "round trip at {} bits",
            m_bits
        );
    }
}

#[test]
fn term_budget_is_respected_everywhere() {
    let mut rng = XorShiftRng::from_seed([71u8; 16]);
    let b = random_int(&mut rng, 900);
    let a = &b + &random_int(&mut rng, 899);
    for limit in [1usize, 2, 7, 50] {
        let mut x = a.clone();
        let mut y = b.clone();
        let mut m = Mat22::identity();
        let mut s = TermList::new(limit);
        hgcd(&mut x, &mut y, &mut m, Some(&mut s));
        assert!(s.len() <= limit);
        let mut ra = x.clone();
        let mut rb = y.clone();
        m.apply_pair(&mut ra, &mut rb);
        assert_eq!((ra, rb), (a.clone(), b.clone()));
    }
}
