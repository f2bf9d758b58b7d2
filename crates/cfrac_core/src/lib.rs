//! Continued-Fraction Arithmetic Core
//!
//! Exact big-integer and continued-fraction primitives: a tagged
//! small/large integer, half-GCD reduction, continued fractions of
//! rational balls, and rational reconstruction.
//!
//! # Overview
//!
//! The integer type keeps word-sized values inline and promotes to an
//! owned arbitrary-precision value only when a result outgrows one word;
//! every operation demotes back eagerly, so representation is a function
//! of value. On top of it sit the Euclidean engines: a half-GCD that
//! advances the remainder sequence of a pair in softly-linear time, a
//! ball engine that emits continued-fraction terms valid for every real
//! in an interval, and rational reconstruction of `n/d` from a residue
//! modulo `m`.
//!
//! # Key Components
//!
//! - [`Int`] - tagged small/large signed integer
//! - [`Mat22`] - 2x2 quotient accumulation matrix with unit determinant
//! - [`TermList`] - capacity-bounded continued-fraction term list
//! - [`hgcd`] - half-GCD reduction of a pair
//! - [`Ball`], [`ball_get_cfrac`], [`cfrac`] - continued fractions of
//!   exact and interval-valued rationals
//! - [`reconstruct`] - rational reconstruction modulo `m`
//!
//! All computation is synchronous and allocation is per-value: no global
//! state, no internal locking. Values may be moved across threads freely;
//! sharing a value mutably requires external synchronization.

pub mod ball;
pub mod hgcd;
pub mod int;
pub mod mat22;
pub mod reconstruct;
pub mod terms;
mod words;

pub use ball::{ball_get_cfrac, cfrac, cfrac_bound, cfrac_to_rational, Ball};
pub use hgcd::hgcd;
pub use int::{Int, SMALL_MAX};
pub use mat22::Mat22;
pub use reconstruct::{
    reconstruct, reconstruct_balanced, reconstruct_with_stats, ReconstructStats,
};
pub use terms::TermList;
