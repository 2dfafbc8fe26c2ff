//! # qll-methods
//!
//! Lattice methods: binomial tree parametrizations, the Black-Scholes
//! lattice with its backward-induction step, and discretized vanilla
//! options rolled back through it.
//!
//! # Features
//!
//! * `parallel` — compute the nodes of wide lattice layers with rayon
//! * `serde` — serialize/deserialize [`TreeKind`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: binomial trees, time grid, backward induction.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    BlackScholesLattice, CoxRossRubinstein, DiscretizedVanillaOption, JarrowRudd, Joshi4,
    LeisenReimer, Tian, TimeGrid, TreeKind, TreeParameters, TreeParametrization, Trigeorgis,
};
