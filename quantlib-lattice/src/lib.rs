//! # quantlib-lattice
//!
//! Binomial-lattice pricing of vanilla options, with value, delta, gamma and
//! theta read off the lattice.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `qll-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use quantlib_lattice::instruments::{OptionType, VanillaOption};
//! use quantlib_lattice::methods::TreeKind;
//! use quantlib_lattice::pricingengines::{BinomialEngineConfig, BinomialVanillaEngine};
//! use quantlib_lattice::processes::MarketSnapshot;
//!
//! let market = MarketSnapshot::new(50.0, 0.04, 0.0, 0.15, 314.0 / 365.0);
//! let config = BinomialEngineConfig::new(200, TreeKind::LeisenReimer);
//! let engine = BinomialVanillaEngine::new(market, config).unwrap();
//! let results = VanillaOption::american(OptionType::Put, 47.0)
//!     .price(&engine)
//!     .unwrap();
//! assert!(results.value > 0.9);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use qll_core as core;

/// Normal distribution and floating-point comparison.
pub use qll_math as math;

/// Market snapshot of the Black-Scholes-Merton model.
pub use qll_processes as processes;

/// Payoffs, exercise types and vanilla options.
pub use qll_instruments as instruments;

/// Binomial trees, the lattice and discretized options.
pub use qll_methods as methods;

/// Binomial and analytic pricing engines.
pub use qll_pricingengines as pricingengines;

pub use qll_core::{Error, Result};
