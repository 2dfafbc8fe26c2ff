//! # qll-processes
//!
//! Market dynamics consumed by the lattice engine.
//!
//! The engine works on a flat Black-Scholes-Merton world: constant rate,
//! dividend yield and volatility over the life of the option. A
//! [`MarketSnapshot`] freezes those scalars once per valuation, after they
//! have been read off whatever term structures the caller maintains.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod market_snapshot;

pub use market_snapshot::MarketSnapshot;
