//! # qll-pricingengines
//!
//! Pricing engines for vanilla options.
//!
//! ## Engines
//!
//! - [`BinomialVanillaEngine`] — binomial lattice engine, European or American
//!   exercise, with value, delta, gamma and theta from the lattice
//! - [`AnalyticEuropeanEngine`] — Black-Scholes-Merton closed form for
//!   European options
//!
//! ## Example
//!
//! ```
//! use qll_instruments::{OptionType, VanillaOption};
//! use qll_pricingengines::{BinomialEngineConfig, BinomialVanillaEngine};
//! use qll_processes::MarketSnapshot;
//!
//! let market = MarketSnapshot::new(50.0, 0.04, 0.0, 0.15, 314.0 / 365.0);
//! let engine = BinomialVanillaEngine::new(market, BinomialEngineConfig::default()).unwrap();
//! let results = VanillaOption::european(OptionType::Put, 47.0)
//!     .price(&engine)
//!     .unwrap();
//! assert!((results.value - 0.96).abs() < 0.05);
//! assert!(results.delta < 0.0 && results.gamma > 0.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod binomial_engine;
pub mod greeks;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine, BlackScholesGreeks};
pub use binomial_engine::{BinomialEngineConfig, BinomialVanillaEngine};
pub use greeks::{black_scholes_theta, LatticeGreeks};
