//! # qll-instruments
//!
//! Vanilla options on a single underlying: payoffs, exercise rights, and the
//! `PricingEngine` seam through which they are valued.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use exercise::ExerciseType;
pub use instrument::{PricingEngine, PricingResults};
pub use option::{VanillaOption, VanillaOptionArguments};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff};
