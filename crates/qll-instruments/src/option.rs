//! Vanilla option instrument.

use crate::exercise::ExerciseType;
use crate::instrument::{PricingEngine, PricingResults};
use crate::payoff::{OptionType, Payoff, PlainVanillaPayoff};
use qll_core::{errors::Result, Real};
use std::sync::Arc;

/// Arguments handed to a pricing engine for a one-asset option.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// The payoff.
    pub payoff: Arc<dyn Payoff>,
    /// The exercise style.
    pub exercise: ExerciseType,
}

/// An option on a single underlying asset.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn Payoff>,
    exercise: ExerciseType,
}

impl VanillaOption {
    /// Create an option from any payoff.
    pub fn new(payoff: Arc<dyn Payoff>, exercise: ExerciseType) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience: a European call/put.
    pub fn european(option_type: OptionType, strike: Real) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            ExerciseType::European,
        )
    }

    /// Convenience: an American call/put.
    pub fn american(option_type: OptionType, strike: Real) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            ExerciseType::American,
        )
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn Payoff {
        &*self.payoff
    }

    /// The exercise style.
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Arguments for a pricing engine.
    pub fn arguments(&self) -> VanillaOptionArguments {
        VanillaOptionArguments {
            payoff: Arc::clone(&self.payoff),
            exercise: self.exercise,
        }
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine<VanillaOptionArguments>,
    ) -> Result<PricingResults> {
        engine.calculate(&self.arguments())
    }
}
