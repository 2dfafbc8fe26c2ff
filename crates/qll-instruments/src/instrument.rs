//! Pricing engine seam and the results it produces.

use qll_core::{errors::Result, Price, Real};

/// Days per year used to quote theta per calendar day.
pub const DAYS_PER_YEAR: Real = 365.0;

/// Value and sensitivities of a vanilla option.
///
/// Theta is expressed per year, as the derivative of the value with respect
/// to calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResults {
    /// Option value.
    pub value: Price,
    /// First derivative with respect to the underlying price.
    pub delta: Real,
    /// Second derivative with respect to the underlying price.
    pub gamma: Real,
    /// Time decay per year.
    pub theta: Real,
}

impl PricingResults {
    /// Theta per calendar day.
    pub fn theta_per_day(&self) -> Real {
        self.theta / DAYS_PER_YEAR
    }
}

/// Base trait for all pricing engines.
///
/// An engine computes [`PricingResults`] for the instrument described by
/// `Args`. Engines hold their market inputs; after the market changes the
/// caller updates the engine and calls `calculate` again.
pub trait PricingEngine<Args>: std::fmt::Debug + Send + Sync {
    /// Price the instrument described by `args`.
    fn calculate(&self, args: &Args) -> Result<PricingResults>;
}
