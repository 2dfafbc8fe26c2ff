//! Binomial lattice engine for vanilla options.
//!
//! Builds the configured tree over the engine's market, initializes the
//! option at maturity, rolls it back to the first three-node layer and reads
//! value, delta and gamma there. Theta follows from the Black-Scholes PDE.
//!
//! Every `calculate` call builds a fresh lattice from the current snapshot;
//! nothing is cached between calls.

use crate::greeks::{black_scholes_theta, LatticeGreeks};
use qll_core::{ensure, errors::Result, Error, Size};
use qll_instruments::{PricingEngine, PricingResults, VanillaOptionArguments};
use qll_methods::{BlackScholesLattice, DiscretizedVanillaOption, TreeKind};
use qll_processes::MarketSnapshot;
use std::sync::Arc;
use tracing::debug;

// ── Configuration ────────────────────────────────────────────────────────────

/// Tree choice and resolution of a [`BinomialVanillaEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinomialEngineConfig {
    /// Number of time steps (at least 2).
    pub time_steps: Size,
    /// Tree parametrization.
    pub tree: TreeKind,
}

impl BinomialEngineConfig {
    /// Default number of time steps.
    pub const DEFAULT_TIME_STEPS: Size = 100;

    /// Configuration with explicit steps and tree.
    pub fn new(time_steps: Size, tree: TreeKind) -> Self {
        Self { time_steps, tree }
    }

    /// Check the configuration can drive a lattice with a three-node layer.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.time_steps >= 2,
            InvalidConfiguration,
            "at least 2 time steps required, {} provided",
            self.time_steps
        );
        Ok(())
    }
}

impl Default for BinomialEngineConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIME_STEPS, TreeKind::default())
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

/// Binomial pricing engine for plain vanilla options, European or American.
#[derive(Debug, Clone)]
pub struct BinomialVanillaEngine {
    snapshot: MarketSnapshot,
    config: BinomialEngineConfig,
}

impl BinomialVanillaEngine {
    /// Create an engine; fails with `InvalidConfiguration` for fewer than two
    /// time steps.
    pub fn new(snapshot: MarketSnapshot, config: BinomialEngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { snapshot, config })
    }

    /// Cox-Ross-Rubinstein engine with the given number of steps.
    pub fn with_time_steps(snapshot: MarketSnapshot, time_steps: Size) -> Result<Self> {
        Self::new(
            snapshot,
            BinomialEngineConfig::new(time_steps, TreeKind::CoxRossRubinstein),
        )
    }

    /// Market inputs the engine prices against.
    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    /// Replace the market inputs; later `calculate` calls use them.
    pub fn set_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = snapshot;
    }

    /// Engine configuration.
    pub fn config(&self) -> &BinomialEngineConfig {
        &self.config
    }
}

impl PricingEngine<VanillaOptionArguments> for BinomialVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let payoff = args.payoff.as_plain_vanilla().ok_or_else(|| {
            Error::UnsupportedPayoff(format!("non-plain payoff given: {}", args.payoff.description()))
        })?;

        let tree = self
            .config
            .tree
            .build(&self.snapshot, self.config.time_steps, payoff.strike)?;
        let lattice = BlackScholesLattice::new(tree)?;

        let mut option = DiscretizedVanillaOption::new(Arc::clone(&args.payoff), args.exercise);
        option.initialize(&lattice, self.snapshot.time_to_maturity)?;
        option.rollback(&lattice, lattice.time_grid().time(LatticeGreeks::LAYER))?;

        let greeks = LatticeGreeks::estimate(&option, &lattice)?;
        let theta = black_scholes_theta(&self.snapshot, greeks.value, greeks.delta, greeks.gamma);

        debug!(
            tree = %self.config.tree,
            steps = lattice.tree().steps(),
            exercise = %args.exercise,
            value = greeks.value,
            delta = greeks.delta,
            gamma = greeks.gamma,
            theta,
            "binomial engine results"
        );

        Ok(PricingResults {
            value: greeks.value,
            delta: greeks.delta,
            gamma: greeks.gamma,
            theta,
        })
    }
}
