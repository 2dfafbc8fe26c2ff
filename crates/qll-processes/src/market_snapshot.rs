//! Flat Black-Scholes-Merton market snapshot.
//!
//! `dS/S = (r − q) dt + σ dW`
//!
//! with constant risk-free rate `r`, continuous dividend yield `q` and
//! volatility `σ`. The snapshot carries no validation of its own: the tree
//! parametrizations reject inputs outside their domain when they are built.

use qll_core::{DiscountFactor, Rate, Real, Time, Volatility};

/// Scalar market inputs for a single valuation.
///
/// A plain value type: build one, hand it to an engine, build a new one when
/// the market moves.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketSnapshot {
    /// Spot price of the underlying.
    pub spot: Real,
    /// Continuously-compounded risk-free rate.
    pub risk_free_rate: Rate,
    /// Continuous dividend yield.
    pub dividend_yield: Rate,
    /// Black volatility.
    pub volatility: Volatility,
    /// Time to maturity in years.
    pub time_to_maturity: Time,
}

impl MarketSnapshot {
    /// Create a snapshot from its five scalars.
    pub fn new(
        spot: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        time_to_maturity: Time,
    ) -> Self {
        Self {
            spot,
            risk_free_rate,
            dividend_yield,
            volatility,
            time_to_maturity,
        }
    }

    /// Copy of this snapshot with a different spot.
    pub fn with_spot(self, spot: Real) -> Self {
        Self { spot, ..self }
    }

    /// Copy of this snapshot with a different volatility.
    pub fn with_volatility(self, volatility: Volatility) -> Self {
        Self { volatility, ..self }
    }

    /// Copy of this snapshot with a different time to maturity.
    pub fn with_time_to_maturity(self, time_to_maturity: Time) -> Self {
        Self {
            time_to_maturity,
            ..self
        }
    }

    /// Cost of carry `r − q`.
    pub fn carry(&self) -> Rate {
        self.risk_free_rate - self.dividend_yield
    }

    /// Drift of the log-price, `r − q − σ²/2`.
    pub fn log_drift(&self) -> Real {
        self.carry() - 0.5 * self.volatility * self.volatility
    }

    /// Variance of the log-price over `dt`, `σ²·dt`.
    pub fn variance(&self, dt: Time) -> Real {
        self.volatility * self.volatility * dt
    }

    /// Standard deviation of the log-price over `dt`, `σ·√dt`.
    pub fn std_deviation(&self, dt: Time) -> Real {
        self.volatility * dt.sqrt()
    }

    /// Risk-neutral growth of the underlying over `dt`, `exp((r − q)·dt)`.
    pub fn growth(&self, dt: Time) -> Real {
        (self.carry() * dt).exp()
    }

    /// Risk-free discount factor over `dt`, `exp(−r·dt)`.
    pub fn discount(&self, dt: Time) -> DiscountFactor {
        (-self.risk_free_rate * dt).exp()
    }

    /// Dividend discount factor over `dt`, `exp(−q·dt)`.
    pub fn dividend_discount(&self, dt: Time) -> DiscountFactor {
        (-self.dividend_yield * dt).exp()
    }

    /// Forward price of the underlying at maturity.
    pub fn forward(&self) -> Real {
        self.spot * self.growth(self.time_to_maturity)
    }
}
