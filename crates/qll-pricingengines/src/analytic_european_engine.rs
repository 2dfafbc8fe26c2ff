//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Closed-form reference against which the lattice engine is checked, and a
//! [`PricingEngine`] in its own right for European plain vanilla options.

use qll_core::{ensure, errors::Result, Error, Real};
use qll_instruments::{OptionType, PricingEngine, PricingResults, VanillaOptionArguments};
use qll_math::distributions::{normal_cdf, normal_pdf};
use qll_processes::MarketSnapshot;

/// Closed-form value and Greeks of a European option.
///
/// Vega and rho are per unit (1.0 = 100 %) of volatility and rate; theta is
/// per year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesGreeks {
    /// Option price.
    pub price: Real,
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
    /// ∂V/∂σ.
    pub vega: Real,
    /// −∂V/∂τ.
    pub theta: Real,
    /// ∂V/∂r.
    pub rho: Real,
}

/// Black-Scholes-Merton price and Greeks for a European option.
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
pub fn black_scholes_merton(
    option_type: OptionType,
    strike: Real,
    market: &MarketSnapshot,
) -> BlackScholesGreeks {
    let phi = option_type.sign();
    let spot = market.spot;
    let t = market.time_to_maturity;

    if t <= 0.0 {
        return BlackScholesGreeks {
            price: (phi * (spot - strike)).max(0.0),
            delta: 0.0,
            gamma: 0.0,
            vega: 0.0,
            theta: 0.0,
            rho: 0.0,
        };
    }

    let r = market.risk_free_rate;
    let q = market.dividend_yield;
    let sigma = market.volatility;
    let sqrt_t = t.sqrt();
    let std_dev = market.std_deviation(t);
    let df_r = market.discount(t);
    let df_q = market.dividend_discount(t);

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if market.forward() > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);
    let npd1 = normal_pdf(d1);

    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let theta = -(spot * df_q * npd1 * sigma) / (2.0 * sqrt_t) - phi * r * strike * df_r * nd2
        + phi * q * spot * df_q * nd1;

    BlackScholesGreeks {
        price: phi * (spot * df_q * nd1 - strike * df_r * nd2),
        delta: phi * df_q * nd1,
        gamma,
        vega: spot * df_q * npd1 * sqrt_t,
        theta,
        rho: phi * strike * t * df_r * nd2,
    }
}

/// Analytic pricing engine for European plain vanilla options.
#[derive(Debug, Clone)]
pub struct AnalyticEuropeanEngine {
    snapshot: MarketSnapshot,
}

impl AnalyticEuropeanEngine {
    /// Create an engine over the given market.
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self { snapshot }
    }

    /// Market inputs the engine prices against.
    pub fn snapshot(&self) -> &MarketSnapshot {
        &self.snapshot
    }

    /// Replace the market inputs; later `calculate` calls use them.
    pub fn set_snapshot(&mut self, snapshot: MarketSnapshot) {
        self.snapshot = snapshot;
    }
}

impl PricingEngine<VanillaOptionArguments> for AnalyticEuropeanEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let payoff = args.payoff.as_plain_vanilla().ok_or_else(|| {
            Error::UnsupportedPayoff(format!("non-plain payoff given: {}", args.payoff.description()))
        })?;
        ensure!(
            !args.exercise.allows_early_exercise(),
            InvalidInput,
            "the analytic engine prices European exercise only, got {}",
            args.exercise
        );
        ensure!(
            self.snapshot.spot > 0.0,
            InvalidInput,
            "negative or null underlying given: {}",
            self.snapshot.spot
        );

        let greeks = black_scholes_merton(payoff.option_type, payoff.strike, &self.snapshot);
        Ok(PricingResults {
            value: greeks.price,
            delta: greeks.delta,
            gamma: greeks.gamma,
            theta: greeks.theta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qll_instruments::{CashOrNothingPayoff, VanillaOption};
    use std::sync::Arc;

    fn atm_market() -> MarketSnapshot {
        MarketSnapshot::new(100.0, 0.05, 0.0, 0.20, 1.0)
    }

    #[test]
    fn bs_call_price() {
        let g = black_scholes_merton(OptionType::Call, 100.0, &atm_market());
        assert_abs_diff_eq!(g.price, 10.4506, epsilon = 1e-4);
        assert!(g.delta > 0.5 && g.delta < 0.8, "delta = {}", g.delta);
        assert!(g.gamma > 0.0);
        assert!(g.vega > 0.0);
        assert!(g.rho > 0.0);
    }

    #[test]
    fn bs_put_call_parity_with_dividends() {
        let m = MarketSnapshot::new(100.0, 0.08, 0.03, 0.25, 0.5);
        let call = black_scholes_merton(OptionType::Call, 105.0, &m);
        let put = black_scholes_merton(OptionType::Put, 105.0, &m);
        let parity = call.price - 100.0 * m.dividend_discount(0.5) + 105.0 * m.discount(0.5);
        assert_abs_diff_eq!(put.price, parity, epsilon = 1e-10);
        assert_abs_diff_eq!(call.delta - put.delta, m.dividend_discount(0.5), epsilon = 1e-10);
        assert_abs_diff_eq!(call.gamma, put.gamma, epsilon = 1e-12);
    }

    #[test]
    fn bs_theta_satisfies_the_pde() {
        // θ = rV − (r − q)SΔ − ½σ²S²Γ
        let m = MarketSnapshot::new(50.0, 0.04, 0.01, 0.15, 314.0 / 365.0);
        for option_type in [OptionType::Call, OptionType::Put] {
            let g = black_scholes_merton(option_type, 47.0, &m);
            let residual = m.risk_free_rate * g.price
                - m.carry() * m.spot * g.delta
                - 0.5 * m.volatility * m.volatility * m.spot * m.spot * g.gamma;
            assert_abs_diff_eq!(g.theta, residual, epsilon = 1e-10);
        }
    }

    #[test]
    fn bs_deep_otm_put() {
        let m = atm_market().with_spot(200.0);
        let g = black_scholes_merton(OptionType::Put, 100.0, &m);
        assert!(g.price < 1.0, "price = {}", g.price);
        assert!(g.delta > -0.05, "delta = {}", g.delta);
    }

    #[test]
    fn bs_zero_vol_call() {
        let m = atm_market().with_volatility(0.0);
        let g = black_scholes_merton(OptionType::Call, 95.0, &m);
        assert_abs_diff_eq!(g.price, 100.0 - 95.0 * (-0.05_f64).exp(), epsilon = 1e-10);
        assert_eq!(g.gamma, 0.0);
    }

    #[test]
    fn engine_prices_european_vanilla() {
        let engine = AnalyticEuropeanEngine::new(atm_market());
        let results = VanillaOption::european(OptionType::Call, 100.0)
            .price(&engine)
            .unwrap();
        assert_abs_diff_eq!(results.value, 10.4506, epsilon = 1e-4);
        assert!(results.theta < 0.0);
    }

    #[test]
    fn engine_rejects_digital_and_american() {
        let engine = AnalyticEuropeanEngine::new(atm_market());
        let digital = VanillaOption::new(
            Arc::new(CashOrNothingPayoff::new(OptionType::Call, 100.0, 1.0)),
            qll_instruments::ExerciseType::European,
        );
        assert!(matches!(
            digital.price(&engine),
            Err(Error::UnsupportedPayoff(_))
        ));
        let american = VanillaOption::american(OptionType::Put, 100.0);
        assert!(matches!(american.price(&engine), Err(Error::InvalidInput(_))));
    }
}
