//! Prices the reference put, European and American, on a binomial lattice
//! and prints it next to the Black-Scholes closed form.
//!
//! Environment (a `.env` file is honoured):
//!
//! * `BINOMIAL_TIME_STEPS` — number of tree steps (default 100)
//! * `BINOMIAL_TREE` — `crr`, `jarrow_rudd`, `trigeorgis`, `tian`,
//!   `leisen_reimer` or `joshi4` (default `crr`)
//! * `RUST_LOG` — tracing filter (default `info`)

use chrono::NaiveDate;
use quantlib_lattice::core::{Error, Real, Result, Size, Time};
use quantlib_lattice::instruments::{OptionType, PricingResults, VanillaOption};
use quantlib_lattice::methods::TreeKind;
use quantlib_lattice::pricingengines::{
    AnalyticEuropeanEngine, BinomialEngineConfig, BinomialVanillaEngine,
};
use quantlib_lattice::processes::MarketSnapshot;
use std::process::ExitCode;
use tracing::{error, info};

const SPOT: Real = 50.0;
const STRIKE: Real = 47.0;
const RISK_FREE_RATE: Real = 0.04;
const DIVIDEND_YIELD: Real = 0.0;
const VOLATILITY: Real = 0.15;

#[derive(Debug, Clone)]
struct DemoConfig {
    time_steps: Size,
    tree: TreeKind,
}

impl DemoConfig {
    fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let time_steps = env_var_or("BINOMIAL_TIME_STEPS", "100")
            .parse::<Size>()
            .map_err(|e| Error::InvalidConfiguration(format!("BINOMIAL_TIME_STEPS: {e}")))?;
        let tree = env_var_or("BINOMIAL_TREE", "crr").parse::<TreeKind>()?;

        Ok(Self { time_steps, tree })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Actual/365 (Fixed) year fraction between two dates.
fn actual_365(start: NaiveDate, end: NaiveDate) -> Time {
    (end - start).num_days() as Time / 365.0
}

fn maturity() -> Result<Time> {
    let (Some(settlement), Some(expiry)) = (
        NaiveDate::from_ymd_opt(2018, 1, 30),
        NaiveDate::from_ymd_opt(2018, 12, 10),
    ) else {
        return Err(Error::InvalidInput("invalid calendar date".into()));
    };
    Ok(actual_365(settlement, expiry))
}

fn report(label: &str, results: &PricingResults) {
    println!(
        "{label:<28} value {:>9.6}  delta {:>9.6}  gamma {:>9.6}  theta {:>9.6}  theta/day {:>9.6}",
        results.value,
        results.delta,
        results.gamma,
        results.theta,
        results.theta_per_day()
    );
}

fn run() -> Result<()> {
    let config = DemoConfig::from_env()?;
    let t = maturity()?;
    let market = MarketSnapshot::new(SPOT, RISK_FREE_RATE, DIVIDEND_YIELD, VOLATILITY, t);
    info!(
        steps = config.time_steps,
        tree = %config.tree,
        maturity = t,
        "pricing reference put"
    );

    let engine = BinomialVanillaEngine::new(
        market,
        BinomialEngineConfig::new(config.time_steps, config.tree),
    )?;
    let analytic = AnalyticEuropeanEngine::new(market);

    let european = VanillaOption::european(OptionType::Put, STRIKE);
    let american = VanillaOption::american(OptionType::Put, STRIKE);

    println!(
        "Put @ {STRIKE}, spot {SPOT}, r {RISK_FREE_RATE}, q {DIVIDEND_YIELD}, vol {VOLATILITY}, T {t:.6}"
    );
    report(
        &format!("European ({}, {})", config.tree, config.time_steps),
        &european.price(&engine)?,
    );
    report(
        &format!("American ({}, {})", config.tree, config.time_steps),
        &american.price(&engine)?,
    );
    report("European (Black-Scholes)", &european.price(&analytic)?);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = e.kind(), "{e}");
            ExitCode::FAILURE
        }
    }
}
