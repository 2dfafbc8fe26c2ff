//! Recombining binomial tree parametrizations.
//!
//! A parametrization turns a [`MarketSnapshot`], a step count and (for the
//! strike-dependent schemes) a strike into up/down factors `u`, `d` and a
//! risk-neutral up-probability `p` with
//!
//! `p·u + (1 − p)·d = exp((r − q)·dt)` and `d < exp((r − q)·dt) < u`.
//!
//! Node `(i, j)` sits after `j` up-moves and `i − j` down-moves, so its price
//! is `S₀·u^j·d^(i−j)`.
//!
//! | Variant | Factors | Reference |
//! |---|---|---|
//! | [`CoxRossRubinstein`] | `u = exp(σ√dt)`, `d = 1/u` | Cox, Ross & Rubinstein (1979) |
//! | [`JarrowRudd`] | `exp(ν·dt ± σ√dt)` | Jarrow & Rudd (1983) |
//! | [`Trigeorgis`] | `exp(±√(σ²dt + ν²dt²))` | Trigeorgis (1991) |
//! | [`Tian`] | third-moment matching | Tian (1993) |
//! | [`LeisenReimer`] | Peizer-Pratt inversion | Leisen & Reimer (1996) |
//! | [`Joshi4`] | 4th-order inversion | Joshi (2008) |
//!
//! The first four set `p` from the martingale condition. Leisen-Reimer and
//! Joshi4 choose `p` first and solve for `u`, `d`; both need an odd number of
//! steps and round an even request up by one.

use qll_core::{ensure, DiscountFactor, Real, Result, Size, Time};
use qll_processes::MarketSnapshot;
use std::fmt;
use std::str::FromStr;

/// Numerical parameters shared by every binomial parametrization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParameters {
    /// Spot price at the root node.
    pub spot: Real,
    /// Number of time steps.
    pub steps: Size,
    /// Length of one time step.
    pub dt: Time,
    /// Up factor.
    pub up: Real,
    /// Down factor.
    pub down: Real,
    /// Risk-neutral probability of an up-move.
    pub pu: Real,
    /// Risk-free discount factor over one step.
    pub discount: DiscountFactor,
}

impl TreeParameters {
    /// Parameters whose up-probability is implied by the martingale
    /// condition `p = (exp((r − q)·dt) − d) / (u − d)`.
    pub fn risk_neutral(
        snapshot: &MarketSnapshot,
        steps: Size,
        up: Real,
        down: Real,
    ) -> Result<Self> {
        let dt = snapshot.time_to_maturity / steps as Real;
        let growth = snapshot.growth(dt);
        let pu = (growth - down) / (up - down);
        Self::with_probability(snapshot, steps, up, down, pu)
    }

    /// Parameters with an explicitly chosen up-probability.
    ///
    /// Checks the no-arbitrage bound `d < exp((r − q)·dt) < u` and
    /// `p ∈ [0, 1]`; a tree failing either cannot be rolled back meaningfully,
    /// typically because the step count is too low for the drift or the
    /// volatility is zero.
    pub fn with_probability(
        snapshot: &MarketSnapshot,
        steps: Size,
        up: Real,
        down: Real,
        pu: Real,
    ) -> Result<Self> {
        let dt = snapshot.time_to_maturity / steps as Real;
        let growth = snapshot.growth(dt);
        ensure!(
            up.is_finite() && down.is_finite() && down > 0.0,
            InvalidConfiguration,
            "degenerate tree factors: up = {up}, down = {down}"
        );
        ensure!(
            down < growth && growth < up,
            InvalidConfiguration,
            "no-arbitrage bound violated: d = {down}, exp((r-q)dt) = {growth}, u = {up} \
             (try more steps)"
        );
        ensure!(
            pu.is_finite() && (0.0..=1.0).contains(&pu),
            InvalidConfiguration,
            "invalid up-probability {pu} (try more steps)"
        );
        Ok(Self {
            spot: snapshot.spot,
            steps,
            dt,
            up,
            down,
            pu,
            discount: snapshot.discount(dt),
        })
    }
}

/// A recombining binomial tree over a flat Black-Scholes market.
///
/// Layer `i` holds `i + 1` nodes; the descendants of node `(i, j)` are
/// `(i + 1, j)` (down) and `(i + 1, j + 1)` (up). Implementors only supply
/// their [`TreeParameters`]; the node geometry is shared.
pub trait TreeParametrization: fmt::Debug + Send + Sync {
    /// Human-readable name of the scheme.
    fn name(&self) -> &'static str;

    /// The numerical parameters of the tree.
    fn parameters(&self) -> &TreeParameters;

    /// Number of time steps.
    fn steps(&self) -> Size {
        self.parameters().steps
    }

    /// Time increment per step.
    fn dt(&self) -> Time {
        self.parameters().dt
    }

    /// Spot price at the root.
    fn spot(&self) -> Real {
        self.parameters().spot
    }

    /// Up factor.
    fn up(&self) -> Real {
        self.parameters().up
    }

    /// Down factor.
    fn down(&self) -> Real {
        self.parameters().down
    }

    /// Number of nodes at time layer `i`.
    fn size(&self, i: Size) -> Size {
        i + 1
    }

    /// Index at layer `i + 1` of the `branch` descendant (0 = down, 1 = up)
    /// of node `index` at layer `i`.
    fn descendant(&self, _i: Size, index: Size, branch: Size) -> Size {
        index + branch
    }

    /// Risk-neutral up-probability for the step leaving layer `i`.
    fn probability(&self, _i: Size) -> Real {
        self.parameters().pu
    }

    /// Discount factor for the step leaving layer `i`.
    fn discount(&self, _i: Size) -> DiscountFactor {
        self.parameters().discount
    }

    /// Underlying price at node `(i, index)`: `S₀·u^index·d^(i − index)`.
    fn underlying(&self, i: Size, index: Size) -> Real {
        debug_assert!(index <= i, "node index {index} outside layer {i}");
        let p = self.parameters();
        p.spot * p.up.powi(index as i32) * p.down.powi((i - index) as i32)
    }
}

/// Reject inputs no parametrization can work with.
fn check_inputs(snapshot: &MarketSnapshot, steps: Size) -> Result<()> {
    ensure!(
        steps >= 2,
        InvalidConfiguration,
        "at least 2 time steps required, {steps} provided"
    );
    ensure!(
        snapshot.spot > 0.0,
        InvalidInput,
        "negative or null underlying given: {}",
        snapshot.spot
    );
    ensure!(
        snapshot.time_to_maturity > 0.0,
        InvalidInput,
        "time to maturity must be positive, got {}",
        snapshot.time_to_maturity
    );
    ensure!(
        snapshot.volatility >= 0.0,
        InvalidInput,
        "negative volatility given: {}",
        snapshot.volatility
    );
    Ok(())
}

/// Inputs of the strike-dependent schemes: odd step count, `σ²T`, `d2`.
fn strike_dependent_inputs(
    snapshot: &MarketSnapshot,
    steps: Size,
    strike: Real,
) -> Result<(Size, Real, Real)> {
    ensure!(strike > 0.0, InvalidInput, "strike must be positive, got {strike}");
    let odd_steps = if steps % 2 != 0 { steps } else { steps + 1 };
    let total_variance = snapshot.variance(snapshot.time_to_maturity);
    ensure!(
        total_variance > 0.0,
        InvalidInput,
        "strike-dependent trees need a positive volatility"
    );
    let d2 = ((snapshot.spot / strike).ln() + snapshot.log_drift() * snapshot.time_to_maturity)
        / total_variance.sqrt();
    Ok((odd_steps, total_variance, d2))
}

/// `u`, `d` from a pair of inverted probabilities, so that the tree stays a
/// martingale: `p·u + (1 − p)·d = exp((r − q)·dt)`.
fn factors_from_probabilities(growth: Real, pu: Real, pdash: Real) -> (Real, Real) {
    let up = growth * pdash / pu;
    let down = (growth - pu * up) / (1.0 - pu);
    (up, down)
}

macro_rules! binomial_tree {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            params: TreeParameters,
        }

        impl TreeParametrization for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn parameters(&self) -> &TreeParameters {
                &self.params
            }
        }
    };
}

binomial_tree!(
    /// Cox-Ross-Rubinstein tree: equal jumps `u = exp(σ√dt)`, `d = 1/u`.
    CoxRossRubinstein,
    "Cox-Ross-Rubinstein"
);

binomial_tree!(
    /// Jarrow-Rudd tree: the log-drift is carried by the node prices, leaving
    /// a probability close to one half.
    JarrowRudd,
    "Jarrow-Rudd"
);

binomial_tree!(
    /// Trigeorgis tree: equal jumps in log space sized to match the first two
    /// moments of the log-price.
    Trigeorgis,
    "Trigeorgis"
);

binomial_tree!(
    /// Tian tree: matches the first three moments of the lognormal.
    Tian,
    "Tian"
);

binomial_tree!(
    /// Leisen-Reimer tree: strike-centred, Peizer-Pratt method 2 inversion.
    LeisenReimer,
    "Leisen-Reimer"
);

binomial_tree!(
    /// Joshi's fourth-order tree: strike-centred, higher-order inversion.
    Joshi4,
    "Joshi4"
);

impl CoxRossRubinstein {
    /// Build the tree. The strike is not used.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, _strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let dt = snapshot.time_to_maturity / steps as Real;
        let dx = snapshot.std_deviation(dt);
        let params = TreeParameters::risk_neutral(snapshot, steps, dx.exp(), (-dx).exp())?;
        Ok(Self { params })
    }
}

impl JarrowRudd {
    /// Build the tree. The strike is not used.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, _strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let dt = snapshot.time_to_maturity / steps as Real;
        let drift = snapshot.log_drift() * dt;
        let dx = snapshot.std_deviation(dt);
        let params =
            TreeParameters::risk_neutral(snapshot, steps, (drift + dx).exp(), (drift - dx).exp())?;
        Ok(Self { params })
    }
}

impl Trigeorgis {
    /// Build the tree. The strike is not used.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, _strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let dt = snapshot.time_to_maturity / steps as Real;
        let drift = snapshot.log_drift() * dt;
        let dx = (snapshot.variance(dt) + drift * drift).sqrt();
        let params = TreeParameters::risk_neutral(snapshot, steps, dx.exp(), (-dx).exp())?;
        Ok(Self { params })
    }
}

impl Tian {
    /// Build the tree. The strike is not used.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, _strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let dt = snapshot.time_to_maturity / steps as Real;
        let q = snapshot.variance(dt).exp();
        let r = snapshot.growth(dt);
        let root = (q * q + 2.0 * q - 3.0).sqrt();
        let up = 0.5 * r * q * (q + 1.0 + root);
        let down = 0.5 * r * q * (q + 1.0 - root);
        let params = TreeParameters::risk_neutral(snapshot, steps, up, down)?;
        Ok(Self { params })
    }
}

impl LeisenReimer {
    /// Build the tree around `strike`. An even step count is rounded up.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let (odd_steps, total_variance, d2) = strike_dependent_inputs(snapshot, steps, strike)?;
        let growth = snapshot.growth(snapshot.time_to_maturity / odd_steps as Real);
        let pu = peizer_pratt_2(d2, odd_steps);
        let pdash = peizer_pratt_2(d2 + total_variance.sqrt(), odd_steps);
        let (up, down) = factors_from_probabilities(growth, pu, pdash);
        let params = TreeParameters::with_probability(snapshot, odd_steps, up, down, pu)?;
        Ok(Self { params })
    }
}

impl Joshi4 {
    /// Build the tree around `strike`. An even step count is rounded up.
    pub fn new(snapshot: &MarketSnapshot, steps: Size, strike: Real) -> Result<Self> {
        check_inputs(snapshot, steps)?;
        let (odd_steps, total_variance, d2) = strike_dependent_inputs(snapshot, steps, strike)?;
        let growth = snapshot.growth(snapshot.time_to_maturity / odd_steps as Real);
        let k = (odd_steps as Real - 1.0) / 2.0;
        let pu = joshi4_up_prob(k, d2);
        let pdash = joshi4_up_prob(k, d2 + total_variance.sqrt());
        let (up, down) = factors_from_probabilities(growth, pu, pdash);
        let params = TreeParameters::with_probability(snapshot, odd_steps, up, down, pu)?;
        Ok(Self { params })
    }
}

/// Peizer-Pratt method 2 inversion.
///
/// Maps a normal quantile `z` to the probability of an `n`-step binomial
/// approximation; `n` must be odd.
fn peizer_pratt_2(z: Real, n: Size) -> Real {
    let nf = n as Real;
    let r = z / (nf + 1.0 / 3.0 + 0.1 / (nf + 1.0));
    let ex = (-r * r * (nf + 1.0 / 6.0)).exp();
    0.5 + z.signum() * 0.5 * (1.0 - ex).sqrt()
}

/// Joshi's fourth-order up-probability.
fn joshi4_up_prob(k: Real, dj: Real) -> Real {
    let alpha = dj / 8.0_f64.sqrt();
    let alpha2 = alpha * alpha;
    let alpha3 = alpha * alpha2;
    let alpha5 = alpha3 * alpha2;
    let alpha7 = alpha5 * alpha2;
    let beta = -0.375 * alpha - alpha3;
    let gamma = (5.0 / 6.0) * alpha5 + (13.0 / 12.0) * alpha3 + (25.0 / 128.0) * alpha;
    let delta = -0.1025 * alpha - 0.9285 * alpha3 - 1.43 * alpha5 - 0.5 * alpha7;
    let rootk = k.sqrt();
    0.5 + alpha / rootk
        + beta / (k * rootk)
        + gamma / (k * k * rootk)
        + delta / (k * k * k * rootk)
}

// ─── Run-time selection ───────────────────────────────────────────────────────

/// Which parametrization an engine builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TreeKind {
    /// [`CoxRossRubinstein`].
    #[default]
    CoxRossRubinstein,
    /// [`JarrowRudd`].
    JarrowRudd,
    /// [`Trigeorgis`].
    Trigeorgis,
    /// [`Tian`].
    Tian,
    /// [`LeisenReimer`].
    LeisenReimer,
    /// [`Joshi4`].
    Joshi4,
}

impl TreeKind {
    /// Every variant, in declaration order.
    pub const ALL: [TreeKind; 6] = [
        TreeKind::CoxRossRubinstein,
        TreeKind::JarrowRudd,
        TreeKind::Trigeorgis,
        TreeKind::Tian,
        TreeKind::LeisenReimer,
        TreeKind::Joshi4,
    ];

    /// Build the selected parametrization.
    pub fn build(
        self,
        snapshot: &MarketSnapshot,
        steps: Size,
        strike: Real,
    ) -> Result<Box<dyn TreeParametrization>> {
        let tree: Box<dyn TreeParametrization> = match self {
            TreeKind::CoxRossRubinstein => {
                Box::new(CoxRossRubinstein::new(snapshot, steps, strike)?)
            }
            TreeKind::JarrowRudd => Box::new(JarrowRudd::new(snapshot, steps, strike)?),
            TreeKind::Trigeorgis => Box::new(Trigeorgis::new(snapshot, steps, strike)?),
            TreeKind::Tian => Box::new(Tian::new(snapshot, steps, strike)?),
            TreeKind::LeisenReimer => Box::new(LeisenReimer::new(snapshot, steps, strike)?),
            TreeKind::Joshi4 => Box::new(Joshi4::new(snapshot, steps, strike)?),
        };
        tracing::debug!(
            tree = tree.name(),
            steps = tree.steps(),
            up = tree.up(),
            down = tree.down(),
            pu = tree.probability(0),
            "built binomial tree"
        );
        Ok(tree)
    }

    /// Short identifier, as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            TreeKind::CoxRossRubinstein => "crr",
            TreeKind::JarrowRudd => "jarrow_rudd",
            TreeKind::Trigeorgis => "trigeorgis",
            TreeKind::Tian => "tian",
            TreeKind::LeisenReimer => "leisen_reimer",
            TreeKind::Joshi4 => "joshi4",
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeKind {
    type Err = qll_core::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "crr" | "cox_ross_rubinstein" => Ok(TreeKind::CoxRossRubinstein),
            "jr" | "jarrow_rudd" => Ok(TreeKind::JarrowRudd),
            "trigeorgis" => Ok(TreeKind::Trigeorgis),
            "tian" => Ok(TreeKind::Tian),
            "lr" | "leisen_reimer" => Ok(TreeKind::LeisenReimer),
            "joshi4" => Ok(TreeKind::Joshi4),
            _ => qll_core::fail!(InvalidConfiguration, "unknown tree type '{s}'"),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qll_core::Error;

    /// S=50, K=47, r=4%, q=0%, σ=15%, T=314/365.
    fn snapshot() -> MarketSnapshot {
        MarketSnapshot::new(50.0, 0.04, 0.0, 0.15, 314.0 / 365.0)
    }

    #[test]
    fn crr_factors() {
        let m = snapshot();
        let tree = CoxRossRubinstein::new(&m, 100, 47.0).unwrap();
        let dt = m.time_to_maturity / 100.0;
        assert_abs_diff_eq!(tree.dt(), dt, epsilon = 1e-15);
        assert_abs_diff_eq!(tree.up(), (0.15 * dt.sqrt()).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(tree.up() * tree.down(), 1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(tree.discount(0), (-0.04 * dt).exp(), epsilon = 1e-15);
        assert_eq!(tree.name(), "Cox-Ross-Rubinstein");
    }

    #[test]
    fn every_variant_is_a_martingale() {
        let m = snapshot();
        for kind in TreeKind::ALL {
            let tree = kind.build(&m, 100, 47.0).unwrap();
            let growth = m.growth(tree.dt());
            let p = tree.probability(0);
            assert!((0.0..=1.0).contains(&p), "{}: p = {p}", tree.name());
            assert!(tree.down() < growth && growth < tree.up(), "{}", tree.name());
            assert_abs_diff_eq!(
                p * tree.up() + (1.0 - p) * tree.down(),
                growth,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn underlying_geometry() {
        let tree = CoxRossRubinstein::new(&snapshot(), 10, 47.0).unwrap();
        assert_abs_diff_eq!(tree.underlying(0, 0), 50.0, epsilon = 1e-12);
        // CRR recombines onto the spot every second layer.
        assert_abs_diff_eq!(tree.underlying(2, 1), 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tree.underlying(1, 1), 50.0 * tree.up(), epsilon = 1e-12);
        assert_abs_diff_eq!(tree.underlying(1, 0), 50.0 * tree.down(), epsilon = 1e-12);
        assert_eq!(tree.size(7), 8);
        assert_eq!(tree.descendant(3, 2, 0), 2);
        assert_eq!(tree.descendant(3, 2, 1), 3);
    }

    #[test]
    fn strike_dependent_trees_use_odd_steps() {
        let m = snapshot();
        assert_eq!(LeisenReimer::new(&m, 100, 47.0).unwrap().steps(), 101);
        assert_eq!(Joshi4::new(&m, 51, 47.0).unwrap().steps(), 51);
        assert_eq!(CoxRossRubinstein::new(&m, 100, 47.0).unwrap().steps(), 100);
    }

    #[test]
    fn one_step_is_rejected() {
        for kind in TreeKind::ALL {
            let err = kind.build(&snapshot(), 1, 47.0).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn null_spot_is_rejected() {
        let m = snapshot().with_spot(0.0);
        for kind in TreeKind::ALL {
            let err = kind.build(&m, 100, 47.0).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn negative_spot_is_rejected() {
        let m = snapshot().with_spot(-1.0);
        for kind in TreeKind::ALL {
            let err = kind.build(&m, 100, 47.0).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn expired_or_negative_maturity_is_rejected() {
        for t in [0.0, -0.5] {
            let m = snapshot().with_time_to_maturity(t);
            for kind in TreeKind::ALL {
                let err = kind.build(&m, 100, 47.0).unwrap_err();
                assert!(matches!(err, Error::InvalidInput(_)), "{kind}, T = {t}: {err}");
            }
        }
    }

    #[test]
    fn negative_volatility_is_rejected() {
        let m = snapshot().with_volatility(-0.1);
        for kind in TreeKind::ALL {
            let err = kind.build(&m, 100, 47.0).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{kind}: {err}");
        }
    }

    #[test]
    fn zero_volatility_violates_no_arbitrage() {
        let m = snapshot().with_volatility(0.0);
        let err = CoxRossRubinstein::new(&m, 100, 47.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)), "{err}");
    }

    #[test]
    fn too_few_steps_for_drift_is_rejected() {
        // σ√dt < (r−q)dt: the growth factor escapes [d, u].
        let m = MarketSnapshot::new(100.0, 0.50, 0.0, 0.01, 1.0);
        let err = CoxRossRubinstein::new(&m, 2, 100.0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)), "{err}");
    }

    #[test]
    fn non_positive_strike_rejected_by_strike_dependent_trees() {
        let err = LeisenReimer::new(&snapshot(), 100, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{err}");
        assert!(CoxRossRubinstein::new(&snapshot(), 100, 0.0).is_ok());
    }

    #[test]
    fn tree_kind_round_trips_through_strings() {
        for kind in TreeKind::ALL {
            assert_eq!(kind.as_str().parse::<TreeKind>().unwrap(), kind);
        }
        assert_eq!("Leisen-Reimer".parse::<TreeKind>().unwrap(), TreeKind::LeisenReimer);
        assert!(matches!(
            "trinomial".parse::<TreeKind>(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert_eq!(TreeKind::default(), TreeKind::CoxRossRubinstein);
    }

    #[test]
    fn peizer_pratt_is_centred() {
        assert_abs_diff_eq!(peizer_pratt_2(0.0, 101), 0.5, epsilon = 1e-15);
        assert!(peizer_pratt_2(0.5, 101) > 0.5);
        assert!(peizer_pratt_2(-0.5, 101) < 0.5);
    }
}
