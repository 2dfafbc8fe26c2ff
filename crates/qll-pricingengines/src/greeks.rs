//! Greeks read off the first lattice layer with three nodes.
//!
//! After rolling the option back to layer 2 the values `(v_d, v_m, v_u)` sit
//! on prices `(s_d, s_m, s_u)`. Delta and gamma are finite differences over
//! those nodes, the value is `v_m`, and theta comes from the Black-Scholes
//! PDE evaluated with the lattice's value, delta and gamma.

use qll_core::{Error, Real, Result, Size};
use qll_methods::{BlackScholesLattice, DiscretizedVanillaOption};
use qll_processes::MarketSnapshot;

/// Value, delta and gamma estimated on a three-node lattice layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeGreeks {
    /// Option value at the middle node.
    pub value: Real,
    /// Average of the two one-sided deltas.
    pub delta: Real,
    /// Change of the one-sided deltas over half the price span.
    pub gamma: Real,
}

impl LatticeGreeks {
    /// Layer the estimator reads from.
    pub const LAYER: Size = 2;

    /// Estimate from the prices and option values of a three-node layer,
    /// both in increasing price order.
    ///
    /// ```
    /// use qll_pricingengines::LatticeGreeks;
    ///
    /// // V(S) = S² has delta 2S and gamma 2.
    /// let prices = [9.0, 10.0, 11.0];
    /// let values = [81.0, 100.0, 121.0];
    /// let g = LatticeGreeks::from_nodes(&prices, &values).unwrap();
    /// assert_eq!(g.value, 100.0);
    /// assert!((g.delta - 20.0).abs() < 1e-12);
    /// assert!((g.gamma - 2.0).abs() < 1e-12);
    /// ```
    pub fn from_nodes(prices: &[Real], values: &[Real]) -> Result<Self> {
        for nodes in [values, prices] {
            if nodes.len() != 3 {
                return Err(Error::LatticeShape {
                    expected: 3,
                    actual: nodes.len(),
                });
            }
        }
        let (s_d, s_m, s_u) = (prices[0], prices[1], prices[2]);
        let (v_d, v_m, v_u) = (values[0], values[1], values[2]);

        let delta_up = (v_u - v_m) / (s_u - s_m);
        let delta_down = (v_m - v_d) / (s_m - s_d);
        Ok(Self {
            value: v_m,
            delta: 0.5 * (delta_up + delta_down),
            gamma: (delta_up - delta_down) / (0.5 * (s_u - s_d)),
        })
    }

    /// Estimate from an option rolled back to a three-node layer of `lattice`.
    ///
    /// Fails with `InvalidState` if the option was never initialized and with
    /// `LatticeShape` if its current layer does not hold exactly three nodes.
    pub fn estimate(option: &DiscretizedVanillaOption, lattice: &BlackScholesLattice) -> Result<Self> {
        let index = option.index()?;
        let values = option.values()?;
        Self::from_nodes(&lattice.prices(index), values)
    }
}

/// Theta per year from the Black-Scholes PDE,
/// `θ = r·V − (r − q)·S·Δ − ½·σ²·S²·Γ`, with `S` the snapshot spot.
pub fn black_scholes_theta(snapshot: &MarketSnapshot, value: Real, delta: Real, gamma: Real) -> Real {
    let s = snapshot.spot;
    let sigma = snapshot.volatility;
    snapshot.risk_free_rate * value - snapshot.carry() * s * delta - 0.5 * sigma * sigma * s * s * gamma
}
