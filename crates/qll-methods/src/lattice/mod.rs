//! Lattice methods for option pricing.
//!
//! * [`TreeParametrization`] — pluggable recombining binomial tree
//!   (CRR, Jarrow-Rudd, Trigeorgis, Tian, Leisen-Reimer, Joshi4)
//! * [`TimeGrid`] — time points of the lattice layers
//! * [`BlackScholesLattice`] — tree + grid + one-step backward induction
//! * [`DiscretizedVanillaOption`] — node values rolled back through a lattice

pub mod binomial_tree;
pub mod bsm_lattice;
pub mod discretized_option;

pub use binomial_tree::{
    CoxRossRubinstein, JarrowRudd, Joshi4, LeisenReimer, Tian, TreeKind, TreeParameters,
    TreeParametrization, Trigeorgis,
};
pub use bsm_lattice::BlackScholesLattice;
pub use discretized_option::DiscretizedVanillaOption;

use qll_core::{ensure, Real, Result, Size, Time};
use qll_math::comparison::{close, TIME_EPSILON};

// ─── TimeGrid ─────────────────────────────────────────────────────────────────

/// Time points of the lattice layers, from the valuation date (0) to
/// maturity.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<Time>,
    dts: Vec<Time>,
}

impl TimeGrid {
    /// Uniform grid from 0 to `end` with `steps` intervals.
    pub fn uniform(end: Time, steps: Size) -> Result<Self> {
        ensure!(steps > 0, InvalidConfiguration, "time grid needs at least one step");
        ensure!(end > 0.0, InvalidInput, "time grid end must be positive, got {end}");
        let dt = end / steps as Real;
        let mut times: Vec<Time> = (0..steps).map(|i| i as Real * dt).collect();
        // Pin the last point to `end` so maturity lookups are exact.
        times.push(end);
        let dts = times.windows(2).map(|w| w[1] - w[0]).collect();
        Ok(Self { times, dts })
    }

    /// Number of time points (= steps + 1).
    pub fn size(&self) -> Size {
        self.times.len()
    }

    /// Number of steps (= time points − 1).
    pub fn steps(&self) -> Size {
        self.dts.len()
    }

    /// Time at index `i`.
    pub fn time(&self, i: Size) -> Time {
        self.times[i]
    }

    /// Time step between index `i` and `i + 1`.
    pub fn dt(&self, i: Size) -> Time {
        self.dts[i]
    }

    /// Final time.
    pub fn end(&self) -> Time {
        self.times[self.times.len() - 1]
    }

    /// All time points.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Index of the grid point closest to `t`.
    pub fn closest_index(&self, t: Time) -> Size {
        let upper = self.times.partition_point(|&x| x < t);
        if upper == 0 {
            return 0;
        }
        if upper == self.times.len() {
            return upper - 1;
        }
        if t - self.times[upper - 1] <= self.times[upper] - t {
            upper - 1
        } else {
            upper
        }
    }

    /// Tolerance used by [`index`](Self::index), `TIME_EPSILON` scaled by
    /// the grid length.
    pub fn tolerance(&self) -> Time {
        TIME_EPSILON * self.end().max(1.0)
    }

    /// Index of the grid point equal to `t`.
    ///
    /// Fails with `InvalidInput` if `t` is not within
    /// [`tolerance`](Self::tolerance) of a grid point.
    pub fn index(&self, t: Time) -> Result<Size> {
        let i = self.closest_index(t);
        ensure!(
            close(self.times[i], t, self.tolerance()),
            InvalidInput,
            "time {t} is not on the grid (closest point {})",
            self.times[i]
        );
        Ok(i)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
