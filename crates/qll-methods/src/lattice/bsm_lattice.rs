//! Binomial lattice over a flat Black-Scholes market.
//!
//! The lattice pairs a [`TreeParametrization`] with the [`TimeGrid`] of its
//! layers and provides the single backward-induction step
//!
//! `v[i][j] = exp(−r·dt) · (p·v[i+1][j+1] + (1 − p)·v[i+1][j])`.
//!
//! Nodes of one layer are independent of each other; with the `parallel`
//! feature wide layers are computed on the rayon pool. Layers themselves are
//! always processed one after the other.

use super::binomial_tree::TreeParametrization;
use super::TimeGrid;
use qll_core::{ensure, DiscountFactor, Error, Real, Result, Size};

/// Layer width from which the parallel step kicks in.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: Size = 4096;

/// A binomial lattice: tree parametrization plus time grid.
#[derive(Debug)]
pub struct BlackScholesLattice {
    tree: Box<dyn TreeParametrization>,
    time_grid: TimeGrid,
}

impl BlackScholesLattice {
    /// Build the lattice on a uniform grid of `tree.steps()` intervals.
    pub fn new(tree: Box<dyn TreeParametrization>) -> Result<Self> {
        let steps = tree.steps();
        let time_grid = TimeGrid::uniform(steps as Real * tree.dt(), steps)?;
        Ok(Self { tree, time_grid })
    }

    /// The tree parametrization.
    pub fn tree(&self) -> &dyn TreeParametrization {
        &*self.tree
    }

    /// The time grid (`steps + 1` points).
    pub fn time_grid(&self) -> &TimeGrid {
        &self.time_grid
    }

    /// Number of nodes at layer `i`.
    pub fn size(&self, i: Size) -> Size {
        self.tree.size(i)
    }

    /// Underlying price at node `(i, j)`.
    pub fn underlying(&self, i: Size, j: Size) -> Real {
        self.tree.underlying(i, j)
    }

    /// Underlying prices of every node at layer `i`, in increasing order.
    pub fn prices(&self, i: Size) -> Vec<Real> {
        (0..self.size(i)).map(|j| self.underlying(i, j)).collect()
    }

    /// Discount factor for the step leaving layer `i`.
    pub fn discount(&self, i: Size) -> DiscountFactor {
        self.tree.discount(i)
    }

    /// Discounted expectation of the values at layer `i + 1`, giving the
    /// values at layer `i`.
    ///
    /// `values` must hold exactly `size(i + 1)` entries.
    pub fn step_back(&self, i: Size, values: &[Real]) -> Result<Vec<Real>> {
        ensure!(
            i < self.time_grid.steps(),
            InvalidInput,
            "cannot step back from layer {} of a {}-step lattice",
            i + 1,
            self.time_grid.steps()
        );
        let expected = self.size(i + 1);
        if values.len() != expected {
            return Err(Error::LatticeShape {
                expected,
                actual: values.len(),
            });
        }

        let discount = self.discount(i);
        let pu = self.tree.probability(i);
        let pd = 1.0 - pu;
        let tree = &*self.tree;
        let node = |j: Size| {
            let up = values[tree.descendant(i, j, 1)];
            let down = values[tree.descendant(i, j, 0)];
            discount * (pu * up + pd * down)
        };
        Ok(collect_layer(self.size(i), node))
    }
}

#[cfg(feature = "parallel")]
fn collect_layer<F>(size: Size, node: F) -> Vec<Real>
where
    F: Fn(Size) -> Real + Send + Sync,
{
    use rayon::prelude::*;

    if size >= PARALLEL_THRESHOLD {
        (0..size).into_par_iter().map(node).collect()
    } else {
        (0..size).map(node).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_layer<F>(size: Size, node: F) -> Vec<Real>
where
    F: Fn(Size) -> Real,
{
    (0..size).map(node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::binomial_tree::CoxRossRubinstein;
    use approx::assert_abs_diff_eq;
    use qll_processes::MarketSnapshot;

    fn lattice(steps: Size) -> BlackScholesLattice {
        let m = MarketSnapshot::new(100.0, 0.05, 0.01, 0.20, 1.0);
        let tree = CoxRossRubinstein::new(&m, steps, 100.0).unwrap();
        BlackScholesLattice::new(Box::new(tree)).unwrap()
    }

    #[test]
    fn grid_matches_tree() {
        let l = lattice(4);
        assert_eq!(l.time_grid().size(), 5);
        assert_eq!(l.time_grid().end(), 1.0);
        assert_abs_diff_eq!(l.time_grid().dt(0), l.tree().dt(), epsilon = 1e-15);
    }

    #[test]
    fn step_back_discounts_expectation() {
        let l = lattice(4);
        let p = l.tree().probability(3);
        let d = l.discount(3);
        let next = [1.0, 2.0, 3.0, 4.0, 5.0];
        let values = l.step_back(3, &next).unwrap();
        assert_eq!(values.len(), 4);
        for (j, v) in values.iter().enumerate() {
            let expected = d * (p * next[j + 1] + (1.0 - p) * next[j]);
            assert_abs_diff_eq!(*v, expected, epsilon = 1e-15);
        }
    }

    #[test]
    fn step_back_of_underlying_is_forward_discounted() {
        // E[S(t+dt)] = S·exp((r−q)dt), so discounting gives S·exp(−q·dt).
        let l = lattice(10);
        let values = l.step_back(4, &l.prices(5)).unwrap();
        let q_discount = (-0.01 * l.tree().dt()).exp();
        for (j, v) in values.iter().enumerate() {
            assert_abs_diff_eq!(*v, l.underlying(4, j) * q_discount, epsilon = 1e-10);
        }
    }

    #[test]
    fn step_back_rejects_wrong_width() {
        let l = lattice(4);
        let err = l.step_back(2, &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            Error::LatticeShape {
                expected: 4,
                actual: 2
            }
        );
        assert!(matches!(
            l.step_back(4, &[0.0; 6]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn prices_increase_across_a_layer() {
        let l = lattice(6);
        let prices = l.prices(6);
        assert_eq!(prices.len(), 7);
        assert!(prices.windows(2).all(|w| w[0] < w[1]));
    }
}
