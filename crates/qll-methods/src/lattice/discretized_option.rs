//! Vanilla option values discretized on a lattice.
//!
//! The option starts [`Uninitialized`](RollbackState::Uninitialized). Once
//! initialized at maturity it holds one value per node of the current
//! layer and can only move backwards in time. After every backward step the
//! early-exercise hook runs; it is a no-op for European exercise.

use super::bsm_lattice::BlackScholesLattice;
use qll_core::{ensure, fail, Real, Result, Size, Time};
use qll_instruments::{ExerciseType, Payoff};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum RollbackState {
    Uninitialized,
    /// Values at layer `index`; `values.len() == index + 1`.
    AtTime { index: Size, values: Vec<Real> },
}

/// Per-node values of a vanilla option on a binomial lattice.
#[derive(Debug, Clone)]
pub struct DiscretizedVanillaOption {
    payoff: Arc<dyn Payoff>,
    exercise: ExerciseType,
    state: RollbackState,
}

impl DiscretizedVanillaOption {
    /// A new, uninitialized option.
    pub fn new(payoff: Arc<dyn Payoff>, exercise: ExerciseType) -> Self {
        Self {
            payoff,
            exercise,
            state: RollbackState::Uninitialized,
        }
    }

    /// The exercise style driving the post-step adjustment.
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Whether [`initialize`](Self::initialize) has been called.
    pub fn is_initialized(&self) -> bool {
        matches!(self.state, RollbackState::AtTime { .. })
    }

    /// Layer index the values currently belong to.
    pub fn index(&self) -> Result<Size> {
        match &self.state {
            RollbackState::AtTime { index, .. } => Ok(*index),
            RollbackState::Uninitialized => fail!(InvalidState, "option not initialized"),
        }
    }

    /// Time the values currently belong to.
    pub fn time(&self, lattice: &BlackScholesLattice) -> Result<Time> {
        Ok(lattice.time_grid().time(self.index()?))
    }

    /// Node values of the current layer, in increasing underlying order.
    pub fn values(&self) -> Result<&[Real]> {
        match &self.state {
            RollbackState::AtTime { values, .. } => Ok(values),
            RollbackState::Uninitialized => fail!(InvalidState, "option not initialized"),
        }
    }

    /// Value at the root node; requires a rollback to time 0.
    pub fn present_value(&self) -> Result<Real> {
        let index = self.index()?;
        ensure!(
            index == 0,
            InvalidState,
            "present value requested at layer {index}, roll back to 0 first"
        );
        Ok(self.values()?[0])
    }

    /// Set the values at `maturity` to the payoff at each node.
    ///
    /// `maturity` must be a point of the lattice's time grid. Calling this
    /// again restarts the option from the new time.
    pub fn initialize(&mut self, lattice: &BlackScholesLattice, maturity: Time) -> Result<()> {
        let index = lattice.time_grid().index(maturity)?;
        let values = lattice
            .prices(index)
            .into_iter()
            .map(|s| self.payoff.value(s))
            .collect();
        tracing::trace!(index, maturity, payoff = %self.payoff.description(), "initialized option");
        self.state = RollbackState::AtTime { index, values };
        Ok(())
    }

    /// Roll the values back to time `to`, one lattice step at a time.
    ///
    /// Rolling back to the current time is a no-op. Fails with
    /// `InvalidState` before initialization or when `to` lies after the
    /// current time.
    pub fn rollback(&mut self, lattice: &BlackScholesLattice, to: Time) -> Result<()> {
        let from = match &self.state {
            RollbackState::AtTime { index, .. } => *index,
            RollbackState::Uninitialized => {
                fail!(InvalidState, "rollback requested before initialization")
            }
        };
        let grid = lattice.time_grid();
        let from_time = grid.time(from);
        ensure!(
            to <= from_time + grid.tolerance(),
            InvalidState,
            "cannot roll back from t = {from_time} to the later time t = {to}"
        );
        let target = grid.index(to)?;

        let RollbackState::AtTime { index, values } = &mut self.state else {
            fail!(InvalidState, "rollback requested before initialization")
        };
        while *index > target {
            let i = *index - 1;
            *values = lattice.step_back(i, values)?;
            *index = i;
            post_adjust_values(&*self.payoff, self.exercise, lattice, i, values);
        }
        tracing::trace!(from, to = target, "rolled back option");
        Ok(())
    }
}

/// Early-exercise hook: `max(intrinsic, continuation)` at every node when the
/// holder may exercise before maturity.
fn post_adjust_values(
    payoff: &dyn Payoff,
    exercise: ExerciseType,
    lattice: &BlackScholesLattice,
    i: Size,
    values: &mut [Real],
) {
    if !exercise.allows_early_exercise() {
        return;
    }
    for (j, value) in values.iter_mut().enumerate() {
        let intrinsic = payoff.value(lattice.underlying(i, j));
        *value = value.max(intrinsic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::binomial_tree::CoxRossRubinstein;
    use approx::assert_abs_diff_eq;
    use qll_core::Error;
    use qll_instruments::{OptionType, PlainVanillaPayoff};
    use qll_processes::MarketSnapshot;

    const STEPS: Size = 50;

    fn lattice() -> BlackScholesLattice {
        let m = MarketSnapshot::new(50.0, 0.04, 0.0, 0.15, 314.0 / 365.0);
        let tree = CoxRossRubinstein::new(&m, STEPS, 47.0).unwrap();
        BlackScholesLattice::new(Box::new(tree)).unwrap()
    }

    fn put(exercise: ExerciseType) -> DiscretizedVanillaOption {
        DiscretizedVanillaOption::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 47.0)),
            exercise,
        )
    }

    #[test]
    fn initialize_sets_terminal_payoff() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        assert!(!option.is_initialized());
        option.initialize(&l, l.time_grid().end()).unwrap();
        assert_eq!(option.index().unwrap(), STEPS);
        let values = option.values().unwrap();
        assert_eq!(values.len(), STEPS + 1);
        for (j, v) in values.iter().enumerate() {
            assert_abs_diff_eq!(*v, (47.0 - l.underlying(STEPS, j)).max(0.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn rollback_keeps_layer_width() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        option.initialize(&l, l.time_grid().end()).unwrap();
        for i in [40, 17, 2, 0] {
            option.rollback(&l, l.time_grid().time(i)).unwrap();
            assert_eq!(option.index().unwrap(), i);
            assert_eq!(option.values().unwrap().len(), i + 1);
        }
        assert!(option.present_value().unwrap() > 0.0);
    }

    #[test]
    fn rollback_to_current_time_is_a_no_op() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        option.initialize(&l, l.time_grid().end()).unwrap();
        option.rollback(&l, l.time_grid().time(2)).unwrap();
        let before = option.values().unwrap().to_vec();
        option.rollback(&l, l.time_grid().time(2)).unwrap();
        assert_eq!(option.values().unwrap(), before.as_slice());
        assert_eq!(option.index().unwrap(), 2);
    }

    #[test]
    fn rollback_before_initialize_fails() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        let err = option.rollback(&l, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)), "{err}");
        assert!(matches!(option.values(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn rollback_forward_in_time_fails() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        option.initialize(&l, l.time_grid().end()).unwrap();
        option.rollback(&l, l.time_grid().time(10)).unwrap();
        let err = option.rollback(&l, l.time_grid().time(11)).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)), "{err}");
        // The failed call leaves the option where it was.
        assert_eq!(option.index().unwrap(), 10);
    }

    #[test]
    fn present_value_requires_root_layer() {
        let l = lattice();
        let mut option = put(ExerciseType::European);
        option.initialize(&l, l.time_grid().end()).unwrap();
        option.rollback(&l, l.time_grid().time(2)).unwrap();
        assert!(matches!(option.present_value(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn early_exercise_dominates_european() {
        let l = lattice();
        let mut european = put(ExerciseType::European);
        let mut american = put(ExerciseType::American);
        for option in [&mut european, &mut american] {
            option.initialize(&l, l.time_grid().end()).unwrap();
            option.rollback(&l, 0.0).unwrap();
        }
        let eu = european.present_value().unwrap();
        let am = american.present_value().unwrap();
        assert!(am >= eu - 1e-12, "American {am} < European {eu}");
    }

    #[test]
    fn american_values_never_below_intrinsic() {
        let l = lattice();
        let mut option = put(ExerciseType::American);
        option.initialize(&l, l.time_grid().end()).unwrap();
        option.rollback(&l, l.time_grid().time(5)).unwrap();
        for (j, v) in option.values().unwrap().iter().enumerate() {
            assert!(*v >= (47.0 - l.underlying(5, j)).max(0.0));
        }
    }
}
