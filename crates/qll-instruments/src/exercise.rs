//! Option exercise rights.
//!
//! Only the exercise *style* matters to the lattice: the last exercise time
//! is the snapshot's time to maturity.

use std::fmt;

/// When the holder may exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Exercise at expiry only.
    #[default]
    European,
    /// Exercise at any time up to expiry.
    American,
}

impl ExerciseType {
    /// Whether exercise is allowed before expiry.
    pub fn allows_early_exercise(self) -> bool {
        matches!(self, ExerciseType::American)
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::European => write!(f, "European"),
            ExerciseType::American => write!(f, "American"),
        }
    }
}
