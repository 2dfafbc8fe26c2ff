//! Error types for quantlib-lattice.
//!
//! Every failure the lattice engine can raise is a variant of a single
//! `thiserror`-derived enum. Conditions are checked with the [`ensure!`] and
//! [`fail!`] macros, which name the variant to raise.
//!
//! [`ensure!`]: crate::ensure
//! [`fail!`]: crate::fail

use thiserror::Error;

/// The top-level error type used throughout quantlib-lattice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Engine or tree configuration that cannot produce a valid lattice
    /// (too few time steps, no-arbitrage bounds violated).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Market or contract input outside its domain (e.g. non-positive spot).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The payoff is not of the plain vanilla call/put form.
    #[error("unsupported payoff: {0}")]
    UnsupportedPayoff(String),

    /// An operation was requested in a state that does not allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A lattice layer does not have the expected number of nodes.
    #[error("lattice shape error: expected {expected} nodes, found {actual}")]
    LatticeShape {
        /// Node count required by the caller.
        expected: usize,
        /// Node count actually found.
        actual: usize,
    },
}

impl Error {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidConfiguration(_) => "invalid_configuration",
            Error::InvalidInput(_) => "invalid_input",
            Error::UnsupportedPayoff(_) => "unsupported_payoff",
            Error::InvalidState(_) => "invalid_state",
            Error::LatticeShape { .. } => "lattice_shape",
        }
    }
}

/// Shorthand `Result` type used throughout quantlib-lattice.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return early with the given error variant if `$cond` is false.
///
/// The variant must be one of the message-carrying variants of [`Error`].
///
/// # Example
/// ```
/// use qll_core::{ensure, errors::Error};
/// fn positive(x: f64) -> qll_core::errors::Result<f64> {
///     ensure!(x > 0.0, InvalidInput, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::InvalidInput(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::$variant(format!($($msg)*)));
        }
    };
}

/// Return immediately with the given error variant.
///
/// # Example
/// ```
/// use qll_core::{fail, errors::Error};
/// fn always_err() -> qll_core::errors::Result<()> {
///     fail!(InvalidState, "something went wrong");
/// }
/// assert!(matches!(always_err(), Err(Error::InvalidState(_))));
/// ```
#[macro_export]
macro_rules! fail {
    ($variant:ident, $($msg:tt)*) => {
        return Err($crate::errors::Error::$variant(format!($($msg)*)))
    };
}
