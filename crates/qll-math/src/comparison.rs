//! Floating-point comparison helpers.
//!
//! Used to match requested times against lattice grid points and in tests.

use qll_core::Real;

/// Tolerance for matching times against a time grid, per year of grid
/// length (grids shorter than a year use it as is).
pub const TIME_EPSILON: Real = 1e-10;

/// `true` if `|a - b| <= epsilon`.
#[inline]
pub fn close(a: Real, b: Real, epsilon: Real) -> bool {
    (a - b).abs() <= epsilon
}
