//! Option payoffs.
//!
//! A payoff maps the underlying price at exercise to the amount received.
//! Engines that only handle the plain call/put ask for it through
//! [`Payoff::as_plain_vanilla`] and reject anything else.

use qll_core::Real;
use std::fmt;

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OptionType {
    /// Right to buy.
    Call,
    /// Right to sell.
    Put,
}

impl OptionType {
    /// +1 for Call, −1 for Put.
    pub fn sign(self) -> Real {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Signed distance of `price` from `strike`: `φ(S − K)`, positive in the
    /// money.
    pub fn moneyness(self, price: Real, strike: Real) -> Real {
        self.sign() * (price - strike)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OptionType::Call => "Call",
            OptionType::Put => "Put",
        })
    }
}

/// Terminal (or exercise) payoff of an option.
pub trait Payoff: fmt::Debug + Send + Sync {
    /// Amount received when exercising against `price`.
    fn value(&self, price: Real) -> Real;

    /// Short payoff family name.
    fn name(&self) -> &str;

    /// Name plus terms, for logs and error messages.
    fn description(&self) -> String {
        self.name().to_string()
    }

    /// The plain call/put form, if this is one.
    fn as_plain_vanilla(&self) -> Option<&PlainVanillaPayoff> {
        None
    }
}

/// Standard call/put payoff, `max(φ(S − K), 0)` with `φ = ±1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlainVanillaPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
}

impl PlainVanillaPayoff {
    /// Payoff of a call or put struck at `strike`.
    pub fn new(option_type: OptionType, strike: Real) -> Self {
        Self {
            option_type,
            strike,
        }
    }
}

impl Payoff for PlainVanillaPayoff {
    fn value(&self, price: Real) -> Real {
        self.option_type.moneyness(price, self.strike).max(0.0)
    }

    fn name(&self) -> &str {
        "Vanilla"
    }

    fn description(&self) -> String {
        format!("Vanilla {} @ {}", self.option_type, self.strike)
    }

    fn as_plain_vanilla(&self) -> Option<&PlainVanillaPayoff> {
        Some(self)
    }
}

/// Digital payoff: a fixed cash amount when finishing in the money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashOrNothingPayoff {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike price.
    pub strike: Real,
    /// Amount paid in the money.
    pub cash_payoff: Real,
}

impl CashOrNothingPayoff {
    /// Digital paying `cash_payoff` beyond `strike`.
    pub fn new(option_type: OptionType, strike: Real, cash_payoff: Real) -> Self {
        Self {
            option_type,
            strike,
            cash_payoff,
        }
    }
}

impl Payoff for CashOrNothingPayoff {
    fn value(&self, price: Real) -> Real {
        if self.option_type.moneyness(price, self.strike) > 0.0 {
            self.cash_payoff
        } else {
            0.0
        }
    }

    fn name(&self) -> &str {
        "CashOrNothing"
    }

    fn description(&self) -> String {
        format!(
            "CashOrNothing {} @ {} paying {}",
            self.option_type, self.strike, self.cash_payoff
        )
    }
}
