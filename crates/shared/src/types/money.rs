//! Amount helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the engine is a `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum absolute difference under which two amounts are considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(Decimal);

impl Tolerance {
    /// Creates a tolerance. Negative values are taken as their absolute value.
    #[must_use]
    pub fn new(value: Decimal) -> Self {
        Self(value.abs())
    }

    /// One hundredth of a currency unit, the bookkeeping rounding tolerance.
    #[must_use]
    pub fn cent() -> Self {
        Self(Decimal::new(1, 2))
    }

    /// One full currency unit.
    #[must_use]
    pub fn unit() -> Self {
        Self(Decimal::ONE)
    }

    /// Returns the tolerance value.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Returns true if `a` and `b` differ by at most the tolerance.
    #[must_use]
    pub fn accepts(self, a: Decimal, b: Decimal) -> bool {
        (a - b).abs() <= self.0
    }

    /// Returns true if `amount` exceeds the tolerance in absolute value.
    #[must_use]
    pub fn exceeded_by(self, amount: Decimal) -> bool {
        amount.abs() > self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::cent()
    }
}

/// Formats an amount with exactly two decimals, rounding half away from zero.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
