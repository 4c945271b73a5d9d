//! Type-safe monetary amounts using decimal arithmetic.
//!
//! All money in the system flows through [`Money`], which wraps
//! [`rust_decimal::Decimal`] so totals never accumulate floating-point drift.
//! Intermediate sums keep full precision; rounding to the external scale of
//! two decimal places happens only at [`Money::rounded`] / [`Money::display`].

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Scale used for externally visible amounts.
const DISPLAY_SCALE: u32 = 2;

/// A monetary amount.
///
/// Internally unbounded-precision decimal; rounded half-up to two decimal
/// places only when crossing an external boundary (persisted order totals,
/// display strings).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a money value from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a money value from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, DISPLAY_SCALE))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether this amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a unit count (line total = unit price × quantity).
    #[must_use]
    pub fn times(&self, count: u32) -> Self {
        Self(self.0 * Decimal::from(count))
    }

    /// Subtract, flooring the result at zero. Discounts never produce a
    /// negative total.
    #[must_use]
    pub fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff.is_sign_negative() {
            Self::ZERO
        } else {
            Self(diff)
        }
    }

    /// Round half-up to the external scale of two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Render for display, e.g. `"39.98"`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.2}", self.rounded().0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_has_two_decimal_places() {
        assert_eq!(Money::from_cents(1999).display(), "19.99");
        assert_eq!(Money::from_cents(0), Money::ZERO);
    }

    #[test]
    fn times_multiplies_exactly() {
        assert_eq!(Money::from_cents(1999).times(2), Money::from_cents(3998));
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        let five = Money::from_cents(500);
        let ten = Money::from_cents(1000);
        assert_eq!(ten.saturating_sub(five), five);
        assert_eq!(five.saturating_sub(ten), Money::ZERO);
    }

    #[test]
    fn rounding_is_half_up_and_deferred() {
        // 39.98 * 0.9 = 35.982 -> 35.98; .985 rounds up
        let raw = Money::new(Decimal::new(35_982, 3));
        assert_eq!(raw.rounded(), Money::from_cents(3598));
        let half = Money::new(Decimal::new(35_985, 3));
        assert_eq!(half.rounded(), Money::from_cents(3599));
        // rounding does not happen inside sums
        let sum: Money = [raw, raw].into_iter().sum();
        assert_eq!(sum.amount(), Decimal::new(71_964, 3));
    }

    #[test]
    fn displays_at_fixed_scale() {
        assert_eq!(Money::from_cents(3500).to_string(), "35.00");
    }
}
