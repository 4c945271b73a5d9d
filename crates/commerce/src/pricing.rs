//! Pure price and discount computation.
//!
//! Everything here is side-effect free decimal math on [`Money`]. Intermediate
//! sums keep full precision; only [`apply_discount`] rounds, because its
//! result is the externally visible order total.

use rust_decimal::Decimal;

use orchard_core::{Money, Quantity};

/// Line total for one item: unit price × quantity.
#[must_use]
pub fn line_total(unit_price: Money, quantity: Quantity) -> Money {
    unit_price.times(quantity.get())
}

/// Sum of line totals, unrounded.
#[must_use]
pub fn items_subtotal(items: impl IntoIterator<Item = (Money, Quantity)>) -> Money {
    items
        .into_iter()
        .map(|(price, quantity)| line_total(price, quantity))
        .sum()
}

/// Apply a coupon discount to a subtotal.
///
/// The percentage discount is applied first to the pre-discount subtotal, the
/// flat amount is subtracted second, and the result is floored at zero; a
/// coupon can never drive a total negative. The final value is rounded
/// half-up to scale 2 because it is stored and displayed as-is.
#[must_use]
pub fn apply_discount(
    subtotal: Money,
    percentage: Option<Decimal>,
    amount: Option<Money>,
) -> Money {
    let mut total = subtotal;
    if let Some(pct) = percentage {
        let keep = Decimal::ONE - pct / Decimal::ONE_HUNDRED;
        total = Money::new(total.amount() * keep);
    }
    if let Some(flat) = amount {
        total = total.saturating_sub(flat);
    }
    total.rounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn line_total_is_price_times_quantity() {
        assert_eq!(
            line_total(Money::from_cents(1999), qty(2)),
            Money::from_cents(3998)
        );
        assert_eq!(line_total(Money::ZERO, qty(5)), Money::ZERO);
    }

    #[test]
    fn subtotal_sums_all_lines() {
        let subtotal = items_subtotal(vec![
            (Money::from_cents(1999), qty(2)),
            (Money::from_cents(500), qty(1)),
        ]);
        assert_eq!(subtotal, Money::from_cents(4498));
    }

    #[test]
    fn percentage_applies_before_flat_amount() {
        // 100.00 -> 10% off = 90.00 -> minus 5.00 = 85.00
        let total = apply_discount(
            Money::from_cents(10_000),
            Some(Decimal::TEN),
            Some(Money::from_cents(500)),
        );
        assert_eq!(total, Money::from_cents(8500));
    }

    #[test]
    fn discount_floors_at_zero() {
        let total = apply_discount(
            Money::from_cents(300),
            Some(Decimal::from(50)),
            Some(Money::from_cents(1000)),
        );
        assert_eq!(total, Money::ZERO);
    }

    #[test]
    fn ten_percent_off_39_98_rounds_to_35_98() {
        let total = apply_discount(Money::from_cents(3998), Some(Decimal::TEN), None);
        assert_eq!(total, Money::from_cents(3598));
    }

    #[test]
    fn no_discount_components_round_trips() {
        assert_eq!(
            apply_discount(Money::from_cents(3998), None, None),
            Money::from_cents(3998)
        );
    }
}
