//! Coupon model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orchard_core::{CouponId, Money};

/// A named, time-bounded discount rule.
///
/// Checkout only reads coupons; creation and deactivation are privileged
/// operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    /// Unique lookup code, e.g. `SAVE10`.
    pub code: String,
    /// Flat discount, subtracted after the percentage discount.
    pub discount_amount: Option<Money>,
    /// Percentage discount in `(0, 100]`, applied to the pre-discount subtotal.
    pub discount_percentage: Option<Decimal>,
    /// Valid through the end of this day.
    pub valid_until: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can be applied at `as_of`.
    ///
    /// The validity window is inclusive: a coupon expiring on 2026-03-01 is
    /// accepted for the whole of that day.
    #[must_use]
    pub fn is_valid_at(&self, as_of: DateTime<Utc>) -> bool {
        self.is_active && as_of.date_naive() <= self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn coupon(valid_until: NaiveDate, is_active: bool) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE10".to_string(),
            discount_amount: None,
            discount_percentage: Some(Decimal::TEN),
            valid_until,
            is_active,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn valid_through_end_of_expiry_day() {
        let expiry = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let c = coupon(expiry, true);

        let late_on_expiry_day = Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap();
        assert!(c.is_valid_at(late_on_expiry_day));

        let next_morning = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 1).unwrap();
        assert!(!c.is_valid_at(next_morning));
    }

    #[test]
    fn inactive_coupon_is_never_valid() {
        let expiry = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        let c = coupon(expiry, false);
        assert!(!c.is_valid_at(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()));
    }
}
