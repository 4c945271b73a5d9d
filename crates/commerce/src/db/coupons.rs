//! Coupon repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use orchard_core::{CouponId, Money};

use super::{MemoryDb, RepositoryError};
use crate::models::Coupon;

/// Repository for coupon rows.
pub struct CouponRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the code is already taken.
    pub fn create(
        &self,
        code: &str,
        discount_amount: Option<Money>,
        discount_percentage: Option<Decimal>,
        valid_until: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Coupon, RepositoryError> {
        let mut tables = self.db.write();
        if tables.coupons.values().any(|c| c.code == code) {
            return Err(RepositoryError::Conflict(format!(
                "coupon code already exists: {code}"
            )));
        }
        let coupon = Coupon {
            id: CouponId::new(tables.next_id()),
            code: code.to_string(),
            discount_amount,
            discount_percentage,
            valid_until,
            is_active: true,
            created_at: now,
        };
        tables.coupons.insert(coupon.id, coupon.clone());
        Ok(coupon)
    }

    /// Look up a coupon by its code.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<Coupon> {
        self.db
            .read()
            .coupons
            .values()
            .find(|c| c.code == code)
            .cloned()
    }

    /// Flip the activity flag, returning the updated row.
    #[must_use]
    pub fn set_active(&self, id: CouponId, is_active: bool) -> Option<Coupon> {
        let mut tables = self.db.write();
        let coupon = tables.coupons.get_mut(&id)?;
        coupon.is_active = is_active;
        Some(coupon.clone())
    }
}
