//! Coupon management and validation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use orchard_core::Money;

use super::auth::{self, AuthError, Caller};
use crate::db::{CouponRepository, MemoryDb, RepositoryError};
use crate::models::Coupon;

/// Errors from coupon operations.
#[derive(Debug, Error)]
pub enum CouponError {
    /// Privileged operation attempted without a privileged role.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No coupon with this code.
    #[error("coupon not found: {0}")]
    NotFound(String),

    /// Coupon is deactivated or past its validity window.
    #[error("coupon expired: {0}")]
    Expired(String),

    /// Another coupon already uses this code.
    #[error("coupon code already exists: {0}")]
    DuplicateCode(String),

    /// A coupon needs at least one discount component.
    #[error("coupon must define a discount amount or percentage")]
    MissingDiscount,

    /// Percentage discounts live in `(0, 100]`.
    #[error("discount percentage must be greater than 0 and at most 100")]
    InvalidPercentage,
}

/// Fields for a new coupon.
#[derive(Debug, Clone)]
pub struct CreateCouponParams {
    pub code: String,
    pub discount_amount: Option<Money>,
    pub discount_percentage: Option<Decimal>,
    pub valid_until: NaiveDate,
}

/// Coupon service.
#[derive(Clone)]
pub struct CouponService {
    db: MemoryDb,
}

impl CouponService {
    /// Create a coupon service over the shared store.
    #[must_use]
    pub const fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    /// Look up a coupon and check it is usable at `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NotFound`] for an unknown code and
    /// [`CouponError::Expired`] when the coupon is deactivated or its
    /// validity day has fully passed.
    pub fn validate(&self, code: &str, as_of: DateTime<Utc>) -> Result<Coupon, CouponError> {
        let coupon = CouponRepository::new(&self.db)
            .find_by_code(code)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))?;
        if !coupon.is_valid_at(as_of) {
            return Err(CouponError::Expired(code.to_string()));
        }
        Ok(coupon)
    }

    /// Create a coupon. Privileged.
    ///
    /// # Errors
    ///
    /// Returns `Auth` for unprivileged callers, `MissingDiscount` /
    /// `InvalidPercentage` for malformed discounts, and `DuplicateCode` when
    /// the code is taken.
    #[instrument(skip(self, params), fields(code = %params.code))]
    pub fn create(&self, caller: Caller, params: CreateCouponParams) -> Result<Coupon, CouponError> {
        auth::require_privileged(caller)?;
        if params.discount_amount.is_none() && params.discount_percentage.is_none() {
            return Err(CouponError::MissingDiscount);
        }
        if let Some(pct) = params.discount_percentage {
            if pct <= Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
                return Err(CouponError::InvalidPercentage);
            }
        }
        let coupon = CouponRepository::new(&self.db)
            .create(
                &params.code,
                params.discount_amount,
                params.discount_percentage,
                params.valid_until,
                Utc::now(),
            )
            .map_err(|RepositoryError::Conflict(_)| CouponError::DuplicateCode(params.code))?;
        info!(coupon = %coupon.id, "coupon created");
        Ok(coupon)
    }

    /// Deactivate a coupon. Privileged.
    ///
    /// # Errors
    ///
    /// Returns `Auth` for unprivileged callers and `NotFound` for an unknown
    /// code.
    #[instrument(skip(self))]
    pub fn deactivate(&self, caller: Caller, code: &str) -> Result<Coupon, CouponError> {
        auth::require_privileged(caller)?;
        let repo = CouponRepository::new(&self.db);
        let coupon = repo
            .find_by_code(code)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))?;
        repo.set_active(coupon.id, false)
            .ok_or_else(|| CouponError::NotFound(code.to_string()))
    }
}
