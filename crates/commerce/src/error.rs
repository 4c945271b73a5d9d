//! Unified error handling.
//!
//! Aggregates every service error into [`CommerceError`], classifies it
//! for an outer transport layer, and maps it to a message that never leaks
//! internal detail. Service APIs return their own error types; this module
//! is the single place a delivery surface needs to understand.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::carts::CartError;
use crate::services::coupons::CouponError;
use crate::services::email::EmailError;
use crate::services::notifications::NotificationError;
use crate::services::orders::OrderError;
use crate::services::users::UserError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Ownership or role check failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Coupon operation failed.
    #[error("Coupon error: {0}")]
    Coupon(#[from] CouponError),

    /// Notification operation failed.
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Account operation failed.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// Email transport failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Configuration failed to load.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification a delivery surface can map onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The named resource does not exist.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// The caller may not perform the operation.
    Forbidden,
    /// The input is malformed or violates a business rule.
    Validation,
    /// A collaborator (SMTP relay) refused the operation.
    Unavailable,
    /// Everything else.
    Internal,
}

impl CommerceError {
    /// Classify the error for an outer transport layer.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Auth(_) => ErrorClass::Forbidden,
            Self::Cart(err) => match err {
                CartError::Auth(_) => ErrorClass::Forbidden,
                CartError::CartNotFound
                | CartError::ProductNotFound(_)
                | CartError::ItemNotFound(_) => ErrorClass::NotFound,
                CartError::DuplicateCart => ErrorClass::Conflict,
                CartError::InvalidQuantity(_) => ErrorClass::Validation,
            },
            Self::Order(err) => match err {
                OrderError::Auth(_) => ErrorClass::Forbidden,
                OrderError::CartNotFound
                | OrderError::OrderNotFound(_)
                | OrderError::UserNotFound(_)
                | OrderError::AddressNotFound
                | OrderError::PaymentMethodNotFound => ErrorClass::NotFound,
                OrderError::EmptyCart => ErrorClass::Validation,
                OrderError::InvalidTransition { .. } | OrderError::CouponNotApplicable(_) => {
                    ErrorClass::Conflict
                }
                OrderError::InvalidCoupon(inner) => Self::coupon_class(inner),
                OrderError::EmailDelivery(_) => ErrorClass::Unavailable,
            },
            Self::Coupon(err) => Self::coupon_class(err),
            Self::Notification(err) => match err {
                NotificationError::Auth(_) => ErrorClass::Forbidden,
                NotificationError::NotFound(_) => ErrorClass::NotFound,
            },
            Self::User(err) => match err {
                UserError::Auth(_) => ErrorClass::Forbidden,
                UserError::InvalidEmail(_) => ErrorClass::Validation,
                UserError::AlreadyExists => ErrorClass::Conflict,
                UserError::UserNotFound(_) => ErrorClass::NotFound,
            },
            Self::Email(_) => ErrorClass::Unavailable,
            Self::Repository(RepositoryError::Conflict(_)) => ErrorClass::Conflict,
            Self::Config(_) => ErrorClass::Validation,
        }
    }

    /// A message safe to show a caller. Authorization failures are always the
    /// same opaque string, and infrastructure detail never leaks.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.class() {
            ErrorClass::Forbidden => "Access denied".to_string(),
            ErrorClass::Unavailable => "A downstream service is unavailable".to_string(),
            ErrorClass::Internal => "Internal error".to_string(),
            ErrorClass::NotFound | ErrorClass::Conflict | ErrorClass::Validation => {
                self.to_string()
            }
        }
    }

    const fn coupon_class(err: &CouponError) -> ErrorClass {
        match err {
            CouponError::Auth(_) => ErrorClass::Forbidden,
            CouponError::NotFound(_) => ErrorClass::NotFound,
            CouponError::DuplicateCode(_) => ErrorClass::Conflict,
            CouponError::Expired(_)
            | CouponError::MissingDiscount
            | CouponError::InvalidPercentage => ErrorClass::Validation,
        }
    }
}

/// Result type alias for `CommerceError`.
pub type Result<T> = std::result::Result<T, CommerceError>;
