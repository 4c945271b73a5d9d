//! Delivery address and payment method models.
//!
//! Both are user-owned rows that orders reference by id at checkout; the
//! order points at the selected row rather than snapshotting it.

use serde::{Deserialize, Serialize};

use orchard_core::{AddressId, PaymentMethodId, UserId};

/// A shipping address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub recipient: String,
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// A stored payment method owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub user_id: UserId,
    /// Display label, e.g. `visa`.
    pub label: String,
    /// Last four digits of the underlying instrument.
    pub last_four: String,
}
