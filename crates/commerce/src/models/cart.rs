//! Cart and cart-item models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{CartId, CartItemId, Money, ProductId, Quantity, UserId};

/// A user's pre-checkout cart.
///
/// At most one per user. `total` is a cached derivation: it always equals the
/// sum of the item line totals, maintained by the repository inside the same
/// locked mutation that touches the items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    /// Last item mutation. Drives abandoned-cart detection.
    pub updated_at: DateTime<Utc>,
    /// When the last abandoned-cart reminder went out, if any.
    pub last_reminder_sent_at: Option<DateTime<Utc>>,
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Unit price snapshotted when the item was added.
    pub unit_price: Money,
}

impl CartItem {
    /// Line total from the snapshotted price.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity.get())
    }
}
