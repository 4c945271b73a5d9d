//! Order and order-item models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orchard_core::{
    AddressId, Money, OrderId, OrderItemId, OrderStatus, PaymentMethodId, ProductId, Quantity,
    UserId,
};

/// An order created from a cart at checkout.
///
/// Items are frozen at creation; only `status`, `tracking_number`, the
/// total-after-coupon, and `updated_at` may change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    /// Public reference used in confirmation emails and tracking lookups.
    pub reference: Uuid,
    pub status: OrderStatus,
    /// Sum of frozen line totals minus any applied coupon discount,
    /// stored at scale 2.
    pub total: Money,
    pub delivery_address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    pub coupon_code: Option<String>,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen line in an order.
///
/// Quantity and price are copied from the cart item at checkout and never
/// change, decoupling the order from future product price edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl OrderItem {
    /// Line total from the frozen price.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity.get())
    }
}
