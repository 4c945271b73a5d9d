//! Order repository.
//!
//! Checkout is one compound operation: freeze the cart's items, price the
//! order, insert it, and clear the cart, all under a single write lock. A
//! concurrent cart mutation serializes entirely before or after checkout,
//! never interleaved. Status and total writes follow the same rule: the
//! guarding predicate (transition legality, `PENDING`-only) is re-checked
//! under the write lock that performs the write, so two racing mutations of
//! one order serialize and the loser observes the winner's state.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use orchard_core::{
    AddressId, CartId, Money, OrderId, OrderItemId, OrderStatus, PaymentMethodId, UserId,
};

use super::MemoryDb;
use crate::models::{Coupon, Order, OrderItem};
use crate::pricing;

/// Conflicts detected while freezing a cart into an order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart had no items at the moment of checkout.
    #[error("cart is empty")]
    EmptyCart,
}

/// Conflicts detected while writing a status.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// No such order.
    #[error("order not found")]
    NotFound,
    /// The state machine has no edge from the order's current status.
    #[error("illegal transition from {from}")]
    Illegal { from: OrderStatus },
}

/// Outcome of [`OrderRepository::transition_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The status changed; `from` is the state it left.
    Applied { order: Order, from: OrderStatus },
    /// The order already held the requested status; nothing was written.
    Unchanged(Order),
}

/// Conflicts detected while applying a coupon to an order.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApplyCouponError {
    /// No such order.
    #[error("order not found")]
    NotFound,
    /// The order left `PENDING` before the write.
    #[error("order is no longer pending: {0}")]
    NotPending(OrderStatus),
}

/// Inputs to [`OrderRepository::create_from_cart`], resolved by the service
/// layer beforehand.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRecord<'a> {
    pub user_id: UserId,
    pub cart_id: CartId,
    pub delivery_address_id: AddressId,
    pub payment_method_id: PaymentMethodId,
    /// Validated coupon to apply, if any.
    pub coupon: Option<&'a Coupon>,
}

/// Repository for orders and their frozen items.
pub struct OrderRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Freeze a cart into a `PENDING` order and empty the cart.
    ///
    /// Item quantities and snapshotted prices are copied; the total is the
    /// discounted item sum, stored at scale 2.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no items when the
    /// lock is taken; a cart emptied mid-request fails here, not earlier.
    pub fn create_from_cart(
        &self,
        record: CheckoutRecord<'_>,
        now: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        let mut tables = self.db.write();

        let frozen: Vec<_> = tables
            .cart_items
            .values()
            .filter(|i| i.cart_id == record.cart_id)
            .map(|i| (i.product_id, i.quantity, i.unit_price))
            .collect();
        if frozen.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let subtotal = pricing::items_subtotal(frozen.iter().map(|&(_, q, p)| (p, q)));
        let total = match record.coupon {
            Some(coupon) => {
                pricing::apply_discount(subtotal, coupon.discount_percentage, coupon.discount_amount)
            }
            None => subtotal.rounded(),
        };

        let order = Order {
            id: OrderId::new(tables.next_id()),
            user_id: record.user_id,
            reference: Uuid::new_v4(),
            status: OrderStatus::Pending,
            total,
            delivery_address_id: record.delivery_address_id,
            payment_method_id: record.payment_method_id,
            coupon_code: record.coupon.map(|c| c.code.clone()),
            tracking_number: None,
            created_at: now,
            updated_at: now,
        };

        for (product_id, quantity, unit_price) in frozen {
            let item = OrderItem {
                id: OrderItemId::new(tables.next_id()),
                order_id: order.id,
                product_id,
                quantity,
                unit_price,
            };
            tables.order_items.insert(item.id, item);
        }

        // Post-checkout the cart is explicitly emptied so the same items
        // cannot be ordered twice.
        tables.cart_items.retain(|_, i| i.cart_id != record.cart_id);
        if let Some(cart) = tables.carts.get_mut(&record.cart_id) {
            cart.total = Money::ZERO;
            cart.updated_at = now;
        }

        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// Get an order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.db.read().orders.get(&id).cloned()
    }

    /// The order's frozen items, in insertion order.
    #[must_use]
    pub fn items(&self, order_id: OrderId) -> Vec<OrderItem> {
        self.db
            .read()
            .order_items
            .values()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    /// All orders belonging to a user, newest first.
    #[must_use]
    pub fn list_by_user(&self, user_id: UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .db
            .read()
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        orders
    }

    /// All orders in the store, newest first.
    #[must_use]
    pub fn list_all(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.db.read().orders.values().cloned().collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        orders
    }

    /// Move an order along the state machine, validating the edge under the
    /// write lock that performs the write.
    ///
    /// Re-submitting the current status is an idempotent no-op: the order is
    /// returned [`StatusTransition::Unchanged`] and `updated_at` is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Illegal`] with the status actually held at
    /// write time; a racing transition that landed first is what the caller
    /// sees in `from`.
    pub fn transition_status(
        &self,
        id: OrderId,
        new_status: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusTransition, TransitionError> {
        let mut tables = self.db.write();
        let order = tables.orders.get_mut(&id).ok_or(TransitionError::NotFound)?;
        if order.status == new_status {
            return Ok(StatusTransition::Unchanged(order.clone()));
        }
        if !order.status.can_transition_to(new_status) {
            return Err(TransitionError::Illegal { from: order.status });
        }
        let from = order.status;
        order.status = new_status;
        order.updated_at = now;
        Ok(StatusTransition::Applied {
            order: order.clone(),
            from,
        })
    }

    /// Recompute an order's total from its frozen items under the given
    /// coupon, writing total and coupon code only if the order is still
    /// `PENDING` at write time.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyCouponError::NotPending`] with the status actually held
    /// when the lock was taken; a payment that raced ahead fails the write
    /// here, not in an earlier unlocked check.
    pub fn apply_coupon_if_pending(
        &self,
        id: OrderId,
        coupon: &Coupon,
        now: DateTime<Utc>,
    ) -> Result<Order, ApplyCouponError> {
        let mut tables = self.db.write();
        let status = tables
            .orders
            .get(&id)
            .ok_or(ApplyCouponError::NotFound)?
            .status;
        if status != OrderStatus::Pending {
            return Err(ApplyCouponError::NotPending(status));
        }

        let subtotal = pricing::items_subtotal(
            tables
                .order_items
                .values()
                .filter(|i| i.order_id == id)
                .map(|i| (i.unit_price, i.quantity)),
        );
        let total =
            pricing::apply_discount(subtotal, coupon.discount_percentage, coupon.discount_amount);

        let order = tables.orders.get_mut(&id).ok_or(ApplyCouponError::NotFound)?;
        order.total = total;
        order.coupon_code = Some(coupon.code.clone());
        order.updated_at = now;
        Ok(order.clone())
    }

    /// Attach a tracking number.
    #[must_use]
    pub fn set_tracking(
        &self,
        id: OrderId,
        tracking_number: &str,
        now: DateTime<Utc>,
    ) -> Option<Order> {
        let mut tables = self.db.write();
        let order = tables.orders.get_mut(&id)?;
        order.tracking_number = Some(tracking_number.to_string());
        order.updated_at = now;
        Some(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use orchard_core::Quantity;

    use super::*;
    use crate::db::CartRepository;

    fn checkout_record(user: UserId, cart: CartId) -> CheckoutRecord<'static> {
        CheckoutRecord {
            user_id: user,
            cart_id: cart,
            delivery_address_id: AddressId::new(90),
            payment_method_id: PaymentMethodId::new(91),
            coupon: None,
        }
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let db = MemoryDb::new();
        let cart = CartRepository::new(&db)
            .create_for_user(UserId::new(1), Utc::now())
            .unwrap();
        let err = OrderRepository::new(&db)
            .create_from_cart(checkout_record(UserId::new(1), cart.id), Utc::now())
            .unwrap_err();
        assert_eq!(err, CheckoutError::EmptyCart);
    }

    #[test]
    fn checkout_freezes_items_and_clears_cart() {
        let db = MemoryDb::new();
        let carts = CartRepository::new(&db);
        let orders = OrderRepository::new(&db);
        let user = UserId::new(1);
        let cart = carts.create_for_user(user, Utc::now()).unwrap();
        let _ = carts.add_item(
            cart.id,
            orchard_core::ProductId::new(10),
            Quantity::new(2).unwrap(),
            Money::from_cents(1999),
            Utc::now(),
        );

        let order = orders
            .create_from_cart(checkout_record(user, cart.id), Utc::now())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Money::from_cents(3998));
        assert_eq!(orders.items(order.id).len(), 1);

        let cart = carts.get(cart.id).unwrap();
        assert_eq!(cart.total, Money::ZERO);
        assert!(carts.items(cart.id).is_empty());
    }

    fn seed_order(db: &MemoryDb) -> Order {
        let carts = CartRepository::new(db);
        let user = UserId::new(1);
        let cart = carts.create_for_user(user, Utc::now()).unwrap();
        let _ = carts.add_item(
            cart.id,
            orchard_core::ProductId::new(10),
            Quantity::new(2).unwrap(),
            Money::from_cents(1999),
            Utc::now(),
        );
        OrderRepository::new(db)
            .create_from_cart(checkout_record(user, cart.id), Utc::now())
            .unwrap()
    }

    fn ten_percent_coupon() -> Coupon {
        Coupon {
            id: orchard_core::CouponId::new(77),
            code: "SAVE10".to_string(),
            discount_amount: None,
            discount_percentage: Some(rust_decimal::Decimal::TEN),
            valid_until: chrono::NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn transition_validates_the_edge_at_write_time() {
        let db = MemoryDb::new();
        let repo = OrderRepository::new(&db);
        let order = seed_order(&db);

        let applied = repo
            .transition_status(order.id, OrderStatus::Paid, Utc::now())
            .unwrap();
        assert!(matches!(
            applied,
            StatusTransition::Applied {
                from: OrderStatus::Pending,
                ..
            }
        ));

        // the loser of a race sees the status that actually landed
        let err = repo
            .transition_status(order.id, OrderStatus::Delivered, Utc::now())
            .unwrap_err();
        assert_eq!(err, TransitionError::Illegal { from: OrderStatus::Paid });
    }

    #[test]
    fn resubmitted_status_leaves_the_row_untouched() {
        let db = MemoryDb::new();
        let repo = OrderRepository::new(&db);
        let order = seed_order(&db);

        let later = Utc::now() + chrono::Duration::hours(1);
        let outcome = repo
            .transition_status(order.id, OrderStatus::Pending, later)
            .unwrap();
        let StatusTransition::Unchanged(unchanged) = outcome else {
            panic!("expected no-op");
        };
        assert_eq!(unchanged.updated_at, order.updated_at);
    }

    #[test]
    fn coupon_write_is_refused_once_the_order_is_paid() {
        let db = MemoryDb::new();
        let repo = OrderRepository::new(&db);
        let order = seed_order(&db);

        let _ = repo
            .transition_status(order.id, OrderStatus::Paid, Utc::now())
            .unwrap();
        let err = repo
            .apply_coupon_if_pending(order.id, &ten_percent_coupon(), Utc::now())
            .unwrap_err();
        assert_eq!(err, ApplyCouponError::NotPending(OrderStatus::Paid));

        // the paid total was never rewritten
        let order = repo.get(order.id).unwrap();
        assert_eq!(order.total, Money::from_cents(3998));
        assert!(order.coupon_code.is_none());
    }

    #[test]
    fn coupon_write_recomputes_a_pending_total_from_frozen_items() {
        let db = MemoryDb::new();
        let repo = OrderRepository::new(&db);
        let order = seed_order(&db);

        let order = repo
            .apply_coupon_if_pending(order.id, &ten_percent_coupon(), Utc::now())
            .unwrap();
        assert_eq!(order.total, Money::from_cents(3598));
        assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
    }
}
