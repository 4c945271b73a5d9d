//! Order lifecycle management.
//!
//! Converts the caller's cart into an order, drives the status state
//! machine, and applies coupons to pending orders. Status changes and
//! checkout fan out notifications through the dispatcher; the confirmation
//! email is fire-and-forget while the status-update email reports transport
//! failure after the transition has committed.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use orchard_core::{AddressId, NotificationType, OrderId, OrderStatus, PaymentMethodId, UserId};

use super::auth::{self, AuthError, Caller};
use super::coupons::{CouponError, CouponService};
use super::email::EmailError;
use super::notifications::NotificationDispatcher;
use crate::db::orders::CheckoutRecord;
use crate::db::{
    AddressBook, ApplyCouponError, CartRepository, CheckoutError, MemoryDb, OrderRepository,
    StatusTransition, TransitionError, UserRepository,
};
use crate::models::{Order, OrderItem, User};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Caller may not touch this order.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The caller has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// Checkout against a cart with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// No such order.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// No user row behind the caller identity.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The delivery address does not resolve or belong to the caller.
    #[error("address not found")]
    AddressNotFound,

    /// The payment method does not resolve or belong to the caller.
    #[error("payment method not found")]
    PaymentMethodNotFound,

    /// Coupon validation failed; checkout aborts rather than silently
    /// dropping the discount.
    #[error("invalid coupon: {0}")]
    InvalidCoupon(#[from] CouponError),

    /// The requested status change is not a legal edge.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Coupons apply only while an order is pending.
    #[error("coupon cannot be applied to a {0} order")]
    CouponNotApplicable(OrderStatus),

    /// The status-update email could not be delivered. The transition itself
    /// is committed; upstream may retry the mail.
    #[error("status update email failed: {0}")]
    EmailDelivery(#[from] EmailError),
}

/// Checkout inputs. Address and payment method default to the caller's first
/// registered rows when not supplied.
#[derive(Debug, Clone, Default)]
pub struct CreateOrderParams {
    pub delivery_address_id: Option<AddressId>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub coupon_code: Option<String>,
}

/// An order together with its frozen items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order service.
#[derive(Clone)]
pub struct OrderService {
    db: MemoryDb,
    coupons: CouponService,
    dispatcher: NotificationDispatcher,
}

impl OrderService {
    /// Create an order service over the shared store.
    #[must_use]
    pub fn new(db: MemoryDb, dispatcher: NotificationDispatcher) -> Self {
        Self {
            coupons: CouponService::new(db.clone()),
            db,
            dispatcher,
        }
    }

    /// Convert the caller's cart into a `PENDING` order.
    ///
    /// Items are frozen from their snapshotted prices, the coupon (if any) is
    /// validated against now, and the cart is emptied in the same store
    /// transaction. The confirmation notification and email go out after the
    /// order is committed and never fail the checkout.
    ///
    /// # Errors
    ///
    /// `EmptyCart`, `AddressNotFound`, `PaymentMethodNotFound`, or
    /// `InvalidCoupon` per the resolution steps above.
    #[instrument(skip(self, params), fields(user = %caller.user_id))]
    pub fn create_order(
        &self,
        caller: Caller,
        params: CreateOrderParams,
    ) -> Result<OrderView, OrderError> {
        let user = self.user(caller.user_id)?;
        let carts = CartRepository::new(&self.db);
        let cart = carts
            .find_by_user(caller.user_id)
            .ok_or(OrderError::CartNotFound)?;
        // Report emptiness ahead of address/payment/coupon resolution; the
        // checkout operation re-checks under its own lock.
        if carts.items(cart.id).is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let book = AddressBook::new(&self.db);
        let address = match params.delivery_address_id {
            Some(id) => book.find_address(caller.user_id, id),
            None => book.first_address(caller.user_id),
        }
        .ok_or(OrderError::AddressNotFound)?;
        let payment = match params.payment_method_id {
            Some(id) => book.find_payment_method(caller.user_id, id),
            None => book.first_payment_method(caller.user_id),
        }
        .ok_or(OrderError::PaymentMethodNotFound)?;

        let coupon = params
            .coupon_code
            .as_deref()
            .map(|code| self.coupons.validate(code, Utc::now()))
            .transpose()?;

        let orders = OrderRepository::new(&self.db);
        let order = orders
            .create_from_cart(
                CheckoutRecord {
                    user_id: caller.user_id,
                    cart_id: cart.id,
                    delivery_address_id: address.id,
                    payment_method_id: payment.id,
                    coupon: coupon.as_ref(),
                },
                Utc::now(),
            )
            .map_err(|CheckoutError::EmptyCart| OrderError::EmptyCart)?;

        info!(order = %order.id, total = %order.total, "order created");

        let content = format!("Order {} confirmed. Total: {}", order.reference, order.total);
        let _ = self
            .dispatcher
            .send_and_persist(user.id, NotificationType::OrderConfirmation, &content);
        self.dispatcher
            .spawn_order_confirmation_email(user.email.clone(), &order);

        Ok(OrderView {
            items: orders.items(order.id),
            order,
        })
    }

    /// Drive the status state machine. Privileged.
    ///
    /// Re-submitting the current status is an idempotent no-op: it succeeds
    /// without dispatching anything. The status notification and email fire
    /// after the transition is persisted; a refused email surfaces as
    /// `EmailDelivery` without rolling the transition back.
    ///
    /// # Errors
    ///
    /// `Auth`, `OrderNotFound`, `InvalidTransition`, or `EmailDelivery`.
    #[instrument(skip(self), fields(order = %order_id, to = %new_status))]
    pub async fn update_status(
        &self,
        caller: Caller,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        auth::require_privileged(caller)?;
        let outcome = OrderRepository::new(&self.db)
            .transition_status(order_id, new_status, Utc::now())
            .map_err(|e| match e {
                TransitionError::NotFound => OrderError::OrderNotFound(order_id),
                TransitionError::Illegal { from } => OrderError::InvalidTransition {
                    from,
                    to: new_status,
                },
            })?;
        let (order, previous) = match outcome {
            StatusTransition::Unchanged(order) => return Ok(order),
            StatusTransition::Applied { order, from } => (order, from),
        };
        info!(from = %previous, "order status updated");

        let content = format!("Order {} is now {new_status}", order.reference);
        let _ = self
            .dispatcher
            .send_and_persist(order.user_id, NotificationType::OrderStatus, &content);

        let user = self.user(order.user_id)?;
        if let Err(e) = self
            .dispatcher
            .send_status_email(&user.email, &order, new_status)
            .await
        {
            warn!(error = %e, order = %order.id, "status email delivery failed");
            return Err(OrderError::EmailDelivery(e));
        }

        Ok(order)
    }

    /// Apply a coupon to a pending order, recomputing the total from the
    /// frozen items.
    ///
    /// # Errors
    ///
    /// `CouponNotApplicable` once the order has left `PENDING`,
    /// `InvalidCoupon` when validation fails.
    #[instrument(skip(self), fields(order = %order_id, code))]
    pub fn apply_coupon(
        &self,
        caller: Caller,
        order_id: OrderId,
        code: &str,
    ) -> Result<Order, OrderError> {
        let repo = OrderRepository::new(&self.db);
        let order = repo.get(order_id).ok_or(OrderError::OrderNotFound(order_id))?;
        auth::require_owner_or_privileged(caller, order.user_id)?;

        // early answer for the common case; the write re-checks under its lock
        if order.status != OrderStatus::Pending {
            return Err(OrderError::CouponNotApplicable(order.status));
        }

        let coupon = self.coupons.validate(code, Utc::now())?;
        let order = repo
            .apply_coupon_if_pending(order_id, &coupon, Utc::now())
            .map_err(|e| match e {
                ApplyCouponError::NotFound => OrderError::OrderNotFound(order_id),
                ApplyCouponError::NotPending(status) => OrderError::CouponNotApplicable(status),
            })?;
        info!(total = %order.total, "coupon applied");
        Ok(order)
    }

    /// Fetch one order with its items. Owner or privileged.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` or `Auth`.
    pub fn get_order(&self, caller: Caller, order_id: OrderId) -> Result<OrderView, OrderError> {
        let repo = OrderRepository::new(&self.db);
        let order = repo.get(order_id).ok_or(OrderError::OrderNotFound(order_id))?;
        auth::require_owner_or_privileged(caller, order.user_id)?;
        Ok(OrderView {
            items: repo.items(order_id),
            order,
        })
    }

    /// The caller's own orders, newest first.
    #[must_use]
    pub fn list_orders(&self, caller: Caller) -> Vec<Order> {
        OrderRepository::new(&self.db).list_by_user(caller.user_id)
    }

    /// Every order in the store. Privileged.
    ///
    /// # Errors
    ///
    /// `Auth` for unprivileged callers.
    pub fn list_all_orders(&self, caller: Caller) -> Result<Vec<Order>, OrderError> {
        auth::require_privileged(caller)?;
        Ok(OrderRepository::new(&self.db).list_all())
    }

    /// Attach a tracking number. Privileged.
    ///
    /// # Errors
    ///
    /// `Auth` or `OrderNotFound`.
    #[instrument(skip(self), fields(order = %order_id))]
    pub fn set_tracking(
        &self,
        caller: Caller,
        order_id: OrderId,
        tracking_number: &str,
    ) -> Result<Order, OrderError> {
        auth::require_privileged(caller)?;
        OrderRepository::new(&self.db)
            .set_tracking(order_id, tracking_number, Utc::now())
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Tracking info for an order. Owner or privileged.
    ///
    /// # Errors
    ///
    /// `OrderNotFound` or `Auth`.
    pub fn get_tracking(
        &self,
        caller: Caller,
        order_id: OrderId,
    ) -> Result<Option<String>, OrderError> {
        let order = OrderRepository::new(&self.db)
            .get(order_id)
            .ok_or(OrderError::OrderNotFound(order_id))?;
        auth::require_owner_or_privileged(caller, order.user_id)?;
        Ok(order.tracking_number)
    }

    fn user(&self, id: UserId) -> Result<User, OrderError> {
        UserRepository::new(&self.db)
            .get(id)
            .ok_or(OrderError::UserNotFound(id))
    }
}
