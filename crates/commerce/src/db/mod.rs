//! Repositories over the shared in-memory table set.
//!
//! The transactional relational store is an external collaborator; this
//! module provides the contract the services program against, backed by an
//! in-memory table set. Each repository borrows the shared [`MemoryDb`] the
//! way a SQL repository would borrow a connection pool, and every compound
//! mutation (append item + recompute total, freeze cart into order + clear
//! cart, claim abandoned carts) runs under a single write-lock acquisition,
//! the in-memory analog of one database transaction. A reader can therefore
//! never observe a cart whose cached `total` disagrees with its items.
//!
//! ## Tables
//!
//! - `users`, `products`, `coupons`
//! - `carts` / `cart_items`
//! - `orders` / `order_items`
//! - `addresses` / `payment_methods`
//! - `notifications`
//!
//! Item, address, and notification tables are ordered maps so iteration is
//! insertion-ordered (ids are monotonic), which is what "first registered
//! address" and ordered cart contents rely on.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;

use orchard_core::{
    AddressId, CartId, CartItemId, CouponId, NotificationId, OrderId, OrderItemId,
    PaymentMethodId, ProductId, UserId,
};

use crate::models::{
    Address, Cart, CartItem, Coupon, Notification, Order, OrderItem, PaymentMethod, Product, User,
};

pub mod addresses;
pub mod carts;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

pub use addresses::{AddressBook, NewAddress};
pub use carts::{AbandonedCart, CartRepository};
pub use coupons::CouponRepository;
pub use notifications::NotificationRepository;
pub use orders::{
    ApplyCouponError, CheckoutError, OrderRepository, StatusTransition, TransitionError,
};
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness or integrity constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// The shared in-memory store.
///
/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    inner: Arc<RwLock<Tables>>,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) carts: HashMap<CartId, Cart>,
    pub(crate) cart_items: BTreeMap<CartItemId, CartItem>,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) order_items: BTreeMap<OrderItemId, OrderItem>,
    pub(crate) addresses: BTreeMap<AddressId, Address>,
    pub(crate) payment_methods: BTreeMap<PaymentMethodId, PaymentMethod>,
    pub(crate) coupons: HashMap<CouponId, Coupon>,
    pub(crate) notifications: BTreeMap<NotificationId, Notification>,
    next_id: i32,
}

impl Tables {
    /// Next value of the shared id sequence.
    pub(crate) fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryDb {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the read lock.
    ///
    /// A poisoned lock yields the inner guard: the tables hold plain data and
    /// a panicked writer cannot leave a partially applied compound mutation
    /// visible past its own guard scope.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the write lock.
    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_tables() {
        let db = MemoryDb::new();
        let other = db.clone();
        db.write().next_id();
        assert_eq!(other.write().next_id(), 2);
    }

    #[test]
    fn id_sequence_is_monotonic() {
        let db = MemoryDb::new();
        let mut tables = db.write();
        let a = tables.next_id();
        let b = tables.next_id();
        assert!(b > a);
    }
}
