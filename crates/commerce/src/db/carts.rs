//! Cart repository.
//!
//! All item mutations recompute the cached cart total inside the same
//! write-lock scope, so the `total == sum(line totals)` invariant holds for
//! every reader.

use chrono::{DateTime, Utc};

use orchard_core::{CartId, CartItemId, Money, ProductId, Quantity, UserId};

use super::{MemoryDb, RepositoryError, Tables};
use crate::models::{Cart, CartItem};

/// A cart claimed by the reminder scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbandonedCart {
    pub cart_id: CartId,
    pub user_id: UserId,
    pub item_count: usize,
}

/// Repository for carts and their items.
pub struct CartRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Create an empty cart for a user.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the user already owns a cart.
    pub fn create_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Cart, RepositoryError> {
        let mut tables = self.db.write();
        if tables.carts.values().any(|c| c.user_id == user_id) {
            return Err(RepositoryError::Conflict(format!(
                "user {user_id} already has a cart"
            )));
        }
        let cart = Cart {
            id: CartId::new(tables.next_id()),
            user_id,
            total: Money::ZERO,
            created_at: now,
            updated_at: now,
            last_reminder_sent_at: None,
        };
        tables.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    /// Get a cart by id.
    #[must_use]
    pub fn get(&self, id: CartId) -> Option<Cart> {
        self.db.read().carts.get(&id).cloned()
    }

    /// Find the cart owned by a user, if any.
    #[must_use]
    pub fn find_by_user(&self, user_id: UserId) -> Option<Cart> {
        self.db
            .read()
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .cloned()
    }

    /// The cart's items, in insertion order.
    #[must_use]
    pub fn items(&self, cart_id: CartId) -> Vec<CartItem> {
        self.db
            .read()
            .cart_items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .cloned()
            .collect()
    }

    /// Append an item with a snapshotted unit price and recompute the total.
    ///
    /// Returns the updated cart, or `None` if the cart does not exist.
    #[must_use]
    pub fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Money,
        now: DateTime<Utc>,
    ) -> Option<Cart> {
        let mut tables = self.db.write();
        tables.carts.get(&cart_id)?;
        let item = CartItem {
            id: CartItemId::new(tables.next_id()),
            cart_id,
            product_id,
            quantity,
            unit_price,
        };
        tables.cart_items.insert(item.id, item);
        Self::refresh_cart(&mut tables, cart_id, now)
    }

    /// Change an item's quantity and recompute the total.
    ///
    /// Returns `None` if the cart does not exist or the item does not belong
    /// to it.
    #[must_use]
    pub fn update_item_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Option<Cart> {
        let mut tables = self.db.write();
        let item = tables.cart_items.get_mut(&item_id)?;
        if item.cart_id != cart_id {
            return None;
        }
        item.quantity = quantity;
        Self::refresh_cart(&mut tables, cart_id, now)
    }

    /// Remove one item and recompute the total.
    ///
    /// Returns `None` if the cart does not exist or the item does not belong
    /// to it.
    #[must_use]
    pub fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        now: DateTime<Utc>,
    ) -> Option<Cart> {
        let mut tables = self.db.write();
        match tables.cart_items.get(&item_id) {
            Some(item) if item.cart_id == cart_id => {
                tables.cart_items.remove(&item_id);
                Self::refresh_cart(&mut tables, cart_id, now)
            }
            _ => None,
        }
    }

    /// Remove all items; the cart row itself stays, with total zero.
    ///
    /// Returns `None` if the cart does not exist.
    #[must_use]
    pub fn clear(&self, cart_id: CartId, now: DateTime<Utc>) -> Option<Cart> {
        let mut tables = self.db.write();
        tables.carts.get(&cart_id)?;
        tables.cart_items.retain(|_, i| i.cart_id != cart_id);
        Self::refresh_cart(&mut tables, cart_id, now)
    }

    /// Select and stamp carts eligible for an abandonment reminder.
    ///
    /// A cart qualifies when it is non-empty, its last item mutation is older
    /// than `abandoned_before`, and either no reminder was ever sent or the
    /// last one is older than `cooldown_before`. Selection and the
    /// `last_reminder_sent_at = now` stamp happen under one write lock, so a
    /// concurrent mutation serializes entirely before or after the claim and
    /// a second scan inside the cooldown window claims nothing.
    #[must_use]
    pub fn claim_abandoned(
        &self,
        abandoned_before: DateTime<Utc>,
        cooldown_before: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Vec<AbandonedCart> {
        let mut tables = self.db.write();
        let eligible: Vec<(CartId, UserId)> = tables
            .carts
            .values()
            .filter(|cart| cart.updated_at < abandoned_before)
            .filter(|cart| {
                cart.last_reminder_sent_at
                    .is_none_or(|sent| sent < cooldown_before)
            })
            .map(|cart| (cart.id, cart.user_id))
            .collect();

        let mut claimed = Vec::new();
        for (cart_id, user_id) in eligible {
            let item_count = tables
                .cart_items
                .values()
                .filter(|i| i.cart_id == cart_id)
                .count();
            if item_count == 0 {
                continue;
            }
            if let Some(cart) = tables.carts.get_mut(&cart_id) {
                cart.last_reminder_sent_at = Some(now);
            }
            claimed.push(AbandonedCart {
                cart_id,
                user_id,
                item_count,
            });
        }
        claimed
    }

    /// Recompute the cached total and touch `updated_at`. Callers hold the
    /// write lock.
    fn refresh_cart(tables: &mut Tables, cart_id: CartId, now: DateTime<Utc>) -> Option<Cart> {
        let total: Money = tables
            .cart_items
            .values()
            .filter(|i| i.cart_id == cart_id)
            .map(CartItem::line_total)
            .sum();
        let cart = tables.carts.get_mut(&cart_id)?;
        cart.total = total;
        cart.updated_at = now;
        Some(cart.clone())
    }
}
