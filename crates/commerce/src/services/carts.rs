//! Cart operations.
//!
//! All operations act on the caller's own cart; the repository keeps the
//! cached total in lockstep with the items.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use orchard_core::{CartItemId, ProductId, Quantity, QuantityError};

use super::auth::{self, AuthError, Caller};
use crate::db::{CartRepository, MemoryDb, ProductRepository, RepositoryError};
use crate::models::{Cart, CartItem};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Caller may not touch this cart.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The caller has no cart yet.
    #[error("cart not found")]
    CartNotFound,

    /// The caller already owns a cart.
    #[error("user already has a cart")]
    DuplicateCart,

    /// No such product in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The item does not belong to the caller's cart.
    #[error("cart item not found: {0}")]
    ItemNotFound(CartItemId),

    /// Quantity failed validation.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),
}

/// A cart together with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

/// Cart service.
#[derive(Clone)]
pub struct CartService {
    db: MemoryDb,
}

impl CartService {
    /// Create a cart service over the shared store.
    #[must_use]
    pub const fn new(db: MemoryDb) -> Self {
        Self { db }
    }

    /// Create an empty cart for the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateCart`] if the caller already has one.
    #[instrument(skip(self), fields(user = %caller.user_id))]
    pub fn create_cart(&self, caller: Caller) -> Result<Cart, CartError> {
        let cart = CartRepository::new(&self.db)
            .create_for_user(caller.user_id, Utc::now())
            .map_err(|RepositoryError::Conflict(_)| CartError::DuplicateCart)?;
        info!(cart = %cart.id, "cart created");
        Ok(cart)
    }

    /// The caller's cart and items.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CartNotFound`] if the caller has no cart.
    pub fn get_cart(&self, caller: Caller) -> Result<CartView, CartError> {
        let repo = CartRepository::new(&self.db);
        let cart = self.own_cart(&repo, caller)?;
        let items = repo.items(cart.id);
        Ok(CartView { cart, items })
    }

    /// Add a product to the caller's cart, snapshotting its current price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ProductNotFound`] for an unknown product and
    /// [`CartError::InvalidQuantity`] for a zero quantity.
    #[instrument(skip(self), fields(user = %caller.user_id, product = %product_id))]
    pub fn add_item(
        &self,
        caller: Caller,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        let quantity = Quantity::new(quantity)?;
        let repo = CartRepository::new(&self.db);
        let cart = self.own_cart(&repo, caller)?;
        let product = ProductRepository::new(&self.db)
            .get(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        let cart = repo
            .add_item(cart.id, product_id, quantity, product.unit_price, Utc::now())
            .ok_or(CartError::CartNotFound)?;
        info!(cart = %cart.id, total = %cart.total, "item added");
        Ok(CartView {
            items: repo.items(cart.id),
            cart,
        })
    }

    /// Change an item's quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the item is not in the caller's
    /// cart and [`CartError::InvalidQuantity`] for a zero quantity.
    #[instrument(skip(self), fields(user = %caller.user_id, item = %item_id))]
    pub fn update_item_quantity(
        &self,
        caller: Caller,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        let quantity = Quantity::new(quantity)?;
        let repo = CartRepository::new(&self.db);
        let cart = self.own_cart(&repo, caller)?;
        let cart = repo
            .update_item_quantity(cart.id, item_id, quantity, Utc::now())
            .ok_or(CartError::ItemNotFound(item_id))?;
        Ok(CartView {
            items: repo.items(cart.id),
            cart,
        })
    }

    /// Remove one item.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the item is not in the caller's
    /// cart.
    #[instrument(skip(self), fields(user = %caller.user_id, item = %item_id))]
    pub fn remove_item(&self, caller: Caller, item_id: CartItemId) -> Result<CartView, CartError> {
        let repo = CartRepository::new(&self.db);
        let cart = self.own_cart(&repo, caller)?;
        let cart = repo
            .remove_item(cart.id, item_id, Utc::now())
            .ok_or(CartError::ItemNotFound(item_id))?;
        Ok(CartView {
            items: repo.items(cart.id),
            cart,
        })
    }

    /// Remove every item; the cart row survives with a zero total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CartNotFound`] if the caller has no cart.
    #[instrument(skip(self), fields(user = %caller.user_id))]
    pub fn empty_cart(&self, caller: Caller) -> Result<Cart, CartError> {
        let repo = CartRepository::new(&self.db);
        let cart = self.own_cart(&repo, caller)?;
        repo.clear(cart.id, Utc::now()).ok_or(CartError::CartNotFound)
    }

    /// Fetch the caller's cart and re-check ownership.
    fn own_cart(&self, repo: &CartRepository<'_>, caller: Caller) -> Result<Cart, CartError> {
        let cart = repo
            .find_by_user(caller.user_id)
            .ok_or(CartError::CartNotFound)?;
        auth::require_owner(caller, cart.user_id)?;
        Ok(cart)
    }
}
