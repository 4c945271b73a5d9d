//! Product catalog model.
//!
//! The catalog itself is an external collaborator; this is the contract the
//! commerce core reads: an id, a display name, and the current unit price.

use serde::{Deserialize, Serialize};

use orchard_core::{Money, ProductId};

/// A purchasable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current unit price. Cart items snapshot this at add time, so later
    /// price changes never move an existing cart or order total.
    pub unit_price: Money,
}
