//! Validated item quantity.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one; zero and negative counts are rejected.
    #[error("quantity must be at least 1")]
    TooSmall,
}

/// A line-item quantity, always at least one.
///
/// Cart and order items carry a `Quantity` rather than a raw integer so a
/// zero or negative count is unrepresentable past the validation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// One unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity from a count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooSmall`] if `count` is zero.
    pub const fn new(count: u32) -> Result<Self, QuantityError> {
        if count == 0 {
            Err(QuantityError::TooSmall)
        } else {
            Ok(Self(count))
        }
    }

    /// The underlying count.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
