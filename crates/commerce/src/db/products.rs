//! Product catalog repository.
//!
//! Thin contract over the external catalog: create (seeding/admin) and lookup.

use orchard_core::{Money, ProductId};

use super::MemoryDb;
use crate::models::Product;

/// Repository for catalog rows.
pub struct ProductRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Add a product to the catalog.
    pub fn create(&self, name: &str, unit_price: Money) -> Product {
        let mut tables = self.db.write();
        let product = Product {
            id: ProductId::new(tables.next_id()),
            name: name.to_string(),
            unit_price,
        };
        tables.products.insert(product.id, product.clone());
        product
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.db.read().products.get(&id).cloned()
    }

    /// Change a product's current unit price, returning the updated row.
    ///
    /// Existing cart and order items keep their snapshotted price.
    #[must_use]
    pub fn set_unit_price(&self, id: ProductId, unit_price: Money) -> Option<Product> {
        let mut tables = self.db.write();
        let product = tables.products.get_mut(&id)?;
        product.unit_price = unit_price;
        Some(product.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get() {
        let db = MemoryDb::new();
        let repo = ProductRepository::new(&db);
        let p = repo.create("Mug", Money::from_cents(1250));
        assert_eq!(repo.get(p.id).unwrap().name, "Mug");
        assert!(repo.get(ProductId::new(999)).is_none());
    }

    #[test]
    fn price_update_replaces_current_price() {
        let db = MemoryDb::new();
        let repo = ProductRepository::new(&db);
        let p = repo.create("Mug", Money::from_cents(1250));
        let updated = repo.set_unit_price(p.id, Money::from_cents(1500)).unwrap();
        assert_eq!(updated.unit_price, Money::from_cents(1500));
    }
}
