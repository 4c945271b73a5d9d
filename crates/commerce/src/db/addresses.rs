//! Address and payment-method repository.
//!
//! Both stores share one repository because checkout resolves them the same
//! way: an explicit id scoped to the owner, or the user's first registered
//! row as the default.

use orchard_core::{AddressId, PaymentMethodId, UserId};

use super::MemoryDb;
use crate::models::{Address, PaymentMethod};

/// Fields for a new address.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub recipient: String,
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Repository for user addresses and payment methods.
pub struct AddressBook<'a> {
    db: &'a MemoryDb,
}

impl<'a> AddressBook<'a> {
    /// Create a new address book.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Register an address for a user.
    pub fn add_address(&self, user_id: UserId, new: NewAddress) -> Address {
        let mut tables = self.db.write();
        let address = Address {
            id: AddressId::new(tables.next_id()),
            user_id,
            recipient: new.recipient,
            line1: new.line1,
            city: new.city,
            postal_code: new.postal_code,
            country: new.country,
        };
        tables.addresses.insert(address.id, address.clone());
        address
    }

    /// Find an address by id, scoped to its owner.
    #[must_use]
    pub fn find_address(&self, user_id: UserId, id: AddressId) -> Option<Address> {
        self.db
            .read()
            .addresses
            .get(&id)
            .filter(|a| a.user_id == user_id)
            .cloned()
    }

    /// The user's first registered address, if any.
    #[must_use]
    pub fn first_address(&self, user_id: UserId) -> Option<Address> {
        self.db
            .read()
            .addresses
            .values()
            .find(|a| a.user_id == user_id)
            .cloned()
    }

    /// Register a payment method for a user.
    pub fn add_payment_method(
        &self,
        user_id: UserId,
        label: &str,
        last_four: &str,
    ) -> PaymentMethod {
        let mut tables = self.db.write();
        let method = PaymentMethod {
            id: PaymentMethodId::new(tables.next_id()),
            user_id,
            label: label.to_string(),
            last_four: last_four.to_string(),
        };
        tables.payment_methods.insert(method.id, method.clone());
        method
    }

    /// Find a payment method by id, scoped to its owner.
    #[must_use]
    pub fn find_payment_method(
        &self,
        user_id: UserId,
        id: PaymentMethodId,
    ) -> Option<PaymentMethod> {
        self.db
            .read()
            .payment_methods
            .get(&id)
            .filter(|p| p.user_id == user_id)
            .cloned()
    }

    /// The user's first registered payment method, if any.
    #[must_use]
    pub fn first_payment_method(&self, user_id: UserId) -> Option<PaymentMethod> {
        self.db
            .read()
            .payment_methods
            .values()
            .find(|p| p.user_id == user_id)
            .cloned()
    }
}
