//! Account registration and profile data.

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};

use orchard_core::{AddressId, Email, NotificationType, PaymentMethodId, Role, UserId};

use super::auth::{self, AuthError, Caller};
use super::notifications::NotificationDispatcher;
use crate::db::{AddressBook, MemoryDb, NewAddress, UserRepository};
use crate::models::{Address, PaymentMethod, User};

/// Errors from account operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Caller may not perform this operation.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The address failed to parse.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] orchard_core::EmailError),

    /// The email is already registered.
    #[error("account already exists")]
    AlreadyExists,

    /// No such user.
    #[error("user not found: {0}")]
    UserNotFound(UserId),
}

/// Account service.
#[derive(Clone)]
pub struct UserService {
    db: MemoryDb,
    dispatcher: NotificationDispatcher,
}

impl UserService {
    /// Create a user service over the shared store.
    #[must_use]
    pub const fn new(db: MemoryDb, dispatcher: NotificationDispatcher) -> Self {
        Self { db, dispatcher }
    }

    /// Register a new account with the default role.
    ///
    /// A welcome notification is persisted and the welcome email goes out on
    /// a background task; neither can fail the registration.
    ///
    /// # Errors
    ///
    /// `InvalidEmail` when the address does not parse, `AlreadyExists` when
    /// the email is taken.
    #[instrument(skip(self, email))]
    pub fn register(&self, email: &str) -> Result<User, UserError> {
        let email = Email::parse(email)?;
        let user = UserRepository::new(&self.db)
            .create(email, Role::User, Utc::now())
            .map_err(|_| UserError::AlreadyExists)?;
        info!(user = %user.id, "account registered");

        let _ = self.dispatcher.send_and_persist(
            user.id,
            NotificationType::Welcome,
            "Welcome to Orchard! Your account is ready.",
        );
        self.dispatcher.spawn_welcome_email(user.email.clone());
        Ok(user)
    }

    /// Fetch a user. Owner or privileged.
    ///
    /// # Errors
    ///
    /// `Auth` or `UserNotFound`.
    pub fn get_user(&self, caller: Caller, id: UserId) -> Result<User, UserError> {
        auth::require_owner_or_privileged(caller, id)?;
        UserRepository::new(&self.db)
            .get(id)
            .ok_or(UserError::UserNotFound(id))
    }

    /// Change a user's role. Privileged.
    ///
    /// # Errors
    ///
    /// `Auth` or `UserNotFound`.
    #[instrument(skip(self), fields(user = %id, role = %role))]
    pub fn set_role(&self, caller: Caller, id: UserId, role: Role) -> Result<User, UserError> {
        auth::require_privileged(caller)?;
        let user = UserRepository::new(&self.db)
            .set_role(id, role)
            .ok_or(UserError::UserNotFound(id))?;
        info!("role changed");
        Ok(user)
    }

    /// Add a delivery address to the caller's own address book.
    #[must_use]
    pub fn add_address(&self, caller: Caller, new: NewAddress) -> Address {
        AddressBook::new(&self.db).add_address(caller.user_id, new)
    }

    /// The caller's address by id. An address outside the caller's book
    /// reads as absent.
    #[must_use]
    pub fn find_address(&self, caller: Caller, id: AddressId) -> Option<Address> {
        AddressBook::new(&self.db).find_address(caller.user_id, id)
    }

    /// Register a payment method for the caller.
    #[must_use]
    pub fn add_payment_method(&self, caller: Caller, label: &str, last_four: &str) -> PaymentMethod {
        AddressBook::new(&self.db).add_payment_method(caller.user_id, label, last_four)
    }

    /// The caller's payment method by id.
    #[must_use]
    pub fn find_payment_method(&self, caller: Caller, id: PaymentMethodId) -> Option<PaymentMethod> {
        AddressBook::new(&self.db).find_payment_method(caller.user_id, id)
    }
}
