//! User repository.

use chrono::{DateTime, Utc};

use orchard_core::{Email, Role, UserId};

use super::{MemoryDb, RepositoryError};
use crate::models::User;

/// Repository for user rows.
pub struct UserRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the email is already registered.
    pub fn create(
        &self,
        email: Email,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.db.write();
        if tables.users.values().any(|u| u.email == email) {
            return Err(RepositoryError::Conflict(format!(
                "email already registered: {email}"
            )));
        }
        let user = User {
            id: UserId::new(tables.next_id()),
            email,
            role,
            created_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Get a user by id.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<User> {
        self.db.read().users.get(&id).cloned()
    }

    /// Change a user's role, returning the updated row.
    #[must_use]
    pub fn set_role(&self, id: UserId, role: Role) -> Option<User> {
        let mut tables = self.db.write();
        let user = tables.users.get_mut(&id)?;
        user.role = role;
        Some(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_conflicts() {
        let db = MemoryDb::new();
        let repo = UserRepository::new(&db);
        let email = Email::parse("a@example.com").unwrap();
        repo.create(email.clone(), Role::User, Utc::now()).unwrap();
        assert!(matches!(
            repo.create(email, Role::User, Utc::now()),
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn set_role_persists() {
        let db = MemoryDb::new();
        let repo = UserRepository::new(&db);
        let user = repo
            .create(Email::parse("a@example.com").unwrap(), Role::User, Utc::now())
            .unwrap();
        let updated = repo.set_role(user.id, Role::Manager).unwrap();
        assert_eq!(updated.role, Role::Manager);
        assert_eq!(repo.get(user.id).unwrap().role, Role::Manager);
    }
}
