//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{Email, Role, UserId};

/// A registered user.
///
/// Owns at most one cart and zero-or-more orders, addresses, payment methods,
/// and notifications; all of those rows point back here via `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
