//! Notification model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orchard_core::{NotificationId, NotificationType, UserId};

/// A persisted, user-scoped message.
///
/// Written once by the dispatcher; the only later mutation is setting
/// `read_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationType,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Whether the user has seen this notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
