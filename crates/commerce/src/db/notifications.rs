//! Notification repository.

use chrono::{DateTime, Utc};

use orchard_core::{NotificationId, NotificationType, UserId};

use super::MemoryDb;
use crate::models::Notification;

/// Repository for notification rows.
pub struct NotificationRepository<'a> {
    db: &'a MemoryDb,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: &'a MemoryDb) -> Self {
        Self { db }
    }

    /// Persist a notification.
    pub fn create(
        &self,
        user_id: UserId,
        kind: NotificationType,
        content: &str,
        now: DateTime<Utc>,
    ) -> Notification {
        let mut tables = self.db.write();
        let notification = Notification {
            id: NotificationId::new(tables.next_id()),
            user_id,
            kind,
            content: content.to_string(),
            created_at: now,
            read_at: None,
        };
        tables
            .notifications
            .insert(notification.id, notification.clone());
        notification
    }

    /// Get a notification by id.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.db.read().notifications.get(&id).cloned()
    }

    /// All notifications for a user, oldest first.
    #[must_use]
    pub fn list_for_user(&self, user_id: UserId) -> Vec<Notification> {
        self.db
            .read()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Set `read_at` if it is not already set. Idempotent: an already-read
    /// row keeps its original timestamp.
    #[must_use]
    pub fn mark_read(&self, id: NotificationId, now: DateTime<Utc>) -> Option<Notification> {
        let mut tables = self.db.write();
        let notification = tables.notifications.get_mut(&id)?;
        if notification.read_at.is_none() {
            notification.read_at = Some(now);
        }
        Some(notification.clone())
    }

    /// Mark every unread notification of a user as read. Returns how many
    /// rows changed.
    pub fn mark_all_read(&self, user_id: UserId, now: DateTime<Utc>) -> usize {
        let mut tables = self.db.write();
        let mut changed = 0;
        for notification in tables.notifications.values_mut() {
            if notification.user_id == user_id && notification.read_at.is_none() {
                notification.read_at = Some(now);
                changed += 1;
            }
        }
        changed
    }
}
