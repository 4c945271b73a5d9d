//! Per-user live notification channel.
//!
//! A broadcast topic keyed by user id. Publishing is fire-and-forget: a user
//! with no open subscription simply misses the push, which is fine because
//! the notification row is persisted for later retrieval.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use orchard_core::UserId;

use crate::models::Notification;

/// Buffered messages per user topic before lagging subscribers drop.
const CHANNEL_CAPACITY: usize = 16;

/// Registry of per-user broadcast senders.
#[derive(Debug, Clone, Default)]
pub struct LiveChannel {
    topics: Arc<Mutex<HashMap<UserId, broadcast::Sender<Notification>>>>,
}

impl LiveChannel {
    /// Create an empty channel registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a user's topic, creating it on first use.
    #[must_use]
    pub fn subscribe(&self, user_id: UserId) -> broadcast::Receiver<Notification> {
        let mut topics = self
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Push a notification to its user's topic, best effort.
    pub fn publish(&self, notification: &Notification) {
        let topics = self
            .topics
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match topics.get(&notification.user_id) {
            Some(sender) if sender.receiver_count() > 0 => {
                // A closed receiver between the count check and the send is
                // still not an error; delivery is at-most-once.
                let _ = sender.send(notification.clone());
            }
            _ => {
                debug!(user_id = %notification.user_id, "no live subscriber, skipping push");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use orchard_core::{NotificationId, NotificationType};

    use super::*;

    fn notification(user: i32) -> Notification {
        Notification {
            id: NotificationId::new(1),
            user_id: UserId::new(user),
            kind: NotificationType::Welcome,
            content: "hello".to_string(),
            created_at: Utc::now(),
            read_at: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_notification() {
        let channel = LiveChannel::new();
        let mut rx = channel.subscribe(UserId::new(1));
        channel.publish(&notification(1));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.content, "hello");
    }

    #[tokio::test]
    async fn publish_without_subscriber_is_a_no_op() {
        let channel = LiveChannel::new();
        channel.publish(&notification(1));
        // subscribing afterwards does not replay
        let mut rx = channel.subscribe(UserId::new(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn topics_are_user_scoped() {
        let channel = LiveChannel::new();
        let mut rx_other = channel.subscribe(UserId::new(2));
        let mut rx_target = channel.subscribe(UserId::new(1));
        channel.publish(&notification(1));
        assert!(rx_target.try_recv().is_ok());
        assert!(rx_other.try_recv().is_err());
    }
}
