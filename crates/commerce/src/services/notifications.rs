//! Notification dispatcher.
//!
//! Persists a notification row, then pushes it to the owner's live channel.
//! The push is fire-and-forget; the row is the durable record.
//!
//! Email fan-out is asymmetric on purpose: welcome and order-confirmation
//! mail run on spawned tasks and only log failures, while status-update mail
//! is awaited and surfaces its transport error so the caller can retry. The
//! underlying state transition is already committed either way.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, instrument};

use orchard_core::{Email, NotificationId, NotificationType, OrderStatus, UserId};

use super::auth::{self, AuthError, Caller};
use super::email::{EmailError, Mailer};
use super::live::LiveChannel;
use crate::db::{MemoryDb, NotificationRepository};
use crate::models::{Notification, Order};

/// Errors from notification operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Caller may not touch this notification.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No such notification.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),
}

/// Persist-then-publish notification dispatcher.
#[derive(Clone)]
pub struct NotificationDispatcher {
    db: MemoryDb,
    live: LiveChannel,
    mailer: Option<Arc<dyn Mailer>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher. `mailer` is `None` when email is not configured;
    /// notifications still persist and publish without it.
    #[must_use]
    pub fn new(db: MemoryDb, live: LiveChannel, mailer: Option<Arc<dyn Mailer>>) -> Self {
        Self { db, live, mailer }
    }

    /// Persist a notification row and push it to the user's live topic.
    #[instrument(skip(self, content), fields(user = %user_id, kind = ?kind))]
    pub fn send_and_persist(
        &self,
        user_id: UserId,
        kind: NotificationType,
        content: &str,
    ) -> Notification {
        let notification =
            NotificationRepository::new(&self.db).create(user_id, kind, content, Utc::now());
        self.live.publish(&notification);
        notification
    }

    /// Subscribe to a user's live topic.
    #[must_use]
    pub fn subscribe(&self, user_id: UserId) -> broadcast::Receiver<Notification> {
        self.live.subscribe(user_id)
    }

    /// The caller's notifications, oldest first.
    #[must_use]
    pub fn list(&self, caller: Caller) -> Vec<Notification> {
        NotificationRepository::new(&self.db).list_for_user(caller.user_id)
    }

    /// Mark one notification read. Idempotent: re-marking keeps the original
    /// timestamp and succeeds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id and `Auth` when the caller does
    /// not own the notification.
    pub fn mark_read(
        &self,
        caller: Caller,
        id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        let repo = NotificationRepository::new(&self.db);
        let notification = repo.get(id).ok_or(NotificationError::NotFound(id))?;
        auth::require_owner(caller, notification.user_id)?;
        repo.mark_read(id, Utc::now())
            .ok_or(NotificationError::NotFound(id))
    }

    /// Mark all of the caller's notifications read. Returns how many changed.
    pub fn mark_all_read(&self, caller: Caller) -> usize {
        NotificationRepository::new(&self.db).mark_all_read(caller.user_id, Utc::now())
    }

    /// Send the welcome email on a background task; failures are logged only.
    pub fn spawn_welcome_email(&self, to: Email) {
        let Some(mailer) = self.mailer.clone() else {
            debug!("email not configured, skipping welcome email");
            return;
        };
        tokio::spawn(async move {
            let body = format!(
                "Welcome to Orchard!\n\nYour account {to} is ready. Happy shopping."
            );
            if let Err(e) = mailer.send(&to, "Welcome to Orchard", &body).await {
                error!(error = %e, "failed to send welcome email");
            }
        });
    }

    /// Send the order-confirmation email on a background task; failures are
    /// logged only.
    pub fn spawn_order_confirmation_email(&self, to: Email, order: &Order) {
        let Some(mailer) = self.mailer.clone() else {
            debug!("email not configured, skipping order confirmation email");
            return;
        };
        let body = format!(
            "Thanks for your order!\n\nReference: {}\nTotal: {}\n",
            order.reference, order.total
        );
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&to, "Your order is confirmed", &body).await {
                error!(error = %e, "failed to send order confirmation email");
            }
        });
    }

    /// Send the status-update email and report transport failure to the
    /// caller. The triggering transition is already persisted; the error
    /// exists so an upstream retry policy can re-send the mail.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the transport refuses the message.
    pub async fn send_status_email(
        &self,
        to: &Email,
        order: &Order,
        status: OrderStatus,
    ) -> Result<(), EmailError> {
        let Some(mailer) = &self.mailer else {
            debug!("email not configured, skipping status email");
            return Ok(());
        };
        let body = format!("Order {} is now {status}.\n", order.reference);
        mailer.send(to, status_subject(status), &body).await
    }
}

/// Subject line for a status-update email. `PAID`, `IN_DELIVERY`,
/// `DELIVERED`, and `CANCELLED` have distinct copy; other states share a
/// generic subject.
#[must_use]
pub fn status_subject(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Paid => "Your order is paid",
        OrderStatus::InDelivery => "Your order is on its way",
        OrderStatus::Delivered => "Your order has been delivered",
        OrderStatus::Cancelled => "Your order has been cancelled",
        OrderStatus::Pending | OrderStatus::InPreparation => "Order update",
    }
}

#[cfg(test)]
mod tests {
    use orchard_core::Role;

    use super::*;

    fn dispatcher() -> NotificationDispatcher {
        NotificationDispatcher::new(MemoryDb::new(), LiveChannel::new(), None)
    }

    #[tokio::test]
    async fn persists_then_publishes() {
        let d = dispatcher();
        let user = UserId::new(1);
        let mut rx = d.subscribe(user);

        let sent = d.send_and_persist(user, NotificationType::Welcome, "hello");
        assert!(sent.read_at.is_none());

        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed.id, sent.id);

        let caller = Caller::new(user, Role::User);
        assert_eq!(d.list(caller).len(), 1);
    }

    #[tokio::test]
    async fn mark_read_enforces_ownership() {
        let d = dispatcher();
        let owner = Caller::new(UserId::new(1), Role::User);
        let stranger = Caller::new(UserId::new(2), Role::User);
        let n = d.send_and_persist(owner.user_id, NotificationType::Welcome, "hello");

        assert!(matches!(
            d.mark_read(stranger, n.id),
            Err(NotificationError::Auth(AuthError::AccessDenied))
        ));

        let read = d.mark_read(owner, n.id).unwrap();
        assert!(read.is_read());
        // idempotent
        let again = d.mark_read(owner, n.id).unwrap();
        assert_eq!(again.read_at, read.read_at);
    }

    #[tokio::test]
    async fn status_email_without_mailer_is_ok() {
        let d = dispatcher();
        let order = sample_order();
        let to = Email::parse("u@example.com").unwrap();
        assert!(d
            .send_status_email(&to, &order, OrderStatus::Paid)
            .await
            .is_ok());
    }

    #[test]
    fn distinct_subjects_for_key_states() {
        assert_eq!(status_subject(OrderStatus::Paid), "Your order is paid");
        assert_eq!(
            status_subject(OrderStatus::Delivered),
            "Your order has been delivered"
        );
        assert_eq!(
            status_subject(OrderStatus::Cancelled),
            "Your order has been cancelled"
        );
        assert_eq!(
            status_subject(OrderStatus::InDelivery),
            "Your order is on its way"
        );
        assert_eq!(status_subject(OrderStatus::InPreparation), "Order update");
    }

    fn sample_order() -> Order {
        use chrono::Utc;
        use orchard_core::{AddressId, Money, OrderId, PaymentMethodId};
        Order {
            id: OrderId::new(1),
            user_id: UserId::new(1),
            reference: uuid::Uuid::new_v4(),
            status: OrderStatus::Pending,
            total: Money::from_cents(3998),
            delivery_address_id: AddressId::new(1),
            payment_method_id: PaymentMethodId::new(2),
            coupon_code: None,
            tracking_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
