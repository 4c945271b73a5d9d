//! Abandoned-cart reminder scheduler.
//!
//! A background task wakes on a fixed interval, claims carts that have sat
//! idle past the abandonment threshold, and dispatches a reminder
//! notification per cart. The claim stamps the cart under the store's write
//! lock, so a cart inside its cooldown window is never reminded twice even
//! if two scans overlap.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use orchard_core::NotificationType;

use super::notifications::NotificationDispatcher;
use crate::config::ReminderConfig;
use crate::db::{CartRepository, MemoryDb};

/// Reminder scheduler.
#[derive(Clone)]
pub struct ReminderScheduler {
    db: MemoryDb,
    dispatcher: NotificationDispatcher,
    config: ReminderConfig,
}

/// Handle over a running scheduler task.
pub struct ReminderHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    /// Signal the scheduler to stop and wait for the task to drain.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "reminder task panicked");
        }
    }
}

impl ReminderScheduler {
    /// Create a scheduler over the shared store.
    #[must_use]
    pub const fn new(
        db: MemoryDb,
        dispatcher: NotificationDispatcher,
        config: ReminderConfig,
    ) -> Self {
        Self {
            db,
            dispatcher,
            config,
        }
    }

    /// Run one scan as of `now`. Returns how many reminders went out.
    #[instrument(skip(self, now))]
    pub fn run_once(&self, now: DateTime<Utc>) -> usize {
        let claimed = CartRepository::new(&self.db).claim_abandoned(
            now - self.config.abandoned_after,
            now - self.config.cooldown,
            now,
        );
        for cart in &claimed {
            let noun = if cart.item_count == 1 { "item" } else { "items" };
            let content = format!(
                "You left {} {noun} in your cart. They are still waiting for you!",
                cart.item_count
            );
            let _ = self.dispatcher.send_and_persist(
                cart.user_id,
                NotificationType::CartReminder,
                &content,
            );
        }
        if claimed.is_empty() {
            debug!("no abandoned carts");
        } else {
            info!(count = claimed.len(), "cart reminders sent");
        }
        claimed.len()
    }

    /// Start the periodic scan loop on a background task.
    ///
    /// The first scan runs after `initial_delay`, then every `interval`. The
    /// returned handle stops the loop; a scan missed while the executor was
    /// busy is skipped rather than replayed in a burst.
    #[must_use]
    pub fn spawn(self) -> ReminderHandle {
        let (shutdown, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(self.config.initial_delay) => {}
                _ = stopped.changed() => return,
            }
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let _ = self.run_once(Utc::now());
                    }
                    _ = stopped.changed() => {
                        info!("reminder scheduler stopping");
                        return;
                    }
                }
            }
        });
        ReminderHandle { shutdown, task }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use chrono::Duration;

    use orchard_core::{Email, Money, Role, UserId};

    use super::*;
    use crate::db::{ProductRepository, UserRepository};
    use crate::services::live::LiveChannel;

    fn scheduler(config: ReminderConfig) -> (MemoryDb, ReminderScheduler) {
        let db = MemoryDb::new();
        let dispatcher = NotificationDispatcher::new(db.clone(), LiveChannel::new(), None);
        (db.clone(), ReminderScheduler::new(db, dispatcher, config))
    }

    fn seed_idle_cart(db: &MemoryDb, email: &str, idle_for: Duration) -> UserId {
        let now = Utc::now();
        let user = UserRepository::new(db)
            .create(Email::parse(email).unwrap(), Role::User, now)
            .unwrap();
        let product = ProductRepository::new(db).create("Mug", Money::from_cents(1999));
        let carts = CartRepository::new(db);
        let then = now - idle_for;
        let cart = carts.create_for_user(user.id, then).unwrap();
        let _ = carts
            .add_item(
                cart.id,
                product.id,
                orchard_core::Quantity::ONE,
                product.unit_price,
                then,
            )
            .unwrap();
        user.id
    }

    #[test]
    fn idle_carts_are_reminded_once_per_cooldown() {
        let (db, scheduler) = scheduler(ReminderConfig::default());
        let user_id = seed_idle_cart(&db, "idle@example.com", Duration::hours(25));

        assert_eq!(scheduler.run_once(Utc::now()), 1);
        // second scan inside the cooldown window claims nothing
        assert_eq!(scheduler.run_once(Utc::now()), 0);

        let inbox = crate::db::NotificationRepository::new(&db).list_for_user(user_id);
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].kind, NotificationType::CartReminder);
    }

    #[test]
    fn fresh_and_empty_carts_are_left_alone() {
        let (db, scheduler) = scheduler(ReminderConfig::default());
        // active cart, idle for only an hour
        let _ = seed_idle_cart(&db, "active@example.com", Duration::hours(1));
        // idle but empty cart
        let now = Utc::now();
        let user = UserRepository::new(&db)
            .create(Email::parse("empty@example.com").unwrap(), Role::User, now)
            .unwrap();
        let _ = CartRepository::new(&db)
            .create_for_user(user.id, now - Duration::hours(30))
            .unwrap();

        assert_eq!(scheduler.run_once(now), 0);
    }

    #[test]
    fn reminder_repeats_after_the_cooldown_elapses() {
        let (db, scheduler) = scheduler(ReminderConfig::default());
        let _ = seed_idle_cart(&db, "idle@example.com", Duration::hours(25));

        let now = Utc::now();
        assert_eq!(scheduler.run_once(now), 1);
        assert_eq!(scheduler.run_once(now + Duration::hours(49)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loop_scans_on_the_interval_and_stops_on_shutdown() {
        let config = ReminderConfig {
            interval: StdDuration::from_secs(60),
            initial_delay: StdDuration::from_millis(10),
            ..ReminderConfig::default()
        };
        let (db, scheduler) = scheduler(config);
        let user_id = seed_idle_cart(&db, "idle@example.com", Duration::hours(25));

        let handle = scheduler.spawn();
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        handle.shutdown().await;

        let inbox = crate::db::NotificationRepository::new(&db).list_for_user(user_id);
        assert_eq!(inbox.len(), 1);
    }
}
