//! Commerce operations exposed to the caller layer.
//!
//! Each service owns a clone of the shared [`crate::MemoryDb`] and takes the
//! caller's identity as an explicit [`auth::Caller`] argument; there is no
//! ambient security context to read from.

pub mod auth;
pub mod carts;
pub mod coupons;
pub mod email;
pub mod live;
pub mod notifications;
pub mod orders;
pub mod reminders;
pub mod users;

pub use auth::{AuthError, Caller};
pub use carts::{CartError, CartService, CartView};
pub use coupons::{CouponError, CouponService, CreateCouponParams};
pub use email::{EmailError, Mailer, SmtpMailer};
pub use live::LiveChannel;
pub use notifications::{NotificationDispatcher, NotificationError};
pub use orders::{CreateOrderParams, OrderError, OrderService, OrderView};
pub use reminders::{ReminderHandle, ReminderScheduler};
pub use users::{UserError, UserService};
