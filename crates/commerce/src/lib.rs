//! Orchard Commerce - cart, order, coupon, and notification services.
//!
//! This crate is the commerce core consumed by the HTTP layer: it converts
//! carts into orders, drives the order-lifecycle state machine, computes
//! prices and coupon discounts, and fans out notifications (persisted rows,
//! a per-user live channel, and transactional email).
//!
//! # Architecture
//!
//! - [`db`] - Repositories over a shared in-memory table set. Entities
//!   reference each other by typed ids; compound mutations run under a single
//!   write-lock acquisition so readers never observe a cart whose cached
//!   total disagrees with its items.
//! - [`pricing`] - Pure decimal price and discount math.
//! - [`services`] - The operations exposed to callers. Every operation takes
//!   an explicit [`services::auth::Caller`]; there is no ambient security
//!   context.
//! - [`config`] - Environment-driven configuration (SMTP, reminder cadence).
//! - [`error`] - Unified error type with an HTTP-agnostic classification.
//!
//! The caller layer is expected to map [`error::ErrorClass`] onto its own
//! status codes and to serialize the returned models itself.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pricing;
pub mod services;

pub use config::{CommerceConfig, ConfigError, EmailConfig, ReminderConfig};
pub use db::MemoryDb;
pub use error::{CommerceError, ErrorClass};
