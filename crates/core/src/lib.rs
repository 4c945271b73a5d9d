//! Orchard Core - Shared types library.
//!
//! This crate provides common types used across all Orchard Commerce components:
//! - `commerce` - Cart, order, coupon, and notification services
//! - `integration-tests` - Cross-service flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no async.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, quantities, emails,
//!   roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
