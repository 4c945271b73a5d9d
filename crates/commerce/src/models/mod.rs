//! Domain models.
//!
//! Plain data structs mirroring the store's rows. Ownership is expressed
//! through typed ids (`user_id`, `cart_id`, `order_id`), never through nested
//! object graphs.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod notification;
pub mod order;
pub mod user;

pub use address::{Address, PaymentMethod};
pub use cart::{Cart, CartItem};
pub use catalog::Product;
pub use coupon::Coupon;
pub use notification::Notification;
pub use order::{Order, OrderItem};
pub use user::User;
