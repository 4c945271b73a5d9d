//! Shared newtype wrappers and domain enums.

pub mod email;
pub mod id;
pub mod money;
pub mod quantity;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{
    AddressId, CartId, CartItemId, CouponId, NotificationId, OrderId, OrderItemId,
    PaymentMethodId, ProductId, UserId,
};
pub use money::Money;
pub use quantity::{Quantity, QuantityError};
pub use role::Role;
pub use status::{NotificationType, OrderStatus};
