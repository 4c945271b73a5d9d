//! Order lifecycle states and notification kinds.

use serde::{Deserialize, Serialize};

/// Order lifecycle state.
///
/// The default flow is `Pending → Paid → InPreparation → InDelivery →
/// Delivered`, one stage at a time. `Cancelled` is reachable from every
/// non-terminal state. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    InPreparation,
    InDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are allowed out of this state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether `next` is a legal single-step transition from this state.
    ///
    /// Skipping stages is not allowed; cancellation is allowed from any
    /// non-terminal state.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Paid)
            | (Self::Paid, Self::InPreparation)
            | (Self::InPreparation, Self::InDelivery)
            | (Self::InDelivery, Self::Delivered) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::InPreparation => write!(f, "IN_PREPARATION"),
            Self::InDelivery => write!(f, "IN_DELIVERY"),
            Self::Delivered => write!(f, "DELIVERED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Kind tag carried by every persisted notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// Account created.
    Welcome,
    /// Order placed, confirmation sent.
    OrderConfirmation,
    /// Order moved to a new lifecycle state.
    OrderStatus,
    /// Abandoned-cart reminder.
    CartReminder,
}
