//! User roles and their privilege levels.

use serde::{Deserialize, Serialize};

/// Role attached to every user account.
///
/// `Manager` and `Admin` are the privileged roles: they may read any user's
/// orders, drive order-status transitions, and manage coupons. Role changes
/// themselves are a privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer; may only touch resources they own.
    #[default]
    User,
    /// Store staff with full order and coupon management access.
    Manager,
    /// Full access, including role management.
    Admin,
}

impl Role {
    /// Whether this role may act on resources it does not own.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Manager => write!(f, "manager"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "manager" => Ok(Self::Manager),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}
