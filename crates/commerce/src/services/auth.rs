//! Ownership and role checks.
//!
//! Every service operation receives the caller's identity explicitly and runs
//! it through these guards. Ownership violations and role violations produce
//! the same opaque error so a caller cannot learn whether a resource exists.

use thiserror::Error;

use orchard_core::{Role, UserId};

/// The authenticated caller, supplied by the identity layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    /// Create a caller identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller holds a privileged role.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Authorization failure.
///
/// Deliberately a single variant: the message never reveals whether the
/// resource exists or which check failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("Access denied")]
    AccessDenied,
}

/// Pass only if the caller owns the resource.
///
/// # Errors
///
/// Returns [`AuthError::AccessDenied`] otherwise.
pub const fn require_owner(caller: Caller, resource_owner: UserId) -> Result<(), AuthError> {
    if caller.user_id.as_i32() == resource_owner.as_i32() {
        Ok(())
    } else {
        Err(AuthError::AccessDenied)
    }
}

/// Pass if the caller owns the resource or holds a privileged role.
///
/// # Errors
///
/// Returns [`AuthError::AccessDenied`] otherwise.
pub const fn require_owner_or_privileged(
    caller: Caller,
    resource_owner: UserId,
) -> Result<(), AuthError> {
    if caller.is_privileged() {
        Ok(())
    } else {
        require_owner(caller, resource_owner)
    }
}

/// Pass only for privileged roles.
///
/// # Errors
///
/// Returns [`AuthError::AccessDenied`] otherwise.
pub const fn require_privileged(caller: Caller) -> Result<(), AuthError> {
    if caller.is_privileged() {
        Ok(())
    } else {
        Err(AuthError::AccessDenied)
    }
}
