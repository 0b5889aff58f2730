//! Access decisions for account operations.
//!
//! Pure decision logic: claims in, allow/deny out. No I/O, no mutation;
//! identical inputs always yield the identical decision.

use crate::services::jwt::IdentityClaims;

/// Per-operation access rule. Defined statically per route, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone, authenticated or not.
    Public,
    /// The owner of the target resource, or an admin.
    SelfOrAdmin,
    /// Admins only.
    AdminOnly,
}

/// Denial outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    Forbidden,
}

impl std::fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessDenied::Forbidden => write!(f, "Permission denied"),
        }
    }
}

impl std::error::Error for AccessDenied {}

/// Role-based access guard.
#[derive(Debug, Clone)]
pub struct AccessGuard;

impl AccessGuard {
    /// Decide whether a caller may perform an operation.
    ///
    /// Absent claims mean "no identity", never a distinct role, so they can
    /// only ever satisfy `Public`.
    pub fn authorize(
        claims: Option<&IdentityClaims>,
        policy: AccessPolicy,
        resource_owner_id: Option<i64>,
    ) -> Result<(), AccessDenied> {
        match policy {
            AccessPolicy::Public => Ok(()),
            AccessPolicy::AdminOnly => match claims {
                Some(c) if c.role.is_admin() => Ok(()),
                _ => Err(AccessDenied::Forbidden),
            },
            AccessPolicy::SelfOrAdmin => match (claims, resource_owner_id) {
                (Some(c), _) if c.role.is_admin() => Ok(()),
                (Some(c), Some(owner)) if c.sub == owner => Ok(()),
                _ => Err(AccessDenied::Forbidden),
            },
        }
    }
}
