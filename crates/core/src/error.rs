//! Access control error model.

use thiserror::Error;

/// Result type used across the engine.
pub type AccessResult<T> = Result<T, AccessError>;

/// Access control failure.
///
/// Keep this focused on deterministic authorization/invariant failures.
/// Storage transport concerns (connection loss, serialization) belong to the
/// storage collaborator, not here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// A referenced entity does not exist at all.
    #[error("not found")]
    NotFound,

    /// The entity exists but belongs to a different organization than the
    /// caller's context. Security-relevant: log it, then surface the caller
    /// a plain `NotFound` via [`AccessError::redact`] so other tenants'
    /// entities are not revealed to exist.
    #[error("cross-tenant access: {0}")]
    CrossTenantAccess(String),

    /// Uniqueness violation on an identifier (permission id, org slug).
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// Uniqueness violation on a display name (role name within an org).
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A grant or revoke referenced a permission absent from the catalog.
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// A write referenced a role that is missing or soft-deleted.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Role assignment attempted without prior membership.
    #[error("user is not a member of the organization")]
    NotAMember,

    /// Duplicate membership insert for the same (user, organization) pair.
    #[error("user is already a member of the organization")]
    AlreadyMember,

    /// A role assignment's organization disagrees with the role's owner.
    #[error("organization mismatch: {0}")]
    OrganizationMismatch(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AccessError {
    pub fn cross_tenant(msg: impl Into<String>) -> Self {
        Self::CrossTenantAccess(msg.into())
    }

    pub fn duplicate_identifier(msg: impl Into<String>) -> Self {
        Self::DuplicateIdentifier(msg.into())
    }

    pub fn duplicate_name(msg: impl Into<String>) -> Self {
        Self::DuplicateName(msg.into())
    }

    pub fn unknown_permission(msg: impl Into<String>) -> Self {
        Self::UnknownPermission(msg.into())
    }

    pub fn unknown_role(msg: impl Into<String>) -> Self {
        Self::UnknownRole(msg.into())
    }

    pub fn organization_mismatch(msg: impl Into<String>) -> Self {
        Self::OrganizationMismatch(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Map internal failures to what the outer boundary may reveal.
    ///
    /// `CrossTenantAccess` becomes a generic `NotFound`: end callers must not
    /// be able to distinguish "does not exist" from "exists in another
    /// tenant". All other variants pass through unchanged.
    pub fn redact(self) -> Self {
        match self {
            Self::CrossTenantAccess(_) => Self::NotFound,
            other => other,
        }
    }
}
