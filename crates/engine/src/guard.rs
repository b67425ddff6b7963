//! Tenant isolation checks for organization-scoped identifiers.
//!
//! Every administrative operation that accepts a role or membership
//! identifier goes through here before touching the store: the referenced
//! entity's owning organization must equal the caller's context. A mismatch
//! is `CrossTenantAccess` (never a silent filter) and is logged for security
//! audit. Callers at the outer boundary are expected to surface it via
//! [`AccessError::redact`] so other tenants' entities do not leak.

use tracing::warn;

use authforge_core::{AccessError, AccessResult, RoleId, UserId};
use authforge_roles::Role;
use authforge_store::AccessStore;
use authforge_tenancy::Membership;

use crate::context::OrgContext;

/// Resolve a role within the caller's organization.
///
/// `NotFound` if no such role exists at all; `CrossTenantAccess` if it exists
/// under a different organization.
pub(crate) fn role_in_context<S: AccessStore>(
    store: &S,
    ctx: &OrgContext,
    role_id: RoleId,
) -> AccessResult<Role> {
    let role = store.role(role_id).ok_or(AccessError::NotFound)?;
    if role.org_id() != ctx.org_id() {
        warn!(
            role_id = %role_id,
            context_org = %ctx.org_id(),
            owner_org = %role.org_id(),
            "cross-tenant role access rejected"
        );
        return Err(AccessError::cross_tenant(format!(
            "role {role_id} belongs to another organization"
        )));
    }
    Ok(role)
}

/// Resolve a role that is about to receive a grant mutation.
///
/// Same tenant check as [`role_in_context`], but a missing or soft-deleted
/// role surfaces as `UnknownRole`: grant writes never target tombstones.
pub(crate) fn live_role_in_context<S: AccessStore>(
    store: &S,
    ctx: &OrgContext,
    role_id: RoleId,
) -> AccessResult<Role> {
    let role = match role_in_context(store, ctx, role_id) {
        Ok(role) => role,
        Err(AccessError::NotFound) => {
            return Err(AccessError::unknown_role(role_id.to_string()));
        }
        Err(other) => return Err(other),
    };
    if role.is_deleted() {
        return Err(AccessError::unknown_role(role_id.to_string()));
    }
    Ok(role)
}

/// Resolve a membership within the caller's organization.
///
/// Membership rows are keyed by (user, organization), so a row from another
/// tenant can never resolve here; absence is a plain `NotFound`.
pub(crate) fn member_in_context<S: AccessStore>(
    store: &S,
    ctx: &OrgContext,
    user_id: UserId,
) -> AccessResult<Membership> {
    store
        .membership(user_id, ctx.org_id())
        .ok_or(AccessError::NotFound)
}
