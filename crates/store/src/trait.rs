use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use authforge_catalog::PermissionId;
use authforge_core::{AccessResult, OrgId, RoleId, UserId};
use authforge_roles::{Role, RoleAssignment};
use authforge_tenancy::{Membership, MembershipTier, Organization, Slug};

/// Organization-scoped access control store.
///
/// The store is the **persistence layer** for the engine's records. It owns
/// the uniqueness and referential invariants that need the data to check:
/// duplicate names, duplicate memberships, assignment referential integrity.
/// Catalog validity (whether a permission id exists) is the engine's
/// responsibility; the store treats permission ids as opaque.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and future SQL backends (production).
/// - **Tenant isolation**: every record belongs to exactly one organization;
///   listings never cross the boundary.
/// - **Tombstones**: role deletion is a single-field soft delete; grant and
///   assignment rows are never removed by it.
/// - **Single-row atomicity**: each operation mutates at most one record;
///   no cross-row transactions are required of implementations.
///
/// ## Implementation Requirements
///
/// Implementations must:
/// - enforce the per-operation failure contracts documented below
/// - make each operation atomic with respect to concurrent readers (a reader
///   sees a mutation fully or not at all)
/// - keep listings scoped to the given organization
pub trait AccessStore: Send + Sync {
    // ── Organizations ──────────────────────────────────────────────────

    /// Insert a new organization.
    ///
    /// Fails with `DuplicateIdentifier` if the id or the slug is taken.
    fn insert_organization(&self, org: Organization) -> AccessResult<Organization>;

    fn organization(&self, org_id: OrgId) -> Option<Organization>;

    fn organization_by_slug(&self, slug: &Slug) -> Option<Organization>;

    fn organizations(&self) -> Vec<Organization>;

    // ── Roles ──────────────────────────────────────────────────────────

    /// Insert a new role.
    ///
    /// Fails with `NotFound` if the owning organization does not exist, and
    /// with `DuplicateName` if another **non-deleted** role in the same
    /// organization has the same name (case-insensitive). A soft-deleted
    /// role's name may be reused.
    fn insert_role(&self, role: Role) -> AccessResult<Role>;

    fn role(&self, role_id: RoleId) -> Option<Role>;

    /// Non-deleted role with the given name (case-insensitive) in one
    /// organization. Used by idempotent seeding.
    fn role_by_name(&self, org_id: OrgId, name: &str) -> Option<Role>;

    /// Non-deleted roles of one organization, ordered by name.
    fn roles_in(&self, org_id: OrgId) -> Vec<Role>;

    /// Record that a role grants a permission.
    ///
    /// Fails with `UnknownRole` if the role is missing or soft-deleted.
    /// Returns `Ok(false)` if the grant already existed (idempotent).
    fn add_grant(&self, role_id: RoleId, permission: PermissionId) -> AccessResult<bool>;

    /// Remove a grant. Fails with `UnknownRole` if the role is missing or
    /// soft-deleted. Returns `Ok(false)` if the grant was not present.
    fn remove_grant(&self, role_id: RoleId, permission: &PermissionId) -> AccessResult<bool>;

    /// The stored grant set of a role, including a soft-deleted one (the
    /// tombstone keeps its rows for audit). Fails with `NotFound` if no such
    /// role exists at all.
    fn grants_of(&self, role_id: RoleId) -> AccessResult<BTreeSet<PermissionId>>;

    /// Flip the soft-delete flag (single-field update, so the deletion is
    /// visible either fully or not at all to concurrent readers).
    ///
    /// Fails with `NotFound` if the role does not exist. Deleting an
    /// already-deleted role is a no-op.
    fn mark_role_deleted(&self, role_id: RoleId, at: DateTime<Utc>) -> AccessResult<()>;

    // ── Memberships ────────────────────────────────────────────────────

    /// Insert a membership.
    ///
    /// Fails with `NotFound` if the organization does not exist and with
    /// `AlreadyMember` if the (user, organization) pair exists.
    fn insert_membership(&self, membership: Membership) -> AccessResult<Membership>;

    fn membership(&self, user_id: UserId, org_id: OrgId) -> Option<Membership>;

    /// Memberships of one organization, ordered by join time.
    fn members_of(&self, org_id: OrgId) -> Vec<Membership>;

    /// Fails with `NotFound` if no membership row exists.
    fn set_membership_tier(
        &self,
        user_id: UserId,
        org_id: OrgId,
        tier: MembershipTier,
    ) -> AccessResult<()>;

    /// Remove a membership. Returns `false` if absent. Role assignments are
    /// left in place (they become inert without the membership row).
    fn remove_membership(&self, user_id: UserId, org_id: OrgId) -> bool;

    // ── Role assignments ───────────────────────────────────────────────

    /// Insert a role assignment.
    ///
    /// Enforced at write time, in order:
    /// - `NotFound` if the role does not exist at all
    /// - `OrganizationMismatch` if the role's owning organization differs
    ///   from the assignment's organization (data-integrity violation,
    ///   never filtered at read time)
    /// - `UnknownRole` if the role is soft-deleted
    /// - `NotAMember` if no membership row exists for the pair
    ///
    /// Returns `Ok(false)` if the identical triple already exists
    /// (idempotent success, no duplicate row).
    fn insert_assignment(&self, assignment: RoleAssignment) -> AccessResult<bool>;

    /// Remove an assignment. Returns `false` if absent.
    fn remove_assignment(&self, user_id: UserId, role_id: RoleId, org_id: OrgId) -> bool;

    /// All assignment rows for a user within one organization, including
    /// rows pointing at soft-deleted roles (cleanup is lazy).
    fn assignments_of(&self, user_id: UserId, org_id: OrgId) -> Vec<RoleAssignment>;

    /// The **non-deleted** roles currently assigned to a user within one
    /// organization, ordered by name. This is the resolver's read path and
    /// must observe a consistent snapshot per call.
    fn assigned_roles(&self, user_id: UserId, org_id: OrgId) -> Vec<Role>;
}

impl<S> AccessStore for Arc<S>
where
    S: AccessStore + ?Sized,
{
    fn insert_organization(&self, org: Organization) -> AccessResult<Organization> {
        (**self).insert_organization(org)
    }

    fn organization(&self, org_id: OrgId) -> Option<Organization> {
        (**self).organization(org_id)
    }

    fn organization_by_slug(&self, slug: &Slug) -> Option<Organization> {
        (**self).organization_by_slug(slug)
    }

    fn organizations(&self) -> Vec<Organization> {
        (**self).organizations()
    }

    fn insert_role(&self, role: Role) -> AccessResult<Role> {
        (**self).insert_role(role)
    }

    fn role(&self, role_id: RoleId) -> Option<Role> {
        (**self).role(role_id)
    }

    fn role_by_name(&self, org_id: OrgId, name: &str) -> Option<Role> {
        (**self).role_by_name(org_id, name)
    }

    fn roles_in(&self, org_id: OrgId) -> Vec<Role> {
        (**self).roles_in(org_id)
    }

    fn add_grant(&self, role_id: RoleId, permission: PermissionId) -> AccessResult<bool> {
        (**self).add_grant(role_id, permission)
    }

    fn remove_grant(&self, role_id: RoleId, permission: &PermissionId) -> AccessResult<bool> {
        (**self).remove_grant(role_id, permission)
    }

    fn grants_of(&self, role_id: RoleId) -> AccessResult<BTreeSet<PermissionId>> {
        (**self).grants_of(role_id)
    }

    fn mark_role_deleted(&self, role_id: RoleId, at: DateTime<Utc>) -> AccessResult<()> {
        (**self).mark_role_deleted(role_id, at)
    }

    fn insert_membership(&self, membership: Membership) -> AccessResult<Membership> {
        (**self).insert_membership(membership)
    }

    fn membership(&self, user_id: UserId, org_id: OrgId) -> Option<Membership> {
        (**self).membership(user_id, org_id)
    }

    fn members_of(&self, org_id: OrgId) -> Vec<Membership> {
        (**self).members_of(org_id)
    }

    fn set_membership_tier(
        &self,
        user_id: UserId,
        org_id: OrgId,
        tier: MembershipTier,
    ) -> AccessResult<()> {
        (**self).set_membership_tier(user_id, org_id, tier)
    }

    fn remove_membership(&self, user_id: UserId, org_id: OrgId) -> bool {
        (**self).remove_membership(user_id, org_id)
    }

    fn insert_assignment(&self, assignment: RoleAssignment) -> AccessResult<bool> {
        (**self).insert_assignment(assignment)
    }

    fn remove_assignment(&self, user_id: UserId, role_id: RoleId, org_id: OrgId) -> bool {
        (**self).remove_assignment(user_id, role_id, org_id)
    }

    fn assignments_of(&self, user_id: UserId, org_id: OrgId) -> Vec<RoleAssignment> {
        (**self).assignments_of(user_id, org_id)
    }

    fn assigned_roles(&self, user_id: UserId, org_id: OrgId) -> Vec<Role> {
        (**self).assigned_roles(user_id, org_id)
    }
}
