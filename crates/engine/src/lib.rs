//! `authforge-engine` — the authorization engine facade.
//!
//! Composes the permission catalog and an [`AccessStore`] behind one typed
//! surface: administrative mutations (roles, memberships, assignments) guarded
//! by tenant isolation, and authorization queries (`authorize`,
//! `effective_permissions`) that never fail. Absence of access is `false` or
//! an empty set, so the queries are safe to call speculatively.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use authforge_catalog::{PermissionCatalog, PermissionId};
use authforge_core::{AccessError, AccessResult, OrgId, RoleId, UserId};
use authforge_roles::{Role, RoleAssignment};
use authforge_store::AccessStore;
use authforge_tenancy::{Membership, MembershipTier, Organization, Slug};

pub mod bootstrap;
pub mod context;
mod guard;
mod resolver;


pub use context::OrgContext;

/// Outcome of a role assignment request.
///
/// Re-assigning an existing triple is idempotent success, not an error; the
/// distinction is kept so interactive callers can still render an "already
/// assigned" notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assigned {
    /// A new assignment row was created.
    Created,
    /// The identical (user, role, organization) triple already existed.
    Existing,
}

impl Assigned {
    pub fn is_new(self) -> bool {
        matches!(self, Assigned::Created)
    }
}

/// The authorization engine.
///
/// Generic over the storage collaborator so tests run against the in-memory
/// store and deployments can bring a durable one. Timestamps are stamped
/// here, at the facade, so the stores and entities stay deterministic.
#[derive(Debug, Clone)]
pub struct AccessEngine<S> {
    store: S,
    catalog: Arc<PermissionCatalog>,
}

impl<S> AccessEngine<S> {
    pub fn new(store: S, catalog: Arc<PermissionCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: AccessStore> AccessEngine<S> {
    // ── Organizations ──────────────────────────────────────────────────

    pub fn create_organization(&self, name: &str, slug: &str) -> AccessResult<Organization> {
        let slug = Slug::parse(slug)?;
        let org = Organization::new(OrgId::new(), name, slug, Utc::now())?;
        self.store.insert_organization(org)
    }

    pub fn organization(&self, org_id: OrgId) -> Option<Organization> {
        self.store.organization(org_id)
    }

    pub fn organization_by_slug(&self, slug: &Slug) -> Option<Organization> {
        self.store.organization_by_slug(slug)
    }

    /// Enter an organization's scope for administrative calls.
    ///
    /// `NotFound` if the organization does not exist.
    pub fn context(&self, org_id: OrgId) -> AccessResult<OrgContext> {
        OrgContext::resolve(&self.store, org_id)
    }

    // ── Roles ──────────────────────────────────────────────────────────

    pub fn create_role(
        &self,
        ctx: &OrgContext,
        name: &str,
        description: &str,
    ) -> AccessResult<Role> {
        let role = Role::new(RoleId::new(), ctx.org_id(), name, description, Utc::now())?;
        self.store.insert_role(role)
    }

    /// Grant a catalog permission to a role. Re-granting is a no-op.
    pub fn grant_permission(
        &self,
        ctx: &OrgContext,
        role_id: RoleId,
        permission: PermissionId,
    ) -> AccessResult<()> {
        if !self.catalog.contains(&permission) {
            return Err(AccessError::unknown_permission(permission.as_str()));
        }
        guard::live_role_in_context(&self.store, ctx, role_id)?;
        self.store.add_grant(role_id, permission)?;
        Ok(())
    }

    /// Revoke a permission from a role. Revoking an absent grant is a no-op.
    pub fn revoke_permission(
        &self,
        ctx: &OrgContext,
        role_id: RoleId,
        permission: &PermissionId,
    ) -> AccessResult<()> {
        if !self.catalog.contains(permission) {
            return Err(AccessError::unknown_permission(permission.as_str()));
        }
        guard::live_role_in_context(&self.store, ctx, role_id)?;
        self.store.remove_grant(role_id, permission)?;
        Ok(())
    }

    /// Soft-delete a role. Its grant and assignment rows survive as inert
    /// tombstone data; it stops granting access immediately. Repeating the
    /// delete is a no-op.
    pub fn delete_role(&self, ctx: &OrgContext, role_id: RoleId) -> AccessResult<()> {
        guard::role_in_context(&self.store, ctx, role_id)?;
        self.store.mark_role_deleted(role_id, Utc::now())
    }

    /// The role's stored grant set (tombstones included, for audit views).
    pub fn permissions_of(
        &self,
        ctx: &OrgContext,
        role_id: RoleId,
    ) -> AccessResult<BTreeSet<PermissionId>> {
        guard::role_in_context(&self.store, ctx, role_id)?;
        self.store.grants_of(role_id)
    }

    /// Non-deleted roles of the organization, ordered by name.
    pub fn list_roles(&self, ctx: &OrgContext) -> Vec<Role> {
        self.store.roles_in(ctx.org_id())
    }

    // ── Memberships ────────────────────────────────────────────────────

    pub fn add_member(
        &self,
        ctx: &OrgContext,
        user_id: UserId,
        tier: MembershipTier,
    ) -> AccessResult<Membership> {
        self.store
            .insert_membership(Membership::new(user_id, ctx.org_id(), tier, Utc::now()))
    }

    /// Remove a membership. Returns `false` if the user was not a member.
    /// Any role assignments are left behind as inert rows.
    pub fn remove_member(&self, ctx: &OrgContext, user_id: UserId) -> bool {
        self.store.remove_membership(user_id, ctx.org_id())
    }

    pub fn set_member_tier(
        &self,
        ctx: &OrgContext,
        user_id: UserId,
        tier: MembershipTier,
    ) -> AccessResult<()> {
        guard::member_in_context(&self.store, ctx, user_id)?;
        self.store.set_membership_tier(user_id, ctx.org_id(), tier)
    }

    pub fn list_members(&self, ctx: &OrgContext) -> Vec<Membership> {
        self.store.members_of(ctx.org_id())
    }

    // ── Role assignments ───────────────────────────────────────────────

    /// Assign a role to a member.
    ///
    /// Fails with `NotAMember` without a membership, `OrganizationMismatch`
    /// if the role belongs to another organization, `UnknownRole` if the
    /// role is soft-deleted. Re-assigning is idempotent success.
    pub fn assign_role(
        &self,
        ctx: &OrgContext,
        user_id: UserId,
        role_id: RoleId,
        assigned_by: Option<UserId>,
    ) -> AccessResult<Assigned> {
        let mut assignment = RoleAssignment::new(user_id, role_id, ctx.org_id(), Utc::now());
        if let Some(admin) = assigned_by {
            assignment = assignment.recorded_by(admin);
        }
        let created = self.store.insert_assignment(assignment)?;
        Ok(if created {
            Assigned::Created
        } else {
            Assigned::Existing
        })
    }

    /// Remove an assignment. Returns `false` if it was not present.
    pub fn revoke_role(&self, ctx: &OrgContext, user_id: UserId, role_id: RoleId) -> bool {
        self.store.remove_assignment(user_id, role_id, ctx.org_id())
    }

    /// Non-deleted roles currently assigned to the user in this organization.
    pub fn roles_of(&self, ctx: &OrgContext, user_id: UserId) -> Vec<Role> {
        self.store.assigned_roles(user_id, ctx.org_id())
    }
}
