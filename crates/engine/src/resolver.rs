//! Effective-permission resolution and authorization queries.
//!
//! Pure computation over current store state: the effective permission set of
//! a user within an organization is the union of the grant sets of every
//! non-deleted role assigned to them there. No precedence or override
//! semantics between roles: a permission granted by any one role is granted.
//!
//! Queries never fail. A missing membership, an unknown role, an uncataloged
//! permission id all resolve to "no access", so callers may probe
//! speculatively without error plumbing.

use std::collections::BTreeSet;

use tracing::debug;

use authforge_catalog::PermissionId;
use authforge_core::{OrgId, UserId};
use authforge_store::AccessStore;

use crate::AccessEngine;

impl<S: AccessStore> AccessEngine<S> {
    /// The union of grant sets over the user's non-deleted roles in the
    /// organization. Empty without a membership or without assignments.
    ///
    /// The returned set is a snapshot, not a live view: mutations made after
    /// this call are reflected only by the next call.
    pub fn effective_permissions(&self, user_id: UserId, org_id: OrgId) -> BTreeSet<PermissionId> {
        // An assignment without a membership row is inert, so a non-member
        // resolves to the empty set even if stale assignment rows exist.
        if self.store().membership(user_id, org_id).is_none() {
            return BTreeSet::new();
        }

        let mut effective = BTreeSet::new();
        for role in self.store().assigned_roles(user_id, org_id) {
            effective.extend(role.grants().iter().cloned());
        }
        effective
    }

    /// Whether the user holds the permission within the organization.
    ///
    /// Always a plain boolean: a missing membership, an unknown organization,
    /// or an uncataloged permission id is a deny, never an error.
    pub fn authorize(&self, user_id: UserId, org_id: OrgId, permission: &PermissionId) -> bool {
        if !self.catalog().contains(permission) {
            debug!(%permission, "authorization denied: permission not in catalog");
            return false;
        }
        if self.store().membership(user_id, org_id).is_none() {
            debug!(user_id = %user_id, org_id = %org_id, %permission, "authorization denied: no membership");
            return false;
        }

        let allowed = self
            .store()
            .assigned_roles(user_id, org_id)
            .iter()
            .any(|role| role.grants().contains(permission));
        debug!(user_id = %user_id, org_id = %org_id, %permission, allowed, "authorization decision");
        allowed
    }

    /// Whether the user holds at least one of the permissions.
    pub fn authorize_any(
        &self,
        user_id: UserId,
        org_id: OrgId,
        permissions: &[PermissionId],
    ) -> bool {
        permissions
            .iter()
            .any(|permission| self.authorize(user_id, org_id, permission))
    }

    /// Whether the user holds every one of the permissions.
    pub fn authorize_all(
        &self,
        user_id: UserId,
        org_id: OrgId,
        permissions: &[PermissionId],
    ) -> bool {
        permissions
            .iter()
            .all(|permission| self.authorize(user_id, org_id, permission))
    }
}
