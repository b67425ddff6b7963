use std::collections::{BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use authforge_catalog::PermissionId;
use authforge_core::{AccessError, AccessResult, OrgId, RoleId, UserId};
use authforge_roles::{Role, RoleAssignment};
use authforge_tenancy::{Membership, MembershipTier, Organization, Slug};

use super::r#trait::AccessStore;

#[derive(Debug, Default)]
struct StoreState {
    organizations: HashMap<OrgId, Organization>,
    slug_index: HashMap<String, OrgId>,
    roles: HashMap<RoleId, Role>,
    memberships: HashMap<(UserId, OrgId), Membership>,
    /// Assignment rows keyed per (user, org), then by role. Rows pointing at
    /// soft-deleted roles stay here (lazy cleanup).
    assignments: HashMap<(UserId, OrgId), HashMap<RoleId, RoleAssignment>>,
}

/// In-memory access control store.
///
/// Reference implementation for tests/dev. All tables live behind a single
/// `RwLock`, so every operation observes a consistent snapshot. Not optimized
/// for performance.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    state: RwLock<StoreState>,
}

impl InMemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AccessResult<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| AccessError::validation("access store lock poisoned"))
    }

    fn write(&self) -> AccessResult<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| AccessError::validation("access store lock poisoned"))
    }
}

impl AccessStore for InMemoryAccessStore {
    fn insert_organization(&self, org: Organization) -> AccessResult<Organization> {
        let mut state = self.write()?;

        if state.organizations.contains_key(&org.id_typed()) {
            return Err(AccessError::duplicate_identifier(org.id_typed().to_string()));
        }
        if state.slug_index.contains_key(org.slug().as_str()) {
            return Err(AccessError::duplicate_identifier(org.slug().as_str()));
        }

        debug!(org_id = %org.id_typed(), slug = %org.slug(), "organization created");
        state
            .slug_index
            .insert(org.slug().as_str().to_string(), org.id_typed());
        state.organizations.insert(org.id_typed(), org.clone());
        Ok(org)
    }

    fn organization(&self, org_id: OrgId) -> Option<Organization> {
        let state = self.state.read().ok()?;
        state.organizations.get(&org_id).cloned()
    }

    fn organization_by_slug(&self, slug: &Slug) -> Option<Organization> {
        let state = self.state.read().ok()?;
        let org_id = state.slug_index.get(slug.as_str())?;
        state.organizations.get(org_id).cloned()
    }

    fn organizations(&self) -> Vec<Organization> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut orgs: Vec<_> = state.organizations.values().cloned().collect();
        orgs.sort_by(|a, b| a.created_at().cmp(&b.created_at()));
        orgs
    }

    fn insert_role(&self, role: Role) -> AccessResult<Role> {
        let mut state = self.write()?;

        if !state.organizations.contains_key(&role.org_id()) {
            return Err(AccessError::NotFound);
        }

        // Name must be unique among the organization's live roles; a
        // tombstoned role frees its name.
        let duplicate = state.roles.values().any(|existing| {
            existing.org_id() == role.org_id()
                && !existing.is_deleted()
                && existing.name_key() == role.name_key()
        });
        if duplicate {
            return Err(AccessError::duplicate_name(role.name()));
        }

        debug!(role_id = %role.id_typed(), org_id = %role.org_id(), name = role.name(), "role created");
        state.roles.insert(role.id_typed(), role.clone());
        Ok(role)
    }

    fn role(&self, role_id: RoleId) -> Option<Role> {
        let state = self.state.read().ok()?;
        state.roles.get(&role_id).cloned()
    }

    fn role_by_name(&self, org_id: OrgId, name: &str) -> Option<Role> {
        let key = name.trim().to_lowercase();
        let state = self.state.read().ok()?;
        state
            .roles
            .values()
            .find(|r| r.org_id() == org_id && !r.is_deleted() && r.name_key() == key)
            .cloned()
    }

    fn roles_in(&self, org_id: OrgId) -> Vec<Role> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut roles: Vec<_> = state
            .roles
            .values()
            .filter(|r| r.org_id() == org_id && !r.is_deleted())
            .cloned()
            .collect();
        roles.sort_by_key(|r| r.name_key());
        roles
    }

    fn add_grant(&self, role_id: RoleId, permission: PermissionId) -> AccessResult<bool> {
        let mut state = self.write()?;
        let role = state
            .roles
            .get_mut(&role_id)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| AccessError::unknown_role(role_id.to_string()))?;

        let inserted = role.add_grant(permission);
        Ok(inserted)
    }

    fn remove_grant(&self, role_id: RoleId, permission: &PermissionId) -> AccessResult<bool> {
        let mut state = self.write()?;
        let role = state
            .roles
            .get_mut(&role_id)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| AccessError::unknown_role(role_id.to_string()))?;

        Ok(role.remove_grant(permission))
    }

    fn grants_of(&self, role_id: RoleId) -> AccessResult<BTreeSet<PermissionId>> {
        let state = self.read()?;
        state
            .roles
            .get(&role_id)
            .map(|r| r.grants().clone())
            .ok_or(AccessError::NotFound)
    }

    fn mark_role_deleted(&self, role_id: RoleId, at: DateTime<Utc>) -> AccessResult<()> {
        let mut state = self.write()?;
        let role = state.roles.get_mut(&role_id).ok_or(AccessError::NotFound)?;
        if role.mark_deleted(at) {
            debug!(role_id = %role_id, "role soft-deleted");
        }
        Ok(())
    }

    fn insert_membership(&self, membership: Membership) -> AccessResult<Membership> {
        let mut state = self.write()?;

        if !state.organizations.contains_key(&membership.org_id()) {
            return Err(AccessError::NotFound);
        }
        if state.memberships.contains_key(&membership.key()) {
            return Err(AccessError::AlreadyMember);
        }

        debug!(
            user_id = %membership.user_id(),
            org_id = %membership.org_id(),
            tier = %membership.tier(),
            "member added"
        );
        state.memberships.insert(membership.key(), membership.clone());
        Ok(membership)
    }

    fn membership(&self, user_id: UserId, org_id: OrgId) -> Option<Membership> {
        let state = self.state.read().ok()?;
        state.memberships.get(&(user_id, org_id)).cloned()
    }

    fn members_of(&self, org_id: OrgId) -> Vec<Membership> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut members: Vec<_> = state
            .memberships
            .values()
            .filter(|m| m.org_id() == org_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at());
        members
    }

    fn set_membership_tier(
        &self,
        user_id: UserId,
        org_id: OrgId,
        tier: MembershipTier,
    ) -> AccessResult<()> {
        let mut state = self.write()?;
        let membership = state
            .memberships
            .get_mut(&(user_id, org_id))
            .ok_or(AccessError::NotFound)?;
        *membership = membership.clone().with_tier(tier);
        Ok(())
    }

    fn remove_membership(&self, user_id: UserId, org_id: OrgId) -> bool {
        match self.state.write() {
            Ok(mut state) => state.memberships.remove(&(user_id, org_id)).is_some(),
            Err(_) => false,
        }
    }

    fn insert_assignment(&self, assignment: RoleAssignment) -> AccessResult<bool> {
        let mut state = self.write()?;

        let role = state
            .roles
            .get(&assignment.role_id())
            .ok_or(AccessError::NotFound)?;

        if role.org_id() != assignment.org_id() {
            warn!(
                role_id = %assignment.role_id(),
                role_org = %role.org_id(),
                assignment_org = %assignment.org_id(),
                user_id = %assignment.user_id(),
                "role assignment rejected: organization mismatch"
            );
            return Err(AccessError::organization_mismatch(format!(
                "role {} belongs to organization {}",
                assignment.role_id(),
                role.org_id()
            )));
        }
        if role.is_deleted() {
            return Err(AccessError::unknown_role(assignment.role_id().to_string()));
        }
        if !state
            .memberships
            .contains_key(&(assignment.user_id(), assignment.org_id()))
        {
            return Err(AccessError::NotAMember);
        }

        let rows = state
            .assignments
            .entry((assignment.user_id(), assignment.org_id()))
            .or_default();
        if rows.contains_key(&assignment.role_id()) {
            // Idempotent: the triple already exists, keep the original row.
            return Ok(false);
        }

        debug!(
            user_id = %assignment.user_id(),
            role_id = %assignment.role_id(),
            org_id = %assignment.org_id(),
            "role assigned"
        );
        rows.insert(assignment.role_id(), assignment);
        Ok(true)
    }

    fn remove_assignment(&self, user_id: UserId, role_id: RoleId, org_id: OrgId) -> bool {
        match self.state.write() {
            Ok(mut state) => state
                .assignments
                .get_mut(&(user_id, org_id))
                .is_some_and(|rows| rows.remove(&role_id).is_some()),
            Err(_) => false,
        }
    }

    fn assignments_of(&self, user_id: UserId, org_id: OrgId) -> Vec<RoleAssignment> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut rows: Vec<_> = state
            .assignments
            .get(&(user_id, org_id))
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        rows.sort_by_key(|a| a.assigned_at());
        rows
    }

    fn assigned_roles(&self, user_id: UserId, org_id: OrgId) -> Vec<Role> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        let mut roles: Vec<_> = state
            .assignments
            .get(&(user_id, org_id))
            .map(|rows| {
                rows.keys()
                    .filter_map(|role_id| state.roles.get(role_id))
                    .filter(|role| !role.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        roles.sort_by_key(|r| r.name_key());
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_org() -> (InMemoryAccessStore, OrgId) {
        let store = InMemoryAccessStore::new();
        let org = Organization::new(
            OrgId::new(),
            "Acme",
            Slug::parse("acme").unwrap(),
            Utc::now(),
        )
        .unwrap();
        let org_id = org.id_typed();
        store.insert_organization(org).unwrap();
        (store, org_id)
    }

    fn new_role(store: &InMemoryAccessStore, org_id: OrgId, name: &str) -> Role {
        let role = Role::new(RoleId::new(), org_id, name, "", Utc::now()).unwrap();
        store.insert_role(role).unwrap()
    }

    fn new_member(store: &InMemoryAccessStore, org_id: OrgId) -> UserId {
        let user_id = UserId::new();
        store
            .insert_membership(Membership::new(
                user_id,
                org_id,
                MembershipTier::default(),
                Utc::now(),
            ))
            .unwrap();
        user_id
    }

    fn assign(store: &InMemoryAccessStore, user: UserId, role: RoleId, org: OrgId) -> AccessResult<bool> {
        store.insert_assignment(RoleAssignment::new(user, role, org, Utc::now()))
    }

    #[test]
    fn duplicate_slug_rejected() {
        let (store, _) = store_with_org();
        let err = store
            .insert_organization(
                Organization::new(
                    OrgId::new(),
                    "Other Acme",
                    Slug::parse("acme").unwrap(),
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, AccessError::DuplicateIdentifier(_)));
    }

    #[test]
    fn organization_found_by_slug() {
        let (store, org_id) = store_with_org();
        let found = store
            .organization_by_slug(&Slug::parse("acme").unwrap())
            .unwrap();
        assert_eq!(found.id_typed(), org_id);
    }

    #[test]
    fn role_requires_existing_organization() {
        let store = InMemoryAccessStore::new();
        let role = Role::new(RoleId::new(), OrgId::new(), "Viewer", "", Utc::now()).unwrap();
        assert_eq!(store.insert_role(role).unwrap_err(), AccessError::NotFound);
    }

    #[test]
    fn duplicate_role_name_is_case_insensitive() {
        let (store, org_id) = store_with_org();
        new_role(&store, org_id, "Super Administrator");

        let clash = Role::new(RoleId::new(), org_id, "SUPER administrator", "", Utc::now()).unwrap();
        let err = store.insert_role(clash).unwrap_err();
        assert!(matches!(err, AccessError::DuplicateName(_)));
    }

    #[test]
    fn same_role_name_allowed_in_other_organization() {
        let (store, org_a) = store_with_org();
        let org_b = Organization::new(
            OrgId::new(),
            "Globex",
            Slug::parse("globex").unwrap(),
            Utc::now(),
        )
        .unwrap();
        let org_b_id = org_b.id_typed();
        store.insert_organization(org_b).unwrap();

        new_role(&store, org_a, "Viewer");
        new_role(&store, org_b_id, "Viewer");
    }

    #[test]
    fn tombstoned_role_frees_its_name() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");
        store.mark_role_deleted(role.id_typed(), Utc::now()).unwrap();

        // The name can be taken again by a fresh role.
        new_role(&store, org_id, "viewer");
    }

    #[test]
    fn grants_are_idempotent_and_survive_deletion() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");
        let role_id = role.id_typed();

        assert!(store.add_grant(role_id, PermissionId::new("users.view")).unwrap());
        assert!(!store.add_grant(role_id, PermissionId::new("users.view")).unwrap());

        store.mark_role_deleted(role_id, Utc::now()).unwrap();

        // The tombstone keeps the grant rows readable for audit.
        let grants = store.grants_of(role_id).unwrap();
        assert!(grants.contains(&PermissionId::new("users.view")));

        // But writes against the deleted role are rejected.
        let err = store
            .add_grant(role_id, PermissionId::new("users.create"))
            .unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole(_)));
        let err = store
            .remove_grant(role_id, &PermissionId::new("users.view"))
            .unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole(_)));
    }

    #[test]
    fn grant_on_missing_role_is_unknown_role() {
        let store = InMemoryAccessStore::new();
        let err = store
            .add_grant(RoleId::new(), PermissionId::new("users.view"))
            .unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole(_)));
    }

    #[test]
    fn duplicate_membership_rejected() {
        let (store, org_id) = store_with_org();
        let user_id = new_member(&store, org_id);

        let err = store
            .insert_membership(Membership::new(
                user_id,
                org_id,
                MembershipTier::Admin,
                Utc::now(),
            ))
            .unwrap_err();
        assert_eq!(err, AccessError::AlreadyMember);
    }

    #[test]
    fn assignment_requires_membership() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");

        let err = assign(&store, UserId::new(), role.id_typed(), org_id).unwrap_err();
        assert_eq!(err, AccessError::NotAMember);
    }

    #[test]
    fn assignment_rejects_organization_mismatch_without_state_change() {
        let (store, org_a) = store_with_org();
        let org_b = store
            .insert_organization(
                Organization::new(
                    OrgId::new(),
                    "Globex",
                    Slug::parse("globex").unwrap(),
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap()
            .id_typed();

        let role_in_a = new_role(&store, org_a, "Viewer");
        let user = new_member(&store, org_b);

        let err = assign(&store, user, role_in_a.id_typed(), org_b).unwrap_err();
        assert!(matches!(err, AccessError::OrganizationMismatch(_)));
        assert!(store.assignments_of(user, org_b).is_empty());
    }

    #[test]
    fn reassignment_is_idempotent() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");
        let user = new_member(&store, org_id);

        assert!(assign(&store, user, role.id_typed(), org_id).unwrap());
        assert!(!assign(&store, user, role.id_typed(), org_id).unwrap());
        assert_eq!(store.assignments_of(user, org_id).len(), 1);
    }

    #[test]
    fn assignment_to_deleted_role_is_unknown_role() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");
        let user = new_member(&store, org_id);
        store.mark_role_deleted(role.id_typed(), Utc::now()).unwrap();

        let err = assign(&store, user, role.id_typed(), org_id).unwrap_err();
        assert!(matches!(err, AccessError::UnknownRole(_)));
    }

    #[test]
    fn assigned_roles_excludes_tombstones_but_keeps_rows() {
        let (store, org_id) = store_with_org();
        let viewer = new_role(&store, org_id, "Viewer");
        let editor = new_role(&store, org_id, "Editor");
        let user = new_member(&store, org_id);

        assign(&store, user, viewer.id_typed(), org_id).unwrap();
        assign(&store, user, editor.id_typed(), org_id).unwrap();
        assert_eq!(store.assigned_roles(user, org_id).len(), 2);

        store.mark_role_deleted(viewer.id_typed(), Utc::now()).unwrap();

        let names: Vec<_> = store
            .assigned_roles(user, org_id)
            .into_iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["Editor"]);
        // Assignment rows are not cleaned up by the deletion.
        assert_eq!(store.assignments_of(user, org_id).len(), 2);
    }

    #[test]
    fn removing_membership_leaves_assignments_inert() {
        let (store, org_id) = store_with_org();
        let role = new_role(&store, org_id, "Viewer");
        let user = new_member(&store, org_id);
        assign(&store, user, role.id_typed(), org_id).unwrap();

        assert!(store.remove_membership(user, org_id));
        assert!(!store.remove_membership(user, org_id));

        // Rows survive; re-adding the user would reactivate them.
        assert_eq!(store.assignments_of(user, org_id).len(), 1);
        assert!(store.membership(user, org_id).is_none());
    }

    #[test]
    fn tier_update_requires_membership() {
        let (store, org_id) = store_with_org();
        let err = store
            .set_membership_tier(UserId::new(), org_id, MembershipTier::Admin)
            .unwrap_err();
        assert_eq!(err, AccessError::NotFound);

        let user = new_member(&store, org_id);
        store
            .set_membership_tier(user, org_id, MembershipTier::Admin)
            .unwrap();
        assert_eq!(
            store.membership(user, org_id).unwrap().tier(),
            MembershipTier::Admin
        );
    }

    #[test]
    fn listings_stay_inside_the_organization() {
        let (store, org_a) = store_with_org();
        let org_b = store
            .insert_organization(
                Organization::new(
                    OrgId::new(),
                    "Globex",
                    Slug::parse("globex").unwrap(),
                    Utc::now(),
                )
                .unwrap(),
            )
            .unwrap()
            .id_typed();

        new_role(&store, org_a, "Viewer");
        let user = new_member(&store, org_a);

        assert_eq!(store.roles_in(org_a).len(), 1);
        assert!(store.roles_in(org_b).is_empty());
        assert_eq!(store.members_of(org_a).len(), 1);
        assert!(store.members_of(org_b).is_empty());
        assert!(store.assigned_roles(user, org_b).is_empty());
    }
}
