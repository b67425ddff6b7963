use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authforge_catalog::PermissionId;
use authforge_core::{AccessError, AccessResult, Entity, OrgId, RoleId};

/// Organization-scoped bundle of permission grants.
///
/// # Invariants
/// - A role belongs to exactly one organization (immutable after creation).
/// - Display name unique among the organization's non-deleted roles,
///   compared case-insensitively (enforced by the store on insert).
/// - Grants are unique per (role, permission) pair (a set, not a list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    org_id: OrgId,
    name: String,
    description: String,
    grants: BTreeSet<PermissionId>,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(
        id: RoleId,
        org_id: OrgId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> AccessResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AccessError::validation("role name must not be empty"));
        }
        Ok(Self {
            id,
            org_id,
            name,
            description: description.into(),
            grants: BTreeSet::new(),
            created_at,
            deleted_at: None,
        })
    }

    pub fn id_typed(&self) -> RoleId {
        self.id
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded key used for the per-organization uniqueness check.
    ///
    /// Source data uses human-readable names ("Super Administrator"), so the
    /// store compares them case-insensitively.
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn grants(&self) -> &BTreeSet<PermissionId> {
        &self.grants
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Add a permission grant. Returns `false` if it was already present.
    pub fn add_grant(&mut self, permission: PermissionId) -> bool {
        self.grants.insert(permission)
    }

    /// Remove a permission grant. Returns `false` if it was not present.
    pub fn remove_grant(&mut self, permission: &PermissionId) -> bool {
        self.grants.remove(permission)
    }

    /// Stamp the deletion tombstone. Returns `false` if already deleted
    /// (the first timestamp wins; repeating the delete changes nothing).
    pub fn mark_deleted(&mut self, at: DateTime<Utc>) -> bool {
        if self.deleted_at.is_some() {
            return false;
        }
        self.deleted_at = Some(at);
        true
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
