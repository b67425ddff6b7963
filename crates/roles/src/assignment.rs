use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authforge_core::{OrgId, RoleId, UserId};

/// Assignment of a role to a user within an organization.
///
/// Unique per (user, role, organization) triple. The organization must match
/// the role's owning organization; the store rejects a mismatch at write
/// time rather than filtering it out on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    user_id: UserId,
    role_id: RoleId,
    org_id: OrgId,
    assigned_at: DateTime<Utc>,
    assigned_by: Option<UserId>,
}

impl RoleAssignment {
    pub fn new(
        user_id: UserId,
        role_id: RoleId,
        org_id: OrgId,
        assigned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            role_id,
            org_id,
            assigned_at,
            assigned_by: None,
        }
    }

    /// Record which administrator performed the assignment.
    pub fn recorded_by(mut self, admin: UserId) -> Self {
        self.assigned_by = Some(admin);
        self
    }

    /// Uniqueness key for the triple.
    pub fn key(&self) -> (UserId, RoleId, OrgId) {
        (self.user_id, self.role_id, self.org_id)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    pub fn assigned_by(&self) -> Option<UserId> {
        self.assigned_by
    }
}
