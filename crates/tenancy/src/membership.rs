use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authforge_core::{OrgId, UserId};

/// Coarse membership tier within an organization.
///
/// Tiers order by privilege (`Member < Admin < Owner`). They do not grant
/// permissions by themselves (permission checks go through role grants), but
/// callers may gate their own management surfaces on them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    /// Lowest privilege; the default for new members.
    #[default]
    Member,
    Admin,
    Owner,
}

impl MembershipTier {
    pub fn is_admin(self) -> bool {
        self >= MembershipTier::Admin
    }
}

impl core::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MembershipTier::Member => write!(f, "member"),
            MembershipTier::Admin => write!(f, "admin"),
            MembershipTier::Owner => write!(f, "owner"),
        }
    }
}

/// Membership record: one user's standing within one organization.
///
/// Unique per (user, organization). Required before any role assignment in
/// the organization carries weight: assignments without a membership are
/// inert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    user_id: UserId,
    org_id: OrgId,
    tier: MembershipTier,
    joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        user_id: UserId,
        org_id: OrgId,
        tier: MembershipTier,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            org_id,
            tier,
            joined_at,
        }
    }

    /// Uniqueness key for the (user, organization) pair.
    pub fn key(&self) -> (UserId, OrgId) {
        (self.user_id, self.org_id)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    pub fn tier(&self) -> MembershipTier {
        self.tier
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn with_tier(mut self, tier: MembershipTier) -> Self {
        self.tier = tier;
        self
    }
}
