use authforge_core::{AccessError, AccessResult, OrgId};
use authforge_store::AccessStore;

/// Organization context for an administrative call.
///
/// This is immutable and must be present for every organization-scoped
/// mutation or read: holding one proves the organization existed when the
/// request entered the engine. Queries (`authorize` and friends) take a raw
/// `OrgId` instead; they must be safe to call speculatively and simply
/// resolve to "no access" for an unknown organization.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OrgContext {
    org_id: OrgId,
}

impl OrgContext {
    /// Validate that the organization exists and capture its scope.
    pub fn resolve<S: AccessStore>(store: &S, org_id: OrgId) -> AccessResult<Self> {
        if store.organization(org_id).is_none() {
            return Err(AccessError::NotFound);
        }
        Ok(Self { org_id })
    }

    pub fn org_id(&self) -> OrgId {
        self.org_id
    }
}
