use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use authforge_core::{AccessError, AccessResult};

use crate::permission::{Permission, PermissionId};

#[derive(Debug, Default)]
struct CatalogState {
    /// Registration order; `list_by_category` and `all` iterate this.
    order: Vec<PermissionId>,
    by_id: HashMap<PermissionId, Permission>,
}

/// Process-wide registry of permission identifiers.
///
/// Read-mostly after initialization. Append-only: there is no removal
/// operation. Permissions are deprecated by convention, never deleted, so
/// historical role grants keep resolving to a catalog entry.
#[derive(Debug, Default)]
pub struct PermissionCatalog {
    state: RwLock<CatalogState>,
}

impl PermissionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a permission.
    ///
    /// Fails with `DuplicateIdentifier` if the id is already registered.
    pub fn register(
        &self,
        id: impl Into<PermissionId>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> AccessResult<()> {
        let permission = Permission::new(id, category, description);
        if permission.id().as_str().trim().is_empty() {
            return Err(AccessError::validation("permission id must not be empty"));
        }

        let mut state = self
            .state
            .write()
            .map_err(|_| AccessError::validation("permission catalog lock poisoned"))?;

        if state.by_id.contains_key(permission.id()) {
            return Err(AccessError::duplicate_identifier(permission.id().as_str()));
        }

        debug!(permission = %permission.id(), category = permission.category(), "permission registered");
        state.order.push(permission.id().clone());
        state.by_id.insert(permission.id().clone(), permission);
        Ok(())
    }

    /// Look up a single permission by id.
    pub fn lookup(&self, id: &PermissionId) -> Option<Permission> {
        let state = self.state.read().ok()?;
        state.by_id.get(id).cloned()
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: &PermissionId) -> bool {
        self.state
            .read()
            .map(|state| state.by_id.contains_key(id))
            .unwrap_or(false)
    }

    /// All permissions in one category, in registration order (stable).
    pub fn list_by_category(&self, category: &str) -> Vec<Permission> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id))
            .filter(|p| p.category() == category)
            .cloned()
            .collect()
    }

    /// Every registered permission, in registration order.
    pub fn all(&self) -> Vec<Permission> {
        let state = match self.state.read() {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> PermissionCatalog {
        let catalog = PermissionCatalog::new();
        catalog.register("users.view", "users", "List and inspect users").unwrap();
        catalog.register("roles.view", "roles", "List roles").unwrap();
        catalog.register("users.create", "users", "Create users").unwrap();
        catalog
    }

    #[test]
    fn register_rejects_duplicate_identifier() {
        let catalog = seeded();
        let err = catalog
            .register("users.view", "users", "again")
            .unwrap_err();
        match err {
            AccessError::DuplicateIdentifier(id) => assert_eq!(id, "users.view"),
            other => panic!("expected DuplicateIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_empty_identifier() {
        let catalog = PermissionCatalog::new();
        let err = catalog.register("  ", "users", "blank").unwrap_err();
        assert!(matches!(err, AccessError::Validation(_)));
    }

    #[test]
    fn lookup_finds_registered_permission() {
        let catalog = seeded();
        let found = catalog.lookup(&PermissionId::new("roles.view")).unwrap();
        assert_eq!(found.category(), "roles");
        assert!(catalog.lookup(&PermissionId::new("nope.view")).is_none());
    }

    #[test]
    fn list_by_category_preserves_registration_order() {
        let catalog = seeded();
        let users: Vec<_> = catalog
            .list_by_category("users")
            .into_iter()
            .map(|p| p.id().as_str().to_string())
            .collect();
        assert_eq!(users, vec!["users.view", "users.create"]);
    }

    #[test]
    fn all_preserves_registration_order_across_categories() {
        let catalog = seeded();
        let ids: Vec<_> = catalog
            .all()
            .into_iter()
            .map(|p| p.id().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["users.view", "roles.view", "users.create"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn order_is_stable_after_later_registration() {
        let catalog = seeded();
        catalog.register("users.delete", "users", "Delete users").unwrap();
        let users: Vec<_> = catalog
            .list_by_category("users")
            .into_iter()
            .map(|p| p.id().as_str().to_string())
            .collect();
        assert_eq!(users, vec!["users.view", "users.create", "users.delete"]);
    }
}
