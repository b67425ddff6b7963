//! Idempotent seeding of the permission catalog and default roles.
//!
//! Seeding is an explicit initialization step: call it once per process
//! start, passing the catalog/engine in. Re-running against an already
//! seeded system creates no duplicate rows and raises no errors.

use tracing::info;

use authforge_catalog::PermissionCatalog;
use authforge_core::{AccessError, AccessResult, OrgId};
use authforge_roles::Role;
use authforge_store::AccessStore;

use crate::AccessEngine;

/// Name of the seeded role granted every catalog permission.
pub const FULL_ACCESS_ROLE: &str = "Super Administrator";

/// Name of the seeded role granted every `*.view` permission.
pub const READ_ONLY_ROLE: &str = "Read Only";

/// Built-in permission set registered at bootstrap: (id, category, description).
const BUILTIN_PERMISSIONS: &[(&str, &str, &str)] = &[
    ("users.view", "users", "List and inspect user accounts"),
    ("users.create", "users", "Create user accounts"),
    ("users.update", "users", "Edit user accounts"),
    ("users.delete", "users", "Deactivate user accounts"),
    ("roles.view", "roles", "List roles and their grants"),
    ("roles.create", "roles", "Create roles"),
    ("roles.update", "roles", "Edit role grants"),
    ("roles.delete", "roles", "Delete roles"),
    ("members.view", "members", "List organization members"),
    ("members.invite", "members", "Invite organization members"),
    ("members.remove", "members", "Remove organization members"),
    ("organizations.view", "organizations", "View organization settings"),
    ("organizations.update", "organizations", "Edit organization settings"),
    ("reports.view", "reports", "View reports and dashboards"),
];

/// Register the built-in permissions, skipping any already present.
///
/// Returns how many were newly registered (zero on a re-run).
pub fn seed_catalog(catalog: &PermissionCatalog) -> AccessResult<usize> {
    let mut registered = 0;
    for (id, category, description) in BUILTIN_PERMISSIONS {
        match catalog.register(*id, *category, *description) {
            Ok(()) => registered += 1,
            Err(AccessError::DuplicateIdentifier(_)) => {}
            Err(other) => return Err(other),
        }
    }
    if registered > 0 {
        info!(registered, "permission catalog seeded");
    }
    Ok(registered)
}

/// Create (or top up) the default roles for one organization.
///
/// "Super Administrator" ends up granting the full catalog *as of this run*;
/// "Read Only" every `*.view` permission. Catalog registration and role
/// grants stay independent operations: a permission registered later is not
/// granted until the next explicit grant or seeding pass.
pub fn seed_default_roles<S: AccessStore>(
    engine: &AccessEngine<S>,
    org_id: OrgId,
) -> AccessResult<()> {
    let ctx = engine.context(org_id)?;

    let full_access = role_named(
        engine,
        &ctx,
        FULL_ACCESS_ROLE,
        "Full access to every function",
    )?;
    for permission in engine.catalog().all() {
        engine.grant_permission(&ctx, full_access.id_typed(), permission.id().clone())?;
    }

    let read_only = role_named(engine, &ctx, READ_ONLY_ROLE, "View-only access")?;
    for permission in engine.catalog().all() {
        if permission.id().as_str().ends_with(".view") {
            engine.grant_permission(&ctx, read_only.id_typed(), permission.id().clone())?;
        }
    }

    Ok(())
}

/// Seed the catalog and one organization's default roles in one pass.
pub fn seed<S: AccessStore>(engine: &AccessEngine<S>, org_id: OrgId) -> AccessResult<()> {
    seed_catalog(engine.catalog())?;
    seed_default_roles(engine, org_id)
}

fn role_named<S: AccessStore>(
    engine: &AccessEngine<S>,
    ctx: &crate::OrgContext,
    name: &str,
    description: &str,
) -> AccessResult<Role> {
    match engine.store().role_by_name(ctx.org_id(), name) {
        Some(existing) => Ok(existing),
        None => engine.create_role(ctx, name, description),
    }
}
