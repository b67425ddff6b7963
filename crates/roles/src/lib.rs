//! `authforge-roles` — roles and role assignments.
//!
//! A role is an organization-scoped bundle of permission grants. Deletion is
//! a tombstone (soft delete): the record and its grant rows survive for
//! audit, but a deleted role stops granting access the moment the flag flips.

pub mod assignment;
pub mod role;

pub use assignment::RoleAssignment;
pub use role::Role;
