//! `authforge-store` — the storage boundary.
//!
//! This crate defines the storage-facing abstraction for organizations,
//! roles, memberships, and role assignments without making any storage
//! assumptions, plus an in-memory reference implementation for tests/dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryAccessStore;
pub use r#trait::AccessStore;
