//! `authforge-tenancy` — organizations and memberships.
//!
//! The organization is the root of the tenant boundary: every role and
//! membership belongs to exactly one, and nothing in the engine crosses it.

pub mod membership;
pub mod organization;

pub use membership::{Membership, MembershipTier};
pub use organization::{Organization, Slug};
