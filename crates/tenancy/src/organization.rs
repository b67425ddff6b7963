use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use authforge_core::{AccessError, AccessResult, Entity, OrgId, ValueObject};

/// URL-safe organization handle, unique across the system.
///
/// Lowercase ASCII letters, digits, and interior hyphens only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn parse(value: impl Into<String>) -> AccessResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AccessError::validation("slug must not be empty"));
        }
        if value.starts_with('-') || value.ends_with('-') {
            return Err(AccessError::validation(
                "slug must not start or end with a hyphen",
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(AccessError::validation(format!(
                "slug '{value}' may only contain lowercase letters, digits, and hyphens"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for Slug {}

/// Organization: the tenant boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: OrgId,
    name: String,
    slug: Slug,
    created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        id: OrgId,
        name: impl Into<String>,
        slug: Slug,
        created_at: DateTime<Utc>,
    ) -> AccessResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AccessError::validation("organization name must not be empty"));
        }
        Ok(Self {
            id,
            name,
            slug,
            created_at,
        })
    }

    pub fn id_typed(&self) -> OrgId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &Slug {
        &self.slug
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Organization {
    type Id = OrgId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
