use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use authforge_core::ValueObject;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "users.view"). There is no
/// wildcard form: an identifier either exists in the catalog and is granted
/// explicitly, or it is denied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionId(Cow<'static, str>);

impl PermissionId {
    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PermissionId {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl ValueObject for PermissionId {}

/// A catalog entry: identifier plus the metadata shown on admin surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    category: String,
    description: String,
}

impl Permission {
    pub fn new(
        id: impl Into<PermissionId>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            description: description.into(),
        }
    }

    pub fn id(&self) -> &PermissionId {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
