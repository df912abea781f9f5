//! # Repository Descriptor
//!
//! The immutable record produced by provider adapters and carried through
//! resolution, planning, and synchronization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One repository as reported by a provider adapter.
///
/// Identity for deduplication is `(organization_lower, name_lower)` first,
/// then `clone_url` exact match as a secondary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    pub organization: String,
    pub project: Option<String>,
    pub name: String,
    pub clone_url: String,
    pub default_branch: Option<String>,
    pub is_private: bool,
    pub description: Option<String>,
    pub provider_name: String,
    /// Opaque provider-specific metadata, never interpreted by the core.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RepositoryDescriptor {
    /// Primary dedup key: case-folded `(organization, name)`.
    pub fn primary_key(&self) -> (String, String) {
        (self.organization.to_lowercase(), self.name.to_lowercase())
    }

    /// Secondary dedup key: exact clone URL, used as a fast path to catch
    /// identical clones listed under aliased owners.
    pub fn secondary_key(&self) -> &str {
        &self.clone_url
    }

    /// Human-readable `owner/[project/]name` label used in reports.
    pub fn display_name(&self) -> String {
        match &self.project {
            Some(project) if !project.is_empty() => {
                format!("{}/{}/{}", self.organization, project, self.name)
            }
            _ => format!("{}/{}", self.organization, self.name),
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
