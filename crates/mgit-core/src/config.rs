//! # Effective Configuration
//!
//! The in-memory view of providers and global defaults that the rest of the
//! core operates against. Configuration is loaded once per invocation at the
//! CLI boundary and never mutated afterward; this module only defines the
//! shape, not the loading.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Which provider implementation a configured entry selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    AzureDevOps,
    GitHub,
    Bitbucket,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderKind::AzureDevOps => "azuredevops",
            ProviderKind::GitHub => "github",
            ProviderKind::Bitbucket => "bitbucket",
        };
        f.write_str(s)
    }
}

/// A credential held only in memory, zeroized on drop.
///
/// Unlike a plain `String`, the backing buffer is wiped rather than merely
/// cleared, so a copy of the process's memory taken after this value's
/// lifetime ends does not contain the secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretString").field(&"[REDACTED]").finish()
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(SecretString::new(raw))
    }
}

/// One configured provider instance.
///
/// Invariant: `name` is the sole external handle and is unique
/// case-insensitively across the configured set; the core never mutates
/// this struct after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub user: Option<String>,
    pub secret: SecretString,
    pub workspace: Option<String>,
}

impl ProviderConfig {
    /// Case-folded name, used as the registry key.
    pub fn name_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// What to do with a repository that already has a local checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    Skip,
    Pull,
    Force,
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateMode::Skip => "skip",
            UpdateMode::Pull => "pull",
            UpdateMode::Force => "force",
        };
        f.write_str(s)
    }
}

/// Defaults applied only when the caller omits the corresponding CLI flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub default_concurrency: u32,
    pub default_update_mode: UpdateMode,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_concurrency: 4,
            default_update_mode: UpdateMode::Skip,
        }
    }
}

/// The hard ceiling on repository-fanout concurrency, regardless of what a
/// caller or config file requests.
pub const MAX_REPOSITORY_CONCURRENCY: u32 = 50;

/// The provider-fanout concurrency cap; not user-configurable.
pub const PROVIDER_CONCURRENCY_CAP: usize = 10;

/// The fully loaded, read-only view the core operates against for the
/// duration of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub global: GlobalConfig,
}

impl EffectiveConfig {
    /// Clamp a requested repository-fanout concurrency to the hard max,
    /// returning whether clamping occurred so the caller can warn.
    pub fn clamp_repository_concurrency(requested: u32) -> (u32, bool) {
        if requested > MAX_REPOSITORY_CONCURRENCY {
            (MAX_REPOSITORY_CONCURRENCY, true)
        } else {
            (requested, false)
        }
    }

    /// Look up a provider by case-insensitive name.
    pub fn find(&self, name: &str) -> Option<&ProviderConfig> {
        let key = name.to_lowercase();
        self.providers.iter().find(|p| p.name_key() == key)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
