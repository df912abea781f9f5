//! # Provider Registry
//!
//! Resolves a named or wildcard provider selector against the configured
//! provider set and exposes the stable iteration order the resolver uses as
//! its tie-breaker for deduplication.

use std::sync::Arc;

use crate::config::EffectiveConfig;
use crate::glob;
use crate::provider::{build_adapter, ProviderAdapter};

/// One entry in the registry: a configured name paired with its adapter.
pub struct RegistryEntry {
    pub name: String,
    pub adapter: Arc<dyn ProviderAdapter>,
}

/// Holds the parsed provider map keyed by lowercased name, in alphabetical
/// order. Alphabetical order is the deterministic tie-breaker deduplication
/// relies on.
pub struct ProviderRegistry {
    entries: Vec<RegistryEntry>,
}

impl ProviderRegistry {
    /// Build a registry from an effective configuration, constructing one
    /// adapter per configured provider.
    pub fn from_config(config: &EffectiveConfig) -> Self {
        let mut entries: Vec<RegistryEntry> = config
            .providers
            .iter()
            .map(|provider_config| RegistryEntry {
                name: provider_config.name.clone(),
                adapter: Arc::from(build_adapter(provider_config)),
            })
            .collect();
        entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Self { entries }
    }

    /// All configured providers, alphabetical by lowercased name.
    pub fn all(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Exact, case-insensitive lookup by configured name.
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        let key = name.to_lowercase();
        self.entries.iter().find(|e| e.name.to_lowercase() == key)
    }

    /// Providers whose name matches a glob selector, in registry order. A
    /// subset of [`Self::all`], ordered identically.
    pub fn select_by_glob(&self, pattern: &str) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .filter(|e| glob::matches(pattern, &e.name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Swap in a stub adapter for a configured name, used by the resolver's
    /// tests so they exercise fan-out/dedup without live HTTP calls.
    #[cfg(test)]
    pub fn replace_adapter_for_test(&mut self, name: &str, adapter: Arc<dyn ProviderAdapter>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.adapter = adapter;
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
