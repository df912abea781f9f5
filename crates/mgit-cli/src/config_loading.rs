//! # Configuration Loading
//!
//! Collaborator that turns the on-disk configuration file into the core's
//! `EffectiveConfig` shape. The core never sees this module; it only
//! consumes what this module produces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mgit_core::{EffectiveConfig, GlobalConfig, ProviderConfig, ProviderKind, UpdateMode};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("configuration file not found at {path}")]
    FileNotFound { path: PathBuf },

    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("provider '{name}' has unknown kind '{kind}'")]
    UnknownProviderKind { name: String, kind: String },

    #[error("provider names must be unique case-insensitively; '{name}' collides with an earlier entry")]
    DuplicateProviderName { name: String },
}

#[derive(Debug, Deserialize)]
struct RawConfigFile {
    #[serde(default)]
    global: RawGlobalConfig,
    #[serde(default)]
    providers: HashMap<String, RawProviderConfig>,
}

#[derive(Debug, Deserialize)]
struct RawGlobalConfig {
    #[serde(default = "default_concurrency")]
    default_concurrency: u32,
    #[serde(default = "default_update_mode")]
    default_update_mode: String,
}

fn default_concurrency() -> u32 {
    4
}

fn default_update_mode() -> String {
    "skip".to_string()
}

impl Default for RawGlobalConfig {
    fn default() -> Self {
        Self {
            default_concurrency: default_concurrency(),
            default_update_mode: default_update_mode(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawProviderConfig {
    kind: String,
    url: String,
    #[serde(default)]
    user: Option<String>,
    token: String,
    #[serde(default)]
    workspace: Option<String>,
}

/// Default config file location: `${HOME}/.config/mgit/config.yaml` (or the
/// platform analog resolved by `dirs`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mgit").join("config.yaml"))
}

/// Load and decode the configuration file at `path`, falling back to an
/// empty provider set with default globals when no path is given and the
/// default location does not exist. Zero configured providers is a valid,
/// non-error state.
pub fn load(path: Option<&Path>) -> Result<EffectiveConfig, ConfigLoadError> {
    let resolved = match path {
        Some(p) => Some(p.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let Some(resolved) = resolved else {
        if let Some(explicit) = path {
            return Err(ConfigLoadError::FileNotFound {
                path: explicit.to_path_buf(),
            });
        }
        return Ok(EffectiveConfig {
            providers: Vec::new(),
            global: GlobalConfig::default(),
        });
    };

    if !resolved.exists() {
        return Err(ConfigLoadError::FileNotFound { path: resolved });
    }

    let contents = std::fs::read_to_string(&resolved).map_err(|source| ConfigLoadError::Io {
        path: resolved.clone(),
        source,
    })?;

    let raw: RawConfigFile = serde_yaml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: resolved.clone(),
        message: err.to_string(),
    })?;

    decode(raw)
}

fn decode(raw: RawConfigFile) -> Result<EffectiveConfig, ConfigLoadError> {
    let default_update_mode = match raw.global.default_update_mode.as_str() {
        "skip" => UpdateMode::Skip,
        "pull" => UpdateMode::Pull,
        "force" => UpdateMode::Force,
        other => {
            return Err(ConfigLoadError::Parse {
                path: PathBuf::new(),
                message: format!("unknown default_update_mode '{other}'"),
            })
        }
    };

    let mut seen_names = std::collections::HashSet::new();
    let mut providers = Vec::with_capacity(raw.providers.len());
    for (name, raw_provider) in raw.providers {
        let key = name.to_lowercase();
        if !seen_names.insert(key) {
            return Err(ConfigLoadError::DuplicateProviderName { name });
        }

        let kind = match raw_provider.kind.to_lowercase().as_str() {
            "azuredevops" | "azure_devops" | "azure-devops" => ProviderKind::AzureDevOps,
            "github" => ProviderKind::GitHub,
            "bitbucket" => ProviderKind::Bitbucket,
            other => {
                return Err(ConfigLoadError::UnknownProviderKind {
                    name,
                    kind: other.to_string(),
                })
            }
        };

        providers.push(ProviderConfig {
            name,
            kind,
            base_url: raw_provider.url,
            user: raw_provider.user,
            secret: raw_provider.token.into(),
            workspace: raw_provider.workspace,
        });
    }

    Ok(EffectiveConfig {
        providers,
        global: GlobalConfig {
            default_concurrency: raw.global.default_concurrency,
            default_update_mode,
        },
    })
}

#[cfg(test)]
#[path = "config_loading_tests.rs"]
mod tests;
