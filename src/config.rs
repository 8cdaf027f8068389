//! CLI configuration.
//!
//! `catalog.toml` tells the binary where the registry snapshot lives and
//! which sort orders to use by default. All fields have sensible defaults
//! so the file is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "catalog.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Registry document locations
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Display defaults
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Paths to the registry snapshot documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Service registry document
    pub services: PathBuf,

    /// Teams registry document (optional file)
    pub teams: PathBuf,

    /// Check definitions document (optional file)
    pub checks: PathBuf,

    /// Current check-set hash document (optional file)
    pub current_checks: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            services: PathBuf::from("catalog/registry.json"),
            teams: PathBuf::from("catalog/all-teams.json"),
            checks: PathBuf::from("catalog/all-checks.json"),
            current_checks: PathBuf::from("catalog/current-checks.json"),
        }
    }
}

/// Default sort keys for the two views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Service sort key (score-desc, score-asc, name-asc, name-desc,
    /// updated-desc, updated-asc)
    pub service_sort: String,

    /// Team sort key (score-desc, score-asc, services-desc, services-asc,
    /// name-asc, name-desc)
    pub team_sort: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            service_sort: "score-desc".to_string(),
            team_sort: "score-desc".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `catalog.toml` from the given directory, falling back to
    /// defaults when it does not exist.
    pub fn load_or_default(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write configuration to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
