//! Registry snapshot loading.
//!
//! The scorecard pipeline publishes its catalog as JSON documents
//! (`registry.json`, `all-teams.json`, `all-checks.json`,
//! `current-checks.json`). This module parses local copies of those
//! documents; fetching them is a collaborator concern.

use crate::types::{CheckMetadata, ServiceRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading registry documents.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level service registry document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub checks_hash: Option<String>,
    #[serde(default)]
    pub checks_count: Option<u32>,
}

/// One team entry in the teams registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRegistryEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub github_org: Option<String>,
    #[serde(default)]
    pub github_slug: Option<String>,
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
}

/// Teams registry document (`all-teams.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsDocument {
    #[serde(default)]
    pub teams: IndexMap<String, TeamRegistryEntry>,
}

/// Check definitions document (`all-checks.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChecksDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub checks: Vec<CheckMetadata>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// Current check-set hash document (`current-checks.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentChecks {
    pub checks_hash: String,
    #[serde(default)]
    pub checks_count: Option<u32>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the service registry document.
pub fn load_registry(path: &Path) -> Result<RegistryDocument, RegistryError> {
    let doc: RegistryDocument = load_json(path)?;
    debug!(services = doc.services.len(), "loaded service registry");
    Ok(doc)
}

/// Load the teams registry, or `None` when the file does not exist. Teams
/// metadata is optional; the catalog still renders from service data alone.
pub fn load_teams(path: &Path) -> Result<Option<TeamsDocument>, RegistryError> {
    if !path.exists() {
        debug!(path = %path.display(), "teams registry not present");
        return Ok(None);
    }
    load_json(path).map(Some)
}

/// Load the check definitions, or `None` when the file does not exist.
pub fn load_checks(path: &Path) -> Result<Option<ChecksDocument>, RegistryError> {
    if !path.exists() {
        return Ok(None);
    }
    load_json(path).map(Some)
}

/// Load the current check-set hash, or `None` when the file does not
/// exist. Without it staleness cannot be judged and no service is
/// reported stale.
pub fn load_current_checks(path: &Path) -> Result<Option<CurrentChecks>, RegistryError> {
    if !path.exists() {
        debug!(path = %path.display(), "current-checks document not present");
        return Ok(None);
    }
    load_json(path).map(Some)
}
