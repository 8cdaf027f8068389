//! Staleness classification.
//!
//! A service is stale when its score was computed against a check-definition
//! set whose content hash no longer matches the catalog's current hash.

use crate::types::ServiceRecord;
use serde::{Deserialize, Serialize};

/// Check whether a service needs re-scoring against the current check set.
///
/// Without a current hash staleness cannot be judged, so the answer is
/// always false. A record with no recorded hash predates hash tracking and
/// is conservatively flagged stale.
pub fn is_stale(service: &ServiceRecord, current_hash: Option<&str>) -> bool {
    let Some(current) = current_hash else {
        return false;
    };
    match &service.checks_hash {
        None => true,
        Some(hash) => hash != current,
    }
}

/// Per-service staleness detail for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalenessInfo {
    pub is_stale: bool,
    pub message: String,
    pub service_hash: String,
    pub current_hash: String,
}

/// Build the staleness detail shown on a service card.
pub fn staleness_info(service: &ServiceRecord, current_hash: Option<&str>) -> StalenessInfo {
    let stale = is_stale(service, current_hash);
    StalenessInfo {
        is_stale: stale,
        message: if stale {
            "Score may be outdated (checks have been updated)".to_string()
        } else {
            "Score is current".to_string()
        },
        service_hash: service
            .checks_hash
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        current_hash: current_hash.unwrap_or("unknown").to_string(),
    }
}

/// Staleness rollup across a set of services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessStats {
    pub total: usize,
    pub stale: usize,
    pub up_to_date: usize,
    pub percentage: u32,
}

/// Compute the staleness rollup for a set of services.
pub fn staleness_stats(services: &[ServiceRecord], current_hash: Option<&str>) -> StalenessStats {
    let stale = services
        .iter()
        .filter(|s| is_stale(s, current_hash))
        .count();
    let total = services.len();
    StalenessStats {
        total,
        stale,
        up_to_date: total - stale,
        percentage: if total > 0 {
            ((stale as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        },
    }
}

/// Count services that are both stale and installed.
pub fn count_stale_installed(services: &[ServiceRecord], current_hash: Option<&str>) -> usize {
    services
        .iter()
        .filter(|s| s.installed && is_stale(s, current_hash))
        .count()
}
