//! Check adoption statistics.
//!
//! Adoption measures how many services pass a given check. Services that
//! excluded the check are tracked separately and never dilute the
//! percentage; any other non-pass outcome (fail, error, skipped, or no
//! recorded result) counts as failing.

use crate::types::{CheckMetadata, CheckStatus, ServiceRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Bucket name for services with no assigned team in per-team breakdowns.
pub const NO_TEAM_BUCKET: &str = "No Team";

/// Whether a service has explicitly excluded a check.
pub fn is_check_excluded(service: &ServiceRecord, check_id: &str) -> bool {
    service.excluded_checks.iter().any(|e| e.check == check_id)
}

/// Exclusion reason recorded for a check, if any.
pub fn exclusion_reason<'a>(service: &'a ServiceRecord, check_id: &str) -> Option<&'a str> {
    service
        .excluded_checks
        .iter()
        .find(|e| e.check == check_id)
        .map(|e| e.reason.as_str())
}

/// Adoption counts for one check over a set of services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckAdoption {
    pub passing: usize,
    pub failing: usize,
    pub excluded: usize,
    pub total: usize,
    /// round(100 * passing / (passing + failing)); 0 when no service is
    /// actively measured.
    pub percentage: u32,
}

impl CheckAdoption {
    /// Services actively measured (total minus excluded).
    pub fn active_total(&self) -> usize {
        self.passing + self.failing
    }
}

/// Compute adoption of a single check across services.
///
/// Exclusion takes precedence over any recorded result: a service that
/// excluded the check is counted as excluded even if a stale status is
/// still present in `check_results`.
pub fn check_adoption(services: &[ServiceRecord], check_id: &str) -> CheckAdoption {
    let mut passing = 0;
    let mut failing = 0;
    let mut excluded = 0;

    for service in services {
        if is_check_excluded(service, check_id) {
            excluded += 1;
        } else if service.check_status(check_id) == Some(CheckStatus::Pass) {
            passing += 1;
        } else {
            failing += 1;
        }
    }

    let active = passing + failing;
    CheckAdoption {
        passing,
        failing,
        excluded,
        total: services.len(),
        percentage: if active > 0 {
            ((passing as f64 / active as f64) * 100.0).round() as u32
        } else {
            0
        },
    }
}

/// Adoption of a single check broken down by primary team. Services with
/// no team fall into the [`NO_TEAM_BUCKET`]. Teams appear in order of
/// first appearance in the service collection.
pub fn adoption_by_team(
    services: &[ServiceRecord],
    check_id: &str,
) -> IndexMap<String, CheckAdoption> {
    let mut groups: IndexMap<String, Vec<ServiceRecord>> = IndexMap::new();
    for service in services {
        let team = service
            .team_name()
            .unwrap_or(NO_TEAM_BUCKET)
            .to_string();
        groups.entry(team).or_default().push(service.clone());
    }

    groups
        .into_iter()
        .map(|(team, members)| {
            let adoption = check_adoption(&members, check_id);
            (team, adoption)
        })
        .collect()
}

/// Adoption rollup for a check definition, for the adoption dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckAdoptionEntry {
    pub check_id: String,
    pub name: String,
    pub category: Option<String>,
    pub weight: u32,
    #[serde(flatten)]
    pub adoption: CheckAdoption,
}

/// Compute adoption for every known check definition.
pub fn adoption_for_checks(
    services: &[ServiceRecord],
    checks: &[CheckMetadata],
) -> Vec<CheckAdoptionEntry> {
    checks
        .iter()
        .map(|check| CheckAdoptionEntry {
            check_id: check.id.clone(),
            name: check.name.clone(),
            category: check.category.clone(),
            weight: check.weight,
            adoption: check_adoption(services, &check.id),
        })
        .collect()
}
