//! Service filtering pipeline.
//!
//! Filtering is a sequential AND-chain over four stages: team selection,
//! include/exclude filters, per-check filters, and free-text search. Each
//! stage only narrows the working set; relative order is always preserved.
//! Sorting is a separate pass (see [`crate::sort`]).

use crate::staleness::is_stale;
use crate::types::{CheckStatus, Rank, ServiceRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved team-filter value matching services with no assigned team.
pub const NO_TEAM_SENTINEL: &str = "__no_team__";

/// Tri-state filter mode. Absence from the criteria map means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    Include,
    Exclude,
}

/// Cycle a filter through unset -> include -> exclude -> unset.
pub fn cycle_filter_mode(current: Option<FilterMode>) -> Option<FilterMode> {
    match current {
        None => Some(FilterMode::Include),
        Some(FilterMode::Include) => Some(FilterMode::Exclude),
        Some(FilterMode::Exclude) => None,
    }
}

/// The fixed set of recognized filter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    HasApi,
    Stale,
    Installed,
    Rank(Rank),
}

impl FilterKey {
    /// Parse a filter name. Unknown names return `None` and are skipped by
    /// the predicate, so criteria written by a drifted UI degrade to no-ops.
    pub fn parse(name: &str) -> Option<FilterKey> {
        match name {
            "has-api" => Some(FilterKey::HasApi),
            "stale" => Some(FilterKey::Stale),
            "installed" => Some(FilterKey::Installed),
            other => Rank::parse(other).map(FilterKey::Rank),
        }
    }

    fn matches(&self, service: &ServiceRecord, current_hash: Option<&str>) -> bool {
        match self {
            FilterKey::HasApi => service.has_api,
            FilterKey::Stale => is_stale(service, current_hash),
            FilterKey::Installed => service.installed,
            FilterKey::Rank(rank) => service.rank == *rank,
        }
    }
}

/// Required status for a per-check filter. Absence means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckRequirement {
    Pass,
    Fail,
}

/// User-selected filter, search, and sort criteria.
///
/// The default value is the identity transform: no stage is active and
/// `filter_services` returns its input unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Filter name -> include/exclude. Multiple entries AND together.
    #[serde(default)]
    pub active: IndexMap<String, FilterMode>,
    /// Check id -> required status. Multiple entries AND together.
    #[serde(default)]
    pub check_filters: IndexMap<String, CheckRequirement>,
    /// Comma-separated team names, case-insensitive. `__no_team__` selects
    /// services with no team.
    #[serde(default)]
    pub team_filter: Option<String>,
    /// Case-insensitive substring search over name, org, repo, and team.
    #[serde(default)]
    pub search: String,
    /// Sort key applied after filtering (see [`crate::sort::SortKey`]).
    #[serde(default)]
    pub sort: String,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear a named filter.
    pub fn set_filter(&mut self, name: &str, mode: Option<FilterMode>) {
        match mode {
            Some(mode) => {
                self.active.insert(name.to_string(), mode);
            }
            None => {
                self.active.shift_remove(name);
            }
        }
    }

    /// Set or clear a per-check filter.
    pub fn set_check_filter(&mut self, check_id: &str, requirement: Option<CheckRequirement>) {
        match requirement {
            Some(req) => {
                self.check_filters.insert(check_id.to_string(), req);
            }
            None => {
                self.check_filters.shift_remove(check_id);
            }
        }
    }

    /// Number of active per-check filters.
    pub fn active_check_filter_count(&self) -> usize {
        self.check_filters.len()
    }

    /// True when no stage would narrow the input.
    pub fn is_identity(&self) -> bool {
        self.active.is_empty()
            && self.check_filters.is_empty()
            && self.team_filter.as_deref().map_or(true, str::is_empty)
            && self.search.is_empty()
    }

    /// Clear the include/exclude filters, leaving search/team/check filters.
    pub fn clear_filters(&mut self) {
        self.active.clear();
    }

    /// Clear the per-check filters.
    pub fn clear_check_filters(&mut self) {
        self.check_filters.clear();
    }

    fn selected_teams(&self) -> Option<Vec<String>> {
        let raw = self.team_filter.as_deref()?;
        if raw.is_empty() {
            return None;
        }
        Some(
            raw.split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }
}

/// Apply the filter criteria to a service collection, preserving input
/// order. Inputs are never mutated; matching records are cloned out.
pub fn filter_services(
    services: &[ServiceRecord],
    criteria: &FilterCriteria,
    current_hash: Option<&str>,
) -> Vec<ServiceRecord> {
    let selected_teams = criteria.selected_teams();
    let search = criteria.search.trim().to_lowercase();

    services
        .iter()
        .filter(|service| {
            matches_team_stage(service, selected_teams.as_deref())
                && matches_filter_stage(service, &criteria.active, current_hash)
                && matches_check_stage(service, &criteria.check_filters)
                && matches_search_stage(service, &search)
        })
        .cloned()
        .collect()
}

fn matches_team_stage(service: &ServiceRecord, selected: Option<&[String]>) -> bool {
    let Some(selected) = selected else {
        return true;
    };
    match service.team_name() {
        None => selected.iter().any(|t| t == NO_TEAM_SENTINEL),
        Some(team) => {
            let team = team.to_lowercase();
            selected.iter().any(|t| *t == team)
        }
    }
}

fn matches_filter_stage(
    service: &ServiceRecord,
    active: &IndexMap<String, FilterMode>,
    current_hash: Option<&str>,
) -> bool {
    for (name, mode) in active {
        let Some(key) = FilterKey::parse(name) else {
            continue;
        };
        let matches = key.matches(service, current_hash);
        match mode {
            FilterMode::Include if !matches => return false,
            FilterMode::Exclude if matches => return false,
            _ => {}
        }
    }
    true
}

fn matches_check_stage(
    service: &ServiceRecord,
    check_filters: &IndexMap<String, CheckRequirement>,
) -> bool {
    for (check_id, requirement) in check_filters {
        // An excluded check satisfies neither requirement.
        if crate::adoption::is_check_excluded(service, check_id) {
            return false;
        }
        let status = service.check_status(check_id);
        let satisfied = match requirement {
            CheckRequirement::Pass => status == Some(CheckStatus::Pass),
            CheckRequirement::Fail => status == Some(CheckStatus::Fail),
        };
        if !satisfied {
            return false;
        }
    }
    true
}

fn matches_search_stage(service: &ServiceRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    service.search_haystack().contains(query)
}
