//! Catalog state container.
//!
//! Owns the full service and team collections plus the current filter
//! criteria, and keeps the derived filtered slices consistent with them.
//! Every mutator replaces values and recomputes the derived slices in
//! full, then notifies subscribers; nothing is patched in place. The
//! container is single-threaded by design and holds no locks.

use crate::filter::{filter_services, CheckRequirement, FilterCriteria, FilterMode};
use crate::registry::TeamsDocument;
use crate::sort::{sort_services, sort_teams};
use crate::stats::{compute_team_stats, filter_stats, merge_team_stats, FilterStats};
use crate::types::{ServiceRecord, TeamRecord};
use tracing::debug;

/// Handle returned by [`CatalogState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Immutable view handed to subscribers after each recompute.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub services_filtered: Vec<ServiceRecord>,
    pub teams_filtered: Vec<TeamRecord>,
    pub filter_stats: FilterStats,
}

type Listener = Box<dyn Fn(&CatalogSnapshot)>;

/// The application state container for the catalog.
pub struct CatalogState {
    services_all: Vec<ServiceRecord>,
    services_filtered: Vec<ServiceRecord>,
    teams_registry: Option<TeamsDocument>,
    teams_all: Vec<TeamRecord>,
    teams_filtered: Vec<TeamRecord>,
    criteria: FilterCriteria,
    team_sort: String,
    team_search: String,
    checks_hash: Option<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogState")
            .field("services", &self.services_all.len())
            .field("filtered", &self.services_filtered.len())
            .field("teams", &self.teams_all.len())
            .field("criteria", &self.criteria)
            .field("checks_hash", &self.checks_hash)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CatalogState {
    pub fn new() -> Self {
        Self {
            services_all: Vec::new(),
            services_filtered: Vec::new(),
            teams_registry: None,
            teams_all: Vec::new(),
            teams_filtered: Vec::new(),
            criteria: FilterCriteria {
                sort: "score-desc".to_string(),
                ..Default::default()
            },
            team_sort: "score-desc".to_string(),
            team_search: String::new(),
            checks_hash: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    // ---- accessors -------------------------------------------------------

    pub fn services(&self) -> &[ServiceRecord] {
        &self.services_all
    }

    pub fn filtered_services(&self) -> &[ServiceRecord] {
        &self.services_filtered
    }

    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams_all
    }

    pub fn filtered_teams(&self) -> &[TeamRecord] {
        &self.teams_filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn checks_hash(&self) -> Option<&str> {
        self.checks_hash.as_deref()
    }

    /// Filter-bar statistics for the current state.
    pub fn filter_stats(&self) -> FilterStats {
        filter_stats(
            &self.services_all,
            &self.services_filtered,
            self.checks_hash.as_deref(),
        )
    }

    // ---- subscriptions ---------------------------------------------------

    /// Register a listener invoked synchronously after every recompute.
    pub fn subscribe(&mut self, listener: impl Fn(&CatalogSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    // ---- mutators --------------------------------------------------------

    /// Replace the service collection. Team aggregates are recomputed
    /// wholesale from the new collection.
    pub fn set_services(&mut self, services: Vec<ServiceRecord>) {
        self.services_all = services;
        self.recompute();
    }

    /// Replace the teams registry metadata used when merging aggregates.
    pub fn set_teams_registry(&mut self, registry: Option<TeamsDocument>) {
        self.teams_registry = registry;
        self.recompute();
    }

    /// Replace the current check-set hash used for staleness.
    pub fn set_checks_hash(&mut self, hash: Option<String>) {
        self.checks_hash = hash;
        self.recompute();
    }

    /// Set or clear a named include/exclude filter.
    pub fn set_filter(&mut self, name: &str, mode: Option<FilterMode>) {
        self.criteria.set_filter(name, mode);
        self.recompute();
    }

    /// Set or clear a per-check filter.
    pub fn set_check_filter(&mut self, check_id: &str, requirement: Option<CheckRequirement>) {
        self.criteria.set_check_filter(check_id, requirement);
        self.recompute();
    }

    /// Replace the team filter (comma-separated names, `__no_team__`
    /// sentinel allowed).
    pub fn set_team_filter(&mut self, team_filter: Option<String>) {
        self.criteria.team_filter = team_filter;
        self.recompute();
    }

    /// Replace the search query.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.recompute();
    }

    /// Replace the service sort key.
    pub fn set_sort(&mut self, sort: impl Into<String>) {
        self.criteria.sort = sort.into();
        self.recompute();
    }

    /// Replace the team sort key.
    pub fn set_team_sort(&mut self, sort: impl Into<String>) {
        self.team_sort = sort.into();
        self.recompute();
    }

    /// Replace the team search query (matches team name or description).
    pub fn set_team_search(&mut self, search: impl Into<String>) {
        self.team_search = search.into();
        self.recompute();
    }

    /// Clear the include/exclude filters.
    pub fn clear_filters(&mut self) {
        self.criteria.clear_filters();
        self.recompute();
    }

    /// Clear the per-check filters.
    pub fn clear_check_filters(&mut self) {
        self.criteria.clear_check_filters();
        self.recompute();
    }

    /// Reset all state to its initial value, keeping subscribers.
    pub fn reset(&mut self) {
        let listeners = std::mem::take(&mut self.listeners);
        let next = self.next_subscription;
        *self = Self::new();
        self.listeners = listeners;
        self.next_subscription = next;
        self.notify();
    }

    // ---- derivation ------------------------------------------------------

    fn recompute(&mut self) {
        let hash = self.checks_hash.as_deref();
        let filtered = filter_services(&self.services_all, &self.criteria, hash);
        self.services_filtered = sort_services(&filtered, &self.criteria.sort);

        let computed = compute_team_stats(&self.services_all, hash);
        let merged = merge_team_stats(self.teams_registry.as_ref(), &computed);
        self.teams_all = merged.into_values().collect();

        let query = self.team_search.trim().to_lowercase();
        let searched: Vec<TeamRecord> = if query.is_empty() {
            self.teams_all.clone()
        } else {
            self.teams_all
                .iter()
                .filter(|t| {
                    t.name.to_lowercase().contains(&query)
                        || t.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(&query))
                })
                .cloned()
                .collect()
        };
        self.teams_filtered = sort_teams(&searched, &self.team_sort);

        debug!(
            services = self.services_all.len(),
            filtered = self.services_filtered.len(),
            teams = self.teams_filtered.len(),
            "recomputed catalog state"
        );
        self.notify();
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = CatalogSnapshot {
            services_filtered: self.services_filtered.clone(),
            teams_filtered: self.teams_filtered.clone(),
            filter_stats: self.filter_stats(),
        };
        for (_, listener) in &self.listeners {
            listener(&snapshot);
        }
    }
}
