//! Aggregate statistics over the service collection.
//!
//! Team rollups are recomputed wholesale from the current service set on
//! every call; there is no incremental update path, so the aggregates can
//! never drift from the services they describe.

use crate::registry::TeamsDocument;
use crate::staleness::is_stale;
use crate::types::{RankCounts, ServiceRecord, TeamRecord, TeamStatistics};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Count services per rank tier.
pub fn count_by_rank(services: &[ServiceRecord]) -> RankCounts {
    let mut counts = RankCounts::default();
    for service in services {
        counts.increment(service.rank);
    }
    counts
}

/// Arithmetic mean of scores, rounded to the nearest integer. Zero for an
/// empty set.
pub fn average_score(services: &[ServiceRecord]) -> u32 {
    if services.is_empty() {
        return 0;
    }
    let total: u64 = services.iter().map(|s| u64::from(s.score)).sum();
    ((total as f64) / (services.len() as f64)).round() as u32
}

/// Dashboard rollup over a set of services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub total: usize,
    pub average_score: u32,
    pub has_api_count: usize,
    pub stale_count: usize,
    pub installed_count: usize,
    pub ranks: RankCounts,
}

/// Compute the dashboard stat-card numbers for a service set.
pub fn service_stats(services: &[ServiceRecord], checks_hash: Option<&str>) -> ServiceStats {
    ServiceStats {
        total: services.len(),
        average_score: average_score(services),
        has_api_count: services.iter().filter(|s| s.has_api).count(),
        stale_count: services.iter().filter(|s| is_stale(s, checks_hash)).count(),
        installed_count: services.iter().filter(|s| s.installed).count(),
        ranks: count_by_rank(services),
    }
}

/// Stats shown next to an active filter: totals over the full collection
/// plus the size of the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub total: usize,
    pub filtered: usize,
    pub stale: usize,
    pub installed: usize,
    pub has_api: usize,
    pub ranks: RankCounts,
}

/// Compute filter-bar statistics from the full and filtered collections.
pub fn filter_stats(
    all: &[ServiceRecord],
    filtered: &[ServiceRecord],
    checks_hash: Option<&str>,
) -> FilterStats {
    FilterStats {
        total: all.len(),
        filtered: filtered.len(),
        stale: all.iter().filter(|s| is_stale(s, checks_hash)).count(),
        installed: all.iter().filter(|s| s.installed).count(),
        has_api: all.iter().filter(|s| s.has_api).count(),
        ranks: count_by_rank(all),
    }
}

/// Computed aggregates for one team, keyed by team name in
/// [`compute_team_stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedTeamStats {
    pub name: String,
    pub github_org: Option<String>,
    pub github_slug: Option<String>,
    pub statistics: TeamStatistics,
}

/// Group services by primary team and compute per-team aggregates.
///
/// Services without a team are left out of the map; count them with
/// [`services_without_team`]. Teams appear in order of first appearance.
pub fn compute_team_stats(
    services: &[ServiceRecord],
    checks_hash: Option<&str>,
) -> IndexMap<String, ComputedTeamStats> {
    let mut groups: IndexMap<String, Vec<&ServiceRecord>> = IndexMap::new();
    let mut github_info: IndexMap<String, (Option<String>, Option<String>)> = IndexMap::new();

    for service in services {
        let Some(team) = service.team_name() else {
            continue;
        };
        let entry = groups.entry(team.to_string()).or_default();
        if entry.is_empty() {
            if let Some(info) = &service.team {
                github_info.insert(
                    team.to_string(),
                    (info.github_org.clone(), info.github_slug.clone()),
                );
            }
        }
        entry.push(service);
    }

    groups
        .into_iter()
        .map(|(team, members)| {
            let (github_org, github_slug) = github_info
                .get(&team)
                .cloned()
                .unwrap_or((None, None));
            let mut distribution = RankCounts::default();
            for member in &members {
                distribution.increment(member.rank);
            }
            let owned: Vec<ServiceRecord> = members.iter().map(|s| (*s).clone()).collect();
            let stats = ComputedTeamStats {
                name: team.clone(),
                github_org,
                github_slug,
                statistics: TeamStatistics {
                    service_count: members.len(),
                    average_score: average_score(&owned),
                    installed_count: members.iter().filter(|s| s.installed).count(),
                    stale_count: members.iter().filter(|s| is_stale(s, checks_hash)).count(),
                    rank_distribution: distribution,
                },
            };
            (team, stats)
        })
        .collect()
}

/// Unique primary team names, sorted case-insensitively.
pub fn unique_teams(services: &[ServiceRecord]) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    for service in services {
        if let Some(team) = service.team_name() {
            if !teams.iter().any(|t| t == team) {
                teams.push(team.to_string());
            }
        }
    }
    teams.sort_by_key(|t| (t.to_lowercase(), t.clone()));
    teams
}

/// Services belonging to a team, matching the primary name or any alias.
pub fn services_for_team(services: &[ServiceRecord], team_name: &str) -> Vec<ServiceRecord> {
    services
        .iter()
        .filter(|s| s.all_teams().iter().any(|t| *t == team_name))
        .cloned()
        .collect()
}

/// Services with no assigned team.
pub fn services_without_team(services: &[ServiceRecord]) -> Vec<ServiceRecord> {
    services
        .iter()
        .filter(|s| s.team_name().is_none())
        .cloned()
        .collect()
}

/// Merge registry team metadata with computed statistics into the team
/// records held by the state container.
///
/// Registry teams come first (with zeroed statistics when no service
/// references them); teams discovered only in service data get a synthetic
/// id derived from their name.
pub fn merge_team_stats(
    teams_doc: Option<&TeamsDocument>,
    computed: &IndexMap<String, ComputedTeamStats>,
) -> IndexMap<String, TeamRecord> {
    let mut merged: IndexMap<String, TeamRecord> = IndexMap::new();

    if let Some(doc) = teams_doc {
        for (team_id, entry) in &doc.teams {
            let name = entry.name.clone().unwrap_or_else(|| team_id.clone());
            let stats = computed
                .get(&name)
                .map(|c| c.statistics.clone())
                .unwrap_or_default();
            merged.insert(
                team_id.clone(),
                TeamRecord {
                    id: team_id.clone(),
                    name,
                    description: entry.description.clone(),
                    aliases: entry.aliases.clone(),
                    github_org: entry.github_org.clone(),
                    github_slug: entry.github_slug.clone(),
                    metadata: entry.metadata.clone(),
                    statistics: stats,
                },
            );
        }
    }

    for (name, stats) in computed {
        let team_id = name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
        if merged.contains_key(&team_id) || merged.values().any(|t| &t.name == name) {
            continue;
        }
        merged.insert(
            team_id.clone(),
            TeamRecord {
                id: team_id,
                name: name.clone(),
                description: None,
                aliases: Vec::new(),
                github_org: stats.github_org.clone(),
                github_slug: stats.github_slug.clone(),
                metadata: IndexMap::new(),
                statistics: stats.statistics.clone(),
            },
        );
    }

    merged
}

/// Teams-view rollup: dominant ranks use the average-score thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamViewStats {
    pub total_teams: usize,
    pub average_score: u32,
    pub total_services: usize,
    pub no_team_count: usize,
    pub ranks: RankCounts,
}

/// Compute the teams-view stat cards.
pub fn team_view_stats(teams: &[TeamRecord], services: &[ServiceRecord]) -> TeamViewStats {
    let average = if teams.is_empty() {
        0
    } else {
        let total: u64 = teams
            .iter()
            .map(|t| u64::from(t.statistics.average_score))
            .sum();
        ((total as f64) / (teams.len() as f64)).round() as u32
    };

    let mut ranks = RankCounts::default();
    for team in teams {
        ranks.increment(team.dominant_rank());
    }

    TeamViewStats {
        total_teams: teams.len(),
        average_score: average,
        total_services: services.len(),
        no_team_count: services.iter().filter(|s| s.team_name().is_none()).count(),
        ranks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TeamRegistryEntry;
    use crate::types::{Rank, TeamInfo};
    use chrono::Utc;

    fn service(name: &str, score: u32, rank: Rank) -> ServiceRecord {
        ServiceRecord {
            org: "acme".to_string(),
            repo: name.to_string(),
            name: name.to_string(),
            score,
            rank,
            team: None,
            check_results: IndexMap::new(),
            excluded_checks: Vec::new(),
            checks_count: 0,
            checks_hash: Some("current".to_string()),
            last_updated: Utc::now(),
            default_branch: None,
            has_api: false,
            installed: false,
            installation_pr: None,
            links: Vec::new(),
        }
    }

    fn with_team(mut svc: ServiceRecord, team: &str) -> ServiceRecord {
        svc.team = Some(TeamInfo {
            primary: team.to_string(),
            ..Default::default()
        });
        svc
    }

    #[test]
    fn test_count_by_rank() {
        let services = vec![
            service("a", 95, Rank::Platinum),
            service("b", 80, Rank::Gold),
            service("c", 78, Rank::Gold),
            service("d", 20, Rank::Bronze),
        ];
        let counts = count_by_rank(&services);
        assert_eq!(counts.platinum, 1);
        assert_eq!(counts.gold, 2);
        assert_eq!(counts.silver, 0);
        assert_eq!(counts.bronze, 1);
    }

    #[test]
    fn test_average_score_rounds() {
        let services = vec![service("a", 80, Rank::Gold), service("b", 61, Rank::Silver)];
        // 70.5 rounds to 71
        assert_eq!(average_score(&services), 71);
        assert_eq!(average_score(&[]), 0);
    }

    #[test]
    fn test_service_stats() {
        let mut a = service("a", 90, Rank::Platinum);
        a.has_api = true;
        a.installed = true;
        let mut b = service("b", 50, Rank::Silver);
        b.checks_hash = Some("old".to_string());
        let stats = service_stats(&[a, b], Some("current"));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.average_score, 70);
        assert_eq!(stats.has_api_count, 1);
        assert_eq!(stats.installed_count, 1);
        assert_eq!(stats.stale_count, 1);
        assert_eq!(stats.ranks.platinum, 1);
    }

    #[test]
    fn test_filter_stats_counts_both_views() {
        let all = vec![
            service("a", 90, Rank::Platinum),
            service("b", 50, Rank::Silver),
        ];
        let filtered = vec![all[0].clone()];
        let stats = filter_stats(&all, &filtered, None);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.stale, 0);
    }

    #[test]
    fn test_compute_team_stats_aggregates() {
        let mut gold = with_team(service("a", 80, Rank::Gold), "X");
        gold.installed = true;
        let silver = with_team(service("b", 60, Rank::Silver), "X");
        let services = vec![gold, silver, service("c", 10, Rank::Bronze)];

        let stats = compute_team_stats(&services, Some("current"));
        assert_eq!(stats.len(), 1);
        let x = &stats["X"].statistics;
        assert_eq!(x.service_count, 2);
        assert_eq!(x.average_score, 70);
        assert_eq!(x.installed_count, 1);
        assert_eq!(x.stale_count, 0);
        assert_eq!(x.rank_distribution.gold, 1);
        assert_eq!(x.rank_distribution.silver, 1);
        assert_eq!(x.rank_distribution.platinum, 0);
        assert_eq!(x.rank_distribution.bronze, 0);
    }

    #[test]
    fn test_compute_team_stats_carries_github_info() {
        let mut svc = service("a", 80, Rank::Gold);
        svc.team = Some(TeamInfo {
            primary: "X".to_string(),
            github_org: Some("acme".to_string()),
            github_slug: Some("team-x".to_string()),
            ..Default::default()
        });
        let stats = compute_team_stats(&[svc], None);
        assert_eq!(stats["X"].github_org.as_deref(), Some("acme"));
        assert_eq!(stats["X"].github_slug.as_deref(), Some("team-x"));
    }

    #[test]
    fn test_compute_team_stats_counts_stale_members() {
        let mut stale = with_team(service("a", 80, Rank::Gold), "X");
        stale.checks_hash = None;
        let fresh = with_team(service("b", 60, Rank::Silver), "X");
        let stats = compute_team_stats(&[stale, fresh], Some("current"));
        assert_eq!(stats["X"].statistics.stale_count, 1);
    }

    #[test]
    fn test_unique_teams_sorted() {
        let services = vec![
            with_team(service("a", 80, Rank::Gold), "zeta"),
            with_team(service("b", 60, Rank::Silver), "Alpha"),
            with_team(service("c", 60, Rank::Silver), "zeta"),
        ];
        assert_eq!(unique_teams(&services), vec!["Alpha", "zeta"]);
    }

    #[test]
    fn test_services_for_team_matches_aliases() {
        let mut svc = service("a", 80, Rank::Gold);
        svc.team = Some(TeamInfo {
            primary: "Core".to_string(),
            all: vec!["Core".to_string(), "Platform".to_string()],
            ..Default::default()
        });
        let services = vec![svc, with_team(service("b", 60, Rank::Silver), "Other")];
        assert_eq!(services_for_team(&services, "Platform").len(), 1);
        assert_eq!(services_for_team(&services, "Core").len(), 1);
        assert_eq!(services_for_team(&services, "Missing").len(), 0);
    }

    #[test]
    fn test_services_without_team() {
        let services = vec![
            with_team(service("a", 80, Rank::Gold), "X"),
            service("b", 60, Rank::Silver),
        ];
        let orphans = services_without_team(&services);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name, "b");
    }

    #[test]
    fn test_merge_team_stats_registry_first() {
        let mut doc = TeamsDocument::default();
        doc.teams.insert(
            "core".to_string(),
            TeamRegistryEntry {
                name: Some("Core".to_string()),
                description: Some("Core platform".to_string()),
                ..Default::default()
            },
        );

        let services = vec![
            with_team(service("a", 80, Rank::Gold), "Core"),
            with_team(service("b", 90, Rank::Platinum), "Data Infra"),
        ];
        let computed = compute_team_stats(&services, None);
        let merged = merge_team_stats(Some(&doc), &computed);

        assert_eq!(merged.len(), 2);
        let core = &merged["core"];
        assert_eq!(core.name, "Core");
        assert_eq!(core.description.as_deref(), Some("Core platform"));
        assert_eq!(core.statistics.service_count, 1);

        // Team only present in service data gets a synthetic id.
        let data = &merged["data-infra"];
        assert_eq!(data.name, "Data Infra");
        assert_eq!(data.statistics.service_count, 1);
    }

    #[test]
    fn test_merge_team_stats_zero_stats_for_unreferenced_team() {
        let mut doc = TeamsDocument::default();
        doc.teams.insert(
            "ghost".to_string(),
            TeamRegistryEntry {
                name: Some("Ghost".to_string()),
                ..Default::default()
            },
        );
        let merged = merge_team_stats(Some(&doc), &IndexMap::new());
        assert_eq!(merged["ghost"].statistics.service_count, 0);
        assert_eq!(merged["ghost"].statistics.average_score, 0);
    }

    #[test]
    fn test_merge_team_stats_without_registry() {
        let services = vec![with_team(service("a", 80, Rank::Gold), "Solo Team")];
        let computed = compute_team_stats(&services, None);
        let merged = merge_team_stats(None, &computed);
        assert_eq!(merged.len(), 1);
        assert!(merged.contains_key("solo-team"));
    }

    #[test]
    fn test_team_view_stats_dominant_rank_by_average() {
        let services = vec![
            with_team(service("a", 92, Rank::Platinum), "High"),
            with_team(service("b", 40, Rank::Bronze), "Low"),
            service("c", 10, Rank::Bronze),
        ];
        let computed = compute_team_stats(&services, None);
        let merged = merge_team_stats(None, &computed);
        let teams: Vec<TeamRecord> = merged.values().cloned().collect();
        let view = team_view_stats(&teams, &services);
        assert_eq!(view.total_teams, 2);
        assert_eq!(view.no_team_count, 1);
        assert_eq!(view.ranks.platinum, 1);
        assert_eq!(view.ranks.bronze, 1);
        assert_eq!(view.average_score, 66);
    }
}
