//! Sort comparators for services and teams.
//!
//! Sorts are stable and non-mutating: ties keep their prior relative order
//! (filter-stage order in practice) and the input slice is left untouched.

use crate::types::{ServiceRecord, TeamRecord};

/// Recognized service sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    ScoreDesc,
    ScoreAsc,
    NameAsc,
    NameDesc,
    UpdatedDesc,
    UpdatedAsc,
}

impl SortKey {
    /// Parse a sort key. Unrecognized keys return `None`, which callers
    /// treat as identity order.
    pub fn parse(key: &str) -> Option<SortKey> {
        match key {
            "score-desc" => Some(SortKey::ScoreDesc),
            "score-asc" => Some(SortKey::ScoreAsc),
            "name-asc" => Some(SortKey::NameAsc),
            "name-desc" => Some(SortKey::NameDesc),
            "updated-desc" => Some(SortKey::UpdatedDesc),
            "updated-asc" => Some(SortKey::UpdatedAsc),
            _ => None,
        }
    }
}

// Case-insensitive name ordering with the original string as a
// deterministic tiebreak. Stands in for locale-aware comparison.
fn name_key(name: &str) -> (String, String) {
    (name.to_lowercase(), name.to_string())
}

/// Return a new sequence sorted by the given key. An unrecognized key
/// yields a copy in the original order.
pub fn sort_services(services: &[ServiceRecord], sort_key: &str) -> Vec<ServiceRecord> {
    let mut sorted: Vec<ServiceRecord> = services.to_vec();
    let Some(key) = SortKey::parse(sort_key) else {
        return sorted;
    };
    match key {
        SortKey::ScoreDesc => sorted.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::ScoreAsc => sorted.sort_by(|a, b| a.score.cmp(&b.score)),
        SortKey::NameAsc => sorted.sort_by(|a, b| name_key(&a.name).cmp(&name_key(&b.name))),
        SortKey::NameDesc => sorted.sort_by(|a, b| name_key(&b.name).cmp(&name_key(&a.name))),
        SortKey::UpdatedDesc => sorted.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
        SortKey::UpdatedAsc => sorted.sort_by(|a, b| a.last_updated.cmp(&b.last_updated)),
    }
    sorted
}

/// Recognized team sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSortKey {
    ServicesDesc,
    ServicesAsc,
    ScoreDesc,
    ScoreAsc,
    NameAsc,
    NameDesc,
}

impl TeamSortKey {
    /// Parse a team sort key. Unrecognized keys fall back to `score-desc`,
    /// the dashboard's default team ordering.
    pub fn parse_or_default(key: &str) -> TeamSortKey {
        match key {
            "services-desc" => TeamSortKey::ServicesDesc,
            "services-asc" => TeamSortKey::ServicesAsc,
            "score-asc" => TeamSortKey::ScoreAsc,
            "name-asc" => TeamSortKey::NameAsc,
            "name-desc" => TeamSortKey::NameDesc,
            _ => TeamSortKey::ScoreDesc,
        }
    }
}

/// Return a new team sequence sorted by the given key.
pub fn sort_teams(teams: &[TeamRecord], sort_key: &str) -> Vec<TeamRecord> {
    let mut sorted: Vec<TeamRecord> = teams.to_vec();
    match TeamSortKey::parse_or_default(sort_key) {
        TeamSortKey::ServicesDesc => {
            sorted.sort_by(|a, b| b.statistics.service_count.cmp(&a.statistics.service_count))
        }
        TeamSortKey::ServicesAsc => {
            sorted.sort_by(|a, b| a.statistics.service_count.cmp(&b.statistics.service_count))
        }
        TeamSortKey::ScoreDesc => {
            sorted.sort_by(|a, b| b.statistics.average_score.cmp(&a.statistics.average_score))
        }
        TeamSortKey::ScoreAsc => {
            sorted.sort_by(|a, b| a.statistics.average_score.cmp(&b.statistics.average_score))
        }
        TeamSortKey::NameAsc => sorted.sort_by(|a, b| name_key(&a.name).cmp(&name_key(&b.name))),
        TeamSortKey::NameDesc => sorted.sort_by(|a, b| name_key(&b.name).cmp(&name_key(&a.name))),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Rank, TeamStatistics};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;

    fn service(name: &str, score: u32, updated_day: u32) -> ServiceRecord {
        ServiceRecord {
            org: "acme".to_string(),
            repo: name.to_string(),
            name: name.to_string(),
            score,
            rank: Rank::for_score(score),
            team: None,
            check_results: IndexMap::new(),
            excluded_checks: Vec::new(),
            checks_count: 0,
            checks_hash: None,
            last_updated: Utc.with_ymd_and_hms(2025, 6, updated_day, 0, 0, 0).unwrap(),
            default_branch: None,
            has_api: false,
            installed: false,
            installation_pr: None,
            links: Vec::new(),
        }
    }

    fn team(name: &str, service_count: usize, average_score: u32) -> TeamRecord {
        TeamRecord {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: None,
            aliases: Vec::new(),
            github_org: None,
            github_slug: None,
            metadata: IndexMap::new(),
            statistics: TeamStatistics {
                service_count,
                average_score,
                ..Default::default()
            },
        }
    }

    fn names(services: &[ServiceRecord]) -> Vec<&str> {
        services.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_score_desc() {
        let services = vec![service("a", 10, 1), service("b", 90, 2), service("c", 50, 3)];
        let sorted = sort_services(&services, "score-desc");
        let scores: Vec<u32> = sorted.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![90, 50, 10]);
    }

    #[test]
    fn test_score_asc() {
        let services = vec![service("a", 10, 1), service("b", 90, 2), service("c", 50, 3)];
        let sorted = sort_services(&services, "score-asc");
        let scores: Vec<u32> = sorted.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![10, 50, 90]);
    }

    #[test]
    fn test_name_asc_and_desc() {
        let services = vec![service("b", 1, 1), service("a", 2, 2), service("c", 3, 3)];
        assert_eq!(names(&sort_services(&services, "name-asc")), vec!["a", "b", "c"]);
        assert_eq!(names(&sort_services(&services, "name-desc")), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let services = vec![service("Banana", 1, 1), service("apple", 2, 2)];
        assert_eq!(
            names(&sort_services(&services, "name-asc")),
            vec!["apple", "Banana"]
        );
    }

    #[test]
    fn test_updated_order() {
        let services = vec![service("old", 1, 1), service("new", 2, 20), service("mid", 3, 10)];
        assert_eq!(
            names(&sort_services(&services, "updated-desc")),
            vec!["new", "mid", "old"]
        );
        assert_eq!(
            names(&sort_services(&services, "updated-asc")),
            vec!["old", "mid", "new"]
        );
    }

    #[test]
    fn test_unrecognized_key_keeps_order() {
        let services = vec![service("b", 10, 1), service("a", 90, 2)];
        assert_eq!(names(&sort_services(&services, "magic")), vec!["b", "a"]);
        assert_eq!(names(&sort_services(&services, "")), vec!["b", "a"]);
    }

    #[test]
    fn test_stability_on_equal_scores() {
        let services = vec![
            service("first", 50, 1),
            service("second", 50, 2),
            service("third", 50, 3),
        ];
        let sorted = sort_services(&services, "score-desc");
        assert_eq!(names(&sorted), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_sorted_input_is_fixed_point() {
        let services = vec![service("c", 90, 1), service("b", 50, 2), service("a", 10, 3)];
        let once = sort_services(&services, "score-desc");
        let twice = sort_services(&once, "score-desc");
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_input_not_mutated() {
        let services = vec![service("a", 10, 1), service("b", 90, 2)];
        let _ = sort_services(&services, "score-desc");
        assert_eq!(names(&services), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(SortKey::parse("score-desc"), Some(SortKey::ScoreDesc));
        assert_eq!(SortKey::parse("updated-asc"), Some(SortKey::UpdatedAsc));
        assert_eq!(SortKey::parse("score"), None);
    }

    #[test]
    fn test_team_sort_by_services() {
        let teams = vec![team("A", 1, 50), team("B", 3, 40), team("C", 2, 60)];
        let sorted = sort_teams(&teams, "services-desc");
        let order: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_team_sort_default_is_score_desc() {
        let teams = vec![team("A", 1, 50), team("B", 3, 40), team("C", 2, 60)];
        let sorted = sort_teams(&teams, "nonsense");
        let order: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_team_sort_by_name() {
        let teams = vec![team("beta", 1, 50), team("Alpha", 3, 40)];
        let sorted = sort_teams(&teams, "name-asc");
        let order: Vec<&str> = sorted.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "beta"]);
    }
}
