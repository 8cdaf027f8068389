//! Core data model for the scorecard catalog.
//!
//! Records mirror the JSON registry documents produced by the scorecard
//! pipeline. The engine never mutates a record; every transformation
//! returns new collections.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rank tier, a discretization of the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Platinum,
    Gold,
    Silver,
    Bronze,
}

impl Rank {
    /// All ranks, highest tier first.
    pub const ALL: [Rank; 4] = [Rank::Platinum, Rank::Gold, Rank::Silver, Rank::Bronze];

    /// Derive the rank for a score using the fixed thresholds
    /// (platinum >= 90, gold >= 75, silver >= 50, bronze otherwise).
    ///
    /// Service records carry their rank precomputed upstream; this is only
    /// used to derive a team's dominant rank from its average score.
    pub fn for_score(score: u32) -> Rank {
        if score >= 90 {
            Rank::Platinum
        } else if score >= 75 {
            Rank::Gold
        } else if score >= 50 {
            Rank::Silver
        } else {
            Rank::Bronze
        }
    }

    /// Lowercase name as used in filter keys and registry JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Platinum => "platinum",
            Rank::Gold => "gold",
            Rank::Silver => "silver",
            Rank::Bronze => "bronze",
        }
    }

    /// Parse a lowercase rank name.
    pub fn parse(name: &str) -> Option<Rank> {
        match name {
            "platinum" => Some(Rank::Platinum),
            "gold" => Some(Rank::Gold),
            "silver" => Some(Rank::Silver),
            "bronze" => Some(Rank::Bronze),
            _ => None,
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single check run against a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Excluded,
    Error,
    Skipped,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Excluded => "excluded",
            CheckStatus::Error => "error",
            CheckStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Team association discovered for a service. A service has at most one
/// primary team plus aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub primary: String,
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub last_discovered: Option<String>,
    #[serde(default)]
    pub github_org: Option<String>,
    #[serde(default)]
    pub github_slug: Option<String>,
}

/// A check explicitly excluded from scoring for a service, with the reason
/// recorded in the service's scorecard config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedCheck {
    pub check: String,
    #[serde(default)]
    pub reason: String,
}

/// Pending installation pull request for a not-yet-installed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationPr {
    pub number: u64,
    pub url: String,
    pub state: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Display link attached to a service (dashboards, runbooks, ...). Opaque
/// payload for the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// One scored repository in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub org: String,
    pub repo: String,
    pub name: String,
    pub score: u32,
    pub rank: Rank,
    #[serde(default)]
    pub team: Option<TeamInfo>,
    #[serde(default)]
    pub check_results: IndexMap<String, CheckStatus>,
    #[serde(default)]
    pub excluded_checks: Vec<ExcludedCheck>,
    #[serde(default)]
    pub checks_count: u32,
    /// Content hash of the check-definition set used to produce the score.
    /// Absent on legacy records scored before hashes were recorded.
    #[serde(default)]
    pub checks_hash: Option<String>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub has_api: bool,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub installation_pr: Option<InstallationPr>,
    #[serde(default)]
    pub links: Vec<ServiceLink>,
}

impl ServiceRecord {
    /// Primary team name, if any.
    pub fn team_name(&self) -> Option<&str> {
        self.team
            .as_ref()
            .map(|t| t.primary.as_str())
            .filter(|p| !p.is_empty())
    }

    /// All team names (primary plus aliases).
    pub fn all_teams(&self) -> Vec<&str> {
        match &self.team {
            None => Vec::new(),
            Some(info) => {
                if !info.all.is_empty() {
                    info.all.iter().map(String::as_str).collect()
                } else if !info.primary.is_empty() {
                    vec![info.primary.as_str()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Recorded status for a check id, if any.
    pub fn check_status(&self, check_id: &str) -> Option<CheckStatus> {
        self.check_results.get(check_id).copied()
    }

    /// Lowercased "name org repo team" string used by the search stage.
    pub fn search_haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.org,
            self.repo,
            self.team_name().unwrap_or("")
        )
        .to_lowercase()
    }
}

/// Count of services per rank tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCounts {
    pub platinum: usize,
    pub gold: usize,
    pub silver: usize,
    pub bronze: usize,
}

impl RankCounts {
    pub fn get(&self, rank: Rank) -> usize {
        match rank {
            Rank::Platinum => self.platinum,
            Rank::Gold => self.gold,
            Rank::Silver => self.silver,
            Rank::Bronze => self.bronze,
        }
    }

    pub fn increment(&mut self, rank: Rank) {
        match rank {
            Rank::Platinum => self.platinum += 1,
            Rank::Gold => self.gold += 1,
            Rank::Silver => self.silver += 1,
            Rank::Bronze => self.bronze += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.platinum + self.gold + self.silver + self.bronze
    }
}

/// Aggregates derived from the services belonging to one team. Recomputed
/// wholesale whenever the service collection changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub service_count: usize,
    pub average_score: u32,
    pub installed_count: usize,
    pub stale_count: usize,
    pub rank_distribution: RankCounts,
}

/// One team in the catalog, merged from the teams registry and computed
/// service statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub github_org: Option<String>,
    #[serde(default)]
    pub github_slug: Option<String>,
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub statistics: TeamStatistics,
}

impl TeamRecord {
    /// Dominant rank for the team, derived from its average score.
    pub fn dominant_rank(&self) -> Rank {
        Rank::for_score(self.statistics.average_score)
    }
}

/// Metadata describing a check definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_check_weight")]
    pub weight: u32,
    #[serde(default)]
    pub run_order: Option<u32>,
}

fn default_check_weight() -> u32 {
    1
}
