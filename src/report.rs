//! Catalog report generation.
//!
//! Renders a snapshot of the catalog (service stats, team aggregates, and
//! optionally check adoption) as text, JSON, or Markdown.

use crate::adoption::{adoption_for_checks, CheckAdoptionEntry};
use crate::staleness::{staleness_stats, StalenessStats};
use crate::state::CatalogState;
use crate::stats::{service_stats, ServiceStats};
use crate::types::{CheckMetadata, Rank, TeamRecord};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write as FmtWrite;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

/// A rendered view over the current catalog state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub services: ServiceStats,
    pub staleness: StalenessStats,
    pub teams: Vec<TeamRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adoption: Option<Vec<CheckAdoptionEntry>>,
}

impl CatalogReport {
    /// Build a report from the current state. When check definitions are
    /// supplied, a per-check adoption section is included.
    pub fn from_state(state: &CatalogState, checks: Option<&[CheckMetadata]>) -> Self {
        let hash = state.checks_hash();
        Self {
            generated_at: chrono::Utc::now(),
            services: service_stats(state.services(), hash),
            staleness: staleness_stats(state.services(), hash),
            teams: state.filtered_teams().to_vec(),
            adoption: checks.map(|defs| adoption_for_checks(state.services(), defs)),
        }
    }

    /// Render the report in the requested format.
    pub fn render(&self, format: ReportFormat) -> anyhow::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Markdown => Ok(self.to_markdown()),
        }
    }

    /// Plain-terminal rendering with colored rank counts.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "Catalog Report".bold());
        let _ = writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out);

        let s = &self.services;
        let _ = writeln!(out, "{}", "Services".bold());
        let _ = writeln!(out, "  Total:      {}", s.total);
        let _ = writeln!(out, "  Avg score:  {}", s.average_score);
        let _ = writeln!(out, "  Installed:  {}", s.installed_count);
        let _ = writeln!(out, "  With API:   {}", s.has_api_count);
        let _ = writeln!(
            out,
            "  Stale:      {} ({}%)",
            self.staleness.stale, self.staleness.percentage
        );
        let _ = writeln!(
            out,
            "  Ranks:      {} platinum, {} gold, {} silver, {} bronze",
            s.ranks.platinum.to_string().cyan(),
            s.ranks.gold.to_string().yellow(),
            s.ranks.silver.to_string().white(),
            s.ranks.bronze.to_string().red(),
        );

        if !self.teams.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Teams".bold());
            for team in &self.teams {
                let _ = writeln!(
                    out,
                    "  {:<24} services: {:<4} avg: {:<4} rank: {}",
                    team.name,
                    team.statistics.service_count,
                    team.statistics.average_score,
                    rank_label(team.dominant_rank()),
                );
            }
        }

        if let Some(adoption) = &self.adoption {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", "Check adoption".bold());
            for entry in adoption {
                let _ = writeln!(
                    out,
                    "  {:<28} {:>3}%  ({} pass / {} fail / {} excluded)",
                    entry.check_id,
                    entry.adoption.percentage,
                    entry.adoption.passing,
                    entry.adoption.failing,
                    entry.adoption.excluded,
                );
            }
        }

        out
    }

    /// Markdown rendering for dashboards and PR comments.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Catalog Report");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "## Services");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Metric | Value |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(out, "| Total | {} |", self.services.total);
        let _ = writeln!(out, "| Average score | {} |", self.services.average_score);
        let _ = writeln!(out, "| Installed | {} |", self.services.installed_count);
        let _ = writeln!(out, "| With API | {} |", self.services.has_api_count);
        let _ = writeln!(
            out,
            "| Stale | {} ({}%) |",
            self.staleness.stale, self.staleness.percentage
        );
        let _ = writeln!(out, "| Platinum | {} |", self.services.ranks.platinum);
        let _ = writeln!(out, "| Gold | {} |", self.services.ranks.gold);
        let _ = writeln!(out, "| Silver | {} |", self.services.ranks.silver);
        let _ = writeln!(out, "| Bronze | {} |", self.services.ranks.bronze);

        if !self.teams.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Teams");
            let _ = writeln!(out);
            let _ = writeln!(out, "| Team | Services | Avg score | Rank | Stale |");
            let _ = writeln!(out, "|---|---|---|---|---|");
            for team in &self.teams {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    team.name,
                    team.statistics.service_count,
                    team.statistics.average_score,
                    team.dominant_rank(),
                    team.statistics.stale_count,
                );
            }
        }

        if let Some(adoption) = &self.adoption {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Check adoption");
            let _ = writeln!(out);
            let _ = writeln!(out, "| Check | Adoption | Passing | Failing | Excluded |");
            let _ = writeln!(out, "|---|---|---|---|---|");
            for entry in adoption {
                let _ = writeln!(
                    out,
                    "| {} | {}% | {} | {} | {} |",
                    entry.check_id,
                    entry.adoption.percentage,
                    entry.adoption.passing,
                    entry.adoption.failing,
                    entry.adoption.excluded,
                );
            }
        }

        out
    }
}

fn rank_label(rank: Rank) -> String {
    match rank {
        Rank::Platinum => rank.to_string().cyan().to_string(),
        Rank::Gold => rank.to_string().yellow().to_string(),
        Rank::Silver => rank.to_string().white().to_string(),
        Rank::Bronze => rank.to_string().red().to_string(),
    }
}
