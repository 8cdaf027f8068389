use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use scorecard_catalog::adoption::{adoption_by_team, check_adoption};
use scorecard_catalog::config::{CatalogConfig, CONFIG_FILE_NAME};
use scorecard_catalog::filter::{CheckRequirement, FilterMode};
use scorecard_catalog::registry::{
    load_checks, load_current_checks, load_registry, load_teams, ChecksDocument,
};
use scorecard_catalog::report::{CatalogReport, ReportFormat};
use scorecard_catalog::staleness::staleness_stats;
use scorecard_catalog::state::CatalogState;
use scorecard_catalog::stats::{service_stats, team_view_stats};
use scorecard_catalog::types::Rank;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scorecard-catalog")]
#[command(version, about = "Filter, sort, and summarize scorecard registry snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./catalog.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service registry document, overriding the configured path
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List services, optionally filtered and sorted
    List {
        /// Named filter as name=include or name=exclude. Names: has-api,
        /// stale, installed, platinum, gold, silver, bronze. Repeatable.
        #[arg(short, long = "filter", value_name = "NAME=MODE")]
        filters: Vec<String>,

        /// Per-check filter as check-id=pass or check-id=fail. Repeatable.
        #[arg(long = "check-filter", value_name = "CHECK=REQ")]
        check_filters: Vec<String>,

        /// Comma-separated team names; use __no_team__ for unowned services
        #[arg(short, long)]
        team: Option<String>,

        /// Case-insensitive substring search over name, org, repo, and team
        #[arg(short, long)]
        search: Option<String>,

        /// Sort key: score-desc, score-asc, name-asc, name-desc,
        /// updated-desc, updated-asc
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show dashboard statistics for the whole catalog
    Stats,

    /// List team aggregates
    Teams {
        /// Sort key: score-desc, score-asc, services-desc, services-asc,
        /// name-asc, name-desc
        #[arg(long)]
        sort: Option<String>,

        /// Substring search over team name and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show adoption of a single check
    Adoption {
        /// Check identifier
        check_id: String,

        /// Break the numbers down by team
        #[arg(long)]
        by_team: bool,
    },

    /// Generate a catalog report
    Report {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default catalog.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(cli_config: Option<&Path>) -> anyhow::Result<CatalogConfig> {
    match cli_config {
        Some(path) => CatalogConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => CatalogConfig::load_or_default(Path::new(".")),
    }
}

/// Load the registry documents named by the config into a fresh state
/// container. Returns the check definitions alongside for commands that
/// need them.
fn load_state(config: &CatalogConfig) -> anyhow::Result<(CatalogState, Option<ChecksDocument>)> {
    let registry = load_registry(&config.registry.services)?;
    let teams = load_teams(&config.registry.teams)?;
    let checks = load_checks(&config.registry.checks)?;
    let current = load_current_checks(&config.registry.current_checks)?;

    // Prefer the dedicated current-checks document; the registry snapshot
    // carries the hash it was generated with as a fallback.
    let current_hash = current
        .map(|c| c.checks_hash)
        .or(registry.checks_hash.clone());

    let mut state = CatalogState::new();
    state.set_sort(config.display.service_sort.clone());
    state.set_team_sort(config.display.team_sort.clone());
    state.set_checks_hash(current_hash);
    state.set_teams_registry(teams);
    state.set_services(registry.services);

    info!(
        services = state.services().len(),
        teams = state.teams().len(),
        "catalog loaded"
    );
    Ok((state, checks))
}

fn parse_filter_arg(arg: &str) -> anyhow::Result<(String, FilterMode)> {
    let Some((name, mode)) = arg.split_once('=') else {
        bail!("expected NAME=MODE, got '{arg}'");
    };
    let mode = match mode {
        "include" => FilterMode::Include,
        "exclude" => FilterMode::Exclude,
        other => bail!("filter mode must be include or exclude, got '{other}'"),
    };
    Ok((name.to_string(), mode))
}

fn parse_check_filter_arg(arg: &str) -> anyhow::Result<(String, CheckRequirement)> {
    let Some((check, req)) = arg.split_once('=') else {
        bail!("expected CHECK=REQ, got '{arg}'");
    };
    let requirement = match req {
        "pass" => CheckRequirement::Pass,
        "fail" => CheckRequirement::Fail,
        other => bail!("check requirement must be pass or fail, got '{other}'"),
    };
    Ok((check.to_string(), requirement))
}

fn rank_colored(rank: Rank) -> colored::ColoredString {
    match rank {
        Rank::Platinum => rank.to_string().cyan(),
        Rank::Gold => rank.to_string().yellow(),
        Rank::Silver => rank.to_string().normal(),
        Rank::Bronze => rank.to_string().red(),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_list(
    config: &CatalogConfig,
    filters: &[String],
    check_filters: &[String],
    team: Option<String>,
    search: Option<String>,
    sort: Option<String>,
) -> anyhow::Result<()> {
    let (mut state, _) = load_state(config)?;

    for arg in filters {
        let (name, mode) = parse_filter_arg(arg)?;
        state.set_filter(&name, Some(mode));
    }
    for arg in check_filters {
        let (check, requirement) = parse_check_filter_arg(arg)?;
        state.set_check_filter(&check, Some(requirement));
    }
    if team.is_some() {
        state.set_team_filter(team);
    }
    if let Some(search) = search {
        state.set_search(search);
    }
    if let Some(sort) = sort {
        state.set_sort(sort);
    }

    let stats = state.filter_stats();
    println!(
        "{} of {} services",
        stats.filtered.to_string().bold(),
        stats.total
    );
    println!();

    for service in state.filtered_services() {
        let team = service.team_name().unwrap_or("-");
        let stale = if scorecard_catalog::is_stale(service, state.checks_hash()) {
            " (stale)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:>3}  {:<10} {:<32} {:<20} {}/{}{}",
            service.score,
            rank_colored(service.rank),
            service.name,
            team,
            service.org,
            service.repo,
            stale,
        );
    }
    Ok(())
}

fn cmd_stats(config: &CatalogConfig) -> anyhow::Result<()> {
    let (state, _) = load_state(config)?;
    let hash = state.checks_hash();
    let services = service_stats(state.services(), hash);
    let staleness = staleness_stats(state.services(), hash);
    let teams = team_view_stats(state.teams(), state.services());

    println!("{}", "Services".bold());
    println!("  Total:      {}", services.total);
    println!("  Avg score:  {}", services.average_score);
    println!("  Installed:  {}", services.installed_count);
    println!("  With API:   {}", services.has_api_count);
    println!(
        "  Stale:      {} ({}%)",
        staleness.stale, staleness.percentage
    );
    println!(
        "  Ranks:      {} platinum, {} gold, {} silver, {} bronze",
        services.ranks.platinum.to_string().cyan(),
        services.ranks.gold.to_string().yellow(),
        services.ranks.silver,
        services.ranks.bronze.to_string().red(),
    );
    println!();
    println!("{}", "Teams".bold());
    println!("  Total:      {}", teams.total_teams);
    println!("  Avg score:  {}", teams.average_score);
    println!("  No team:    {} services", teams.no_team_count);
    Ok(())
}

fn cmd_teams(
    config: &CatalogConfig,
    sort: Option<String>,
    search: Option<String>,
) -> anyhow::Result<()> {
    let (mut state, _) = load_state(config)?;
    if let Some(sort) = sort {
        state.set_team_sort(sort);
    }
    if let Some(search) = search {
        state.set_team_search(search);
    }

    for team in state.filtered_teams() {
        println!(
            "  {:<24} services: {:<4} avg: {:<4} rank: {:<10} stale: {}",
            team.name.clone().bold(),
            team.statistics.service_count,
            team.statistics.average_score,
            rank_colored(team.dominant_rank()),
            team.statistics.stale_count,
        );
    }
    Ok(())
}

fn cmd_adoption(config: &CatalogConfig, check_id: &str, by_team: bool) -> anyhow::Result<()> {
    let (state, _) = load_state(config)?;

    let overall = check_adoption(state.services(), check_id);
    println!(
        "{}: {}% adoption ({} pass / {} fail / {} excluded, {} total)",
        check_id.bold(),
        overall.percentage,
        overall.passing,
        overall.failing,
        overall.excluded,
        overall.total,
    );

    if by_team {
        println!();
        for (team, adoption) in adoption_by_team(state.services(), check_id) {
            println!(
                "  {:<24} {:>3}%  ({} pass / {} fail / {} excluded)",
                team, adoption.percentage, adoption.passing, adoption.failing, adoption.excluded,
            );
        }
    }
    Ok(())
}

fn cmd_report(
    config: &CatalogConfig,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let (state, checks) = load_state(config)?;
    let checks = checks.map(|doc| doc.checks);
    let report = CatalogReport::from_state(&state, checks.as_deref());
    let rendered = report.render(format)?;

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display().to_string().green());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", CONFIG_FILE_NAME);
    }
    CatalogConfig::default().save(&path)?;
    println!("Wrote {}", CONFIG_FILE_NAME.green());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter_layer = if cli.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("info")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("scorecard-catalog v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(registry) = cli.registry {
        config.registry.services = registry;
    }

    match cli.command {
        Commands::List {
            filters,
            check_filters,
            team,
            search,
            sort,
        } => cmd_list(&config, &filters, &check_filters, team, search, sort)?,
        Commands::Stats => cmd_stats(&config)?,
        Commands::Teams { sort, search } => cmd_teams(&config, sort, search)?,
        Commands::Adoption { check_id, by_team } => cmd_adoption(&config, &check_id, by_team)?,
        Commands::Report { format, output } => cmd_report(&config, format, output)?,
        Commands::Init { force } => cmd_init(force)?,
    }

    Ok(())
}
