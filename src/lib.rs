// Library exports for the scorecard catalog engine
pub mod adoption;
pub mod config;
pub mod filter;
pub mod registry;
pub mod report;
pub mod sort;
pub mod staleness;
pub mod state;
pub mod stats;
pub mod types;

// Re-export key types for convenience
pub use filter::{
    filter_services, CheckRequirement, FilterCriteria, FilterMode, NO_TEAM_SENTINEL,
};
pub use report::{CatalogReport, ReportFormat};
pub use sort::{sort_services, sort_teams};
pub use staleness::is_stale;
pub use state::{CatalogSnapshot, CatalogState, SubscriptionId};
pub use types::{CheckStatus, Rank, ServiceRecord, TeamRecord};
