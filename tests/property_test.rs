//! Property-based tests for the filter, sort, and adoption pipelines.

use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use proptest::prelude::*;
use scorecard_catalog::adoption::check_adoption;
use scorecard_catalog::filter::{
    cycle_filter_mode, filter_services, FilterCriteria, FilterMode,
};
use scorecard_catalog::sort::sort_services;
use scorecard_catalog::staleness::staleness_stats;
use scorecard_catalog::types::{CheckStatus, Rank, ServiceRecord, TeamInfo};

fn check_status_strategy() -> impl Strategy<Value = CheckStatus> {
    prop_oneof![
        Just(CheckStatus::Pass),
        Just(CheckStatus::Fail),
        Just(CheckStatus::Excluded),
        Just(CheckStatus::Error),
        Just(CheckStatus::Skipped),
    ]
}

fn service_strategy() -> impl Strategy<Value = ServiceRecord> {
    (
        "[a-z]{1,12}",
        0u32..=100,
        proptest::option::of("[A-Za-z ]{1,10}"),
        proptest::option::of("[a-f0-9]{8}"),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::btree_map("[a-z-]{1,8}", check_status_strategy(), 0..4),
        0i64..2_000_000_000,
    )
        .prop_map(
            |(name, score, team, hash, has_api, installed, checks, epoch)| ServiceRecord {
                org: "acme".to_string(),
                repo: name.clone(),
                name: name.clone(),
                score,
                rank: Rank::for_score(score),
                team: team.map(|t| TeamInfo {
                    primary: t,
                    ..Default::default()
                }),
                check_results: checks.into_iter().collect::<IndexMap<_, _>>(),
                excluded_checks: Vec::new(),
                checks_count: 0,
                checks_hash: hash,
                last_updated: Utc.timestamp_opt(epoch, 0).single().unwrap_or_default(),
                default_branch: None,
                has_api,
                installed,
                installation_pr: None,
                links: Vec::new(),
            },
        )
}

fn services_strategy() -> impl Strategy<Value = Vec<ServiceRecord>> {
    proptest::collection::vec(service_strategy(), 0..20)
}

fn filter_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("has-api".to_string()),
        Just("stale".to_string()),
        Just("installed".to_string()),
        Just("platinum".to_string()),
        Just("gold".to_string()),
        Just("silver".to_string()),
        Just("bronze".to_string()),
        "[a-z]{3,10}",
    ]
}

proptest! {
    /// PROPERTY: Default criteria never drop or reorder anything
    #[test]
    fn prop_default_criteria_is_identity(services in services_strategy()) {
        let out = filter_services(&services, &FilterCriteria::default(), Some("current"));
        let before: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        let after: Vec<&str> = out.iter().map(|s| s.name.as_str()).collect();
        prop_assert_eq!(before, after);
    }

    /// PROPERTY: Filtering yields an order-preserving subset of the input
    #[test]
    fn prop_filter_output_is_ordered_subset(
        services in services_strategy(),
        name in filter_name_strategy(),
        include in any::<bool>(),
    ) {
        let mut criteria = FilterCriteria::new();
        let mode = if include { FilterMode::Include } else { FilterMode::Exclude };
        criteria.set_filter(&name, Some(mode));
        let out = filter_services(&services, &criteria, Some("current"));

        prop_assert!(out.len() <= services.len());
        let mut cursor = 0;
        for kept in &out {
            let pos = services[cursor..]
                .iter()
                .position(|s| s.name == kept.name && s.score == kept.score);
            prop_assert!(pos.is_some(), "output not a subsequence of input");
            cursor += pos.unwrap_or(0) + 1;
        }
    }

    /// PROPERTY: Cycling a filter mode three times returns to unset
    #[test]
    fn prop_filter_mode_cycle_period_three(include in any::<bool>()) {
        let start = if include { Some(FilterMode::Include) } else { None };
        let cycled = cycle_filter_mode(cycle_filter_mode(cycle_filter_mode(start)));
        prop_assert_eq!(cycled, start);
    }

    /// PROPERTY: Sorting permutes without adding or dropping records
    #[test]
    fn prop_sort_preserves_multiset(
        services in services_strategy(),
        key in prop_oneof![
            Just("score-desc"), Just("score-asc"),
            Just("name-asc"), Just("name-desc"),
            Just("updated-desc"), Just("updated-asc"),
            Just("bogus-key"),
        ],
    ) {
        let out = sort_services(&services, key);
        prop_assert_eq!(out.len(), services.len());
        let mut before: Vec<String> = services.iter().map(|s| s.name.clone()).collect();
        let mut after: Vec<String> = out.iter().map(|s| s.name.clone()).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }

    /// PROPERTY: An unrecognized sort key leaves the order untouched
    #[test]
    fn prop_unknown_sort_key_is_identity(services in services_strategy()) {
        let out = sort_services(&services, "definitely-not-a-key");
        let before: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        let after: Vec<&str> = out.iter().map(|s| s.name.as_str()).collect();
        prop_assert_eq!(before, after);
    }

    /// PROPERTY: Score sorting actually orders the scores
    #[test]
    fn prop_score_desc_is_sorted(services in services_strategy()) {
        let out = sort_services(&services, "score-desc");
        for pair in out.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    /// PROPERTY: Adoption buckets partition the service set
    #[test]
    fn prop_adoption_buckets_partition(
        services in services_strategy(),
        check_id in "[a-z-]{1,8}",
    ) {
        let adoption = check_adoption(&services, &check_id);
        prop_assert_eq!(
            adoption.passing + adoption.failing + adoption.excluded,
            adoption.total
        );
        prop_assert_eq!(adoption.total, services.len());
        prop_assert!(adoption.percentage <= 100);
    }

    /// PROPERTY: Staleness is total and the rollup counts add up
    #[test]
    fn prop_staleness_stats_add_up(
        services in services_strategy(),
        hash in proptest::option::of("[a-f0-9]{8}"),
    ) {
        let stats = staleness_stats(&services, hash.as_deref());
        prop_assert_eq!(stats.stale + stats.up_to_date, stats.total);
        prop_assert!(stats.percentage <= 100);
        if hash.is_none() {
            prop_assert_eq!(stats.stale, 0);
        }
    }

    /// PROPERTY: Rank thresholds match the score boundaries
    #[test]
    fn prop_rank_for_score_thresholds(score in 0u32..=200) {
        let rank = Rank::for_score(score);
        let expected = if score >= 90 {
            Rank::Platinum
        } else if score >= 75 {
            Rank::Gold
        } else if score >= 50 {
            Rank::Silver
        } else {
            Rank::Bronze
        };
        prop_assert_eq!(rank, expected);
    }
}
