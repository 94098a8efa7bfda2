//! SCD Type 2 status history tests.

use std::collections::HashMap;
use synthbank_core::{
    config::GeneratorConfig,
    engine::GenerationEngine,
    lifecycle::{CustomerStatus, EventType},
};

fn run(seed: u64) -> (Vec<synthbank_core::lifecycle::LifecycleEvent>, Vec<CustomerStatus>) {
    let engine = GenerationEngine::new(GeneratorConfig::default_test(), seed);
    let data = engine.run().unwrap();
    (data.events, data.statuses)
}

#[test]
fn every_customer_has_exactly_one_current_row() {
    let (_, statuses) = run(42);
    let mut current_counts: HashMap<&str, usize> = HashMap::new();
    for status in &statuses {
        if status.is_current {
            *current_counts.entry(status.customer_id.as_str()).or_default() += 1;
        }
    }
    let config = GeneratorConfig::default_test();
    assert_eq!(current_counts.len(), config.num_customers);
    for (customer, count) in current_counts {
        assert_eq!(count, 1, "customer {customer} has {count} current rows");
    }
}

#[test]
fn per_customer_rows_are_contiguous() {
    let (_, statuses) = run(42);
    let mut by_customer: HashMap<&str, Vec<&CustomerStatus>> = HashMap::new();
    for status in &statuses {
        by_customer
            .entry(status.customer_id.as_str())
            .or_default()
            .push(status);
    }
    for (customer, rows) in by_customer {
        for window in rows.windows(2) {
            assert_eq!(
                window[0].status_end_date, window[1].status_start_date,
                "customer {customer}: gap between status rows"
            );
            assert!(!window[0].is_current, "customer {customer}: closed row still current");
        }
        let last = rows.last().unwrap();
        assert!(last.is_current);
        assert!(last.status_end_date.is_empty());
    }
}

#[test]
fn first_row_is_active_and_linked_to_onboarding() {
    let (events, statuses) = run(42);
    let onboarding_ids: HashMap<&str, &str> = events
        .iter()
        .filter(|e| e.event_type == EventType::Onboarding)
        .map(|e| (e.customer_id.as_str(), e.event_id.as_str()))
        .collect();

    let mut seen: HashMap<&str, bool> = HashMap::new();
    for status in &statuses {
        if seen.insert(status.customer_id.as_str(), true).is_none() {
            assert_eq!(status.status, "ACTIVE");
            assert_eq!(status.status_reason, "INITIAL_ONBOARDING");
            assert_eq!(
                status.linked_event_id,
                *onboarding_ids.get(status.customer_id.as_str()).unwrap()
            );
        }
    }
}

#[test]
fn status_rows_match_their_linked_events() {
    let (events, statuses) = run(42);
    let events_by_id: HashMap<&str, _> = events
        .iter()
        .map(|e| (e.event_id.as_str(), e))
        .collect();

    for status in statuses.iter().filter(|s| s.status_reason != "INITIAL_ONBOARDING") {
        let event = events_by_id
            .get(status.linked_event_id.as_str())
            .unwrap_or_else(|| panic!("status {} links to missing event", status.status_id));
        assert_eq!(event.customer_id, status.customer_id);
        assert_eq!(status.status_start_date, event.event_date);
        match event.event_type {
            EventType::AccountClose | EventType::Churn => assert_eq!(status.status, "CLOSED"),
            EventType::Reactivation => assert_eq!(status.status, "REACTIVATED"),
            other => panic!("status row linked to non-status event {other:?}"),
        }
    }
}

#[test]
fn closing_one_customer_leaves_others_untouched() {
    // Interleaved status changes across customers must never cross
    // customer boundaries: each CLOSED/REACTIVATED row has a matching
    // predecessor for the same customer.
    let (_, statuses) = run(1337);
    let mut by_customer: HashMap<&str, Vec<&CustomerStatus>> = HashMap::new();
    for status in &statuses {
        by_customer
            .entry(status.customer_id.as_str())
            .or_default()
            .push(status);
    }
    for (customer, rows) in by_customer {
        assert_eq!(rows[0].status, "ACTIVE", "customer {customer}");
        for window in rows.windows(2) {
            assert!(
                !window[0].status_end_date.is_empty(),
                "customer {customer}: superseded row missing end date"
            );
        }
        assert_eq!(
            rows.iter().filter(|r| r.is_current).count(),
            1,
            "customer {customer}"
        );
    }
}

#[test]
fn status_ids_are_sequential_and_well_formed() {
    let (_, statuses) = run(42);
    for (idx, status) in statuses.iter().enumerate() {
        assert_eq!(status.status_id, format!("STAT_{:06}", idx + 1));
    }
}
