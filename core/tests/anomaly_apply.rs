//! Anomaly application tests: mutations, gating rates, tags.

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use synthbank_core::{
    anomaly::{AnomalyEngine, AnomalyProfile, AnomalyType},
    config::GeneratorConfig,
    rng::StreamRng,
    transaction::Transaction,
};

fn base_transaction(amount: f64) -> Transaction {
    Transaction {
        transaction_id: "TXN_0000000000AB".into(),
        account_id: "CUST_00001_CHECKING_01".into(),
        booking_timestamp: NaiveDate::from_ymd_opt(2024, 3, 6)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap(),
        value_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        amount,
        currency: "USD".into(),
        base_amount: amount,
        base_currency: "USD".into(),
        fx_rate: 1.0,
        counterparty_account: "SUPPLIER_0000000001".into(),
        description: "Supplier invoice".into(),
    }
}

fn profile_with(types: Vec<AnomalyType>) -> AnomalyProfile {
    AnomalyProfile {
        customer_id: "CUST_00001".into(),
        anomaly_types: types,
        start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        duration_days: 30,
        suspicious_counterparties: vec![
            "SHELL_CORP_1234567".into(),
            "OFF_SHORE_7654321".into(),
        ],
        large_amount_threshold: 50_000.0,
        high_frequency_threshold: 15,
    }
}

#[test]
fn large_amount_mutation_clears_threshold_and_tags() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let mut rng = StreamRng::new(5, 4);
    let profile = profile_with(vec![AnomalyType::LargeAmount]);

    let mutated = engine.apply(
        base_transaction(-200.0),
        &[AnomalyType::LargeAmount],
        &profile,
        &mut rng,
    );
    assert!(mutated.amount <= -50_000.0, "magnitude below threshold");
    assert!(mutated.description.ends_with("[LARGE_TRANSFER]"));
    // Direction must survive the mutation.
    assert!(mutated.amount < 0.0);
}

#[test]
fn unusual_counterparty_comes_from_the_profile() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let mut rng = StreamRng::new(5, 4);
    let profile = profile_with(vec![AnomalyType::UnusualCounterparty]);

    let mutated = engine.apply(
        base_transaction(300.0),
        &[AnomalyType::UnusualCounterparty],
        &profile,
        &mut rng,
    );
    assert!(profile
        .suspicious_counterparties
        .contains(&mutated.counterparty_account));
    assert!(mutated.description.ends_with("[SUSPICIOUS_COUNTERPARTY]"));
}

#[test]
fn round_amount_mutation_lands_on_a_configured_value() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config.clone());
    let mut rng = StreamRng::new(5, 4);
    let profile = profile_with(vec![AnomalyType::RoundAmount]);

    let mutated = engine.apply(
        base_transaction(-1_800.0),
        &[AnomalyType::RoundAmount],
        &profile,
        &mut rng,
    );
    assert!(
        config.round_amounts.contains(&mutated.amount.abs()),
        "amount {} is not a configured round value",
        mutated.amount.abs()
    );
    assert!(mutated.description.ends_with("[ROUND_AMOUNT]"));
}

#[test]
fn off_hours_booking_moves_but_never_precedes_value_date() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let profile = profile_with(vec![AnomalyType::OffHours]);

    for seed in 0..50u64 {
        let mut rng = StreamRng::new(seed, 4);
        let mutated = engine.apply(
            base_transaction(150.0),
            &[AnomalyType::OffHours],
            &profile,
            &mut rng,
        );
        let hour = mutated.booking_timestamp.hour();
        let weekday = mutated.booking_timestamp.date().weekday();
        assert!(
            hour >= 23 || hour <= 5 || matches!(weekday, Weekday::Sat | Weekday::Sun),
            "seed {seed}: booking {} is neither late-night nor weekend",
            mutated.booking_timestamp
        );
        assert!(
            mutated.value_date >= mutated.booking_timestamp.date(),
            "seed {seed}: value date before booking date"
        );
        assert!(mutated.description.ends_with("[OFF_HOURS]"));
    }
}

#[test]
fn new_beneficiary_gets_fresh_counterparty_and_large_amount() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let mut rng = StreamRng::new(5, 4);
    let profile = profile_with(vec![AnomalyType::NewBeneficiaryLarge]);

    let mutated = engine.apply(
        base_transaction(100.0),
        &[AnomalyType::NewBeneficiaryLarge],
        &profile,
        &mut rng,
    );
    assert!(mutated.counterparty_account.starts_with("NEW_BENEF_"));
    assert!(mutated.amount >= 25_000.0, "below half the threshold");
    assert!(mutated.description.ends_with("[NEW_LARGE_BENEFICIARY]"));
}

#[test]
fn stacked_mutations_append_tags_in_vocabulary_order() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let mut rng = StreamRng::new(5, 4);
    let types = vec![AnomalyType::LargeAmount, AnomalyType::UnusualCounterparty];
    let profile = profile_with(types.clone());

    let mutated = engine.apply(base_transaction(-500.0), &types, &profile, &mut rng);
    let large_pos = mutated.description.find("[LARGE_TRANSFER]").unwrap();
    let susp_pos = mutated.description.find("[SUSPICIOUS_COUNTERPARTY]").unwrap();
    assert!(large_pos < susp_pos);
}

#[test]
fn selection_outside_window_is_always_empty() {
    let engine = AnomalyEngine::new(GeneratorConfig::default_test());
    let profile = profile_with(vec![AnomalyType::LargeAmount]);
    let outside = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

    for seed in 0..100u64 {
        let mut rng = StreamRng::new(seed, 4);
        assert!(engine.select_applicable(&profile, outside, &mut rng).is_empty());
    }
}

/// With one type, the chance a given in-window transaction is mutated is
/// window_activation * type_activation = 0.30 * 0.70 = 0.21.
#[test]
fn in_window_activation_rate_matches_configured_gates() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config.clone());
    let profile = profile_with(vec![AnomalyType::LargeAmount]);
    let inside = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let trials = 20_000;
    let mut rng = StreamRng::new(1234, 4);
    let mut hits = 0usize;
    for _ in 0..trials {
        if !engine.select_applicable(&profile, inside, &mut rng).is_empty() {
            hits += 1;
        }
    }
    let observed = hits as f64 / trials as f64;
    let expected =
        config.window_activation_probability * config.type_activation_probability;
    assert!(
        (observed - expected).abs() < 0.02,
        "observed activation rate {observed:.3}, expected {expected:.3}"
    );
}

/// With three types the transaction is mutated when the window gate
/// passes and at least one type survives: 0.30 * (1 - 0.3^3)... with
/// survival 0.70 per type, 0.30 * (1 - 0.30^3) = 0.2919.
#[test]
fn multi_type_activation_rate() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config.clone());
    let profile = profile_with(vec![
        AnomalyType::LargeAmount,
        AnomalyType::RoundAmount,
        AnomalyType::OffHours,
    ]);
    let inside = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

    let trials = 20_000;
    let mut rng = StreamRng::new(4321, 4);
    let mut hits = 0usize;
    for _ in 0..trials {
        if !engine.select_applicable(&profile, inside, &mut rng).is_empty() {
            hits += 1;
        }
    }
    let observed = hits as f64 / trials as f64;
    let miss = 1.0 - config.type_activation_probability;
    let expected = config.window_activation_probability * (1.0 - miss.powi(3));
    assert!(
        (observed - expected).abs() < 0.02,
        "observed activation rate {observed:.3}, expected {expected:.3}"
    );
}
