//! Anomaly profile generation tests.

use synthbank_core::{
    anomaly::{AnomalyEngine, AnomalyType},
    config::GeneratorConfig,
    rng::StreamRng,
};

#[test]
fn profile_windows_fit_inside_generation_period() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config.clone());

    for seed in 0..200u64 {
        let mut rng = StreamRng::new(seed, 4);
        let profile = engine.generate_profile("CUST_00001", &mut rng);
        assert!(
            profile.start_date >= config.start_date(),
            "seed {seed}: window starts before the period"
        );
        assert!(
            profile.end_date() <= config.end_date(),
            "seed {seed}: window ends after the period ({} > {})",
            profile.end_date(),
            config.end_date()
        );
        assert!(profile.duration_days >= 1);
        assert!(profile.duration_days <= 90);
    }
}

#[test]
fn profile_carries_one_to_three_distinct_types() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config);

    for seed in 0..100u64 {
        let mut rng = StreamRng::new(seed, 4);
        let profile = engine.generate_profile("CUST_00002", &mut rng);
        assert!((1..=3).contains(&profile.anomaly_types.len()));
        let mut deduped = profile.anomaly_types.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), profile.anomaly_types.len(), "duplicate types");
    }
}

#[test]
fn short_period_uses_early_start_policy() {
    let mut config = GeneratorConfig::default_test();
    config.generation_period_months = 2; // 60-day period
    let engine = AnomalyEngine::new(config.clone());

    for seed in 0..100u64 {
        let mut rng = StreamRng::new(seed, 4);
        let profile = engine.generate_profile("CUST_00003", &mut rng);
        let offset = (profile.start_date - config.start_date()).num_days();
        assert!(
            (1..=30).contains(&offset),
            "seed {seed}: short-period start offset {offset} outside [1, 30]"
        );
    }
}

#[test]
fn thresholds_scale_with_configured_multipliers() {
    let config = GeneratorConfig::default_test();
    let midpoint = config.normal_amount_midpoint();
    let engine = AnomalyEngine::new(config.clone());

    for seed in 0..100u64 {
        let mut rng = StreamRng::new(seed, 4);
        let profile = engine.generate_profile("CUST_00004", &mut rng);
        assert!(profile.large_amount_threshold >= midpoint * config.anomaly_multiplier_min);
        assert!(profile.large_amount_threshold <= midpoint * config.anomaly_multiplier_max);
        assert!((10..=25).contains(&profile.high_frequency_threshold));
    }
}

#[test]
fn suspicious_counterparties_use_marked_prefixes() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config);
    let mut rng = StreamRng::new(99, 4);
    let profile = engine.generate_profile("CUST_00005", &mut rng);

    assert!((1..=3).contains(&profile.suspicious_counterparties.len()));
    let prefixes = ["OFF_SHORE_", "SHELL_CORP_", "CRYPTO_EX_", "CASH_SERV_", "MONEY_TRANS_"];
    for counterparty in &profile.suspicious_counterparties {
        assert!(
            prefixes.iter().any(|p| counterparty.starts_with(p)),
            "unexpected counterparty prefix: {counterparty}"
        );
    }
}

#[test]
fn window_membership_is_inclusive_on_both_ends() {
    let config = GeneratorConfig::default_test();
    let engine = AnomalyEngine::new(config);
    let mut rng = StreamRng::new(7, 4);
    let profile = engine.generate_profile("CUST_00006", &mut rng);

    assert!(profile.window_contains(profile.start_date));
    assert!(profile.window_contains(profile.end_date()));
    assert!(!profile.window_contains(profile.start_date - chrono::Duration::days(1)));
    assert!(!profile.window_contains(profile.end_date() + chrono::Duration::days(1)));
}

#[test]
fn volume_types_carry_no_description_tag() {
    assert!(AnomalyType::HighFrequency.tag().is_none());
    assert!(AnomalyType::RapidSuccession.tag().is_none());
    assert_eq!(AnomalyType::LargeAmount.tag(), Some("[LARGE_TRANSFER]"));
    assert_eq!(
        AnomalyType::UnusualCounterparty.tag(),
        Some("[SUSPICIOUS_COUNTERPARTY]")
    );
}
