//! Anomaly engine — per-customer suspicious-behavior profiles and the
//! transaction mutations they drive.
//!
//! Two halves:
//!   1. Characteristic generation: each anomalous customer gets exactly one
//!      AnomalyProfile (types, activity window, thresholds, counterparties).
//!      Profiles are generated once and never mutated afterwards.
//!   2. Application: given a base transaction and the owning customer's
//!      profile, decide whether the transaction is mutated and apply the
//!      selected patterns. Pure in-memory transformation — the transaction
//!      is taken by value and returned mutated.
//!
//! RULE: only customers flagged anomalous at population time have a
//! profile. Calling code gates on the flag; this module never re-checks it.

use crate::{config::GeneratorConfig, rng::StreamRng, transaction::Transaction, types::CustomerId};
use chrono::{Datelike, Duration, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

/// The anomaly vocabulary. Mutation order follows declaration order when a
/// transaction is hit by several types at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    LargeAmount,
    HighFrequency,
    UnusualCounterparty,
    RoundAmount,
    OffHours,
    RapidSuccession,
    NewBeneficiaryLarge,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 7] = [
        AnomalyType::LargeAmount,
        AnomalyType::HighFrequency,
        AnomalyType::UnusualCounterparty,
        AnomalyType::RoundAmount,
        AnomalyType::OffHours,
        AnomalyType::RapidSuccession,
        AnomalyType::NewBeneficiaryLarge,
    ];

    /// Description marker appended when a mutation is applied.
    /// Volume-only types (high frequency, rapid succession) leave no
    /// per-transaction marker; they shape daily counts instead.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::LargeAmount => Some("[LARGE_TRANSFER]"),
            Self::UnusualCounterparty => Some("[SUSPICIOUS_COUNTERPARTY]"),
            Self::RoundAmount => Some("[ROUND_AMOUNT]"),
            Self::OffHours => Some("[OFF_HOURS]"),
            Self::NewBeneficiaryLarge => Some("[NEW_LARGE_BENEFICIARY]"),
            Self::HighFrequency | Self::RapidSuccession => None,
        }
    }

    fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(usize::MAX)
    }
}

const SUSPICIOUS_PREFIXES: [&str; 5] = [
    "OFF_SHORE_",
    "SHELL_CORP_",
    "CRYPTO_EX_",
    "CASH_SERV_",
    "MONEY_TRANS_",
];

/// Private anomaly profile of a single flagged customer.
/// Generated once, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyProfile {
    pub customer_id: CustomerId,
    /// 1-3 types, in vocabulary order.
    pub anomaly_types: Vec<AnomalyType>,
    pub start_date: NaiveDate,
    /// 1-90, clamped so the window never runs past the period end.
    pub duration_days: i64,
    pub suspicious_counterparties: Vec<String>,
    pub large_amount_threshold: f64,
    /// Transactions per day during a high-frequency burst.
    pub high_frequency_threshold: i64,
}

impl AnomalyProfile {
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(self.duration_days)
    }

    /// Window membership, inclusive on both ends.
    pub fn window_contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date()
    }

    pub fn has_type(&self, anomaly_type: AnomalyType) -> bool {
        self.anomaly_types.contains(&anomaly_type)
    }
}

pub struct AnomalyEngine {
    config: GeneratorConfig,
}

impl AnomalyEngine {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    // ── Characteristic generation ────────────────────────────────────────

    /// Produce the one profile an anomalous customer owns.
    pub fn generate_profile(&self, customer_id: &str, rng: &mut StreamRng) -> AnomalyProfile {
        let num_types = rng.int_in(1, 3) as usize;
        let mut anomaly_types: Vec<AnomalyType> = rng
            .sample_indices(AnomalyType::ALL.len(), num_types)
            .into_iter()
            .map(|i| AnomalyType::ALL[i])
            .collect();
        anomaly_types.sort_by_key(|t| t.ordinal());

        let start_date = self.anomaly_start_date(rng);
        let days_left = (self.config.end_date() - start_date).num_days().max(1);
        let duration_days = rng.int_in(1, 90.min(days_left));

        AnomalyProfile {
            customer_id: customer_id.to_string(),
            anomaly_types,
            start_date,
            duration_days,
            suspicious_counterparties: self.suspicious_counterparties(rng),
            large_amount_threshold: self.large_amount_threshold(rng),
            high_frequency_threshold: rng.int_in(10, 25),
        }
    }

    /// When anomalous behavior starts. Short periods (<= 60 days) start in
    /// the first half; longer ones after the first quarter but at least 30
    /// days before the end, so a multi-day window has data on both sides.
    fn anomaly_start_date(&self, rng: &mut StreamRng) -> NaiveDate {
        let total_days = self.config.total_days();

        let (mut min_days, mut max_days) = if total_days <= 60 {
            (1, (total_days / 2).max(2))
        } else {
            (total_days / 4, total_days - 30)
        };
        min_days = min_days.max(1);
        max_days = max_days.max(min_days + 1);

        self.config.start_date() + Duration::days(rng.int_in(min_days, max_days))
    }

    fn suspicious_counterparties(&self, rng: &mut StreamRng) -> Vec<String> {
        let count = rng.int_in(1, 3);
        (0..count)
            .map(|_| {
                let prefix = *rng.pick(&SUSPICIOUS_PREFIXES);
                format!("{prefix}{:07}", rng.int_in(1_000_000, 9_999_999))
            })
            .collect()
    }

    /// Large amounts sit well above a customer's normal behavior:
    /// midpoint of the configured range times a 5-20x multiplier.
    fn large_amount_threshold(&self, rng: &mut StreamRng) -> f64 {
        let multiplier = rng.uniform(
            self.config.anomaly_multiplier_min,
            self.config.anomaly_multiplier_max,
        );
        self.config.normal_amount_midpoint() * multiplier
    }

    // ── Application ──────────────────────────────────────────────────────

    /// Decide which anomaly types hit a transaction dated `date`.
    /// Empty result = leave the transaction alone. Three gates:
    /// window membership, stochastic activation, per-type survival.
    pub fn select_applicable(
        &self,
        profile: &AnomalyProfile,
        date: NaiveDate,
        rng: &mut StreamRng,
    ) -> Vec<AnomalyType> {
        if !profile.window_contains(date) {
            return Vec::new();
        }
        // Anomalies are intermittent, not constant, inside the window.
        if !rng.chance(self.config.window_activation_probability) {
            return Vec::new();
        }
        profile
            .anomaly_types
            .iter()
            .copied()
            .filter(|_| rng.chance(self.config.type_activation_probability))
            .collect()
    }

    /// Apply the selected patterns to a base transaction, in vocabulary
    /// order. Amount mutations operate on the magnitude and keep the
    /// original direction sign.
    pub fn apply(
        &self,
        mut transaction: Transaction,
        anomaly_types: &[AnomalyType],
        profile: &AnomalyProfile,
        rng: &mut StreamRng,
    ) -> Transaction {
        for anomaly_type in anomaly_types {
            match anomaly_type {
                AnomalyType::LargeAmount => {
                    let magnitude = transaction.amount.abs() * rng.uniform(2.0, 5.0);
                    transaction.set_amount_magnitude(
                        magnitude.max(profile.large_amount_threshold),
                    );
                }
                AnomalyType::UnusualCounterparty => {
                    transaction.counterparty_account =
                        rng.pick(&profile.suspicious_counterparties).clone();
                }
                AnomalyType::RoundAmount => {
                    transaction.set_amount_magnitude(
                        self.round_amount_for(transaction.amount.abs()),
                    );
                }
                AnomalyType::OffHours => {
                    let booking = Self::off_hours_booking(transaction.booking_timestamp, rng);
                    transaction.booking_timestamp = booking;
                    // The value date may never precede the booking date.
                    transaction.value_date = transaction.value_date.max(booking.date());
                }
                AnomalyType::NewBeneficiaryLarge => {
                    transaction.counterparty_account =
                        format!("NEW_BENEF_{}", rng.int_in(100_000, 999_999));
                    let magnitude = (transaction.amount.abs() * rng.uniform(3.0, 8.0))
                        .max(0.5 * profile.large_amount_threshold);
                    transaction.set_amount_magnitude(magnitude);
                }
                // Volume patterns — handled by the transaction generator's
                // daily counts, nothing to mutate here.
                AnomalyType::HighFrequency | AnomalyType::RapidSuccession => {}
            }

            if let Some(tag) = anomaly_type.tag() {
                transaction.description.push(' ');
                transaction.description.push_str(tag);
            }
        }
        transaction
    }

    /// Smallest configured round amount covering at least half the base;
    /// fall back to rounding the base to the nearest thousand when the
    /// base dwarfs every configured value.
    fn round_amount_for(&self, base_magnitude: f64) -> f64 {
        self.config
            .round_amounts
            .iter()
            .copied()
            .find(|amount| *amount >= base_magnitude * 0.5)
            .unwrap_or_else(|| (base_magnitude / 1000.0).round() * 1000.0)
    }

    /// Shift a booking either into the late night (23:00-05:00) or onto
    /// the next weekend day at daytime hours.
    fn off_hours_booking(
        booking: chrono::NaiveDateTime,
        rng: &mut StreamRng,
    ) -> chrono::NaiveDateTime {
        if rng.chance(0.5) {
            let hour = *rng.pick(&[23u32, 0, 1, 2, 3, 4, 5]);
            let minute = rng.int_in(0, 59) as u32;
            booking
                .with_hour(hour)
                .and_then(|b| b.with_minute(minute))
                .and_then(|b| b.with_second(0))
                .expect("hour/minute in range")
        } else {
            let mut days_to_weekend =
                (5 - booking.date().weekday().num_days_from_monday() as i64).rem_euclid(7);
            if days_to_weekend == 0 {
                days_to_weekend = 1;
            }
            let hour = rng.int_in(9, 18) as u32;
            let minute = rng.int_in(0, 59) as u32;
            (booking + Duration::days(days_to_weekend))
                .with_hour(hour)
                .and_then(|b| b.with_minute(minute))
                .and_then(|b| b.with_second(0))
                .expect("hour/minute in range")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GeneratorSlot, RngBank};

    fn engine_and_rng() -> (AnomalyEngine, StreamRng) {
        let config = GeneratorConfig::default_test();
        let bank = RngBank::new(42);
        (AnomalyEngine::new(config), bank.for_generator(GeneratorSlot::Anomaly))
    }

    #[test]
    fn profile_types_are_ordered_and_bounded() {
        let (engine, mut rng) = engine_and_rng();
        for i in 0..200 {
            let profile = engine.generate_profile(&format!("CUST_{i:05}"), &mut rng);
            assert!((1..=3).contains(&profile.anomaly_types.len()));
            let ordinals: Vec<usize> =
                profile.anomaly_types.iter().map(|t| t.ordinal()).collect();
            assert!(ordinals.windows(2).all(|w| w[0] < w[1]), "types not ordered");
        }
    }

    #[test]
    fn suspicious_counterparties_carry_shell_prefixes() {
        let (engine, mut rng) = engine_and_rng();
        let profile = engine.generate_profile("CUST_00001", &mut rng);
        for counterparty in &profile.suspicious_counterparties {
            assert!(
                SUSPICIOUS_PREFIXES.iter().any(|p| counterparty.starts_with(p)),
                "unexpected counterparty {counterparty}"
            );
        }
    }

    #[test]
    fn window_membership_is_inclusive() {
        let profile = AnomalyProfile {
            customer_id: "CUST_00001".into(),
            anomaly_types: vec![AnomalyType::LargeAmount],
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            duration_days: 10,
            suspicious_counterparties: vec!["SHELL_CORP_0000001".into()],
            large_amount_threshold: 100_000.0,
            high_frequency_threshold: 15,
        };
        assert!(profile.window_contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(profile.window_contains(NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()));
        assert!(!profile.window_contains(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()));
        assert!(!profile.window_contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn round_amount_picks_smallest_qualifying() {
        let (engine, _) = engine_and_rng();
        assert_eq!(engine.round_amount_for(1_500.0), 1_000.0);
        assert_eq!(engine.round_amount_for(9_000.0), 5_000.0);
        assert_eq!(engine.round_amount_for(60_000.0), 50_000.0);
        // Nothing qualifies above 200k: nearest-thousand fallback.
        assert_eq!(engine.round_amount_for(250_400.0), 250_000.0);
    }
}
