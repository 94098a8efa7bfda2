//! Generator configuration.
//!
//! All knobs for a generation run live here. A config can be loaded from a
//! JSON file (runner) or built from hardcoded defaults (tests). Every date
//! derivation goes through this struct so the generators never consult the
//! wall clock directly — `as_of_date` is the only "now" the pipeline knows.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // ── Population ─────────────────────────────────────────────
    pub num_customers: usize,
    /// Percentage of customers flagged anomalous at creation time.
    pub anomaly_percentage: f64,

    // ── Time period ────────────────────────────────────────────
    pub generation_period_months: u32,
    /// First day of the generation period. Defaults to
    /// `as_of_date - generation_period_months * 30` days.
    pub start_date: Option<NaiveDate>,
    /// Horizon for randomly synthesized lifecycle events. Defaults to
    /// today; tests freeze it for reproducible runs.
    pub as_of_date: NaiveDate,

    // ── Transactions ───────────────────────────────────────────
    pub avg_transactions_per_customer_per_month: f64,
    pub base_currency: String,
    pub available_currencies: Vec<String>,
    pub min_transaction_amount: f64,
    pub max_transaction_amount: f64,

    // ── Anomaly engine ─────────────────────────────────────────
    /// Multiplier range applied to the normal-amount midpoint when
    /// deriving a customer's large-amount threshold.
    pub anomaly_multiplier_min: f64,
    pub anomaly_multiplier_max: f64,
    /// Probability that a transaction inside an anomaly window is
    /// selected for mutation at all.
    pub window_activation_probability: f64,
    /// Per-type survival probability once a transaction is selected.
    pub type_activation_probability: f64,
    /// Suspicious round amounts, ascending.
    pub round_amounts: Vec<f64>,

    // ── Update feeds ───────────────────────────────────────────
    pub num_address_update_batches: usize,
    pub customer_updates_per_month: usize,

    // ── Output ─────────────────────────────────────────────────
    pub output_directory: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_customers: 10,
            anomaly_percentage: 2.0,
            generation_period_months: 24,
            start_date: None,
            as_of_date: Utc::now().date_naive(),
            avg_transactions_per_customer_per_month: 3.5,
            base_currency: "USD".into(),
            available_currencies: vec![
                "USD".into(),
                "EUR".into(),
                "GBP".into(),
                "JPY".into(),
                "CAD".into(),
            ],
            min_transaction_amount: 10.0,
            max_transaction_amount: 50_000.0,
            anomaly_multiplier_min: 5.0,
            anomaly_multiplier_max: 20.0,
            window_activation_probability: 0.30,
            type_activation_probability: 0.70,
            round_amounts: vec![1_000.0, 5_000.0, 10_000.0, 25_000.0, 50_000.0, 100_000.0],
            num_address_update_batches: 6,
            customer_updates_per_month: 50,
            output_directory: "generated_data".into(),
        }
    }
}

impl GeneratorConfig {
    /// Load a config from a JSON file. Missing fields take defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Config with hardcoded values for use in unit tests: a short, fully
    /// frozen timeline so every derived date is reproducible.
    pub fn default_test() -> Self {
        Self {
            num_customers: 20,
            anomaly_percentage: 10.0,
            generation_period_months: 6,
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            as_of_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            avg_transactions_per_customer_per_month: 3.5,
            ..Self::default()
        }
    }

    /// First day of the generation period.
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| self.as_of_date - Duration::days(self.total_days()))
    }

    /// Last day of the generation period.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date() + Duration::days(self.total_days())
    }

    /// Length of the period in days (months are modeled as 30 days).
    pub fn total_days(&self) -> i64 {
        self.generation_period_months as i64 * 30
    }

    /// Number of customers that carry an anomaly profile. Always at
    /// least one so small test populations still exercise the engine.
    pub fn num_anomalous_customers(&self) -> usize {
        let n = (self.num_customers as f64 * self.anomaly_percentage / 100.0) as usize;
        n.max(1)
    }

    /// Midpoint of the configured normal transaction amount range.
    pub fn normal_amount_midpoint(&self) -> f64 {
        (self.min_transaction_amount + self.max_transaction_amount) / 2.0
    }
}
