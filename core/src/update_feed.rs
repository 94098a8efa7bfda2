//! Dated update batches feeding slowly-changing-dimension processing.
//!
//! Two feeds are produced: address update batches (one file per batch
//! date, partial coverage of the population) and full-record customer
//! update batches (rolling daily changes, flushed roughly monthly).
//! Both carry an `insert_timestamp_utc` column. The two feeds use
//! different timestamp renderings on purpose: addresses write the plain
//! `YYYY-MM-DD HH:MM:SS` form, customer snapshots write ISO-8601 with
//! fractional seconds and a `Z` suffix, so downstream parsing must
//! normalize before comparing.

use crate::{
    config::GeneratorConfig,
    customer::{Customer, ACCOUNT_TIERS, EMPLOYMENT_TYPES},
    error::{GenError, GenResult},
    name_generator::NameGenerator,
    rng::StreamRng,
    types::CustomerId,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Timestamp handling
// ---------------------------------------------------------------------------

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an `insert_timestamp_utc` value from any feed.
///
/// Accepts the plain `YYYY-MM-DD HH:MM:SS` form and ISO-8601 variants
/// (`T` separator, fractional seconds, trailing `Z`) by normalizing to
/// the plain form first. A value that still fails to parse is a fatal
/// error: downstream joins depend on reproducing these timestamps
/// byte for byte, so defaulting silently would corrupt the output.
pub fn parse_feed_timestamp(raw: &str, context: &str) -> GenResult<NaiveDateTime> {
    let mut normalized = raw.trim().replace('T', " ");
    if let Some(stripped) = normalized.strip_suffix('Z') {
        normalized = stripped.to_string();
    }
    if let Some((whole, _fraction)) = normalized.split_once('.') {
        normalized = whole.to_string();
    }
    NaiveDateTime::parse_from_str(&normalized, TIMESTAMP_FORMAT).map_err(|_| {
        GenError::Timestamp {
            raw: raw.to_string(),
            context: context.to_string(),
        }
    })
}

fn business_hours(date: NaiveDate, rng: &mut StreamRng) -> NaiveDateTime {
    date.and_hms_opt(
        rng.int_in(9, 17) as u32,
        rng.int_in(0, 59) as u32,
        rng.int_in(0, 59) as u32,
    )
    .expect("valid time of day")
}

// ---------------------------------------------------------------------------
// Address update feed
// ---------------------------------------------------------------------------

/// One row of an address update batch. Field order matches the CSV layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRecord {
    pub customer_id: CustomerId,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub insert_timestamp_utc: String,
}

impl From<&crate::customer::CustomerAddress> for AddressRecord {
    fn from(address: &crate::customer::CustomerAddress) -> Self {
        AddressRecord {
            customer_id: address.customer_id.clone(),
            street_address: address.street_address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zipcode: address.zipcode.clone(),
            country: address.country.clone(),
            insert_timestamp_utc: address.insert_timestamp_utc.clone(),
        }
    }
}

/// A dated batch of address updates, written as
/// `customer_addresses_{batch_date}.csv`.
#[derive(Debug, Clone)]
pub struct AddressBatch {
    pub batch_date: NaiveDate,
    pub records: Vec<AddressRecord>,
}

pub struct AddressUpdateGenerator;

impl AddressUpdateGenerator {
    /// Produce `num_address_update_batches` dated batches spread across
    /// the generation period, each covering 5-15% of the population.
    pub fn generate(
        config: &GeneratorConfig,
        customers: &[Customer],
        rng: &mut StreamRng,
    ) -> Vec<AddressBatch> {
        let n_batches = config.num_address_update_batches.max(1);
        let total_days = config.total_days();
        let segment = total_days / (n_batches as i64 + 1);

        let mut batches = Vec::with_capacity(n_batches);
        for i in 0..n_batches {
            let jitter = if segment >= 4 {
                rng.int_in(-(segment / 4), segment / 4)
            } else {
                0
            };
            let offset = (segment * (i as i64 + 1) + jitter).clamp(1, total_days);
            let batch_date = config.start_date() + Duration::days(offset);

            let coverage = rng.uniform(0.05, 0.15);
            let per_batch = ((customers.len() as f64 * coverage) as usize)
                .max(5)
                .min(customers.len());
            let picked = rng.sample_indices(customers.len(), per_batch);

            let mut records = Vec::with_capacity(per_batch);
            for idx in picked {
                records.push(Self::new_address(&customers[idx], batch_date, rng));
            }
            batches.push(AddressBatch {
                batch_date,
                records,
            });
        }

        batches.sort_by_key(|b| b.batch_date);
        log::info!("generated {} address update batches", batches.len());
        batches
    }

    fn new_address(customer: &Customer, batch_date: NaiveDate, rng: &mut StreamRng) -> AddressRecord {
        // Most moves stay in-country. Cross-border moves feed the
        // review workflow downstream.
        let country = if rng.chance(0.15) {
            NameGenerator::country(rng)
        } else {
            NameGenerator::country_by_name(&customer.country)
        };
        AddressRecord {
            customer_id: customer.customer_id.clone(),
            street_address: NameGenerator::street_address(rng),
            city: NameGenerator::city(rng, country).to_string(),
            state: NameGenerator::region(rng, country).to_string(),
            zipcode: NameGenerator::zipcode(rng),
            country: country.name.to_string(),
            insert_timestamp_utc: business_hours(batch_date, rng)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Customer update feed
// ---------------------------------------------------------------------------

pub const RISK_CLASSIFICATIONS: [&str; 4] = ["LOW", "MEDIUM", "HIGH", "VERY_HIGH"];
pub const INCOME_RANGES: [&str; 6] =
    ["<30K", "30K-50K", "50K-75K", "75K-100K", "100K-150K", ">150K"];
pub const CREDIT_SCORE_BANDS: [&str; 5] = ["POOR", "FAIR", "GOOD", "VERY_GOOD", "EXCELLENT"];
pub const CONTACT_METHODS: [&str; 5] = ["EMAIL", "SMS", "POST", "MOBILE_APP", "PHONE"];

const EMAIL_DOMAINS: [&str; 5] = [
    "example.com",
    "mail.example.com",
    "inbox.example.org",
    "post.example.net",
    "webmail.example.co.uk",
];

/// A full customer record as carried by the update feed. Every update
/// re-emits the whole record, not a field-level delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub onboarding_date: String,
    pub country: String,
    pub reporting_currency: String,
    pub account_tier: String,
    pub employment_type: String,
    pub employer: String,
    pub position: String,
    pub income_range: String,
    pub email: String,
    pub phone: String,
    pub preferred_contact_method: String,
    pub risk_classification: String,
    pub credit_score_band: String,
    pub has_anomaly: bool,
    pub insert_timestamp_utc: String,
}

impl CustomerSnapshot {
    /// Seed snapshot for a freshly generated customer, dated at
    /// onboarding. The extended attributes are drawn here because the
    /// master record does not carry them.
    pub fn seed(customer: &Customer, rng: &mut StreamRng) -> Self {
        let email = format!(
            "{}.{}{}@{}",
            customer.first_name.to_lowercase(),
            customer.family_name.to_lowercase(),
            rng.int_in(1, 99),
            rng.pick(&EMAIL_DOMAINS)
        );
        CustomerSnapshot {
            customer_id: customer.customer_id.clone(),
            first_name: customer.first_name.clone(),
            family_name: customer.family_name.clone(),
            date_of_birth: customer.date_of_birth.clone(),
            onboarding_date: customer.onboarding_date.clone(),
            country: customer.country.clone(),
            reporting_currency: customer.reporting_currency.clone(),
            account_tier: customer.account_tier.clone(),
            employment_type: customer.employment_type.clone(),
            employer: customer.employer.clone(),
            position: customer.position.clone(),
            income_range: (*rng.pick(&INCOME_RANGES)).to_string(),
            email,
            phone: format!("+{} {:09}", rng.int_in(30, 49), rng.int_in(0, 999_999_999)),
            preferred_contact_method: (*rng.pick(&CONTACT_METHODS)).to_string(),
            risk_classification: (*rng.pick(&["LOW", "LOW", "MEDIUM", "MEDIUM", "HIGH"]))
                .to_string(),
            credit_score_band: (*rng.pick(&CREDIT_SCORE_BANDS)).to_string(),
            has_anomaly: customer.has_anomaly,
            insert_timestamp_utc: String::new(),
        }
    }
}

/// A dated batch of full-record customer updates, written as
/// `customer_updates_{batch_date}.csv`.
#[derive(Debug, Clone)]
pub struct CustomerUpdateBatch {
    pub batch_date: NaiveDate,
    pub records: Vec<CustomerSnapshot>,
}

pub struct CustomerUpdateGenerator;

impl CustomerUpdateGenerator {
    /// Walk the period day by day, mutate a running per-customer state,
    /// and flush accumulated full-record snapshots roughly every 30 days.
    pub fn generate(
        config: &GeneratorConfig,
        customers: &[Customer],
        rng: &mut StreamRng,
    ) -> Vec<CustomerUpdateBatch> {
        let mut state: HashMap<CustomerId, CustomerSnapshot> = customers
            .iter()
            .map(|c| (c.customer_id.clone(), CustomerSnapshot::seed(c, rng)))
            .collect();
        let ids: Vec<CustomerId> = customers.iter().map(|c| c.customer_id.clone()).collect();

        let mut batches = Vec::new();
        let mut pending: Vec<CustomerSnapshot> = Vec::new();
        let mut file_date = config.start_date();
        let mut day = config.start_date();
        let end = config.end_date();
        let daily_cap = (config.customer_updates_per_month / 15).max(1);

        while day <= end {
            let daily = rng.int_in(0, daily_cap as i64);
            for _ in 0..daily {
                let customer_id = rng.pick(&ids).clone();
                let snapshot = state
                    .get_mut(&customer_id)
                    .expect("state seeded for every customer");
                Self::mutate(snapshot, rng);
                snapshot.insert_timestamp_utc = business_hours(day, rng)
                    .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                    .to_string();
                pending.push(snapshot.clone());
            }

            if (day - file_date).num_days() >= 30 || day == end {
                if !pending.is_empty() {
                    batches.push(CustomerUpdateBatch {
                        batch_date: file_date,
                        records: std::mem::take(&mut pending),
                    });
                }
                file_date = day + Duration::days(1);
            }
            day += Duration::days(1);
        }

        log::info!("generated {} customer update batches", batches.len());
        batches
    }

    fn mutate(snapshot: &mut CustomerSnapshot, rng: &mut StreamRng) {
        let kinds = ["EMPLOYMENT_CHANGE", "ACCOUNT_TIER", "CONTACT_INFO", "RISK_PROFILE"];
        match kinds[rng.pick_weighted(&[35.0, 30.0, 25.0, 10.0])] {
            "EMPLOYMENT_CHANGE" => {
                if rng.chance(0.4) {
                    snapshot.employer = NameGenerator::employer(rng);
                }
                if rng.chance(0.3) {
                    snapshot.position = NameGenerator::position(rng).to_string();
                }
                if rng.chance(0.3) {
                    snapshot.employment_type = (*rng.pick(&EMPLOYMENT_TYPES)).to_string();
                }
                if rng.chance(0.4) {
                    Self::shift_income(snapshot, rng);
                }
            }
            "ACCOUNT_TIER" => {
                let idx = ACCOUNT_TIERS
                    .iter()
                    .position(|t| *t == snapshot.account_tier)
                    .unwrap_or(0);
                // Upgrades outnumber downgrades 60/40.
                if rng.chance(0.6) && idx < ACCOUNT_TIERS.len() - 1 {
                    snapshot.account_tier = ACCOUNT_TIERS[idx + 1].to_string();
                } else if idx > 0 {
                    snapshot.account_tier = ACCOUNT_TIERS[idx - 1].to_string();
                }
            }
            "CONTACT_INFO" => {
                if rng.chance(0.5) {
                    snapshot.email = format!(
                        "{}.{}{}@{}",
                        snapshot.first_name.to_lowercase(),
                        snapshot.family_name.to_lowercase(),
                        rng.int_in(1, 999),
                        rng.pick(&EMAIL_DOMAINS)
                    );
                }
                if rng.chance(0.5) {
                    snapshot.phone =
                        format!("+{} {:09}", rng.int_in(30, 49), rng.int_in(0, 999_999_999));
                }
                if rng.chance(0.3) {
                    snapshot.preferred_contact_method = (*rng.pick(&CONTACT_METHODS)).to_string();
                }
            }
            _ => {
                if rng.chance(0.5) {
                    snapshot.risk_classification = (*rng.pick(&RISK_CLASSIFICATIONS)).to_string();
                }
                if rng.chance(0.5) {
                    snapshot.credit_score_band = (*rng.pick(&CREDIT_SCORE_BANDS)).to_string();
                }
            }
        }
    }

    fn shift_income(snapshot: &mut CustomerSnapshot, rng: &mut StreamRng) {
        let idx = INCOME_RANGES
            .iter()
            .position(|r| *r == snapshot.income_range)
            .unwrap_or(2);
        if idx < INCOME_RANGES.len() - 1 && rng.chance(0.7) {
            snapshot.income_range = INCOME_RANGES[idx + 1].to_string();
        } else if idx > 0 {
            snapshot.income_range = INCOME_RANGES[idx - 1].to_string();
        }
    }
}
