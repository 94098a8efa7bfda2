//! Customer population generator — the data source everything else feeds on.
//!
//! Produces the customer master table and the initial address table. The
//! anomaly flag is assigned exactly once here, by sampling
//! `num_anomalous_customers` ids without replacement; nothing downstream
//! may re-flag a customer.

use crate::{
    config::GeneratorConfig,
    name_generator::NameGenerator,
    rng::StreamRng,
    types::CustomerId,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Account tiers in ordinal rank order. The lifecycle engine compares rank
/// positions to classify a tier change as upgrade or downgrade.
pub const ACCOUNT_TIERS: [&str; 5] = ["STANDARD", "SILVER", "GOLD", "PLATINUM", "PREMIUM"];

pub const EMPLOYMENT_TYPES: [&str; 5] =
    ["FULL_TIME", "PART_TIME", "CONTRACT", "SELF_EMPLOYED", "RETIRED"];

/// Ordinal rank of an account tier. Unknown tier names rank 0, below
/// every known tier — a change away from one is always an upgrade.
pub fn tier_rank(tier: &str) -> u8 {
    ACCOUNT_TIERS
        .iter()
        .position(|t| *t == tier)
        .map(|p| p as u8 + 1)
        .unwrap_or(0)
}

/// Customer master record for EMEA retail banking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub family_name: String,
    /// YYYY-MM-DD
    pub date_of_birth: String,
    /// YYYY-MM-DD, always inside the generation period.
    pub onboarding_date: String,
    pub country: String,
    pub reporting_currency: String,
    pub account_tier: String,
    pub employment_type: String,
    pub employer: String,
    pub position: String,
    pub has_anomaly: bool,
}

impl Customer {
    pub fn onboarding(&self) -> NaiveDate {
        NaiveDate::parse_from_str(&self.onboarding_date, "%Y-%m-%d")
            .expect("onboarding_date is generated as %Y-%m-%d")
    }
}

/// One address row with its insert timestamp. Append-only: every change
/// produces a new row, nothing is edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerAddress {
    pub customer_id: CustomerId,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    /// YYYY-MM-DD HH:MM:SS — reproduced verbatim by lifecycle events.
    pub insert_timestamp_utc: String,
}

pub struct CustomerGenerator;

impl CustomerGenerator {
    /// Generate the population plus one initial address per customer.
    pub fn generate(
        config: &GeneratorConfig,
        rng: &mut StreamRng,
    ) -> (Vec<Customer>, Vec<CustomerAddress>) {
        let anomalous: Vec<usize> =
            rng.sample_indices(config.num_customers, config.num_anomalous_customers());

        let mut customers = Vec::with_capacity(config.num_customers);
        let mut addresses = Vec::with_capacity(config.num_customers);

        for i in 0..config.num_customers {
            let customer_id = format!("CUST_{:05}", i + 1);
            let country = NameGenerator::country(rng);
            let onboarding = Self::onboarding_date(config, rng);

            let customer = Customer {
                customer_id: customer_id.clone(),
                first_name: NameGenerator::first_name(rng).to_string(),
                family_name: NameGenerator::family_name(rng).to_string(),
                date_of_birth: Self::date_of_birth(config, rng),
                onboarding_date: onboarding.format("%Y-%m-%d").to_string(),
                country: country.name.to_string(),
                reporting_currency: country.currency.to_string(),
                account_tier: ACCOUNT_TIERS[rng.pick_weighted(&[40.0, 25.0, 20.0, 10.0, 5.0])]
                    .to_string(),
                employment_type: EMPLOYMENT_TYPES
                    [rng.pick_weighted(&[60.0, 10.0, 10.0, 12.0, 8.0])]
                .to_string(),
                employer: NameGenerator::employer(rng),
                position: NameGenerator::position(rng).to_string(),
                has_anomaly: anomalous.contains(&i),
            };

            // Initial address lands at a business hour on the onboarding day.
            let hour = rng.int_in(9, 17);
            let minute = rng.int_in(0, 59);
            let second = rng.int_in(0, 59);
            addresses.push(CustomerAddress {
                customer_id,
                street_address: NameGenerator::street_address(rng),
                city: NameGenerator::city(rng, country).to_string(),
                state: NameGenerator::region(rng, country).to_string(),
                zipcode: NameGenerator::zipcode(rng),
                country: country.name.to_string(),
                insert_timestamp_utc: format!(
                    "{} {:02}:{:02}:{:02}",
                    customer.onboarding_date, hour, minute, second
                ),
            });

            customers.push(customer);
        }

        log::info!(
            "generated {} customers ({} anomalous)",
            customers.len(),
            anomalous.len()
        );
        (customers, addresses)
    }

    fn onboarding_date(config: &GeneratorConfig, rng: &mut StreamRng) -> NaiveDate {
        // Leave a little room at the end of the period so transactions
        // and updates can follow the onboarding.
        let span = (config.total_days() - 30).max(1);
        config.start_date() + Duration::days(rng.int_in(0, span - 1))
    }

    fn date_of_birth(config: &GeneratorConfig, rng: &mut StreamRng) -> String {
        let age_days = rng.int_in(18 * 365, 85 * 365);
        (config.start_date() - Duration::days(age_days))
            .format("%Y-%m-%d")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{GeneratorSlot, RngBank};

    fn make_population() -> (Vec<Customer>, Vec<CustomerAddress>) {
        let config = GeneratorConfig::default_test();
        let bank = RngBank::new(42);
        let mut rng = bank.for_generator(GeneratorSlot::Customer);
        CustomerGenerator::generate(&config, &mut rng)
    }

    #[test]
    fn anomaly_count_matches_config() {
        let config = GeneratorConfig::default_test();
        let (customers, _) = make_population();
        let flagged = customers.iter().filter(|c| c.has_anomaly).count();
        assert_eq!(flagged, config.num_anomalous_customers());
    }

    #[test]
    fn one_initial_address_per_customer() {
        let (customers, addresses) = make_population();
        assert_eq!(customers.len(), addresses.len());
        for (c, a) in customers.iter().zip(&addresses) {
            assert_eq!(c.customer_id, a.customer_id);
            assert!(a.insert_timestamp_utc.starts_with(&c.onboarding_date));
        }
    }

    #[test]
    fn onboarding_dates_inside_period() {
        let config = GeneratorConfig::default_test();
        let (customers, _) = make_population();
        for c in &customers {
            let d = c.onboarding();
            assert!(d >= config.start_date() && d <= config.end_date());
        }
    }

    #[test]
    fn tier_rank_ordering() {
        assert!(tier_rank("PREMIUM") > tier_rank("GOLD"));
        assert!(tier_rank("GOLD") > tier_rank("STANDARD"));
        assert_eq!(tier_rank("BESPOKE"), 0);
    }
}
