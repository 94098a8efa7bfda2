//! Base transaction generator with anomaly gating.
//!
//! Walks the generation period day by day (weekdays only), draws
//! Poisson-distributed per-customer counts, and hands each base
//! transaction to the anomaly engine when the customer carries a profile.
//! Volume anomalies (high frequency, rapid succession) are realized here
//! as same-day bursts; shape anomalies are realized by the engine's
//! mutations.

use crate::{
    account::{Account, AccountGenerator},
    anomaly::{AnomalyEngine, AnomalyProfile, AnomalyType},
    config::GeneratorConfig,
    customer::Customer,
    rng::StreamRng,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Serialize, Serializer};
use std::collections::HashMap;

fn serialize_booking<S: Serializer>(dt: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn serialize_date<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&d.format("%Y-%m-%d").to_string())
}

/// A single payment transaction. Ephemeral: built, possibly mutated by the
/// anomaly engine, serialized, discarded.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    #[serde(serialize_with = "serialize_booking")]
    pub booking_timestamp: NaiveDateTime,
    #[serde(serialize_with = "serialize_date")]
    pub value_date: NaiveDate,
    /// Signed: positive incoming, negative outgoing.
    pub amount: f64,
    pub currency: String,
    /// Amount converted to the run's base currency, same sign.
    pub base_amount: f64,
    pub base_currency: String,
    pub fx_rate: f64,
    pub counterparty_account: String,
    pub description: String,
}

impl Transaction {
    /// Replace the amount magnitude, preserving direction, and keep the
    /// base-currency figure consistent.
    pub fn set_amount_magnitude(&mut self, magnitude: f64) {
        let sign = if self.amount < 0.0 { -1.0 } else { 1.0 };
        self.amount = round2(sign * magnitude);
        self.base_amount = round2(self.amount * self.fx_rate);
    }

    /// Whether any anomaly marker was appended to the description.
    pub fn is_tagged(&self) -> bool {
        self.description.contains('[')
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Indicative FX rates to USD. Realism is a non-goal; the jitter exists
/// only so base amounts are not perfectly collinear with amounts.
fn fx_rate_to_usd(currency: &str) -> f64 {
    match currency {
        "USD" => 1.0,
        "EUR" => 1.08,
        "GBP" => 1.26,
        "JPY" => 0.0067,
        "CAD" => 0.73,
        "PLN" => 0.25,
        "SEK" => 0.095,
        "NOK" => 0.094,
        "DKK" => 0.145,
        _ => 1.0,
    }
}

fn add_business_days(mut date: NaiveDate, n: i64) -> NaiveDate {
    let mut remaining = n;
    while remaining > 0 {
        date += Duration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

const INCOMING_PREFIXES: [&str; 5] = ["PAYROLL_", "VENDOR_", "CLIENT_", "INVEST_", "BANK_"];
const OUTGOING_PREFIXES: [&str; 5] = ["SUPPLIER_", "UTILITY_", "LOAN_", "INVEST_", "TRANSFER_"];

const INCOMING_DESCRIPTIONS: [&str; 8] = [
    "Salary payment",
    "Client payment for services",
    "Investment dividend",
    "Insurance claim payment",
    "Refund payment",
    "Freelance payment",
    "Rental income",
    "Interest payment",
];

const OUTGOING_DESCRIPTIONS: [&str; 8] = [
    "Utility payment",
    "Rent payment",
    "Supplier invoice",
    "Loan repayment",
    "Insurance premium",
    "Subscription fee",
    "Online purchase",
    "Standing order transfer",
];

pub struct TransactionGenerator {
    config: GeneratorConfig,
    engine: AnomalyEngine,
}

impl TransactionGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let engine = AnomalyEngine::new(config.clone());
        Self { config, engine }
    }

    /// Generate the full transaction history for the period.
    pub fn generate(
        &self,
        customers: &[Customer],
        accounts_by_customer: &HashMap<String, Vec<Account>>,
        profiles: &HashMap<String, AnomalyProfile>,
        rng: &mut StreamRng,
    ) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        let mut day = self.config.start_date();

        while day <= self.config.end_date() {
            // Normal traffic books on business days only; anomalous
            // bookings may drift onto weekends via the OFF_HOURS mutation.
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                self.generate_daily(
                    day,
                    customers,
                    accounts_by_customer,
                    profiles,
                    rng,
                    &mut transactions,
                );
            }
            day += Duration::days(1);
        }

        log::info!("generated {} transactions", transactions.len());
        transactions
    }

    fn generate_daily(
        &self,
        day: NaiveDate,
        customers: &[Customer],
        accounts_by_customer: &HashMap<String, Vec<Account>>,
        profiles: &HashMap<String, AnomalyProfile>,
        rng: &mut StreamRng,
        out: &mut Vec<Transaction>,
    ) {
        for customer in customers {
            if day < customer.onboarding() {
                continue;
            }

            let accounts = accounts_by_customer
                .get(&customer.customer_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let profile = profiles.get(&customer.customer_id);

            // Volume anomalies first: a burst replaces the day's normal
            // traffic for this customer.
            if let Some(profile) = profile {
                let day_types = self.engine.select_applicable(profile, day, rng);
                if day_types.contains(&AnomalyType::HighFrequency) {
                    let count = rng.int_in(5, profile.high_frequency_threshold);
                    for _ in 0..count {
                        let mut txn = self.single(customer, accounts, day, rng);
                        if rng.chance(0.4) {
                            txn = self.engine.apply(txn, &day_types, profile, rng);
                        }
                        out.push(txn);
                    }
                    continue;
                }
                if day_types.contains(&AnomalyType::RapidSuccession) {
                    // A tight cluster: consecutive bookings minutes apart.
                    let count = rng.int_in(3, 6);
                    let mut booking = self.booking_time(day, rng);
                    for _ in 0..count {
                        let mut txn = self.single(customer, accounts, day, rng);
                        txn.booking_timestamp = booking;
                        txn = self.engine.apply(txn, &day_types, profile, rng);
                        out.push(txn);
                        booking += Duration::minutes(rng.int_in(1, 7));
                    }
                    continue;
                }
            }

            // Regular traffic: Poisson over business days, with a rescue
            // roll so quiet customers still show some activity.
            let daily_rate = self.config.avg_transactions_per_customer_per_month / 22.0;
            let mut count = rng.poisson(daily_rate);
            if count == 0 && rng.chance(0.3) {
                count = 1;
            }
            count = count.min(8);

            for _ in 0..count {
                let mut txn = self.single(customer, accounts, day, rng);
                if let Some(profile) = profile {
                    let types = self.engine.select_applicable(profile, day, rng);
                    if !types.is_empty() {
                        txn = self.engine.apply(txn, &types, profile, rng);
                    }
                }
                out.push(txn);
            }
        }
    }

    fn single(
        &self,
        customer: &Customer,
        accounts: &[Account],
        day: NaiveDate,
        rng: &mut StreamRng,
    ) -> Transaction {
        let account_id = AccountGenerator::select_for_transaction(accounts, rng)
            .map(|a| a.account_id.clone())
            // Stale population rows without accounts still transact.
            .unwrap_or_else(|| format!("{}_CHECKING_01", customer.customer_id));

        let booking = self.booking_time(day, rng);
        let is_incoming = rng.chance(0.5);
        let currency = rng.pick(&self.config.available_currencies).clone();

        let raw_amount = self.amount(rng);
        let counterparty = Self::counterparty(is_incoming, rng);
        let description = if is_incoming {
            (*rng.pick(&INCOMING_DESCRIPTIONS)).to_string()
        } else {
            (*rng.pick(&OUTGOING_DESCRIPTIONS)).to_string()
        };

        // Same-currency payments settle same or next business day;
        // cross-currency ones take one or two.
        let settle_days = if currency == self.config.base_currency {
            rng.int_in(0, 1)
        } else {
            rng.int_in(1, 2)
        };
        let value_date = add_business_days(booking.date(), settle_days);

        let fx_rate = fx_rate_to_usd(&currency) * rng.uniform(0.98, 1.02);
        let sign = if is_incoming { 1.0 } else { -1.0 };
        let amount = round2(sign * raw_amount);

        Transaction {
            transaction_id: format!("TXN_{:012X}", rng.next_u64() & 0xFFFF_FFFF_FFFF),
            account_id,
            booking_timestamp: booking,
            value_date,
            amount,
            currency,
            base_amount: round2(amount * fx_rate),
            base_currency: self.config.base_currency.clone(),
            fx_rate: (fx_rate * 1e6).round() / 1e6,
            counterparty_account: counterparty,
            description,
        }
    }

    /// Business-hours booking time, peaking late afternoon UTC.
    fn booking_time(&self, day: NaiveDate, rng: &mut StreamRng) -> NaiveDateTime {
        let hours = [14u32, 15, 16, 17, 18, 19, 20, 21];
        let hour = hours[rng.pick_weighted(&[1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 4.0, 3.0])];
        day.and_hms_opt(hour, rng.int_in(0, 59) as u32, rng.int_in(0, 59) as u32)
            .expect("valid time of day")
    }

    /// Log-normal amounts clamped to the configured range.
    fn amount(&self, rng: &mut StreamRng) -> f64 {
        rng.lognormal(6.5, 1.2)
            .clamp(
                self.config.min_transaction_amount,
                self.config.max_transaction_amount,
            )
    }

    fn counterparty(is_incoming: bool, rng: &mut StreamRng) -> String {
        let prefix = if is_incoming {
            *rng.pick(&INCOMING_PREFIXES)
        } else {
            *rng.pick(&OUTGOING_PREFIXES)
        };
        format!("{prefix}{:010}", rng.int_in(1_000_000_000, 9_999_999_999))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_day_arithmetic_skips_weekends() {
        // 2024-01-05 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            add_business_days(friday, 1),
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
        );
        assert_eq!(
            add_business_days(friday, 2),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
        );
        assert_eq!(add_business_days(friday, 0), friday);
    }

    #[test]
    fn magnitude_update_preserves_direction() {
        let mut txn = Transaction {
            transaction_id: "TXN_000000000001".into(),
            account_id: "CUST_00001_CHECKING_01".into(),
            booking_timestamp: NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap(),
            value_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            amount: -250.0,
            currency: "EUR".into(),
            base_amount: -270.0,
            base_currency: "USD".into(),
            fx_rate: 1.08,
            counterparty_account: "SUPPLIER_0000000001".into(),
            description: "Supplier invoice".into(),
        };
        txn.set_amount_magnitude(10_000.0);
        assert_eq!(txn.amount, -10_000.0);
        assert_eq!(txn.base_amount, -10_800.0);
    }
}
