//! Cross-file consistency engine: lifecycle events and status history.
//!
//! RULE: every data-driven event copies its source row's
//! `insert_timestamp_utc` into `event_timestamp_utc` verbatim, so the
//! two files join byte for byte. Parsing happens only for ordering and
//! date derivation, never for re-rendering.
//!
//! Events come from four phases, each with its own id range:
//!   1. ONBOARDING, one per customer, synthesized at 10:00:00.
//!   2. ADDRESS_CHANGE, derived from consecutive address feed rows.
//!   3. ACCOUNT_UPGRADE / ACCOUNT_DOWNGRADE / EMPLOYMENT_CHANGE, derived
//!      by diffing the full-record customer update feed.
//!   4. Random filler events (closures, churn, reactivations and a few
//!      synthetic tier or employment changes).
//! The combined stream is sorted by parsed timestamp and then folded
//! into an SCD Type 2 status history.

use crate::{
    config::GeneratorConfig,
    customer::{tier_rank, Customer},
    error::GenResult,
    name_generator::NameGenerator,
    rng::StreamRng,
    types::{CustomerId, EventId, StatusId},
    update_feed::{parse_feed_timestamp, AddressRecord, CustomerSnapshot},
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Onboarding,
    AddressChange,
    AccountUpgrade,
    AccountDowngrade,
    EmploymentChange,
    AccountClose,
    Reactivation,
    Churn,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Onboarding => "ONBOARDING",
            EventType::AddressChange => "ADDRESS_CHANGE",
            EventType::AccountUpgrade => "ACCOUNT_UPGRADE",
            EventType::AccountDowngrade => "ACCOUNT_DOWNGRADE",
            EventType::EmploymentChange => "EMPLOYMENT_CHANGE",
            EventType::AccountClose => "ACCOUNT_CLOSE",
            EventType::Reactivation => "REACTIVATION",
            EventType::Churn => "CHURN",
        }
    }

    /// Whether this event opens a new status history row.
    pub fn changes_status(&self) -> bool {
        matches!(
            self,
            EventType::AccountClose | EventType::Churn | EventType::Reactivation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleEvent {
    pub event_id: EventId,
    pub customer_id: CustomerId,
    pub event_type: EventType,
    pub event_date: String,
    pub event_timestamp_utc: String,
    pub channel: String,
    /// JSON payload, serialized to a string so the CSV layer can apply
    /// its quote convention without re-encoding.
    pub event_details: String,
    pub previous_value: String,
    pub new_value: String,
    pub triggered_by: String,
    pub requires_review: bool,
    pub review_status: String,
    pub review_date: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerStatus {
    pub status_id: StatusId,
    pub customer_id: CustomerId,
    pub status: String,
    pub status_reason: String,
    pub status_start_date: String,
    pub status_end_date: String,
    pub is_current: bool,
    pub linked_event_id: String,
}

// ---------------------------------------------------------------------------
// Channel / actor pools
// ---------------------------------------------------------------------------

const CHANNELS: [&str; 5] = ["ONLINE", "BRANCH", "MOBILE", "PHONE", "SYSTEM"];
const CHANNEL_WEIGHTS: [f64; 5] = [35.0, 25.0, 30.0, 5.0, 5.0];

fn pick_channel(rng: &mut StreamRng) -> &'static str {
    CHANNELS[rng.pick_weighted(&CHANNEL_WEIGHTS)]
}

fn triggered_by(channel: &str, rng: &mut StreamRng) -> String {
    match channel {
        "ONLINE" => (*rng.pick(&["CUSTOMER_SELF_SERVICE", "WEB_PORTAL"])).to_string(),
        "BRANCH" => format!("BRANCH_OFFICER_{:03}", rng.int_in(1, 10)),
        "MOBILE" => (*rng.pick(&["MOBILE_APP", "CUSTOMER_SELF_SERVICE"])).to_string(),
        "PHONE" => format!("CALL_CENTER_AGENT_{:03}", rng.int_in(1, 5)),
        _ => (*rng.pick(&["SYSTEM_AUTO", "BATCH_PROCESSOR", "COMPLIANCE_ENGINE"])).to_string(),
    }
}

fn event_id(counter: usize) -> EventId {
    format!("EVT_{counter:06}")
}

fn status_id(counter: usize) -> StatusId {
    format!("STAT_{counter:06}")
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct LifecycleEngine {
    config: GeneratorConfig,
}

impl LifecycleEngine {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Run all four phases, sort by parsed timestamp, and fold the
    /// result into status history.
    ///
    /// `address_feed` is the initial address file plus every dated batch,
    /// `update_feed` the concatenated snapshot batches. Feed ordering is
    /// not load-bearing: both phases re-sort rows by their embedded
    /// timestamps before diffing.
    pub fn generate(
        &self,
        customers: &[Customer],
        address_feed: &[AddressRecord],
        update_feed: &[CustomerSnapshot],
        rng: &mut StreamRng,
    ) -> GenResult<(Vec<LifecycleEvent>, Vec<CustomerStatus>)> {
        let onboarding = self.onboarding_events(customers, rng);
        let mut counter = onboarding.len() + 1;

        let address_changes = self.address_change_events(customers, address_feed, counter, rng)?;
        counter += address_changes.len();

        let update_events = self.update_diff_events(customers, update_feed, counter, rng)?;
        counter += update_events.len();

        let random_events = self.random_events(customers, counter, rng);

        let mut events: Vec<LifecycleEvent> = onboarding
            .into_iter()
            .chain(address_changes)
            .chain(update_events)
            .chain(random_events)
            .collect();

        // Order by actual event time. String ordering would misplace the
        // ISO-rendered timestamps relative to the plain ones.
        let mut keyed: Vec<(NaiveDateTime, LifecycleEvent)> = events
            .drain(..)
            .map(|e| {
                let parsed = parse_feed_timestamp(
                    &e.event_timestamp_utc,
                    &format!("event {}", e.event_id),
                )?;
                Ok((parsed, e))
            })
            .collect::<GenResult<_>>()?;
        keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.event_id.cmp(&b.1.event_id)));
        let events: Vec<LifecycleEvent> = keyed.into_iter().map(|(_, e)| e).collect();

        let statuses = self.status_history(customers, &events);
        log::info!(
            "generated {} lifecycle events, {} status records",
            events.len(),
            statuses.len()
        );
        Ok((events, statuses))
    }

    // -- Phase 1: onboarding -------------------------------------------------

    fn onboarding_events(&self, customers: &[Customer], rng: &mut StreamRng) -> Vec<LifecycleEvent> {
        customers
            .iter()
            .enumerate()
            .map(|(idx, customer)| {
                let date = customer.onboarding();
                let timestamp = date.and_hms_opt(10, 0, 0).expect("valid time of day");
                let details = json!({
                    "account_types": ["CHECKING"],
                    "initial_deposit": round2(rng.uniform(100.0, 5000.0)),
                    "referral_source": *rng.pick(&["ONLINE_AD", "BRANCH_VISIT", "REFERRAL", "PARTNER"]),
                    "kyc_verified": true,
                    "welcome_package": true,
                });
                let channel =
                    ["ONLINE", "BRANCH", "MOBILE"][rng.pick_weighted(&[40.0, 40.0, 20.0])];
                LifecycleEvent {
                    event_id: event_id(idx + 1),
                    customer_id: customer.customer_id.clone(),
                    event_type: EventType::Onboarding,
                    event_date: date.format(DATE_FORMAT).to_string(),
                    event_timestamp_utc: timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    channel: channel.to_string(),
                    event_details: details.to_string(),
                    previous_value: "PROSPECT".to_string(),
                    new_value: "ACTIVE".to_string(),
                    triggered_by: (*rng.pick(&["CUSTOMER_SELF_SERVICE", "BRANCH_OFFICER_001"]))
                        .to_string(),
                    requires_review: false,
                    review_status: "NOT_REQUIRED".to_string(),
                    review_date: String::new(),
                    notes: "Initial customer onboarding".to_string(),
                }
            })
            .collect()
    }

    // -- Phase 2: address changes --------------------------------------------

    /// Each customer's feed rows are sorted by parsed timestamp; the
    /// first row is the baseline and every later row yields one event.
    /// A customer with n rows therefore yields exactly n-1 events.
    fn address_change_events(
        &self,
        customers: &[Customer],
        address_feed: &[AddressRecord],
        counter_start: usize,
        rng: &mut StreamRng,
    ) -> GenResult<Vec<LifecycleEvent>> {
        let mut by_customer: HashMap<&str, Vec<&AddressRecord>> = HashMap::new();
        for record in address_feed {
            by_customer
                .entry(record.customer_id.as_str())
                .or_default()
                .push(record);
        }

        let mut events = Vec::new();
        let mut counter = counter_start;

        // Iterate in master-record order so event ids are stable.
        for customer in customers {
            let Some(records) = by_customer.get(customer.customer_id.as_str()) else {
                continue;
            };
            let mut keyed: Vec<(NaiveDateTime, &AddressRecord)> = records
                .iter()
                .map(|r| {
                    let parsed = parse_feed_timestamp(
                        &r.insert_timestamp_utc,
                        &format!("address feed, customer {}", r.customer_id),
                    )?;
                    Ok((parsed, *r))
                })
                .collect::<GenResult<_>>()?;
            keyed.sort_by_key(|(parsed, _)| *parsed);

            for window in keyed.windows(2) {
                let (_, old_addr) = &window[0];
                let (new_dt, new_addr) = &window[1];
                let crossed_border = old_addr.country != new_addr.country;

                let details = json!({
                    "old_address": {
                        "street": old_addr.street_address,
                        "city": old_addr.city,
                        "state": old_addr.state,
                        "zipcode": old_addr.zipcode,
                        "country": old_addr.country,
                    },
                    "new_address": {
                        "street": new_addr.street_address,
                        "city": new_addr.city,
                        "state": new_addr.state,
                        "zipcode": new_addr.zipcode,
                        "country": new_addr.country,
                    },
                    "reason": *rng.pick(&["RELOCATION", "MOVING", "ADDRESS_CORRECTION"]),
                    "verified": true,
                });

                events.push(LifecycleEvent {
                    event_id: event_id(counter),
                    customer_id: customer.customer_id.clone(),
                    event_type: EventType::AddressChange,
                    event_date: new_dt.format(DATE_FORMAT).to_string(),
                    // Verbatim source timestamp, not a re-render.
                    event_timestamp_utc: new_addr.insert_timestamp_utc.clone(),
                    channel: pick_channel(rng).to_string(),
                    event_details: details.to_string(),
                    previous_value: truncate(
                        format!("{}, {}", old_addr.street_address, old_addr.city),
                        500,
                    ),
                    new_value: truncate(
                        format!("{}, {}", new_addr.street_address, new_addr.city),
                        500,
                    ),
                    triggered_by: "CUSTOMER_SELF_SERVICE".to_string(),
                    requires_review: crossed_border,
                    review_status: if crossed_border { "PENDING" } else { "NOT_REQUIRED" }
                        .to_string(),
                    review_date: String::new(),
                    notes: "Address change notification received".to_string(),
                });
                counter += 1;
            }
        }
        Ok(events)
    }

    // -- Phase 3: customer update diffs --------------------------------------

    /// Walk the full-record update feed in embedded-timestamp order,
    /// diffing each row against the running per-customer state. Tier
    /// changes become UPGRADE or DOWNGRADE by rank comparison; employer,
    /// position or employment type changes become EMPLOYMENT_CHANGE.
    /// Rows for unknown customers are skipped.
    ///
    /// File order is not trusted here: out-of-order batch files would
    /// silently produce wrong before/after pairs, so rows are re-sorted
    /// by their own timestamps first (stable, so ties keep file order).
    fn update_diff_events(
        &self,
        customers: &[Customer],
        update_feed: &[CustomerSnapshot],
        counter_start: usize,
        rng: &mut StreamRng,
    ) -> GenResult<Vec<LifecycleEvent>> {
        struct AttrState {
            account_tier: String,
            employment_type: String,
            employer: String,
            position: String,
        }

        let mut state: HashMap<CustomerId, AttrState> = customers
            .iter()
            .map(|c| {
                (
                    c.customer_id.clone(),
                    AttrState {
                        account_tier: c.account_tier.clone(),
                        employment_type: c.employment_type.clone(),
                        employer: c.employer.clone(),
                        position: c.position.clone(),
                    },
                )
            })
            .collect();

        let mut keyed: Vec<(NaiveDateTime, &CustomerSnapshot)> =
            Vec::with_capacity(update_feed.len());
        for row in update_feed {
            let parsed = parse_feed_timestamp(
                &row.insert_timestamp_utc,
                &format!("update feed, customer {}", row.customer_id),
            )?;
            keyed.push((parsed, row));
        }
        keyed.sort_by_key(|(parsed, _)| *parsed);

        let mut events = Vec::new();
        let mut counter = counter_start;

        for (event_dt, row) in keyed {
            let Some(prev) = state.get(&row.customer_id) else {
                log::debug!("update feed row for unknown customer {}", row.customer_id);
                continue;
            };
            let event_date = event_dt.format(DATE_FORMAT).to_string();

            if row.account_tier != prev.account_tier {
                let old_rank = tier_rank(&prev.account_tier);
                let new_rank = tier_rank(&row.account_tier);
                let event_type = if new_rank > old_rank {
                    EventType::AccountUpgrade
                } else {
                    EventType::AccountDowngrade
                };
                let direction = if event_type == EventType::AccountUpgrade {
                    "UPGRADE"
                } else {
                    "DOWNGRADE"
                };
                let details = json!({
                    "old_tier": prev.account_tier,
                    "new_tier": row.account_tier,
                    "tier_change_type": direction,
                });
                events.push(LifecycleEvent {
                    event_id: event_id(counter),
                    customer_id: row.customer_id.clone(),
                    event_type,
                    event_date: event_date.clone(),
                    event_timestamp_utc: row.insert_timestamp_utc.clone(),
                    channel: pick_channel(rng).to_string(),
                    event_details: details.to_string(),
                    previous_value: prev.account_tier.clone(),
                    new_value: row.account_tier.clone(),
                    triggered_by: "SYSTEM".to_string(),
                    requires_review: false,
                    review_status: "NOT_REQUIRED".to_string(),
                    review_date: String::new(),
                    notes: format!(
                        "Account tier {} from {} to {}",
                        direction.to_lowercase(),
                        prev.account_tier,
                        row.account_tier
                    ),
                });
                counter += 1;
            }

            if row.employment_type != prev.employment_type
                || row.employer != prev.employer
                || row.position != prev.position
            {
                let old_value = format!("{} ({})", prev.employer, prev.position);
                let new_value = format!("{} ({})", row.employer, row.position);
                let details = json!({
                    "previous_employment": old_value,
                    "new_employment": new_value,
                    "change_type": "EMPLOYMENT_CHANGE",
                });
                events.push(LifecycleEvent {
                    event_id: event_id(counter),
                    customer_id: row.customer_id.clone(),
                    event_type: EventType::EmploymentChange,
                    event_date: event_date.clone(),
                    event_timestamp_utc: row.insert_timestamp_utc.clone(),
                    channel: pick_channel(rng).to_string(),
                    event_details: details.to_string(),
                    previous_value: truncate(old_value, 200),
                    new_value: truncate(new_value, 200),
                    triggered_by: "SYSTEM".to_string(),
                    requires_review: false,
                    review_status: "NOT_REQUIRED".to_string(),
                    review_date: String::new(),
                    notes: "Employment details changed".to_string(),
                });
                counter += 1;
            }

            state.insert(
                row.customer_id.clone(),
                AttrState {
                    account_tier: row.account_tier.clone(),
                    employment_type: row.employment_type.clone(),
                    employer: row.employer.clone(),
                    position: row.position.clone(),
                },
            );
        }
        Ok(events)
    }

    // -- Phase 4: random filler events ---------------------------------------

    fn random_events(
        &self,
        customers: &[Customer],
        counter_start: usize,
        rng: &mut StreamRng,
    ) -> Vec<LifecycleEvent> {
        const TYPES: [EventType; 6] = [
            EventType::EmploymentChange,
            EventType::AccountUpgrade,
            EventType::AccountDowngrade,
            EventType::AccountClose,
            EventType::Reactivation,
            EventType::Churn,
        ];
        const TYPE_WEIGHTS: [f64; 6] = [25.0, 20.0, 15.0, 15.0, 15.0, 10.0];
        const COUNT_WEIGHTS: [f64; 4] = [30.0, 40.0, 25.0, 5.0];

        let horizon = self.config.as_of_date;
        let mut events = Vec::new();
        let mut counter = counter_start;

        for customer in customers {
            let num_events = rng.pick_weighted(&COUNT_WEIGHTS);
            if num_events == 0 {
                continue;
            }
            let mut current = customer.onboarding();
            for _ in 0..num_events {
                let delta = (rng.gauss(180.0, 90.0) as i64).clamp(30, 900);
                current += Duration::days(delta);
                if current > horizon {
                    break;
                }
                let event_type = TYPES[rng.pick_weighted(&TYPE_WEIGHTS)];
                events.push(self.specific_event(counter, customer, event_type, current, rng));
                counter += 1;
            }
        }
        events
    }

    fn specific_event(
        &self,
        counter: usize,
        customer: &Customer,
        event_type: EventType,
        date: NaiveDate,
        rng: &mut StreamRng,
    ) -> LifecycleEvent {
        let channel = pick_channel(rng);
        let actor = triggered_by(channel, rng);
        let timestamp = date
            .and_hms_opt(
                rng.int_in(9, 17) as u32,
                rng.int_in(0, 59) as u32,
                rng.int_in(0, 59) as u32,
            )
            .expect("valid time of day");

        let mut requires_review = false;
        let mut review_status = "NOT_REQUIRED";
        let mut review_date = String::new();

        let (details, previous_value, new_value, notes) = match event_type {
            EventType::EmploymentChange => {
                let old_employer = NameGenerator::employer(rng);
                let new_employer = NameGenerator::employer(rng);
                let details = json!({
                    "old_employer": old_employer,
                    "new_employer": new_employer,
                    "old_position": NameGenerator::position(rng),
                    "new_position": NameGenerator::senior_position(rng),
                    "income_change_percent": round1(rng.uniform(-10.0, 40.0)),
                    "employment_type": *rng.pick(&["FULL_TIME", "PART_TIME", "CONTRACT"]),
                });
                (details, old_employer, new_employer, "Employment status updated")
            }
            EventType::AccountUpgrade => {
                let old_tier = (*rng.pick(&["STANDARD", "SILVER"])).to_string();
                let new_tier = (*rng.pick(&["GOLD", "PLATINUM", "PREMIUM"])).to_string();
                let details = json!({
                    "old_tier": old_tier,
                    "new_tier": new_tier,
                    "upgrade_reason": *rng.pick(&[
                        "BALANCE_THRESHOLD", "RELATIONSHIP_VALUE", "CUSTOMER_REQUEST",
                    ]),
                    "new_benefits": sample_benefits(rng),
                    "annual_fee": round2(rng.uniform(0.0, 100.0)),
                });
                (details, old_tier, new_tier, "Account tier upgraded")
            }
            EventType::AccountDowngrade => {
                let old_tier = (*rng.pick(&["GOLD", "PLATINUM", "PREMIUM"])).to_string();
                let new_tier = (*rng.pick(&["STANDARD", "SILVER"])).to_string();
                let details = json!({
                    "old_tier": old_tier,
                    "new_tier": new_tier,
                    "downgrade_reason": *rng.pick(&[
                        "BALANCE_BELOW_THRESHOLD", "CUSTOMER_REQUEST", "FEE_REDUCTION", "INACTIVITY",
                    ]),
                    "removed_benefits": sample_benefits(rng),
                    "annual_fee": 0.0,
                });
                (details, old_tier, new_tier, "Account tier downgraded")
            }
            EventType::AccountClose => {
                requires_review = true;
                review_status = "APPROVED";
                review_date = (date + Duration::days(1)).format(DATE_FORMAT).to_string();
                let details = json!({
                    "closure_reason": *rng.pick(&[
                        "VOLUNTARY", "DUPLICATE_ACCOUNT", "MOVING_ABROAD", "DISSATISFACTION",
                    ]),
                    "final_balance": round2(rng.uniform(0.0, 1000.0)),
                    "outstanding_items": rng.int_in(0, 2),
                    "survey_completed": rng.chance(0.5),
                });
                (
                    details,
                    "ACTIVE".to_string(),
                    "CLOSED".to_string(),
                    "Account closure processed",
                )
            }
            EventType::Reactivation => {
                requires_review = true;
                review_status = "APPROVED";
                review_date = (date + Duration::days(1)).format(DATE_FORMAT).to_string();
                let details = json!({
                    "reactivation_reason": *rng.pick(&[
                        "RETURNING_CUSTOMER", "SERVICE_IMPROVEMENT", "PROMOTIONAL_OFFER",
                    ]),
                    "dormant_period_days": rng.int_in(200, 500),
                    "reactivation_offer": *rng.pick(&[
                        "NO_FEE_3_MONTHS", "BONUS_INTEREST", "GIFT_CARD",
                    ]),
                });
                (
                    details,
                    "CLOSED".to_string(),
                    "REACTIVATED".to_string(),
                    "Customer reactivation approved",
                )
            }
            _ => {
                let details = json!({
                    "churn_reason": *rng.pick(&[
                        "COMPETITOR_OFFER", "POOR_SERVICE", "FEES_TOO_HIGH", "MOVED_ABROAD",
                    ]),
                    "retention_attempted": rng.chance(0.5),
                    "final_survey_score": rng.int_in(1, 5),
                });
                (
                    details,
                    "ACTIVE".to_string(),
                    "CHURNED".to_string(),
                    "Customer churned",
                )
            }
        };

        LifecycleEvent {
            event_id: event_id(counter),
            customer_id: customer.customer_id.clone(),
            event_type,
            event_date: date.format(DATE_FORMAT).to_string(),
            event_timestamp_utc: timestamp.format(TIMESTAMP_FORMAT).to_string(),
            channel: channel.to_string(),
            event_details: details.to_string(),
            previous_value,
            new_value,
            triggered_by: actor,
            requires_review,
            review_status: review_status.to_string(),
            review_date,
            notes: notes.to_string(),
        }
    }

    // -- SCD Type 2 fold -----------------------------------------------------

    /// One ACTIVE row per customer at onboarding, then a new row for
    /// every status-changing event. Closing always targets the
    /// customer's own current row, and exactly one row per customer is
    /// left with `is_current = true`.
    fn status_history(
        &self,
        customers: &[Customer],
        events: &[LifecycleEvent],
    ) -> Vec<CustomerStatus> {
        let mut by_customer: HashMap<&str, Vec<&LifecycleEvent>> = HashMap::new();
        for event in events {
            by_customer
                .entry(event.customer_id.as_str())
                .or_default()
                .push(event);
        }

        let mut statuses = Vec::new();
        let mut counter = 1;

        for customer in customers {
            let customer_events = by_customer
                .get(customer.customer_id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let onboarding_event = customer_events
                .iter()
                .find(|e| e.event_type == EventType::Onboarding);

            statuses.push(CustomerStatus {
                status_id: status_id(counter),
                customer_id: customer.customer_id.clone(),
                status: "ACTIVE".to_string(),
                status_reason: "INITIAL_ONBOARDING".to_string(),
                status_start_date: customer.onboarding_date.clone(),
                status_end_date: String::new(),
                is_current: true,
                linked_event_id: onboarding_event
                    .map(|e| e.event_id.clone())
                    .unwrap_or_default(),
            });
            counter += 1;
            let mut current_row = statuses.len() - 1;

            for event in customer_events {
                if !event.event_type.changes_status() {
                    continue;
                }
                statuses[current_row].status_end_date = event.event_date.clone();
                statuses[current_row].is_current = false;

                let status = if event.event_type == EventType::Reactivation {
                    "REACTIVATED"
                } else {
                    "CLOSED"
                };
                statuses.push(CustomerStatus {
                    status_id: status_id(counter),
                    customer_id: customer.customer_id.clone(),
                    status: status.to_string(),
                    status_reason: format!("{}_EVENT", event.event_type.as_str()),
                    status_start_date: event.event_date.clone(),
                    status_end_date: String::new(),
                    is_current: true,
                    linked_event_id: event.event_id.clone(),
                });
                counter += 1;
                current_row = statuses.len() - 1;
            }
        }
        statuses
    }
}

fn sample_benefits(rng: &mut StreamRng) -> Vec<&'static str> {
    const BENEFITS: [&str; 4] = [
        "FREE_TRANSFERS",
        "INTEREST_RATE_BONUS",
        "PRIORITY_SUPPORT",
        "TRAVEL_INSURANCE",
    ];
    rng.sample_indices(BENEFITS.len(), 2)
        .into_iter()
        .map(|i| BENEFITS[i])
        .collect()
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        s.truncate(max);
    }
    s
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_formats() {
        assert_eq!(event_id(7), "EVT_000007");
        assert_eq!(status_id(123), "STAT_000123");
    }

    #[test]
    fn status_changing_types() {
        assert!(EventType::AccountClose.changes_status());
        assert!(EventType::Churn.changes_status());
        assert!(EventType::Reactivation.changes_status());
        assert!(!EventType::AddressChange.changes_status());
        assert!(!EventType::Onboarding.changes_status());
    }

    #[test]
    fn triggered_by_matches_channel() {
        let mut rng = StreamRng::new(11, 6);
        for _ in 0..20 {
            let actor = triggered_by("BRANCH", &mut rng);
            assert!(actor.starts_with("BRANCH_OFFICER_"));
            let actor = triggered_by("PHONE", &mut rng);
            assert!(actor.starts_with("CALL_CENTER_AGENT_"));
        }
    }
}
