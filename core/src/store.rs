//! CSV persistence for every generated dataset.
//!
//! All filesystem access lives here. Master files sit at the output
//! root; batch feeds live in dated files under `address_updates/` and
//! `customer_updates/`; transactions and lifecycle events are
//! partitioned by date under their own subdirectories. Readers tolerate
//! missing feed directories (a run without updates is valid) but treat
//! missing columns and malformed rows as errors.

use crate::{
    account::Account,
    customer::{Customer, CustomerAddress},
    error::{GenError, GenResult},
    lifecycle::{CustomerStatus, LifecycleEvent},
    transaction::Transaction,
    update_feed::{AddressBatch, AddressRecord, CustomerSnapshot, CustomerUpdateBatch},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

const ADDRESS_UPDATES_DIR: &str = "address_updates";
const CUSTOMER_UPDATES_DIR: &str = "customer_updates";
const TRANSACTIONS_DIR: &str = "transactions";
const EVENTS_DIR: &str = "customer_events";

pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- generic helpers -----------------------------------------------------

    fn write_rows<T: Serialize>(&self, path: &Path, rows: &[T]) -> GenResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_rows<T: DeserializeOwned>(
        &self,
        path: &Path,
        required: &[&str],
    ) -> GenResult<Vec<T>> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        for column in required {
            if !headers.iter().any(|h| h == *column) {
                return Err(GenError::MissingColumn {
                    path: path.display().to_string(),
                    column: (*column).to_string(),
                });
            }
        }
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Dated batch files under `dir`, in filename (chronological) order.
    /// A missing directory yields an empty list.
    fn batch_files(&self, dir: &str, prefix: &str) -> GenResult<Vec<PathBuf>> {
        let dir_path = self.root.join(dir);
        if !dir_path.exists() {
            log::warn!("feed directory not found: {}", dir_path.display());
            return Ok(Vec::new());
        }
        let mut files: Vec<PathBuf> = fs::read_dir(&dir_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(prefix) && n.ends_with(".csv"))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }

    // -- master data ---------------------------------------------------------

    pub fn write_customers(&self, customers: &[Customer]) -> GenResult<()> {
        self.write_rows(&self.root.join("customers.csv"), customers)
    }

    pub fn read_customers(&self) -> GenResult<Vec<Customer>> {
        self.read_rows(
            &self.root.join("customers.csv"),
            &["customer_id", "onboarding_date", "account_tier"],
        )
    }

    pub fn write_initial_addresses(&self, addresses: &[CustomerAddress]) -> GenResult<()> {
        self.write_rows(&self.root.join("customer_addresses.csv"), addresses)
    }

    pub fn write_accounts(&self, accounts: &[Account]) -> GenResult<()> {
        self.write_rows(&self.root.join("accounts.csv"), accounts)
    }

    // -- update feeds --------------------------------------------------------

    pub fn write_address_batches(&self, batches: &[AddressBatch]) -> GenResult<()> {
        for batch in batches {
            let path = self.root.join(ADDRESS_UPDATES_DIR).join(format!(
                "customer_addresses_{}.csv",
                batch.batch_date.format("%Y-%m-%d")
            ));
            self.write_rows(&path, &batch.records)?;
        }
        Ok(())
    }

    pub fn write_update_batches(&self, batches: &[CustomerUpdateBatch]) -> GenResult<()> {
        for batch in batches {
            let path = self.root.join(CUSTOMER_UPDATES_DIR).join(format!(
                "customer_updates_{}.csv",
                batch.batch_date.format("%Y-%m-%d")
            ));
            self.write_rows(&path, &batch.records)?;
        }
        Ok(())
    }

    /// The full address feed: the initial address file followed by every
    /// dated batch. Either part may be absent.
    pub fn read_address_feed(&self) -> GenResult<Vec<AddressRecord>> {
        let mut records: Vec<AddressRecord> = Vec::new();
        let initial = self.root.join("customer_addresses.csv");
        if initial.exists() {
            records.extend(self.read_rows::<AddressRecord>(
                &initial,
                &["customer_id", "country", "insert_timestamp_utc"],
            )?);
        } else {
            log::warn!("initial address file not found: {}", initial.display());
        }
        for path in self.batch_files(ADDRESS_UPDATES_DIR, "customer_addresses_")? {
            records.extend(self.read_rows::<AddressRecord>(
                &path,
                &["customer_id", "country", "insert_timestamp_utc"],
            )?);
        }
        Ok(records)
    }

    /// Full-record customer updates in file order. Order matters: the
    /// consistency engine diffs sequentially.
    pub fn read_update_feed(&self) -> GenResult<Vec<CustomerSnapshot>> {
        let mut records: Vec<CustomerSnapshot> = Vec::new();
        for path in self.batch_files(CUSTOMER_UPDATES_DIR, "customer_updates_")? {
            records.extend(self.read_rows::<CustomerSnapshot>(
                &path,
                &["customer_id", "account_tier", "insert_timestamp_utc"],
            )?);
        }
        Ok(records)
    }

    // -- transactions --------------------------------------------------------

    /// One file per booking date: `transactions_{date}.csv`.
    pub fn write_transactions(&self, transactions: &[Transaction]) -> GenResult<()> {
        let mut by_date: BTreeMap<String, Vec<&Transaction>> = BTreeMap::new();
        for txn in transactions {
            by_date
                .entry(txn.booking_timestamp.format("%Y-%m-%d").to_string())
                .or_default()
                .push(txn);
        }
        for (date, rows) in &by_date {
            let path = self
                .root
                .join(TRANSACTIONS_DIR)
                .join(format!("transactions_{date}.csv"));
            self.write_rows(&path, rows)?;
        }
        Ok(())
    }

    // -- lifecycle outputs ---------------------------------------------------

    /// One file per event date with upper-case headers, matching the
    /// downstream warehouse layout. JSON payloads swap double quotes for
    /// single quotes so the details column never needs CSV escaping.
    pub fn write_events(&self, events: &[LifecycleEvent]) -> GenResult<()> {
        let mut by_date: BTreeMap<&str, Vec<&LifecycleEvent>> = BTreeMap::new();
        for event in events {
            by_date.entry(event.event_date.as_str()).or_default().push(event);
        }
        for (date, rows) in &by_date {
            let path = self
                .root
                .join(EVENTS_DIR)
                .join(format!("customer_events_{date}.csv"));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record([
                "EVENT_ID",
                "CUSTOMER_ID",
                "EVENT_TYPE",
                "EVENT_DATE",
                "EVENT_TIMESTAMP_UTC",
                "CHANNEL",
                "EVENT_DETAILS",
                "PREVIOUS_VALUE",
                "NEW_VALUE",
                "TRIGGERED_BY",
                "REQUIRES_REVIEW",
                "REVIEW_STATUS",
                "REVIEW_DATE",
                "NOTES",
            ])?;
            for event in rows {
                let details = event.event_details.replace('"', "'");
                writer.write_record([
                    event.event_id.as_str(),
                    event.customer_id.as_str(),
                    event.event_type.as_str(),
                    event.event_date.as_str(),
                    event.event_timestamp_utc.as_str(),
                    event.channel.as_str(),
                    details.as_str(),
                    event.previous_value.as_str(),
                    event.new_value.as_str(),
                    event.triggered_by.as_str(),
                    if event.requires_review { "true" } else { "false" },
                    event.review_status.as_str(),
                    event.review_date.as_str(),
                    event.notes.as_str(),
                ])?;
            }
            writer.flush()?;
        }
        Ok(())
    }

    pub fn write_status_history(&self, statuses: &[CustomerStatus]) -> GenResult<()> {
        let path = self.root.join("customer_status.csv");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record([
            "STATUS_ID",
            "CUSTOMER_ID",
            "STATUS",
            "STATUS_REASON",
            "STATUS_START_DATE",
            "STATUS_END_DATE",
            "IS_CURRENT",
            "LINKED_EVENT_ID",
        ])?;
        for status in statuses {
            writer.write_record([
                status.status_id.as_str(),
                status.customer_id.as_str(),
                status.status.as_str(),
                status.status_reason.as_str(),
                status.status_start_date.as_str(),
                status.status_end_date.as_str(),
                if status.is_current { "true" } else { "false" },
                status.linked_event_id.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
