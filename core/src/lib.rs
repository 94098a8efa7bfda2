//! synthbank-core: deterministic synthetic retail-banking data generator.
//!
//! Produces a consistent set of CSV datasets (customers, accounts,
//! transactions, update feeds, lifecycle events, status history) from a
//! single master seed. Anomalous transaction behavior is injected
//! through per-customer anomaly profiles, and the lifecycle engine
//! derives events from the written feeds with exact timestamp matching.

pub mod account;
pub mod anomaly;
pub mod config;
pub mod customer;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod name_generator;
pub mod rng;
pub mod store;
pub mod transaction;
pub mod types;
pub mod update_feed;
