//! Shared primitive types used across the entire generator.

/// A stable, unique customer identifier (`CUST_00001`, ...).
pub type CustomerId = String;

/// A stable, unique account identifier (`CUST_00001_CHECKING_01`, ...).
pub type AccountId = String;

/// A lifecycle event identifier (`EVT_000001`, ...).
pub type EventId = String;

/// A status-history row identifier (`STAT_000001`, ...).
pub type StatusId = String;
