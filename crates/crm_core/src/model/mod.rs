//! CRM domain model.
//!
//! # Responsibility
//! - Define customer/product/order records returned by repositories.
//! - Define creation inputs accepted by services and the API layer.
//!
//! # Invariants
//! - Every record is identified by a UUID assigned on creation.
//! - Records are never updated or deleted once created.

pub mod customer;
pub mod order;
pub mod product;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
