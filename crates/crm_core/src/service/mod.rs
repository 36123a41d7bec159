//! CRM use-case services.
//!
//! # Responsibility
//! - Compose validation and repository calls into mutation/query handlers.
//! - Keep the API layer decoupled from storage details.
//!
//! # Invariants
//! - Validation failures are detected before any write.
//! - Every mutation reports failures through `CrmServiceError`.

pub mod customer_service;
pub mod error;
pub mod order_service;
pub mod product_service;

use log::{info, warn};

pub use error::CrmServiceError;

/// Logs a failed use-case. Rejections are routine; storage failures warn.
pub(crate) fn log_failure(event: &str, err: &CrmServiceError) {
    if err.is_rejection() {
        info!(
            "event={event} module=service status=rejected error_code={}",
            err.code()
        );
    } else {
        warn!(
            "event={event} module=service status=error error_code={} error={}",
            err.code(),
            err
        );
    }
}
