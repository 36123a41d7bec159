//! Customer use-case service.
//!
//! # Responsibility
//! - Create customers one at a time or as an all-or-nothing batch.
//! - List customers.
//!
//! # Invariants
//! - Email uniqueness is checked before insert; a storage unique conflict
//!   is reported as `DuplicateEmail` as well.
//! - Batch records are checked against the state inside the running
//!   transaction, so a batch cannot introduce the same email twice.
//! - A batch commits every accepted record or none of them.

use crate::model::customer::{Customer, NewCustomer};
use crate::repo::crm_repo::{CrmRepository, RepoError, RepoResult};
use crate::service::error::CrmServiceError;
use crate::service::log_failure;
use crate::validation::{email_is_available, validate_name, validate_phone};
use log::{info, warn};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Success message returned alongside a created customer.
pub const CUSTOMER_CREATED_MESSAGE: &str = "Customer created successfully";

/// One rejected record of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateError {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    /// Phone for phone-format failures, email otherwise.
    pub identifier: String,
    pub reason: String,
    pub code: &'static str,
}

impl Display for BulkCreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.identifier, self.reason)
    }
}

/// Result of a committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkCreateOutcome {
    /// Created customers in submission order.
    pub created: Vec<Customer>,
    /// Rejected records in submission order.
    pub errors: Vec<BulkCreateError>,
}

impl BulkCreateOutcome {
    /// Errors rendered as `"<identifier>: <reason>"`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Use-case service for customer records.
pub struct CustomerService<R: CrmRepository> {
    repo: R,
}

impl<R: CrmRepository> CustomerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one customer.
    ///
    /// # Errors
    /// - `EmptyName`, `DuplicateEmail`, `InvalidPhoneFormat` for rejected
    ///   input; nothing is written.
    /// - `Repo` for storage failures.
    pub fn create_customer(&self, input: &NewCustomer) -> Result<Customer, CrmServiceError> {
        match create_customer_in(&self.repo, input) {
            Ok(customer) => {
                info!(
                    "event=customer_create module=service status=ok customer_id={}",
                    customer.id
                );
                Ok(customer)
            }
            Err(err) => {
                log_failure("customer_create", &err);
                Err(err)
            }
        }
    }

    /// Creates customers in submission order inside one transaction.
    ///
    /// Rejected records are skipped and listed in the outcome; processing
    /// never stops early because of them. A batch with zero accepted
    /// records is still `Ok`.
    ///
    /// # Errors
    /// - `Repo` when storage fails (including commit). No record of the
    ///   batch persists in that case.
    pub fn bulk_create_customers(
        &self,
        inputs: &[NewCustomer],
    ) -> Result<BulkCreateOutcome, CrmServiceError> {
        let outcome = self.repo.run_in_transaction(|repo| {
            let mut outcome = BulkCreateOutcome::default();
            for (index, input) in inputs.iter().enumerate() {
                match create_customer_in(repo, input) {
                    Ok(customer) => outcome.created.push(customer),
                    Err(err) if err.is_rejection() => {
                        outcome.errors.push(BulkCreateError {
                            index,
                            identifier: rejection_identifier(input, &err),
                            reason: err.to_string(),
                            code: err.code(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(outcome)
        });

        match outcome {
            Ok(outcome) => {
                info!(
                    "event=customer_bulk_create module=service status=ok submitted={} created={} rejected={}",
                    inputs.len(),
                    outcome.created.len(),
                    outcome.errors.len()
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    "event=customer_bulk_create module=service status=error submitted={} error_code={} error={}",
                    inputs.len(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Lists all customers in insertion order.
    pub fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.repo.list_customers()
    }
}

fn create_customer_in<R: CrmRepository>(
    repo: &R,
    input: &NewCustomer,
) -> Result<Customer, CrmServiceError> {
    validate_name(&input.name)?;
    if !email_is_available(repo, &input.email)? {
        return Err(CrmServiceError::DuplicateEmail(input.email.clone()));
    }
    if let Some(phone) = input.normalized_phone() {
        validate_phone(phone)?;
    }

    repo.insert_customer(input).map_err(|err| match err {
        RepoError::UniqueViolation {
            table: "customers",
            column: "email",
        } => CrmServiceError::DuplicateEmail(input.email.clone()),
        other => CrmServiceError::Repo(other),
    })
}

fn rejection_identifier(input: &NewCustomer, err: &CrmServiceError) -> String {
    match err {
        CrmServiceError::InvalidPhoneFormat(phone) => phone.clone(),
        _ => input.email.clone(),
    }
}
