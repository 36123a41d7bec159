//! Validation helpers shared by CRM services.
//!
//! # Responsibility
//! - Pure field checks: name, phone format, price and stock bounds.
//! - Repository-backed checks: email availability, product resolution.
//!
//! # Invariants
//! - No helper here writes to storage.
//! - Phone digits are ASCII only; Unicode digit classes are not accepted.

use crate::model::product::{Product, ProductId};
use crate::repo::crm_repo::{CrmRepository, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\+[0-9]{10,15}|[0-9]{3}-[0-9]{3}-[0-9]{4})$").expect("valid phone regex")
});

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is empty after trim.
    EmptyName,
    /// Phone matches neither `+` and 10-15 digits nor `DDD-DDD-DDDD`.
    InvalidPhoneFormat(String),
    /// Price is zero or negative.
    InvalidPrice(Decimal),
    /// Stock is negative.
    InvalidStock(i64),
    /// Sum of prices exceeds the decimal range.
    TotalOverflow,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be blank"),
            Self::InvalidPhoneFormat(_) => write!(f, "Invalid phone format"),
            Self::InvalidPrice(price) => write!(f, "Price must be positive, got {price}"),
            Self::InvalidStock(stock) => write!(f, "Stock cannot be negative, got {stock}"),
            Self::TotalOverflow => write!(f, "Order total exceeds the supported amount"),
        }
    }
}

impl Error for ValidationError {}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

/// Accepts `+` followed by 10 to 15 digits, or `DDD-DDD-DDDD`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneFormat(phone.to_string()))
    }
}

pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::InvalidPrice(price));
    }
    Ok(())
}

pub fn validate_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::InvalidStock(stock));
    }
    Ok(())
}

/// Returns whether no persisted customer holds `email`.
///
/// Check-then-act: callers must still treat a storage unique conflict as
/// authoritative.
pub fn email_is_available<R: CrmRepository>(repo: &R, email: &str) -> RepoResult<bool> {
    Ok(!repo.customer_email_exists(email)?)
}

/// Drops repeated ids while keeping first-seen order.
pub fn dedupe_product_ids(ids: &[ProductId]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Returns the requested ids that are absent from `resolved`, in request order.
pub fn missing_product_ids(requested: &[ProductId], resolved: &[Product]) -> Vec<ProductId> {
    let found: HashSet<ProductId> = resolved.iter().map(|product| product.id).collect();
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

/// Sums product prices; the empty sum is zero.
///
/// # Errors
/// - `TotalOverflow` when the sum leaves the `Decimal` range.
pub fn total_price(products: &[Product]) -> Result<Decimal, ValidationError> {
    products
        .iter()
        .try_fold(Decimal::ZERO, |total, product| total.checked_add(product.price))
        .ok_or(ValidationError::TotalOverflow)
}
