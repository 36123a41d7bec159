//! Service error shared by every CRM mutation and query.

use crate::model::customer::CustomerId;
use crate::model::product::ProductId;
use crate::repo::crm_repo::RepoError;
use crate::validation::ValidationError;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure of a CRM use-case.
#[derive(Debug)]
pub enum CrmServiceError {
    /// Name is blank after trim.
    EmptyName,
    /// Another customer already owns this email.
    DuplicateEmail(String),
    /// Phone is set but does not match an accepted shape.
    InvalidPhoneFormat(String),
    /// Product price is zero or negative.
    InvalidPrice(Decimal),
    /// Product stock is negative.
    InvalidStock(i64),
    /// Order references a customer that does not exist.
    CustomerNotFound(CustomerId),
    /// Order carries no product ids.
    EmptyProductList,
    /// Order references products that do not exist.
    ProductsNotFound(Vec<ProductId>),
    /// Order total does not fit the decimal range.
    TotalOverflow,
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl CrmServiceError {
    /// Stable machine-readable code used in logs and API envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::DuplicateEmail(_) => "duplicate_email",
            Self::InvalidPhoneFormat(_) => "invalid_phone_format",
            Self::InvalidPrice(_) => "invalid_price",
            Self::InvalidStock(_) => "invalid_stock",
            Self::CustomerNotFound(_) => "customer_not_found",
            Self::EmptyProductList => "empty_product_list",
            Self::ProductsNotFound(_) => "products_not_found",
            Self::TotalOverflow => "total_overflow",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::Repo(_) => "storage_error",
        }
    }

    /// Whether this is a business-rule rejection rather than an
    /// infrastructure failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::InconsistentState(_) | Self::Repo(_))
    }
}

impl Display for CrmServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name must not be blank"),
            Self::DuplicateEmail(_) => write!(f, "Email already exists"),
            Self::InvalidPhoneFormat(_) => write!(f, "Invalid phone format"),
            Self::InvalidPrice(_) => write!(f, "Price must be positive"),
            Self::InvalidStock(_) => write!(f, "Stock cannot be negative"),
            Self::CustomerNotFound(id) => write!(f, "Customer not found: {id}"),
            Self::EmptyProductList => write!(f, "At least one product must be selected"),
            Self::ProductsNotFound(ids) => {
                let ids = ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Products not found: {ids}")
            }
            Self::TotalOverflow => write!(f, "Order total exceeds the supported amount"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CrmServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CrmServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ValidationError> for CrmServiceError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::EmptyName => Self::EmptyName,
            ValidationError::InvalidPhoneFormat(phone) => Self::InvalidPhoneFormat(phone),
            ValidationError::InvalidPrice(price) => Self::InvalidPrice(price),
            ValidationError::InvalidStock(stock) => Self::InvalidStock(stock),
            ValidationError::TotalOverflow => Self::TotalOverflow,
        }
    }
}
