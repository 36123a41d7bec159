//! Core domain logic for the CRM data layer.
//! This crate is the single source of truth for business invariants.

pub mod api;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod validation;

pub use api::{ApiData, ApiRequest, ApiResponse, CrmApi};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::customer::{Customer, CustomerId, NewCustomer};
pub use model::order::{NewOrder, Order, OrderId};
pub use model::product::{NewProduct, Product, ProductId};
pub use repo::crm_repo::{CrmRepository, RepoError, RepoResult, SqliteCrmRepository};
pub use seed::{seed_defaults, SeedReport};
pub use service::customer_service::{BulkCreateError, BulkCreateOutcome, CustomerService};
pub use service::error::CrmServiceError;
pub use service::order_service::OrderService;
pub use service::product_service::ProductService;
pub use validation::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
