//! Idempotent demo data loader.
//!
//! # Invariants
//! - Customers are keyed by email, products by name.
//! - Running the loader any number of times leaves exactly one row per key.
//! - All inserts of one run commit together.

use crate::model::customer::NewCustomer;
use crate::model::product::NewProduct;
use crate::repo::crm_repo::{CrmRepository, RepoResult};
use log::info;
use rust_decimal::Decimal;

/// Counts of what one loader run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub customers_created: usize,
    pub customers_existing: usize,
    pub products_created: usize,
    pub products_existing: usize,
}

/// Fixed demo customers.
pub fn default_customers() -> Vec<NewCustomer> {
    vec![
        NewCustomer::new("Alice", "alice@example.com").with_phone("+1234567890"),
        NewCustomer::new("Bob", "bob@example.com"),
    ]
}

/// Fixed demo products.
pub fn default_products() -> Vec<NewProduct> {
    vec![
        NewProduct::new("Laptop", Decimal::new(99999, 2)).with_stock(10),
        NewProduct::new("Mouse", Decimal::new(2550, 2)).with_stock(100),
    ]
}

/// Loads the demo customers and products, creating only what is absent.
pub fn seed_defaults<R: CrmRepository>(repo: &R) -> RepoResult<SeedReport> {
    seed(repo, &default_customers(), &default_products())
}

/// Loads `customers` and `products`, creating only what is absent.
pub fn seed<R: CrmRepository>(
    repo: &R,
    customers: &[NewCustomer],
    products: &[NewProduct],
) -> RepoResult<SeedReport> {
    let report = repo.run_in_transaction(|repo| -> RepoResult<SeedReport> {
        let mut report = SeedReport::default();
        for customer in customers {
            if repo.find_customer_by_email(&customer.email)?.is_some() {
                report.customers_existing += 1;
            } else {
                repo.insert_customer(customer)?;
                report.customers_created += 1;
            }
        }
        for product in products {
            if repo.find_product_by_name(&product.name)?.is_some() {
                report.products_existing += 1;
            } else {
                repo.insert_product(product)?;
                report.products_created += 1;
            }
        }
        Ok(report)
    })?;

    info!(
        "event=seed module=seed status=ok customers_created={} customers_existing={} products_created={} products_existing={}",
        report.customers_created,
        report.customers_existing,
        report.products_created,
        report.products_existing
    );
    Ok(report)
}
