//! Product use-case service.
//!
//! # Invariants
//! - Price must be strictly positive and stock non-negative before insert.

use crate::model::product::{NewProduct, Product, ProductId};
use crate::repo::crm_repo::{CrmRepository, RepoResult};
use crate::service::error::CrmServiceError;
use crate::service::log_failure;
use crate::validation::{validate_name, validate_price, validate_stock};
use log::info;

/// Use-case service for product records.
pub struct ProductService<R: CrmRepository> {
    repo: R,
}

impl<R: CrmRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one product; missing stock defaults to zero.
    ///
    /// # Errors
    /// - `EmptyName`, `InvalidPrice`, `InvalidStock` before any write.
    /// - `Repo` for storage failures.
    pub fn create_product(&self, input: &NewProduct) -> Result<Product, CrmServiceError> {
        let result = self.create_validated(input);
        match &result {
            Ok(product) => info!(
                "event=product_create module=service status=ok product_id={} stock={}",
                product.id, product.stock
            ),
            Err(err) => log_failure("product_create", err),
        }
        result
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.get_product(id)
    }

    pub fn list_products(&self) -> RepoResult<Vec<Product>> {
        self.repo.list_products()
    }

    fn create_validated(&self, input: &NewProduct) -> Result<Product, CrmServiceError> {
        validate_name(&input.name)?;
        validate_price(input.price)?;
        validate_stock(input.effective_stock())?;
        Ok(self.repo.insert_product(input)?)
    }
}
