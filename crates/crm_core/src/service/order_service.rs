//! Order use-case service.
//!
//! # Responsibility
//! - Create orders linking one customer to a set of products.
//! - Read orders back with their linked products.
//!
//! # Invariants
//! - The customer and every requested product must exist; a partially
//!   resolvable product list is rejected as a whole.
//! - Repeated product ids are collapsed before totals are computed.
//! - `total_amount` snapshots the prices seen at creation time.
//! - The order row and its product links are written in one transaction.

use crate::model::now_epoch_ms;
use crate::model::order::{NewOrder, Order, OrderDraft, OrderId};
use crate::repo::crm_repo::{CrmRepository, RepoResult};
use crate::service::error::CrmServiceError;
use crate::service::log_failure;
use crate::validation::{dedupe_product_ids, missing_product_ids, total_price};
use log::info;

/// Use-case service for order records.
pub struct OrderService<R: CrmRepository> {
    repo: R,
}

impl<R: CrmRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one order and returns it read back from storage.
    ///
    /// # Errors
    /// - `CustomerNotFound`, `EmptyProductList`, `ProductsNotFound`,
    ///   `TotalOverflow`; no write happens in these cases.
    /// - `Repo` for storage failures; the transaction is rolled back.
    pub fn create_order(&self, input: &NewOrder) -> Result<Order, CrmServiceError> {
        let result = self
            .repo
            .run_in_transaction(|repo| create_order_in(repo, input));
        match &result {
            Ok(order) => info!(
                "event=order_create module=service status=ok order_id={} customer_id={} product_count={}",
                order.id,
                order.customer_id,
                order.products.len()
            ),
            Err(err) => log_failure("order_create", err),
        }
        result
    }

    pub fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        self.repo.get_order(id)
    }
}

fn create_order_in<R: CrmRepository>(repo: &R, input: &NewOrder) -> Result<Order, CrmServiceError> {
    if repo.get_customer(input.customer_id)?.is_none() {
        return Err(CrmServiceError::CustomerNotFound(input.customer_id));
    }
    if input.product_ids.is_empty() {
        return Err(CrmServiceError::EmptyProductList);
    }

    let requested = dedupe_product_ids(&input.product_ids);
    let products = repo.filter_products_by_ids(&requested)?;
    let missing = missing_product_ids(&requested, &products);
    if !missing.is_empty() {
        return Err(CrmServiceError::ProductsNotFound(missing));
    }

    let draft = OrderDraft {
        customer_id: input.customer_id,
        total_amount: total_price(&products)?,
        order_date: input.order_date.unwrap_or_else(now_epoch_ms),
    };
    let order_id = repo.insert_order(&draft)?;
    repo.set_order_products(order_id, &requested)?;

    repo.get_order(order_id)?
        .ok_or(CrmServiceError::InconsistentState(
            "created order not found in read-back",
        ))
}
