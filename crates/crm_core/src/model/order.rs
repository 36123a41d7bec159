//! Order model.
//!
//! # Invariants
//! - `products` is non-empty and holds each product at most once.
//! - `total_amount` is the sum of product prices captured at creation time;
//!   later price changes do not touch it.

use crate::model::customer::CustomerId;
use crate::model::product::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OrderId = Uuid;

/// Persisted order read model with its linked products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Linked products in link order.
    pub products: Vec<Product>,
    pub total_amount: Decimal,
    /// Unix epoch milliseconds.
    pub order_date: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Input for creating one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub product_ids: Vec<ProductId>,
    /// Unix epoch milliseconds; defaults to the creation instant.
    #[serde(default)]
    pub order_date: Option<i64>,
}

/// Order row as written by the repository, before product links exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_id: CustomerId,
    pub total_amount: Decimal,
    pub order_date: i64,
}
