//! Mutation/query API surface.
//!
//! # Responsibility
//! - Accept structured requests (`ApiRequest`, JSON tagged by `op`).
//! - Render every operation through one envelope:
//!   `{ ok, data, message, errorCode }`.
//!
//! # Invariants
//! - Request handling never panics; malformed input becomes an
//!   `invalid_request` envelope.
//! - `data` is `null` whenever `ok` is `false`.
//! - A batch with rejected records is still `ok`; rejections are listed in
//!   `data.errors`.

use crate::model::customer::{Customer, NewCustomer};
use crate::model::order::{NewOrder, Order, OrderId};
use crate::model::product::{NewProduct, Product};
use crate::repo::crm_repo::{CrmRepository, RepoError};
use crate::service::customer_service::{CustomerService, CUSTOMER_CREATED_MESSAGE};
use crate::service::error::CrmServiceError;
use crate::service::order_service::OrderService;
use crate::service::product_service::ProductService;
use log::warn;
use serde::{Deserialize, Serialize};

const INVALID_REQUEST_CODE: &str = "invalid_request";

/// One API call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ApiRequest {
    CreateCustomer(NewCustomer),
    BulkCreateCustomers { customers: Vec<NewCustomer> },
    CreateProduct(NewProduct),
    CreateOrder(NewOrder),
    Customers,
    Products,
    Order { id: OrderId },
}

/// Operation payload carried in `ApiResponse::data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApiData {
    Customer {
        customer: Customer,
    },
    BulkCreate {
        #[serde(rename = "customersCreated")]
        customers_created: Vec<Customer>,
        errors: Vec<String>,
    },
    Product {
        product: Product,
    },
    Order {
        order: Order,
    },
    Customers(Vec<Customer>),
    Products(Vec<Product>),
}

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub ok: bool,
    pub data: Option<ApiData>,
    pub message: String,
    pub error_code: Option<&'static str>,
}

impl ApiResponse {
    fn success(data: ApiData, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            message: message.into(),
            error_code: None,
        }
    }

    fn failure(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            message: message.into(),
            error_code: Some(code),
        }
    }

    fn from_service_error(err: &CrmServiceError) -> Self {
        Self::failure(err.code(), err.to_string())
    }

    fn from_repo_error(err: &RepoError) -> Self {
        Self::failure("storage_error", err.to_string())
    }

    /// Serializes the envelope; never fails for envelope-shaped data.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            warn!("event=api_encode module=api status=error error={err}");
            format!(
                r#"{{"ok":false,"data":null,"message":"failed to encode response","errorCode":"{INVALID_REQUEST_CODE}"}}"#
            )
        })
    }
}

/// Request dispatcher over the CRM services.
///
/// Each service owns its own copy of the repository handle, so `R` is
/// expected to be a cheap handle such as `SqliteCrmRepository`.
pub struct CrmApi<R: CrmRepository> {
    customers: CustomerService<R>,
    products: ProductService<R>,
    orders: OrderService<R>,
}

impl<R: CrmRepository + Clone> CrmApi<R> {
    pub fn new(repo: R) -> Self {
        Self {
            customers: CustomerService::new(repo.clone()),
            products: ProductService::new(repo.clone()),
            orders: OrderService::new(repo),
        }
    }
}

impl<R: CrmRepository> CrmApi<R> {
    /// Parses a JSON request and returns the JSON envelope.
    pub fn execute_json(&self, request: &str) -> String {
        self.execute_str(request).to_json()
    }

    /// Parses a JSON request and executes it.
    pub fn execute_str(&self, request: &str) -> ApiResponse {
        match serde_json::from_str::<ApiRequest>(request) {
            Ok(request) => self.execute(request),
            Err(err) => {
                ApiResponse::failure(INVALID_REQUEST_CODE, format!("invalid request: {err}"))
            }
        }
    }

    pub fn execute(&self, request: ApiRequest) -> ApiResponse {
        match request {
            ApiRequest::CreateCustomer(input) => self.create_customer(&input),
            ApiRequest::BulkCreateCustomers { customers } => {
                self.bulk_create_customers(&customers)
            }
            ApiRequest::CreateProduct(input) => self.create_product(&input),
            ApiRequest::CreateOrder(input) => self.create_order(&input),
            ApiRequest::Customers => self.customers(),
            ApiRequest::Products => self.products(),
            ApiRequest::Order { id } => self.order(id),
        }
    }

    /// `createCustomer`: on rejection `data` is null and `message` explains.
    pub fn create_customer(&self, input: &NewCustomer) -> ApiResponse {
        match self.customers.create_customer(input) {
            Ok(customer) => {
                ApiResponse::success(ApiData::Customer { customer }, CUSTOMER_CREATED_MESSAGE)
            }
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    /// `bulkCreateCustomers`: `ok` unless the whole batch failed to commit.
    pub fn bulk_create_customers(&self, inputs: &[NewCustomer]) -> ApiResponse {
        match self.customers.bulk_create_customers(inputs) {
            Ok(outcome) => {
                let message = format!(
                    "Created {} customers, {} errors",
                    outcome.created.len(),
                    outcome.errors.len()
                );
                let errors = outcome.error_messages();
                ApiResponse::success(
                    ApiData::BulkCreate {
                        customers_created: outcome.created,
                        errors,
                    },
                    message,
                )
            }
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    pub fn create_product(&self, input: &NewProduct) -> ApiResponse {
        match self.products.create_product(input) {
            Ok(product) => {
                ApiResponse::success(ApiData::Product { product }, "Product created successfully")
            }
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    pub fn create_order(&self, input: &NewOrder) -> ApiResponse {
        match self.orders.create_order(input) {
            Ok(order) => ApiResponse::success(ApiData::Order { order }, "Order created successfully"),
            Err(err) => ApiResponse::from_service_error(&err),
        }
    }

    pub fn customers(&self) -> ApiResponse {
        match self.customers.list_customers() {
            Ok(customers) => {
                let message = format!("{} customers", customers.len());
                ApiResponse::success(ApiData::Customers(customers), message)
            }
            Err(err) => ApiResponse::from_repo_error(&err),
        }
    }

    pub fn products(&self) -> ApiResponse {
        match self.products.list_products() {
            Ok(products) => {
                let message = format!("{} products", products.len());
                ApiResponse::success(ApiData::Products(products), message)
            }
            Err(err) => ApiResponse::from_repo_error(&err),
        }
    }

    pub fn order(&self, id: OrderId) -> ApiResponse {
        match self.orders.get_order(id) {
            Ok(Some(order)) => ApiResponse::success(ApiData::Order { order }, "Order found"),
            Ok(None) => ApiResponse::failure("order_not_found", format!("Order not found: {id}")),
            Err(err) => ApiResponse::from_repo_error(&err),
        }
    }
}
