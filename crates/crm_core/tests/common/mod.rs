#![allow(dead_code)]

use crm_core::model::order::{Order, OrderDraft, OrderId};
use crm_core::{
    CrmRepository, Customer, CustomerId, NewCustomer, NewProduct, Product, ProductId, RepoError,
    RepoResult, SqliteCrmRepository,
};
use rusqlite::Connection;

type EmailExistsFn<'conn> =
    Box<dyn Fn(&SqliteCrmRepository<'conn>, &str) -> RepoResult<bool> + 'conn>;
type InsertCustomerFn<'conn> =
    Box<dyn Fn(&SqliteCrmRepository<'conn>, &NewCustomer) -> RepoResult<Customer> + 'conn>;

/// SQLite repository with selected customer operations replaced by closures.
pub struct ScriptedRepository<'conn> {
    inner: SqliteCrmRepository<'conn>,
    email_exists: Option<EmailExistsFn<'conn>>,
    insert_customer: Option<InsertCustomerFn<'conn>>,
}

impl<'conn> ScriptedRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteCrmRepository::try_new(conn).unwrap(),
            email_exists: None,
            insert_customer: None,
        }
    }

    pub fn with_email_exists(
        mut self,
        f: impl Fn(&SqliteCrmRepository<'conn>, &str) -> RepoResult<bool> + 'conn,
    ) -> Self {
        self.email_exists = Some(Box::new(f));
        self
    }

    pub fn with_insert_customer(
        mut self,
        f: impl Fn(&SqliteCrmRepository<'conn>, &NewCustomer) -> RepoResult<Customer> + 'conn,
    ) -> Self {
        self.insert_customer = Some(Box::new(f));
        self
    }
}

impl CrmRepository for ScriptedRepository<'_> {
    fn find_customer_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        self.inner.find_customer_by_email(email)
    }

    fn customer_email_exists(&self, email: &str) -> RepoResult<bool> {
        match &self.email_exists {
            Some(f) => f(&self.inner, email),
            None => self.inner.customer_email_exists(email),
        }
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        self.inner.get_customer(id)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        self.inner.list_customers()
    }

    fn insert_customer(&self, customer: &NewCustomer) -> RepoResult<Customer> {
        match &self.insert_customer {
            Some(f) => f(&self.inner, customer),
            None => self.inner.insert_customer(customer),
        }
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.inner.get_product(id)
    }

    fn filter_products_by_ids(&self, ids: &[ProductId]) -> RepoResult<Vec<Product>> {
        self.inner.filter_products_by_ids(ids)
    }

    fn find_product_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        self.inner.find_product_by_name(name)
    }

    fn list_products(&self) -> RepoResult<Vec<Product>> {
        self.inner.list_products()
    }

    fn insert_product(&self, product: &NewProduct) -> RepoResult<Product> {
        self.inner.insert_product(product)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        self.inner.get_order(id)
    }

    fn insert_order(&self, draft: &OrderDraft) -> RepoResult<OrderId> {
        self.inner.insert_order(draft)
    }

    fn set_order_products(&self, order_id: OrderId, product_ids: &[ProductId]) -> RepoResult<()> {
        self.inner.set_order_products(order_id, product_ids)
    }

    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        self.inner.run_in_transaction(|_| work(self))
    }
}

pub fn customer_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM customers;", [], |row| row.get(0))
        .unwrap()
}
