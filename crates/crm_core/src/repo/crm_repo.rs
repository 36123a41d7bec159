//! CRM repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/filter/exists APIs over customers, products and
//!   orders.
//! - Provide a scoped unit-of-work (`run_in_transaction`).
//!
//! # Invariants
//! - Read paths reject unparseable persisted state instead of masking it.
//! - `filter_products_by_ids` returns only the subset that resolves.
//! - A unit of work either commits fully or leaves no trace.

use crate::db::DbError;
use crate::model::customer::{Customer, CustomerId, NewCustomer};
use crate::model::now_epoch_ms;
use crate::model::order::{Order, OrderDraft, OrderId};
use crate::model::product::{NewProduct, Product, ProductId};
use log::warn;
use rust_decimal::Decimal;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const CUSTOMER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    email,
    phone,
    created_at
FROM customers";

const PRODUCT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    price,
    stock,
    created_at
FROM products";

const REQUIRED_TABLES: [&str; 4] = ["customers", "products", "orders", "order_products"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for CRM persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A storage-level uniqueness constraint rejected the write.
    UniqueViolation {
        table: &'static str,
        column: &'static str,
    },
    NotFound(Uuid),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UniqueViolation { table, column } => {
                write!(f, "unique constraint violated on {table}.{column}")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence collaborator consumed by CRM services.
pub trait CrmRepository {
    fn find_customer_by_email(&self, email: &str) -> RepoResult<Option<Customer>>;
    fn customer_email_exists(&self, email: &str) -> RepoResult<bool>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    fn insert_customer(&self, customer: &NewCustomer) -> RepoResult<Customer>;

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    /// Returns the products that resolve, in insertion order. Unknown ids are
    /// skipped silently.
    fn filter_products_by_ids(&self, ids: &[ProductId]) -> RepoResult<Vec<Product>>;
    fn find_product_by_name(&self, name: &str) -> RepoResult<Option<Product>>;
    fn list_products(&self) -> RepoResult<Vec<Product>>;
    fn insert_product(&self, product: &NewProduct) -> RepoResult<Product>;

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    fn insert_order(&self, draft: &OrderDraft) -> RepoResult<OrderId>;
    /// Links `product_ids` to the order, in the given order.
    fn set_order_products(&self, order_id: OrderId, product_ids: &[ProductId]) -> RepoResult<()>;

    /// Runs `work` atomically.
    ///
    /// Commits when `work` returns `Ok`, rolls back otherwise. A commit
    /// failure rolls back and is returned as an error. Calls made while a
    /// unit of work is already open join it.
    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed CRM repository.
///
/// Borrows the connection, so copies are cheap and share one session.
#[derive(Clone, Copy)]
pub struct SqliteCrmRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCrmRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }
}

impl CrmRepository for SqliteCrmRepository<'_> {
    fn find_customer_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE email = ?1;"))?;
        let mut rows = stmt.query([email])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn customer_email_exists(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE email = ?1);",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }

    fn insert_customer(&self, customer: &NewCustomer) -> RepoResult<Customer> {
        let record = Customer {
            id: Uuid::new_v4(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.normalized_phone().map(str::to_string),
            created_at: now_epoch_ms(),
        };

        self.conn
            .execute(
                "INSERT INTO customers (uuid, name, email, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    record.id.to_string(),
                    record.name.as_str(),
                    record.email.as_str(),
                    record.phone.as_deref(),
                    record.created_at,
                ],
            )
            .map_err(|err| map_unique_violation(err, "customers", "email"))?;

        Ok(record)
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn filter_products_by_ids(&self, ids: &[ProductId]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("{PRODUCT_SELECT_SQL} WHERE uuid IN ({placeholders}) ORDER BY rowid ASC;");
        let bind_values: Vec<Value> = ids.iter().map(|id| Value::Text(id.to_string())).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn find_product_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL} WHERE name = ?1 ORDER BY rowid ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self) -> RepoResult<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn insert_product(&self, product: &NewProduct) -> RepoResult<Product> {
        let record = Product {
            id: Uuid::new_v4(),
            name: product.name.clone(),
            price: product.price,
            stock: product.effective_stock(),
            created_at: now_epoch_ms(),
        };

        self.conn.execute(
            "INSERT INTO products (uuid, name, price, stock, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.price.to_string(),
                record.stock,
                record.created_at,
            ],
        )?;

        Ok(record)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let row = self
            .conn
            .query_row(
                "SELECT uuid, customer_uuid, total_amount, order_date, created_at
                 FROM orders
                 WHERE uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>("customer_uuid")?,
                        row.get::<_, String>("total_amount")?,
                        row.get::<_, i64>("order_date")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        let Some((customer_text, total_text, order_date, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Order {
            id,
            customer_id: parse_uuid(&customer_text, "orders.customer_uuid")?,
            products: load_order_products(self.conn, id)?,
            total_amount: parse_decimal(&total_text, "orders.total_amount")?,
            order_date,
            created_at,
        }))
    }

    fn insert_order(&self, draft: &OrderDraft) -> RepoResult<OrderId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO orders (uuid, customer_uuid, total_amount, order_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id.to_string(),
                draft.customer_id.to_string(),
                draft.total_amount.to_string(),
                draft.order_date,
                now_epoch_ms(),
            ],
        )?;
        Ok(id)
    }

    fn set_order_products(&self, order_id: OrderId, product_ids: &[ProductId]) -> RepoResult<()> {
        let order_text = order_id.to_string();
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE uuid = ?1);",
            [order_text.as_str()],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound(order_id));
        }

        self.conn.execute(
            "DELETE FROM order_products WHERE order_uuid = ?1;",
            [order_text.as_str()],
        )?;
        for product_id in product_ids {
            self.conn.execute(
                "INSERT OR IGNORE INTO order_products (order_uuid, product_uuid)
                 VALUES (?1, ?2);",
                params![order_text.as_str(), product_id.to_string()],
            )?;
        }
        Ok(())
    }

    fn run_in_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        if !self.conn.is_autocommit() {
            return work(self);
        }

        self.conn
            .execute_batch("BEGIN IMMEDIATE;")
            .map_err(RepoError::from)?;

        let outcome = work(self);
        if outcome.is_ok() {
            match self.conn.execute_batch("COMMIT;") {
                Ok(()) => return outcome,
                Err(err) => {
                    rollback(self.conn);
                    return Err(RepoError::from(err).into());
                }
            }
        }

        rollback(self.conn);
        outcome
    }
}

fn rollback(conn: &Connection) {
    if conn.is_autocommit() {
        return;
    }
    if let Err(err) = conn.execute_batch("ROLLBACK;") {
        warn!("event=tx_rollback module=repo status=error error={err}");
    }
}

fn map_unique_violation(
    err: rusqlite::Error,
    table: &'static str,
    column: &'static str,
) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return RepoError::UniqueViolation { table, column };
        }
    }
    RepoError::from(err)
}

fn load_order_products(conn: &Connection, order_id: OrderId) -> RepoResult<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT p.uuid, p.name, p.price, p.stock, p.created_at
         FROM order_products op
         INNER JOIN products p ON p.uuid = op.product_uuid
         WHERE op.order_uuid = ?1
         ORDER BY op.rowid ASC;",
    )?;
    let mut rows = stmt.query([order_id.to_string()])?;
    let mut products = Vec::new();
    while let Some(row) = rows.next()? {
        products.push(parse_product_row(row)?);
    }
    Ok(products)
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Customer {
        id: parse_uuid(&uuid_text, "customers.uuid")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let uuid_text: String = row.get("uuid")?;
    let price_text: String = row.get("price")?;
    Ok(Product {
        id: parse_uuid(&uuid_text, "products.uuid")?,
        name: row.get("name")?,
        price: parse_decimal(&price_text, "products.price")?,
        stock: row.get("stock")?,
        created_at: row.get("created_at")?,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_decimal(value: &str, column: &str) -> RepoResult<Decimal> {
    Decimal::from_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid decimal value `{value}` in {column}"))
    })
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
