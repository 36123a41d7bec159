use crm_core::db::migrations::{apply_migrations, latest_version, schema_version};
use crm_core::db::{open_db, open_db_in_memory, DbError};
use crm_core::{RepoError, SqliteCrmRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["customers", "products", "orders", "order_products"] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO customers (uuid, name, email) VALUES ('x', 'Alice', 'alice@example.com');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM customers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.code(), "schema_too_new");
    match err {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn migrating_an_up_to_date_store_is_a_noop() {
    let mut conn = open_db_in_memory().unwrap();

    let upgrade = apply_migrations(&mut conn).unwrap();
    assert!(upgrade.is_noop());
    assert_eq!(upgrade.to, latest_version());
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
}

#[test]
fn fresh_store_upgrades_from_zero() {
    let mut conn = Connection::open_in_memory().unwrap();

    let upgrade = apply_migrations(&mut conn).unwrap();
    assert_eq!(upgrade.from, 0);
    assert_eq!(upgrade.to, latest_version());
    assert!(!upgrade.is_noop());
}

#[test]
fn failed_step_leaves_store_untouched() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE customers (legacy TEXT);")
        .unwrap();

    let err = apply_migrations(&mut conn).unwrap_err();
    assert!(matches!(err, DbError::Migration { version: 1, .. }));
    assert_eq!(schema_version(&conn).unwrap(), 0);
    assert_table_missing(&conn, "orders");
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteCrmRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("customers")));
}

#[test]
fn storage_enforces_email_uniqueness_and_stock_bounds() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO customers (uuid, name, email) VALUES ('a', 'A', 'same@example.com');",
        [],
    )
    .unwrap();
    assert!(conn
        .execute(
            "INSERT INTO customers (uuid, name, email) VALUES ('b', 'B', 'same@example.com');",
            [],
        )
        .is_err());
    assert!(conn
        .execute(
            "INSERT INTO products (uuid, name, price, stock) VALUES ('p', 'X', '1.00', -1);",
            [],
        )
        .is_err());
}

fn assert_table_missing(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 0, "table {table_name} should not exist");
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
