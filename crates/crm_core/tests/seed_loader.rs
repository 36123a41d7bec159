use crm_core::db::open_db_in_memory;
use crm_core::seed::{default_customers, default_products};
use crm_core::{seed_defaults, CrmRepository, SeedReport, SqliteCrmRepository};
use rust_decimal::Decimal;

#[test]
fn seed_creates_demo_records_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();

    let first = seed_defaults(&repo).unwrap();
    assert_eq!(
        first,
        SeedReport {
            customers_created: 2,
            customers_existing: 0,
            products_created: 2,
            products_existing: 0,
        }
    );

    let second = seed_defaults(&repo).unwrap();
    assert_eq!(
        second,
        SeedReport {
            customers_created: 0,
            customers_existing: 2,
            products_created: 0,
            products_existing: 2,
        }
    );

    assert_eq!(repo.list_customers().unwrap().len(), default_customers().len());
    assert_eq!(repo.list_products().unwrap().len(), default_products().len());
}

#[test]
fn seed_keeps_existing_rows_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCrmRepository::try_new(&conn).unwrap();
    seed_defaults(&repo).unwrap();

    let alice = repo
        .find_customer_by_email("alice@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(alice.phone.as_deref(), Some("+1234567890"));
    let laptop = repo.find_product_by_name("Laptop").unwrap().unwrap();
    assert_eq!(laptop.price, Decimal::new(99999, 2));
    assert_eq!(laptop.stock, 10);

    seed_defaults(&repo).unwrap();
    assert_eq!(
        repo.find_customer_by_email("alice@example.com").unwrap(),
        Some(alice)
    );
    assert_eq!(repo.find_product_by_name("Laptop").unwrap(), Some(laptop));
}
