mod common;

use common::{customer_count, ScriptedRepository};
use crm_core::db::open_db_in_memory;
use crm_core::{CrmServiceError, CustomerService, NewCustomer, SqliteCrmRepository};

#[test]
fn create_customer_persists_and_returns_record() {
    let conn = open_db_in_memory().unwrap();
    let service = CustomerService::new(SqliteCrmRepository::try_new(&conn).unwrap());

    let created = service
        .create_customer(&NewCustomer::new("Alice", "alice@example.com").with_phone("+1234567890"))
        .unwrap();

    assert_eq!(created.name, "Alice");
    assert_eq!(created.email, "alice@example.com");
    assert_eq!(created.phone.as_deref(), Some("+1234567890"));
    assert_eq!(service.list_customers().unwrap(), vec![created]);
}

#[test]
fn duplicate_email_is_rejected_and_count_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let service = CustomerService::new(SqliteCrmRepository::try_new(&conn).unwrap());

    service
        .create_customer(&NewCustomer::new("Alice", "alice@example.com"))
        .unwrap();
    let err = service
        .create_customer(&NewCustomer::new("Other", "alice@example.com"))
        .unwrap_err();

    assert!(matches!(err, CrmServiceError::DuplicateEmail(ref email) if email == "alice@example.com"));
    assert_eq!(err.to_string(), "Email already exists");
    assert_eq!(customer_count(&conn), 1);
}

#[test]
fn invalid_phone_is_rejected_without_write() {
    let conn = open_db_in_memory().unwrap();
    let service = CustomerService::new(SqliteCrmRepository::try_new(&conn).unwrap());

    for phone in ["12345", "+123", "123-45-6789"] {
        let err = service
            .create_customer(&NewCustomer::new("Bob", "bob@example.com").with_phone(phone))
            .unwrap_err();
        assert!(matches!(err, CrmServiceError::InvalidPhoneFormat(ref value) if value == phone));
        assert_eq!(err.code(), "invalid_phone_format");
    }
    assert_eq!(customer_count(&conn), 0);
}

#[test]
fn empty_phone_counts_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let service = CustomerService::new(SqliteCrmRepository::try_new(&conn).unwrap());

    let created = service
        .create_customer(&NewCustomer::new("Bob", "bob@example.com").with_phone(""))
        .unwrap();
    assert_eq!(created.phone, None);
}

#[test]
fn blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = CustomerService::new(SqliteCrmRepository::try_new(&conn).unwrap());

    let err = service
        .create_customer(&NewCustomer::new("  ", "blank@example.com"))
        .unwrap_err();
    assert!(matches!(err, CrmServiceError::EmptyName));
    assert_eq!(customer_count(&conn), 0);
}

#[test]
fn storage_conflict_after_stale_precheck_reports_duplicate_email() {
    let conn = open_db_in_memory().unwrap();
    // Pre-check always answers "available", as if another writer won the race.
    let repo = ScriptedRepository::new(&conn).with_email_exists(|_, _| Ok(false));
    let service = CustomerService::new(repo);

    service
        .create_customer(&NewCustomer::new("A", "race@example.com"))
        .unwrap();
    let err = service
        .create_customer(&NewCustomer::new("B", "race@example.com"))
        .unwrap_err();

    assert!(matches!(err, CrmServiceError::DuplicateEmail(_)));
    assert!(err.is_rejection());
    assert_eq!(customer_count(&conn), 1);
}

#[test]
fn storage_conflict_inside_batch_is_a_record_rejection() {
    let conn = open_db_in_memory().unwrap();
    // Pre-check always answers "available", as if another writer won the race.
    let repo = ScriptedRepository::new(&conn).with_email_exists(|_, _| Ok(false));
    let service = CustomerService::new(repo);

    let outcome = service
        .bulk_create_customers(&[
            NewCustomer::new("A", "race@example.com"),
            NewCustomer::new("B", "race@example.com"),
            NewCustomer::new("C", "other@example.com"),
        ])
        .unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert_eq!(outcome.error_messages(), ["race@example.com: Email already exists"]);
    assert_eq!(customer_count(&conn), 2);
}
