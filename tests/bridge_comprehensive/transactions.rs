//! Transaction visibility through the public API.

use rust_decimal::Decimal;
use sqlbridge::{Error, IsolationLevel, TransactionState, Value};

use crate::common::*;

fn setup() -> sqlbridge::Session {
    let mut session = memory_session();
    session.execute_non_query(ACCOUNTS_DDL).unwrap();
    session
}

#[test]
fn test_committed_rows_are_kept() {
    let mut session = setup();
    session.begin_transaction(None).unwrap();
    insert_account(&mut session, "a", Value::Decimal(Decimal::ONE));
    insert_account(&mut session, "b", Value::Decimal(Decimal::ONE));
    let txn = session.commit().unwrap();

    assert_eq!(txn.state(), TransactionState::Committed);
    assert_eq!(count(&mut session, "accounts"), 2);
}

#[test]
fn test_rolled_back_rows_are_discarded() {
    let mut session = setup();
    insert_account(&mut session, "kept", Value::Decimal(Decimal::ONE));

    session
        .begin_transaction(Some(IsolationLevel::Serializable))
        .unwrap();
    insert_account(&mut session, "dropped", Value::Decimal(Decimal::ONE));
    assert_eq!(count(&mut session, "accounts"), 2);
    session.rollback().unwrap();

    assert_eq!(count(&mut session, "accounts"), 1);
}

#[test]
fn test_second_begin_is_rejected_until_finished() {
    let mut session = setup();
    session.begin_transaction(None).unwrap();
    assert!(matches!(
        session.begin_transaction(None),
        Err(Error::InvalidOperation { .. })
    ));
    session.commit().unwrap();
    assert!(session.begin_transaction(None).is_ok());
}

#[test]
fn test_autocommit_outside_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = file_session(dir.path(), "auto.db");
    writer.execute_non_query(ACCOUNTS_DDL).unwrap();
    insert_account(&mut writer, "a", Value::Decimal(Decimal::ONE));

    let mut reader = file_session(dir.path(), "auto.db");
    assert_eq!(count(&mut reader, "accounts"), 1);
}

#[test]
fn test_uncommitted_rows_hidden_from_other_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = file_session(dir.path(), "iso.db");
    writer.execute_non_query(ACCOUNTS_DDL).unwrap();

    writer.begin_transaction(None).unwrap();
    insert_account(&mut writer, "pending", Value::Decimal(Decimal::ONE));

    let mut reader = file_session(dir.path(), "iso.db");
    assert_eq!(count(&mut reader, "accounts"), 0);

    writer.commit().unwrap();
    assert_eq!(count(&mut reader, "accounts"), 1);
}
