//! Session tests: verify connection and transaction lifecycle.

use sqlbridge_core::{IsolationLevel, SemanticType, Value};

use crate::{Command, Error, Session, SessionConfig, TransactionState};

/// Create a test session on a private in-memory database with one table.
fn create_test_session() -> Session {
    let mut session = Session::open_in_memory().unwrap();
    session
        .execute_non_query("CREATE TABLE items (n INTEGER)")
        .unwrap();
    session
}

fn count(session: &mut Session) -> Value {
    session.execute_scalar("SELECT COUNT(*) FROM items").unwrap()
}

// =============================================================================
// Open / Close
// =============================================================================

#[test]
fn test_empty_connection_string_is_invalid_input() {
    let result = Session::connect(SessionConfig::new(""));
    assert!(
        matches!(result, Err(Error::InvalidInput { .. })),
        "Expected InvalidInput, got {:?}",
        result,
    );
}

#[test]
fn test_malformed_connection_string_is_connection_error() {
    let result = Session::connect(SessionConfig::new("tcp://db.example.com"));
    assert!(
        matches!(result, Err(Error::Connection { .. })),
        "Expected Connection, got {:?}",
        result,
    );
}

#[test]
fn test_close_is_idempotent() {
    let mut session = create_test_session();
    assert!(session.is_open());
    session.close();
    assert!(!session.is_open());
    session.close();
}

#[test]
fn test_commands_on_closed_session_fail() {
    let mut session = create_test_session();
    session.close();
    let result = session.execute_scalar("SELECT 1");
    assert!(
        matches!(result, Err(Error::InvalidOperation { .. })),
        "Expected InvalidOperation, got {:?}",
        result,
    );
}

#[test]
fn test_open_twice_fails() {
    let mut session = create_test_session();
    assert!(matches!(session.open(), Err(Error::InvalidOperation { .. })));
}

#[test]
fn test_close_rolls_back_active_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:file:{}", dir.path().join("close.db").display());

    let mut session = Session::connect(SessionConfig::new(url.clone())).unwrap();
    session
        .execute_non_query("CREATE TABLE items (n INTEGER)")
        .unwrap();
    session.begin_transaction(None).unwrap();
    session
        .execute_non_query("INSERT INTO items VALUES (1)")
        .unwrap();
    session.close();
    assert!(!session.in_transaction());

    let mut reopened = Session::connect(SessionConfig::new(url)).unwrap();
    assert_eq!(count(&mut reopened), Value::I64(0));
}

// =============================================================================
// Transaction Lifecycle
// =============================================================================

#[test]
fn test_begin_commit_lifecycle() {
    let mut session = create_test_session();
    assert!(!session.in_transaction());

    let txn = session.begin_transaction(None).unwrap();
    assert!(txn.is_active());
    assert!(session.in_transaction());

    session
        .execute_non_query(Command::new("INSERT INTO items VALUES (?)").bind(SemanticType::Int32, 5))
        .unwrap();

    let done = session.commit().unwrap();
    assert_eq!(done.id(), txn.id());
    assert_eq!(done.state(), TransactionState::Committed);
    assert!(!session.in_transaction());
    assert_eq!(count(&mut session), Value::I64(1));
}

#[test]
fn test_begin_rollback_lifecycle() {
    let mut session = create_test_session();

    session.begin_transaction(None).unwrap();
    session
        .execute_non_query("INSERT INTO items VALUES (1)")
        .unwrap();
    let done = session.rollback().unwrap();

    assert_eq!(done.state(), TransactionState::RolledBack);
    assert!(!session.in_transaction());
    assert_eq!(count(&mut session), Value::I64(0));
}

#[test]
fn test_double_begin_returns_error() {
    let mut session = create_test_session();
    session.begin_transaction(None).unwrap();

    let result = session.begin_transaction(None);
    assert!(
        matches!(result, Err(Error::InvalidOperation { .. })),
        "Expected InvalidOperation, got {:?}",
        result,
    );
    assert!(session.in_transaction());
}

#[test]
fn test_commit_without_begin_returns_error() {
    let mut session = create_test_session();
    let result = session.commit();
    assert!(
        matches!(result, Err(Error::InvalidOperation { .. })),
        "Expected InvalidOperation, got {:?}",
        result,
    );
}

#[test]
fn test_rollback_without_begin_returns_error() {
    let mut session = create_test_session();
    let result = session.rollback();
    assert!(
        matches!(result, Err(Error::InvalidOperation { .. })),
        "Expected InvalidOperation, got {:?}",
        result,
    );
}

#[test]
fn test_transaction_ids_increase() {
    let mut session = create_test_session();
    let first = session.begin_transaction(None).unwrap();
    session.commit().unwrap();
    let second = session.begin_transaction(None).unwrap();
    session.rollback().unwrap();
    assert!(second.id() > first.id());
}

// =============================================================================
// Isolation
// =============================================================================

#[test]
fn test_supported_isolation_levels_begin() {
    let mut session = create_test_session();
    for level in [
        IsolationLevel::Unspecified,
        IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable,
    ] {
        let txn = session.begin_transaction(Some(level)).unwrap();
        assert_eq!(txn.isolation(), level);
        session.rollback().unwrap();
    }
}

#[test]
fn test_unsupported_isolation_leaves_no_transaction() {
    let mut session = create_test_session();
    for level in [IsolationLevel::Snapshot, IsolationLevel::Chaos] {
        let result = session.begin_transaction(Some(level));
        assert!(
            matches!(result, Err(Error::UnsupportedIsolationLevel { .. })),
            "Expected UnsupportedIsolationLevel, got {:?}",
            result,
        );
        assert!(!session.in_transaction());
    }
}

#[test]
fn test_default_isolation_from_config() {
    let config = SessionConfig::in_memory().with_isolation(IsolationLevel::Serializable);
    let mut session = Session::connect(config).unwrap();
    let txn = session.begin_transaction(None).unwrap();
    assert_eq!(txn.isolation(), IsolationLevel::Serializable);
}
