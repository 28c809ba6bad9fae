//! File-backed databases and connection string flags.

use sqlbridge::{Command, Error, SemanticType, Session, SessionConfig, Value};

use crate::common::*;

#[test]
fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = file_session(dir.path(), "keep.db");
        session
            .execute_non_query("CREATE TABLE kv (k VARCHAR(10), v INTEGER)")
            .unwrap();
        session
            .execute_non_query(
                Command::new("INSERT INTO kv VALUES (?, ?)")
                    .bind(SemanticType::AnsiString, "answer")
                    .bind(SemanticType::Int32, 42),
            )
            .unwrap();
    }

    let mut session = file_session(dir.path(), "keep.db");
    let value = session
        .execute_scalar(
            Command::new("SELECT v FROM kv WHERE k = ?").bind(SemanticType::AnsiString, "answer"),
        )
        .unwrap();
    assert_eq!(value, Value::I64(42));
}

#[test]
fn test_if_exists_refuses_missing_database() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("{};IFEXISTS=TRUE", file_url(dir.path(), "absent.db"));

    let result = Session::connect(SessionConfig::new(url));
    assert!(
        matches!(result, Err(Error::Connection { .. })),
        "Expected Connection, got {:?}",
        result,
    );
    assert!(!dir.path().join("absent.db").exists());
}

#[test]
fn test_read_only_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut session = file_session(dir.path(), "ro.db");
        session.execute_non_query("CREATE TABLE t (n INTEGER)").unwrap();
    }

    let url = format!("{};READONLY=TRUE", file_url(dir.path(), "ro.db"));
    let mut session = Session::connect(SessionConfig::new(url)).unwrap();
    assert_eq!(count(&mut session, "t"), 0);

    let result = session.execute_non_query("INSERT INTO t VALUES (1)");
    assert!(
        matches!(result, Err(Error::Driver { .. })),
        "Expected Driver, got {:?}",
        result,
    );
}

#[test]
fn test_named_memory_database_is_shared() {
    init_logging();
    let config = SessionConfig::new("sqlite:mem:bridge_shared_suite");
    let mut first = Session::connect(config.clone()).unwrap();
    first.execute_non_query("CREATE TABLE t (n INTEGER)").unwrap();
    first.execute_non_query("INSERT INTO t VALUES (1)").unwrap();

    let mut second = Session::connect(config).unwrap();
    assert_eq!(count(&mut second, "t"), 1);
}
