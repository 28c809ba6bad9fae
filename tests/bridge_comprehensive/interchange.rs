//! Markup export/import of query results and TOML configuration.

use chrono::NaiveDate;
use sqlbridge::{
    Command, IsolationLevel, ResultTable, SemanticType, Session, SessionConfig, Value,
    CONFIG_FILE_NAME,
};

use crate::common::*;

#[test]
fn test_query_result_survives_markup() {
    let mut session = memory_session();
    session
        .execute_non_query(
            "CREATE TABLE events (id INTEGER, label NVARCHAR(40), at TIMESTAMP, payload BLOB, score DOUBLE)",
        )
        .unwrap();
    let at = NaiveDate::from_ymd_opt(2020, 2, 29)
        .unwrap()
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap();
    session
        .execute_non_query(
            Command::new("INSERT INTO events VALUES (?, ?, ?, ?, ?)")
                .bind(SemanticType::Int32, 1)
                .bind(SemanticType::String, "<launch> & \"go\"")
                .bind(SemanticType::DateTime, at)
                .bind(SemanticType::Binary, vec![0u8, 1, 254, 255])
                .bind(SemanticType::Double, -2.5),
        )
        .unwrap();
    session
        .execute_non_query(
            Command::new("INSERT INTO events (id) VALUES (?)").bind(SemanticType::Int32, 2),
        )
        .unwrap();

    let table = session
        .execute_query("SELECT * FROM events ORDER BY id")
        .unwrap();
    let markup = table.to_markup().unwrap();
    let restored = ResultTable::from_markup(&markup).unwrap();

    assert_eq!(restored, table);
    assert_eq!(restored.get(1, 1), Some(&Value::Null));
}

#[test]
fn test_join_with_repeated_column_names_survives_markup() {
    let mut session = memory_session();
    session.execute_non_query("CREATE TABLE a (id BIGINT)").unwrap();
    session.execute_non_query("CREATE TABLE b (id BIGINT)").unwrap();
    session.execute_non_query("INSERT INTO a VALUES (1)").unwrap();
    session.execute_non_query("INSERT INTO b VALUES (2)").unwrap();

    let table = session
        .execute_query("SELECT a.id, b.id FROM a, b")
        .unwrap();
    assert_eq!(table.rows()[0], vec![Value::I64(1), Value::I64(2)]);

    let restored = ResultTable::from_markup(&table.to_markup().unwrap()).unwrap();
    assert_eq!(restored, table);
}

#[test]
fn test_restored_table_accepts_fill() {
    let mut session = memory_session();
    session.execute_non_query("CREATE TABLE t (n BIGINT)").unwrap();
    session.execute_non_query("INSERT INTO t VALUES (1)").unwrap();

    let table = session.execute_query("SELECT n FROM t").unwrap();
    let mut restored = ResultTable::from_markup(&table.to_markup().unwrap()).unwrap();
    session.fill(&mut restored, "SELECT n FROM t").unwrap();
    assert_eq!(restored.row_count(), 2);
}

#[test]
fn test_config_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    let config = SessionConfig::new(file_url(dir.path(), "cfg.db"))
        .with_isolation(IsolationLevel::RepeatableRead);
    config.write_to_file(&path).unwrap();

    let loaded = SessionConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);

    let mut session = Session::connect(loaded).unwrap();
    let txn = session.begin_transaction(None).unwrap();
    assert_eq!(txn.isolation(), IsolationLevel::RepeatableRead);
}

#[test]
fn test_default_config_file_opens_memory_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    SessionConfig::write_default_if_missing(&path).unwrap();

    let mut session = Session::connect(SessionConfig::from_file(&path).unwrap()).unwrap();
    assert_eq!(session.execute_scalar("SELECT 1").unwrap(), Value::I64(1));
}
