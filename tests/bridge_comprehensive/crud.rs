//! Typed CRUD through a session.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlbridge::{Command, SemanticType, Value};

use crate::common::*;

fn dec(s: &str) -> Value {
    Value::Decimal(Decimal::from_str(s).unwrap())
}

#[test]
fn test_insert_and_select_typed_row() {
    let mut session = memory_session();
    session.execute_non_query(ACCOUNTS_DDL).unwrap();

    let opened = NaiveDate::from_ymd_opt(2021, 3, 14)
        .unwrap()
        .and_hms_milli_opt(15, 9, 26, 535)
        .unwrap();
    session
        .execute_non_query(
            Command::new("INSERT INTO accounts (owner, opened, active, balance) VALUES (?, ?, ?, ?)")
                .bind(SemanticType::AnsiString, "Ada")
                .bind(SemanticType::DateTime, opened)
                .bind(SemanticType::Boolean, false)
                .bind(SemanticType::Decimal, dec("1234.56")),
        )
        .unwrap();

    let table = session
        .execute_query(
            Command::new("SELECT id, owner, opened, active, balance FROM accounts WHERE owner = ?")
                .bind(SemanticType::AnsiString, "Ada"),
        )
        .unwrap();

    assert_eq!(table.row_count(), 1);
    assert_eq!(table.get(0, 0), Some(&Value::I64(1)));
    assert_eq!(table.get(0, 1), Some(&Value::from("Ada")));
    assert_eq!(table.get(0, 2), Some(&Value::DateTime(opened)));
    assert_eq!(table.get(0, 3), Some(&Value::Bool(false)));
    assert_eq!(table.get(0, 4), Some(&dec("1234.56")));
}

#[test]
fn test_autoincrement_ids_follow_insert_order() {
    let mut session = memory_session();
    session.execute_non_query(ACCOUNTS_DDL).unwrap();
    for owner in ["a", "b", "c"] {
        insert_account(&mut session, owner, dec("0"));
    }

    let table = session
        .execute_query("SELECT id, owner FROM accounts ORDER BY id")
        .unwrap();
    let ids: Vec<_> = table.rows().iter().map(|r| r[0].clone()).collect();
    assert_eq!(ids, vec![Value::I64(1), Value::I64(2), Value::I64(3)]);
}

#[test]
fn test_update_and_delete_report_counts() {
    let mut session = memory_session();
    session.execute_non_query(ACCOUNTS_DDL).unwrap();
    insert_account(&mut session, "a", dec("10"));
    insert_account(&mut session, "b", dec("20"));
    insert_account(&mut session, "c", dec("30"));

    let updated = session
        .execute_non_query(
            Command::new("UPDATE accounts SET balance = balance + ? WHERE balance >= ?")
                .bind(SemanticType::Decimal, dec("0.5"))
                .bind(SemanticType::Decimal, dec("20")),
        )
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = session
        .execute_non_query(
            Command::new("DELETE FROM accounts WHERE owner <> ?")
                .bind(SemanticType::AnsiString, "c"),
        )
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(count(&mut session, "accounts"), 1);

    let balance = session.execute_scalar("SELECT balance FROM accounts").unwrap();
    assert_eq!(balance, dec("30.5"));
}

#[test]
fn test_blob_holds_utf8_text() {
    let mut session = memory_session();
    session
        .execute_non_query("CREATE TABLE notes (id INTEGER, body BLOB)")
        .unwrap();

    let body = "line one\nzweite Zeile ü\n第三行\n".repeat(500);
    session
        .execute_non_query(
            Command::new("INSERT INTO notes VALUES (?, ?)")
                .bind(SemanticType::Int32, 1)
                .bind(SemanticType::Binary, body.as_bytes()),
        )
        .unwrap();

    match session.execute_scalar("SELECT body FROM notes WHERE id = 1").unwrap() {
        Value::Bytes(bytes) => assert_eq!(String::from_utf8(bytes).unwrap(), body),
        other => panic!("Expected Bytes, got {:?}", other),
    }
}

#[test]
fn test_inferred_parameters() {
    let mut session = memory_session();
    session
        .execute_non_query("CREATE TABLE misc (n BIGINT, s NVARCHAR(20), f DOUBLE)")
        .unwrap();
    session
        .execute_non_query(
            Command::new("INSERT INTO misc VALUES (?, ?, ?)")
                .bind_inferred(42i64)
                .bind_inferred("hello")
                .bind_inferred(0.125f64),
        )
        .unwrap();

    let table = session.execute_query("SELECT n, s, f FROM misc").unwrap();
    assert_eq!(
        table.rows()[0],
        vec![Value::I64(42), Value::from("hello"), Value::F64(0.125)]
    );
}
