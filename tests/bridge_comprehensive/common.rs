//! Shared helpers for the bridge suite.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;

use sqlbridge::{Command, SemanticType, Session, SessionConfig, Value};

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output to the test harness (RUST_LOG-style filtering
/// is left at the subscriber default).
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Private in-memory session.
pub fn memory_session() -> Session {
    init_logging();
    Session::open_in_memory().expect("open in-memory session")
}

/// Session on a database file inside `dir`.
pub fn file_session(dir: &Path, name: &str) -> Session {
    init_logging();
    Session::connect(SessionConfig::new(file_url(dir, name))).expect("open file session")
}

pub fn file_url(dir: &Path, name: &str) -> String {
    format!("sqlite:file:{}", dir.join(name).display())
}

pub const ACCOUNTS_DDL: &str = "CREATE TABLE accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner VARCHAR(100) NOT NULL,
    opened TIMESTAMP,
    active BOOLEAN,
    balance DECIMAL(10,2)
)";

pub fn insert_account(session: &mut Session, owner: &str, balance: Value) -> u64 {
    session
        .execute_non_query(
            Command::new("INSERT INTO accounts (owner, active, balance) VALUES (?, ?, ?)")
                .bind(SemanticType::AnsiString, owner)
                .bind(SemanticType::Boolean, true)
                .bind(SemanticType::Decimal, balance),
        )
        .expect("insert account")
}

pub fn count(session: &mut Session, table: &str) -> i64 {
    match session
        .execute_scalar(format!("SELECT COUNT(*) FROM {}", table))
        .expect("count rows")
    {
        Value::I64(n) => n,
        other => panic!("Expected I64 count, got {:?}", other),
    }
}
