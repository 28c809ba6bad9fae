//! Failure paths, driven through a scripted in-process driver.
//!
//! The scripted connection records every call it receives so tests can
//! check what reached the driver, and fails the calls it is told to.

use std::sync::{Arc, Mutex};

use sqlbridge_core::{Bridge, ForeignValue, IsolationLevel, SemanticType, TypeCode, Value};
use sqlbridge_driver::{
    Driver, DriverError, DriverResult, ForeignColumn, ForeignConnection, ForeignResultSet,
};

use crate::{Command, Error, Session, SessionConfig};

#[derive(Debug, Clone, Copy, Default)]
struct Script {
    refuse_connect: bool,
    fail_commit: bool,
    fail_rollback: bool,
    fail_close: bool,
    /// Type code reported for every query column
    column_code: Option<TypeCode>,
}

type CallLog = Arc<Mutex<Vec<String>>>;

struct ScriptedDriver {
    script: Script,
    calls: CallLog,
}

impl Driver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn accepts(&self, _url: &str) -> bool {
        true
    }

    fn connect(&self, url: &str) -> DriverResult<Box<dyn ForeignConnection>> {
        if self.script.refuse_connect {
            return Err(DriverError::MalformedUrl {
                url: url.to_string(),
                reason: "refused by script".to_string(),
            });
        }
        Ok(Box::new(ScriptedConnection {
            script: self.script,
            calls: Arc::clone(&self.calls),
            closed: false,
        }))
    }
}

struct ScriptedConnection {
    script: Script,
    calls: CallLog,
    closed: bool,
}

impl ScriptedConnection {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn scripted_failure(op: &str) -> DriverError {
    DriverError::Unsupported {
        reason: format!("{} failed by script", op),
    }
}

impl ForeignConnection for ScriptedConnection {
    fn begin(&mut self, isolation: i32) -> DriverResult<()> {
        self.record(format!("begin {}", isolation));
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.record("commit");
        if self.script.fail_commit {
            return Err(scripted_failure("commit"));
        }
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.record("rollback");
        if self.script.fail_rollback {
            return Err(scripted_failure("rollback"));
        }
        Ok(())
    }

    fn execute_update(&mut self, sql: &str, params: Vec<ForeignValue>) -> DriverResult<u64> {
        self.record(format!("update {} [{}]", sql, params.len()));
        Ok(1)
    }

    fn execute_query(
        &mut self,
        sql: &str,
        params: Vec<ForeignValue>,
    ) -> DriverResult<ForeignResultSet> {
        self.record(format!("query {} [{}]", sql, params.len()));
        let code = self.script.column_code.unwrap_or(TypeCode::BIGINT);
        let columns = vec![ForeignColumn {
            name: "N".to_string(),
            type_code: code,
            declared_type: None,
        }];
        Ok(ForeignResultSet::new(columns, vec![vec![ForeignValue::Long(7)]]))
    }

    fn close(&mut self) -> DriverResult<()> {
        self.record("close");
        self.closed = true;
        if self.script.fail_close {
            return Err(scripted_failure("close"));
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

fn scripted_session(script: Script) -> (Result<Session, Error>, CallLog) {
    let calls = CallLog::default();
    let driver = Arc::new(ScriptedDriver {
        script,
        calls: Arc::clone(&calls),
    });
    let session = Session::open_with(
        driver,
        Arc::new(Bridge::standard()),
        SessionConfig::new("scripted:"),
    );
    (session, calls)
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// =============================================================================
// Connection
// =============================================================================

#[test]
fn test_refused_connection_keeps_driver_cause() {
    let (result, _) = scripted_session(Script {
        refuse_connect: true,
        ..Script::default()
    });
    match result {
        Err(Error::Connection { source, .. }) => {
            assert!(matches!(source, DriverError::MalformedUrl { .. }));
        }
        other => panic!("Expected Connection, got {:?}", other),
    }
}

#[test]
fn test_close_failure_is_suppressed() {
    let (session, log) = scripted_session(Script {
        fail_close: true,
        ..Script::default()
    });
    let mut session = session.unwrap();
    session.close();
    assert!(!session.is_open());
    assert_eq!(calls(&log), vec!["close"]);
}

#[test]
fn test_drop_rolls_back_then_closes() {
    let (session, log) = scripted_session(Script {
        fail_rollback: true,
        ..Script::default()
    });
    let mut session = session.unwrap();
    session.begin_transaction(None).unwrap();
    drop(session);

    let log = calls(&log);
    assert_eq!(&log[1..], ["rollback", "close"]);
}

// =============================================================================
// Transaction slot
// =============================================================================

#[test]
fn test_failed_commit_clears_slot_and_rolls_back() {
    let (session, log) = scripted_session(Script {
        fail_commit: true,
        ..Script::default()
    });
    let mut session = session.unwrap();
    session
        .begin_transaction(Some(IsolationLevel::Serializable))
        .unwrap();

    let result = session.commit();
    assert!(
        matches!(result, Err(Error::Driver { .. })),
        "Expected Driver, got {:?}",
        result,
    );
    assert!(!session.in_transaction());
    assert_eq!(calls(&log), vec!["begin 8", "commit", "rollback"]);

    // A fresh transaction may begin afterwards
    assert!(session.begin_transaction(None).is_ok());
}

#[test]
fn test_failed_rollback_clears_slot() {
    let (session, _) = scripted_session(Script {
        fail_rollback: true,
        ..Script::default()
    });
    let mut session = session.unwrap();
    session.begin_transaction(None).unwrap();

    assert!(matches!(session.rollback(), Err(Error::Driver { .. })));
    assert!(!session.in_transaction());
}

#[test]
fn test_isolation_reaches_driver_as_constant() {
    let (session, log) = scripted_session(Script::default());
    let mut session = session.unwrap();
    session
        .begin_transaction(Some(IsolationLevel::ReadCommitted))
        .unwrap();
    session.rollback().unwrap();
    session
        .begin_transaction(Some(IsolationLevel::Unspecified))
        .unwrap();
    session.rollback().unwrap();

    assert_eq!(
        calls(&log),
        vec!["begin 2", "rollback", "begin 0", "rollback"]
    );
}

#[test]
fn test_unsupported_isolation_never_reaches_driver() {
    let (session, log) = scripted_session(Script::default());
    let mut session = session.unwrap();
    assert!(session
        .begin_transaction(Some(IsolationLevel::Snapshot))
        .is_err());
    assert!(calls(&log).is_empty());
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_encoding_failure_sends_nothing() {
    let (session, log) = scripted_session(Script::default());
    let mut session = session.unwrap();

    let cmd = Command::new("INSERT INTO t VALUES (?, ?)")
        .bind(SemanticType::Int32, 1)
        .bind(SemanticType::Byte, 300i64);
    let result = session.execute_non_query(cmd);
    assert!(
        matches!(result, Err(Error::ConversionFailed { .. })),
        "Expected ConversionFailed, got {:?}",
        result,
    );
    assert!(calls(&log).is_empty());
}

#[test]
fn test_parameters_reach_driver_in_order() {
    let (session, log) = scripted_session(Script::default());
    let mut session = session.unwrap();

    let cmd = Command::new("INSERT INTO t VALUES (?, ?)")
        .bind(SemanticType::Int32, 1)
        .bind(SemanticType::AnsiString, "x");
    assert_eq!(session.execute_non_query(cmd).unwrap(), 1);
    assert_eq!(calls(&log), vec!["update INSERT INTO t VALUES (?, ?) [2]"]);
}

#[test]
fn test_unknown_column_code_fails_query() {
    let (session, _) = scripted_session(Script {
        column_code: Some(TypeCode::BIT),
        ..Script::default()
    });
    let mut session = session.unwrap();

    let result = session.execute_query("SELECT n FROM t");
    assert!(
        matches!(result, Err(Error::UnknownTypeCode { .. })),
        "Expected UnknownTypeCode, got {:?}",
        result,
    );
}

#[test]
fn test_scalar_decodes_through_column_code() {
    let (session, _) = scripted_session(Script {
        column_code: Some(TypeCode::INTEGER),
        ..Script::default()
    });
    let mut session = session.unwrap();
    assert_eq!(session.execute_scalar("SELECT n").unwrap(), Value::I32(7));
}
