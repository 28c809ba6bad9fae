//! Stateful session: one connection, at most one transaction.
//!
//! The [`Session`] wraps a [`CommandExecutor`] and owns the driver
//! connection plus an optional active [`Transaction`]. Commands run inside
//! the active transaction when there is one and in autocommit mode
//! otherwise.
//!
//! # Usage
//!
//! ```ignore
//! use sqlbridge_executor::{Command, Session};
//!
//! let mut session = Session::open_in_memory()?;
//! session.execute_non_query(Command::new("CREATE TABLE t (n INTEGER)"))?;
//!
//! session.begin_transaction(None)?;
//! session.execute_non_query(Command::new("INSERT INTO t VALUES (?)").bind_inferred(1))?;
//! session.commit()?;
//! ```
//!
//! Teardown never fails: `close()` and `Drop` roll back an active
//! transaction, close the connection and log anything that goes wrong.

use std::sync::Arc;

use sqlbridge_core::{Bridge, IsolationLevel, Value};
use sqlbridge_driver::{redact, Driver, ForeignConnection, SqliteDriver};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::command::Command;
use crate::config::SessionConfig;
use crate::executor::CommandExecutor;
use crate::table::ResultTable;
use crate::transaction::{Transaction, TransactionState};
use crate::{Error, Result};

/// A connection to the engine plus its transaction slot.
pub struct Session {
    id: Uuid,
    driver: Arc<dyn Driver>,
    config: SessionConfig,
    executor: CommandExecutor,
    connection: Option<Box<dyn ForeignConnection>>,
    transaction: Option<Transaction>,
    next_transaction_id: u64,
}

impl Session {
    /// Create a closed session.
    ///
    /// Fails with `InvalidInput` for an empty connection string, before the
    /// driver is involved.
    pub fn new(driver: Arc<dyn Driver>, bridge: Arc<Bridge>, config: SessionConfig) -> Result<Self> {
        if config.connection_string.trim().is_empty() {
            return Err(Error::invalid_input("connection string must not be empty"));
        }
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            driver,
            config,
            executor: CommandExecutor::new(bridge),
            connection: None,
            transaction: None,
            next_transaction_id: 1,
        })
    }

    /// Create a session and open it.
    pub fn open_with(driver: Arc<dyn Driver>, bridge: Arc<Bridge>, config: SessionConfig) -> Result<Self> {
        let mut session = Self::new(driver, bridge, config)?;
        session.open()?;
        Ok(session)
    }

    /// Open a session on the bundled engine with the standard table.
    pub fn connect(config: SessionConfig) -> Result<Self> {
        let bridge = Arc::new(Bridge::with_context(config.convert_context()));
        Self::open_with(Arc::new(SqliteDriver::new()), bridge, config)
    }

    /// Open a session on a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::connect(SessionConfig::in_memory())
    }

    /// Acquire the connection.
    ///
    /// The driver's refusal is reported as `Connection` with the driver
    /// error kept as its source.
    pub fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Err(Error::invalid_operation("session is already open"));
        }
        let url = &self.config.connection_string;
        let conn = self.driver.connect(url).map_err(|source| Error::Connection {
            reason: format!("cannot open '{}' with the {} driver", redact(url), self.driver.name()),
            source,
        })?;
        self.connection = Some(conn);
        info!(target: "sqlbridge::session", session = %self.id, url = %redact(url), "Session opened");
        Ok(())
    }

    /// Release the transaction (rolling it back) and then the connection.
    ///
    /// Failures are logged and suppressed. Closing a closed session is a
    /// no-op.
    pub fn close(&mut self) {
        if let Some(txn) = self.transaction.take() {
            if let Some(conn) = self.connection.as_deref_mut() {
                if let Err(e) = conn.rollback() {
                    warn!(
                        target: "sqlbridge::session",
                        session = %self.id,
                        transaction = txn.id(),
                        error = %e,
                        "Rollback failed while closing session"
                    );
                }
            }
        }
        if let Some(mut conn) = self.connection.take() {
            match conn.close() {
                Ok(()) => info!(target: "sqlbridge::session", session = %self.id, "Session closed"),
                Err(e) => warn!(
                    target: "sqlbridge::session",
                    session = %self.id,
                    error = %e,
                    "Failed to close connection"
                ),
            }
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        self.executor.bridge()
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns whether a transaction is currently active.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// The active transaction, if any
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    // =========================================================================
    // Transaction lifecycle
    // =========================================================================

    /// Begin a transaction; `None` uses the configured default level.
    pub fn begin_transaction(&mut self, isolation: Option<IsolationLevel>) -> Result<Transaction> {
        if self.transaction.is_some() {
            return Err(Error::invalid_operation("a transaction is already active"));
        }
        let level = isolation.unwrap_or(self.config.default_isolation);
        let code = level.to_driver()?;

        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        conn.begin(code)?;

        let txn = Transaction::begin(self.next_transaction_id, level);
        self.next_transaction_id += 1;
        debug!(
            target: "sqlbridge::session",
            session = %self.id,
            transaction = txn.id(),
            isolation = %level,
            "Transaction begun"
        );
        self.transaction = Some(txn.clone());
        Ok(txn)
    }

    /// Commit the active transaction.
    ///
    /// The slot is cleared whether or not the driver call succeeds.
    pub fn commit(&mut self) -> Result<Transaction> {
        let txn = self
            .transaction
            .take()
            .ok_or_else(|| Error::invalid_operation("no active transaction to commit"))?;
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;

        if let Err(e) = conn.commit() {
            // Leave the engine without a dangling transaction
            if let Err(rollback_err) = conn.rollback() {
                debug!(
                    target: "sqlbridge::session",
                    session = %self.id,
                    error = %rollback_err,
                    "Rollback after failed commit also failed"
                );
            }
            return Err(e.into());
        }

        debug!(target: "sqlbridge::session", session = %self.id, transaction = txn.id(), "Transaction committed");
        Ok(txn.finish(TransactionState::Committed))
    }

    /// Roll back the active transaction.
    ///
    /// The slot is cleared whether or not the driver call succeeds.
    pub fn rollback(&mut self) -> Result<Transaction> {
        let txn = self
            .transaction
            .take()
            .ok_or_else(|| Error::invalid_operation("no active transaction to roll back"))?;
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        conn.rollback()?;

        debug!(target: "sqlbridge::session", session = %self.id, transaction = txn.id(), "Transaction rolled back");
        Ok(txn.finish(TransactionState::RolledBack))
    }

    // =========================================================================
    // Command execution
    // =========================================================================

    /// Run a statement that returns no rows; returns the affected row count.
    pub fn execute_non_query(&mut self, cmd: impl Into<Command>) -> Result<u64> {
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        self.executor.execute_non_query(conn, cmd.into())
    }

    /// First column of the first row, `Value::Null` when there is none.
    pub fn execute_scalar(&mut self, cmd: impl Into<Command>) -> Result<Value> {
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        self.executor.execute_scalar(conn, cmd.into())
    }

    /// Run a query and materialize every row.
    pub fn execute_query(&mut self, cmd: impl Into<Command>) -> Result<ResultTable> {
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        self.executor.execute_query(conn, cmd.into())
    }

    /// Run a query and append its rows to `table`; returns the rows appended.
    pub fn fill(&mut self, table: &mut ResultTable, cmd: impl Into<Command>) -> Result<usize> {
        let conn = self.connection.as_deref_mut().ok_or_else(closed)?;
        self.executor.fill(conn, table, cmd.into())
    }

    /// [`execute_query`](Self::execute_query) on the blocking thread pool.
    ///
    /// The connection moves into the background task and comes back when
    /// it finishes. If the task is lost the connection goes with it: the
    /// session is left closed and its transaction slot cleared.
    pub async fn execute_query_async(&mut self, cmd: impl Into<Command>) -> Result<ResultTable> {
        let cmd = cmd.into();
        let mut conn = self.connection.take().ok_or_else(closed)?;
        let executor = self.executor.clone();

        let joined = tokio::task::spawn_blocking(move || {
            let result = executor.execute_query(conn.as_mut(), cmd);
            (conn, result)
        })
        .await;

        match joined {
            Ok((conn, result)) => {
                self.connection = Some(conn);
                result
            }
            Err(e) => {
                self.transaction = None;
                warn!(target: "sqlbridge::session", session = %self.id, error = %e, "Background query task lost");
                Err(Error::Internal {
                    reason: format!("background query task failed: {}", e),
                })
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("driver", &self.driver.name())
            .field("url", &redact(&self.config.connection_string))
            .field("open", &self.is_open())
            .field("transaction", &self.transaction)
            .finish()
    }
}

fn closed() -> Error {
    Error::invalid_operation("session is closed")
}
