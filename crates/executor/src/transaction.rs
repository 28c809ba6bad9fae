//! Transaction handles owned by a session.

use serde::{Deserialize, Serialize};
use sqlbridge_core::IsolationLevel;

/// Lifecycle state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// A transaction begun on a session.
///
/// Ids increase monotonically per session, starting at 1. The session
/// keeps the active transaction; `commit`/`rollback` hand back the
/// finished one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: u64,
    isolation: IsolationLevel,
    state: TransactionState,
}

impl Transaction {
    pub(crate) fn begin(id: u64, isolation: IsolationLevel) -> Self {
        Self {
            id,
            isolation,
            state: TransactionState::Active,
        }
    }

    pub(crate) fn finish(mut self, state: TransactionState) -> Self {
        self.state = state;
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }
}
