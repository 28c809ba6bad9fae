//! Bridge Comprehensive Test Suite
//!
//! End-to-end tests through the public `sqlbridge` API against the bundled
//! engine.
//!
//! ## Modules
//!
//! - **crud**: typed inserts, queries, updates and deletes
//! - **transactions**: commit and rollback visibility
//! - **persistence**: file-backed databases and connection flags
//! - **interchange**: markup export/import and TOML configuration
//! - **value_props**: property tests for value round trips
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test bridge_comprehensive
//! ```

mod common;

mod crud;
mod interchange;
mod persistence;
mod transactions;
mod value_props;
