//! Test modules for the executor crate.

pub mod faults;
pub mod session;
