//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built spool scenarios for testing
//! the collector without a real Postfix installation.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
