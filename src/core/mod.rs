//! Core modules for Phasegate's hook runtime.
//!
//! Shared primitives: error type, store layout, timestamps, the hook
//! envelope, and the two append-only logs (audit, diagnostics).

pub mod audit;
pub mod diag;
pub mod error;
pub mod hook;
pub mod store;
pub mod time;
