//! The governance engine.
//!
//! A phase-lifecycle state machine gating mutation of externally-stored
//! artifacts, a word-set similarity matcher preventing duplicate artifact
//! proliferation, and the document store both read from.

pub mod engine;
pub mod kind;
pub mod phase;
pub mod registry;
pub mod similarity;
