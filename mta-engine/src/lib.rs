//! mta-engine library interface
//!
//! Turns OCR'd magic books into a store of individual tricks and links
//! tricks across books (duplicates, variations, attributed sources).
//!
//! The extraction and cross-reference computations are pure and
//! synchronous ([`workflow`]); [`TrickEngine`] wraps them with SQLite
//! persistence, per-book write locking and cancellation.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

pub use crate::config::EngineConfig;
pub use crate::engine::{NewBook, TrickEngine};
pub use crate::error::{EngineError, EngineResult};
pub use crate::models::RecomputeScope;
