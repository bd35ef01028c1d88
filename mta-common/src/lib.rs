//! # MTA Common Library
//!
//! Shared code for the magic trick analyzer crates including:
//! - Database initialization and effect-type seeding
//! - Persisted domain models (books, tricks, effect types, cross-references)
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
pub use db::models::{
    Book, CrossReference, Difficulty, EffectType, PageRange, RelationshipType, ReviewStatus,
    Trick,
};
