//! Common types for monogram
//!
//! This crate provides the shared error type and result alias used across
//! all monogram crates.

pub mod error;

pub use error::{MonogramError, Result};
