//! Error handling
//!
//! Defines error types for the storage and server layers.

pub mod types;

pub use types::*;
