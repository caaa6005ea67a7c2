//! Utility functions and helpers.
//!
//! - [`error`] - Error types shared by every crate
//! - [`hash`] - Fast hash map aliases

pub mod error;
pub mod hash;
