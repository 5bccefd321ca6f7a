//! Common types, errors, and utilities for the Agon benchmark harness.

pub mod error;
pub mod types;

pub use error::{AgonError, AgonResult};
pub use types::*;
