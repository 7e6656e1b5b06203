//! Shared types for CivicDesk

pub mod error;

pub use error::{CivicDeskError, Result};
