//! HTTP server for CivicDesk

pub mod http;

pub use http::{run, AppState};
