//! CivicDesk - municipal issue-reporting backend
//!
//! Citizens register, report infrastructure issues and may buy a one-time
//! premium upgrade that lifts the free-tier reporting quota.
//!
//! ## Components
//!
//! - **Quota Policy**: whether a citizen may report another issue
//! - **Issue Lifecycle**: creation, owner-scoped updates and deletes, timeline
//! - **Payment Upgrade Flow**: checkout sessions and premium activation
//! - **Stores**: MongoDB-backed or in-memory citizen and issue storage

pub mod citizens;
pub mod config;
pub mod db;
pub mod issues;
pub mod payments;
pub mod quota;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{CivicDeskError, Result};
