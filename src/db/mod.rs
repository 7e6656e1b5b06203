//! Database layer for CivicDesk
//!
//! Provides MongoDB storage for citizens and issues.

pub mod mongo;
pub mod schemas;

pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{CitizenDoc, IssueDoc, Metadata};
