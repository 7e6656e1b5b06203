//! Database schemas for CivicDesk
//!
//! Defines MongoDB document structures for citizens and issues.

mod citizen;
mod issue;
mod metadata;

pub use citizen::{CitizenDoc, Role, CITIZEN_COLLECTION};
pub use issue::{
    IssueDetails, IssueDoc, IssuePriority, IssueStatus, TimelineEntry, CITIZEN_ACTOR,
    ISSUE_COLLECTION, REPORTED_MESSAGE,
};
pub use metadata::Metadata;
