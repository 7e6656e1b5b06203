//! Issue lifecycle
//!
//! - [`lifecycle`]: quota-gated creation, owner-scoped mutation
//! - [`requests`]: validated request payloads

pub mod lifecycle;
pub mod requests;

pub use lifecycle::IssueLifecycle;
pub use requests::{parse_issue_id, CreateIssueRequest, UpdateIssueRequest, UpvoteRequest};
