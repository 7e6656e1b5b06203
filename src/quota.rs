//! Free-tier issue quota
//!
//! Premium citizens report without limit. Everyone else may own at most
//! `free_limit` issues at a time; the count is open-ended, not windowed.

use crate::db::schemas::CitizenDoc;

/// Default number of issues a free citizen may own
pub const DEFAULT_FREE_ISSUE_LIMIT: u64 = 3;

/// Decides whether a citizen may report another issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    free_limit: u64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FREE_ISSUE_LIMIT)
    }
}

impl QuotaPolicy {
    pub fn new(free_limit: u64) -> Self {
        Self { free_limit }
    }

    pub fn free_limit(&self) -> u64 {
        self.free_limit
    }

    /// `current_issue_count` is the number of issues the citizen already owns
    pub fn allow_new_issue(&self, citizen: &CitizenDoc, current_issue_count: u64) -> bool {
        citizen.is_premium || current_issue_count < self.free_limit
    }

    /// Denial message shown to free citizens at the limit
    pub fn denial_message(&self) -> String {
        format!("Free users can only report {} issues", self.free_limit)
    }
}
