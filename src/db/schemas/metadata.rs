//! Common metadata for all documents
//!
//! Tracks creation and update timestamps.

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Common metadata for all documents
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Metadata {
    /// When the document was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,

    /// When the document was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Metadata {
    /// Create metadata stamped with `now`
    pub fn at(now: DateTime) -> Self {
        Self {
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Record a modification
    pub fn touch(&mut self, now: DateTime) {
        self.updated_at = Some(now);
    }
}
