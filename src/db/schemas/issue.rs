//! Issue document schema
//!
//! Stores a reported municipal problem together with its append-only
//! status timeline.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for issues
pub const ISSUE_COLLECTION: &str = "issues";

/// Timeline message recorded when a citizen reports an issue
pub const REPORTED_MESSAGE: &str = "Issue reported by citizen";

/// Actor label for changes made by the reporting citizen
pub const CITIZEN_ACTOR: &str = "Citizen";

/// Issue status
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IssueStatus {
    /// Reported, waiting for triage
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Fixed
    Resolved,
    /// Will not be handled
    Rejected,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Allowed status graph.
    ///
    /// `pending -> in-progress | rejected`,
    /// `in-progress -> resolved | rejected | pending`,
    /// `resolved -> in-progress` (reopen). `rejected` is terminal.
    pub fn can_transition_to(&self, next: IssueStatus) -> bool {
        use IssueStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Rejected)
                | (InProgress, Resolved)
                | (InProgress, Rejected)
                | (InProgress, Pending)
                | (Resolved, InProgress)
        )
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue priority
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

/// One immutable entry of an issue's timeline
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub status: IssueStatus,
    pub message: String,
    /// Actor label ("Citizen", staff name, ...)
    pub updated_by: String,
    pub time: DateTime,
}

/// Free-text issue fields, opaque to the lifecycle rules
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IssueDetails {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
}

/// Issue document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IssueDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Email of the reporting citizen, immutable after creation
    pub user_email: String,

    #[serde(flatten)]
    pub details: IssueDetails,

    #[serde(default)]
    pub status: IssueStatus,

    #[serde(default)]
    pub priority: IssuePriority,

    #[serde(default)]
    pub upvotes: i64,

    /// Emails of citizens who upvoted (no duplicates)
    #[serde(default)]
    pub upvoted_by: Vec<String>,

    #[serde(default)]
    pub assigned_staff: Option<String>,

    /// Append-only status history
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
}

impl IssueDoc {
    /// Build a freshly reported issue: pending, normal priority, no votes,
    /// unassigned, with the initial timeline entry.
    pub fn reported(user_email: String, details: IssueDetails, now: DateTime) -> Self {
        Self {
            _id: None,
            metadata: Metadata::at(now),
            user_email,
            details,
            status: IssueStatus::Pending,
            priority: IssuePriority::Normal,
            upvotes: 0,
            upvoted_by: Vec::new(),
            assigned_staff: None,
            timeline: vec![TimelineEntry {
                status: IssueStatus::Pending,
                message: REPORTED_MESSAGE.to_string(),
                updated_by: CITIZEN_ACTOR.to_string(),
                time: now,
            }],
        }
    }
}

impl IntoIndexes for IssueDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_email": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_email_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for IssueDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
