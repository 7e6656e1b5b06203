//! Citizen document schema
//!
//! Stores identity, profile and entitlement state. The email is the only
//! lookup key and is protected by a unique index.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for citizens
pub const CITIZEN_COLLECTION: &str = "users";

/// Role of a registered account
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen,
    Staff,
    Admin,
}

/// Citizen document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CitizenDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Unique email address
    pub email: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub photo_url: String,

    #[serde(default)]
    pub role: Role,

    /// Premium entitlement lifts the free-tier issue quota
    #[serde(default)]
    pub is_premium: bool,

    /// When premium was activated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium_at: Option<DateTime>,

    #[serde(default)]
    pub is_blocked: bool,

    /// Checkout session ids already applied to this citizen
    #[serde(default)]
    pub premium_sessions: Vec<String>,
}

impl CitizenDoc {
    /// Create a new free-tier citizen
    pub fn new(email: String, display_name: String, photo_url: String, now: DateTime) -> Self {
        Self {
            _id: None,
            metadata: Metadata::at(now),
            email,
            display_name,
            photo_url,
            role: Role::Citizen,
            is_premium: false,
            premium_at: None,
            is_blocked: false,
            premium_sessions: Vec::new(),
        }
    }

    /// Whether a checkout session has already been applied
    pub fn has_applied_session(&self, session_id: &str) -> bool {
        self.premium_sessions.iter().any(|s| s == session_id)
    }
}

impl IntoIndexes for CitizenDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "email": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("email_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CitizenDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
