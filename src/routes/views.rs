//! JSON shapes returned to clients
//!
//! Ids render as 24-hex strings and timestamps as RFC 3339. The checkout
//! session ledger stays internal.

use bson::{oid::ObjectId, DateTime};
use chrono::Utc;
use serde::Serialize;

use crate::db::schemas::{CitizenDoc, IssueDoc, IssuePriority, IssueStatus, Role, TimelineEntry};

fn hex(id: Option<ObjectId>) -> Option<String> {
    id.map(|id| id.to_hex())
}

fn rfc3339(at: Option<DateTime>) -> Option<chrono::DateTime<Utc>> {
    at.map(DateTime::to_chrono)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenView {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    pub role: Role,
    pub is_premium: bool,
    pub premium_at: Option<chrono::DateTime<Utc>>,
    pub is_blocked: bool,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

impl From<&CitizenDoc> for CitizenView {
    fn from(c: &CitizenDoc) -> Self {
        Self {
            id: hex(c._id),
            email: c.email.clone(),
            display_name: c.display_name.clone(),
            photo_url: c.photo_url.clone(),
            role: c.role,
            is_premium: c.is_premium,
            premium_at: rfc3339(c.premium_at),
            is_blocked: c.is_blocked,
            created_at: rfc3339(c.metadata.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    pub status: IssueStatus,
    pub message: String,
    pub updated_by: String,
    pub time: chrono::DateTime<Utc>,
}

impl From<&TimelineEntry> for TimelineView {
    fn from(t: &TimelineEntry) -> Self {
        Self {
            status: t.status,
            message: t.message.clone(),
            updated_by: t.updated_by.clone(),
            time: t.time.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueView {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub user_email: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub image: String,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub upvotes: i64,
    pub upvoted_by: Vec<String>,
    pub assigned_staff: Option<String>,
    pub timeline: Vec<TimelineView>,
    pub created_at: Option<chrono::DateTime<Utc>>,
    pub updated_at: Option<chrono::DateTime<Utc>>,
}

impl From<&IssueDoc> for IssueView {
    fn from(i: &IssueDoc) -> Self {
        Self {
            id: hex(i._id),
            user_email: i.user_email.clone(),
            title: i.details.title.clone(),
            description: i.details.description.clone(),
            category: i.details.category.clone(),
            location: i.details.location.clone(),
            image: i.details.image.clone(),
            status: i.status,
            priority: i.priority,
            upvotes: i.upvotes,
            upvoted_by: i.upvoted_by.clone(),
            assigned_staff: i.assigned_staff.clone(),
            timeline: i.timeline.iter().map(TimelineView::from).collect(),
            created_at: rfc3339(i.metadata.created_at),
            updated_at: rfc3339(i.metadata.updated_at),
        }
    }
}
