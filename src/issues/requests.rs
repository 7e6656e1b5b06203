//! Typed request payloads for issue operations
//!
//! Unknown fields are rejected, so a client cannot smuggle `_id`,
//! `userEmail`, `timeline` or vote counters into a stored document.

use bson::oid::ObjectId;
use serde::{Deserialize, Deserializer};

use crate::db::schemas::{IssueDetails, IssuePriority, IssueStatus};
use crate::store::IssueDetailsPatch;
use crate::types::{CivicDeskError, Result};

/// Parse an issue id, rejecting anything that is not a store identifier
pub fn parse_issue_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| CivicDeskError::InvalidArgument("Invalid ID".to_string()))
}

/// Body of `POST /issues`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub user_email: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl CreateIssueRequest {
    pub fn details(&self) -> IssueDetails {
        IssueDetails {
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            location: self.location.clone().unwrap_or_default(),
            image: self.image.clone().unwrap_or_default(),
        }
    }
}

/// Body of `PATCH /issues/{email}/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    /// Absent leaves the assignment alone, `null` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    pub assigned_staff: Option<Option<String>>,
    /// Timeline note for this change
    pub message: Option<String>,
}

impl UpdateIssueRequest {
    pub fn details(&self) -> IssueDetailsPatch {
        IssueDetailsPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            location: self.location.clone(),
            image: self.image.clone(),
        }
    }

    /// Whether the update changes anything recorded on the timeline
    pub fn touches_timeline(&self) -> bool {
        self.status.is_some() || self.priority.is_some() || self.assigned_staff.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.details().is_empty() && !self.touches_timeline()
    }
}

/// Body of `POST /issues/{id}/upvote`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpvoteRequest {
    pub email: Option<String>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issue_id() {
        assert!(parse_issue_id("not-a-valid-id").is_err());
        assert!(parse_issue_id("").is_err());
        let id = ObjectId::new();
        assert_eq!(parse_issue_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn test_update_rejects_identity_fields() {
        for body in [
            r#"{"_id":"65f0c0ffee0000000000abcd"}"#,
            r#"{"userEmail":"other@x.com"}"#,
            r#"{"upvotes":99}"#,
            r#"{"timeline":[]}"#,
        ] {
            assert!(serde_json::from_str::<UpdateIssueRequest>(body).is_err(), "{}", body);
        }
    }

    #[test]
    fn test_update_assignment_states() {
        let absent: UpdateIssueRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert_eq!(absent.assigned_staff, None);
        assert!(!absent.touches_timeline());

        let cleared: UpdateIssueRequest =
            serde_json::from_str(r#"{"assignedStaff":null}"#).unwrap();
        assert_eq!(cleared.assigned_staff, Some(None));

        let set: UpdateIssueRequest =
            serde_json::from_str(r#"{"assignedStaff":"crew-7"}"#).unwrap();
        assert_eq!(set.assigned_staff, Some(Some("crew-7".to_string())));
    }

    #[test]
    fn test_update_rejects_unknown_status() {
        assert!(serde_json::from_str::<UpdateIssueRequest>(r#"{"status":"closed"}"#).is_err());
        let ok: UpdateIssueRequest =
            serde_json::from_str(r#"{"status":"in-progress","priority":"high"}"#).unwrap();
        assert_eq!(ok.status, Some(IssueStatus::InProgress));
        assert_eq!(ok.priority, Some(IssuePriority::High));
    }

    #[test]
    fn test_empty_update() {
        let empty: UpdateIssueRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }
}
