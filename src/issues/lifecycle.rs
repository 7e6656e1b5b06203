//! Issue Lifecycle Manager
//!
//! Creation is quota-gated. Concurrent creations for the same citizen are
//! serialized through a per-email gate so that the count-then-insert
//! sequence cannot overshoot the quota within one process. Several
//! processes sharing one database can still race past the limit by the
//! number of instances minus one; that case is best-effort.
//!
//! Updates and deletes are scoped by an ownership filter evaluated by the
//! store at write time. Status, priority and assignment changes append to
//! the timeline in the same write.

use std::sync::Arc;

use bson::{oid::ObjectId, DateTime};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::requests::{parse_issue_id, CreateIssueRequest, UpdateIssueRequest};
use crate::citizens::require_email;
use crate::db::schemas::{IssueDoc, IssueStatus, TimelineEntry, CITIZEN_ACTOR};
use crate::quota::QuotaPolicy;
use crate::store::{CitizenStore, IssuePatch, IssueStore, UpvoteOutcome};
use crate::types::{CivicDeskError, Result};

const NOT_FOUND_OR_UNAUTHORIZED: &str = "Issue not found or not authorized";
const UNTRACKED_MESSAGE: &str = "message requires a status, priority or assignment change";

/// Creates, reads, updates and deletes issues
pub struct IssueLifecycle {
    citizens: Arc<dyn CitizenStore>,
    issues: Arc<dyn IssueStore>,
    quota: QuotaPolicy,
    creation_gates: DashMap<String, Arc<Mutex<()>>>,
}

impl IssueLifecycle {
    pub fn new(
        citizens: Arc<dyn CitizenStore>,
        issues: Arc<dyn IssueStore>,
        quota: QuotaPolicy,
    ) -> Self {
        Self {
            citizens,
            issues,
            quota,
            creation_gates: DashMap::new(),
        }
    }

    pub fn quota(&self) -> QuotaPolicy {
        self.quota
    }

    pub fn store_kind(&self) -> &'static str {
        self.issues.kind()
    }

    /// Report a new issue for a registered citizen
    pub async fn create(&self, request: CreateIssueRequest) -> Result<IssueDoc> {
        let email = require_email(request.user_email.as_deref(), "userEmail")?;

        let gate = self.creation_gates.entry(email.clone()).or_default().clone();
        let result = {
            let _held = gate.lock().await;
            self.create_gated(&email, &request).await
        };
        drop(gate);
        self.creation_gates
            .remove_if(&email, |_, g| Arc::strong_count(g) == 1);

        result
    }

    async fn create_gated(&self, email: &str, request: &CreateIssueRequest) -> Result<IssueDoc> {
        let citizen = self
            .citizens
            .find_by_email(email)
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("User not found".into()))?;

        let count = self.issues.count_by_owner(email).await?;
        if !self.quota.allow_new_issue(&citizen, count) {
            warn!(email = %email, count, "Issue quota exceeded");
            return Err(CivicDeskError::QuotaExceeded(self.quota.denial_message()));
        }

        let issue = IssueDoc::reported(email.to_string(), request.details(), DateTime::now());
        let stored = self.issues.insert(issue).await?;

        info!(
            email = %email,
            issue_id = ?stored._id,
            premium = citizen.is_premium,
            "Issue reported"
        );
        Ok(stored)
    }

    /// Fetch one issue; the id is validated before the store is touched
    pub async fn get(&self, id: &str) -> Result<IssueDoc> {
        let id = parse_issue_id(id)?;
        self.issues
            .find_by_id(id)
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("Issue not found".into()))
    }

    /// All issues reported by a citizen, oldest first
    pub async fn list_by_owner(&self, email: Option<&str>) -> Result<Vec<IssueDoc>> {
        let email = require_email(email, "userEmail")?;
        self.issues.find_by_owner(&email).await
    }

    /// Apply a validated partial update to an issue owned by `email`
    pub async fn update(
        &self,
        id: &str,
        email: &str,
        request: UpdateIssueRequest,
    ) -> Result<IssueDoc> {
        let id = parse_issue_id(id)?;
        let owner = require_email(Some(email), "Email")?;

        if request.message.is_some() && !request.touches_timeline() {
            return Err(CivicDeskError::InvalidArgument(UNTRACKED_MESSAGE.into()));
        }
        if request.is_empty() {
            return Err(CivicDeskError::InvalidArgument("No fields to update".into()));
        }

        let now = DateTime::now();
        let mut patch = IssuePatch {
            details: request.details(),
            ..Default::default()
        };

        if request.touches_timeline() {
            let current = self
                .issues
                .find_owned(id, &owner)
                .await?
                .ok_or_else(|| CivicDeskError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.into()))?;
            plan_tracked_changes(&current, &request, now, &mut patch)?;
        }

        let updated = self.issues.update_owned(id, &owner, &patch, now).await?;

        match updated {
            Some(issue) => {
                info!(
                    issue_id = %id,
                    email = %owner,
                    status = %issue.status,
                    timeline_entries = patch.timeline.len(),
                    "Issue updated"
                );
                Ok(issue)
            }
            None if patch.expected_status.is_some() => {
                // The guard missed: either the status moved or the issue is gone
                match self.issues.find_owned(id, &owner).await? {
                    Some(_) => Err(CivicDeskError::Conflict(
                        "Issue was modified concurrently, retry the update".into(),
                    )),
                    None => Err(CivicDeskError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.into())),
                }
            }
            None => Err(CivicDeskError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.into())),
        }
    }

    /// Delete an issue owned by `email`, returning the number removed
    pub async fn delete(&self, id: &str, email: &str) -> Result<u64> {
        let id = parse_issue_id(id)?;
        let owner = require_email(Some(email), "Email")?;

        let deleted = self.issues.delete_owned(id, &owner).await?;
        if deleted == 0 {
            debug!(issue_id = %id, email = %owner, "Delete matched nothing");
            return Err(CivicDeskError::NotFound(NOT_FOUND_OR_UNAUTHORIZED.into()));
        }

        info!(issue_id = %id, email = %owner, "Issue deleted");
        Ok(deleted)
    }

    /// Register one upvote from a citizen on someone else's issue
    pub async fn upvote(&self, id: &str, voter: Option<&str>) -> Result<IssueDoc> {
        let id: ObjectId = parse_issue_id(id)?;
        let voter = require_email(voter, "Email")?;

        if self.citizens.find_by_email(&voter).await?.is_none() {
            return Err(CivicDeskError::NotFound("User not found".into()));
        }

        let issue = self
            .issues
            .find_by_id(id)
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("Issue not found".into()))?;
        if issue.user_email == voter {
            return Err(CivicDeskError::InvalidArgument(
                "Citizens cannot upvote their own issue".into(),
            ));
        }

        match self.issues.add_upvote(id, &voter, DateTime::now()).await? {
            UpvoteOutcome::Recorded(issue) => {
                info!(issue_id = %id, voter = %voter, upvotes = issue.upvotes, "Issue upvoted");
                Ok(issue)
            }
            UpvoteOutcome::AlreadyUpvoted => Err(CivicDeskError::Conflict(
                "Issue already upvoted by this citizen".into(),
            )),
            UpvoteOutcome::NotFound => Err(CivicDeskError::NotFound("Issue not found".into())),
        }
    }
}

/// Validate status/priority/assignment changes against the current record
/// and add the matching timeline entries to `patch`.
fn plan_tracked_changes(
    current: &IssueDoc,
    request: &UpdateIssueRequest,
    now: DateTime,
    patch: &mut IssuePatch,
) -> Result<()> {
    let mut status = current.status;
    let mut entries: Vec<(IssueStatus, String)> = Vec::new();

    if let Some(next) = request.status {
        if next != current.status {
            if !current.status.can_transition_to(next) {
                return Err(CivicDeskError::InvalidTransition(format!(
                    "Cannot move issue from {} to {}",
                    current.status, next
                )));
            }
            patch.status = Some(next);
            status = next;
            entries.push((
                next,
                format!("Status changed from {} to {}", current.status, next),
            ));
        }
    }

    if let Some(priority) = request.priority {
        patch.priority = Some(priority);
        if priority != current.priority {
            entries.push((status, format!("Priority set to {}", priority.as_str())));
        }
    }

    if let Some(ref staff) = request.assigned_staff {
        patch.assigned_staff = Some(staff.clone());
        if *staff != current.assigned_staff {
            let message = match staff {
                Some(name) => format!("Assigned to {}", name),
                None => "Assignment cleared".to_string(),
            };
            entries.push((status, message));
        }
    }

    if let Some(ref note) = request.message {
        match entries.first_mut() {
            Some(first) => first.1 = note.clone(),
            None => return Err(CivicDeskError::InvalidArgument(UNTRACKED_MESSAGE.into())),
        }
    }

    patch.timeline = entries
        .into_iter()
        .map(|(status, message)| TimelineEntry {
            status,
            message,
            updated_by: CITIZEN_ACTOR.to_string(),
            time: now,
        })
        .collect();
    // Guard against a concurrent change invalidating the checks above
    patch.expected_status = Some(current.status);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{CitizenDoc, IssuePriority, REPORTED_MESSAGE};
    use crate::store::{MemoryCitizenStore, MemoryIssueStore};
    use async_trait::async_trait;

    /// What happens to the stored issue just before a guarded write lands
    #[derive(Clone, Copy)]
    enum Interference {
        Deleted,
        Rejected,
    }

    /// Memory store that lets another writer slip in ahead of `update_owned`
    struct InterferingIssueStore {
        inner: MemoryIssueStore,
        interference: Interference,
    }

    #[async_trait]
    impl IssueStore for InterferingIssueStore {
        fn kind(&self) -> &'static str {
            "interfering"
        }

        async fn insert(&self, issue: IssueDoc) -> Result<IssueDoc> {
            self.inner.insert(issue).await
        }

        async fn find_by_id(&self, id: ObjectId) -> Result<Option<IssueDoc>> {
            self.inner.find_by_id(id).await
        }

        async fn find_owned(&self, id: ObjectId, owner: &str) -> Result<Option<IssueDoc>> {
            self.inner.find_owned(id, owner).await
        }

        async fn find_by_owner(&self, owner: &str) -> Result<Vec<IssueDoc>> {
            self.inner.find_by_owner(owner).await
        }

        async fn count_by_owner(&self, owner: &str) -> Result<u64> {
            self.inner.count_by_owner(owner).await
        }

        async fn update_owned(
            &self,
            id: ObjectId,
            owner: &str,
            patch: &IssuePatch,
            now: DateTime,
        ) -> Result<Option<IssueDoc>> {
            match self.interference {
                Interference::Deleted => {
                    self.inner.delete_owned(id, owner).await?;
                }
                Interference::Rejected => {
                    let reject = IssuePatch {
                        status: Some(IssueStatus::Rejected),
                        ..Default::default()
                    };
                    self.inner.update_owned(id, owner, &reject, now).await?;
                }
            }
            self.inner.update_owned(id, owner, patch, now).await
        }

        async fn delete_owned(&self, id: ObjectId, owner: &str) -> Result<u64> {
            self.inner.delete_owned(id, owner).await
        }

        async fn add_upvote(
            &self,
            id: ObjectId,
            voter: &str,
            now: DateTime,
        ) -> Result<UpvoteOutcome> {
            self.inner.add_upvote(id, voter, now).await
        }
    }

    async fn interfering_lifecycle(interference: Interference) -> (IssueLifecycle, String) {
        let citizens = Arc::new(MemoryCitizenStore::new());
        citizens
            .insert(CitizenDoc::new(
                "a@x.com".into(),
                String::new(),
                String::new(),
                DateTime::now(),
            ))
            .await
            .unwrap();
        let lifecycle = IssueLifecycle::new(
            citizens,
            Arc::new(InterferingIssueStore {
                inner: MemoryIssueStore::new(),
                interference,
            }),
            QuotaPolicy::default(),
        );
        let issue = lifecycle.create(report("a@x.com", "t")).await.unwrap();
        (lifecycle, issue._id.unwrap().to_hex())
    }

    struct Fixture {
        citizens: Arc<MemoryCitizenStore>,
        lifecycle: Arc<IssueLifecycle>,
    }

    async fn fixture(emails: &[&str]) -> Fixture {
        let citizens = Arc::new(MemoryCitizenStore::new());
        for email in emails {
            citizens
                .insert(CitizenDoc::new(
                    email.to_string(),
                    String::new(),
                    String::new(),
                    DateTime::now(),
                ))
                .await
                .unwrap();
        }
        let lifecycle = Arc::new(IssueLifecycle::new(
            citizens.clone(),
            Arc::new(MemoryIssueStore::new()),
            QuotaPolicy::default(),
        ));
        Fixture {
            citizens,
            lifecycle,
        }
    }

    fn report(email: &str, title: &str) -> CreateIssueRequest {
        CreateIssueRequest {
            user_email: Some(email.to_string()),
            title: Some(title.to_string()),
            category: Some("streetlight".to_string()),
            ..Default::default()
        }
    }

    fn update(json: &str) -> UpdateIssueRequest {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_free_citizen_fourth_issue_denied() {
        let f = fixture(&["a@x.com"]).await;
        for n in 0..3 {
            let issue = f
                .lifecycle
                .create(report("a@x.com", &format!("issue {}", n)))
                .await
                .unwrap();
            assert!(issue._id.is_some());
        }

        let err = f.lifecycle.create(report("a@x.com", "fourth")).await.unwrap_err();
        assert!(matches!(err, CivicDeskError::QuotaExceeded(_)));
        assert_eq!(f.lifecycle.list_by_owner(Some("a@x.com")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_premium_citizen_never_hits_quota() {
        let f = fixture(&["p@x.com"]).await;
        f.citizens
            .activate_premium("p@x.com", "cs_1", DateTime::now())
            .await
            .unwrap();

        for n in 0..6 {
            tokio_test::assert_ok!(f.lifecycle.create(report("p@x.com", &format!("{}", n))).await);
        }
    }

    #[tokio::test]
    async fn test_concurrent_creates_respect_quota() {
        let f = fixture(&["race@x.com"]).await;
        let mut handles = Vec::new();
        for n in 0..8 {
            let lifecycle = Arc::clone(&f.lifecycle);
            handles.push(tokio::spawn(async move {
                lifecycle.create(report("race@x.com", &format!("{}", n))).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 3);
    }

    #[tokio::test]
    async fn test_create_requires_registered_citizen() {
        let f = fixture(&[]).await;
        let err = f.lifecycle.create(report("ghost@x.com", "t")).await.unwrap_err();
        assert!(matches!(err, CivicDeskError::NotFound(_)));

        let err = f
            .lifecycle
            .create(CreateIssueRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_created_issue_shape() {
        let f = fixture(&["a@x.com"]).await;
        let issue = f.lifecycle.create(report("a@x.com", "Pothole")).await.unwrap();

        assert_eq!(issue.status, IssueStatus::Pending);
        assert_eq!(issue.priority, IssuePriority::Normal);
        assert_eq!(issue.details.title, "Pothole");
        assert_eq!(issue.timeline.len(), 1);
        assert_eq!(issue.timeline[0].status, IssueStatus::Pending);
        assert_eq!(issue.timeline[0].message, REPORTED_MESSAGE);

        let fetched = f
            .lifecycle
            .get(&issue._id.unwrap().to_hex())
            .await
            .unwrap();
        assert_eq!(fetched, issue);
    }

    #[tokio::test]
    async fn test_get_validates_id() {
        let f = fixture(&[]).await;
        let err = f.lifecycle.get("not-a-valid-id").await.unwrap_err();
        assert!(matches!(err, CivicDeskError::InvalidArgument(_)));

        let err = f.lifecycle.get(&ObjectId::new().to_hex()).await.unwrap_err();
        assert!(matches!(err, CivicDeskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_requires_email() {
        let f = fixture(&[]).await;
        assert!(matches!(
            f.lifecycle.list_by_owner(None).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.lifecycle.list_by_owner(Some("")).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(f
            .lifecycle
            .list_by_owner(Some("nobody@x.com"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_wrong_owner_keeps_issue() {
        let f = fixture(&["right@x.com"]).await;
        let issue = f.lifecycle.create(report("right@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        let err = f.lifecycle.delete(&id, "wrong@x.com").await.unwrap_err();
        assert!(matches!(err, CivicDeskError::NotFound(_)));
        assert!(f.lifecycle.get(&id).await.is_ok());

        assert_eq!(f.lifecycle.delete(&id, "right@x.com").await.unwrap(), 1);
        assert!(matches!(
            f.lifecycle.get(&id).await,
            Err(CivicDeskError::NotFound(_))
        ));
        assert!(matches!(
            f.lifecycle.delete("bad-id", "right@x.com").await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_update_with_wrong_owner_fails() {
        let f = fixture(&["right@x.com"]).await;
        let issue = f.lifecycle.create(report("right@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        for body in [r#"{"title":"hijack"}"#, r#"{"status":"in-progress"}"#] {
            let err = f
                .lifecycle
                .update(&id, "wrong@x.com", update(body))
                .await
                .unwrap_err();
            assert!(matches!(err, CivicDeskError::NotFound(_)));
        }
        assert_eq!(f.lifecycle.get(&id).await.unwrap().details.title, "t");
    }

    #[tokio::test]
    async fn test_status_update_appends_timeline() {
        let f = fixture(&["a@x.com"]).await;
        let issue = f.lifecycle.create(report("a@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        let updated = f
            .lifecycle
            .update(
                &id,
                "a@x.com",
                update(r#"{"status":"in-progress","priority":"high","message":"Crew dispatched"}"#),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, IssueStatus::InProgress);
        assert_eq!(updated.priority, IssuePriority::High);
        assert_eq!(updated.timeline.len(), 3);
        assert_eq!(updated.timeline[0].status, IssueStatus::Pending);
        assert_eq!(updated.timeline[1].status, IssueStatus::InProgress);
        assert_eq!(updated.timeline[1].message, "Crew dispatched");
        assert_eq!(updated.timeline[2].message, "Priority set to high");
        assert_eq!(updated.user_email, "a@x.com");
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let f = fixture(&["a@x.com"]).await;
        let issue = f.lifecycle.create(report("a@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        let err = f
            .lifecycle
            .update(&id, "a@x.com", update(r#"{"status":"resolved"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::InvalidTransition(_)));

        f.lifecycle
            .update(&id, "a@x.com", update(r#"{"status":"rejected"}"#))
            .await
            .unwrap();
        let err = f
            .lifecycle
            .update(&id, "a@x.com", update(r#"{"status":"pending"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_detail_update_leaves_timeline() {
        let f = fixture(&["a@x.com"]).await;
        let issue = f.lifecycle.create(report("a@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        let updated = f
            .lifecycle
            .update(&id, "a@x.com", update(r#"{"description":"Deeper than it looks"}"#))
            .await
            .unwrap();
        assert_eq!(updated.details.description, "Deeper than it looks");
        assert_eq!(updated.timeline.len(), 1);

        let err = f
            .lifecycle
            .update(&id, "a@x.com", update("{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_non_address_owner_matches_nothing() {
        let f = fixture(&["right@x.com"]).await;
        let issue = f.lifecycle.create(report("right@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        assert_eq!(
            f.lifecycle.list_by_owner(Some("citizen42")).await.unwrap(),
            Vec::new()
        );
        assert!(matches!(
            f.lifecycle.delete(&ObjectId::new().to_hex(), "citizen42").await,
            Err(CivicDeskError::NotFound(_))
        ));
        assert!(matches!(
            f.lifecycle.delete(&id, "citizen42").await,
            Err(CivicDeskError::NotFound(_))
        ));
        for body in [r#"{"title":"hijack"}"#, r#"{"status":"in-progress"}"#] {
            assert!(matches!(
                f.lifecycle.update(&id, "citizen42", update(body)).await,
                Err(CivicDeskError::NotFound(_))
            ));
        }
        assert!(f.lifecycle.get(&id).await.is_ok());
    }

    #[tokio::test]
    async fn test_tracked_update_on_deleted_issue_is_not_found() {
        let (lifecycle, id) = interfering_lifecycle(Interference::Deleted).await;
        let err = lifecycle
            .update(&id, "a@x.com", update(r#"{"status":"in-progress"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tracked_update_after_status_moved_is_conflict() {
        let (lifecycle, id) = interfering_lifecycle(Interference::Rejected).await;
        let err = lifecycle
            .update(&id, "a@x.com", update(r#"{"status":"in-progress"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::Conflict(_)));
        assert_eq!(lifecycle.get(&id).await.unwrap().status, IssueStatus::Rejected);
    }

    #[tokio::test]
    async fn test_message_needs_tracked_change() {
        let f = fixture(&["a@x.com"]).await;
        let issue = f.lifecycle.create(report("a@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        for body in [
            r#"{"message":"just a note"}"#,
            r#"{"description":"d","message":"note"}"#,
            r#"{"status":"pending","message":"note"}"#,
        ] {
            let err = f
                .lifecycle
                .update(&id, "a@x.com", update(body))
                .await
                .unwrap_err();
            assert!(matches!(err, CivicDeskError::InvalidArgument(_)), "{}", body);
        }

        let stored = f.lifecycle.get(&id).await.unwrap();
        assert_eq!(stored.details.description, "");
        assert_eq!(stored.timeline.len(), 1);
    }

    #[tokio::test]
    async fn test_upvotes() {
        let f = fixture(&["owner@x.com", "fan@x.com"]).await;
        let issue = f.lifecycle.create(report("owner@x.com", "t")).await.unwrap();
        let id = issue._id.unwrap().to_hex();

        let voted = f.lifecycle.upvote(&id, Some("fan@x.com")).await.unwrap();
        assert_eq!(voted.upvotes, 1);
        assert_eq!(voted.upvoted_by, vec!["fan@x.com".to_string()]);

        assert!(matches!(
            f.lifecycle.upvote(&id, Some("fan@x.com")).await,
            Err(CivicDeskError::Conflict(_))
        ));
        assert!(matches!(
            f.lifecycle.upvote(&id, Some("owner@x.com")).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(matches!(
            f.lifecycle.upvote(&id, Some("stranger@x.com")).await,
            Err(CivicDeskError::NotFound(_))
        ));
    }
}
