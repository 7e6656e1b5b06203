//! Entitlement and issue stores
//!
//! The lifecycle and payment components talk to storage only through the
//! [`CitizenStore`] and [`IssueStore`] traits. Two implementations exist:
//!
//! - [`mongo`]: MongoDB collections, one atomic operation per document
//! - [`memory`]: process-local maps for development mode and tests
//!
//! Both implementations honor the same contract: ownership-scoped updates
//! and deletes are equality filters evaluated at write time, timeline
//! entries are only ever appended, and premium activation is guarded by the
//! per-citizen ledger of applied checkout sessions.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};

use crate::db::schemas::{CitizenDoc, IssueDoc, IssuePriority, IssueStatus, TimelineEntry};
use crate::types::Result;

pub use memory::{MemoryCitizenStore, MemoryIssueStore};
pub use mongo::{MongoCitizenStore, MongoIssueStore};

/// Profile fields a citizen may change about themselves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitizenProfilePatch {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl CitizenProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.photo_url.is_none()
    }

    pub(crate) fn apply_to(&self, citizen: &mut CitizenDoc, now: DateTime) {
        if let Some(ref name) = self.display_name {
            citizen.display_name = name.clone();
        }
        if let Some(ref photo) = self.photo_url {
            citizen.photo_url = photo.clone();
        }
        citizen.metadata.touch(now);
    }
}

/// Outcome of a premium activation attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PremiumActivation {
    /// The session was recorded and the citizen is now premium
    Activated(CitizenDoc),
    /// The session had already been applied; nothing changed
    AlreadyApplied(CitizenDoc),
    /// No citizen with this email
    NotFound,
}

/// Storage for citizens and their entitlement flags
#[async_trait]
pub trait CitizenStore: Send + Sync {
    /// Short name of the backing store, for health output
    fn kind(&self) -> &'static str;

    async fn find_by_email(&self, email: &str) -> Result<Option<CitizenDoc>>;

    /// Insert a new citizen. Fails with `Conflict` if the email is taken.
    async fn insert(&self, citizen: CitizenDoc) -> Result<CitizenDoc>;

    /// Merge profile fields, returning the updated record
    async fn update_profile(
        &self,
        email: &str,
        patch: &CitizenProfilePatch,
        now: DateTime,
    ) -> Result<Option<CitizenDoc>>;

    /// Flip the citizen to premium and record the session, unless the
    /// session is already in the citizen's ledger.
    async fn activate_premium(
        &self,
        email: &str,
        session_id: &str,
        now: DateTime,
    ) -> Result<PremiumActivation>;
}

/// Free-text fields an update may replace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueDetailsPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl IssueDetailsPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.image.is_none()
    }

    /// Field name/value pairs that are set
    pub(crate) fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("category", &self.category),
            ("location", &self.location),
            ("image", &self.image),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

/// A validated, storage-ready issue update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePatch {
    pub details: IssueDetailsPatch,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    /// `Some(None)` clears the assignment
    pub assigned_staff: Option<Option<String>>,
    /// Entries appended to the timeline in the same write
    pub timeline: Vec<TimelineEntry>,
    /// Only apply if the issue still has this status
    pub expected_status: Option<IssueStatus>,
}

impl IssuePatch {
    pub(crate) fn apply_to(&self, issue: &mut IssueDoc, now: DateTime) {
        let d = &self.details;
        if let Some(ref v) = d.title {
            issue.details.title = v.clone();
        }
        if let Some(ref v) = d.description {
            issue.details.description = v.clone();
        }
        if let Some(ref v) = d.category {
            issue.details.category = v.clone();
        }
        if let Some(ref v) = d.location {
            issue.details.location = v.clone();
        }
        if let Some(ref v) = d.image {
            issue.details.image = v.clone();
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(ref staff) = self.assigned_staff {
            issue.assigned_staff = staff.clone();
        }
        issue.timeline.extend(self.timeline.iter().cloned());
        issue.metadata.touch(now);
    }
}

/// Outcome of an upvote attempt
#[derive(Debug, Clone, PartialEq)]
pub enum UpvoteOutcome {
    Recorded(IssueDoc),
    AlreadyUpvoted,
    NotFound,
}

/// Storage for issues and their timelines
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Short name of the backing store, for health output
    fn kind(&self) -> &'static str;

    /// Persist a new issue, returning it with its generated id
    async fn insert(&self, issue: IssueDoc) -> Result<IssueDoc>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<IssueDoc>>;

    /// Find an issue only if it is owned by `owner`
    async fn find_owned(&self, id: ObjectId, owner: &str) -> Result<Option<IssueDoc>>;

    /// All issues of an owner in insertion order
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<IssueDoc>>;

    async fn count_by_owner(&self, owner: &str) -> Result<u64>;

    /// Apply a patch to the issue matching both id and owner
    async fn update_owned(
        &self,
        id: ObjectId,
        owner: &str,
        patch: &IssuePatch,
        now: DateTime,
    ) -> Result<Option<IssueDoc>>;

    /// Delete the issue matching both id and owner, returning the count removed
    async fn delete_owned(&self, id: ObjectId, owner: &str) -> Result<u64>;

    /// Record one upvote per voter
    async fn add_upvote(&self, id: ObjectId, voter: &str, now: DateTime) -> Result<UpvoteOutcome>;
}
