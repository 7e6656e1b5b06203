//! In-memory stores
//!
//! Used in development mode when MongoDB is unreachable, and by tests.
//! Each operation takes a single lock, which gives the same per-document
//! atomicity the MongoDB implementation gets from single-document writes.

use async_trait::async_trait;
use bson::{oid::ObjectId, DateTime};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;

use super::{
    CitizenProfilePatch, CitizenStore, IssuePatch, IssueStore, PremiumActivation, UpvoteOutcome,
};
use crate::db::schemas::{CitizenDoc, IssueDoc};
use crate::types::{CivicDeskError, Result};

/// Citizens keyed by email
#[derive(Default)]
pub struct MemoryCitizenStore {
    citizens: DashMap<String, CitizenDoc>,
}

impl MemoryCitizenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CitizenStore for MemoryCitizenStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CitizenDoc>> {
        Ok(self.citizens.get(email).map(|c| c.clone()))
    }

    async fn insert(&self, mut citizen: CitizenDoc) -> Result<CitizenDoc> {
        match self.citizens.entry(citizen.email.clone()) {
            Entry::Occupied(_) => Err(CivicDeskError::Conflict(format!(
                "Citizen {} already exists",
                citizen.email
            ))),
            Entry::Vacant(slot) => {
                citizen._id = Some(ObjectId::new());
                slot.insert(citizen.clone());
                Ok(citizen)
            }
        }
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &CitizenProfilePatch,
        now: DateTime,
    ) -> Result<Option<CitizenDoc>> {
        Ok(self.citizens.get_mut(email).map(|mut citizen| {
            patch.apply_to(&mut citizen, now);
            citizen.clone()
        }))
    }

    async fn activate_premium(
        &self,
        email: &str,
        session_id: &str,
        now: DateTime,
    ) -> Result<PremiumActivation> {
        let Some(mut citizen) = self.citizens.get_mut(email) else {
            return Ok(PremiumActivation::NotFound);
        };

        if citizen.has_applied_session(session_id) {
            return Ok(PremiumActivation::AlreadyApplied(citizen.clone()));
        }

        citizen.is_premium = true;
        citizen.premium_at = Some(now);
        citizen.premium_sessions.push(session_id.to_string());
        citizen.metadata.touch(now);

        Ok(PremiumActivation::Activated(citizen.clone()))
    }
}

/// Issues in insertion order
#[derive(Default)]
pub struct MemoryIssueStore {
    issues: RwLock<Vec<IssueDoc>>,
}

impl MemoryIssueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_owned(issue: &IssueDoc, id: ObjectId, owner: &str) -> bool {
    issue._id == Some(id) && issue.user_email == owner
}

#[async_trait]
impl IssueStore for MemoryIssueStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, mut issue: IssueDoc) -> Result<IssueDoc> {
        issue._id = Some(ObjectId::new());
        self.issues.write().await.push(issue.clone());
        Ok(issue)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<IssueDoc>> {
        let issues = self.issues.read().await;
        Ok(issues.iter().find(|i| i._id == Some(id)).cloned())
    }

    async fn find_owned(&self, id: ObjectId, owner: &str) -> Result<Option<IssueDoc>> {
        let issues = self.issues.read().await;
        Ok(issues.iter().find(|i| is_owned(i, id, owner)).cloned())
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<IssueDoc>> {
        let issues = self.issues.read().await;
        Ok(issues
            .iter()
            .filter(|i| i.user_email == owner)
            .cloned()
            .collect())
    }

    async fn count_by_owner(&self, owner: &str) -> Result<u64> {
        let issues = self.issues.read().await;
        Ok(issues.iter().filter(|i| i.user_email == owner).count() as u64)
    }

    async fn update_owned(
        &self,
        id: ObjectId,
        owner: &str,
        patch: &IssuePatch,
        now: DateTime,
    ) -> Result<Option<IssueDoc>> {
        let mut issues = self.issues.write().await;
        let target = issues.iter_mut().find(|i| {
            is_owned(i, id, owner) && patch.expected_status.map_or(true, |s| i.status == s)
        });

        Ok(target.map(|issue| {
            patch.apply_to(issue, now);
            issue.clone()
        }))
    }

    async fn delete_owned(&self, id: ObjectId, owner: &str) -> Result<u64> {
        let mut issues = self.issues.write().await;
        match issues.iter().position(|i| is_owned(i, id, owner)) {
            Some(index) => {
                issues.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn add_upvote(&self, id: ObjectId, voter: &str, now: DateTime) -> Result<UpvoteOutcome> {
        let mut issues = self.issues.write().await;
        let Some(issue) = issues.iter_mut().find(|i| i._id == Some(id)) else {
            return Ok(UpvoteOutcome::NotFound);
        };

        if issue.upvoted_by.iter().any(|v| v == voter) {
            return Ok(UpvoteOutcome::AlreadyUpvoted);
        }

        issue.upvoted_by.push(voter.to_string());
        issue.upvotes += 1;
        issue.metadata.touch(now);
        Ok(UpvoteOutcome::Recorded(issue.clone()))
    }
}
