//! MongoDB-backed stores

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::debug;

use super::{
    CitizenProfilePatch, CitizenStore, IssuePatch, IssueStore, PremiumActivation, UpvoteOutcome,
};
use crate::db::schemas::{CitizenDoc, IssueDoc, CITIZEN_COLLECTION, ISSUE_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{CivicDeskError, Result};

/// Citizens collection
pub struct MongoCitizenStore {
    collection: MongoCollection<CitizenDoc>,
}

impl MongoCitizenStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            collection: mongo.collection::<CitizenDoc>(CITIZEN_COLLECTION).await?,
        })
    }
}

/// `$set` document touching only the profile fields present in the patch
fn profile_update(patch: &CitizenProfilePatch, now: DateTime) -> Document {
    let mut set = doc! { "metadata.updated_at": now };
    if let Some(ref name) = patch.display_name {
        set.insert("display_name", name.clone());
    }
    if let Some(ref photo) = patch.photo_url {
        set.insert("photo_url", photo.clone());
    }
    doc! { "$set": set }
}

/// Filter and update granting premium once per checkout session
fn premium_activation(email: &str, session_id: &str, now: DateTime) -> (Document, Document) {
    let filter = doc! {
        "email": email,
        "premium_sessions": { "$ne": session_id },
    };
    let update = doc! {
        "$set": {
            "is_premium": true,
            "premium_at": now,
            "metadata.updated_at": now,
        },
        "$push": { "premium_sessions": session_id },
    };
    (filter, update)
}

#[async_trait]
impl CitizenStore for MongoCitizenStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<CitizenDoc>> {
        self.collection.find_one(doc! { "email": email }).await
    }

    async fn insert(&self, mut citizen: CitizenDoc) -> Result<CitizenDoc> {
        let id = self.collection.insert_one(citizen.clone()).await?;
        citizen._id = Some(id);
        Ok(citizen)
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &CitizenProfilePatch,
        now: DateTime,
    ) -> Result<Option<CitizenDoc>> {
        let matched = self
            .collection
            .update_one(doc! { "email": email }, profile_update(patch, now))
            .await?;
        if matched == 0 {
            return Ok(None);
        }
        self.find_by_email(email).await
    }

    async fn activate_premium(
        &self,
        email: &str,
        session_id: &str,
        now: DateTime,
    ) -> Result<PremiumActivation> {
        let (filter, update) = premium_activation(email, session_id, now);

        if let Some(citizen) = self.collection.find_one_and_update(filter, update).await? {
            return Ok(PremiumActivation::Activated(citizen));
        }

        // Either the email is unknown or the session is already in the ledger
        Ok(match self.find_by_email(email).await? {
            Some(citizen) => PremiumActivation::AlreadyApplied(citizen),
            None => PremiumActivation::NotFound,
        })
    }
}

/// Issues collection
pub struct MongoIssueStore {
    collection: MongoCollection<IssueDoc>,
}

impl MongoIssueStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            collection: mongo.collection::<IssueDoc>(ISSUE_COLLECTION).await?,
        })
    }
}

fn owned_filter(id: ObjectId, owner: &str) -> Document {
    doc! { "_id": id, "user_email": owner }
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<bson::Bson> {
    bson::to_bson(value).map_err(|e| CivicDeskError::Internal(format!("BSON encoding failed: {}", e)))
}

/// Translate a patch into a single `$set`/`$push` update document
fn patch_update(patch: &IssuePatch, now: DateTime) -> Result<Document> {
    let mut set = doc! { "metadata.updated_at": now };

    for (field, value) in patch.details.fields() {
        set.insert(field, value);
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    if let Some(priority) = patch.priority {
        set.insert("priority", priority.as_str());
    }
    if let Some(ref staff) = patch.assigned_staff {
        set.insert("assigned_staff", to_bson(staff)?);
    }

    let mut update = doc! { "$set": set };
    if !patch.timeline.is_empty() {
        update.insert(
            "$push",
            doc! { "timeline": { "$each": to_bson(&patch.timeline)? } },
        );
    }

    Ok(update)
}

/// Filter and update recording one vote per voter
fn upvote_once(id: ObjectId, voter: &str, now: DateTime) -> (Document, Document) {
    let filter = doc! { "_id": id, "upvoted_by": { "$ne": voter } };
    let update = doc! {
        "$push": { "upvoted_by": voter },
        "$inc": { "upvotes": 1_i64 },
        "$set": { "metadata.updated_at": now },
    };
    (filter, update)
}

#[async_trait]
impl IssueStore for MongoIssueStore {
    fn kind(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(&self, mut issue: IssueDoc) -> Result<IssueDoc> {
        let id = self.collection.insert_one(issue.clone()).await?;
        issue._id = Some(id);
        Ok(issue)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<IssueDoc>> {
        self.collection.find_one(doc! { "_id": id }).await
    }

    async fn find_owned(&self, id: ObjectId, owner: &str) -> Result<Option<IssueDoc>> {
        self.collection.find_one(owned_filter(id, owner)).await
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<IssueDoc>> {
        self.collection
            .find_many(
                doc! { "user_email": owner },
                doc! { "metadata.created_at": 1, "_id": 1 },
            )
            .await
    }

    async fn count_by_owner(&self, owner: &str) -> Result<u64> {
        self.collection
            .count_documents(doc! { "user_email": owner })
            .await
    }

    async fn update_owned(
        &self,
        id: ObjectId,
        owner: &str,
        patch: &IssuePatch,
        now: DateTime,
    ) -> Result<Option<IssueDoc>> {
        let mut filter = owned_filter(id, owner);
        if let Some(expected) = patch.expected_status {
            filter.insert("status", expected.as_str());
        }

        let update = patch_update(patch, now)?;
        debug!(issue_id = %id, ?update, "Applying issue update");

        self.collection.find_one_and_update(filter, update).await
    }

    async fn delete_owned(&self, id: ObjectId, owner: &str) -> Result<u64> {
        self.collection.delete_one(owned_filter(id, owner)).await
    }

    async fn add_upvote(&self, id: ObjectId, voter: &str, now: DateTime) -> Result<UpvoteOutcome> {
        let (filter, update) = upvote_once(id, voter, now);

        if let Some(issue) = self.collection.find_one_and_update(filter, update).await? {
            return Ok(UpvoteOutcome::Recorded(issue));
        }

        Ok(match self.find_by_id(id).await? {
            Some(_) => UpvoteOutcome::AlreadyUpvoted,
            None => UpvoteOutcome::NotFound,
        })
    }
}
