use std::sync::Arc;

use bson::DateTime;
use serde::Deserialize;
use tracing::info;

use crate::db::schemas::CitizenDoc;
use crate::store::{CitizenProfilePatch, CitizenStore};
use crate::types::{CivicDeskError, Result};

/// Require a caller-supplied email to be present
///
/// Lookups and owner filters take any non-empty value; an unknown owner
/// simply matches nothing.
pub fn require_email(email: Option<&str>, field: &str) -> Result<String> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(CivicDeskError::InvalidArgument(format!("{} is required", field)));
    }
    Ok(email.to_string())
}

/// Require a present, address-shaped email for records that create state
pub fn require_email_address(email: Option<&str>, field: &str) -> Result<String> {
    let email = require_email(email, field)?;
    if !email.contains('@') {
        return Err(CivicDeskError::InvalidArgument(format!(
            "{} must be an email address",
            field
        )));
    }
    Ok(email.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RegisterCitizenRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", alias = "photoUrl")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", alias = "photoUrl")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Created(CitizenDoc),
    Existing(CitizenDoc),
}

impl RegisterOutcome {
    pub fn citizen(&self) -> &CitizenDoc {
        match self {
            Self::Created(c) | Self::Existing(c) => c,
        }
    }
}

/// Registers, reads and updates citizens
pub struct CitizenRegistry {
    store: Arc<dyn CitizenStore>,
}

impl CitizenRegistry {
    pub fn new(store: Arc<dyn CitizenStore>) -> Self {
        Self { store }
    }

    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// Create the citizen, or return the existing record unchanged
    pub async fn register(&self, request: RegisterCitizenRequest) -> Result<RegisterOutcome> {
        let email = require_email_address(request.email.as_deref(), "Email")?;

        if let Some(existing) = self.store.find_by_email(&email).await? {
            return Ok(RegisterOutcome::Existing(existing));
        }

        let citizen = CitizenDoc::new(
            email.clone(),
            request.display_name.unwrap_or_default(),
            request.photo_url.unwrap_or_default(),
            DateTime::now(),
        );

        match self.store.insert(citizen).await {
            Ok(created) => {
                info!(email = %email, "Citizen registered");
                Ok(RegisterOutcome::Created(created))
            }
            // Lost a race with a concurrent registration of the same email
            Err(CivicDeskError::Conflict(_)) => self
                .store
                .find_by_email(&email)
                .await?
                .map(RegisterOutcome::Existing)
                .ok_or_else(|| CivicDeskError::Internal(format!("Citizen {} vanished", email))),
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, email: &str) -> Result<CitizenDoc> {
        let email = require_email(Some(email), "Email")?;
        self.store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("User not found".into()))
    }

    pub async fn update_profile(
        &self,
        email: &str,
        request: ProfileUpdateRequest,
    ) -> Result<CitizenDoc> {
        let email = require_email(Some(email), "Email")?;
        let patch = CitizenProfilePatch {
            display_name: request.display_name,
            photo_url: request.photo_url,
        };
        if patch.is_empty() {
            return Err(CivicDeskError::InvalidArgument("No fields to update".into()));
        }

        let updated = self
            .store
            .update_profile(&email, &patch, DateTime::now())
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("User not found".into()))?;

        info!(email = %email, "Citizen profile updated");
        Ok(updated)
    }
}
