//! Offline payment provider for development mode
//!
//! Sessions are kept in memory and report `paid` as soon as they exist.
//! The redirect URL is the success URL itself, so a local frontend can walk
//! the whole upgrade flow without a gateway account.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use super::{CheckoutRequest, CheckoutSession, PaymentProvider, PaymentStatus, SessionStatus};
use crate::types::{CivicDeskError, Result};

/// Placeholder substituted with the session id in redirect URLs
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Default)]
pub struct OfflineProvider {
    sessions: DashMap<String, HashMap<String, String>>,
}

impl OfflineProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentProvider for OfflineProvider {
    fn kind(&self) -> &'static str {
        "offline"
    }

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        let id = format!("cs_offline_{}", Uuid::new_v4().simple());
        let url = request.success_url.replace(SESSION_ID_PLACEHOLDER, &id);
        self.sessions.insert(id.clone(), request.metadata);

        info!(session_id = %id, email = %request.customer_email, "Offline checkout session issued");
        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus> {
        let metadata = self
            .sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CivicDeskError::NotFound("Checkout session not found".into()))?;

        Ok(SessionStatus {
            payment_status: PaymentStatus::Paid,
            metadata,
        })
    }
}
