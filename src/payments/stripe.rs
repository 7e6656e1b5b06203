//! Stripe Checkout client
//!
//! Talks to the Stripe REST API directly: form-encoded
//! `POST /v1/checkout/sessions` to open a session and
//! `GET /v1/checkout/sessions/{id}` to read its payment status.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error};

use super::{CheckoutRequest, CheckoutSession, PaymentProvider, PaymentStatus, SessionStatus};
use crate::types::{CivicDeskError, Result};

const SESSIONS_PATH: &str = "/v1/checkout/sessions";

/// Session object as returned by Stripe (only the fields we read)
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

pub struct StripeProvider {
    http_client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeProvider {
    pub fn new(api_base: &str, secret_key: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("civicdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CivicDeskError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}{}", self.api_base, SESSIONS_PATH)
    }

    async fn read_session(&self, response: reqwest::Response) -> Result<StripeSession> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<StripeSession>()
                .await
                .map_err(|e| CivicDeskError::Upstream(format!("Malformed Stripe session: {}", e)));
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<StripeErrorBody>(&body)
            .ok()
            .map(|b| {
                format!(
                    "{}: {}",
                    b.error.kind.unwrap_or_else(|| "error".into()),
                    b.error.message.unwrap_or_default()
                )
            })
            .unwrap_or(body);

        error!(status = %status, detail = %detail, "Stripe request failed");
        if status == StatusCode::NOT_FOUND {
            return Err(CivicDeskError::NotFound("Checkout session not found".into()));
        }
        Err(CivicDeskError::Upstream(format!("Stripe returned {}: {}", status, detail)))
    }
}

/// Stripe's bracketed form encoding for a one-item payment session
fn session_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount_minor.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.product_name.clone(),
        ),
    ];

    let mut keys: Vec<_> = request.metadata.keys().collect();
    keys.sort();
    for key in keys {
        form.push((format!("metadata[{}]", key), request.metadata[key].clone()));
    }
    form
}

fn payment_status(raw: Option<&str>) -> PaymentStatus {
    match raw {
        Some("paid") | Some("no_payment_required") => PaymentStatus::Paid,
        _ => PaymentStatus::Unpaid,
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn kind(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        debug!(email = %request.customer_email, amount = request.amount_minor, "Creating Stripe checkout session");

        let response = self
            .http_client
            .post(self.sessions_url())
            .bearer_auth(&self.secret_key)
            .form(&session_form(&request))
            .send()
            .await?;

        let session = self.read_session(response).await?;
        let url = session
            .url
            .ok_or_else(|| CivicDeskError::Upstream("Stripe session has no redirect URL".into()))?;

        Ok(CheckoutSession { id: session.id, url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus> {
        let url = format!(
            "{}/{}",
            self.sessions_url(),
            urlencoding::encode(session_id)
        );
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let session = self.read_session(response).await?;
        debug!(
            session_id = %session.id,
            payment_status = ?session.payment_status,
            "Retrieved Stripe checkout session"
        );

        Ok(SessionStatus {
            payment_status: payment_status(session.payment_status.as_deref()),
            metadata: session.metadata,
        })
    }
}
