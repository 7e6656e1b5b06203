//! Premium upgrade payments
//!
//! The upgrade flow only knows the [`PaymentProvider`] trait. Production uses
//! [`StripeProvider`]; development mode uses [`OfflineProvider`], which
//! settles every session immediately.

pub mod offline;
pub mod stripe;
pub mod upgrade;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::Result;

pub use offline::OfflineProvider;
pub use stripe::StripeProvider;
pub use upgrade::{ConfirmResult, PaymentUpgradeFlow, PremiumOffer};

/// Metadata key correlating a checkout session to a citizen
pub const EMAIL_METADATA_KEY: &str = "email";

/// Parameters for a single-item, one-time checkout session
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Amount in minor currency units (cents)
    pub amount_minor: u64,
    pub currency: String,
    pub product_name: String,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

/// A session issued by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub id: String,
    /// Where the citizen is redirected to pay
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Provider view of an existing session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub payment_status: PaymentStatus,
    pub metadata: HashMap<String, String>,
}

impl SessionStatus {
    pub fn email(&self) -> Option<&str> {
        self.metadata.get(EMAIL_METADATA_KEY).map(String::as_str)
    }
}

/// External payment gateway
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Short name of the provider, for health output
    fn kind(&self) -> &'static str;

    async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession>;

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus>;
}
