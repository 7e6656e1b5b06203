//! Payment Upgrade Flow
//!
//! Opens a one-time checkout session for the premium tier and, once the
//! provider reports the session as paid, flips the citizen to premium.
//! Confirmation is replay-safe: applied session ids are recorded on the
//! citizen and a replay returns the stored result without another provider
//! round-trip.

use std::collections::HashMap;
use std::sync::Arc;

use bson::DateTime;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::offline::SESSION_ID_PLACEHOLDER;
use super::{CheckoutRequest, PaymentProvider, PaymentStatus, EMAIL_METADATA_KEY};
use crate::citizens::require_email_address;
use crate::config::Args;
use crate::db::schemas::CitizenDoc;
use crate::store::{CitizenStore, PremiumActivation};
use crate::types::{CivicDeskError, Result};

const PRODUCT_NAME: &str = "Premium Subscription";

/// What the premium tier costs and where the provider sends the citizen back
#[derive(Debug, Clone, PartialEq)]
pub struct PremiumOffer {
    /// Price in whole currency units
    pub price: u64,
    pub currency: String,
    pub product_name: String,
    /// Public site origin without a trailing slash
    pub site_origin: String,
}

impl PremiumOffer {
    pub fn from_args(args: &Args) -> Self {
        Self {
            price: args.payments.premium_price,
            currency: args.payments.premium_currency.to_lowercase(),
            product_name: PRODUCT_NAME.to_string(),
            site_origin: args.site_origin().to_string(),
        }
    }

    fn amount_minor(&self) -> Result<u64> {
        self.price
            .checked_mul(100)
            .ok_or_else(|| CivicDeskError::Config("Premium price overflows minor units".into()))
    }

    fn success_url(&self) -> String {
        format!(
            "{}/dashboard/payment-success?session_id={}",
            self.site_origin, SESSION_ID_PLACEHOLDER
        )
    }

    fn cancel_url(&self) -> String {
        format!("{}/dashboard/payment-canceled", self.site_origin)
    }
}

impl Default for PremiumOffer {
    fn default() -> Self {
        Self {
            price: 1000,
            currency: "usd".to_string(),
            product_name: PRODUCT_NAME.to_string(),
            site_origin: "http://localhost:5173".to_string(),
        }
    }
}

/// Outcome of a checkout confirmation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResult {
    pub email: String,
    pub is_premium: bool,
    pub premium_at: Option<chrono::DateTime<Utc>>,
    pub session_id: String,
    /// The session had been applied by an earlier confirmation
    pub already_applied: bool,
}

impl ConfirmResult {
    fn from_citizen(citizen: &CitizenDoc, session_id: &str, already_applied: bool) -> Self {
        Self {
            email: citizen.email.clone(),
            is_premium: citizen.is_premium,
            premium_at: citizen.premium_at.map(DateTime::to_chrono),
            session_id: session_id.to_string(),
            already_applied,
        }
    }
}

pub struct PaymentUpgradeFlow {
    citizens: Arc<dyn CitizenStore>,
    provider: Arc<dyn PaymentProvider>,
    offer: PremiumOffer,
}

impl PaymentUpgradeFlow {
    pub fn new(
        citizens: Arc<dyn CitizenStore>,
        provider: Arc<dyn PaymentProvider>,
        offer: PremiumOffer,
    ) -> Self {
        Self {
            citizens,
            provider,
            offer,
        }
    }

    pub fn provider_kind(&self) -> &'static str {
        self.provider.kind()
    }

    /// Open a checkout session and return the provider's redirect URL
    pub async fn create_checkout(&self, email: Option<&str>) -> Result<String> {
        let email = require_email_address(email, "Email")?;

        let request = CheckoutRequest {
            amount_minor: self.offer.amount_minor()?,
            currency: self.offer.currency.clone(),
            product_name: self.offer.product_name.clone(),
            customer_email: email.clone(),
            success_url: self.offer.success_url(),
            cancel_url: self.offer.cancel_url(),
            metadata: HashMap::from([(EMAIL_METADATA_KEY.to_string(), email.clone())]),
        };

        let session = self.provider.create_checkout_session(request).await?;
        info!(email = %email, session_id = %session.id, "Checkout session created");
        Ok(session.url)
    }

    /// Verify a session with the provider and grant premium on payment
    pub async fn confirm_checkout(
        &self,
        session_id: Option<&str>,
        email: Option<&str>,
    ) -> Result<ConfirmResult> {
        let session_id = session_id.map(str::trim).unwrap_or_default();
        if session_id.is_empty() {
            return Err(CivicDeskError::InvalidArgument("Session ID is required".into()));
        }
        let email = require_email_address(email, "Email")?;

        let citizen = self
            .citizens
            .find_by_email(&email)
            .await?
            .ok_or_else(|| CivicDeskError::NotFound("User not found".into()))?;
        if citizen.has_applied_session(session_id) {
            info!(email = %email, session_id = %session_id, "Checkout session already applied");
            return Ok(ConfirmResult::from_citizen(&citizen, session_id, true));
        }

        let session = self.provider.retrieve_session(session_id).await?;
        if session.payment_status != PaymentStatus::Paid {
            return Err(CivicDeskError::PaymentNotCompleted(
                "Payment not completed".into(),
            ));
        }
        if let Some(owner) = session.email() {
            if !owner.eq_ignore_ascii_case(&email) {
                warn!(
                    email = %email,
                    session_email = %owner,
                    session_id = %session_id,
                    "Checkout session belongs to another citizen"
                );
                return Err(CivicDeskError::InvalidArgument(
                    "Checkout session does not belong to this user".into(),
                ));
            }
        }

        match self
            .citizens
            .activate_premium(&email, session_id, DateTime::now())
            .await?
        {
            PremiumActivation::Activated(citizen) => {
                info!(email = %email, session_id = %session_id, "Premium activated");
                Ok(ConfirmResult::from_citizen(&citizen, session_id, false))
            }
            PremiumActivation::AlreadyApplied(citizen) => {
                Ok(ConfirmResult::from_citizen(&citizen, session_id, true))
            }
            PremiumActivation::NotFound => Err(CivicDeskError::NotFound("User not found".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issues::{CreateIssueRequest, IssueLifecycle};
    use crate::payments::{CheckoutSession, SessionStatus};
    use crate::quota::QuotaPolicy;
    use crate::store::{MemoryCitizenStore, MemoryIssueStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider whose sessions report a preset status
    struct ScriptedProvider {
        status: PaymentStatus,
        session_email: Option<String>,
        fail: bool,
        retrievals: AtomicUsize,
        last_request: Mutex<Option<CheckoutRequest>>,
    }

    impl ScriptedProvider {
        fn paying(email: &str) -> Self {
            Self {
                status: PaymentStatus::Paid,
                session_email: Some(email.to_string()),
                fail: false,
                retrievals: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl PaymentProvider for ScriptedProvider {
        fn kind(&self) -> &'static str {
            "scripted"
        }

        async fn create_checkout_session(
            &self,
            request: CheckoutRequest,
        ) -> Result<CheckoutSession> {
            if self.fail {
                return Err(CivicDeskError::Upstream("gateway down".into()));
            }
            *self.last_request.lock().unwrap() = Some(request);
            Ok(CheckoutSession {
                id: "cs_test_1".into(),
                url: "https://checkout.test/cs_test_1".into(),
            })
        }

        async fn retrieve_session(&self, _session_id: &str) -> Result<SessionStatus> {
            self.retrievals.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CivicDeskError::Upstream("gateway down".into()));
            }
            let mut metadata = HashMap::new();
            if let Some(ref email) = self.session_email {
                metadata.insert(EMAIL_METADATA_KEY.to_string(), email.clone());
            }
            Ok(SessionStatus {
                payment_status: self.status,
                metadata,
            })
        }
    }

    async fn citizens_with(email: &str) -> Arc<MemoryCitizenStore> {
        let store = Arc::new(MemoryCitizenStore::new());
        store
            .insert(CitizenDoc::new(
                email.to_string(),
                String::new(),
                String::new(),
                DateTime::now(),
            ))
            .await
            .unwrap();
        store
    }

    fn flow(
        citizens: Arc<MemoryCitizenStore>,
        provider: Arc<ScriptedProvider>,
    ) -> PaymentUpgradeFlow {
        PaymentUpgradeFlow::new(citizens, provider, PremiumOffer::default())
    }

    #[tokio::test]
    async fn test_create_checkout_request_shape() {
        let provider = Arc::new(ScriptedProvider::paying("a@x.com"));
        let flow = flow(citizens_with("a@x.com").await, provider.clone());

        let url = flow.create_checkout(Some("a@x.com")).await.unwrap();
        assert_eq!(url, "https://checkout.test/cs_test_1");

        let request = provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.amount_minor, 100_000);
        assert_eq!(request.currency, "usd");
        assert_eq!(request.product_name, "Premium Subscription");
        assert_eq!(request.metadata[EMAIL_METADATA_KEY], "a@x.com");
        assert_eq!(
            request.success_url,
            "http://localhost:5173/dashboard/payment-success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            request.cancel_url,
            "http://localhost:5173/dashboard/payment-canceled"
        );
    }

    #[tokio::test]
    async fn test_create_checkout_errors() {
        let flow_ok = flow(
            citizens_with("a@x.com").await,
            Arc::new(ScriptedProvider::paying("a@x.com")),
        );
        assert!(matches!(
            flow_ok.create_checkout(None).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));

        let mut failing = ScriptedProvider::paying("a@x.com");
        failing.fail = true;
        let flow_down = flow(citizens_with("a@x.com").await, Arc::new(failing));
        assert!(matches!(
            flow_down.create_checkout(Some("a@x.com")).await,
            Err(CivicDeskError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_unpaid_session_leaves_citizen_free() {
        let citizens = citizens_with("a@x.com").await;
        let mut unpaid = ScriptedProvider::paying("a@x.com");
        unpaid.status = PaymentStatus::Unpaid;
        let flow = flow(citizens.clone(), Arc::new(unpaid));

        let err = flow
            .confirm_checkout(Some("cs_1"), Some("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CivicDeskError::PaymentNotCompleted(_)));

        let citizen = citizens.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(!citizen.is_premium);
        assert!(citizen.premium_sessions.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_is_replay_safe() {
        let citizens = citizens_with("a@x.com").await;
        let provider = Arc::new(ScriptedProvider::paying("a@x.com"));
        let flow = flow(citizens.clone(), provider.clone());

        let first = flow
            .confirm_checkout(Some("cs_1"), Some("a@x.com"))
            .await
            .unwrap();
        assert!(first.is_premium);
        assert!(first.premium_at.is_some());
        assert!(!first.already_applied);

        let second = flow
            .confirm_checkout(Some("cs_1"), Some("a@x.com"))
            .await
            .unwrap();
        assert!(second.already_applied);
        assert_eq!(second.premium_at, first.premium_at);
        assert_eq!(provider.retrievals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirm_validation() {
        let citizens = citizens_with("a@x.com").await;
        let flow_ok = flow(
            citizens.clone(),
            Arc::new(ScriptedProvider::paying("someone@else.com")),
        );

        assert!(matches!(
            flow_ok.confirm_checkout(None, Some("a@x.com")).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(matches!(
            flow_ok.confirm_checkout(Some("cs_1"), None).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(matches!(
            flow_ok.confirm_checkout(Some("cs_1"), Some("ghost@x.com")).await,
            Err(CivicDeskError::NotFound(_))
        ));
        assert!(matches!(
            flow_ok.confirm_checkout(Some("cs_1"), Some("a@x.com")).await,
            Err(CivicDeskError::InvalidArgument(_))
        ));
        assert!(!citizens.find_by_email("a@x.com").await.unwrap().unwrap().is_premium);
    }

    #[tokio::test]
    async fn test_premium_lifts_quota() {
        let citizens = citizens_with("a@x.com").await;
        let lifecycle = IssueLifecycle::new(
            citizens.clone(),
            Arc::new(MemoryIssueStore::new()),
            QuotaPolicy::default(),
        );
        let report = || CreateIssueRequest {
            user_email: Some("a@x.com".into()),
            ..Default::default()
        };
        for _ in 0..3 {
            lifecycle.create(report()).await.unwrap();
        }
        assert!(matches!(
            lifecycle.create(report()).await,
            Err(CivicDeskError::QuotaExceeded(_))
        ));

        let flow = flow(citizens, Arc::new(ScriptedProvider::paying("a@x.com")));
        flow.confirm_checkout(Some("cs_1"), Some("a@x.com"))
            .await
            .unwrap();

        tokio_test::assert_ok!(lifecycle.create(report()).await);
    }
}
