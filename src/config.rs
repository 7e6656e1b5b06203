//! Configuration for CivicDesk
//!
//! CLI arguments and environment variable handling using clap.
//! Every flag can also be supplied through the environment or a `.env` file.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// CivicDesk - municipal issue-reporting backend
#[derive(Parser, Debug, Clone)]
#[command(name = "civicdesk")]
#[command(about = "Citizen issue reporting with free-tier quotas and premium upgrades")]
pub struct Args {
    /// Unique node identifier for this instance (log correlation)
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory store fallback, offline payments)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "civicdesk")]
    pub mongodb_db: String,

    /// Payment configuration
    #[command(flatten)]
    pub payments: PaymentArgs,

    /// Number of issues a citizen without premium may report
    #[arg(long, env = "FREE_ISSUE_QUOTA", default_value = "3")]
    pub free_issue_quota: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Timeout for payment provider calls in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,
}

/// Payment provider configuration
#[derive(Parser, Debug, Clone)]
pub struct PaymentArgs {
    /// Stripe secret API key (required in production mode)
    #[arg(long, env = "STRIPE_SECRET_KEY")]
    pub stripe_secret_key: Option<String>,

    /// Stripe API base URL
    #[arg(long, env = "STRIPE_API_BASE", default_value = "https://api.stripe.com")]
    pub stripe_api_base: String,

    /// Public site origin used to build checkout redirect URLs
    #[arg(long, env = "SITE_DOMAIN", default_value = "http://localhost:5173")]
    pub site_domain: String,

    /// Premium upgrade price in whole currency units
    #[arg(long, env = "PREMIUM_PRICE", default_value = "1000")]
    pub premium_price: u64,

    /// Premium upgrade currency (ISO code, lowercase)
    #[arg(long, env = "PREMIUM_CURRENCY", default_value = "usd")]
    pub premium_currency: String,
}

impl Args {
    /// Site origin without a trailing slash
    pub fn site_origin(&self) -> &str {
        self.payments.site_domain.trim_end_matches('/')
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.payments.stripe_secret_key.is_none() {
            return Err("STRIPE_SECRET_KEY is required in production mode".to_string());
        }

        if self.free_issue_quota == 0 {
            return Err("FREE_ISSUE_QUOTA must be at least 1".to_string());
        }

        if self.payments.premium_price == 0 {
            return Err("PREMIUM_PRICE must be greater than zero".to_string());
        }

        let site = &self.payments.site_domain;
        if !(site.starts_with("http://") || site.starts_with("https://")) {
            return Err(format!("SITE_DOMAIN must be an http(s) origin, got '{}'", site));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["civicdesk"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_production_requires_payment_secret() {
        let mut args = parse(&["--site-domain", "https://city.example"]);
        args.dev_mode = false;
        args.payments.stripe_secret_key = None;
        assert!(args.validate().is_err());

        let args = parse(&[
            "--stripe-secret-key",
            "sk_test_123",
            "--site-domain",
            "https://city.example",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_dev_mode_validation() {
        let args = parse(&["--dev-mode", "--site-domain", "https://city.example/"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.site_origin(), "https://city.example");

        let args = parse(&["--dev-mode", "--site-domain", "city.example"]);
        assert!(args.validate().is_err());

        let args = parse(&["--dev-mode", "--free-issue-quota", "0", "--site-domain", "http://x"]);
        assert!(args.validate().is_err());
    }
}
