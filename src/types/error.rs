//! Error types for CivicDesk
//!
//! Every failure carries a machine-readable kind and a human-readable
//! message. Infrastructure failures keep their detail for the logs and
//! surface only a generic message to callers.

use hyper::StatusCode;

/// Main error type for CivicDesk operations
#[derive(Debug, thiserror::Error)]
pub enum CivicDeskError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Payment not completed: {0}")]
    PaymentNotCompleted(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CivicDeskError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            Self::PaymentNotCompleted(_) => StatusCode::BAD_REQUEST,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::PaymentNotCompleted(_) => "PAYMENT_NOT_COMPLETED",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::Conflict(_) => "CONFLICT",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Database(_) => "UPSTREAM_ERROR",
            Self::Config(_) => "INTERNAL",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Message that is safe to return to the caller
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidArgument(m)
            | Self::NotFound(m)
            | Self::QuotaExceeded(m)
            | Self::PaymentNotCompleted(m)
            | Self::InvalidTransition(m)
            | Self::Conflict(m) => m.clone(),
            Self::Upstream(_) | Self::Database(_) => {
                "An upstream service failed to complete the request".to_string()
            }
            Self::Config(_) | Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Whether the detail of this error must stay in the logs
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Upstream(_) | Self::Database(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

impl From<std::io::Error> for CivicDeskError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for CivicDeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArgument(format!("Invalid JSON: {}", err))
    }
}

impl From<hyper::Error> for CivicDeskError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for CivicDeskError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::oid::Error> for CivicDeskError {
    fn from(_: bson::oid::Error) -> Self {
        Self::InvalidArgument("Invalid ID".to_string())
    }
}

impl From<reqwest::Error> for CivicDeskError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// Result type alias for CivicDesk operations
pub type Result<T> = std::result::Result<T, CivicDeskError>;
