//! Health check endpoints
//!
//! - `/` - plain banner
//! - `/health` - liveness probe with store and payment provider kinds
//! - `/version` - build info stamped by `build.rs`

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{json_response, FullBody};
use crate::server::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since the server state was built
    pub uptime: u64,
    pub timestamp: String,
    pub mode: &'static str,
    pub node_id: String,
    /// Backing store ("mongodb" or "memory")
    pub store: &'static str,
    /// Payment provider ("stripe" or "offline")
    pub payments: &'static str,
    pub free_issue_quota: u64,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    let args = &state.args;

    HealthResponse {
        healthy: true,
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if args.dev_mode {
            "development"
        } else {
            "production"
        },
        node_id: args.node_id.to_string(),
        store: state.issues.store_kind(),
        payments: state.upgrade.provider_kind(),
        free_issue_quota: state.issues.quota().free_limit(),
    }
}

/// Liveness probe; always 200 while the process serves requests
pub fn health_check(state: &AppState) -> Response<FullBody> {
    json_response(StatusCode::OK, &build_health_response(state))
}

#[derive(Serialize)]
pub struct VersionInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
}

pub fn version_info() -> Response<FullBody> {
    let info = VersionInfo {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
    };
    json_response(StatusCode::OK, &info)
}

pub fn banner() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        b"CivicDesk issue reporting service is running",
    )));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
