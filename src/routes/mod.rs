//! HTTP routes for CivicDesk
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/`, `/health`, `/version` | [`health`] |
//! | POST | `/users` | [`citizens::handle_register`] |
//! | GET, PATCH | `/users/{email}` | [`citizens`] |
//! | POST | `/premium-checkout-session` | [`payments::handle_create_checkout`] |
//! | PATCH | `/premium-success` | [`payments::handle_confirm_checkout`] |
//! | POST, GET | `/issues` | [`issues`] |
//! | GET | `/issues/{id}` | [`issues::handle_get`] |
//! | PATCH, DELETE | `/issues/{email}/{id}` | [`issues`] |
//! | POST | `/issues/{id}/upvote` | [`issues::handle_upvote`] |

pub mod citizens;
pub mod health;
pub mod issues;
pub mod payments;
pub mod views;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use hyper::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::server::AppState;
use crate::types::{CivicDeskError, Result};

pub type FullBody = Full<Bytes>;

/// Route a fully-read request to its handler
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    query: Option<&str>,
    body: &Bytes,
) -> Response<FullBody> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let result = match (method.clone(), segments.as_slice()) {
        (Method::OPTIONS, _) => Ok(preflight_response()),

        (Method::GET, []) => Ok(health::banner()),
        (Method::GET, ["health"]) => Ok(health::health_check(state)),
        (Method::GET, ["version"]) => Ok(health::version_info()),

        (Method::POST, ["users"]) => citizens::handle_register(state, body).await,
        (Method::GET, ["users", email]) => citizens::handle_get(state, email).await,
        (Method::PATCH, ["users", email]) => citizens::handle_update(state, email, body).await,

        (Method::POST, ["premium-checkout-session"]) => {
            payments::handle_create_checkout(state, body).await
        }
        (Method::PATCH, ["premium-success"]) => {
            payments::handle_confirm_checkout(state, body).await
        }

        (Method::POST, ["issues"]) => issues::handle_create(state, body).await,
        (Method::GET, ["issues"]) => issues::handle_list(state, query).await,
        (Method::GET, ["issues", id]) => issues::handle_get(state, id).await,
        (Method::PATCH, ["issues", email, id]) => {
            issues::handle_update(state, email, id, body).await
        }
        (Method::DELETE, ["issues", email, id]) => issues::handle_delete(state, email, id).await,
        (Method::POST, ["issues", id, "upvote"]) => issues::handle_upvote(state, id, body).await,

        _ => Ok(not_found_response(path)),
    };

    result.unwrap_or_else(|e| error_response(&e))
}

/// Serialize `body` as a JSON response with permissive CORS
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_vec(body).unwrap_or_else(|e| {
        error!("Failed to serialize response: {}", e);
        b"{}".to_vec()
    });

    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

/// Render an error as `{error, message}`, logging internal detail
pub fn error_response(err: &CivicDeskError) -> Response<FullBody> {
    if err.is_internal() {
        error!(kind = err.kind(), detail = %err, "Request failed");
    } else {
        warn!(kind = err.kind(), "{}", err);
    }

    json_response(
        err.status_code(),
        &ErrorBody {
            error: err.kind(),
            message: err.public_message(),
        },
    )
}

/// Parse a JSON request body; an empty body reads as `{}`
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

/// Percent-decode one path segment
pub(crate) fn path_segment(raw: &str) -> Result<String> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| CivicDeskError::InvalidArgument("Malformed path segment".into()))
}

/// CORS preflight response
fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PATCH, DELETE, OPTIONS"),
    );
    response
}

fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "NOT_FOUND",
            "message": format!("No route for {}", path),
        }),
    )
}
