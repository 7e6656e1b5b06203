//! Premium upgrade routes

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{json_response, parse_body, FullBody};
use crate::payments::ConfirmResult;
use crate::server::AppState;
use crate::types::Result;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckoutRequestBody {
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ConfirmRequestBody {
    session_id: Option<String>,
    email: Option<String>,
}

#[derive(Serialize)]
struct ConfirmResponse {
    success: bool,
    result: ConfirmResult,
}

/// POST /premium-checkout-session
pub async fn handle_create_checkout(state: &AppState, body: &Bytes) -> Result<Response<FullBody>> {
    let request: CheckoutRequestBody = parse_body(body)?;
    let url = state.upgrade.create_checkout(request.email.as_deref()).await?;
    Ok(json_response(StatusCode::OK, &serde_json::json!({ "url": url })))
}

/// PATCH /premium-success
pub async fn handle_confirm_checkout(
    state: &AppState,
    body: &Bytes,
) -> Result<Response<FullBody>> {
    let request: ConfirmRequestBody = parse_body(body)?;
    let result = state
        .upgrade
        .confirm_checkout(request.session_id.as_deref(), request.email.as_deref())
        .await?;
    Ok(json_response(
        StatusCode::OK,
        &ConfirmResponse {
            success: true,
            result,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{call, state};
    use hyper::{Method, StatusCode};
    use serde_json::json;

    fn session_id_from(url: &str) -> String {
        url.rsplit_once("session_id=").unwrap().1.to_string()
    }

    #[tokio::test]
    async fn test_checkout_round_trip_through_offline_provider() {
        let state = state();
        call(&state, Method::POST, "/users", json!({"email": "a@x.com"})).await;

        let (status, body) = call(
            &state,
            Method::POST,
            "/premium-checkout-session",
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let url = body["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("http://localhost:5173/dashboard/payment-success"));

        let session_id = session_id_from(&url);
        let confirm = json!({"sessionId": session_id, "email": "a@x.com"});

        let (status, body) = call(&state, Method::PATCH, "/premium-success", confirm.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["result"]["isPremium"], true);
        assert_eq!(body["result"]["alreadyApplied"], false);
        assert!(body["result"]["premiumAt"].is_string());

        let (status, body) = call(&state, Method::PATCH, "/premium-success", confirm).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["alreadyApplied"], true);
    }

    #[tokio::test]
    async fn test_checkout_argument_errors() {
        let state = state();

        let (status, body) =
            call(&state, Method::POST, "/premium-checkout-session", json!(null)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_ARGUMENT");

        let (status, _) = call(
            &state,
            Method::PATCH,
            "/premium-success",
            json!({"email": "a@x.com"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &state,
            Method::PATCH,
            "/premium-success",
            json!({"sessionId": "cs_1", "email": "a@x.com", "isPremium": true}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
