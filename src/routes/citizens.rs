//! Citizen routes (`/users`)

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::views::CitizenView;
use super::{json_response, parse_body, path_segment, FullBody};
use crate::citizens::{ProfileUpdateRequest, RegisterCitizenRequest, RegisterOutcome};
use crate::server::AppState;
use crate::types::Result;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inserted_id: Option<String>,
    user: CitizenView,
}

/// POST /users
pub async fn handle_register(state: &AppState, body: &Bytes) -> Result<Response<FullBody>> {
    let request: RegisterCitizenRequest = parse_body(body)?;
    let outcome = state.citizens.register(request).await?;

    let response = match &outcome {
        RegisterOutcome::Created(citizen) => RegisterResponse {
            message: None,
            inserted_id: citizen._id.map(|id| id.to_hex()),
            user: CitizenView::from(citizen),
        },
        RegisterOutcome::Existing(citizen) => RegisterResponse {
            message: Some("user already exists"),
            inserted_id: None,
            user: CitizenView::from(citizen),
        },
    };
    Ok(json_response(StatusCode::OK, &response))
}

/// GET /users/{email}
pub async fn handle_get(state: &AppState, email: &str) -> Result<Response<FullBody>> {
    let citizen = state.citizens.get(&path_segment(email)?).await?;
    Ok(json_response(StatusCode::OK, &CitizenView::from(&citizen)))
}

/// PATCH /users/{email}
pub async fn handle_update(
    state: &AppState,
    email: &str,
    body: &Bytes,
) -> Result<Response<FullBody>> {
    let request: ProfileUpdateRequest = parse_body(body)?;
    let citizen = state
        .citizens
        .update_profile(&path_segment(email)?, request)
        .await?;
    Ok(json_response(StatusCode::OK, &CitizenView::from(&citizen)))
}
