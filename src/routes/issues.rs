//! Issue routes (`/issues`)

use bytes::Bytes;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::views::IssueView;
use super::{json_response, parse_body, path_segment, FullBody};
use crate::issues::{CreateIssueRequest, UpdateIssueRequest, UpvoteRequest};
use crate::server::AppState;
use crate::types::{CivicDeskError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    user_email: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    inserted_id: Option<String>,
    issue: IssueView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletedResponse {
    deleted_count: u64,
    message: &'static str,
}

/// POST /issues
pub async fn handle_create(state: &AppState, body: &Bytes) -> Result<Response<FullBody>> {
    let request: CreateIssueRequest = parse_body(body)?;
    let issue = state.issues.create(request).await?;
    Ok(json_response(
        StatusCode::OK,
        &CreatedResponse {
            inserted_id: issue._id.map(|id| id.to_hex()),
            issue: IssueView::from(&issue),
        },
    ))
}

/// GET /issues?userEmail=
pub async fn handle_list(state: &AppState, query: Option<&str>) -> Result<Response<FullBody>> {
    let query: ListQuery = serde_urlencoded::from_str(query.unwrap_or_default())
        .map_err(|e| CivicDeskError::InvalidArgument(format!("Invalid query: {}", e)))?;
    let issues = state.issues.list_by_owner(query.user_email.as_deref()).await?;
    let views: Vec<IssueView> = issues.iter().map(IssueView::from).collect();
    Ok(json_response(StatusCode::OK, &views))
}

/// GET /issues/{id}
pub async fn handle_get(state: &AppState, id: &str) -> Result<Response<FullBody>> {
    let issue = state.issues.get(id).await?;
    Ok(json_response(StatusCode::OK, &IssueView::from(&issue)))
}

/// PATCH /issues/{email}/{id}
pub async fn handle_update(
    state: &AppState,
    email: &str,
    id: &str,
    body: &Bytes,
) -> Result<Response<FullBody>> {
    let request: UpdateIssueRequest = parse_body(body)?;
    let issue = state
        .issues
        .update(id, &path_segment(email)?, request)
        .await?;
    Ok(json_response(StatusCode::OK, &IssueView::from(&issue)))
}

/// DELETE /issues/{email}/{id}
pub async fn handle_delete(state: &AppState, email: &str, id: &str) -> Result<Response<FullBody>> {
    let deleted_count = state.issues.delete(id, &path_segment(email)?).await?;
    Ok(json_response(
        StatusCode::OK,
        &DeletedResponse {
            deleted_count,
            message: "Deleted successfully",
        },
    ))
}

/// POST /issues/{id}/upvote
pub async fn handle_upvote(state: &AppState, id: &str, body: &Bytes) -> Result<Response<FullBody>> {
    let request: UpvoteRequest = parse_body(body)?;
    let issue = state.issues.upvote(id, request.email.as_deref()).await?;
    Ok(json_response(StatusCode::OK, &IssueView::from(&issue)))
}
