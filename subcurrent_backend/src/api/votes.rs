use super::{ApiError, AppState};
use crate::auth::resolve_session;
use crate::database::models::VoteDirection;
use crate::voting::VoteService;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteRequest {
    post_id: String,
    vote_type: VoteDirection,
}

/// `PATCH /api/subreddit/post/vote`. The session check runs before payload
/// validation so an unauthenticated caller always sees 401.
pub(crate) async fn vote_on_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Some(voter) = resolve_session(&state.database, &headers)? else {
        return Err(ApiError::Unauthorized);
    };
    let Json(payload) =
        payload.map_err(|_| ApiError::Validation("Invalid request data passed".into()))?;

    let service = VoteService::new(state.database.clone(), state.cache.clone());
    match service
        .cast_vote(&voter, &payload.post_id, payload.vote_type)
        .await?
    {
        Some(outcome) => Ok((StatusCode::OK, outcome.message())),
        None => Err(ApiError::NotFound("Post not found".into())),
    }
}
