use super::{ApiError, ApiResult, AppState};
use crate::auth::resolve_session;
use crate::database::models::SubredditRecord;
use crate::database::repositories::{SubredditRepository, SubscriptionRepository};
use crate::utils::now_utc_iso;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSubredditRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSubredditResponse {
    id: String,
    name: String,
}

pub(crate) async fn create_subreddit(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateSubredditRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSubredditResponse>), ApiError> {
    let Some(creator) = resolve_session(&state.database, &headers)? else {
        return Err(ApiError::Unauthorized);
    };
    let Json(payload) =
        payload.map_err(|_| ApiError::Validation("Invalid request data passed".into()))?;

    let name = payload.name.trim().to_string();
    let name_len = name.chars().count();
    if !(3..=21).contains(&name_len) {
        return Err(ApiError::Validation(
            "Subreddit name must be between 3 and 21 characters".into(),
        ));
    }

    let existing = state
        .database
        .with_repositories(|repos| repos.subreddits().get_by_name(&name))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Subreddit already exists".into()));
    }

    let record = SubredditRecord {
        id: Uuid::new_v4().to_string(),
        name,
        creator_id: Some(creator.id.clone()),
        created_at: now_utc_iso(),
    };
    state.database.with_repositories(|repos| {
        repos.subreddits().create(&record)?;
        // creators follow their own subreddit
        repos
            .subscriptions()
            .subscribe(&creator.id, &record.id, &record.created_at)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSubredditResponse {
            id: record.id,
            name: record.name,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub(crate) struct SubredditDetails {
    id: String,
    name: String,
    creator_id: Option<String>,
    created_at: String,
    member_count: usize,
    subscribed: bool,
}

pub(crate) async fn get_subreddit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ApiResult<SubredditDetails> {
    let viewer = resolve_session(&state.database, &headers)?;

    let details = state.database.with_repositories(|repos| {
        let Some(subreddit) = repos.subreddits().get_by_name(&name)? else {
            return Ok(None);
        };
        let member_count = repos.subreddits().member_count(&subreddit.id)?;
        let subscribed = match &viewer {
            Some(user) => repos.subscriptions().is_subscribed(&user.id, &subreddit.id)?,
            None => false,
        };
        Ok(Some(SubredditDetails {
            id: subreddit.id,
            name: subreddit.name,
            creator_id: subreddit.creator_id,
            created_at: subreddit.created_at,
            member_count,
            subscribed,
        }))
    })?;

    match details {
        Some(details) => Ok(Json(details)),
        None => Err(ApiError::NotFound(format!("subreddit {name} not found"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionRequest {
    subreddit_id: String,
}

pub(crate) async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Some(user) = resolve_session(&state.database, &headers)? else {
        return Err(ApiError::Unauthorized);
    };
    let Json(payload) =
        payload.map_err(|_| ApiError::Validation("Invalid request data passed".into()))?;

    let subreddit = state
        .database
        .with_repositories(|repos| repos.subreddits().get(&payload.subreddit_id))?;
    let Some(subreddit) = subreddit else {
        return Err(ApiError::NotFound("Subreddit not found".into()));
    };

    state.database.with_repositories(|repos| {
        repos
            .subscriptions()
            .subscribe(&user.id, &subreddit.id, &now_utc_iso())
    })?;

    Ok((StatusCode::OK, "Subscribed"))
}

pub(crate) async fn unsubscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Some(user) = resolve_session(&state.database, &headers)? else {
        return Err(ApiError::Unauthorized);
    };
    let Json(payload) =
        payload.map_err(|_| ApiError::Validation("Invalid request data passed".into()))?;

    state.database.with_repositories(|repos| {
        repos
            .subscriptions()
            .unsubscribe(&user.id, &payload.subreddit_id)
    })?;

    Ok((StatusCode::OK, "Unsubscribed"))
}
