use super::{ApiError, ApiResult, AppState};
use crate::auth::resolve_session;
use crate::database::models::PostRecord;
use crate::database::repositories::{PostRepository, SubredditRepository, SubscriptionRepository};
use crate::feed::{FeedQuery, FeedService, PostView};
use crate::utils::now_utc_iso;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const VALIDATION_MESSAGE: &str = "Invalid request data passed";

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

/// Raw feed parameters as they arrive on the query string. Values stay
/// strings so the contract check below owns every rejection.
#[derive(Debug, Deserialize)]
pub(crate) struct FeedParams {
    limit: Option<String>,
    page: Option<String>,
    #[serde(rename = "subredditName")]
    subreddit_name: Option<String>,
}

fn validate_feed_params(params: FeedParams) -> Result<FeedQuery, ApiError> {
    let limit = params
        .limit
        .as_deref()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|value| *value >= 1);
    let page = params
        .page
        .as_deref()
        .and_then(|raw| raw.parse::<usize>().ok())
        .filter(|value| *value >= 1);
    match (limit, page) {
        (Some(limit), Some(page)) => Ok(FeedQuery {
            limit,
            page,
            subreddit_name: params.subreddit_name,
        }),
        _ => Err(ApiError::Validation(VALIDATION_MESSAGE.into())),
    }
}

pub(crate) async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<FeedParams>,
) -> ApiResult<Vec<PostView>> {
    let viewer = resolve_session(&state.database, &headers)?;
    let query = validate_feed_params(params)?;

    let service = FeedService::new(state.database.clone());
    let posts = service.assemble(&query, viewer.as_ref().map(|user| user.id.as_str()))?;
    Ok(Json(posts))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostRequest {
    title: String,
    content: serde_json::Value,
    subreddit_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreatePostResponse {
    id: String,
}

pub(crate) async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePostResponse>), ApiError> {
    let Some(author) = resolve_session(&state.database, &headers)? else {
        return Err(ApiError::Unauthorized);
    };
    let Json(payload) = payload.map_err(|_| ApiError::Validation(VALIDATION_MESSAGE.into()))?;

    let title_len = payload.title.chars().count();
    if title_len < 3 {
        return Err(ApiError::Validation(
            "Title must be longer than 3 characters".into(),
        ));
    }
    if title_len > 128 {
        return Err(ApiError::Validation(
            "Title must be at most 128 characters".into(),
        ));
    }

    let subreddit = state
        .database
        .with_repositories(|repos| repos.subreddits().get(&payload.subreddit_id))?;
    let Some(subreddit) = subreddit else {
        return Err(ApiError::NotFound("Subreddit not found".into()));
    };

    let subscribed = state.database.with_repositories(|repos| {
        repos
            .subscriptions()
            .is_subscribed(&author.id, &subreddit.id)
    })?;
    if !subscribed {
        return Err(ApiError::Forbidden(
            "Subscribe to post in this subreddit".into(),
        ));
    }

    let record = PostRecord {
        id: Uuid::new_v4().to_string(),
        title: payload.title,
        content: payload.content.to_string(),
        author_id: author.id,
        subreddit_id: subreddit.id,
        created_at: now_utc_iso(),
    };
    state
        .database
        .with_repositories(|repos| repos.posts().create(&record))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse { id: record.id }),
    ))
}
