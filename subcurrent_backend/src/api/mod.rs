mod posts;
mod subreddits;
mod votes;

use crate::cache::PostCache;
use crate::config::SubcurrentConfig;
use crate::database::Database;
use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: SubcurrentConfig,
    pub database: Database,
    pub cache: PostCache,
}

pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

/// Request-scoped failure taxonomy. Everything that is not a client mistake
/// collapses into `Internal` and surfaces as a generic 500.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse { message: msg },
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    message: "Unauthorized".into(),
                },
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorResponse { message: msg }),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse { message: msg }),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, ErrorResponse { message: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(posts::health_handler))
        .route("/api/posts", get(posts::list_posts))
        .route("/api/subreddit", post(subreddits::create_subreddit))
        .route("/api/subreddit/:name", get(subreddits::get_subreddit))
        .route("/api/subreddit/subscribe", post(subreddits::subscribe))
        .route("/api/subreddit/unsubscribe", post(subreddits::unsubscribe))
        .route("/api/subreddit/post/create", post(posts::create_post))
        .route("/api/subreddit/post/vote", patch(votes::vote_on_post))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve_http(
    config: SubcurrentConfig,
    database: Database,
    cache: PostCache,
) -> Result<()> {
    let api_port = config.api_port;
    let state = AppState {
        config,
        database,
        cache,
    };
    let router = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], api_port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
