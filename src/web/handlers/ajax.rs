//! admin-ajax handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};

use crate::settings::FETCH_RECENT_ACTION;
use crate::web::dto::{AjaxRequest, AjaxResponse};
use crate::web::handlers::AppState;
use crate::web::middleware::RequestActor;
use crate::FeedSyncError;

/// Message returned when a preview fails for reasons other than permission.
pub const FETCH_ERROR_MESSAGE: &str = "An error occurred while fetching posts.";

/// POST /api/admin-ajax - Dispatch an admin-ajax action.
///
/// Only `fetch_recent_rss_posts` is known: it previews the most recent
/// items of every configured feed.
pub async fn admin_ajax(
    State(state): State<Arc<AppState>>,
    RequestActor(actor): RequestActor,
    Form(req): Form<AjaxRequest>,
) -> Response {
    if req.action != FETCH_RECENT_ACTION {
        return (
            StatusCode::BAD_REQUEST,
            Json(AjaxResponse::failure(format!(
                "Unknown action: {}",
                req.action
            ))),
        )
            .into_response();
    }

    match state.settings.preview(&actor).await {
        Ok(items) => Json(AjaxResponse::success(items)).into_response(),
        Err(FeedSyncError::Permission(message)) => {
            (StatusCode::FORBIDDEN, Json(AjaxResponse::failure(message))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to preview feeds: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AjaxResponse::failure(FETCH_ERROR_MESSAGE)),
            )
                .into_response()
        }
    }
}
