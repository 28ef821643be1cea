//! Feed settings handlers.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::rss::FeedSources;
use crate::settings::OptionsSubmission;
use crate::sync::PERMISSION_DENIED_MESSAGE;
use crate::web::dto::{ApiResponse, OptionsRequest, OptionsResponse, SubmissionResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::RequestActor;

/// GET /api/options - Current feed settings.
pub async fn get_options(
    State(state): State<Arc<AppState>>,
    RequestActor(actor): RequestActor,
) -> Result<Json<ApiResponse<OptionsResponse>>, ApiError> {
    if !actor.can_manage_options {
        return Err(ApiError::forbidden(PERMISSION_DENIED_MESSAGE));
    }

    let raw = state.settings.feed_urls().await?;
    let sources = FeedSources::parse(&raw).urls().to_vec();

    Ok(Json(ApiResponse::new(OptionsResponse {
        rss_feed_urls: raw,
        sources,
    })))
}

/// POST /api/options - Submit the feed settings form.
///
/// Saving runs the settings triggers; the response carries the reports of
/// any apply passes they started.
pub async fn submit_options(
    State(state): State<Arc<AppState>>,
    RequestActor(actor): RequestActor,
    Json(req): Json<OptionsRequest>,
) -> Result<Json<ApiResponse<SubmissionResponse>>, ApiError> {
    let submission = OptionsSubmission::from(req);
    let outcome = state.settings.submit(&actor, &submission).await?;
    Ok(Json(ApiResponse::new(outcome.into())))
}
