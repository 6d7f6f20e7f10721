//! Axum route handlers for the job analysis API.

use axum::{extract::State, Json};
use tracing::{debug, info};

use crate::errors::{AppError, AppJson};
use crate::models::analysis::{AnalysisQuery, AnalysisResponse};
use crate::state::AppState;

/// POST /api/v1/summarize
///
/// Returns `{valid, analysis}`. A model that could not be parsed shows up as
/// `valid: false` with an explanatory summary, not as an HTTP error.
pub async fn handle_summarize(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    info!("Received job analysis request for URL: {}", request.url);
    debug!("Description length: {} chars", request.description.len());

    if request.description.trim().is_empty() {
        return Err(AppError::Validation("description cannot be empty".to_string()));
    }
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let response = state.analysis.analyze(&request).await?;

    info!("Job analysis completed successfully for URL: {}", request.url);
    Ok(Json(response))
}
