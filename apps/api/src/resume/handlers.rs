//! Axum route handlers for the resume API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::resume::ResumeSearchParams;
use crate::state::AppState;

/// POST /api/v1/resume/analyze
///
/// Multipart upload with a `file` part (PDF or DOCX). Returns job search
/// parameters inferred from the resume.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResumeSearchParams>, AppError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let file_name = field.file_name().unwrap_or("<unnamed>").to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        info!("Received resume upload '{file_name}' ({content_type})");

        let params = state
            .resume
            .analyze_resume(content.to_vec(), &content_type)
            .await?;
        return Ok(Json(params));
    }

    Err(AppError::Validation(
        "multipart body must contain a 'file' field".to_string(),
    ))
}
