//! Axum route handlers for the scraping API.

use axum::{extract::State, Json};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::errors::{AppError, AppJson};
use crate::scraping::JobPosting;
use crate::state::AppState;

/// POST /api/scrape
///
/// Body is a free-form object: search_term, location, results_wanted,
/// hours_old, site_name, country_indeed. All optional.
pub async fn handle_scrape(
    State(state): State<AppState>,
    AppJson(params): AppJson<Map<String, Value>>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    info!("Received job scraping request");
    debug!("Scraping parameters: {params:?}");

    let request = state.scraping.build_request(&params)?;
    let jobs = state.scraping.scrape_jobs(&request).await?;

    info!("Job scraping completed successfully. Found {} jobs", jobs.len());
    Ok(Json(jobs))
}
