pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analysis::handlers as analysis;
use crate::resume::handlers as resume;
use crate::scraping::handlers as scraping;
use crate::state::AppState;

const RESUME_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route("/api/v1/summarize", post(analysis::handle_summarize))
        .route("/api/scrape", post(scraping::handle_scrape))
        .route(
            "/api/v1/resume/analyze",
            post(resume::handle_analyze_resume).layer(DefaultBodyLimit::max(RESUME_UPLOAD_LIMIT)),
        )
        .with_state(state)
}

/// Permissive when `origins` contains `*`, otherwise restricted to the list.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
