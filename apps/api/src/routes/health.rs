use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::state::AppState;

/// GET /
/// Returns the service name and the configured LLM provider.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    info!("Health check endpoint accessed");
    Json(json!({
        "message": format!("{} is running", state.config.project_name),
        "llm_provider": state.analysis.provider()
    }))
}
