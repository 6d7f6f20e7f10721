use std::sync::Arc;

use crate::analysis::JobAnalysisService;
use crate::config::Config;
use crate::resume::ResumeAnalysisService;
use crate::scraping::ScrapingService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Services are built once at startup and shared by every in-flight request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis: Arc<JobAnalysisService>,
    pub scraping: Arc<ScrapingService>,
    pub resume: Arc<ResumeAnalysisService>,
}
