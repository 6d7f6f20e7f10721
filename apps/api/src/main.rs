mod analysis;
mod cache;
mod config;
mod errors;
mod llm_client;
mod models;
mod resume;
mod routes;
mod scraping;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::JobAnalysisService;
use crate::cache::build_cache;
use crate::config::Config;
use crate::llm_client::build_llm_client;
use crate::resume::ResumeAnalysisService;
use crate::routes::{build_router, cors_layer};
use crate::scraping::{HttpJobScraper, ScrapingService};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", config.project_name, env!("CARGO_PKG_VERSION"));

    let llm = build_llm_client(&config)?;
    info!("LLM client initialized (provider: {})", llm.provider());

    let cache = build_cache(&config)?;

    let scraper = Arc::new(HttpJobScraper::new(
        config.scraper_api_url.clone(),
        Duration::from_secs(config.scraper_timeout_secs),
    )?);
    info!("Job scraper client initialized ({})", config.scraper_api_url);

    let state = AppState {
        config: config.clone(),
        analysis: Arc::new(JobAnalysisService::new(llm.clone(), cache)),
        scraping: Arc::new(ScrapingService::new(scraper, config.clone())),
        resume: Arc::new(ResumeAnalysisService::new(llm)),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
