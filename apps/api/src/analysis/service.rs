//! Job analysis orchestration.
//!
//! Flow per request:
//!   cache hit  → validate_job against the live constraints → respond
//!   cache miss → analyze_job → cache the posting-level subset → respond
//!
//! A degraded analysis (provider failure, unparseable output) is returned
//! but never cached, so the next request for the URL retries the model.
//!
//! A cached analysis is trusted as-is; only the query-specific `valid` bit is
//! recomputed, with the cheap boolean prompt instead of a full analysis.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::cache::AnalysisCache;
use crate::llm_client::LlmClient;
use crate::models::analysis::{AnalysisQuery, AnalysisResponse};

/// Shared across requests; holds no per-request state.
pub struct JobAnalysisService {
    llm: Arc<dyn LlmClient>,
    cache: Arc<dyn AnalysisCache>,
}

impl JobAnalysisService {
    pub fn new(llm: Arc<dyn LlmClient>, cache: Arc<dyn AnalysisCache>) -> Self {
        Self { llm, cache }
    }

    pub fn provider(&self) -> &'static str {
        self.llm.provider()
    }

    /// Runs at most one cache read, one model call and one cache write, in order.
    /// Only a failed cache write escapes as an error; it is logged here first.
    pub async fn analyze(&self, query: &AnalysisQuery) -> Result<AnalysisResponse> {
        let url = query.url.as_str();
        info!("Starting job analysis for URL: {url}");
        debug!(
            "Analysis parameters - focus_areas: {:?}, summary_length: {:?}, experience_years: {:?}, required_skills: {:?}",
            query.focus_areas,
            query.summary_length,
            query.experience_years,
            query.required_skills
        );

        let required_skills = query.required_skills.as_deref();

        if let Some(entry) = self.cache.get(url).await {
            info!("Cache hit for URL: {url}, revalidating against current constraints");
            let valid = self
                .llm
                .validate_job(&query.description, query.experience_years, required_skills)
                .await;
            return Ok(AnalysisResponse {
                valid,
                analysis: entry.analysis,
            });
        }

        info!("Cache miss for URL: {url}. Proceeding with LLM analysis");
        let outcome = self
            .llm
            .analyze_job(
                &query.description,
                &query.focus_areas(),
                query.summary_length(),
                query.experience_years,
                required_skills,
            )
            .await;

        let degraded = outcome.is_degraded();
        let (valid, analysis) = outcome.into_record().split();

        if degraded {
            warn!("Analysis for URL {url} is degraded, not caching");
            return Ok(AnalysisResponse { valid, analysis });
        }

        info!("Caching analysis results for URL: {url}");
        if let Err(e) = self
            .cache
            .put(url, &analysis)
            .await
            .with_context(|| format!("Failed to cache analysis for {url}"))
        {
            error!("Error analyzing job for URL {url}: {e:#}");
            return Err(e);
        }

        info!("Analysis completed and cached for URL: {url}");
        Ok(AnalysisResponse { valid, analysis })
    }
}
