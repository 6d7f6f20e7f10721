//! LLM Client: the single point of entry for all model calls.
//!
//! Providers implement `generate` only. `analyze_job` and `validate_job` are
//! shared on top of it and never return errors: provider failures become a
//! degraded record or `false` at this boundary, so callers above it need no
//! error branch for the model.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::{Config, LlmProvider};
use crate::models::analysis::{AnalysisRecord, SummaryLength};

pub mod gemini;
pub mod ollama;
pub mod parser;
pub mod prompts;

pub use gemini::GeminiClient;
pub use ollama::OllamaClient;

pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const VALIDATION_TEMPERATURE: f32 = 0.1;

const MAX_RETRIES: u32 = 3;
const ANALYSIS_ERROR_PLACEHOLDER: &str = "Error during analysis";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Result of `analyze_job`. A `Degraded` record stands in for an analysis
/// that did not happen and must not be cached.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Complete(AnalysisRecord),
    Degraded(AnalysisRecord),
}

impl AnalysisOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded(_))
    }

    pub fn into_record(self) -> AnalysisRecord {
        match self {
            AnalysisOutcome::Complete(record) | AnalysisOutcome::Degraded(record) => record,
        }
    }
}

/// A text-completion backend plus the job-analysis operations built on it.
///
/// Implementations are shared across concurrent requests as
/// `Arc<dyn LlmClient>` and must not keep per-request state.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name, as reported by the health probe.
    fn provider(&self) -> &'static str;

    /// Single request/response call to the backing model.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f32,
    ) -> Result<String, LlmError>;

    /// Full structured analysis. Provider failures and unparseable output
    /// yield a `Degraded` record with `valid = false` instead of an error.
    async fn analyze_job(
        &self,
        job_description: &str,
        focus_areas: &[String],
        summary_length: SummaryLength,
        experience_years: Option<u32>,
        required_skills: Option<&[String]>,
    ) -> AnalysisOutcome {
        let prompt = prompts::analysis_prompt(
            job_description,
            focus_areas,
            summary_length,
            experience_years,
            required_skills,
        );

        match self
            .generate(&prompt, Some(prompts::SYSTEM_PROMPT), ANALYSIS_TEMPERATURE)
            .await
        {
            Ok(text) => {
                let raw = parser::parse_structured(&text);
                let record = parser::validate(&raw);
                if parser::is_parse_failure(&raw) {
                    AnalysisOutcome::Degraded(record)
                } else {
                    AnalysisOutcome::Complete(record)
                }
            }
            Err(e) => {
                error!("Error analyzing job description with {}: {e}", self.provider());
                AnalysisOutcome::Degraded(degraded_analysis(&e))
            }
        }
    }

    /// Cheap yes/no check of a description against the caller's constraints.
    /// Fails closed.
    async fn validate_job(
        &self,
        job_description: &str,
        experience_years: Option<u32>,
        required_skills: Option<&[String]>,
    ) -> bool {
        let prompt = prompts::validation_prompt(job_description, experience_years, required_skills);

        match self
            .generate(&prompt, Some(prompts::SYSTEM_PROMPT), VALIDATION_TEMPERATURE)
            .await
        {
            Ok(text) => parser::parse_boolean_decision(&text),
            Err(e) => {
                error!("Error validating job with {}: {e}", self.provider());
                false
            }
        }
    }
}

fn degraded_analysis(error: &LlmError) -> AnalysisRecord {
    AnalysisRecord {
        valid: false,
        summary: format!("Error analyzing job description: {error}"),
        key_skills: Vec::new(),
        required_experience: ANALYSIS_ERROR_PLACEHOLDER.to_string(),
        company_culture: ANALYSIS_ERROR_PLACEHOLDER.to_string(),
        estimated_salary_range: ANALYSIS_ERROR_PLACEHOLDER.to_string(),
    }
}

/// Builds the provider selected in configuration.
pub fn build_llm_client(config: &Config) -> anyhow::Result<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.llm_timeout_secs);
    let client: Arc<dyn LlmClient> = match config.llm_provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            config.ollama_api_url.clone(),
            config.ollama_model.clone(),
            timeout,
        )?),
        LlmProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_url.clone(),
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            timeout,
        )?),
    };
    Ok(client)
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Sends a request, retrying on 429 and 5xx with exponential backoff.
/// Other non-success statuses are returned immediately as `LlmError::Api`.
pub(crate) async fn send_with_retry(request: RequestBuilder) -> Result<Response, LlmError> {
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let Some(request) = request.try_clone() else {
            // Streaming bodies cannot be replayed; send once.
            return check_status(request.send().await?).await;
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        return check_status(response).await;
    }

    Err(last_error.unwrap_or(LlmError::RateLimited {
        retries: MAX_RETRIES,
    }))
}

async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}
