//! The external job-board scraper.
//!
//! Scraping itself is not done in-process. `HttpJobScraper` forwards the
//! normalised parameters to a scraping service and returns its raw records.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::service::{JobPosting, ScrapeRequest};

#[async_trait]
pub trait JobScraper: Send + Sync {
    /// Raw, uncleaned job records for the given search.
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<JobPosting>>;
}

/// Response shapes accepted from the scraping service.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScrapeResponse {
    Records(Vec<JobPosting>),
    Wrapped { jobs: Vec<JobPosting> },
}

pub struct HttpJobScraper {
    client: Client,
    base_url: String,
}

impl HttpJobScraper {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build scraper HTTP client")?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl JobScraper for HttpJobScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Vec<JobPosting>> {
        let url = format!("{}/api/v1/search_jobs", self.base_url);
        let mut body = serde_json::to_value(request)?;
        body["linkedin_fetch_description"] = Value::Bool(true);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to POST to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            bail!("Scraper returned HTTP {status}: {error_text}");
        }

        let records = match response
            .json::<ScrapeResponse>()
            .await
            .context("Failed to parse scraper response")?
        {
            ScrapeResponse::Records(records) => records,
            ScrapeResponse::Wrapped { jobs } => jobs,
        };

        debug!("Scraper returned {} raw records", records.len());
        Ok(records)
    }
}
