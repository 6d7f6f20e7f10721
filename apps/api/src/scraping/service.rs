//! Job scraping service: normalises free-form scrape parameters, delegates to
//! the external scraper, and cleans the returned records for JSON clients.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::client::JobScraper;
use crate::config::Config;
use crate::errors::AppError;

/// One scraped posting, as a flat JSON object.
pub type JobPosting = Map<String, Value>;

/// Parameters handed to the scraper after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub site_name: Vec<String>,
    pub search_term: String,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub country_indeed: String,
}

pub struct ScrapingService {
    scraper: Arc<dyn JobScraper>,
    config: Arc<Config>,
}

impl ScrapingService {
    pub fn new(scraper: Arc<dyn JobScraper>, config: Arc<Config>) -> Self {
        Self { scraper, config }
    }

    /// Builds a `ScrapeRequest` from the raw request body.
    pub fn build_request(&self, params: &Map<String, Value>) -> Result<ScrapeRequest, AppError> {
        let search_term = string_param(params, "search_term").unwrap_or_default();
        let location = string_param(params, "location").unwrap_or_default();
        let results_wanted =
            count_param(params, "results_wanted", self.config.default_results_wanted)?;
        let hours_old = count_param(params, "hours_old", self.config.default_hours_old)?;

        let site_name = match params.get("site_name") {
            Some(Value::String(site)) if !site.trim().is_empty() => vec![site.trim().to_string()],
            Some(Value::Array(sites)) if !sites.is_empty() => sites
                .iter()
                .filter_map(|s| s.as_str())
                .map(String::from)
                .collect(),
            None | Some(Value::Null) => self.config.default_site_name.clone(),
            Some(Value::String(_)) | Some(Value::Array(_)) => self.config.default_site_name.clone(),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "site_name must be a string or a list of strings, got {other}"
                )))
            }
        };

        let country_indeed = string_param(params, "country_indeed")
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.config.country_for_location(&location));

        Ok(ScrapeRequest {
            site_name,
            search_term,
            location,
            results_wanted,
            hours_old,
            country_indeed,
        })
    }

    pub async fn scrape_jobs(&self, request: &ScrapeRequest) -> Result<Vec<JobPosting>> {
        info!(
            "Scraping parameters - Search: '{}', Location: '{}', Results wanted: {}, Hours old: {}, Sites: {:?}, Country: {}",
            request.search_term,
            request.location,
            request.results_wanted,
            request.hours_old,
            request.site_name,
            request.country_indeed
        );

        let raw = self.scraper.scrape(request).await?;
        info!("Scraping completed. Found {} jobs", raw.len());

        let cleaned: Vec<JobPosting> = raw.into_iter().map(clean_job_record).collect();
        debug!("Data cleaning completed for {} records", cleaned.len());
        Ok(cleaned)
    }
}

fn string_param(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Accepts non-negative integers or numeric strings.
fn count_param(params: &Map<String, Value>, key: &str, default: u32) -> Result<u32, AppError> {
    let invalid = || AppError::Validation(format!("{key} must be a non-negative integer"));

    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Makes a scraped record safe for JSON clients: NaN-like values become
/// `null` and floating-point numbers become strings.
pub fn clean_job_record(record: JobPosting) -> JobPosting {
    record
        .into_iter()
        .map(|(key, value)| (key, clean_value(value)))
        .collect()
}

fn clean_value(value: Value) -> Value {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("nan") => Value::Null,
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.is_finite() => Value::String(f.to_string()),
            _ => Value::Null,
        },
        other => other,
    }
}
