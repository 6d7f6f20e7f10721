use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Backing model provider, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    Gemini,
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "gemini" => Ok(LlmProvider::Gemini),
            other => bail!("Unsupported LLM provider: {other}"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Built once in `main` and shared read-only through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_name: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,

    pub llm_provider: LlmProvider,
    pub llm_timeout_secs: u64,
    pub ollama_api_url: String,
    pub ollama_model: String,
    pub gemini_api_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,

    /// `redis://…`, or `memory://` for the in-process cache.
    pub redis_url: String,
    pub cache_expiration_secs: u64,
    /// Upper bound on a single cache read or write.
    pub cache_timeout_ms: u64,

    pub scraper_api_url: String,
    pub scraper_timeout_secs: u64,
    pub default_results_wanted: u32,
    pub default_hours_old: u32,
    pub default_site_name: Vec<String>,
    /// Lower-cased location → Indeed country.
    pub location_country_map: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: "Job Hunter API".to_string(),
            port: 8000,
            rust_log: "info".to_string(),
            cors_origins: vec!["*".to_string()],
            llm_provider: LlmProvider::Gemini,
            llm_timeout_secs: 120,
            ollama_api_url: "http://localhost:11434".to_string(),
            ollama_model: "mistral".to_string(),
            gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.0-flash".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            cache_expiration_secs: 7 * 24 * 60 * 60,
            cache_timeout_ms: 2000,
            scraper_api_url: "http://localhost:8080".to_string(),
            scraper_timeout_secs: 300,
            default_results_wanted: 20,
            default_hours_old: 72,
            default_site_name: vec!["linkedin".to_string()],
            location_country_map: parse_country_map(
                "bangalore=india,san francisco=usa,london=uk,sydney=australia",
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        let llm_provider = match optional_env("LLM_PROVIDER") {
            Some(value) => value.parse::<LlmProvider>()?,
            None => defaults.llm_provider,
        };

        Ok(Config {
            project_name: optional_env("PROJECT_NAME").unwrap_or(defaults.project_name),
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            cors_origins: optional_env("BACKEND_CORS_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.cors_origins),
            llm_provider,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            ollama_api_url: optional_env("OLLAMA_API_URL").unwrap_or(defaults.ollama_api_url),
            ollama_model: optional_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            gemini_api_url: optional_env("GEMINI_API_URL").unwrap_or(defaults.gemini_api_url),
            gemini_api_key: optional_env("GEMINI_API_KEY").unwrap_or(defaults.gemini_api_key),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            redis_url: optional_env("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_expiration_secs: parse_env("CACHE_EXPIRATION", defaults.cache_expiration_secs)?,
            cache_timeout_ms: parse_env("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms)?,
            scraper_api_url: optional_env("SCRAPER_API_URL").unwrap_or(defaults.scraper_api_url),
            scraper_timeout_secs: parse_env("SCRAPER_TIMEOUT_SECS", defaults.scraper_timeout_secs)?,
            default_results_wanted: parse_env(
                "DEFAULT_RESULTS_WANTED",
                defaults.default_results_wanted,
            )?,
            default_hours_old: parse_env("DEFAULT_HOURS_OLD", defaults.default_hours_old)?,
            default_site_name: optional_env("DEFAULT_SITE_NAME")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.default_site_name),
            location_country_map: optional_env("LOCATION_COUNTRY_MAP")
                .map(|v| parse_country_map(&v))
                .unwrap_or(defaults.location_country_map),
        })
    }

    /// Indeed country for a free-text location, `worldwide` when unknown.
    pub fn country_for_location(&self, location: &str) -> String {
        self.location_country_map
            .get(&location.trim().to_lowercase())
            .cloned()
            .unwrap_or_else(|| "worldwide".to_string())
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parses `location=country` pairs separated by commas.
fn parse_country_map(value: &str) -> HashMap<String, String> {
    value
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(location, country)| {
            (
                location.trim().to_lowercase(),
                country.trim().to_lowercase(),
            )
        })
        .filter(|(location, country)| !location.is_empty() && !country.is_empty())
        .collect()
}
