//! Analysis cache: job URL to a previously computed `JobAnalysis`, with a TTL.
//!
//! Reads fail open: transport or decode problems are logged and reported as a
//! miss. Writes report their errors. Expiry is the store's job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::models::analysis::JobAnalysis;

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryAnalysisCache;
pub use redis_store::RedisAnalysisCache;

const KEY_PREFIX: &str = "job_analysis:";

/// Shortest TTL either store will apply; `CACHE_EXPIRATION=0` is raised to this.
pub(crate) const MIN_TTL: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// A cached analysis together with its key and expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub url: String,
    pub analysis: JobAnalysis,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Returns the live entry for `url`. Never errors; failures count as a miss.
    async fn get(&self, url: &str) -> Option<CacheEntry>;

    /// Stores or overwrites the entry for `url` with the cache's TTL.
    async fn put(&self, url: &str, analysis: &JobAnalysis) -> Result<(), CacheError>;
}

pub(crate) fn cache_key(url: &str) -> String {
    format!("{KEY_PREFIX}{url}")
}

/// Builds the cache backend named by `REDIS_URL`.
pub fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn AnalysisCache>> {
    let ttl = Duration::from_secs(config.cache_expiration_secs);

    if config.redis_url.starts_with("memory://") {
        info!("Using in-process analysis cache (ttl={}s)", ttl.as_secs());
        return Ok(Arc::new(InMemoryAnalysisCache::new(ttl)));
    }

    let client = redis::Client::open(config.redis_url.clone())?;
    let op_timeout = Duration::from_millis(config.cache_timeout_ms);
    info!(
        "Redis analysis cache initialized (ttl={}s, timeout={}ms)",
        ttl.as_secs(),
        op_timeout.as_millis()
    );
    Ok(Arc::new(RedisAnalysisCache::new(client, ttl, op_timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_prefixed_url() {
        assert_eq!(
            cache_key("https://jobs.example.com/42"),
            "job_analysis:https://jobs.example.com/42"
        );
    }

    #[test]
    fn test_build_cache_accepts_memory_scheme() {
        let config = Config {
            redis_url: "memory://".to_string(),
            ..Config::default()
        };
        assert!(build_cache(&config).is_ok());
    }

    #[test]
    fn test_build_cache_opens_redis_lazily() {
        // Client::open only parses the URL; no server is contacted.
        assert!(build_cache(&Config::default()).is_ok());
    }

    #[test]
    fn test_build_cache_rejects_malformed_url() {
        let config = Config {
            redis_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(build_cache(&config).is_err());
    }
}
