use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::Client as RedisClient;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{cache_key, AnalysisCache, CacheEntry, CacheError, MIN_TTL};
use crate::models::analysis::JobAnalysis;

/// Redis-backed cache. Values are the JSON of `JobAnalysis`, written with
/// `SETEX` so Redis enforces expiry.
///
/// One `ConnectionManager` is opened on first use and shared by every
/// request; it reconnects on its own after a dropped connection. Each
/// operation, including the first connect, is bounded by `op_timeout`.
#[derive(Clone)]
pub struct RedisAnalysisCache {
    client: RedisClient,
    conn: Arc<OnceCell<ConnectionManager>>,
    ttl: Duration,
    op_timeout: Duration,
}

impl RedisAnalysisCache {
    pub fn new(client: RedisClient, ttl: Duration, op_timeout: Duration) -> Self {
        Self {
            client,
            conn: Arc::new(OnceCell::new()),
            ttl: ttl.max(MIN_TTL),
            op_timeout,
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!("Redis connection established");
                Ok::<_, CacheError>(manager)
            })
            .await?;
        Ok(conn.clone())
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }

    async fn fetch(&self, url: &str) -> Result<Option<(String, i64)>, CacheError> {
        let key = cache_key(url);
        let mut conn = self.connection().await?;

        let (payload, ttl_secs): (Option<String>, i64) = redis::pipe()
            .cmd("GET")
            .arg(&key)
            .cmd("TTL")
            .arg(&key)
            .query_async(&mut conn)
            .await?;

        Ok(payload.map(|p| (p, ttl_secs)))
    }

    async fn store(&self, url: &str, payload: String) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;

        redis::cmd("SETEX")
            .arg(cache_key(url))
            .arg(self.ttl.as_secs())
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl AnalysisCache for RedisAnalysisCache {
    async fn get(&self, url: &str) -> Option<CacheEntry> {
        let (payload, ttl_secs) = match self.bounded(self.fetch(url)).await {
            Ok(found) => found?,
            Err(e) => {
                warn!("Cache read failed for {url}, treating as miss: {e}");
                return None;
            }
        };

        let analysis = match serde_json::from_str::<JobAnalysis>(&payload) {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Cached analysis for {url} is unreadable, treating as miss: {e}");
                return None;
            }
        };

        // TTL is -1 for keys without expiry; report the configured window then.
        let remaining = if ttl_secs >= 0 {
            ttl_secs
        } else {
            self.ttl.as_secs() as i64
        };
        debug!("Cache entry for {url} expires in {remaining}s");

        Some(CacheEntry {
            url: url.to_string(),
            analysis,
            expires_at: Utc::now() + chrono::Duration::seconds(remaining),
        })
    }

    async fn put(&self, url: &str, analysis: &JobAnalysis) -> Result<(), CacheError> {
        let payload = serde_json::to_string(analysis)?;
        self.bounded(self.store(url, payload)).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::net::TcpListener;

    use super::*;

    fn analysis() -> JobAnalysis {
        JobAnalysis {
            summary: "s".to_string(),
            key_skills: vec![],
            required_experience: "Not specified".to_string(),
            company_culture: "Not specified".to_string(),
            estimated_salary_range: "Not specified".to_string(),
        }
    }

    fn cache_at(url: &str, op_timeout: Duration) -> RedisAnalysisCache {
        let client = RedisClient::open(url).unwrap();
        RedisAnalysisCache::new(client, Duration::from_secs(60), op_timeout)
    }

    fn unreachable_cache() -> RedisAnalysisCache {
        // Port 1 is never a Redis server; connections are refused.
        cache_at("redis://127.0.0.1:1/0", Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_get_fails_open_when_redis_is_unreachable() {
        assert!(unreachable_cache().get("https://x.example/1").await.is_none());
    }

    #[tokio::test]
    async fn test_put_reports_transport_errors() {
        let err = unreachable_cache()
            .put("https://x.example/1", &analysis())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Redis(_) | CacheError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_silent_server_is_bounded_by_operation_timeout() {
        // Accepts TCP connections but never answers a command.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cache = cache_at(&format!("redis://{addr}/0"), Duration::from_millis(200));

        let started = Instant::now();
        assert!(cache.get("https://x.example/2").await.is_none());
        let err = cache.put("https://x.example/2", &analysis()).await.unwrap_err();

        assert!(matches!(err, CacheError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(2));
        drop(listener);
    }

    #[test]
    fn test_zero_ttl_is_raised_to_minimum() {
        let client = RedisClient::open("redis://127.0.0.1:1/0").unwrap();
        let cache = RedisAnalysisCache::new(client, Duration::ZERO, Duration::from_millis(100));
        assert_eq!(cache.ttl, MIN_TTL);
    }
}
