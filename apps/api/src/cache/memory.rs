use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::{AnalysisCache, CacheEntry, CacheError, MIN_TTL};
use crate::models::analysis::JobAnalysis;

struct StoredAnalysis {
    analysis: JobAnalysis,
    deadline: Instant,
}

/// Process-local cache, selected with `REDIS_URL=memory://`.
///
/// Expired entries become unreadable immediately and are dropped on the next
/// write. Uses tokio's clock so expiry follows `tokio::time::pause`.
pub struct InMemoryAnalysisCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, StoredAnalysis>>,
}

impl InMemoryAnalysisCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.max(MIN_TTL),
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get(&self, url: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().await;
        let stored = entries.get(url)?;

        let remaining = stored.deadline.checked_duration_since(Instant::now())?;
        if remaining.is_zero() {
            return None;
        }

        Some(CacheEntry {
            url: url.to_string(),
            analysis: stored.analysis.clone(),
            expires_at: Utc::now() + chrono::Duration::from_std(remaining).ok()?,
        })
    }

    async fn put(&self, url: &str, analysis: &JobAnalysis) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, stored| stored.deadline > now);
        entries.insert(
            url.to_string(),
            StoredAnalysis {
                analysis: analysis.clone(),
                deadline: now + self.ttl,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn analysis(summary: &str) -> JobAnalysis {
        JobAnalysis {
            summary: summary.to_string(),
            key_skills: vec!["Rust".to_string(), "SQL".to_string()],
            required_experience: "3 years".to_string(),
            company_culture: "Collaborative".to_string(),
            estimated_salary_range: "Not specified".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_trip_within_expiry_window() {
        let cache = InMemoryAnalysisCache::new(WEEK);
        let stored = analysis("Backend engineer");

        cache.put("https://x.example/1", &stored).await.unwrap();
        tokio::time::advance(WEEK - Duration::from_secs(1)).await;

        let entry = cache.get("https://x.example/1").await.expect("entry present");
        assert_eq!(entry.url, "https://x.example/1");
        assert_eq!(entry.analysis, stored);
        assert!(entry.expires_at > Utc::now());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_absent_after_expiry_window() {
        let cache = InMemoryAnalysisCache::new(WEEK);
        cache.put("https://x.example/1", &analysis("a")).await.unwrap();

        tokio::time::advance(WEEK).await;

        assert!(cache.get("https://x.example/1").await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_url_is_a_miss() {
        let cache = InMemoryAnalysisCache::new(WEEK);
        assert!(cache.get("https://x.example/missing").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_wholesale_and_restarts_ttl() {
        let cache = InMemoryAnalysisCache::new(WEEK);
        cache.put("u", &analysis("first")).await.unwrap();
        tokio::time::advance(WEEK / 2).await;

        cache.put("u", &analysis("second")).await.unwrap();
        tokio::time::advance(WEEK / 2 + Duration::from_secs(60)).await;

        let entry = cache.get("u").await.expect("ttl restarted on overwrite");
        assert_eq!(entry.analysis.summary, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned_on_write() {
        let cache = InMemoryAnalysisCache::new(Duration::from_secs(10));
        cache.put("old", &analysis("old")).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        cache.put("new", &analysis("new")).await.unwrap();

        assert_eq!(cache.entries.read().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_keeps_entry_for_minimum_window() {
        let cache = InMemoryAnalysisCache::new(Duration::ZERO);
        cache.put("u", &analysis("short-lived")).await.unwrap();

        assert!(cache.get("u").await.is_some());

        tokio::time::advance(MIN_TTL).await;
        assert!(cache.get("u").await.is_none());
    }
}
