use std::sync::Arc;
use chrono::{DateTime, Utc, Duration};
use dashmap::DashMap;

use crate::external::price_lookup::PriceLookupError;

/// A remembered failed price lookup
#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub error: PriceLookupError,
    pub ttl_minutes: i64,
}

impl FailureInfo {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.failed_at + Duration::minutes(self.ttl_minutes)
    }
}

/// Thread-safe cache of failed lookups keyed by `{asset type}:{symbol}`.
/// Keeps a throttled or unknown symbol from being hammered on every valuation poll.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Returns the failure if it is still within its TTL
    pub fn is_failed(&self, key: &str) -> Option<FailureInfo> {
        if let Some(entry) = self.cache.get(key) {
            let info = entry.value().clone();

            if info.is_live(Utc::now()) {
                return Some(info);
            } else {
                drop(entry); // Release the read lock before removing
                self.cache.remove(key);
            }
        }
        None
    }

    pub fn record_failure(&self, key: &str, error: PriceLookupError) {
        let ttl_minutes = match error {
            PriceLookupError::NotFound => 60,
            PriceLookupError::RateLimited => 1,
            PriceLookupError::Unavailable(_) => 5,
        };

        let now = Utc::now();
        self.cleanup_expired(now);
        let info = FailureInfo {
            failed_at: now,
            error,
            ttl_minutes,
        };

        self.cache.insert(key.to_string(), info);
    }

    /// Drops every entry past its TTL. Failed symbols are often never
    /// looked up again, so `is_failed` alone would not reclaim them.
    fn cleanup_expired(&self, now: DateTime<Utc>) {
        self.cache.retain(|_, info| info.is_live(now));
    }

    /// Forget a key, e.g. after a successful lookup
    pub fn clear(&self, key: &str) {
        self.cache.remove(key);
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_records_and_retrieves_failures() {
        let cache = FailureCache::new();

        cache.record_failure("crypto:notacoin", PriceLookupError::NotFound);

        let result = cache.is_failed("crypto:notacoin");
        assert!(result.is_some());
        assert_eq!(result.unwrap().error, PriceLookupError::NotFound);
        assert!(cache.is_failed("crypto:bitcoin").is_none());
    }

    #[test]
    fn test_cache_clears_key() {
        let cache = FailureCache::new();

        cache.record_failure("equity:TEST", PriceLookupError::RateLimited);
        assert!(cache.is_failed("equity:TEST").is_some());

        cache.clear("equity:TEST");
        assert!(cache.is_failed("equity:TEST").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_different_ttls_for_error_kinds() {
        let cache = FailureCache::new();

        cache.record_failure("a", PriceLookupError::NotFound);
        cache.record_failure("b", PriceLookupError::RateLimited);
        cache.record_failure("c", PriceLookupError::Unavailable("timeout".into()));

        assert_eq!(cache.is_failed("a").unwrap().ttl_minutes, 60);
        assert_eq!(cache.is_failed("b").unwrap().ttl_minutes, 1);
        assert_eq!(cache.is_failed("c").unwrap().ttl_minutes, 5);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_expired_failure_is_dropped() {
        let cache = FailureCache::new();
        cache.cache.insert(
            "crypto:old".to_string(),
            FailureInfo {
                failed_at: Utc::now() - Duration::minutes(10),
                error: PriceLookupError::RateLimited,
                ttl_minutes: 1,
            },
        );

        assert!(cache.is_failed("crypto:old").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_recording_sweeps_other_expired_entries() {
        let cache = FailureCache::new();
        cache.cache.insert(
            "equity:GONE".to_string(),
            FailureInfo {
                failed_at: Utc::now() - Duration::minutes(90),
                error: PriceLookupError::NotFound,
                ttl_minutes: 60,
            },
        );
        cache.record_failure("crypto:fresh", PriceLookupError::RateLimited);
        cache.record_failure("crypto:other", PriceLookupError::NotFound);

        assert_eq!(cache.len(), 2);
        assert!(!cache.cache.contains_key("equity:GONE"));
        assert!(cache.is_failed("crypto:fresh").is_some());
    }
}
