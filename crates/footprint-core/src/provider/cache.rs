//! Last-known-good estimate cache using moka
//!
//! Holds the most recent successful remote estimate per request so a later
//! soft failure can fall back to it instead of zero.

use moka::future::Cache;
use std::time::Duration;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Estimate cache keyed by activity request fingerprint
///
/// Values are annual tonnes CO2e.
#[derive(Debug, Clone)]
pub struct EstimateCache {
    inner: Cache<String, f64>,
}

impl EstimateCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Remember a successful estimate
    #[inline]
    pub async fn insert(&self, fingerprint: String, tonnes: f64) {
        self.inner.insert(fingerprint, tonnes).await;
    }

    /// Last successful estimate, if still cached
    #[inline]
    pub async fn get(&self, fingerprint: &str) -> Option<f64> {
        self.inner.get(fingerprint).await
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    ///
    /// Counts are eventually consistent; call [`Self::sync`] first when an
    /// exact figure matters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Flush pending maintenance so counts are up to date
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl Default for EstimateCache {
    /// Create cache with default capacity (1,000 entries)
    fn default() -> Self {
        Self::new(1_000)
    }
}
