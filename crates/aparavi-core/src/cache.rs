//! In-memory TTL cache for query results.
//!
//! Keys are a content hash over the query text and the canonical rendering
//! of its options, so equivalent calls always land on the same entry. There
//! is no LRU or size bound; the expected workload is a single long-lived
//! process with moderate call volume.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::options::QueryOptions;

/// Derive the cache key for a query + options pair.
///
/// SHA-256 over `query + ":" + canonical_options`, hex-encoded. Stable
/// across equivalent option orderings because the options rendering is
/// canonical.
pub fn cache_key(query: &str, options: &QueryOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update(b":");
    hasher.update(options.canonical_json().as_bytes());
    hex::encode(hasher.finalize())
}

struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
}

/// Bounded-lifetime key→value store.
///
/// Not internally synchronized; the owning client wraps it in a lock.
pub struct QueryCache {
    entries: HashMap<String, CacheEntry>,
    default_ttl_seconds: u64,
}

impl QueryCache {
    pub fn new(default_ttl_seconds: u64) -> Self {
        Self {
            entries: HashMap::new(),
            default_ttl_seconds,
        }
    }

    /// Get a value, lazily evicting it if expired.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if Utc::now() < entry.expires_at => {
                debug!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key, "cache entry expired");
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, overwriting any existing entry unconditionally.
    pub fn set(&mut self, key: &str, value: Value, ttl_seconds: Option<u64>) {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl_seconds);
        let expires_at = Utc::now() + Duration::seconds(ttl as i64);
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::QueryFormat;
    use serde_json::json;

    #[test]
    fn test_cache_key_is_deterministic() {
        let options = QueryOptions::execute(QueryFormat::Json);
        let key1 = cache_key("SELECT name", &options);
        let key2 = cache_key("SELECT name", &options);
        assert_eq!(key1, key2);
        assert_eq!(key1.len(), 64);
    }

    #[test]
    fn test_cache_key_varies_by_query_and_options() {
        let options = QueryOptions::execute(QueryFormat::Json);
        let base = cache_key("SELECT name", &options);
        assert_ne!(base, cache_key("SELECT size", &options));
        assert_ne!(
            base,
            cache_key("SELECT name", &QueryOptions::execute(QueryFormat::Csv))
        );
        assert_ne!(base, cache_key("SELECT name", &QueryOptions::validate_only()));
    }

    #[test]
    fn test_get_returns_stored_value() {
        let mut cache = QueryCache::new(300);
        cache.set("k", json!({"status": "OK"}), None);
        assert_eq!(cache.get("k"), Some(json!({"status": "OK"})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_is_absent_and_purged() {
        let mut cache = QueryCache::new(300);
        cache.set("k", json!(1), Some(0));
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites_unconditionally() {
        let mut cache = QueryCache::new(300);
        cache.set("k", json!(1), None);
        cache.set("k", json!(2), None);
        assert_eq!(cache.get("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = QueryCache::new(300);
        cache.set("a", json!(1), None);
        cache.set("b", json!(2), None);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
