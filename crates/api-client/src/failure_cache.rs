// In crates/api-client/src/failure_cache.rs

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Remembers symbols whose fetches exhausted their retries, so they are
/// skipped instead of hammered again within the TTL window.
///
/// The cache is an explicit value injected into the client; the clock is
/// passed into every call so tests control expiry.
#[derive(Debug)]
pub struct FailureCache {
    entries: HashMap<String, DateTime<Utc>>,
    ttl: Duration,
}

impl FailureCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// When the symbol last failed, if that failure is still fresh.
    pub fn get(&self, symbol: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.entries
            .get(symbol)
            .copied()
            .filter(|failed_at| now - *failed_at < self.ttl)
    }

    pub fn put(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.entries.insert(symbol.to_string(), now);
    }

    /// Drops every entry older than the TTL.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, failed_at| now - *failed_at < self.ttl);
    }
}
