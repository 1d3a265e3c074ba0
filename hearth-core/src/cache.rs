//! Single-value cache with an explicit expiry.
//!
//! Callers pass `now` in, so the cache never reads the clock itself and can
//! be owned by whatever fetches the value (a token client, a settings
//! loader) instead of living in a process-wide static.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(T, DateTime<Utc>)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache { ttl, entry: None }
    }

    /// The cached value, if it has not expired at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        match &self.entry {
            Some((value, expires_at)) if now < *expires_at => Some(value),
            _ => None,
        }
    }

    /// Cache `value` for the configured TTL.
    pub fn insert(&mut self, value: T, now: DateTime<Utc>) {
        let expires_at = now + self.ttl;
        self.entry = Some((value, expires_at));
    }

    /// Cache `value` until an expiry dictated by the source (e.g. a token's
    /// `expires_in`), ignoring the configured TTL.
    pub fn insert_with_expiry(&mut self, value: T, expires_at: DateTime<Utc>) {
        self.entry = Some((value, expires_at));
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.entry.as_ref().map(|(_, expires_at)| *expires_at)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_value_expires_after_ttl() {
        let mut cache = TtlCache::new(Duration::seconds(300));
        assert_eq!(cache.get(at(0)), None);

        cache.insert("settings", at(0));
        assert_eq!(cache.get(at(299)), Some(&"settings"));
        assert_eq!(cache.get(at(300)), None);
    }

    #[test]
    fn test_explicit_expiry_overrides_ttl() {
        let mut cache = TtlCache::new(Duration::seconds(300));
        cache.insert_with_expiry(42, at(3600));

        assert_eq!(cache.get(at(1000)), Some(&42));
        assert_eq!(cache.expires_at(), Some(at(3600)));
    }

    #[test]
    fn test_invalidate_clears_value() {
        let mut cache = TtlCache::new(Duration::seconds(300));
        cache.insert(1, at(0));
        cache.invalidate();
        assert_eq!(cache.get(at(1)), None);
        assert_eq!(cache.expires_at(), None);
    }
}
