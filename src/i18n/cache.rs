//! Time-bounded cache of fetched message mappings.
//!
//! Entries expire after a fixed TTL and are refetched on the next request.
//! There is no size bound and no background refresh: the set of keys is the
//! locale registry, so it never grows past a handful of entries.

use crate::i18n::{Locale, MessageMapping};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// A fetched mapping and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub mapping: Arc<MessageMapping>,
    pub fetched_at: DateTime<Utc>,
}

/// Message mappings keyed by locale, valid for a fixed TTL.
///
/// Owned by the application state and handed to the `MessageFetcher`; it is
/// never a process-wide global.
#[derive(Debug)]
pub struct MessageCache {
    ttl: TimeDelta,
    entries: RwLock<HashMap<Locale, CacheEntry>>,
}

impl MessageCache {
    /// Create an empty cache.
    ///
    /// # Arguments
    /// * `ttl` - How long a fetched mapping stays valid. Durations too large
    ///   for `chrono` are clamped, i.e. entries never expire.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up the mapping for a locale.
    ///
    /// # Returns
    /// * `Some(mapping)` if an entry exists and is younger than the TTL
    /// * `None` if there is no entry or it has expired; an expired entry is
    ///   removed as a side effect
    pub async fn get(&self, locale: Locale) -> Option<Arc<MessageMapping>> {
        self.get_at(locale, Utc::now()).await
    }

    pub(crate) async fn get_at(
        &self,
        locale: Locale,
        now: DateTime<Utc>,
    ) -> Option<Arc<MessageMapping>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&locale) {
                Some(entry) if !self.is_expired(entry, now) => {
                    return Some(Arc::clone(&entry.mapping))
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it, unless a concurrent fetch already replaced it
        let mut entries = self.entries.write().await;
        if entries
            .get(&locale)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            entries.remove(&locale);
        }
        None
    }

    /// Store a freshly fetched mapping, replacing any previous entry.
    ///
    /// # Arguments
    /// * `locale` - The locale the mapping was fetched for
    /// * `mapping` - The complete mapping; partial mappings are never cached
    pub async fn insert(&self, locale: Locale, mapping: Arc<MessageMapping>) {
        self.insert_at(locale, mapping, Utc::now()).await;
    }

    pub(crate) async fn insert_at(
        &self,
        locale: Locale,
        mapping: Arc<MessageMapping>,
        fetched_at: DateTime<Utc>,
    ) {
        self.entries
            .write()
            .await
            .insert(locale, CacheEntry { mapping, fetched_at });
    }

    /// Number of locales with a fresh (unexpired) entry.
    pub async fn len(&self) -> usize {
        self.len_at(Utc::now()).await
    }

    pub(crate) async fn len_at(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count()
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.fetched_at) >= self.ttl
    }
}
