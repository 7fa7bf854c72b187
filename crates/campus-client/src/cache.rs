//! Timed revalidation cache for first-page listings.
//!
//! Pages are rendered from the first page of each listing. Instead of
//! hitting the CMS on every request, those pages are cached and refetched
//! periodically, bounding CMS load.
//!
//! ## Features
//!
//! - Thread-safe access via `Arc<RwLock<>>`
//! - Time-based freshness with configurable max age
//! - Stale-while-revalidate: stale entries are served while one background
//!   refresh per key runs
//!
//! ## Example
//!
//! ```rust,ignore
//! use campus_client::cache::{CacheStatus, ListingCache, ListingKey};
//!
//! let cache = ListingCache::new();
//! let key = ListingKey::new(ContentKind::Blog, &query);
//!
//! match cache.get_with_status(&key) {
//!     Some((cached, CacheStatus::Fresh)) => render(cached.page),
//!     Some((cached, CacheStatus::Stale)) => {
//!         if cache.begin_refresh(&key) {
//!             // spawn a refetch, then cache.set(...) and cache.end_refresh(&key)
//!         }
//!         render(cached.page)
//!     }
//!     _ => { /* fetch inline and cache.set(key, page) */ }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use campus_core::{ContentItem, ContentKind, ListQuery, Page, build_list_query};

/// Default maximum age before a listing is revalidated (1 minute).
pub const DEFAULT_MAX_AGE_SECS: u64 = 60;

/// Default grace period during which stale listings are still served (5 minutes).
pub const DEFAULT_STALE_GRACE_SECS: u64 = 300;

/// Configuration for cache behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries younger than this are fresh.
    pub max_age: Duration,

    /// After `max_age`, entries are stale but still serveable for this long.
    pub stale_grace: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
            stale_grace: Duration::from_secs(DEFAULT_STALE_GRACE_SECS),
        }
    }
}

impl CacheConfig {
    /// Creates a new configuration with custom settings.
    pub fn new(max_age_secs: u64, stale_grace_secs: u64) -> Self {
        Self {
            max_age: Duration::from_secs(max_age_secs),
            stale_grace: Duration::from_secs(stale_grace_secs),
        }
    }
}

/// Status of a cached listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cache entry is fresh and valid.
    Fresh,
    /// Cache entry is stale but can be served while revalidating.
    Stale,
    /// Cache entry has expired and should not be served.
    Expired,
}

/// Cache key: the content kind plus the exact CMS query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub kind: ContentKind,
    pub query: String,
}

impl ListingKey {
    pub fn new(kind: ContentKind, query: &ListQuery) -> Self {
        Self {
            kind,
            query: build_list_query(kind, query),
        }
    }
}

/// A cached listing page with metadata.
#[derive(Debug, Clone)]
pub struct CachedListing {
    /// The cached page.
    pub page: Page<ContentItem>,

    /// When the page was cached.
    pub cached_at: Instant,
}

impl CachedListing {
    /// Creates a new cached listing stamped now.
    pub fn new(page: Page<ContentItem>) -> Self {
        Self {
            page,
            cached_at: Instant::now(),
        }
    }

    /// Returns the age of this cache entry.
    pub fn age(&self) -> Duration {
        self.cached_at.elapsed()
    }

    /// Determines the status of this entry at `now`.
    pub fn status_at(&self, now: Instant, config: &CacheConfig) -> CacheStatus {
        let age = now.saturating_duration_since(self.cached_at);

        if age <= config.max_age {
            CacheStatus::Fresh
        } else if age <= config.max_age + config.stale_grace {
            CacheStatus::Stale
        } else {
            CacheStatus::Expired
        }
    }

    /// Determines the status of this entry now.
    pub fn status(&self, config: &CacheConfig) -> CacheStatus {
        self.status_at(Instant::now(), config)
    }

    /// Returns true if this entry has fully expired.
    pub fn is_expired(&self, config: &CacheConfig) -> bool {
        self.status(config) == CacheStatus::Expired
    }
}

/// Thread-safe listing cache.
#[derive(Debug, Clone)]
pub struct ListingCache {
    /// The cached listings.
    entries: Arc<RwLock<HashMap<ListingKey, CachedListing>>>,

    /// Keys with a background refresh in flight.
    refreshing: Arc<Mutex<HashSet<ListingKey>>>,

    /// Cache configuration.
    config: CacheConfig,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingCache {
    /// Creates a new listing cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a listing cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            refreshing: Arc::new(Mutex::new(HashSet::new())),
            config,
        }
    }

    /// Returns the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Only the unfiltered first page of a listing is cached.
    pub fn is_cacheable(query: &ListQuery) -> bool {
        query.is_first_unfiltered()
    }

    /// Gets a cached listing.
    ///
    /// Returns `None` if not cached or if the entry has fully expired.
    pub fn get(&self, key: &ListingKey) -> Option<CachedListing> {
        self.get_with_status(key).map(|(cached, _)| cached)
    }

    /// Gets a cached listing with its status.
    ///
    /// Returns `(cached, status)` if present and not expired.
    pub fn get_with_status(&self, key: &ListingKey) -> Option<(CachedListing, CacheStatus)> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        let status = entry.status(&self.config);

        // Don't return fully expired entries
        if status == CacheStatus::Expired {
            return None;
        }

        Some((entry.clone(), status))
    }

    /// Stores a listing page in the cache.
    pub fn set(&self, key: ListingKey, page: Page<ContentItem>) {
        self.insert(key, CachedListing::new(page));
    }

    /// Stores a prepared entry, keeping its timestamp.
    pub fn insert(&self, key: ListingKey, entry: CachedListing) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, entry);
        }
    }

    /// Claims the background refresh for `key`.
    ///
    /// Returns false if a refresh for this key is already running.
    pub fn begin_refresh(&self, key: &ListingKey) -> bool {
        match self.refreshing.lock() {
            Ok(mut refreshing) => refreshing.insert(key.clone()),
            Err(_) => false,
        }
    }

    /// Releases the refresh claimed with [`ListingCache::begin_refresh`].
    pub fn end_refresh(&self, key: &ListingKey) {
        if let Ok(mut refreshing) = self.refreshing.lock() {
            refreshing.remove(key);
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        if let Ok(mut entries) = self.entries.write() {
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(&self.config));
            before - entries.len()
        } else {
            0
        }
    }

    /// Returns statistics about the cache.
    pub fn stats(&self) -> CacheStats {
        let Ok(entries) = self.entries.read() else {
            return CacheStats::default();
        };

        let mut stats = CacheStats {
            total: entries.len(),
            ..CacheStats::default()
        };
        for entry in entries.values() {
            match entry.status(&self.config) {
                CacheStatus::Fresh => stats.fresh += 1,
                CacheStatus::Stale => stats.stale += 1,
                CacheStatus::Expired => stats.expired += 1,
            }
        }
        stats
    }
}

/// Statistics about cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries.
    pub total: usize,
    /// Number of fresh entries.
    pub fresh: usize,
    /// Number of stale entries.
    pub stale: usize,
    /// Number of expired entries.
    pub expired: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::item;
    use campus_core::Pagination;

    fn make_page(ids: &[u64]) -> Page<ContentItem> {
        Page {
            items: ids.iter().map(|&i| item(ContentKind::Blog, i)).collect(),
            pagination: Pagination::from_total(1, 9, ids.len() as u64),
        }
    }

    fn blog_key() -> ListingKey {
        ListingKey::new(ContentKind::Blog, &ListQuery::first(9))
    }

    /// An entry cached `secs` seconds ago.
    fn aged(page: Page<ContentItem>, secs: u64) -> Option<CachedListing> {
        let cached_at = Instant::now().checked_sub(Duration::from_secs(secs))?;
        Some(CachedListing { page, cached_at })
    }

    #[test]
    fn cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(DEFAULT_MAX_AGE_SECS));
        assert_eq!(config.stale_grace, Duration::from_secs(DEFAULT_STALE_GRACE_SECS));
    }

    #[test]
    fn cached_listing_status_by_age() {
        let config = CacheConfig::new(60, 300);
        let cached = CachedListing::new(make_page(&[1]));
        let now = cached.cached_at;

        assert_eq!(cached.status_at(now, &config), CacheStatus::Fresh);
        assert_eq!(
            cached.status_at(now + Duration::from_secs(60), &config),
            CacheStatus::Fresh
        );
        assert_eq!(
            cached.status_at(now + Duration::from_secs(61), &config),
            CacheStatus::Stale
        );
        assert_eq!(
            cached.status_at(now + Duration::from_secs(360), &config),
            CacheStatus::Stale
        );
        assert_eq!(
            cached.status_at(now + Duration::from_secs(361), &config),
            CacheStatus::Expired
        );
    }

    #[test]
    fn listing_key_depends_on_query() {
        let first = blog_key();
        let second = ListingKey::new(ContentKind::Blog, &ListQuery::first(9).with_page(2));
        let events = ListingKey::new(ContentKind::Event, &ListQuery::first(9));

        assert_ne!(first, second);
        assert_ne!(first, events);
        assert_eq!(first, blog_key());
    }

    #[test]
    fn only_first_unfiltered_pages_are_cacheable() {
        assert!(ListingCache::is_cacheable(&ListQuery::first(9)));
        assert!(!ListingCache::is_cacheable(&ListQuery::first(9).with_page(2)));
        assert!(!ListingCache::is_cacheable(
            &ListQuery::first(9).with_search(Some("term".into()))
        ));
    }

    #[test]
    fn set_get_fresh() {
        let cache = ListingCache::new();
        cache.set(blog_key(), make_page(&[1, 2, 3]));

        let (cached, status) = cache.get_with_status(&blog_key()).unwrap();
        assert_eq!(status, CacheStatus::Fresh);
        assert_eq!(cached.page.items.len(), 3);
    }

    #[test]
    fn get_missing() {
        let cache = ListingCache::new();
        assert!(cache.get(&blog_key()).is_none());
    }

    #[test]
    fn stale_entries_are_served() {
        let cache = ListingCache::with_config(CacheConfig::new(60, 300));
        let Some(entry) = aged(make_page(&[1]), 120) else {
            return;
        };
        cache.insert(blog_key(), entry);

        let (_, status) = cache.get_with_status(&blog_key()).unwrap();
        assert_eq!(status, CacheStatus::Stale);
    }

    #[test]
    fn expired_entries_are_hidden_and_evicted() {
        let cache = ListingCache::with_config(CacheConfig::new(60, 300));
        let Some(entry) = aged(make_page(&[1]), 1_000) else {
            return;
        };
        cache.insert(blog_key(), entry);

        assert!(cache.get(&blog_key()).is_none());
        assert_eq!(cache.stats().expired, 1);
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn eviction_keeps_live_entries() {
        let cache = ListingCache::with_config(CacheConfig::new(60, 300));
        let Some(expired) = aged(make_page(&[1]), 1_000) else {
            return;
        };
        cache.insert(blog_key(), expired);
        cache.set(
            ListingKey::new(ContentKind::Event, &ListQuery::first(9)),
            make_page(&[2]),
        );

        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn refresh_is_claimed_once() {
        let cache = ListingCache::new();
        let key = blog_key();

        assert!(cache.begin_refresh(&key));
        assert!(!cache.begin_refresh(&key));
        cache.end_refresh(&key);
        assert!(cache.begin_refresh(&key));
    }

    #[test]
    fn clone_shares_state() {
        let cache1 = ListingCache::new();
        let cache2 = cache1.clone();

        cache1.set(blog_key(), make_page(&[1]));

        assert!(cache2.get(&blog_key()).is_some());
        assert_eq!(cache1.len(), cache2.len());
    }

    #[test]
    fn update_existing() {
        let cache = ListingCache::new();
        cache.set(blog_key(), make_page(&[1]));
        cache.set(blog_key(), make_page(&[1, 2]));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&blog_key()).unwrap().page.items.len(), 2);
    }

    #[test]
    fn stats_with_entries() {
        let cache = ListingCache::new();
        for kind in ContentKind::ALL {
            cache.set(ListingKey::new(kind, &ListQuery::first(9)), make_page(&[1]));
        }

        let stats = cache.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fresh, 3);
        assert_eq!(stats.stale, 0);
    }
}
