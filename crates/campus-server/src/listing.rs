//! Listing access through the revalidation cache.
//!
//! Cacheable queries (the unfiltered first page of a kind) are served from
//! [`ListingCache`]:
//!
//! - fresh entries are returned as is;
//! - stale entries are returned and refetched in a background task, one
//!   task per key;
//! - missing or expired entries are fetched inline, and expired entries
//!   of every key are dropped before the result is stored.
//!
//! Failed fetches are never cached: the caller gets the empty fail-soft
//! page and the next request tries the CMS again.

use campus_client::cache::{CacheStatus, ListingKey};
use campus_client::ListingCache;
use campus_core::{ContentItem, ContentKind, ListQuery, Page};

use crate::state::AppState;

/// Fetch a listing page, going through the cache when the query allows it.
pub async fn cached_listing(state: &AppState, kind: ContentKind, query: ListQuery) -> Page<ContentItem> {
    let query = query.normalized();
    if !ListingCache::is_cacheable(&query) {
        return state.repository().list(kind, &query).await;
    }

    let key = ListingKey::new(kind, &query);
    match state.cache().get_with_status(&key) {
        Some((cached, CacheStatus::Fresh)) => {
            tracing::debug!(%kind, "listing cache hit");
            cached.page
        }
        Some((cached, _)) => {
            tracing::debug!(%kind, age_secs = cached.age().as_secs(), "serving stale listing");
            spawn_revalidation(state.clone(), key, kind, query);
            cached.page
        }
        None => fetch_and_store(state, key, kind, &query).await,
    }
}

async fn fetch_and_store(
    state: &AppState,
    key: ListingKey,
    kind: ContentKind,
    query: &ListQuery,
) -> Page<ContentItem> {
    match state.repository().try_list(kind, query).await {
        Ok(page) => {
            let evicted = state.cache().evict_expired();
            if evicted > 0 {
                tracing::debug!(evicted, "dropped expired listings");
            }
            state.cache().set(key, page.clone());
            page
        }
        Err(e) => {
            tracing::warn!(
                %kind,
                status = e.status,
                error = %e.message,
                "listing unavailable, rendering empty section"
            );
            Page::empty(query.page_size)
        }
    }
}

fn spawn_revalidation(state: AppState, key: ListingKey, kind: ContentKind, query: ListQuery) {
    if !state.cache().begin_refresh(&key) {
        return;
    }

    tokio::spawn(async move {
        let repository = state.repository();
        match repository.try_list(kind, &query).await {
            Ok(page) => {
                tracing::debug!(%kind, items = page.items.len(), "listing revalidated");
                state.cache().set(key.clone(), page);
            }
            Err(e) => {
                // Keep serving the stale page until it expires
                tracing::warn!(%kind, status = e.status, error = %e.message, "listing revalidation failed");
            }
        }
        state.cache().end_refresh(&key);
    });
}
