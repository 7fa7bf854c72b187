//! Listing data-access used while rendering pages on the server.
//!
//! Rendering must never hard-fail because the CMS is unavailable, so the
//! listing operations here catch every error, log it and return an empty
//! page with the pagination stub instead.

use std::future::Future;
use std::sync::Arc;

use campus_core::{ContentId, ContentItem, ContentKind, ListQuery, Page};

use crate::error::CmsResult;

/// Anything that can serve content pages.
///
/// Implemented by [`CmsClient`](crate::CmsClient); tests substitute
/// in-memory sources.
pub trait ContentSource {
    /// Fetch one listing page.
    fn fetch_page(
        &self,
        kind: ContentKind,
        query: &ListQuery,
    ) -> impl Future<Output = CmsResult<Page<ContentItem>>> + Send;

    /// Look up one item by slug.
    fn fetch_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> impl Future<Output = CmsResult<Option<ContentItem>>> + Send;

    /// Increment the view counter of one item.
    fn increment_views(
        &self,
        kind: ContentKind,
        id: ContentId,
    ) -> impl Future<Output = CmsResult<()>> + Send;
}

impl<S: ContentSource + Sync> ContentSource for &S {
    fn fetch_page(
        &self,
        kind: ContentKind,
        query: &ListQuery,
    ) -> impl Future<Output = CmsResult<Page<ContentItem>>> + Send {
        (**self).fetch_page(kind, query)
    }

    fn fetch_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> impl Future<Output = CmsResult<Option<ContentItem>>> + Send {
        (**self).fetch_by_slug(kind, slug)
    }

    fn increment_views(
        &self,
        kind: ContentKind,
        id: ContentId,
    ) -> impl Future<Output = CmsResult<()>> + Send {
        (**self).increment_views(kind, id)
    }
}

impl<S: ContentSource + Send + Sync> ContentSource for Arc<S> {
    fn fetch_page(
        &self,
        kind: ContentKind,
        query: &ListQuery,
    ) -> impl Future<Output = CmsResult<Page<ContentItem>>> + Send {
        (**self).fetch_page(kind, query)
    }

    fn fetch_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> impl Future<Output = CmsResult<Option<ContentItem>>> + Send {
        (**self).fetch_by_slug(kind, slug)
    }

    fn increment_views(
        &self,
        kind: ContentKind,
        id: ContentId,
    ) -> impl Future<Output = CmsResult<()>> + Send {
        (**self).increment_views(kind, id)
    }
}

/// Server-side content access with fail-soft listings.
#[derive(Debug, Clone)]
pub struct ContentRepository<S> {
    source: S,
}

impl<S: ContentSource> ContentRepository<S> {
    /// Create a new repository over the given source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a listing page, propagating errors.
    pub async fn try_list(&self, kind: ContentKind, query: &ListQuery) -> CmsResult<Page<ContentItem>> {
        let query = query.clone().normalized();
        self.source.fetch_page(kind, &query).await
    }

    /// Fetch a listing page, degrading to an empty page on any failure.
    pub async fn list(&self, kind: ContentKind, query: &ListQuery) -> Page<ContentItem> {
        let query = query.clone().normalized();
        match self.source.fetch_page(kind, &query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    %kind,
                    page = query.page,
                    status = e.status,
                    error = %e.message,
                    "listing unavailable, rendering empty section"
                );
                Page::empty(query.page_size)
            }
        }
    }

    /// Most recent items, leaving out the one currently displayed.
    pub async fn recent(&self, kind: ContentKind, exclude: Option<ContentId>, limit: u32) -> Page<ContentItem> {
        let query = ListQuery {
            exclude,
            ..ListQuery::first(limit)
        };
        self.list(kind, &query).await
    }

    /// Fetch one item by slug.
    pub async fn detail(&self, kind: ContentKind, slug: &str) -> CmsResult<Option<ContentItem>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(None);
        }
        self.source.fetch_by_slug(kind, slug).await
    }
}
