//! In-memory content source for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use campus_core::{ContentId, ContentItem, ContentKind, ListQuery, Page, Pagination};

use crate::error::{CmsError, CmsResult};
use crate::repository::ContentSource;

/// A content item with predictable fields: slug `<kind>-<id>`.
pub fn item(kind: ContentKind, id: u64) -> ContentItem {
    titled(kind, id, &format!("{} {}", kind.label(), id))
}

/// Same as [`item`] with a chosen title.
pub fn titled(kind: ContentKind, id: u64, title: &str) -> ContentItem {
    let prefix = match kind {
        ContentKind::Blog => "blog",
        ContentKind::Event => "event",
        ContentKind::CaseStudy => "case-study",
    };
    ContentItem {
        id: ContentId(id),
        document_id: None,
        kind,
        slug: format!("{}-{}", prefix, id),
        title: title.to_string(),
        summary: None,
        body: None,
        cover: None,
        date: None,
        ends_at: None,
        location: None,
        categories: Vec::new(),
        tags: Vec::new(),
        views: 0,
    }
}

/// Serves pages out of vectors and records every call.
#[derive(Debug, Default)]
pub struct MemorySource {
    items: Mutex<HashMap<ContentKind, Vec<ContentItem>>>,
    failure: Mutex<Option<CmsError>>,
    requests: Mutex<Vec<ListQuery>>,
    views: Mutex<Vec<(ContentKind, ContentId)>>,
}

impl MemorySource {
    pub fn with_items(kind: ContentKind, items: impl IntoIterator<Item = ContentItem>) -> Self {
        let source = Self::default();
        source
            .items
            .lock()
            .unwrap()
            .insert(kind, items.into_iter().collect());
        source
    }

    /// Every following call fails with `err`.
    pub fn fail_with(&self, err: CmsError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// Calls succeed again.
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Listing queries received so far.
    pub fn requests(&self) -> Vec<ListQuery> {
        self.requests.lock().unwrap().clone()
    }

    /// View increments received so far.
    pub fn view_calls(&self) -> Vec<(ContentKind, ContentId)> {
        self.views.lock().unwrap().clone()
    }

    fn check_failure(&self) -> CmsResult<()> {
        match self.failure.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ContentSource for MemorySource {
    async fn fetch_page(&self, kind: ContentKind, query: &ListQuery) -> CmsResult<Page<ContentItem>> {
        self.requests.lock().unwrap().push(query.clone());
        self.check_failure()?;

        let items = self.items.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<ContentItem> = items
            .get(&kind)
            .into_iter()
            .flatten()
            .filter(|i| Some(i.id) != query.exclude)
            .filter(|i| match &needle {
                Some(n) => i.title.to_lowercase().contains(n),
                None => true,
            })
            .cloned()
            .collect();

        let size = query.page_size.max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * size;
        let page_items = matching.iter().skip(start).take(size).cloned().collect();

        Ok(Page {
            items: page_items,
            pagination: Pagination::from_total(query.page, query.page_size, matching.len() as u64),
        })
    }

    async fn fetch_by_slug(&self, kind: ContentKind, slug: &str) -> CmsResult<Option<ContentItem>> {
        self.check_failure()?;
        let items = self.items.lock().unwrap();
        Ok(items
            .get(&kind)
            .and_then(|list| list.iter().find(|i| i.slug == slug))
            .cloned())
    }

    async fn increment_views(&self, kind: ContentKind, id: ContentId) -> CmsResult<()> {
        self.views.lock().unwrap().push((kind, id));
        self.check_failure()
    }
}
