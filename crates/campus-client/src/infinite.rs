//! Infinite pagination for listing pages.
//!
//! An [`InfiniteListing`] keeps one ordered sequence of fetched pages per
//! search term. The unfiltered sequence can be seeded with the first page
//! rendered on the server; every search term starts its own sequence from
//! page 1, since the seed only describes the unfiltered listing.
//!
//! Fetching is split in two steps, [`InfiniteListing::next_request`] and
//! [`InfiniteListing::apply`], so that a response is always filed under the
//! search term it was requested for. A slow response for an old term lands
//! in that term's sequence and never in the one currently displayed.
//! [`InfiniteListing::fetch_next_page`] runs both steps against the source.

use std::collections::HashMap;

use campus_core::{ContentItem, ContentKind, ListQuery, Page, clean_term};

use crate::error::{CmsError, CmsResult};
use crate::repository::ContentSource;

/// Loading state of one page sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A page request is in flight.
    Loading,
    /// The last request succeeded.
    Success,
    /// The last request failed; fetched pages are kept.
    Error(CmsError),
}

/// A page request issued by [`InfiniteListing::next_request`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    search: Option<String>,
    query: ListQuery,
}

impl PageRequest {
    /// Search term the request belongs to.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Query to send to the CMS.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Default)]
struct PageSequence {
    pages: Vec<Page<ContentItem>>,
    status: FetchStatus,
}

impl PageSequence {
    fn has_next_page(&self) -> bool {
        self.pages.last().is_none_or(Page::has_next_page)
    }

    fn next_page_number(&self) -> u32 {
        self.pages
            .last()
            .map_or(1, |page| page.pagination.page.saturating_add(1))
    }
}

/// Client-side paginated listing, driven by "load more" or scrolling.
#[derive(Debug)]
pub struct InfiniteListing<S> {
    source: S,
    kind: ContentKind,
    base: ListQuery,
    search: Option<String>,
    sequences: HashMap<Option<String>, PageSequence>,
}

impl<S: ContentSource> InfiniteListing<S> {
    /// Create a listing; `base` supplies page size and the non-search filters.
    pub fn new(source: S, kind: ContentKind, base: ListQuery) -> Self {
        let base = ListQuery {
            page: 1,
            search: None,
            ..base
        }
        .normalized();

        Self {
            source,
            kind,
            base,
            search: None,
            sequences: HashMap::new(),
        }
    }

    /// Install the server-rendered first page as the unfiltered sequence.
    pub fn seed(&mut self, page: Page<ContentItem>) {
        self.sequences.insert(
            None,
            PageSequence {
                pages: vec![page],
                status: FetchStatus::Success,
            },
        );
    }

    /// Switch to another search term. Returns true if the term changed.
    ///
    /// Blank terms select the unfiltered listing.
    pub fn set_search(&mut self, term: Option<String>) -> bool {
        let term = clean_term(term);
        if term == self.search {
            return false;
        }
        tracing::debug!(kind = %self.kind, search = ?term, "listing search changed");
        self.search = term;
        true
    }

    /// Current search term.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    fn current(&self) -> Option<&PageSequence> {
        self.sequences.get(&self.search)
    }

    /// Pages fetched for the current term, in fetch order.
    pub fn pages(&self) -> &[Page<ContentItem>] {
        self.current().map(|s| s.pages.as_slice()).unwrap_or_default()
    }

    /// All items for the current term, page by page.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.pages().iter().flat_map(|page| page.items.iter())
    }

    /// Total matching items reported by the latest page, if any.
    pub fn total(&self) -> Option<u64> {
        self.pages().last().map(|page| page.pagination.total)
    }

    /// Status of the current term's sequence.
    pub fn status(&self) -> &FetchStatus {
        const IDLE: &FetchStatus = &FetchStatus::Idle;
        self.current().map_or(IDLE, |s| &s.status)
    }

    /// True before the first fetch, false once an empty or last page arrived.
    pub fn has_next_page(&self) -> bool {
        self.current().is_none_or(PageSequence::has_next_page)
    }

    /// Loading the first page of the current term.
    pub fn is_loading(&self) -> bool {
        *self.status() == FetchStatus::Loading && self.pages().is_empty()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status(), FetchStatus::Error(_))
    }

    /// Start fetching the next page of the current term.
    ///
    /// Returns `None` when there is no next page or a request for this term
    /// is already in flight.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        let sequence = self.sequences.entry(self.search.clone()).or_default();
        if sequence.status == FetchStatus::Loading || !sequence.has_next_page() {
            return None;
        }

        sequence.status = FetchStatus::Loading;
        let query = self
            .base
            .clone()
            .with_page(sequence.next_page_number())
            .with_search(self.search.clone());

        Some(PageRequest {
            search: self.search.clone(),
            query,
        })
    }

    /// Record the outcome of a request under the term it was issued for.
    pub fn apply(&mut self, request: PageRequest, result: CmsResult<Page<ContentItem>>) -> CmsResult<()> {
        let stale = request.search != self.search;
        let sequence = self.sequences.entry(request.search).or_default();

        match result {
            Ok(page) => {
                tracing::debug!(
                    kind = %self.kind,
                    page = page.pagination.page,
                    items = page.items.len(),
                    stale,
                    "listing page received"
                );
                sequence.pages.push(page);
                sequence.status = FetchStatus::Success;
                Ok(())
            }
            Err(e) => {
                sequence.status = FetchStatus::Error(e.clone());
                Err(e)
            }
        }
    }

    /// Fetch and append the next page of the current term.
    ///
    /// Returns `Ok(false)` without a request when nothing is left to fetch.
    pub async fn fetch_next_page(&mut self) -> CmsResult<bool> {
        let Some(request) = self.next_request() else {
            return Ok(false);
        };
        let result = self.source.fetch_page(self.kind, request.query()).await;
        self.apply(request, result)?;
        Ok(true)
    }
}
