//! Core view-model types for the campus site.
//!
//! These are the shapes page renderers consume. They are produced by the
//! normalization layer from raw CMS payloads and are never mutated after
//! that: a render reads them, re-shapes them for display and drops them.
//!
//! All types serialize as camelCase JSON so they can be embedded directly
//! in rendered pages and handed back to the client-side listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of items per listing page.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Largest page size the CMS will be asked for.
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Content kinds and identifiers
// ============================================================================

/// The content collections the site renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Blog,
    Event,
    CaseStudy,
}

impl ContentKind {
    /// All kinds, in navigation order.
    pub const ALL: [ContentKind; 3] = [Self::Blog, Self::Event, Self::CaseStudy];

    /// Collection path segment on the CMS (`/api/<collection>`).
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Blog => "blogs",
            Self::Event => "events",
            Self::CaseStudy => "case-studies",
        }
    }

    /// Field used for sorting and date filters.
    pub const fn date_field(self) -> &'static str {
        match self {
            Self::Event => "eventDate",
            Self::Blog | Self::CaseStudy => "publishedAt",
        }
    }

    /// Human label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blog => "Blog",
            Self::Event => "Event",
            Self::CaseStudy => "Case Study",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Error returned when a path segment names no known content kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ContentKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blogs" | "blog" => Ok(Self::Blog),
            "events" | "event" => Ok(Self::Event),
            "case-studies" | "case-study" | "case_studies" | "casestudies" => Ok(Self::CaseStudy),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Numeric identifier assigned by the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl ContentId {
    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// ============================================================================
// Normalized content
// ============================================================================

/// Reference to an image hosted by the CMS asset store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// Absolute URL of the image.
    pub url: String,
    /// Alternative text, if the editor supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Category or tag attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyRef {
    pub id: ContentId,
    pub name: String,
    pub slug: String,
}

/// A blog post, event or case study shaped for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub kind: ContentKind,
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Rich text or markdown body. Listing queries usually omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<ImageRef>,
    /// Publish date for articles, start date for events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub categories: Vec<TaxonomyRef>,
    #[serde(default)]
    pub tags: Vec<TaxonomyRef>,
    #[serde(default)]
    pub views: u64,
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination metadata returned with every listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

impl Pagination {
    /// Stub used when a listing could not be fetched: page 1, nothing in it.
    #[must_use]
    pub const fn empty(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            page_count: 0,
            total: 0,
        }
    }

    /// Derives metadata from a total item count.
    #[must_use]
    pub fn from_total(page: u32, page_size: u32, total: u64) -> Self {
        let size = u64::from(page_size.max(1));
        let page_count = total.div_ceil(size);
        Self {
            page: page.max(1),
            page_size,
            page_count: u32::try_from(page_count).unwrap_or(u32::MAX),
            total,
        }
    }

    /// Returns true if pages remain after this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page < self.page_count
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// An empty page carrying the fail-soft pagination stub.
    #[must_use]
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::empty(page_size),
        }
    }

    /// Returns true if another page should be requested after this one.
    ///
    /// An empty page always ends the sequence, whatever the metadata says.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        !self.items.is_empty() && self.pagination.has_next_page()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Query parameters
// ============================================================================

/// Parameters of a listing request.
///
/// Built from URL search parameters or caller arguments and discarded after
/// the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub exclude: Option<ContentId>,
    /// Only items dated on or after this instant.
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
}

fn default_page() -> u32 {
    1
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: None,
            category: None,
            tag: None,
            exclude: None,
            since: None,
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ListQuery {
    /// First page with the given page size.
    #[must_use]
    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            ..Self::default()
        }
        .normalized()
    }

    /// Same query pointed at another page.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Same query with a search term (blank terms clear it).
    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = clean_term(search);
        self
    }

    /// Clamps page numbers and sizes and drops blank filters.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        self.search = clean_term(self.search);
        self.category = clean_term(self.category);
        self.tag = clean_term(self.tag);
        self
    }

    /// Returns true for the unfiltered first page, the one pages are built on.
    #[must_use]
    pub fn is_first_unfiltered(&self) -> bool {
        self.page == 1
            && self.search.is_none()
            && self.category.is_none()
            && self.tag.is_none()
            && self.exclude.is_none()
            && self.since.is_none()
    }
}

/// Trims a filter value, treating blank strings as unset.
pub fn clean_term(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

// ============================================================================
// Forms
// ============================================================================

/// Forms the site posts back to the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    /// General contact form.
    Contact,
    /// Admissions / programme enquiry.
    Enquiry,
}

impl FormKind {
    /// Collection the submission is stored in.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Contact => "contact-submissions",
            Self::Enquiry => "leads",
        }
    }
}

impl FromStr for FormKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contact" => Ok(Self::Contact),
            "enquiry" | "inquiry" | "lead" | "leads" => Ok(Self::Enquiry),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Fields captured by the contact and enquiry forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Programme the visitor asked about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    /// Page the form was submitted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<String>,
}

/// Reason a form submission was rejected before reaching the CMS.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("full name is required")]
    MissingName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

impl LeadSubmission {
    /// Checks the fields the CMS would reject anyway.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.full_name.trim().is_empty() {
            return Err(SubmissionError::MissingName);
        }

        let email = self.email.trim();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        if !valid {
            return Err(SubmissionError::InvalidEmail(email.to_string()));
        }

        Ok(())
    }
}
