//! campus-core: view models and CMS payload shaping for the campus site.
//!
//! This crate provides:
//! - Normalized content types (blogs, events, case studies) and pagination
//! - The CMS query-string builder
//! - Normalization of raw CMS entities into view models
//! - Asset URL resolution and host allow-listing
//!
//! It performs no I/O; the HTTP side lives in `campus-client`.

pub mod assets;
pub mod normalize;
pub mod query;
pub mod types;

pub use assets::AssetPolicy;
pub use normalize::{
    NormalizeContext, NormalizeError, flatten_entity, normalize_entry, normalize_page,
    normalize_single,
};
pub use query::{build_list_query, build_slug_query, list_query_pairs};
pub use types::{
    ContentId, ContentItem, ContentKind, DEFAULT_PAGE_SIZE, FormKind, ImageRef, LeadSubmission,
    ListQuery, MAX_PAGE_SIZE, Page, Pagination, SubmissionError, TaxonomyRef, UnknownKind,
    clean_term,
};
