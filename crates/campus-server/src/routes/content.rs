//! Content listing and detail endpoints.
//!
//! - GET /api/content/{kind} - One listing page, never failing
//! - GET /api/content/{kind}/recent - Latest items, minus the displayed one
//! - GET /api/content/{kind}/{slug} - One item
//!
//! `{kind}` is a collection path (`blogs`, `events`, `case-studies`) or its
//! singular form.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use campus_core::{ContentId, ContentItem, ContentKind, ListQuery, Page, Pagination};

use crate::error::{ApiError, ApiResult};
use crate::extract::QueryParams;
use crate::listing::cached_listing;
use crate::state::AppState;

/// Number of items returned by the recent endpoint when no limit is given.
pub const DEFAULT_RECENT_LIMIT: u32 = 3;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the recent endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    /// Item to leave out, usually the one being displayed.
    #[serde(default)]
    pub exclude: Option<ContentId>,

    /// Maximum number of items (default: 3).
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Response for listing endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub items: Vec<ContentItem>,
    pub pagination: Pagination,
    pub has_next_page: bool,
}

impl From<Page<ContentItem>> for ListingResponse {
    fn from(page: Page<ContentItem>) -> Self {
        Self {
            has_next_page: page.has_next_page(),
            items: page.items,
            pagination: page.pagination,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/content/{kind} - One page of a listing.
///
/// # Query Parameters
///
/// - `page`, `pageSize`: Pagination (defaults: 1, 9)
/// - `search`: Case-insensitive match on title and summary
/// - `category`, `tag`: Taxonomy slugs
/// - `exclude`: Item id to leave out
///
/// # Response
///
/// - 200 OK: ListingResponse; empty when the CMS is unavailable
/// - 400 Bad Request: Unparseable query parameters
/// - 404 Not Found: Unknown content kind
async fn list_content(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<ListingResponse>> {
    let kind: ContentKind = kind.parse()?;
    let page = cached_listing(&state, kind, query).await;
    Ok(Json(page.into()))
}

/// GET /api/content/{kind}/recent - Latest items for "read next" sections.
async fn recent_content(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    QueryParams(params): QueryParams<RecentParams>,
) -> ApiResult<Json<ListingResponse>> {
    let kind: ContentKind = kind.parse()?;
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let page = state.repository().recent(kind, params.exclude, limit).await;
    Ok(Json(page.into()))
}

/// GET /api/content/{kind}/{slug} - One item by slug.
///
/// # Response
///
/// - 200 OK: The normalized item
/// - 404 Not Found: Unknown kind or no item with this slug
/// - CMS status: The CMS failed; body carries its message
async fn content_detail(
    State(state): State<AppState>,
    Path((kind, slug)): Path<(String, String)>,
) -> ApiResult<Json<ContentItem>> {
    let kind: ContentKind = kind.parse()?;

    match state.repository().detail(kind, &slug).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(ApiError::NotFound(format!("{} {} not found", kind.label(), slug))),
        Err(e) => {
            tracing::error!(%kind, %slug, status = e.status, error = %e.message, "detail lookup failed");
            Err(ApiError::Cms(e))
        }
    }
}

/// Build content routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/content/{kind}", get(list_content))
        .route("/api/content/{kind}/recent", get(recent_content))
        .route("/api/content/{kind}/{slug}", get(content_detail))
}
