//! View counting endpoint.
//!
//! - POST /api/content/{kind}/{id}/views - Count one view of an item
//!
//! Counting is best-effort: the endpoint answers 202 whether or not the CMS
//! accepted the increment. De-duplication per visitor happens on the
//! rendering side through `ViewLatch`.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::post,
};

use campus_core::{ContentId, ContentKind};

use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/content/{kind}/{id}/views - Increment the view counter.
///
/// # Response
///
/// - 202 Accepted: Always, once the kind is known
/// - 404 Not Found: Unknown content kind
async fn record_view(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> ApiResult<StatusCode> {
    let kind: ContentKind = kind.parse()?;
    let id = ContentId(id);

    if let Err(e) = state.client().increment_view_count(kind, id).await {
        tracing::debug!(%kind, %id, status = e.status, error = %e.message, "view count not recorded");
    }
    Ok(StatusCode::ACCEPTED)
}

/// Build view counting routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/content/{kind}/{id}/views", post(record_view))
}
