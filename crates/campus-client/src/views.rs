//! One-shot view counting for detail pages.
//!
//! A detail view reports itself to the CMS once per document. Re-rendering
//! the same document must not count again, so the increment is guarded by a
//! latch tied to the document identifier. Counting is best-effort telemetry:
//! failures are logged at debug level and never retried.

use std::sync::Mutex;

use campus_core::{ContentId, ContentKind};

use crate::repository::ContentSource;

/// Latch that lets one increment through per displayed document.
#[derive(Debug, Default)]
pub struct ViewLatch {
    fired_for: Mutex<Option<(ContentKind, ContentId)>>,
}

impl ViewLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the latch for `id`. Returns true only on the transition from
    /// not-fired to fired.
    ///
    /// Arming for a different document re-arms the latch for that document.
    pub fn arm(&self, kind: ContentKind, id: ContentId) -> bool {
        let mut fired_for = match self.fired_for.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *fired_for == Some((kind, id)) {
            return false;
        }
        *fired_for = Some((kind, id));
        true
    }

    /// Returns true if the latch already fired for this document.
    pub fn has_fired(&self, kind: ContentKind, id: ContentId) -> bool {
        self.fired_for
            .lock()
            .map(|guard| *guard == Some((kind, id)))
            .unwrap_or(false)
    }

    /// Send the increment for `id` unless it was already sent.
    ///
    /// Returns true if a request was sent, whether or not it succeeded.
    pub async fn record<S: ContentSource>(&self, source: &S, kind: ContentKind, id: ContentId) -> bool {
        if !self.arm(kind, id) {
            return false;
        }

        if let Err(e) = source.increment_views(kind, id).await {
            tracing::debug!(%kind, %id, status = e.status, error = %e.message, "view count not recorded");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmsError;
    use crate::testing::MemorySource;

    #[tokio::test]
    async fn fires_once_per_document() {
        let source = MemorySource::default();
        let latch = ViewLatch::new();

        assert!(latch.record(&source, ContentKind::Blog, ContentId(5)).await);
        assert!(!latch.record(&source, ContentKind::Blog, ContentId(5)).await);

        assert_eq!(source.view_calls(), vec![(ContentKind::Blog, ContentId(5))]);
        assert!(latch.has_fired(ContentKind::Blog, ContentId(5)));
    }

    #[tokio::test]
    async fn another_document_rearms() {
        let source = MemorySource::default();
        let latch = ViewLatch::new();

        latch.record(&source, ContentKind::Event, ContentId(1)).await;
        latch.record(&source, ContentKind::Event, ContentId(2)).await;
        latch.record(&source, ContentKind::Event, ContentId(2)).await;

        assert_eq!(source.view_calls().len(), 2);
        assert!(!latch.has_fired(ContentKind::Event, ContentId(1)));
    }

    #[tokio::test]
    async fn failures_are_swallowed_and_not_retried() {
        let source = MemorySource::default();
        source.fail_with(CmsError::transport("offline"));
        let latch = ViewLatch::new();

        assert!(latch.record(&source, ContentKind::CaseStudy, ContentId(9)).await);
        source.recover();
        assert!(!latch.record(&source, ContentKind::CaseStudy, ContentId(9)).await);

        assert_eq!(source.view_calls().len(), 1);
    }

    #[test]
    fn same_id_in_another_kind_is_another_document() {
        let latch = ViewLatch::new();
        assert!(latch.arm(ContentKind::Blog, ContentId(1)));
        assert!(latch.arm(ContentKind::Event, ContentId(1)));
    }
}
