//! Segment catalog loading
//!
//! Fires exactly once per session, iff and when the session status becomes
//! `completed`. It must not fire for a `failed` session, and a fetch failure
//! consumes the single fire: the catalog stays empty and the error surfaces
//! to the page.

use crate::error::FetchResult;
use crate::models::{AnnotationSession, Segment, SessionStatus};
use crate::services::backend::AnnotateBackend;
use std::sync::Arc;

/// One-shot loader of the ordered segment catalog
pub struct SegmentCatalogLoader {
    backend: Arc<dyn AnnotateBackend>,
    session_id: String,
    fired: bool,
}

impl SegmentCatalogLoader {
    pub fn new(backend: Arc<dyn AnnotateBackend>, session_id: impl Into<String>) -> Self {
        Self {
            backend,
            session_id: session_id.into(),
            fired: false,
        }
    }

    /// Load the catalog for a terminal session
    ///
    /// Returns `Ok(None)` when the loader does not fire (status is not
    /// `completed`, or it already fired for this session instance).
    pub async fn load(
        &mut self,
        session: &AnnotationSession,
    ) -> FetchResult<Option<Vec<Segment>>> {
        if session.status != SessionStatus::Completed {
            return Ok(None);
        }
        if self.fired {
            tracing::debug!(session = %self.session_id, "Catalog already loaded, not refetching");
            return Ok(None);
        }
        self.fired = true;

        let ids = self.backend.segment_list(&self.session_id).await?;
        tracing::info!(
            session = %self.session_id,
            segment_count = ids.len(),
            "Segment catalog loaded"
        );

        Ok(Some(ids.iter().map(|id| Segment::parse(id)).collect()))
    }

    /// Whether the one-shot fire was consumed
    pub fn fired(&self) -> bool {
        self.fired
    }
}
