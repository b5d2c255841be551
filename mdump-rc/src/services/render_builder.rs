//! Render directive construction
//!
//! On any change to the catalog or the active selection, builds exactly one
//! directive per concrete catalog segment: cartoon for protein segments,
//! ball_and_stick otherwise, full opacity for the active selection (or for
//! every segment in the whole-system view) and 0.05 for the rest. A failed
//! type query defaults that segment to non-protein without aborting the
//! remaining segments.

use crate::models::{RenderDirective, Representation, Segment};
use crate::services::backend::AnnotateBackend;
use futures::future::join_all;
use std::sync::Arc;

const DIMMED_OPACITY: f64 = 0.05;

/// Builds the per-segment directive set for the external viewer
pub struct StructureRenderRequestBuilder {
    backend: Arc<dyn AnnotateBackend>,
    session_id: String,
}

impl StructureRenderRequestBuilder {
    pub fn new(backend: Arc<dyn AnnotateBackend>, session_id: impl Into<String>) -> Self {
        Self {
            backend,
            session_id: session_id.into(),
        }
    }

    /// Build one directive per concrete catalog segment, in catalog order
    ///
    /// The sentinel is a selection value, not a renderable segment; catalog
    /// entries equal to it are skipped.
    pub async fn build(&self, catalog: &[Segment], selection: &Segment) -> Vec<RenderDirective> {
        let lookups = catalog
            .iter()
            .filter(|segment| !segment.is_sentinel())
            .map(|segment| self.classify(segment));

        // join_all keeps catalog order regardless of completion order
        let classified = join_all(lookups).await;

        classified
            .into_iter()
            .map(|(segment, is_protein)| RenderDirective {
                segment: segment.as_str().to_string(),
                representation: if is_protein {
                    Representation::Cartoon
                } else {
                    Representation::BallAndStick
                },
                opacity: if selection.is_sentinel() || segment == selection {
                    1.0
                } else {
                    DIMMED_OPACITY
                },
            })
            .collect()
    }

    async fn classify<'a>(&self, segment: &'a Segment) -> (&'a Segment, bool) {
        let is_protein = match self
            .backend
            .segment_type(&self.session_id, segment.as_str())
            .await
        {
            Ok(raw) => is_protein_type(&raw),
            Err(e) => {
                tracing::warn!(
                    session = %self.session_id,
                    segment = %segment,
                    error = %e,
                    "Type query failed, defaulting to non-protein"
                );
                false
            }
        };
        (segment, is_protein)
    }
}

/// Whether a raw type response names a protein
///
/// Tolerates a still-quoted JSON string and case differences.
pub fn is_protein_type(raw: &str) -> bool {
    raw.trim().trim_matches('"').eq_ignore_ascii_case("protein")
}
