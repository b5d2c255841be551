//! Per-segment metadata fan-out/fan-in
//!
//! On every change of the active selection to a concrete segment, four
//! field requests (name, confidence, db_crosslink, identifier) race
//! concurrently; the join commits one `SegmentInfo` only once all four have
//! resolved or failed. A failed field degrades to null without failing the
//! others. Staleness guard: each selection bumps a generation counter, and
//! a join commits only if the counter is still the one captured at
//! selection time, so the last selection wins. In-flight requests are never
//! aborted at the transport level, merely ignored at commit time.

use crate::error::FetchResult;
use crate::models::{Segment, SegmentField, SegmentInfo};
use crate::services::backend::AnnotateBackend;
use chrono::Utc;
use mdump_common::events::{AnnotateEvent, EventBus};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Result of a selection change
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// The join finished while still current and its info was committed
    Committed(SegmentInfo),
    /// Sentinel selection: info reset to all-null synchronously, no network
    Cleared,
    /// A newer selection arrived before this join resolved; result discarded
    Superseded,
}

/// Fans out the four metadata fetches for the active selection
pub struct SegmentInfoAggregator {
    backend: Arc<dyn AnnotateBackend>,
    session_id: String,
    event_bus: Option<EventBus>,
    // Per-selection generation token, compared (not locked) at each
    // asynchronous completion
    generation: AtomicU64,
    current: Mutex<SegmentInfo>,
}

impl SegmentInfoAggregator {
    pub fn new(
        backend: Arc<dyn AnnotateBackend>,
        session_id: impl Into<String>,
        event_bus: Option<EventBus>,
    ) -> Self {
        Self {
            backend,
            session_id: session_id.into(),
            event_bus,
            generation: AtomicU64::new(0),
            current: Mutex::new(SegmentInfo::empty()),
        }
    }

    /// Change the active selection and (for concrete segments) join the
    /// four-field fan-out
    pub async fn select(&self, selection: &Segment) -> SelectionOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if selection.is_sentinel() {
            *self.current.lock().unwrap() = SegmentInfo::empty();
            tracing::debug!(session = %self.session_id, "Whole-system selection, info reset");
            return SelectionOutcome::Cleared;
        }

        let segment = selection.as_str();
        tracing::debug!(
            session = %self.session_id,
            segment = %segment,
            generation = token,
            "Fanning out segment metadata fetches"
        );

        let (name, confidence, db_crosslink, identifier) = tokio::join!(
            self.fetch(segment, SegmentField::Name),
            self.fetch(segment, SegmentField::Confidence),
            self.fetch(segment, SegmentField::DbCrosslink),
            self.fetch(segment, SegmentField::Identifier),
        );

        let info = SegmentInfo {
            name: string_field(name, segment, SegmentField::Name),
            confidence: confidence_field(confidence, segment),
            db_crosslink: string_field(db_crosslink, segment, SegmentField::DbCrosslink),
            identifier: string_field(identifier, segment, SegmentField::Identifier),
        };

        if self.generation.load(Ordering::SeqCst) != token {
            tracing::debug!(
                session = %self.session_id,
                segment = %segment,
                generation = token,
                "Selection changed while joining, discarding stale segment info"
            );
            return SelectionOutcome::Superseded;
        }

        *self.current.lock().unwrap() = info.clone();
        if let Some(bus) = &self.event_bus {
            bus.emit(AnnotateEvent::SegmentInfoCommitted {
                session_id: self.session_id.clone(),
                segment: segment.to_string(),
                timestamp: Utc::now(),
            })
            .ok();
        }
        SelectionOutcome::Committed(info)
    }

    /// Last committed info (all-null after a sentinel selection)
    pub fn current(&self) -> SegmentInfo {
        self.current.lock().unwrap().clone()
    }

    async fn fetch(&self, segment: &str, field: SegmentField) -> FetchResult<serde_json::Value> {
        self.backend
            .segment_field(&self.session_id, segment, field)
            .await
    }
}

/// Degrade a string-valued field fetch to `None` on failure or shape mismatch
fn string_field(
    result: FetchResult<serde_json::Value>,
    segment: &str,
    field: SegmentField,
) -> Option<String> {
    match result {
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(serde_json::Value::Null) => None,
        Ok(other) => {
            tracing::warn!(segment = %segment, field = %field, value = %other, "Unexpected field shape");
            None
        }
        Err(e) => {
            tracing::warn!(segment = %segment, field = %field, error = %e, "Field fetch failed");
            None
        }
    }
}

/// Degrade the confidence field, additionally rejecting values outside [0, 1]
fn confidence_field(result: FetchResult<serde_json::Value>, segment: &str) -> Option<f64> {
    match result {
        Ok(value) => match value.as_f64() {
            Some(c) if (0.0..=1.0).contains(&c) => Some(c),
            Some(c) => {
                tracing::warn!(segment = %segment, confidence = c, "Confidence out of range");
                None
            }
            None => {
                if !value.is_null() {
                    tracing::warn!(segment = %segment, value = %value, "Unexpected confidence shape");
                }
                None
            }
        },
        Err(e) => {
            tracing::warn!(segment = %segment, error = %e, "Confidence fetch failed");
            None
        }
    }
}
