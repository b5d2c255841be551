//! Session status polling state machine
//!
//! Polls `GET /api/annotate/{session}` until the status turns terminal.
//! Polls are strictly sequential: the next request is scheduled only after
//! the previous one resolved and the fixed inter-poll delay elapsed, so at
//! most one request is ever in flight. A transport or protocol failure is
//! surfaced immediately and halts the phase; there is no automatic retry
//! beyond the fixed cadence while the job is non-terminal.

use crate::error::FetchResult;
use crate::models::{AnnotationSession, SessionStatus};
use crate::services::backend::AnnotateBackend;
use chrono::Utc;
use mdump_common::events::{AnnotateEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;

/// Polls one annotation session to its terminal status
pub struct SessionTracker {
    backend: Arc<dyn AnnotateBackend>,
    session_id: String,
    poll_interval: Duration,
    event_bus: Option<EventBus>,
    waits: u32,
    final_session: Option<AnnotationSession>,
}

impl SessionTracker {
    pub fn new(
        backend: Arc<dyn AnnotateBackend>,
        session_id: impl Into<String>,
        poll_interval: Duration,
        event_bus: Option<EventBus>,
    ) -> Self {
        Self {
            backend,
            session_id: session_id.into(),
            poll_interval,
            event_bus,
            waits: 0,
            final_session: None,
        }
    }

    /// Drive the session to a terminal status
    ///
    /// Issues a status request immediately, then while the status stays in
    /// {pending, processing} increments the wait counter, sleeps the poll
    /// interval and issues exactly one further request. Once terminal, the
    /// session is cached and no request is ever issued again for this
    /// tracker instance.
    pub async fn track(&mut self) -> FetchResult<AnnotationSession> {
        if let Some(session) = &self.final_session {
            // Status is monotonic once terminal; serve the cached session
            return Ok(session.clone());
        }

        let mut last_status: Option<SessionStatus> = None;

        loop {
            let session = self.backend.session_status(&self.session_id).await?;

            if last_status != Some(session.status) {
                if let Some(old) = last_status {
                    tracing::info!(
                        session = %self.session_id,
                        old_status = %old,
                        new_status = %session.status,
                        "Session status changed"
                    );
                }
                if let Some(bus) = &self.event_bus {
                    bus.emit(AnnotateEvent::SessionStatusChanged {
                        session_id: self.session_id.clone(),
                        old_status: last_status
                            .map(|s| s.as_str().to_string())
                            .unwrap_or_default(),
                        new_status: session.status.as_str().to_string(),
                        timestamp: Utc::now(),
                    })
                    .ok();
                }
                last_status = Some(session.status);
            }

            if session.status.is_terminal() {
                tracing::info!(
                    session = %self.session_id,
                    status = %session.status,
                    waits = self.waits,
                    "Session reached terminal status"
                );
                self.final_session = Some(session.clone());
                return Ok(session);
            }

            self.waits += 1;
            tracing::debug!(
                session = %self.session_id,
                status = %session.status,
                wait = self.waits,
                "Session not terminal, scheduling next poll"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Number of inter-poll waits taken so far
    pub fn wait_count(&self) -> u32 {
        self.waits
    }

    /// Cached terminal session, if tracking finished
    pub fn final_session(&self) -> Option<&AnnotationSession> {
        self.final_session.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
