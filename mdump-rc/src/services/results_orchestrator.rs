//! Results page orchestration
//!
//! Wires the components together: the tracker drives the catalog load on
//! reaching `completed`; a catalog change seeds the render builder and
//! resets the selection to the sentinel; a selection change drives the
//! segment info aggregator and republishes the render scene; the exporter
//! operates independently on the fetched result object.
//!
//! Error model: the first session-status-phase or catalog-phase failure
//! latches a single page-level error state and stops automatic progression;
//! no partial rendering is attempted afterwards. Viewer and structure-fetch
//! failures only log a warning (the panel simply stays on its last scene).

use crate::error::{FetchResult, PageError};
use crate::models::{AnnotationSession, Segment, SegmentInfo, SessionStatus};
use crate::services::backend::{AnnotateBackend, HttpAnnotateClient};
use crate::services::catalog_loader::SegmentCatalogLoader;
use crate::services::exporter::{ExportArtifact, ExportError, ExportFormat, ResultExporter};
use crate::services::render_builder::StructureRenderRequestBuilder;
use crate::services::segment_info::{SegmentInfoAggregator, SelectionOutcome};
use crate::services::session_tracker::SessionTracker;
use crate::services::viewer::{RenderScene, StructureViewer};
use chrono::Utc;
use mdump_common::events::{AnnotateEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;

/// Drives one annotation session's result view from polling to export
pub struct ResultsOrchestrator {
    backend: Arc<dyn AnnotateBackend>,
    viewer: Arc<dyn StructureViewer>,
    event_bus: EventBus,
    session_id: String,
    tracker: SessionTracker,
    catalog_loader: SegmentCatalogLoader,
    aggregator: SegmentInfoAggregator,
    render_builder: StructureRenderRequestBuilder,
    exporter: ResultExporter,
    session: Option<AnnotationSession>,
    catalog: Vec<Segment>,
    selection: Segment,
    error: Option<PageError>,
}

impl ResultsOrchestrator {
    pub fn new(
        backend: Arc<dyn AnnotateBackend>,
        viewer: Arc<dyn StructureViewer>,
        event_bus: EventBus,
        session_id: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        let session_id = session_id.into();
        Self {
            tracker: SessionTracker::new(
                backend.clone(),
                session_id.clone(),
                poll_interval,
                Some(event_bus.clone()),
            ),
            catalog_loader: SegmentCatalogLoader::new(backend.clone(), session_id.clone()),
            aggregator: SegmentInfoAggregator::new(
                backend.clone(),
                session_id.clone(),
                Some(event_bus.clone()),
            ),
            render_builder: StructureRenderRequestBuilder::new(backend.clone(), session_id.clone()),
            exporter: ResultExporter::new(),
            backend,
            viewer,
            event_bus,
            session_id,
            session: None,
            catalog: Vec::new(),
            selection: Segment::Simulation,
            error: None,
        }
    }

    /// Construct against a resolved client configuration, using the HTTP
    /// backend it points at
    pub fn from_config(
        config: &mdump_common::config::ClientConfig,
        viewer: Arc<dyn StructureViewer>,
        event_bus: EventBus,
        session_id: impl Into<String>,
    ) -> FetchResult<Self> {
        let backend = Arc::new(HttpAnnotateClient::new(config.api_base_url.clone())?);
        Ok(Self::new(
            backend,
            viewer,
            event_bus,
            session_id,
            config.poll_interval,
        ))
    }

    /// Track the session to a terminal status and, on completion, load the
    /// catalog and publish the initial whole-system scene
    ///
    /// Idempotent: once the page error is latched or the catalog loaded,
    /// re-running performs no further network requests beyond the tracker's
    /// cached terminal status.
    pub async fn run(&mut self) {
        if self.error.is_some() {
            return;
        }

        let session = match self.tracker.track().await {
            Ok(session) => session,
            Err(e) => {
                self.latch(PageError::Fetch(e));
                return;
            }
        };
        self.session = Some(session.clone());

        match session.status {
            SessionStatus::Failed => {
                let error_text = session
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("Session {} failed", self.session_id));
                self.event_bus
                    .emit(AnnotateEvent::SessionFailed {
                        session_id: self.session_id.clone(),
                        error: session.error.clone(),
                        timestamp: Utc::now(),
                    })
                    .ok();
                self.latch(PageError::SessionFailed(error_text));
            }
            SessionStatus::Completed => match self.catalog_loader.load(&session).await {
                Ok(Some(catalog)) => {
                    self.catalog = catalog;
                    self.selection = Segment::Simulation;
                    self.aggregator.select(&Segment::Simulation).await;
                    self.event_bus
                        .emit(AnnotateEvent::CatalogLoaded {
                            session_id: self.session_id.clone(),
                            segments: self
                                .catalog
                                .iter()
                                .map(|s| s.as_str().to_string())
                                .collect(),
                            timestamp: Utc::now(),
                        })
                        .ok();
                    self.publish_scene().await;
                }
                Ok(None) => {}
                Err(e) => self.latch(PageError::Fetch(e)),
            },
            // track() only returns terminal statuses
            SessionStatus::Pending | SessionStatus::Processing => {}
        }
    }

    /// Change the active selection: join segment metadata and republish the
    /// directive set
    pub async fn select_segment(&mut self, selection: Segment) -> SelectionOutcome {
        if self.error.is_some() {
            return SelectionOutcome::Superseded;
        }

        self.selection = selection.clone();
        let outcome = self.aggregator.select(&selection).await;
        self.publish_scene().await;
        outcome
    }

    /// Export the aggregated result object, restricted to `keys`
    pub async fn export(
        &self,
        keys: Option<&[String]>,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportPhaseError> {
        let payload = self
            .backend
            .results(&self.session_id)
            .await
            .map_err(ExportPhaseError::Fetch)?;
        let artifact = self
            .exporter
            .export(&self.session_id, &payload, keys, format)
            .map_err(ExportPhaseError::Export)?;

        self.event_bus
            .emit(AnnotateEvent::ExportCompleted {
                session_id: self.session_id.clone(),
                file_name: artifact.file_name.clone(),
                timestamp: Utc::now(),
            })
            .ok();
        Ok(artifact)
    }

    /// Fetch the plain-text processing log
    pub async fn fetch_log(&self) -> FetchResult<String> {
        self.backend.log(&self.session_id).await
    }

    async fn publish_scene(&mut self) {
        if self.catalog.iter().all(|s| s.is_sentinel()) {
            return;
        }

        let directives = self
            .render_builder
            .build(&self.catalog, &self.selection)
            .await;

        let structure = match self.backend.system_structure(&self.session_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    session = %self.session_id,
                    error = %e,
                    "Structure fetch failed, keeping previous scene"
                );
                return;
            }
        };

        let scene = RenderScene {
            session_id: self.session_id.clone(),
            structure,
            directives,
        };
        match self.viewer.load_scene(&scene).await {
            Ok(()) => {
                self.event_bus
                    .emit(AnnotateEvent::ScenePublished {
                        session_id: self.session_id.clone(),
                        directive_count: scene.directives.len(),
                        timestamp: Utc::now(),
                    })
                    .ok();
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "Viewer rejected scene");
            }
        }
    }

    fn latch(&mut self, error: PageError) {
        tracing::error!(session = %self.session_id, error = %error, "Page error latched");
        self.error = Some(error);
    }

    /// Latched page error, if any
    pub fn error(&self) -> Option<&PageError> {
        self.error.as_ref()
    }

    /// Terminal session, once tracking finished
    pub fn session(&self) -> Option<&AnnotationSession> {
        self.session.as_ref()
    }

    /// Active segment catalog (empty until completion)
    pub fn catalog(&self) -> &[Segment] {
        &self.catalog
    }

    /// Active selection
    pub fn selection(&self) -> &Segment {
        &self.selection
    }

    /// Metadata panel state for the active selection
    pub fn segment_info(&self) -> SegmentInfo {
        self.aggregator.current()
    }

    /// Inter-poll waits taken by the tracker
    pub fn wait_count(&self) -> u32 {
        self.tracker.wait_count()
    }
}

/// Errors of the export flow (independent of the page error latch)
#[derive(Debug, thiserror::Error)]
pub enum ExportPhaseError {
    #[error(transparent)]
    Fetch(#[from] crate::error::FetchError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
