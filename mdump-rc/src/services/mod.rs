//! Orchestration components for the annotation result client

pub mod backend;
pub mod catalog_loader;
pub mod exporter;
pub mod history;
pub mod render_builder;
pub mod results_orchestrator;
pub mod segment_info;
pub mod session_tracker;
pub mod submission;
pub mod viewer;

pub use backend::{AnnotateBackend, HttpAnnotateClient, UploadFile};
pub use catalog_loader::SegmentCatalogLoader;
pub use exporter::{ExportArtifact, ExportError, ExportFormat, ResultExporter};
pub use history::HistoryStore;
pub use render_builder::StructureRenderRequestBuilder;
pub use results_orchestrator::{ExportPhaseError, ResultsOrchestrator};
pub use segment_info::{SegmentInfoAggregator, SelectionOutcome};
pub use session_tracker::SessionTracker;
pub use submission::SubmissionClient;
pub use viewer::{RenderScene, StructureViewer};
