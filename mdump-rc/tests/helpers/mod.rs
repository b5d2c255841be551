//! Test helper utilities
//!
//! Shared scripted backend and recording viewer for the orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mdump_rc::models::{AnnotationSession, SegmentField, SessionStatus};
use mdump_rc::services::{AnnotateBackend, RenderScene, StructureViewer, UploadFile};
use mdump_rc::{FetchError, FetchResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory scripted implementation of the annotation backend
///
/// Statuses are consumed in script order, the last one repeating. Counters
/// and recorded poll instants let tests assert on request cadence.
pub struct ScriptedBackend {
    session_id: String,
    statuses: Vec<SessionStatus>,
    status_index: AtomicUsize,
    status_requests: AtomicUsize,
    status_error: Option<(u16, String)>,
    poll_instants: Mutex<Vec<tokio::time::Instant>>,
    error_text: Option<String>,
    segments: Vec<String>,
    segment_list_requests: AtomicUsize,
    fields: HashMap<(String, String), serde_json::Value>,
    failing_fields: HashSet<(String, String)>,
    field_delays: HashMap<String, Duration>,
    field_requests: AtomicUsize,
    types: HashMap<String, String>,
    failing_types: HashSet<String>,
    results: serde_json::Value,
    structure_requests: AtomicUsize,
    submitted_files: Mutex<Vec<Vec<String>>>,
}

impl ScriptedBackend {
    pub fn new(session_id: &str, statuses: Vec<SessionStatus>) -> Self {
        Self {
            session_id: session_id.to_string(),
            statuses,
            status_index: AtomicUsize::new(0),
            status_requests: AtomicUsize::new(0),
            status_error: None,
            poll_instants: Mutex::new(Vec::new()),
            error_text: None,
            segments: Vec::new(),
            segment_list_requests: AtomicUsize::new(0),
            fields: HashMap::new(),
            failing_fields: HashSet::new(),
            field_delays: HashMap::new(),
            field_requests: AtomicUsize::new(0),
            types: HashMap::new(),
            failing_types: HashSet::new(),
            results: serde_json::json!({}),
            structure_requests: AtomicUsize::new(0),
            submitted_files: Mutex::new(Vec::new()),
        }
    }

    pub fn with_error_text(mut self, text: &str) -> Self {
        self.error_text = Some(text.to_string());
        self
    }

    pub fn with_segments(mut self, segments: &[&str]) -> Self {
        self.segments = segments.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_field(mut self, segment: &str, field: &str, value: serde_json::Value) -> Self {
        self.fields
            .insert((segment.to_string(), field.to_string()), value);
        self
    }

    /// All four fields of one segment in one call
    pub fn with_segment_info(
        self,
        segment: &str,
        name: &str,
        confidence: f64,
        db_crosslink: &str,
        identifier: &str,
    ) -> Self {
        self.with_field(segment, "name", serde_json::json!(name))
            .with_field(segment, "confidence", serde_json::json!(confidence))
            .with_field(segment, "db_crosslink", serde_json::json!(db_crosslink))
            .with_field(segment, "identifier", serde_json::json!(identifier))
    }

    pub fn with_failing_field(mut self, segment: &str, field: &str) -> Self {
        self.failing_fields
            .insert((segment.to_string(), field.to_string()));
        self
    }

    /// Delay every field fetch of one segment (staleness race scripting)
    pub fn with_field_delay(mut self, segment: &str, delay: Duration) -> Self {
        self.field_delays.insert(segment.to_string(), delay);
        self
    }

    pub fn with_type(mut self, segment: &str, biomolecule_type: &str) -> Self {
        self.types
            .insert(segment.to_string(), biomolecule_type.to_string());
        self
    }

    pub fn with_failing_type(mut self, segment: &str) -> Self {
        self.failing_types.insert(segment.to_string());
        self
    }

    pub fn with_status_error(mut self, status: u16) -> Self {
        self.status_error = Some((status, "scripted failure".to_string()));
        self
    }

    pub fn with_results(mut self, results: serde_json::Value) -> Self {
        self.results = results;
        self
    }

    pub fn status_request_count(&self) -> usize {
        self.status_requests.load(Ordering::SeqCst)
    }

    pub fn segment_list_request_count(&self) -> usize {
        self.segment_list_requests.load(Ordering::SeqCst)
    }

    pub fn field_request_count(&self) -> usize {
        self.field_requests.load(Ordering::SeqCst)
    }

    pub fn structure_request_count(&self) -> usize {
        self.structure_requests.load(Ordering::SeqCst)
    }

    pub fn poll_instants(&self) -> Vec<tokio::time::Instant> {
        self.poll_instants.lock().unwrap().clone()
    }

    pub fn submitted_files(&self) -> Vec<Vec<String>> {
        self.submitted_files.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnnotateBackend for ScriptedBackend {
    async fn submit(&self, files: Vec<UploadFile>) -> FetchResult<String> {
        self.submitted_files
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());
        Ok(self.session_id.clone())
    }

    async fn session_status(&self, session: &str) -> FetchResult<AnnotationSession> {
        self.status_requests.fetch_add(1, Ordering::SeqCst);
        self.poll_instants
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        if let Some((status, detail)) = &self.status_error {
            return Err(FetchError::from_status(*status, detail.clone()));
        }

        let index = self
            .status_index
            .fetch_add(1, Ordering::SeqCst)
            .min(self.statuses.len() - 1);
        let status = self.statuses[index];

        Ok(AnnotationSession {
            uuid: session.to_string(),
            status,
            processed_files: HashMap::new(),
            created: String::new(),
            expires: String::new(),
            options: serde_json::json!({}),
            error: if status == SessionStatus::Failed {
                self.error_text.clone()
            } else {
                None
            },
            trace: None,
        })
    }

    async fn results(&self, _session: &str) -> FetchResult<serde_json::Value> {
        Ok(self.results.clone())
    }

    async fn segment_list(&self, _session: &str) -> FetchResult<Vec<String>> {
        self.segment_list_requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.segments.clone())
    }

    async fn segment_field(
        &self,
        _session: &str,
        segment: &str,
        field: SegmentField,
    ) -> FetchResult<serde_json::Value> {
        self.field_requests.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.field_delays.get(segment) {
            tokio::time::sleep(*delay).await;
        }

        let key = (segment.to_string(), field.as_str().to_string());
        if self.failing_fields.contains(&key) {
            return Err(FetchError::Server(500, format!("{}/{}", segment, field)));
        }

        Ok(self
            .fields
            .get(&key)
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn segment_type(&self, _session: &str, segment: &str) -> FetchResult<String> {
        if self.failing_types.contains(segment) {
            return Err(FetchError::NotFound(segment.to_string()));
        }
        Ok(self
            .types
            .get(segment)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string()))
    }

    async fn system_structure(&self, _session: &str) -> FetchResult<Vec<u8>> {
        self.structure_requests.fetch_add(1, Ordering::SeqCst);
        Ok(b"data_system_mmcif".to_vec())
    }

    async fn log(&self, _session: &str) -> FetchResult<String> {
        Ok("annotation log".to_string())
    }
}

/// Route test log output through the capturing test writer
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init()
        .ok();
}

/// Viewer stub that records every scene it receives
#[derive(Default)]
pub struct RecordingViewer {
    scenes: Mutex<Vec<RenderScene>>,
}

impl RecordingViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes(&self) -> Vec<RenderScene> {
        self.scenes.lock().unwrap().clone()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.lock().unwrap().len()
    }
}

#[async_trait]
impl StructureViewer for RecordingViewer {
    async fn load_scene(&self, scene: &RenderScene) -> anyhow::Result<()> {
        self.scenes.lock().unwrap().push(scene.clone());
        Ok(())
    }
}
