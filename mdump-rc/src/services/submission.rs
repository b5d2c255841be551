//! Annotation job submission
//!
//! Uploads the simulation files, records the new session in the local
//! history list and hands the session id back so the caller can start
//! tracking results.

use crate::error::FetchResult;
use crate::models::SessionRecord;
use crate::services::backend::{AnnotateBackend, HttpAnnotateClient, UploadFile};
use crate::services::history::HistoryStore;
use chrono::Utc;
use std::sync::Arc;

/// Suffixes that make a file the title candidate for the history entry
const TITLE_SUFFIXES: [&str; 4] = [".tpr", ".zip", ".tar", ".gz"];

/// Submits annotation jobs and maintains the session history
pub struct SubmissionClient {
    backend: Arc<dyn AnnotateBackend>,
    history: HistoryStore,
}

impl SubmissionClient {
    pub fn new(backend: Arc<dyn AnnotateBackend>, history: HistoryStore) -> Self {
        Self { backend, history }
    }

    /// Construct against a resolved client configuration, using the HTTP
    /// backend and history path it points at
    pub fn from_config(config: &mdump_common::config::ClientConfig) -> FetchResult<Self> {
        let backend = Arc::new(HttpAnnotateClient::new(config.api_base_url.clone())?);
        Ok(Self::new(backend, HistoryStore::new(&config.history_path)))
    }

    /// Upload the files and append a history record
    ///
    /// The submission itself is authoritative; a history write failure is
    /// logged but does not fail the submission.
    pub async fn submit(&self, files: Vec<UploadFile>) -> FetchResult<String> {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let title = derive_title(&names);

        let session_id = self.backend.submit(files).await?;

        let record = SessionRecord {
            id: session_id.clone(),
            title,
            uploaded_files: names,
            date: Utc::now(),
        };
        if let Err(e) = self.history.append(record) {
            tracing::warn!(session = %session_id, error = %e, "History write failed");
        }

        Ok(session_id)
    }

    /// Stored history, newest last
    pub fn history(&self) -> mdump_common::Result<Vec<SessionRecord>> {
        self.history.load()
    }
}

/// Title for a history entry: the first topology-ish file name, else "Untitled"
fn derive_title(names: &[String]) -> String {
    names
        .iter()
        .find(|name| TITLE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
        .cloned()
        .unwrap_or_else(|| "Untitled".to_string())
}
