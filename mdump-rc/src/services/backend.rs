//! Annotation backend API client
//!
//! `AnnotateBackend` is the injected seam between the orchestration
//! components and the HTTP backend; tests script it, production code uses
//! [`HttpAnnotateClient`] over reqwest.

use crate::error::{FetchError, FetchResult};
use crate::models::{AnnotationSession, SegmentField};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

const USER_AGENT: &str = "mdump/0.1.0 (https://github.com/mdump/mdump)";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One file to upload to the submission endpoint
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Original file name (the backend keys processed files off it)
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Backend interface consumed by the orchestration components
///
/// Every method is a suspension point; implementations must not retry on
/// their own, classification and retry policy belong to the callers.
#[async_trait]
pub trait AnnotateBackend: Send + Sync {
    /// POST the uploaded files, returning the new session id
    async fn submit(&self, files: Vec<UploadFile>) -> FetchResult<String>;

    /// Fetch the session status object
    async fn session_status(&self, session: &str) -> FetchResult<AnnotationSession>;

    /// Fetch the whole aggregated result object
    async fn results(&self, session: &str) -> FetchResult<serde_json::Value>;

    /// Fetch the ordered segment id list
    async fn segment_list(&self, session: &str) -> FetchResult<Vec<String>>;

    /// Fetch one scalar metadata field of one segment
    async fn segment_field(
        &self,
        session: &str,
        segment: &str,
        field: SegmentField,
    ) -> FetchResult<serde_json::Value>;

    /// Fetch the biomolecule type of one segment (small controlled vocabulary)
    async fn segment_type(&self, session: &str, segment: &str) -> FetchResult<String>;

    /// Fetch whole-system structural-file bytes for the visualization
    /// collaborator
    async fn system_structure(&self, session: &str) -> FetchResult<Vec<u8>>;

    /// Fetch the plain-text processing log
    async fn log(&self, session: &str) -> FetchResult<String>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    uuid: String,
}

/// HTTP implementation of [`AnnotateBackend`]
pub struct HttpAnnotateClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAnnotateClient {
    /// Create a client against the given base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/annotate{}", self.base_url, path)
    }

    /// GET a URL, classify non-2xx, decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let response = self.get_checked(url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Data(e.to_string()))
    }

    async fn get_checked(&self, url: &str) -> FetchResult<reqwest::Response> {
        tracing::debug!(url = %url, "Querying annotation backend");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.is_empty() {
                url.to_string()
            } else {
                detail
            };
            return Err(FetchError::from_status(status.as_u16(), detail));
        }

        Ok(response)
    }
}

#[async_trait]
impl AnnotateBackend for HttpAnnotateClient {
    async fn submit(&self, files: Vec<UploadFile>) -> FetchResult<String> {
        let url = self.url("");
        tracing::debug!(url = %url, file_count = files.len(), "Submitting annotation job");

        let mut form = reqwest::multipart::Form::new();
        for (index, file) in files.into_iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.name);
            form = form.part(format!("file-{}", index), part);
        }

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), detail));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Data(e.to_string()))?;

        // The backend mints session ids as UUIDv4; anything else means we
        // decoded the wrong response
        let session = Uuid::parse_str(&submitted.uuid)
            .map_err(|e| FetchError::Data(format!("Non-UUID session id: {}", e)))?;

        tracing::info!(session = %session, "Annotation job submitted");
        Ok(session.to_string())
    }

    async fn session_status(&self, session: &str) -> FetchResult<AnnotationSession> {
        self.get_json(&self.url(&format!("/{}", session))).await
    }

    async fn results(&self, session: &str) -> FetchResult<serde_json::Value> {
        self.get_json(&self.url(&format!("/{}/results", session)))
            .await
    }

    async fn segment_list(&self, session: &str) -> FetchResult<Vec<String>> {
        self.get_json(&self.url(&format!("/{}/results/segments", session)))
            .await
    }

    async fn segment_field(
        &self,
        session: &str,
        segment: &str,
        field: SegmentField,
    ) -> FetchResult<serde_json::Value> {
        self.get_json(&self.url(&format!(
            "/{}/results/segment/{}/{}",
            session, segment, field
        )))
        .await
    }

    async fn segment_type(&self, session: &str, segment: &str) -> FetchResult<String> {
        // The backend returns a JSON-quoted string from a small vocabulary
        // (protein, nucleic, lipid, carbohydrate, atom, unknown)
        self.get_json(&self.url(&format!("/{}/results/segment/{}/type", session, segment)))
            .await
    }

    async fn system_structure(&self, session: &str) -> FetchResult<Vec<u8>> {
        // The whole system is keyed as the pseudo-segment "system"
        let url = self.url(&format!("/{}/results/system/system", session));
        let response = self.get_checked(&url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn log(&self, session: &str) -> FetchResult<String> {
        let url = self.url(&format!("/{}/log", session));
        let response = self.get_checked(&url).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}
