//! Annotation session status model
//!
//! A session is one annotation job instance, created by the submission
//! endpoint and referenced by id only. Its status is monotonic: once
//! `completed` or `failed` is observed the tracker never polls it again.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Backend-reported session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Queued, not yet picked up by a worker
    Pending,
    /// Annotation computation running
    Processing,
    /// Results available
    Completed,
    /// Annotation computation failed
    // Older backend revisions reported "error" instead of "failed"
    #[serde(alias = "error")]
    Failed,
}

impl SessionStatus {
    /// Whether this status is terminal (no further polls allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Processing => "processing",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session status object as returned by `GET /api/annotate/{session}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSession {
    /// Session identifier
    pub uuid: String,

    /// Current lifecycle status
    pub status: SessionStatus,

    /// Filetype → filename mapping of the processed inputs
    #[serde(default)]
    pub processed_files: HashMap<String, String>,

    /// Creation timestamp (RFC 3339, as the backend sends it)
    #[serde(default)]
    pub created: String,

    /// Server-side expiry timestamp (RFC 3339)
    #[serde(default)]
    pub expires: String,

    /// Opaque submission options
    #[serde(default)]
    pub options: serde_json::Value,

    /// Error text, present when status is failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Backend stack trace, present on some failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}
