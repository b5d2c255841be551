//! Local session history record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the client-side session history list
///
/// Appended on every successful submission; never deduplicated and never
/// expired client-side (the server expires sessions independently).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier returned by the submission endpoint
    pub id: String,
    /// Display title derived from the uploaded files
    pub title: String,
    /// Names of the files that were uploaded
    pub uploaded_files: Vec<String>,
    /// Submission time
    pub date: DateTime<Utc>,
}
