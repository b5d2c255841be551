//! Selective export of the aggregated result object
//!
//! Projects the result object onto a caller-chosen subset of its top-level
//! keys (default: all), preserving the source object's key order and leaving
//! the source unmutated, then serializes as JSON or YAML. The artifact name
//! derives from the session id and the export timestamp so every export is
//! uniquely named.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Export serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Yaml,
}

impl ExportFormat {
    /// File extension of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export payload must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Serialization failed: {0}")]
    Serialize(String),
}

/// Finished export artifact
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Unique artifact file name
    pub file_name: String,
    /// Serialized payload restricted to the selected keys
    pub bytes: Vec<u8>,
}

/// Serializes key-filtered projections of the result object
pub struct ResultExporter;

impl ResultExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export with the current timestamp
    pub fn export(
        &self,
        session_id: &str,
        payload: &Value,
        keys: Option<&[String]>,
        format: ExportFormat,
    ) -> Result<ExportArtifact, ExportError> {
        self.export_at(session_id, payload, keys, format, Utc::now())
    }

    /// Export with an explicit timestamp (drives the artifact name)
    pub fn export_at(
        &self,
        session_id: &str,
        payload: &Value,
        keys: Option<&[String]>,
        format: ExportFormat,
        timestamp: DateTime<Utc>,
    ) -> Result<ExportArtifact, ExportError> {
        let source = payload
            .as_object()
            .ok_or_else(|| ExportError::NotAnObject(value_kind(payload).to_string()))?;

        // Source key order is authoritative; the key list only selects
        let filtered: Map<String, Value> = source
            .iter()
            .filter(|(key, _)| keys.map_or(true, |ks| ks.iter().any(|k| k == *key)))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let filtered = Value::Object(filtered);

        let bytes = match format {
            ExportFormat::Json => serde_json::to_vec_pretty(&filtered)
                .map_err(|e| ExportError::Serialize(e.to_string()))?,
            ExportFormat::Yaml => serde_yaml::to_string(&filtered)
                .map_err(|e| ExportError::Serialize(e.to_string()))?
                .into_bytes(),
        };

        let file_name = format!(
            "{}-{}.metadata.{}",
            session_id,
            timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            format.extension()
        );

        tracing::debug!(
            session = %session_id,
            file = %file_name,
            size = bytes.len(),
            "Export artifact built"
        );

        Ok(ExportArtifact { file_name, bytes })
    }
}

impl Default for ResultExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload() -> Value {
        // Key order here is the source order the exporter must preserve
        json!({
            "summary": {"segment_list": ["A", "B"]},
            "x": 1,
            "y": {"nested": true},
            "z": "last"
        })
    }

    #[test]
    fn subset_projection_in_source_order() {
        let exporter = ResultExporter::new();
        let keys = vec!["y".to_string(), "x".to_string()];
        let artifact = exporter
            .export("abc", &payload(), Some(&keys), ExportFormat::Json)
            .unwrap();

        let parsed: Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, json!({"x": 1, "y": {"nested": true}}));

        // Source order (x before y), not selection order
        let parsed_keys: Vec<&String> = parsed.as_object().unwrap().keys().collect();
        assert_eq!(parsed_keys, vec!["x", "y"]);
    }

    #[test]
    fn json_round_trip_is_exact() {
        let exporter = ResultExporter::new();
        let source = payload();
        let artifact = exporter
            .export("abc", &source, None, ExportFormat::Json)
            .unwrap();
        let parsed: Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, source);
    }

    #[test]
    fn source_not_mutated() {
        let exporter = ResultExporter::new();
        let source = payload();
        let before = source.clone();
        let keys = vec!["x".to_string()];
        exporter
            .export("abc", &source, Some(&keys), ExportFormat::Json)
            .unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn yaml_output_parses_back() {
        let exporter = ResultExporter::new();
        let artifact = exporter
            .export("abc", &payload(), None, ExportFormat::Yaml)
            .unwrap();
        assert_eq!(artifact.file_name.rsplit('.').next(), Some("yaml"));
        let parsed: Value = serde_yaml::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed["x"], json!(1));
        assert_eq!(parsed["z"], json!("last"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let exporter = ResultExporter::new();
        let keys = vec!["x".to_string(), "missing".to_string()];
        let artifact = exporter
            .export("abc", &payload(), Some(&keys), ExportFormat::Json)
            .unwrap();
        let parsed: Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed, json!({"x": 1}));
    }

    #[test]
    fn artifact_name_embeds_session_and_timestamp() {
        let exporter = ResultExporter::new();
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let artifact = exporter
            .export_at("abc", &payload(), None, ExportFormat::Json, at)
            .unwrap();
        assert_eq!(artifact.file_name, "abc-20260102T030405.000Z.metadata.json");

        let later = at + chrono::Duration::milliseconds(1);
        let second = exporter
            .export_at("abc", &payload(), None, ExportFormat::Json, later)
            .unwrap();
        assert_ne!(artifact.file_name, second.file_name);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let exporter = ResultExporter::new();
        let result = exporter.export("abc", &json!([1, 2]), None, ExportFormat::Json);
        assert!(matches!(result, Err(ExportError::NotAnObject(_))));
    }
}
