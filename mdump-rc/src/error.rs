//! Error types for the result orchestration client
//!
//! One taxonomy for everything the backend can do to us: transport failure
//! (network unreachable), protocol failure (non-2xx, subclassed), and data
//! failure (malformed or unexpected shape). Partial-aggregation failure is
//! not an error variant; the segment info aggregator absorbs it per-field.

use thiserror::Error;

/// Result type for backend fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Backend fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network unreachable, connection refused, timeout
    #[error("Network error: {0}")]
    Transport(String),

    /// Protocol failure: 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Protocol failure: results requested before the job produced them (409/425)
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Protocol failure: 5xx
    #[error("Server error {0}: {1}")]
    Server(u16, String),

    /// Protocol failure: any other non-2xx status
    #[error("Unexpected status {0}: {1}")]
    Status(u16, String),

    /// Response arrived but could not be decoded into the expected shape
    #[error("Malformed response: {0}")]
    Data(String),
}

impl FetchError {
    /// Classify a non-2xx response status
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            404 => FetchError::NotFound(detail),
            409 | 425 => FetchError::NotReady(detail),
            500..=599 => FetchError::Server(status, detail),
            _ => FetchError::Status(status, detail),
        }
    }
}

/// Page-level error state
///
/// The first session-status-phase or catalog-phase failure latches one of
/// these; the page shows the error view and no partial rendering happens
/// afterwards.
#[derive(Debug, Error)]
pub enum PageError {
    /// The annotation job itself reported failure
    #[error("Session failed: {0}")]
    SessionFailed(String),

    /// A phase-driving fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            FetchError::from_status(404, String::new()),
            FetchError::NotFound(_)
        ));
        assert!(matches!(
            FetchError::from_status(409, String::new()),
            FetchError::NotReady(_)
        ));
        assert!(matches!(
            FetchError::from_status(425, String::new()),
            FetchError::NotReady(_)
        ));
        assert!(matches!(
            FetchError::from_status(503, String::new()),
            FetchError::Server(503, _)
        ));
        assert!(matches!(
            FetchError::from_status(401, String::new()),
            FetchError::Status(401, _)
        ));
    }
}
