use thiserror::Error;

use crate::cache::FetchError;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Load cancelled")]
    Aborted,

    #[error("Failed to load dashboard (HTTP {status})")]
    Status { status: u16, body: String },

    #[error("Failed to parse dashboard: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to load dashboard: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid dashboard URL: {0}")]
    InvalidUrl(String),
}

/// Maximum length for error response bodies kept in errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl LoadError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        LoadError::Status {
            status,
            body: Self::truncate_body(body),
        }
    }

    /// True when the load was cancelled rather than failed.
    pub fn is_abort(&self) -> bool {
        matches!(self, LoadError::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_message() {
        let err = LoadError::from_status(503, "upstream down");
        assert_eq!(err.to_string(), "Failed to load dashboard (HTTP 503)");
        assert!(!err.is_abort());
    }

    #[test]
    fn test_from_status_truncates_body() {
        let body = "é".repeat(400);
        match LoadError::from_status(500, &body) {
            LoadError::Status { body: kept, .. } => {
                assert!(kept.contains("truncated, 800 total bytes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_aborted_is_abort() {
        assert!(LoadError::Aborted.is_abort());
        assert_eq!(LoadError::Aborted.to_string(), "Load cancelled");
    }
}
