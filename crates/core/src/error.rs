//! Unified error types for crosswiki.
//!
//! Every variant displays with an upper-case code prefix so callers and
//! logs can match on it without inspecting the variant.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for crosswiki.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty content).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Page url is not a rooted path.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// No page stored under the given url.
    #[error("PAGE_NOT_FOUND: {0}")]
    PageNotFound(String),

    /// The page is locked against edits.
    #[error("PAGE_LOCKED: {0}")]
    PageLocked(String),

    /// The page changed since the editor read it.
    #[error("CONFLICT: {url} was modified (expected {expected}, found {actual})")]
    Conflict { url: String, expected: String, actual: String },

    /// A storage operation ran past its deadline and was rolled back.
    #[error("STORE_TIMEOUT: {0}")]
    Timeout(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32602, format!("invalid page url: {msg}")),
            Error::PageNotFound(url) => (-32001, format!("page not found: {url}")),
            Error::PageLocked(url) => (-32003, format!("page is locked: {url}")),
            Error::Conflict { .. } => (-32004, err.to_string()),
            Error::Timeout(msg) => (-32005, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound("/missing".to_string());
        assert!(err.to_string().contains("PAGE_NOT_FOUND"));
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn test_conflict_display() {
        let err = Error::Conflict { url: "/a".into(), expected: "t1".into(), actual: "t2".into() };
        let msg = err.to_string();
        assert!(msg.starts_with("CONFLICT"));
        assert!(msg.contains("t1") && msg.contains("t2"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::PageNotFound("/missing".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);
    }

    #[test]
    fn test_rusqlite_error_is_database() {
        let err: Error = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
