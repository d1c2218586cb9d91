//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions.

use fractal_history_core::CoreError;
use fractal_history_llm::LlmError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing identifiers or an unsupported axis
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced anchor or position does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The completion call failed or timed out
    #[error("Upstream service error: {0}")]
    Upstream(#[from] LlmError),

    /// The model response matched neither grammar. `raw` keeps the offending text.
    #[error("Parse error: {reason}")]
    Parse { reason: String, raw: String },

    /// Uniqueness conflicts and other constraint violations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite errors (auto-converted from rusqlite::Error)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a parse error carrying the raw model output
    pub fn parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Short machine-readable category for callers.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Upstream(_) => "upstream",
            AppError::Parse { .. } => "parse",
            AppError::Storage(_) | AppError::Database(_) | AppError::Sqlite(_) => "storage",
            AppError::Config(_) => "config",
            AppError::Io(_) | AppError::Serialization(_) | AppError::Internal(_) => "internal",
        }
    }

    /// Whether this is a uniqueness or other constraint violation raised by SQLite.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            AppError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => {
                e.code == rusqlite::ErrorCode::ConstraintViolation
            }
            AppError::Storage(_) => true,
            _ => false,
        }
    }

    /// Whether this is a PRIMARY KEY conflict (a reused identifier).
    pub fn is_primary_key_conflict(&self) -> bool {
        matches!(
            self,
            AppError::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }

    /// The raw model output attached to a parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AppError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            CoreError::Parse(msg) => AppError::Parse {
                reason: msg,
                raw: String::new(),
            },
            CoreError::Serialization(e) => AppError::Serialization(e),
            CoreError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Convert AppError to a string suitable for command responses
impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::database("connection failed");
        assert_eq!(err.to_string(), "Database error: connection failed");
    }

    #[test]
    fn test_error_conversion() {
        let err = AppError::config("invalid setting");
        let msg: String = err.into();
        assert!(msg.contains("Configuration error"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(AppError::validation("x").category(), "validation");
        assert_eq!(AppError::not_found("x").category(), "not_found");
        assert_eq!(AppError::parse("x", "raw").category(), "parse");
        assert_eq!(AppError::storage("x").category(), "storage");
        let upstream: AppError = LlmError::NetworkError {
            message: "timed out".to_string(),
        }
        .into();
        assert_eq!(upstream.category(), "upstream");
        assert!(upstream.to_string().contains("timed out"));
    }

    #[test]
    fn test_parse_error_keeps_raw_text() {
        let err = AppError::parse("no anchors recovered", "### STEP 3: FINAL SELECTION\n");
        assert_eq!(err.raw_response(), Some("### STEP 3: FINAL SELECTION\n"));
        assert_eq!(err.to_string(), "Parse error: no anchors recovered");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: AppError = CoreError::validation("Unknown breadth 'D'").into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = CoreError::not_found("anchor").into();
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn test_constraint_violation_detection() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id TEXT PRIMARY KEY)", []).unwrap();
        conn.execute("INSERT INTO t (id) VALUES ('a')", []).unwrap();
        let err: AppError = conn
            .execute("INSERT INTO t (id) VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(err.is_constraint_violation());
        assert!(err.is_primary_key_conflict());
        assert_eq!(err.category(), "storage");
    }

    #[test]
    fn test_unique_conflict_is_not_primary_key_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (id TEXT PRIMARY KEY, slot INTEGER UNIQUE)", [])
            .unwrap();
        conn.execute("INSERT INTO t (id, slot) VALUES ('a', 1)", [])
            .unwrap();
        let err: AppError = conn
            .execute("INSERT INTO t (id, slot) VALUES ('b', 1)", [])
            .unwrap_err()
            .into();
        assert!(err.is_constraint_violation());
        assert!(!err.is_primary_key_conflict());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }
}
