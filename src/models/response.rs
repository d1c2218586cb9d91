//! Response Types
//!
//! Standard response types for all caller-facing commands.

use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

/// Generic command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Machine-readable error category ("validation", "parse", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<String>,
    /// Model text that could not be parsed, kept for diagnosing prompt drift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl<T> CommandResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_category: None,
            raw_response: None,
        }
    }

    /// Create an error response with message
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_category: None,
            raw_response: None,
        }
    }

    /// Create an error response from an application error
    pub fn from_error(error: &AppError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_category: Some(error.category().to_string()),
            raw_response: error.raw_response().map(str::to_string),
        }
    }
}

impl<T> From<Result<T, AppError>> for CommandResponse<T> {
    fn from(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::from_error(&e),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub database: bool,
    /// Whether an API key is available to the completion provider
    pub provider_configured: bool,
    pub provider: String,
    pub model: String,
    /// Result of a live provider probe, when one was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_reachable: Option<bool>,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            service: "fractal-history".to_string(),
            database: false,
            provider_configured: false,
            provider: String::new(),
            model: String::new(),
            provider_reachable: None,
        }
    }
}
