//! # Advisor Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Advisor Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  EmptyResponse          │ │
//! │  │  InvalidUrl     │  │  Status         │  │  InvalidResponse        │ │
//! │  │  ConfigLoad...  │  │  Timeout        │  │  InvalidRequest         │ │
//! │  │  MissingCred... │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These errors stay inside this crate. The public advisory functions turn
//! them into empty or neutral results and log them.

use thiserror::Error;

/// Result type alias for oracle operations.
pub type AdvisorResult<T> = Result<T, AdvisorError>;

#[derive(Debug, Error)]
pub enum AdvisorError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid advisor configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid oracle endpoint: {0}")]
    InvalidUrl(String),

    #[error("Failed to load advisor config: {0}")]
    ConfigLoadFailed(String),

    /// No API key configured. Raised before any request is sent.
    #[error("Oracle API key not configured (set KASIR_API_KEY)")]
    MissingCredential,

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Oracle request failed: {0}")]
    Http(String),

    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle request timed out")]
    Timeout,

    // =========================================================================
    // Response Errors
    // =========================================================================
    #[error("Oracle returned no content")]
    EmptyResponse,

    #[error("Oracle response could not be read: {0}")]
    InvalidResponse(String),

    /// The request was rejected locally and never sent.
    #[error("Invalid oracle request: {0}")]
    InvalidRequest(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdvisorError::Timeout
        } else if let Some(status) = err.status() {
            AdvisorError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            AdvisorError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for AdvisorError {
    fn from(err: url::ParseError) -> Self {
        AdvisorError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for AdvisorError {
    fn from(err: std::io::Error) -> Self {
        AdvisorError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for AdvisorError {
    fn from(err: toml::de::Error) -> Self {
        AdvisorError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl AdvisorError {
    /// Returns true if the same request might succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdvisorError::Http(_) | AdvisorError::Timeout => true,
            // Rate limits and server-side failures
            AdvisorError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AdvisorError::InvalidConfig(_)
                | AdvisorError::InvalidUrl(_)
                | AdvisorError::ConfigLoadFailed(_)
                | AdvisorError::MissingCredential
        )
    }
}
