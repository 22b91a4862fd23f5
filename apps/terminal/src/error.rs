//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Kasir POS                              │
//! │                                                                         │
//! │  Command Function ── Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── CartError::MaxStockReached ──────► CART_ERROR               │
//! │         ├── CheckoutError::Insufficient... ──► PAYMENT_ERROR            │
//! │         ├── ImportError::NothingToCommit ────► IMPORT_ERROR             │
//! │         ├── ValidationError ─────────────────► VALIDATION_ERROR         │
//! │         └── AdvisorError (config only) ──────► CONFIG_ERROR             │
//! │                                                                         │
//! │  main.rs prints `message` and exits non-zero.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_advisor::AdvisorError;
use kasir_core::{CartError, CheckoutError, CoreError, ImportError, ValidationError};
use serde::Serialize;

/// Error returned from terminal commands.
///
/// Serializes as:
/// ```json
/// {
///   "code": "CART_ERROR",
///   "message": "Max stock reached for Cooking Oil 2L (8 available)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    CartError,
    InsufficientStock,
    PaymentError,
    /// A high-value sale is waiting for the operator to confirm it.
    ConfirmationRequired,
    ImportError,
    AdvisorUnavailable,
    ConfigError,
    IoError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => e.into(),
            CoreError::Cart(e) => e.into(),
            CoreError::Checkout(e) => e.into(),
            CoreError::Import(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::NotInCart(ref id) => ApiError::not_found("Cart line", id),
            other => ApiError::new(ErrorCode::CartError, other.to_string()),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::new(ErrorCode::PaymentError, err.to_string())
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::RecordNotFound(ref id) => ApiError::not_found("Staged record", id),
            other => ApiError::new(ErrorCode::ImportError, other.to_string()),
        }
    }
}

/// Only configuration problems reach here; oracle failures are absorbed by
/// the advisor functions.
impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        if err.is_config_error() {
            ApiError::new(ErrorCode::ConfigError, err.to_string())
        } else {
            tracing::error!(error = %err, "Unexpected advisor error");
            ApiError::new(ErrorCode::AdvisorUnavailable, err.to_string())
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::new(ErrorCode::IoError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
