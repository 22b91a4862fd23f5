//! # Error Types
//!
//! Domain-specific error types for kasir-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasir-core errors (this file)                                         │
//! │  ├── CoreError        - Umbrella for every domain failure              │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  ├── CartError        - Stock limits hit while editing the cart        │
//! │  ├── CheckoutError    - Payment gate and confirmation step             │
//! │  └── ImportError      - CSV/OCR staging and commit                     │
//! │                                                                         │
//! │  kasir-advisor errors (separate crate)                                 │
//! │  └── AdvisorError     - Oracle failures, never leave that crate        │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable. Nothing in this crate aborts a flow.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough stock to complete a sale or a stock adjustment.
    ///
    /// ## When This Occurs
    /// - A stock adjustment would take stock below zero
    /// - Stock was lowered after the product was added to the cart and the
    ///   checkout re-check caught it
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Also used to phrase import row failures, so the reason stored on an
/// ERROR record reads the same as a form validation message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable date or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Cart Error
// =============================================================================

/// Rejections raised by the cart engine.
///
/// The cart is left exactly as it was when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Every unit in stock is already in the cart (or stock is zero).
    #[error("{name} is out of stock")]
    OutOfStock { sku: String, name: String },

    /// Incrementing would exceed the units on hand.
    #[error("Max stock reached for {name} ({stock} available)")]
    MaxStockReached { sku: String, name: String, stock: i64 },

    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    #[error("Cart cannot have more than {max} different products")]
    TooManyLines { max: usize },
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Rejections raised by the payment gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash received is below the total (or was never entered).
    #[error("Insufficient payment: total {total}, received {received}")]
    InsufficientPayment { total: Money, received: Money },

    /// `confirm` was called with no high-value sale awaiting confirmation.
    #[error("No sale is awaiting confirmation")]
    NothingToConfirm,
}

// =============================================================================
// Import Error
// =============================================================================

/// Failures of the import pipeline as a whole.
///
/// Row-level problems never surface here; they become ERROR records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The input had no header row.
    #[error("CSV file has no header row")]
    MissingHeader,

    /// The CSV reader could not decode the input.
    #[error("CSV could not be read: {0}")]
    Malformed(String),

    /// Commit was requested with no VALID record staged.
    #[error("No valid records to commit")]
    NothingToCommit,

    #[error("Staged record not found: {0}")]
    RecordNotFound(String),

    /// Only CSV rows can be amended and re-validated.
    #[error("Staged record {0} cannot be amended")]
    NotAmendable(String),

    #[error("Staged record {record} has no column '{column}'")]
    UnknownColumn { record: String, column: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
