//! # kasir-core: Pure Business Logic for Kasir POS
//!
//! Everything the store counter needs to ring up a sale, keep the books and
//! stage imported expenses, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 kasir terminal (apps/terminal)                  │   │
//! │  │    catalog ──► sell ──► import / scan ──► ask / recommend       │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                   │
//! │  ┌──────────────▼──────────────────────┐  ┌────────▼───────────────┐   │
//! │  │     ★ kasir-core (THIS CRATE) ★     │  │     kasir-advisor      │   │
//! │  │                                     │  │  oracle (HTTP, async)  │   │
//! │  │  catalog   cart   checkout  ledger  │◄─┤  upsell, analyst, OCR  │   │
//! │  │  import    money  validation seed   │  │  debounced scheduler   │   │
//! │  │                                     │  └────────────────────────┘   │
//! │  │  NO I/O • NO NETWORK • NO CLOCK     │                               │
//! │  └─────────────────────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money and tax rounding
//! - [`types`] - Domain types (Product, CartLine, Transaction, StagedRecord)
//! - [`catalog`] - Product list and stock adjustments
//! - [`cart`] - Cart engine with stock-bounded quantities
//! - [`checkout`] - Register: payment gate, anomaly confirmation, commit
//! - [`ledger`] - Append-only sales/expense log and financial summary
//! - [`import`] - CSV and OCR staging pipeline
//! - [`validation`] - Field validation rules
//! - [`seed`] - Demo catalog and summary
//!
//! ## Design Principles
//!
//! 1. **No I/O**: the caller supplies the current time and any oracle output
//! 2. **Integer Money**: all monetary values are whole rupiah (i64)
//! 3. **Explicit Errors**: every rejection is a typed error, never a panic
//! 4. **Owned State**: `Catalog`, `Register`, `Ledger` and `ImportStaging` are
//!    plain values passed to operations; there are no globals
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use kasir_core::{seed, CheckoutStep, Ledger, PaymentMethod, Register};
//!
//! let mut catalog = seed::demo_catalog();
//! let mut ledger = Ledger::new(seed::demo_summary());
//! let mut register = Register::default();
//!
//! let rice = catalog.find_by_sku("RICE-005").unwrap().clone();
//! register.add_item(&rice).unwrap();
//! register.set_payment_method(PaymentMethod::Qris);
//!
//! let step = register.checkout(&mut catalog, &mut ledger, Utc::now()).unwrap();
//! assert!(matches!(step, CheckoutStep::Completed(_)));
//! assert_eq!(catalog.find_by_sku("RICE-005").unwrap().stock, 23);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod import;
pub mod ledger;
pub mod money;
pub mod seed;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals};
pub use catalog::Catalog;
pub use checkout::{CheckoutPolicy, CheckoutQuote, CheckoutStep, PaymentDraft, Register};
pub use error::{CartError, CheckoutError, CoreError, CoreResult, ImportError, ValidationError};
pub use import::{
    CommitReport, FieldClassifier, FieldRole, FieldRule, ImportStaging, OcrExtraction, OcrItem,
    OcrOutcome,
};
pub use ledger::{AnalystSnapshot, Ledger};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate: PPN 11%, in basis points.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1100;

/// Sales above this total (in rupiah) need an explicit confirmation.
pub const ANOMALY_THRESHOLD: Money = Money::from_minor(2_000_000);

/// Maximum distinct products in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity the operator may type for a single line.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest single amount accepted anywhere: prices, costs, tendered cash,
/// imported expenses. Rp1 trillion.
pub const MAX_MONEY: Money = Money::from_minor(1_000_000_000_000);

/// Largest stock level (or reorder point) a product may hold.
pub const MAX_STOCK: i64 = 1_000_000;
