//! # Domain Types
//!
//! Core domain types used throughout Kasir POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  product_id     │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  unit_price     │   │  lines (frozen) │       │
//! │  │  price, cost    │   │  unit_cost      │   │  subtotal, tax  │       │
//! │  │  stock, reorder │   │  quantity       │   │  total, method  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │FinancialSummary │   │  StagedRecord   │   │  ExpenseEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  revenue, cogs  │   │  source CSV/OCR │   │  record_id      │       │
//! │  │  gross, net     │   │  status         │   │  amount         │       │
//! │  │  expenses, tax  │   │  raw_fields     │   │  counterparty   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Products carry both:
//! - `id`: UUID v4, immutable, used by cart lines and transactions
//! - `sku`: human-readable business identifier, unique but editable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%. The store default, PPN at 11%, is 1100 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique in the catalog.
    pub sku: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    pub category: String,

    /// Unit of measure ("pack", "bottle", "kg").
    pub unit: String,

    /// Selling price per unit.
    pub price: Money,

    /// Purchase cost per unit (feeds COGS).
    pub cost: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Stock level at or below which the product is flagged for restocking.
    pub reorder_point: i64,
}

impl Product {
    /// Checks if the product has reached its reorder point.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_point
    }

    /// Checks if `quantity` units can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

/// Input for creating or editing a product.
///
/// The catalog assigns the `id`; everything else comes from the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub price: Money,
    pub cost: Money,
    pub stock: i64,
    pub reorder_point: i64,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Physical cash. The only method that needs a tendered amount.
    #[default]
    Cash,
    /// QR code payment (Indonesian national QR standard).
    Qris,
    /// Debit card on an external terminal.
    Debit,
}

impl PaymentMethod {
    /// Returns true if the cashier must enter the amount received.
    #[inline]
    pub fn requires_tender(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::Qris => write!(f, "QRIS"),
            PaymentMethod::Debit => write!(f, "DEBIT"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "tunai" => Ok(PaymentMethod::Cash),
            "qris" | "qr" => Ok(PaymentMethod::Qris),
            "debit" | "card" => Ok(PaymentMethod::Debit),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["CASH".into(), "QRIS".into(), "DEBIT".into()],
            }),
        }
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart, and the frozen line of a committed transaction.
///
/// Uses the snapshot pattern: SKU, name, price and cost are copied from the
/// product when the line is created and never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub unit_cost: Money,
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line at quantity 1 from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            unit_cost: product.cost,
            quantity: 1,
        }
    }

    /// Line total before tax (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A completed sale. Immutable once created.
///
/// ## Invariants
/// - `total == subtotal + tax`
/// - `tax == subtotal × tax rate` (rounded once)
/// - `change` is zero for non-cash methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Cash handed over by the customer (CASH only).
    pub cash_received: Option<Money>,
    pub change: Money,
}

impl Transaction {
    /// Total units sold across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Financial Summary
// =============================================================================

/// Running financial totals for the store.
///
/// ## Accumulation Rules
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Sale (subtotal S, cost C, tax T)      Import commit (amount A)        │
/// │  ─────────────────────────────────     ────────────────────────        │
/// │  revenue       += S                   expenses   += A                  │
/// │  cogs          += C                   net_profit -= A                  │
/// │  gross_profit  += S − C                                                │
/// │  net_profit    += S − C                                                │
/// │  tax_collected += T  (liability)                                       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Tax is never revenue: it is owed to the tax office and tracked in
/// `tax_collected` until remitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialSummary {
    pub revenue: Money,
    pub cogs: Money,
    pub gross_profit: Money,
    pub expenses: Money,
    pub net_profit: Money,
    pub tax_collected: Money,
}

impl FinancialSummary {
    /// Builds a summary from seed totals, deriving the profit lines.
    pub fn seeded(revenue: Money, cogs: Money, expenses: Money) -> Self {
        let gross_profit = revenue - cogs;
        FinancialSummary {
            revenue,
            cogs,
            gross_profit,
            expenses,
            net_profit: gross_profit - expenses,
            tax_collected: Money::zero(),
        }
    }

    /// Folds one sale into the running totals.
    pub fn apply_sale(&mut self, subtotal: Money, cost: Money, tax: Money) {
        let margin = subtotal - cost;
        self.revenue += subtotal;
        self.cogs += cost;
        self.gross_profit += margin;
        self.net_profit += margin;
        self.tax_collected += tax;
    }

    /// Folds one expense into the running totals.
    pub fn apply_expense(&mut self, amount: Money) {
        self.expenses += amount;
        self.net_profit -= amount;
    }

    /// Gross margin as a percentage of revenue (0 when there is no revenue).
    pub fn gross_margin_pct(&self) -> f64 {
        if self.revenue.is_zero() {
            return 0.0;
        }
        self.gross_profit.as_f64() / self.revenue.as_f64() * 100.0
    }
}

// =============================================================================
// Import Staging Types
// =============================================================================

/// Where a staged record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceKind {
    Csv,
    Ocr,
}

/// Validation status of a staged record.
///
/// `Pending` is the state before the parser has reached a verdict; `Valid`
/// and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    #[default]
    Pending,
    Valid,
    Error,
}

/// One original column of an imported row, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawField {
    pub column: String,
    pub value: String,
}

/// A parsed-but-not-yet-committed import row or OCR result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StagedRecord {
    pub id: String,
    pub source: SourceKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub counterparty: String,
    pub total_amount: Money,
    pub item_summary: String,
    pub status: RecordStatus,
    /// Human-readable reason when `status == Error`.
    pub error: Option<String>,
    /// Original columns in header order.
    pub raw_fields: Vec<RawField>,
}

impl StagedRecord {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.status == RecordStatus::Valid
    }

    /// Looks up an original column value by header name.
    pub fn field(&self, column: &str) -> Option<&str> {
        self.raw_fields
            .iter()
            .find(|f| f.column == column)
            .map(|f| f.value.as_str())
    }

    /// Settles a pending record. Has no effect once a verdict exists.
    pub(crate) fn settle(mut self, verdict: Result<(), String>) -> Self {
        if self.status != RecordStatus::Pending {
            return self;
        }
        match verdict {
            Ok(()) => {
                self.status = RecordStatus::Valid;
                self.error = None;
            }
            Err(reason) => {
                self.status = RecordStatus::Error;
                self.error = Some(reason);
            }
        }
        self
    }
}

/// An expense posted to the ledger from a committed import record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseEntry {
    pub id: String,
    /// Id of the staged record this entry was committed from.
    pub record_id: String,
    pub source: SourceKind,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub counterparty: String,
    pub amount: Money,
    pub item_summary: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_ppn() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1100);
        assert!((rate.percentage() - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("QRIS".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qris);
        assert_eq!(" debit ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serializes_uppercase() {
        let json = serde_json::to_string(&PaymentMethod::Qris).unwrap();
        assert_eq!(json, "\"QRIS\"");
        assert!(PaymentMethod::Cash.requires_tender());
        assert!(!PaymentMethod::Debit.requires_tender());
    }

    #[test]
    fn test_summary_seeded_derives_profit() {
        let summary = FinancialSummary::seeded(
            Money::from_minor(1_000_000),
            Money::from_minor(600_000),
            Money::from_minor(150_000),
        );
        assert_eq!(summary.gross_profit.minor(), 400_000);
        assert_eq!(summary.net_profit.minor(), 250_000);
        assert!((summary.gross_margin_pct() - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_summary_sale_excludes_tax_from_revenue() {
        let mut summary = FinancialSummary::default();
        summary.apply_sale(Money::from_minor(100_000), Money::from_minor(70_000), Money::from_minor(11_000));

        assert_eq!(summary.revenue.minor(), 100_000);
        assert_eq!(summary.cogs.minor(), 70_000);
        assert_eq!(summary.gross_profit.minor(), 30_000);
        assert_eq!(summary.net_profit.minor(), 30_000);
        assert_eq!(summary.tax_collected.minor(), 11_000);
        assert_eq!(summary.expenses, Money::zero());
    }

    #[test]
    fn test_summary_expense_reduces_net_only() {
        let mut summary = FinancialSummary::seeded(Money::from_minor(500), Money::from_minor(200), Money::zero());
        summary.apply_expense(Money::from_minor(120));
        assert_eq!(summary.gross_profit.minor(), 300);
        assert_eq!(summary.expenses.minor(), 120);
        assert_eq!(summary.net_profit.minor(), 180);
    }

    #[test]
    fn test_staged_record_settles_once() {
        let record = StagedRecord {
            id: "r1".into(),
            source: SourceKind::Csv,
            date: Utc::now(),
            counterparty: "Supplier".into(),
            total_amount: Money::zero(),
            item_summary: String::new(),
            status: RecordStatus::Pending,
            error: None,
            raw_fields: vec![RawField { column: "name".into(), value: "Rice".into() }],
        };

        let settled = record.settle(Err("name is required".into()));
        assert_eq!(settled.status, RecordStatus::Error);

        let unchanged = settled.settle(Ok(()));
        assert_eq!(unchanged.status, RecordStatus::Error);
        assert_eq!(unchanged.field("name"), Some("Rice"));
        assert_eq!(unchanged.field("missing"), None);
    }
}
