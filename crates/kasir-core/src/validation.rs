//! # Validation Module
//!
//! Input validation utilities for Kasir POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end / CLI argument parsing                             │
//! │  ├── Basic format checks (empty, numeric)                              │
//! │  └── Immediate operator feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Product drafts before they enter the catalog                      │
//! │  └── Quantities and tendered cash before they reach the register       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog                                                      │
//! │  └── SKU uniqueness (needs the whole catalog, so lives there)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("RICE-005").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductDraft;
use crate::{MAX_ITEM_QUANTITY, MAX_MONEY, MAX_STOCK};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

const MAX_SKU_LEN: usize = 50;
const MAX_NAME_LEN: usize = 200;
const MAX_QUERY_LEN: usize = 100;

/// Trims `value` and rejects it when blank or longer than `max` bytes.
fn required_text<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(value)
}

/// Validates a SKU such as `RICE-005`.
///
/// ## Rules
/// - Not blank, at most 50 characters
/// - ASCII letters, digits and `-` / `_` only
///
/// ```rust
/// use kasir_core::validation::validate_sku;
///
/// assert!(validate_sku("OIL-002").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("OIL 002").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = required_text("sku", sku, MAX_SKU_LEN)?;
    let bad = sku
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_')));

    match bad {
        Some(c) => Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: format!("unexpected character '{}'", c),
        }),
        None => Ok(()),
    }
}

/// Validates a product name: not blank, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN).map(|_| ())
}

/// Trims a catalog search query. An empty query is allowed and matches
/// everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    if query.len() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }
    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity typed by the operator.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a monetary field: zero up to [`MAX_MONEY`].
///
/// ```rust
/// use kasir_core::money::Money;
/// use kasir_core::validation::validate_non_negative_money;
///
/// assert!(validate_non_negative_money("price", Money::from_minor(0)).is_ok());
/// assert!(validate_non_negative_money("price", Money::from_minor(-1)).is_err());
/// assert!(validate_non_negative_money("price", Money::from_minor(i64::MAX)).is_err());
/// ```
pub fn validate_non_negative_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount > MAX_MONEY {
        return Err(money_out_of_range(field));
    }

    Ok(())
}

/// Converts a parsed decimal (CSV cell, OCR total) into a bounded amount.
///
/// Whatever passes here is exactly what gets posted to the ledger.
pub fn validate_decimal_amount(field: &str, value: f64) -> ValidationResult<Money> {
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    let amount = Money::from_decimal(value).ok_or_else(|| money_out_of_range(field))?;
    validate_non_negative_money(field, amount)?;
    Ok(amount)
}

fn money_out_of_range(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_MONEY.minor(),
    }
}

/// Validates a stock-like count (stock, reorder point): zero up to
/// [`MAX_STOCK`].
pub fn validate_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if value > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a product draft.
///
/// SKU uniqueness is checked by the catalog, which can see the other products.
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    validate_sku(&draft.sku)?;
    validate_product_name(&draft.name)?;
    validate_non_negative_money("price", draft.price)?;
    validate_non_negative_money("cost", draft.cost)?;
    validate_count("stock", draft.stock)?;
    validate_count("reorder point", draft.reorder_point)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            sku: "RICE-005".into(),
            name: "Premium Rice".into(),
            category: "Groceries".into(),
            unit: "bag".into(),
            price: Money::from_minor(65_000),
            cost: Money::from_minor(52_000),
            stock: 24,
            reorder_point: 5,
        }
    }

    #[test]
    fn test_seed_style_skus_pass() {
        for sku in ["RICE-005", "SUGAR-001", "APPL-012", "bulk_rice_25kg"] {
            assert!(validate_sku(sku).is_ok(), "{}", sku);
        }
    }

    #[test]
    fn test_bad_skus_are_rejected() {
        assert_eq!(
            validate_sku("  ").unwrap_err(),
            ValidationError::Required { field: "sku".into() }
        );
        assert_eq!(
            validate_sku("RICE/005").unwrap_err().to_string(),
            "sku has invalid format: unexpected character '/'"
        );
        assert!(validate_sku("BERAS-ÜBER").is_err());
        assert!(validate_sku(&"X".repeat(MAX_SKU_LEN + 1)).is_err());
    }

    #[test]
    fn test_product_names_and_queries() {
        assert!(validate_product_name("Minyak Goreng 2L").is_ok());
        assert!(validate_product_name(" \t").is_err());
        assert!(validate_product_name(&"n".repeat(MAX_NAME_LEN + 1)).is_err());

        assert_eq!(validate_search_query("  teh ").unwrap(), "teh");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(MAX_QUERY_LEN + 1)).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-4).is_err());
        assert!(matches!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange { max, .. }) if max == MAX_ITEM_QUANTITY
        ));
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1100).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_product_draft() {
        assert!(validate_product_draft(&draft()).is_ok());

        let mut negative_price = draft();
        negative_price.price = Money::from_minor(-1);
        assert_eq!(
            validate_product_draft(&negative_price).unwrap_err().to_string(),
            "price must not be negative"
        );

        let mut negative_cost = draft();
        negative_cost.cost = Money::from_minor(-100);
        assert!(validate_product_draft(&negative_cost).is_err());

        let mut negative_stock = draft();
        negative_stock.stock = -3;
        assert!(validate_product_draft(&negative_stock).is_err());
    }

    #[test]
    fn test_amounts_and_counts_are_bounded() {
        let mut pricey = draft();
        pricey.price = Money::from_minor(MAX_MONEY.minor() + 1);
        assert_eq!(
            validate_product_draft(&pricey).unwrap_err(),
            ValidationError::OutOfRange {
                field: "price".into(),
                min: 0,
                max: MAX_MONEY.minor(),
            }
        );

        let mut hoard = draft();
        hoard.stock = MAX_STOCK + 1;
        assert!(validate_product_draft(&hoard).is_err());
        assert!(validate_count("stock", MAX_STOCK).is_ok());
        assert!(validate_non_negative_money("cost", MAX_MONEY).is_ok());
    }

    #[test]
    fn test_decimal_amounts() {
        assert_eq!(
            validate_decimal_amount("total", 65_000.4).unwrap(),
            Money::from_minor(65_000)
        );
        assert!(matches!(
            validate_decimal_amount("total", -1.0),
            Err(ValidationError::Negative { .. })
        ));
        assert!(matches!(
            validate_decimal_amount("total", 1e20),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_decimal_amount("total", 5e18).is_err());
    }
}
