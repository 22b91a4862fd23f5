//! # Cart Engine
//!
//! The in-progress sale: one line per product, quantities bounded by stock.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Operation               Cart Change           │
//! │  ───────────────          ─────────               ───────────           │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ──────────► qty + 1 or new line   │
//! │                                                                         │
//! │  +/- buttons ───────────► change_quantity() ───► qty ± delta (≥ 1)     │
//! │                                                                         │
//! │  Remove ────────────────► remove_item() ───────► line gone             │
//! │                                                                         │
//! │  Stock edited ──────────► reconcile() ─────────► clamp / drop lines    │
//! │                                                                         │
//! │  NOTE: totals are derived on every read, never stored.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`
//! - Every line satisfies `1 <= quantity <= product.stock` as of its last edit
//! - A rejected operation leaves the cart unchanged

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::CartError;
use crate::money::Money;
use crate::types::{CartLine, Product, TaxRate};
use crate::MAX_CART_LINES;

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    tax_rate: TaxRate,
}

impl Cart {
    /// Creates an empty cart taxed at the default rate.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates an empty cart taxed at `tax_rate`.
    pub fn with_tax_rate(tax_rate: TaxRate) -> Self {
        Cart {
            lines: Vec::new(),
            tax_rate,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of `product`, creating the line if needed.
    ///
    /// ## Price Freezing
    /// A new line copies name, price and cost from `product`. Adding to an
    /// existing line only bumps its quantity.
    ///
    /// ## Errors
    /// - `OutOfStock` when every unit on hand is already in the cart
    /// - `TooManyLines` when a new line would exceed [`MAX_CART_LINES`]
    pub fn add_item(&mut self, product: &Product) -> Result<&CartLine, CartError> {
        let in_cart = self.quantity_of(&product.id);
        if product.stock - in_cart <= 0 {
            return Err(CartError::OutOfStock {
                sku: product.sku.clone(),
                name: product.name.clone(),
            });
        }

        match self.position(&product.id) {
            Some(index) => {
                self.lines[index].quantity += 1;
                Ok(&self.lines[index])
            }
            None => {
                if self.lines.len() >= MAX_CART_LINES {
                    return Err(CartError::TooManyLines {
                        max: MAX_CART_LINES,
                    });
                }
                self.lines.push(CartLine::from_product(product));
                let last = self.lines.len() - 1;
                Ok(&self.lines[last])
            }
        }
    }

    /// Moves a line's quantity by `delta`.
    ///
    /// An increase past `product.stock` is rejected. A result of zero or
    /// less is ignored: the line stays at its current quantity and only
    /// [`Cart::remove_item`] takes it out.
    pub fn change_quantity(&mut self, product: &Product, delta: i64) -> Result<(), CartError> {
        let index = self
            .position(&product.id)
            .ok_or_else(|| CartError::NotInCart(product.id.clone()))?;

        let next = self.lines[index].quantity + delta;
        if delta > 0 && next > product.stock {
            return Err(CartError::MaxStockReached {
                sku: product.sku.clone(),
                name: product.name.clone(),
                stock: product.stock,
            });
        }
        if next <= 0 {
            return Ok(());
        }

        self.lines[index].quantity = next;
        Ok(())
    }

    /// Removes a product's line. Returns false if it was not in the cart.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Brings the cart back in line with the catalog after stock edits.
    ///
    /// Lines whose product is gone or has no stock are dropped; lines above
    /// current stock are clamped to it. Returns the affected product ids.
    pub fn reconcile(&mut self, catalog: &Catalog) -> Vec<String> {
        let mut affected = Vec::new();
        self.lines.retain_mut(|line| match catalog.get(&line.product_id) {
            Some(product) if product.stock > 0 => {
                if line.quantity > product.stock {
                    line.quantity = product.stock;
                    affected.push(line.product_id.clone());
                }
                true
            }
            _ => {
                affected.push(line.product_id.clone());
                false
            }
        });
        affected
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Units of `product_id` currently in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.line(product_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Sum of line totals, before tax.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Tax on the subtotal, rounded once.
    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(self.tax_rate)
    }

    pub fn total(&self) -> Money {
        self.subtotal() + self.tax()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    /// Stable value identifying the cart contents.
    ///
    /// Two carts holding the same products at the same quantities share a
    /// fingerprint regardless of line order.
    pub fn fingerprint(&self) -> u64 {
        let mut entries: Vec<(&str, i64)> = self
            .lines
            .iter()
            .map(|l| (l.product_id.as_str(), l.quantity))
            .collect();
        entries.sort_unstable();

        let mut hasher = DefaultHasher::new();
        entries.hash(&mut hasher);
        hasher.finish()
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_items: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_rate: TaxRate,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let tax = subtotal.calculate_tax(cart.tax_rate);
        CartTotals {
            line_count: cart.line_count(),
            total_items: cart.total_items(),
            subtotal,
            tax,
            total: subtotal + tax,
            tax_rate: cart.tax_rate,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            category: "Groceries".to_string(),
            unit: "pcs".to_string(),
            price: Money::from_minor(price),
            cost: Money::from_minor(price / 2),
            stock,
            reorder_point: 0,
        }
    }

    #[test]
    fn test_add_same_product_increments_line() {
        let mut cart = Cart::new();
        let p = product("1", 10_000, 5);

        cart.add_item(&p).unwrap();
        cart.add_item(&p).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.subtotal().minor(), 20_000);
    }

    #[test]
    fn test_ninth_add_rejected_at_stock_eight() {
        let catalog = seed::demo_catalog();
        let oil = catalog.find_by_sku("OIL-002").unwrap();
        assert_eq!(oil.stock, 8);

        let mut cart = Cart::new();
        for _ in 0..8 {
            cart.add_item(oil).unwrap();
        }
        let err = cart.add_item(oil).unwrap_err();

        assert!(matches!(err, CartError::OutOfStock { .. }));
        assert_eq!(cart.quantity_of(&oil.id), 8);
    }

    #[test]
    fn test_zero_stock_cannot_be_added() {
        let mut cart = Cart::new();
        let p = product("1", 1_000, 0);
        assert!(cart.add_item(&p).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_change_quantity_bounds() {
        let mut cart = Cart::new();
        let p = product("1", 1_000, 3);
        cart.add_item(&p).unwrap();

        cart.change_quantity(&p, 2).unwrap();
        assert_eq!(cart.quantity_of("1"), 3);

        let err = cart.change_quantity(&p, 1).unwrap_err();
        assert!(matches!(err, CartError::MaxStockReached { stock: 3, .. }));
        assert_eq!(cart.quantity_of("1"), 3);

        // Dropping to zero or below is ignored
        cart.change_quantity(&p, -3).unwrap();
        assert_eq!(cart.quantity_of("1"), 3);
        cart.change_quantity(&p, -2).unwrap();
        assert_eq!(cart.quantity_of("1"), 1);
        cart.change_quantity(&p, -1).unwrap();
        assert_eq!(cart.quantity_of("1"), 1);
    }

    #[test]
    fn test_change_quantity_unknown_line() {
        let mut cart = Cart::new();
        let p = product("1", 1_000, 3);
        assert_eq!(
            cart.change_quantity(&p, 1),
            Err(CartError::NotInCart("1".to_string()))
        );
    }

    #[test]
    fn test_any_sequence_keeps_quantity_within_stock() {
        let mut cart = Cart::new();
        let p = product("1", 1_000, 4);
        let deltas = [1, 5, -2, 3, -10, 2, 2, 1, -1, 7];

        cart.add_item(&p).unwrap();
        for (step, delta) in deltas.iter().enumerate() {
            let _ = cart.change_quantity(&p, *delta);
            if step % 3 == 0 {
                let _ = cart.add_item(&p);
            }
            let qty = cart.quantity_of("1");
            assert!((1..=4).contains(&qty), "step {} left qty {}", step, qty);
        }
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 1_000, 3)).unwrap();
        cart.add_item(&product("2", 2_000, 3)).unwrap();

        assert!(cart.remove_item("1"));
        assert!(!cart.remove_item("1"));
        assert_eq!(cart.line_count(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_totals_round_tax_once() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 65_000, 10)).unwrap();
        cart.add_item(&product("2", 3_500, 10)).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.minor(), 68_500);
        assert_eq!(totals.tax.minor(), 7_535);
        assert_eq!(totals.total.minor(), 76_035);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_items, 2);
    }

    #[test]
    fn test_total_close_to_exact_multiplier() {
        for price in [1, 7, 99, 1_234, 17_500, 999_999] {
            let mut cart = Cart::new();
            cart.add_item(&product("1", price, 1)).unwrap();
            let exact = price as f64 * 1.11;
            assert!((cart.total().as_f64() - exact).abs() <= 1.0);
            assert_eq!(cart.total(), cart.subtotal() + cart.tax());
        }
    }

    #[test]
    fn test_line_price_frozen_at_add() {
        let mut cart = Cart::new();
        let mut p = product("1", 10_000, 5);
        cart.add_item(&p).unwrap();

        p.price = Money::from_minor(12_000);
        cart.add_item(&p).unwrap();

        assert_eq!(cart.line("1").unwrap().unit_price.minor(), 10_000);
        assert_eq!(cart.subtotal().minor(), 20_000);
    }

    #[test]
    fn test_reconcile_clamps_and_drops() {
        let mut catalog = seed::demo_catalog();
        let rice = catalog.find_by_sku("RICE-005").unwrap().clone();
        let soap = catalog.find_by_sku("SOAP-008").unwrap().clone();

        let mut cart = Cart::new();
        cart.add_item(&rice).unwrap();
        cart.change_quantity(&rice, 4).unwrap();
        cart.add_item(&soap).unwrap();

        catalog.set_stock(&rice.id, 2).unwrap();
        catalog.set_stock(&soap.id, 0).unwrap();

        let affected = cart.reconcile(&catalog);
        assert_eq!(affected.len(), 2);
        assert_eq!(cart.quantity_of(&rice.id), 2);
        assert!(!cart.contains(&soap.id));
    }

    #[test]
    fn test_fingerprint_ignores_line_order() {
        let a = product("a", 1_000, 5);
        let b = product("b", 2_000, 5);

        let mut first = Cart::new();
        first.add_item(&a).unwrap();
        first.add_item(&b).unwrap();

        let mut second = Cart::new();
        second.add_item(&b).unwrap();
        second.add_item(&a).unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());

        second.add_item(&a).unwrap();
        assert_ne!(first.fingerprint(), second.fingerprint());
    }
}
