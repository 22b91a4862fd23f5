//! Demo data the terminal starts from on every run.
//!
//! Ids are fixed so that transactions and cart lines from different runs
//! point at the same products.

use crate::catalog::Catalog;
use crate::money::Money;
use crate::types::{FinancialSummary, Product};

/// (sku, name, category, unit, price, cost, stock, reorder point)
type SeedRow = (&'static str, &'static str, &'static str, &'static str, i64, i64, i64, i64);

const PRODUCTS: &[SeedRow] = &[
    ("RICE-005", "Premium Rice", "Staples", "bag", 65_000, 52_000, 24, 5),
    ("OIL-002", "Cooking Oil 2L", "Staples", "bottle", 38_000, 31_000, 8, 10),
    ("SUGAR-001", "Granulated Sugar 1kg", "Staples", "pack", 17_500, 14_000, 40, 10),
    ("EGG-010", "Chicken Eggs (10)", "Fresh", "tray", 28_000, 23_000, 30, 8),
    ("NOOD-003", "Instant Noodles", "Snacks", "pack", 3_500, 2_600, 200, 50),
    ("COFF-004", "Ground Coffee 250g", "Beverages", "pack", 45_000, 33_000, 15, 5),
    ("TEA-006", "Jasmine Tea", "Beverages", "box", 7_000, 5_000, 60, 10),
    ("MILK-007", "UHT Milk 1L", "Beverages", "carton", 19_500, 15_500, 18, 6),
    ("SOAP-008", "Bath Soap", "Household", "bar", 4_500, 3_000, 3, 10),
    ("WATER-009", "Mineral Water 600ml", "Beverages", "bottle", 4_000, 2_500, 120, 24),
    ("APPL-012", "Rice Cooker Deluxe", "Appliances", "unit", 850_000, 640_000, 5, 2),
];

/// The demo catalog.
pub fn demo_catalog() -> Catalog {
    let products = PRODUCTS
        .iter()
        .enumerate()
        .map(
            |(index, &(sku, name, category, unit, price, cost, stock, reorder_point))| Product {
                id: format!("00000000-0000-4000-8000-{:012}", index + 1),
                sku: sku.to_string(),
                name: name.to_string(),
                category: category.to_string(),
                unit: unit.to_string(),
                price: Money::from_minor(price),
                cost: Money::from_minor(cost),
                stock,
                reorder_point,
            },
        )
        .collect();
    Catalog::from_trusted(products)
}

/// Month-to-date totals the demo store starts with.
pub fn demo_summary() -> FinancialSummary {
    FinancialSummary::seeded(
        Money::from_minor(45_250_000),
        Money::from_minor(31_800_000),
        Money::from_minor(6_450_000),
    )
}
