//! # Catalog
//!
//! The in-memory product list and the stock-adjustment table.
//!
//! The catalog is the single source of truth for availability: the cart
//! checks it when lines are edited and the ledger draws stock from it when a
//! sale is recorded.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches Stock                                    │
//! │                                                                         │
//! │  add_product / update_product ──► sets initial / edited stock           │
//! │  set_stock / adjust_stock ──────► manual stock-adjustment table        │
//! │  withdraw_stock ────────────────► Ledger::record_sale (all or nothing) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, Product, ProductDraft};
use crate::validation::{validate_count, validate_product_draft, validate_search_query};

/// Ordered list of products with unique SKUs.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Builds a catalog from an external product list.
    ///
    /// Every product is validated and SKUs must be unique.
    pub fn from_products(products: Vec<Product>) -> CoreResult<Self> {
        let mut catalog = Catalog::new();
        for product in products {
            validate_product_draft(&draft_of(&product))?;
            catalog.ensure_unique_sku(&product.sku, None)?;
            catalog.products.push(product);
        }
        Ok(catalog)
    }

    /// Builds a catalog from products already known to be valid (seed data).
    pub(crate) fn from_trusted(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Like [`Catalog::get`] but reports a missing product as an error.
    pub fn require(&self, id: &str) -> CoreResult<&Product> {
        self.get(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    /// Case-insensitive SKU lookup.
    pub fn find_by_sku(&self, sku: &str) -> Option<&Product> {
        let sku = sku.trim();
        self.products.iter().find(|p| p.sku.eq_ignore_ascii_case(sku))
    }

    /// Finds a product by exact (case-insensitive) name.
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        let name = name.trim().to_lowercase();
        self.products.iter().find(|p| p.name.to_lowercase() == name)
    }

    /// Case-insensitive substring search over name, SKU and category.
    ///
    /// An empty query returns the whole catalog.
    pub fn search(&self, query: &str) -> CoreResult<Vec<&Product>> {
        let query = validate_search_query(query)?.to_lowercase();
        if query.is_empty() {
            return Ok(self.products.iter().collect());
        }

        Ok(self
            .products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.sku.to_lowercase().contains(&query)
                    || p.category.to_lowercase().contains(&query)
            })
            .collect())
    }

    /// Products at or below their reorder point.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_low_stock()).collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(|p| p.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Value of all stock at cost.
    pub fn inventory_value(&self) -> Money {
        self.products.iter().map(|p| p.cost * p.stock).sum()
    }

    // =========================================================================
    // Product Maintenance
    // =========================================================================

    /// Adds a product. Returns the stored product with its new id.
    ///
    /// ## Errors
    /// - `ValidationError` for bad fields
    /// - `ValidationError::Duplicate` when the SKU is taken
    pub fn add_product(&mut self, draft: ProductDraft) -> CoreResult<Product> {
        validate_product_draft(&draft)?;
        self.ensure_unique_sku(&draft.sku, None)?;

        let product = product_from(Uuid::new_v4().to_string(), draft);
        debug!(sku = %product.sku, id = %product.id, "Product added to catalog");
        self.products.push(product.clone());
        Ok(product)
    }

    /// Replaces every editable field of an existing product.
    pub fn update_product(&mut self, id: &str, draft: ProductDraft) -> CoreResult<Product> {
        validate_product_draft(&draft)?;
        self.ensure_unique_sku(&draft.sku, Some(id))?;

        let slot = self.get_mut(id)?;
        *slot = product_from(id.to_string(), draft);
        Ok(slot.clone())
    }

    /// Removes a product and returns it.
    pub fn remove_product(&mut self, id: &str) -> CoreResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        let removed = self.products.remove(index);
        debug!(sku = %removed.sku, "Product removed from catalog");
        Ok(removed)
    }

    // =========================================================================
    // Stock Adjustment
    // =========================================================================

    /// Sets the stock level of a product. Returns the new level.
    pub fn set_stock(&mut self, id: &str, quantity: i64) -> CoreResult<i64> {
        validate_count("stock", quantity)?;
        let product = self.get_mut(id)?;
        product.stock = quantity;
        Ok(product.stock)
    }

    /// Adds `delta` (may be negative) to a product's stock.
    ///
    /// Fails with `InsufficientStock` if the result would drop below zero,
    /// or a validation error if it would pass `MAX_STOCK`.
    pub fn adjust_stock(&mut self, id: &str, delta: i64) -> CoreResult<i64> {
        let product = self.get_mut(id)?;
        let next = product.stock.checked_add(delta).unwrap_or(i64::MAX);
        if next < 0 {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: product.stock,
                requested: delta.saturating_neg(),
            });
        }
        validate_count("stock", next)?;
        product.stock = next;
        Ok(next)
    }

    /// Takes the sold quantities out of stock.
    ///
    /// All lines are checked before anything is decremented, so either every
    /// line is withdrawn or the catalog is untouched. Several lines for the
    /// same product are checked against its stock together.
    pub fn withdraw_stock(&mut self, lines: &[CartLine]) -> CoreResult<()> {
        let mut requested: HashMap<&str, i64> = HashMap::new();
        for line in lines {
            *requested.entry(line.product_id.as_str()).or_insert(0) += line.quantity;
        }

        for (product_id, quantity) in &requested {
            let product = self.require(product_id)?;
            if !product.can_sell(*quantity) {
                return Err(CoreError::InsufficientStock {
                    sku: product.sku.clone(),
                    available: product.stock,
                    requested: *quantity,
                });
            }
        }

        for (product_id, quantity) in requested {
            let product = self.get_mut(product_id)?;
            product.stock -= quantity;
        }

        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    fn ensure_unique_sku(&self, sku: &str, except_id: Option<&str>) -> CoreResult<()> {
        let sku = sku.trim();
        let taken = self
            .products
            .iter()
            .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id.as_str()) != except_id);
        if taken {
            return Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: sku.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn product_from(id: String, draft: ProductDraft) -> Product {
    Product {
        id,
        sku: draft.sku.trim().to_string(),
        name: draft.name.trim().to_string(),
        category: draft.category.trim().to_string(),
        unit: draft.unit.trim().to_string(),
        price: draft.price,
        cost: draft.cost,
        stock: draft.stock,
        reorder_point: draft.reorder_point,
    }
}

fn draft_of(product: &Product) -> ProductDraft {
    ProductDraft {
        sku: product.sku.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        unit: product.unit.clone(),
        price: product.price,
        cost: product.cost,
        stock: product.stock,
        reorder_point: product.reorder_point,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
