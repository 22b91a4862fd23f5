//! # Catalog Commands
//!
//! Product lookup, product CRUD and the stock-adjustment table.
//!
//! Any change that can lower stock or delete a product is followed by a
//! register reconcile, so the open cart never holds more than is on hand.

use kasir_core::{Product, ProductDraft};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{RegisterState, StoreState};

/// Result of a stock edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product: Product,
    /// Product ids of cart lines that were clamped or dropped as a result.
    pub cart_changes: Vec<String>,
}

pub fn list_products(store: &StoreState) -> Vec<Product> {
    debug!("list_products command");
    store.with_catalog(|c| c.products().to_vec())
}

/// Case-insensitive search on name, SKU and category. An empty query lists
/// every product.
pub fn search_products(store: &StoreState, query: &str) -> Result<Vec<Product>, ApiError> {
    debug!(query = %query, "search_products command");
    store.with_catalog(|c| {
        let found = c.search(query)?;
        Ok(found.into_iter().cloned().collect())
    })
}

pub fn get_product_by_sku(store: &StoreState, sku: &str) -> Result<Product, ApiError> {
    debug!(sku = %sku, "get_product_by_sku command");
    store
        .with_catalog(|c| c.find_by_sku(sku).cloned())
        .ok_or_else(|| ApiError::not_found("Product", sku))
}

/// Products at or below their reorder point.
pub fn low_stock(store: &StoreState) -> Vec<Product> {
    debug!("low_stock command");
    store.with_catalog(|c| c.low_stock().into_iter().cloned().collect())
}

pub fn add_product(store: &StoreState, draft: ProductDraft) -> Result<Product, ApiError> {
    debug!(sku = %draft.sku, "add_product command");
    let product = store.with_catalog_mut(|c| c.add_product(draft))?;
    info!(sku = %product.sku, id = %product.id, "Product created");
    Ok(product)
}

pub fn update_product(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
    draft: ProductDraft,
) -> Result<StockAdjustment, ApiError> {
    debug!(product_id = %product_id, "update_product command");
    register.with_register_mut(|r| {
        let (product, cart_changes) = store.with_catalog_mut(|c| {
            let product = c.update_product(product_id, draft)?;
            Ok::<_, ApiError>((product, r.reconcile(c)))
        })?;
        Ok(StockAdjustment {
            product,
            cart_changes,
        })
    })
}

pub fn remove_product(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
) -> Result<StockAdjustment, ApiError> {
    debug!(product_id = %product_id, "remove_product command");
    register.with_register_mut(|r| {
        let (product, cart_changes) = store.with_catalog_mut(|c| {
            let product = c.remove_product(product_id)?;
            Ok::<_, ApiError>((product, r.reconcile(c)))
        })?;
        info!(sku = %product.sku, "Product deleted");
        Ok(StockAdjustment {
            product,
            cart_changes,
        })
    })
}

/// Sets the on-hand count, as typed into the stock table.
pub fn set_stock(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
    quantity: i64,
) -> Result<StockAdjustment, ApiError> {
    debug!(product_id = %product_id, quantity, "set_stock command");
    edit_stock(store, register, product_id, |c| c.set_stock(product_id, quantity))
}

/// Adds (or with a negative delta removes) units, e.g. a delivery or
/// breakage.
pub fn adjust_stock(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
    delta: i64,
) -> Result<StockAdjustment, ApiError> {
    debug!(product_id = %product_id, delta, "adjust_stock command");
    edit_stock(store, register, product_id, |c| c.adjust_stock(product_id, delta))
}

fn edit_stock<F>(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
    edit: F,
) -> Result<StockAdjustment, ApiError>
where
    F: FnOnce(&mut kasir_core::Catalog) -> kasir_core::CoreResult<i64>,
{
    register.with_register_mut(|r| {
        store.with_catalog_mut(|c| {
            let stock = edit(c)?;
            let cart_changes = r.reconcile(c);
            let product = c.require(product_id)?.clone();
            info!(sku = %product.sku, stock, "Stock updated");
            Ok(StockAdjustment {
                product,
                cart_changes,
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasir_core::Money;

    fn states() -> (StoreState, RegisterState) {
        (StoreState::seeded(), RegisterState::default())
    }

    #[test]
    fn test_search_and_lookup() {
        let (store, _) = states();
        let found = search_products(&store, "rice").unwrap();
        let skus: Vec<_> = found.iter().map(|p| p.sku.as_str()).collect();
        assert!(skus.contains(&"RICE-005"));
        assert!(skus.contains(&"APPL-012"));

        assert_eq!(get_product_by_sku(&store, "oil-002").unwrap().stock, 8);
        assert_eq!(
            get_product_by_sku(&store, "NOPE-1").unwrap_err().message,
            "Product not found: NOPE-1"
        );
    }

    #[test]
    fn test_low_stock_lists_seeded_shortages() {
        let (store, _) = states();
        let skus: Vec<_> = low_stock(&store).into_iter().map(|p| p.sku).collect();
        assert!(skus.contains(&"OIL-002".to_string()));
        assert!(skus.contains(&"SOAP-008".to_string()));
        assert!(!skus.contains(&"RICE-005".to_string()));
    }

    #[test]
    fn test_lowering_stock_clamps_cart() {
        let (store, register) = states();
        let oil = get_product_by_sku(&store, "OIL-002").unwrap();
        register.with_register_mut(|r| {
            r.add_item(&oil).unwrap();
            r.change_quantity(&oil, 4).unwrap();
        });

        let adjustment = set_stock(&store, &register, &oil.id, 2).unwrap();
        assert_eq!(adjustment.product.stock, 2);
        assert_eq!(adjustment.cart_changes.len(), 1);
        assert_eq!(register.with_register(|r| r.cart().quantity_of(&oil.id)), 2);
    }

    #[test]
    fn test_negative_adjustment_cannot_go_below_zero() {
        let (store, register) = states();
        let soap = get_product_by_sku(&store, "SOAP-008").unwrap();
        let err = adjust_stock(&store, &register, &soap.id, -4).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InsufficientStock);
        assert_eq!(get_product_by_sku(&store, "SOAP-008").unwrap().stock, 3);
    }

    #[test]
    fn test_add_and_remove_product() {
        let (store, register) = states();
        let draft = ProductDraft {
            sku: "SALT-013".into(),
            name: "Iodised Salt".into(),
            category: "Staples".into(),
            unit: "pack".into(),
            price: Money::from_minor(5_000),
            cost: Money::from_minor(3_500),
            stock: 40,
            reorder_point: 10,
        };
        let created = add_product(&store, draft.clone()).unwrap();
        assert_eq!(list_products(&store).len(), 12);

        let dup = add_product(&store, draft).unwrap_err();
        assert_eq!(dup.code, crate::error::ErrorCode::ValidationError);

        let removed = remove_product(&store, &register, &created.id).unwrap();
        assert_eq!(removed.product.sku, "SALT-013");
        assert_eq!(list_products(&store).len(), 11);
    }
}
