//! # Cart Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│Committed │       │
//! │  │  Cart    │     │          │     │          │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout                           │
//! │                   change_quantity    (checkout.rs)                      │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::validation::validate_quantity;
use kasir_core::{CartError, CartLine, CartTotals, PaymentDraft, Register};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{RegisterState, StoreState};

/// Cart contents with totals and the payment entered so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
    pub payment: PaymentDraft,
    pub awaiting_confirmation: bool,
}

impl From<&Register> for CartResponse {
    fn from(register: &Register) -> Self {
        CartResponse {
            lines: register.cart().lines().to_vec(),
            totals: register.cart().totals(),
            payment: *register.payment(),
            awaiting_confirmation: register.is_awaiting_confirmation(),
        }
    }
}

pub fn get_cart(register: &RegisterState) -> CartResponse {
    debug!("get_cart command");
    register.with_register(|r| CartResponse::from(r))
}

/// Adds one unit of a product.
///
/// Rejected when every unit in stock is already in the cart.
pub fn add_to_cart(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");
    let product = store.with_catalog(|c| c.require(product_id).cloned())?;

    register.with_register_mut(|r| {
        r.add_item(&product)?;
        Ok(CartResponse::from(&*r))
    })
}

/// Adds `quantity` units of the product with `sku`, as typed at the
/// keyboard (`RICE-005:3`).
///
/// Adds nothing if the full quantity is not available.
pub fn add_sku_to_cart(
    store: &StoreState,
    register: &RegisterState,
    sku: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(sku = %sku, quantity, "add_sku_to_cart command");
    validate_quantity(quantity)?;
    let product = store
        .with_catalog(|c| c.find_by_sku(sku).cloned())
        .ok_or_else(|| ApiError::not_found("Product", sku))?;

    register.with_register_mut(|r| {
        let available = product.stock - r.cart().quantity_of(&product.id);
        if quantity > available {
            let err = if available <= 0 {
                CartError::OutOfStock {
                    sku: product.sku.clone(),
                    name: product.name.clone(),
                }
            } else {
                CartError::MaxStockReached {
                    sku: product.sku.clone(),
                    name: product.name.clone(),
                    stock: product.stock,
                }
            };
            return Err(err.into());
        }

        r.add_item(&product)?;
        if quantity > 1 {
            r.change_quantity(&product, quantity - 1)?;
        }
        Ok(CartResponse::from(&*r))
    })
}

/// Changes a line's quantity by `delta`. A change that would leave the
/// line at zero or below is ignored; use [`remove_from_cart`] instead.
pub fn change_quantity(
    store: &StoreState,
    register: &RegisterState,
    product_id: &str,
    delta: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, delta, "change_quantity command");
    let product = store.with_catalog(|c| c.require(product_id).cloned())?;

    register.with_register_mut(|r| {
        r.change_quantity(&product, delta)?;
        Ok(CartResponse::from(&*r))
    })
}

pub fn remove_from_cart(
    register: &RegisterState,
    product_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "remove_from_cart command");
    register.with_register_mut(|r| {
        if !r.remove_item(product_id) {
            return Err(CartError::NotInCart(product_id.to_string()).into());
        }
        Ok(CartResponse::from(&*r))
    })
}

/// Empties the cart and resets the payment draft.
pub fn clear_cart(register: &RegisterState) -> CartResponse {
    debug!("clear_cart command");
    register.with_register_mut(|r| {
        r.clear();
        CartResponse::from(&*r)
    })
}
