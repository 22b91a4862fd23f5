//! # Checkout Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout Flow                                        │
//! │                                                                         │
//! │  set_payment ──► checkout ──┬── invalid ──────────► PAYMENT_ERROR        │
//! │                             │                                           │
//! │                             ├── total > threshold ► NEEDS_CONFIRMATION  │
//! │                             │        │                                  │
//! │                             │   confirm_checkout ───┐                   │
//! │                             │   cancel_confirmation │                   │
//! │                             │                       ▼                   │
//! │                             └── processing delay ──► COMPLETED (receipt)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The processing delay is awaited before any lock is taken.

use chrono::Utc;
use kasir_core::{CheckoutQuote, CheckoutStep, Money, PaymentMethod, Transaction};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, RegisterState, StoreState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub transaction_id: String,
    pub store_name: String,
    pub timestamp: String,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub cash_received: Option<Money>,
    pub change: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

impl ReceiptResponse {
    fn new(config: &ConfigState, transaction: &Transaction) -> Self {
        ReceiptResponse {
            transaction_id: transaction.id.clone(),
            store_name: config.store_name.clone(),
            timestamp: transaction.timestamp.to_rfc3339(),
            lines: transaction
                .lines
                .iter()
                .map(|l| ReceiptLine {
                    sku: l.sku.clone(),
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: transaction.subtotal,
            tax: transaction.tax,
            total: transaction.total,
            payment_method: transaction.payment_method,
            cash_received: transaction.cash_received,
            change: transaction.change,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutResponse {
    Completed { receipt: ReceiptResponse },
    NeedsConfirmation { quote: CheckoutQuote },
}

/// Sets the payment method and, for cash, the amount handed over (whole
/// rupiah). Returns the updated quote.
pub fn set_payment(
    register: &RegisterState,
    method: PaymentMethod,
    cash_received: Option<i64>,
) -> Result<CheckoutQuote, ApiError> {
    debug!(%method, ?cash_received, "set_payment command");
    register.with_register_mut(|r| {
        r.set_payment_method(method);
        r.set_cash_received(cash_received.map(Money::from_minor))?;
        Ok(r.quote())
    })
}

pub fn get_quote(register: &RegisterState) -> CheckoutQuote {
    debug!("get_quote command");
    register.with_register(|r| r.quote())
}

/// Pays for the current cart.
///
/// Sales above the anomaly threshold come back as `NeedsConfirmation`
/// without touching stock or the books.
pub async fn checkout(
    config: &ConfigState,
    store: &StoreState,
    register: &RegisterState,
) -> Result<CheckoutResponse, ApiError> {
    debug!("checkout command");

    let needs_confirmation =
        register.with_register(|r| r.validate().map(|()| r.requires_confirmation()))?;
    if !needs_confirmation {
        simulate_processing(config).await;
    }

    let now = Utc::now();
    let step = register.with_register_mut(|r| store.with_books_mut(|c, l| r.checkout(c, l, now)))?;

    Ok(match step {
        CheckoutStep::Completed(transaction) => completed(config, &transaction),
        CheckoutStep::NeedsConfirmation(quote) => {
            info!(total = %quote.totals.total, "High-value sale needs confirmation");
            CheckoutResponse::NeedsConfirmation { quote }
        }
    })
}

/// Commits a sale that [`checkout`] held for confirmation.
pub async fn confirm_checkout(
    config: &ConfigState,
    store: &StoreState,
    register: &RegisterState,
) -> Result<CheckoutResponse, ApiError> {
    debug!("confirm_checkout command");
    simulate_processing(config).await;

    let now = Utc::now();
    let transaction =
        register.with_register_mut(|r| store.with_books_mut(|c, l| r.confirm(c, l, now)))?;
    Ok(completed(config, &transaction))
}

/// Backs out of the confirmation step, keeping the cart.
pub fn cancel_confirmation(register: &RegisterState) -> CheckoutQuote {
    debug!("cancel_confirmation command");
    register.with_register_mut(|r| {
        r.cancel_confirmation();
        r.quote()
    })
}

async fn simulate_processing(config: &ConfigState) {
    let delay = config.processing_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

fn completed(config: &ConfigState, transaction: &Transaction) -> CheckoutResponse {
    info!(
        transaction_id = %transaction.id,
        total = %transaction.total,
        items = transaction.item_count(),
        "Sale completed"
    );
    CheckoutResponse::Completed {
        receipt: ReceiptResponse::new(config, transaction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_sku_to_cart;
    use crate::error::ErrorCode;

    fn instant() -> ConfigState {
        ConfigState {
            processing_delay_ms: 0,
            ..ConfigState::default()
        }
    }

    fn stock_of(store: &StoreState, sku: &str) -> i64 {
        store.with_catalog(|c| c.find_by_sku(sku).unwrap().stock)
    }

    #[tokio::test]
    async fn test_cash_sale_gives_change_and_receipt() {
        let (config, store, register) = (instant(), StoreState::seeded(), RegisterState::default());
        add_sku_to_cart(&store, &register, "RICE-005", 1).unwrap();

        let quote = set_payment(&register, PaymentMethod::Cash, Some(100_000)).unwrap();
        assert!(quote.is_valid);
        assert_eq!(quote.totals.total, Money::from_minor(72_150));
        assert_eq!(quote.change, Money::from_minor(27_850));

        let response = checkout(&config, &store, &register).await.unwrap();
        let CheckoutResponse::Completed { receipt } = response else {
            panic!("expected a completed sale");
        };
        assert_eq!(receipt.store_name, "Toko Kasir");
        assert_eq!(receipt.change, Money::from_minor(27_850));
        assert_eq!(receipt.lines[0].line_total, Money::from_minor(65_000));

        assert_eq!(stock_of(&store, "RICE-005"), 23);
        assert!(register.with_register(|r| r.cart().is_empty()));
    }

    #[tokio::test]
    async fn test_underpaid_cash_is_rejected() {
        let (config, store, register) = (instant(), StoreState::seeded(), RegisterState::default());
        add_sku_to_cart(&store, &register, "RICE-005", 1).unwrap();
        set_payment(&register, PaymentMethod::Cash, Some(70_000)).unwrap();

        let err = checkout(&config, &store, &register).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(stock_of(&store, "RICE-005"), 24);
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_be_paid() {
        let (config, store, register) = (instant(), StoreState::seeded(), RegisterState::default());
        set_payment(&register, PaymentMethod::Qris, None).unwrap();
        let err = checkout(&config, &store, &register).await.unwrap_err();
        assert_eq!(err.message, "Cart is empty");
    }

    #[tokio::test]
    async fn test_high_value_sale_waits_for_confirmation() {
        let (config, store, register) = (instant(), StoreState::seeded(), RegisterState::default());
        add_sku_to_cart(&store, &register, "APPL-012", 3).unwrap();
        set_payment(&register, PaymentMethod::Debit, None).unwrap();

        let response = checkout(&config, &store, &register).await.unwrap();
        assert!(matches!(response, CheckoutResponse::NeedsConfirmation { .. }));
        assert_eq!(stock_of(&store, "APPL-012"), 5);

        let revenue_before = store.with_ledger(|l| l.summary().revenue);
        let response = confirm_checkout(&config, &store, &register).await.unwrap();
        assert!(matches!(response, CheckoutResponse::Completed { .. }));
        assert_eq!(stock_of(&store, "APPL-012"), 2);
        assert_eq!(
            store.with_ledger(|l| l.summary().revenue),
            revenue_before + Money::from_minor(2_550_000)
        );
    }

    #[tokio::test]
    async fn test_cancelled_confirmation_cannot_be_confirmed() {
        let (config, store, register) = (instant(), StoreState::seeded(), RegisterState::default());
        add_sku_to_cart(&store, &register, "APPL-012", 3).unwrap();
        set_payment(&register, PaymentMethod::Qris, None).unwrap();
        checkout(&config, &store, &register).await.unwrap();

        let quote = cancel_confirmation(&register);
        assert!(quote.requires_confirmation);
        let err = confirm_checkout(&config, &store, &register).await.unwrap_err();
        assert_eq!(err.message, "No sale is awaiting confirmation");
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_delay_is_awaited() {
        let config = ConfigState::default();
        let (store, register) = (StoreState::seeded(), RegisterState::default());
        add_sku_to_cart(&store, &register, "TEA-006", 2).unwrap();
        set_payment(&register, PaymentMethod::Qris, None).unwrap();

        let started = tokio::time::Instant::now();
        checkout(&config, &store, &register).await.unwrap();
        assert!(started.elapsed() >= config.processing_delay());
    }

    #[test]
    fn test_response_is_tagged() {
        let quote = get_quote(&RegisterState::default());
        let json = serde_json::to_value(CheckoutResponse::NeedsConfirmation { quote }).unwrap();
        assert_eq!(json["status"], "NEEDS_CONFIRMATION");
    }
}
