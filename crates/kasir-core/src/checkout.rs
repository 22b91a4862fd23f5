//! # Checkout
//!
//! The register: the cart being rung up, the payment being entered, and the
//! gate that turns both into a committed [`Transaction`].
//!
//! ## Register States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │         checkout() [valid, total ≤ threshold] ──► Completed(txn)       │
//! │        ┌──────────────────────────────────────────────────────┐        │
//! │        │                                                      ▼        │
//! │   ┌────┴────┐  checkout() [total > threshold]  ┌──────────────────────┐ │
//! │   │  Open   │ ───────────────────────────────► │ AwaitingConfirmation │ │
//! │   └─────────┘ ◄─────────────────────────────── └──────────┬───────────┘ │
//! │        ▲       cancel_confirmation() / any edit           │ confirm()   │
//! │        │                                                  ▼             │
//! │        └────────────────── reset ◄──────────────── Completed(txn)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Gate
//! A sale is payable when the cart is non-empty and, for CASH, the amount
//! received covers the total. Change is only ever computed behind the gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartTotals};
use crate::catalog::Catalog;
use crate::error::{CartError, CheckoutError, CoreResult};
use crate::ledger::Ledger;
use crate::money::Money;
use crate::types::{CartLine, PaymentMethod, Product, TaxRate, Transaction};
use crate::validation::{validate_non_negative_money, ValidationResult};
use crate::ANOMALY_THRESHOLD;

// =============================================================================
// Policy & Payment
// =============================================================================

/// Store rules applied at the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPolicy {
    pub tax_rate: TaxRate,
    /// Totals strictly above this need an explicit confirmation.
    pub anomaly_threshold: Money,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        CheckoutPolicy {
            tax_rate: TaxRate::default(),
            anomaly_threshold: ANOMALY_THRESHOLD,
        }
    }
}

/// Payment details entered so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub method: PaymentMethod,
    pub cash_received: Option<Money>,
}

/// Everything the payment screen shows, computed from current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub totals: CartTotals,
    pub method: PaymentMethod,
    pub cash_received: Option<Money>,
    pub change: Money,
    pub is_valid: bool,
    pub requires_confirmation: bool,
    /// Why the sale cannot be paid yet, if it can't.
    pub problem: Option<String>,
}

/// Outcome of [`Register::checkout`].
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutStep {
    /// The sale was committed.
    Completed(Transaction),
    /// The total is unusually large; call [`Register::confirm`] to commit.
    NeedsConfirmation(CheckoutQuote),
}

// =============================================================================
// Register
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum RegisterState {
    #[default]
    Open,
    AwaitingConfirmation,
}

/// Owns the in-progress cart and payment draft.
#[derive(Debug, Clone, Default)]
pub struct Register {
    cart: Cart,
    payment: PaymentDraft,
    policy: CheckoutPolicy,
    state: RegisterState,
}

impl Register {
    pub fn new(policy: CheckoutPolicy) -> Self {
        Register {
            cart: Cart::with_tax_rate(policy.tax_rate),
            payment: PaymentDraft::default(),
            policy,
            state: RegisterState::Open,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn payment(&self) -> &PaymentDraft {
        &self.payment
    }

    pub fn policy(&self) -> &CheckoutPolicy {
        &self.policy
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.state == RegisterState::AwaitingConfirmation
    }

    // =========================================================================
    // Cart Editing
    // =========================================================================
    // Every edit drops a pending confirmation: the operator confirmed a
    // specific total, not whatever the cart turns into afterwards.

    pub fn add_item(&mut self, product: &Product) -> Result<CartLine, CartError> {
        let line = self.cart.add_item(product)?.clone();
        self.reopen();
        Ok(line)
    }

    pub fn change_quantity(&mut self, product: &Product, delta: i64) -> Result<(), CartError> {
        self.cart.change_quantity(product, delta)?;
        self.reopen();
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        self.reopen();
        self.cart.remove_item(product_id)
    }

    /// Empties the cart and resets the payment draft.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.payment = PaymentDraft::default();
        self.reopen();
    }

    /// See [`Cart::reconcile`].
    pub fn reconcile(&mut self, catalog: &Catalog) -> Vec<String> {
        let affected = self.cart.reconcile(catalog);
        if !affected.is_empty() {
            self.reopen();
        }
        affected
    }

    // =========================================================================
    // Payment Entry
    // =========================================================================

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment.method = method;
        self.reopen();
    }

    /// Records the cash handed over. `None` clears it.
    pub fn set_cash_received(&mut self, cash: Option<Money>) -> ValidationResult<()> {
        if let Some(amount) = cash {
            validate_non_negative_money("cash received", amount)?;
        }
        self.payment.cash_received = cash;
        self.reopen();
        Ok(())
    }

    // =========================================================================
    // Payment Gate
    // =========================================================================

    /// Checks that the sale can be paid as entered.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        if self.payment.method.requires_tender() {
            let total = self.cart.total();
            let received = self.payment.cash_received.unwrap_or_default();
            if received < total {
                return Err(CheckoutError::InsufficientPayment { total, received });
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Change owed to the customer. Zero for non-cash methods.
    pub fn change(&self) -> Money {
        match (self.payment.method, self.payment.cash_received) {
            (PaymentMethod::Cash, Some(cash)) => cash.saturating_sub_floor(self.cart.total()),
            _ => Money::zero(),
        }
    }

    /// True when the current total needs an explicit confirmation.
    pub fn requires_confirmation(&self) -> bool {
        self.cart.total() > self.policy.anomaly_threshold
    }

    pub fn quote(&self) -> CheckoutQuote {
        let verdict = self.validate();
        CheckoutQuote {
            totals: self.cart.totals(),
            method: self.payment.method,
            cash_received: self.payment.cash_received,
            change: if verdict.is_ok() { self.change() } else { Money::zero() },
            is_valid: verdict.is_ok(),
            requires_confirmation: self.requires_confirmation(),
            problem: verdict.err().map(|e| e.to_string()),
        }
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Attempts to complete the sale.
    ///
    /// A payable sale at or below the anomaly threshold is committed at once.
    /// Above it the register moves to awaiting confirmation and nothing is
    /// committed until [`Register::confirm`].
    pub fn checkout(
        &mut self,
        catalog: &mut Catalog,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> CoreResult<CheckoutStep> {
        self.validate()?;

        if self.requires_confirmation() {
            self.state = RegisterState::AwaitingConfirmation;
            debug!(total = %self.cart.total(), "Sale above anomaly threshold, awaiting confirmation");
            return Ok(CheckoutStep::NeedsConfirmation(self.quote()));
        }

        self.commit(catalog, ledger, now).map(CheckoutStep::Completed)
    }

    /// Commits a sale that is awaiting confirmation.
    pub fn confirm(
        &mut self,
        catalog: &mut Catalog,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        if !self.is_awaiting_confirmation() {
            return Err(CheckoutError::NothingToConfirm.into());
        }
        self.validate()?;
        self.commit(catalog, ledger, now)
    }

    /// Backs out of the confirmation step, keeping cart and payment.
    pub fn cancel_confirmation(&mut self) {
        self.reopen();
    }

    fn commit(
        &mut self,
        catalog: &mut Catalog,
        ledger: &mut Ledger,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        let totals = self.cart.totals();
        let cash_received = match self.payment.method {
            PaymentMethod::Cash => self.payment.cash_received,
            _ => None,
        };

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            timestamp: now,
            lines: self.cart.lines().to_vec(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            payment_method: self.payment.method,
            cash_received,
            change: self.change(),
        };

        // On a stock failure the register keeps its cart so the operator can
        // reconcile and try again.
        let committed = ledger.record_sale(catalog, transaction)?.clone();
        info!(transaction_id = %committed.id, change = %committed.change, "Checkout completed");

        self.clear();
        Ok(committed)
    }

    fn reopen(&mut self) {
        self.state = RegisterState::Open;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
