//! # Register State
//!
//! The in-progress sale: cart lines, payment draft and confirmation step.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Register Operations                                  │
//! │                                                                         │
//! │  Operator Action          Command                  Register Change      │
//! │  ───────────────          ───────                  ───────────────      │
//! │  Scan product ──────────► add_to_cart() ─────────► line qty += 1        │
//! │  +/- buttons ───────────► change_quantity() ─────► line qty += delta    │
//! │  Pick payment ──────────► set_payment() ─────────► payment draft        │
//! │  Pay ───────────────────► checkout() ────────────► commit or confirm    │
//! │                                                                         │
//! │  NOTE: every edit drops a pending high-value confirmation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use kasir_core::{CheckoutPolicy, Register};

use super::lock;

#[derive(Debug, Clone)]
pub struct RegisterState {
    register: Arc<Mutex<Register>>,
}

impl RegisterState {
    pub fn new(policy: CheckoutPolicy) -> Self {
        RegisterState {
            register: Arc::new(Mutex::new(Register::new(policy))),
        }
    }

    /// ```rust,ignore
    /// let quote = register_state.with_register(|r| r.quote());
    /// ```
    pub fn with_register<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        f(&lock(&self.register))
    }

    pub fn with_register_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        f(&mut lock(&self.register))
    }
}

impl Default for RegisterState {
    fn default() -> Self {
        Self::new(CheckoutPolicy::default())
    }
}
