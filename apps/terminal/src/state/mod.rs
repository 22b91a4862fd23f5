//! # State Module
//!
//! Focused state holders, one per concern. Each command takes only the
//! holders it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │  StoreState  │ │ RegisterState│ │ ImportState  │ │ AdvisorState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │  Catalog     │ │  Register    │ │  Staging     │ │  dyn Oracle  │   │
//! │  │  Ledger      │ │  (cart, pay) │ │  Classifier  │ │  Scheduler   │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ConfigState: read-only after startup                                  │
//! │                                                                         │
//! │  LOCK ORDER: register → catalog → ledger, then staging.                │
//! │  No lock is held across an .await.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod advisor;
mod config;
mod import;
mod register;
mod store;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use advisor::AdvisorState;
pub use config::ConfigState;
pub use import::ImportState;
pub use register::RegisterState;
pub use store::StoreState;

/// Locks a state mutex. A panic in another command leaves plain data
/// behind, so a poisoned lock is still usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
