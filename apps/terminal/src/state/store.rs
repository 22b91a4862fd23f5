//! # Store State
//!
//! The catalog and the books, shared by every command that sells, adjusts
//! stock or reports.

use std::sync::{Arc, Mutex};

use kasir_core::{seed, Catalog, Ledger};

use super::lock;

#[derive(Debug, Clone)]
pub struct StoreState {
    catalog: Arc<Mutex<Catalog>>,
    ledger: Arc<Mutex<Ledger>>,
}

impl StoreState {
    pub fn new(catalog: Catalog, ledger: Ledger) -> Self {
        StoreState {
            catalog: Arc::new(Mutex::new(catalog)),
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Demo catalog with the seeded year-to-date summary.
    pub fn seeded() -> Self {
        Self::new(seed::demo_catalog(), Ledger::new(seed::demo_summary()))
    }

    pub fn with_catalog<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Catalog) -> R,
    {
        f(&lock(&self.catalog))
    }

    pub fn with_catalog_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Catalog) -> R,
    {
        f(&mut lock(&self.catalog))
    }

    pub fn with_ledger<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Ledger) -> R,
    {
        f(&lock(&self.ledger))
    }

    pub fn with_ledger_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Ledger) -> R,
    {
        f(&mut lock(&self.ledger))
    }

    /// Both locks, catalog first. Used by checkout, which moves stock and
    /// money together.
    pub fn with_books_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Catalog, &mut Ledger) -> R,
    {
        let mut catalog = lock(&self.catalog);
        let mut ledger = lock(&self.ledger);
        f(&mut catalog, &mut ledger)
    }

    /// Read access to both, catalog first.
    pub fn with_books<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Catalog, &Ledger) -> R,
    {
        let catalog = lock(&self.catalog);
        let ledger = lock(&self.ledger);
        f(&catalog, &ledger)
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::seeded()
    }
}
