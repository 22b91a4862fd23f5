//! # Report Commands
//!
//! Dashboard figures: the running financial summary, today's sales and the
//! latest transactions.

use chrono::{DateTime, Utc};
use kasir_core::{FinancialSummary, Money, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::state::StoreState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: FinancialSummary,
    pub gross_margin_pct: f64,
    /// Stock on hand valued at cost.
    pub inventory_value: Money,
    /// Sales subtotal since midnight UTC.
    pub sales_today: Money,
    pub transaction_count: usize,
    pub expense_count: usize,
    pub low_stock_count: usize,
}

pub fn financial_summary(store: &StoreState) -> SummaryResponse {
    debug!("financial_summary command");
    let midnight = start_of_day(Utc::now());
    store.with_books(|c, l| SummaryResponse {
        summary: *l.summary(),
        gross_margin_pct: l.summary().gross_margin_pct(),
        inventory_value: c.inventory_value(),
        sales_today: l.sales_since(midnight),
        transaction_count: l.transactions().len(),
        expense_count: l.expenses().len(),
        low_stock_count: c.low_stock().len(),
    })
}

/// Newest first.
pub fn recent_transactions(store: &StoreState, limit: usize) -> Vec<Transaction> {
    debug!(limit, "recent_transactions command");
    store.with_ledger(|l| l.recent_transactions(limit).into_iter().cloned().collect())
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}
