//! # Ledger
//!
//! Append-only log of committed sales and imported expenses, plus the
//! running financial summary they feed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ledger Inputs                                        │
//! │                                                                         │
//! │  Register::checkout ──► record_sale ──► transactions[] + stock − qty   │
//! │                                         revenue, cogs, tax_collected    │
//! │                                                                         │
//! │  ImportStaging::commit ──► record_import ──► expenses[]                │
//! │                                              expenses, net_profit       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every update is a plain sum, so the order sales are recorded in never
//! changes the summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{ExpenseEntry, FinancialSummary, Product, StagedRecord, Transaction};

/// Committed sales, committed expenses and the summary derived from them.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    transactions: Vec<Transaction>,
    expenses: Vec<ExpenseEntry>,
    summary: FinancialSummary,
}

impl Ledger {
    /// Creates an empty ledger starting from `summary`.
    pub fn new(summary: FinancialSummary) -> Self {
        Ledger {
            transactions: Vec::new(),
            expenses: Vec::new(),
            summary,
        }
    }

    /// Appends a sale and takes its quantities out of stock.
    ///
    /// Stock is checked for every line first; if any line is short nothing
    /// is recorded and the catalog is untouched. Cost of goods uses the unit
    /// cost frozen on each line.
    pub fn record_sale(
        &mut self,
        catalog: &mut Catalog,
        transaction: Transaction,
    ) -> CoreResult<&Transaction> {
        catalog.withdraw_stock(&transaction.lines)?;

        let cost: Money = transaction
            .lines
            .iter()
            .map(|l| l.unit_cost.multiply_quantity(l.quantity))
            .sum();
        self.summary
            .apply_sale(transaction.subtotal, cost, transaction.tax);

        info!(
            transaction_id = %transaction.id,
            total = %transaction.total,
            method = %transaction.payment_method,
            items = transaction.item_count(),
            "Sale recorded"
        );

        let index = self.transactions.len();
        self.transactions.push(transaction);
        Ok(&self.transactions[index])
    }

    /// Posts every VALID record as an expense. Other records are skipped.
    ///
    /// Returns the number of expenses posted.
    pub fn record_import(&mut self, records: &[StagedRecord]) -> usize {
        let mut posted = 0;
        let mut amount = Money::zero();

        for record in records.iter().filter(|r| r.is_valid()) {
            self.summary.apply_expense(record.total_amount);
            amount += record.total_amount;
            self.expenses.push(ExpenseEntry {
                id: Uuid::new_v4().to_string(),
                record_id: record.id.clone(),
                source: record.source,
                date: record.date,
                counterparty: record.counterparty.clone(),
                amount: record.total_amount,
                item_summary: record.item_summary.clone(),
            });
            posted += 1;
        }

        if posted > 0 {
            info!(count = posted, amount = %amount, "Imported expenses recorded");
        }
        posted
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The `n` most recent transactions, newest first.
    pub fn recent_transactions(&self, n: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(n).collect()
    }

    pub fn expenses(&self) -> &[ExpenseEntry] {
        &self.expenses
    }

    pub fn summary(&self) -> &FinancialSummary {
        &self.summary
    }

    /// Sales recorded on or after `since`.
    pub fn sales_since(&self, since: DateTime<Utc>) -> Money {
        self.transactions
            .iter()
            .filter(|t| t.timestamp >= since)
            .map(|t| t.subtotal)
            .sum()
    }

    /// What the analyst gets to see: the summary, the latest sales and the
    /// products that need restocking.
    pub fn snapshot(&self, catalog: &Catalog, recent: usize) -> AnalystSnapshot {
        AnalystSnapshot {
            summary: self.summary,
            recent_transactions: self
                .recent_transactions(recent)
                .into_iter()
                .cloned()
                .collect(),
            low_stock: catalog.low_stock().into_iter().cloned().collect(),
        }
    }
}

/// Read-only store context handed to the analyst oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnalystSnapshot {
    pub summary: FinancialSummary,
    pub recent_transactions: Vec<Transaction>,
    pub low_stock: Vec<Product>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::seed;
    use crate::types::{CartLine, PaymentMethod, RawField, RecordStatus, SourceKind};

    fn sale(catalog: &Catalog, items: &[(&str, i64)]) -> Transaction {
        let lines: Vec<CartLine> = items
            .iter()
            .map(|(sku, qty)| {
                let mut line = CartLine::from_product(catalog.find_by_sku(sku).unwrap());
                line.quantity = *qty;
                line
            })
            .collect();
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let tax = subtotal.calculate_tax(Default::default());
        Transaction {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            lines,
            subtotal,
            tax,
            total: subtotal + tax,
            payment_method: PaymentMethod::Qris,
            cash_received: None,
            change: Money::zero(),
        }
    }

    fn record(amount: i64, status: RecordStatus) -> StagedRecord {
        StagedRecord {
            id: Uuid::new_v4().to_string(),
            source: SourceKind::Csv,
            date: Utc::now(),
            counterparty: "PT Sumber Makmur".to_string(),
            total_amount: Money::from_minor(amount),
            item_summary: String::new(),
            status,
            error: None,
            raw_fields: vec![RawField {
                column: "total".into(),
                value: amount.to_string(),
            }],
        }
    }

    #[test]
    fn test_record_sale_updates_stock_and_summary() {
        let mut catalog = seed::demo_catalog();
        let mut ledger = Ledger::new(FinancialSummary::default());
        let txn = sale(&catalog, &[("RICE-005", 2), ("TEA-006", 3)]);

        ledger.record_sale(&mut catalog, txn).unwrap();

        assert_eq!(catalog.find_by_sku("RICE-005").unwrap().stock, 22);
        assert_eq!(catalog.find_by_sku("TEA-006").unwrap().stock, 57);
        assert_eq!(catalog.find_by_sku("OIL-002").unwrap().stock, 8);

        let summary = ledger.summary();
        assert_eq!(summary.revenue.minor(), 151_000);
        assert_eq!(summary.cogs.minor(), 119_000);
        assert_eq!(summary.gross_profit.minor(), 32_000);
        assert_eq!(summary.net_profit.minor(), 32_000);
        assert_eq!(summary.tax_collected.minor(), 16_610);
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_record_sale_short_stock_changes_nothing() {
        let mut catalog = seed::demo_catalog();
        let mut ledger = Ledger::new(seed::demo_summary());
        let txn = sale(&catalog, &[("RICE-005", 1), ("SOAP-008", 4)]);

        let err = ledger.record_sale(&mut catalog, txn).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(catalog.find_by_sku("RICE-005").unwrap().stock, 24);
        assert!(ledger.transactions().is_empty());
        assert_eq!(*ledger.summary(), seed::demo_summary());
    }

    #[test]
    fn test_summary_is_order_independent() {
        let base = seed::demo_catalog();
        let t1 = sale(&base, &[("COFF-004", 1), ("MILK-007", 2)]);
        let t2 = sale(&base, &[("NOOD-003", 10)]);

        let mut catalog_a = base.clone();
        let mut ledger_a = Ledger::new(seed::demo_summary());
        ledger_a.record_sale(&mut catalog_a, t1.clone()).unwrap();
        ledger_a.record_sale(&mut catalog_a, t2.clone()).unwrap();

        let mut catalog_b = base.clone();
        let mut ledger_b = Ledger::new(seed::demo_summary());
        ledger_b.record_sale(&mut catalog_b, t2).unwrap();
        ledger_b.record_sale(&mut catalog_b, t1).unwrap();

        assert_eq!(ledger_a.summary(), ledger_b.summary());
        assert_eq!(catalog_a.products(), catalog_b.products());
    }

    #[test]
    fn test_record_import_posts_valid_only() {
        let mut ledger = Ledger::new(seed::demo_summary());
        let before = *ledger.summary();
        let records = vec![
            record(100_000, RecordStatus::Valid),
            record(50_000, RecordStatus::Error),
            record(25_000, RecordStatus::Valid),
        ];

        assert_eq!(ledger.record_import(&records), 2);

        let after = ledger.summary();
        assert_eq!(after.expenses - before.expenses, Money::from_minor(125_000));
        assert_eq!(before.net_profit - after.net_profit, Money::from_minor(125_000));
        assert_eq!(after.revenue, before.revenue);
        assert_eq!(after.cogs, before.cogs);
        assert_eq!(ledger.expenses().len(), 2);
        assert_eq!(ledger.expenses()[0].record_id, records[0].id);
    }

    #[test]
    fn test_recent_transactions_newest_first() {
        let mut catalog = seed::demo_catalog();
        let mut ledger = Ledger::default();
        let first = sale(&catalog, &[("TEA-006", 1)]);
        let second = sale(&catalog, &[("WATER-009", 1)]);
        let second_id = second.id.clone();

        ledger.record_sale(&mut catalog, first).unwrap();
        ledger.record_sale(&mut catalog, second).unwrap();

        let recent = ledger.recent_transactions(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, second_id);

        let snapshot = ledger.snapshot(&catalog, 5);
        assert_eq!(snapshot.recent_transactions.len(), 2);
        assert!(snapshot.low_stock.iter().any(|p| p.sku == "OIL-002"));
    }
}
