//! The review area between parsing and the ledger.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stage() ──► [ VALID | ERROR | VALID | ERROR | VALID ]                  │
//! │                  │                      │                               │
//! │              discard(id)          amend(id, column, value)              │
//! │                                   (CSV only, re-judged in place)        │
//! │                                                                         │
//! │  commit() ──► VALID ──► Ledger::record_import                           │
//! │               ERROR ──► stay here for the operator                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use super::classifier::FieldClassifier;
use super::csv::stage_row;
use crate::error::{CoreResult, ImportError};
use crate::ledger::Ledger;
use crate::money::Money;
use crate::types::{RecordStatus, SourceKind, StagedRecord};

/// Records awaiting review, in the order they were staged.
#[derive(Debug, Clone, Default)]
pub struct ImportStaging {
    records: Vec<StagedRecord>,
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub committed: usize,
    pub remaining: usize,
    pub amount: Money,
}

impl ImportStaging {
    pub fn new() -> Self {
        ImportStaging::default()
    }

    /// Appends parsed records. Returns how many were added.
    pub fn stage(&mut self, records: Vec<StagedRecord>) -> usize {
        let added = records.len();
        self.records.extend(records);
        debug!(added, total = self.records.len(), "Records staged");
        added
    }

    pub fn records(&self) -> &[StagedRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&StagedRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn valid_count(&self) -> usize {
        self.count(RecordStatus::Valid)
    }

    pub fn error_count(&self) -> usize {
        self.count(RecordStatus::Error)
    }

    /// Removes one record without committing it.
    pub fn discard(&mut self, id: &str) -> CoreResult<StagedRecord> {
        let index = self.index_of(id)?;
        Ok(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Replaces one field of a CSV record and judges the row again.
    ///
    /// The edited row becomes a fresh record (new id) in the same position.
    pub fn amend(
        &mut self,
        id: &str,
        column: &str,
        value: &str,
        classifier: &FieldClassifier,
        now: DateTime<Utc>,
    ) -> CoreResult<&StagedRecord> {
        let index = self.index_of(id)?;
        let record = &self.records[index];
        if record.source != SourceKind::Csv {
            return Err(ImportError::NotAmendable(id.to_string()).into());
        }

        let mut fields = record.raw_fields.clone();
        let field = fields
            .iter_mut()
            .find(|f| f.column == column)
            .ok_or_else(|| ImportError::UnknownColumn {
                record: id.to_string(),
                column: column.to_string(),
            })?;
        field.value = value.trim().to_string();

        self.records[index] = stage_row(fields, None, classifier, now);
        Ok(&self.records[index])
    }

    /// Posts every VALID record to the ledger and keeps the rest staged.
    ///
    /// With no VALID record nothing changes and `NothingToCommit` is
    /// returned.
    pub fn commit(&mut self, ledger: &mut Ledger) -> CoreResult<CommitReport> {
        if self.valid_count() == 0 {
            return Err(ImportError::NothingToCommit.into());
        }

        let (valid, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(StagedRecord::is_valid);
        self.records = remaining;

        let committed = ledger.record_import(&valid);
        let amount = valid.iter().map(|r| r.total_amount).sum();
        info!(committed, remaining = self.records.len(), "Import committed");

        Ok(CommitReport {
            committed,
            remaining: self.records.len(),
            amount,
        })
    }

    fn count(&self, status: RecordStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    fn index_of(&self, id: &str) -> CoreResult<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ImportError::RecordNotFound(id.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::import::csv::parse_csv;
    use crate::import::ocr::{stage_ocr, OcrOutcome};
    use crate::seed;

    const MIXED: &str = "\
supplier,date,amount
Toko Beras Jaya,2024-03-01,450000
Agen Minyak,2024-03-02,-20
CV Gula Manis,2024-03-03,175000
Depot Air,not a date,60000
Pasar Induk,2024-03-05,90000
";

    fn staged() -> ImportStaging {
        let mut staging = ImportStaging::new();
        let records = parse_csv(MIXED, &FieldClassifier::default(), Utc::now()).unwrap();
        staging.stage(records);
        staging
    }

    #[test]
    fn test_commit_posts_valid_and_keeps_errors() {
        let mut staging = staged();
        let mut ledger = Ledger::new(seed::demo_summary());
        assert_eq!(staging.valid_count(), 3);
        assert_eq!(staging.error_count(), 2);

        let report = staging.commit(&mut ledger).unwrap();

        assert_eq!(report.committed, 3);
        assert_eq!(report.remaining, 2);
        assert_eq!(report.amount.minor(), 715_000);
        assert_eq!(ledger.expenses().len(), 3);
        assert_eq!(staging.len(), 2);
        assert!(staging.records().iter().all(|r| r.status == RecordStatus::Error));
        assert_eq!(
            ledger.summary().expenses - seed::demo_summary().expenses,
            Money::from_minor(715_000)
        );
    }

    #[test]
    fn test_commit_with_nothing_valid_is_noop() {
        let mut staging = staged();
        let mut ledger = Ledger::new(seed::demo_summary());
        staging.commit(&mut ledger).unwrap();

        let err = staging.commit(&mut ledger).unwrap_err();
        assert!(matches!(err, CoreError::Import(ImportError::NothingToCommit)));
        assert_eq!(staging.len(), 2);
        assert_eq!(ledger.expenses().len(), 3);
    }

    #[test]
    fn test_oversized_amounts_never_reach_the_ledger() {
        let input = "\
supplier,date,amount
Grosir Besar,2024-03-01,5000000000000000000
Grosir Besar,2024-03-02,5000000000000000000
Toko Kecil,2024-03-03,25000
";
        let mut staging = ImportStaging::new();
        staging.stage(parse_csv(input, &FieldClassifier::default(), Utc::now()).unwrap());
        let mut ledger = Ledger::new(seed::demo_summary());
        assert_eq!(staging.error_count(), 2);

        let report = staging.commit(&mut ledger).unwrap();

        assert_eq!(report.committed, 1);
        assert_eq!(report.amount, Money::from_minor(25_000));
        assert_eq!(
            ledger.summary().expenses,
            seed::demo_summary().expenses + Money::from_minor(25_000)
        );
    }

    #[test]
    fn test_discard_and_clear() {
        let mut staging = staged();
        let id = staging.records()[1].id.clone();

        let removed = staging.discard(&id).unwrap();
        assert_eq!(removed.counterparty, "Agen Minyak");
        assert_eq!(staging.len(), 4);
        assert!(matches!(
            staging.discard(&id),
            Err(CoreError::Import(ImportError::RecordNotFound(_)))
        ));

        staging.clear();
        assert!(staging.is_empty());
    }

    #[test]
    fn test_amend_fixes_bad_row_in_place() {
        let mut staging = staged();
        let classifier = FieldClassifier::default();
        let id = staging.records()[3].id.clone();

        let amended = staging
            .amend(&id, "date", "2024-03-04", &classifier, Utc::now())
            .unwrap();
        assert!(amended.is_valid());
        assert_ne!(amended.id, id);
        assert_eq!(staging.records()[3].counterparty, "Depot Air");
        assert_eq!(staging.valid_count(), 4);

        let first = staging.records()[0].id.clone();
        let err = staging
            .amend(&first, "qty", "1", &classifier, Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Import(ImportError::UnknownColumn { .. })));
    }

    #[test]
    fn test_ocr_records_cannot_be_amended() {
        let mut staging = ImportStaging::new();
        let record = stage_ocr(
            OcrOutcome::Failed {
                error: "blurry".into(),
            },
            Utc::now(),
        );
        let id = record.id.clone();
        staging.stage(vec![record]);

        let err = staging
            .amend(&id, "total", "100", &FieldClassifier::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::Import(ImportError::NotAmendable(_))));
    }
}
