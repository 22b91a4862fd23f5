//! # Import Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Import Review Flow                                   │
//! │                                                                         │
//! │  CSV file ──► import_csv_file ──┐                                       │
//! │                                 ├──► staging (VALID / ERROR rows)       │
//! │  Receipt ───► scan_document ────┘         │                             │
//! │  (oracle OCR)                             │  amend_record               │
//! │                                           │  discard_record             │
//! │                                           ▼                             │
//! │                                    commit_import ──► ledger expenses    │
//! │                                    (ERROR rows stay staged)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use chrono::Utc;
use kasir_advisor::{extract_document, InlineImage};
use kasir_core::import::csv::parse_csv;
use kasir_core::import::ocr::stage_ocr;
use kasir_core::{CommitReport, CoreError, CoreResult, ImportError, StagedRecord};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{AdvisorState, ImportState, StoreState};

/// Everything currently staged, with counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingResponse {
    /// Records added by this call.
    pub staged: usize,
    pub valid_count: usize,
    pub error_count: usize,
    pub records: Vec<StagedRecord>,
}

pub fn list_staged(import: &ImportState) -> StagingResponse {
    debug!("list_staged command");
    staging_response(import, 0)
}

/// Parses CSV text and stages one record per data row.
pub fn import_csv_text(import: &ImportState, text: &str) -> Result<StagingResponse, ApiError> {
    debug!(bytes = text.len(), "import_csv_text command");
    let records = parse_csv(text, import.classifier(), Utc::now())?;
    let staged = import.with_staging_mut(|s| s.stage(records));
    info!(staged, "CSV staged");
    Ok(staging_response(import, staged))
}

pub fn import_csv_file(import: &ImportState, path: &Path) -> Result<StagingResponse, ApiError> {
    debug!(path = %path.display(), "import_csv_file command");
    let text = std::fs::read_to_string(path)?;
    import_csv_text(import, &text)
}

/// Sends a receipt or invoice image to the oracle and stages the result.
///
/// An unreadable receipt is staged as an ERROR record, not returned as an
/// error.
pub async fn scan_document(
    advisor: &AdvisorState,
    import: &ImportState,
    path: &Path,
) -> Result<StagedRecord, ApiError> {
    debug!(path = %path.display(), "scan_document command");
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let image = InlineImage::new(InlineImage::mime_type_for(&file_name), data);

    let outcome = extract_document(advisor.oracle(), image).await;
    let record = stage_ocr(outcome, Utc::now());
    info!(record_id = %record.id, status = ?record.status, "Receipt staged");

    import.with_staging_mut(|s| s.stage(vec![record.clone()]));
    Ok(record)
}

/// Corrects one column of a CSV row and re-validates it.
pub fn amend_record(
    import: &ImportState,
    record_id: &str,
    column: &str,
    value: &str,
) -> Result<StagedRecord, ApiError> {
    debug!(record_id = %record_id, column = %column, "amend_record command");
    let classifier = import.classifier();
    let record = import.with_staging_mut(|s| {
        s.amend(record_id, column, value, classifier, Utc::now())
            .cloned()
    })?;
    Ok(record)
}

pub fn discard_record(import: &ImportState, record_id: &str) -> Result<StagedRecord, ApiError> {
    debug!(record_id = %record_id, "discard_record command");
    Ok(import.with_staging_mut(|s| s.discard(record_id))?)
}

/// Posts every VALID record as an expense. ERROR records stay staged.
pub fn commit_import(store: &StoreState, import: &ImportState) -> Result<CommitReport, ApiError> {
    debug!("commit_import command");
    Ok(post_to_ledger(store, import)?)
}

/// What an explicit `--commit` did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitResponse {
    Committed { report: CommitReport },
    /// Nothing was VALID; the books are untouched.
    NothingToCommit { message: String },
}

/// Like [`commit_import`], but an empty commit is an answer rather than an
/// error.
pub fn request_commit(store: &StoreState, import: &ImportState) -> Result<CommitResponse, ApiError> {
    debug!("request_commit command");
    match post_to_ledger(store, import) {
        Ok(report) => Ok(CommitResponse::Committed { report }),
        Err(CoreError::Import(e @ ImportError::NothingToCommit)) => {
            Ok(CommitResponse::NothingToCommit {
                message: e.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn post_to_ledger(store: &StoreState, import: &ImportState) -> CoreResult<CommitReport> {
    let report = store.with_ledger_mut(|l| import.with_staging_mut(|s| s.commit(l)))?;
    info!(
        committed = report.committed,
        remaining = report.remaining,
        amount = %report.amount,
        "Import posted to ledger"
    );
    Ok(report)
}

fn staging_response(import: &ImportState, staged: usize) -> StagingResponse {
    import.with_staging(|s| StagingResponse {
        staged,
        valid_count: s.valid_count(),
        error_count: s.error_count(),
        records: s.records().to_vec(),
    })
}
