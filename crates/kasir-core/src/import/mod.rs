//! # Import Pipeline
//!
//! Turns supplier CSV exports and scanned receipts into staged expense
//! records the operator can review before they touch the books.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CSV text ──► csv::parse_csv ──┐                                        │
//! │                                │    StagedRecord (VALID / ERROR)        │
//! │                                ├──► ImportStaging ──► commit()          │
//! │  OCR JSON ──► ocr::stage_ocr ──┘         │               │              │
//! │                                  discard / amend         ▼              │
//! │                                                  Ledger::record_import  │
//! │                                                  (VALID records only)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column meaning is guessed from header names by a [`FieldClassifier`].
//! Every row is judged exactly once when it is parsed.

pub mod classifier;
pub mod csv;
pub mod ocr;
pub mod staging;

pub use classifier::{FieldClassifier, FieldRole, FieldRule};
pub use ocr::{OcrExtraction, OcrItem, OcrOutcome};
pub use staging::{CommitReport, ImportStaging};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Counterparty used when no description column is present or it is blank.
pub const DEFAULT_COUNTERPARTY: &str = "Imported Record";

/// Date layouts accepted in CSV cells and OCR output.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a loosely formatted amount.
///
/// Everything except digits, `.` and `-` is dropped first, so currency
/// symbols and spaces are tolerated. Returns `None` when what is left is not
/// a finite number.
///
/// ```rust
/// use kasir_core::import::parse_amount;
///
/// assert_eq!(parse_amount("Rp 65000"), Some(65000.0));
/// assert_eq!(parse_amount("-5"), Some(-5.0));
/// assert_eq!(parse_amount("n/a"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a calendar date (or RFC 3339 timestamp) into UTC.
///
/// Plain dates resolve to midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}
