//! Receipt scans to staged records.
//!
//! The oracle reads the image; this module only interprets its JSON answer,
//! so it stays free of I/O like the rest of the crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::parse_amount;
use super::parse_date;
use crate::money::Money;
use crate::types::{RawField, RecordStatus, SourceKind, StagedRecord};
use crate::validation::validate_decimal_amount;

/// Counterparty used when the scan names no supplier.
pub const UNKNOWN_SUPPLIER: &str = "Unknown Supplier";

const MISSING_FIELDS: &str = "could not extract total or date";

/// What the oracle made of an image.
///
/// An object with an `error` key is a failure; anything else is read as an
/// extraction, with every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrOutcome {
    Failed { error: String },
    Extracted(OcrExtraction),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrExtraction {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
    #[serde(default)]
    pub items: Vec<OcrItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrItem {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub quantity: Option<f64>,
}

impl OcrOutcome {
    /// Reads the oracle's reply, tolerating a markdown code fence around it.
    ///
    /// Unreadable text becomes `Failed`, never an error.
    pub fn from_response_text(text: &str) -> OcrOutcome {
        let body = strip_code_fence(text);
        serde_json::from_str(body).unwrap_or_else(|e| OcrOutcome::Failed {
            error: format!("unreadable extraction response: {}", e),
        })
    }
}

/// Returns the JSON inside a ```` ```json ... ``` ```` fence, or the trimmed
/// text when there is no fence.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Builds the single staged record for one scanned image.
///
/// VALID only when both a total and a date were read.
pub fn stage_ocr(outcome: OcrOutcome, now: DateTime<Utc>) -> StagedRecord {
    let pending = |counterparty: String| StagedRecord {
        id: Uuid::new_v4().to_string(),
        source: SourceKind::Ocr,
        date: now,
        counterparty,
        total_amount: Money::zero(),
        item_summary: String::new(),
        status: RecordStatus::Pending,
        error: None,
        raw_fields: Vec::new(),
    };

    let extraction = match outcome {
        OcrOutcome::Failed { error } => {
            return pending(UNKNOWN_SUPPLIER.to_string()).settle(Err(error));
        }
        OcrOutcome::Extracted(extraction) => extraction,
    };

    let date = extraction.date.as_deref().and_then(parse_date);
    let total = extraction.total.map(|t| validate_decimal_amount("total", t));
    let counterparty = extraction
        .supplier
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string());

    let mut record = pending(counterparty);
    record.date = date.unwrap_or(now);
    record.total_amount = total
        .as_ref()
        .and_then(|t| t.as_ref().ok().copied())
        .unwrap_or_default();
    record.item_summary = summarize_items(&extraction.items);
    record.raw_fields = raw_fields(&extraction);

    let verdict = match (total, date) {
        (Some(Err(e)), Some(_)) => Err(e.to_string()),
        (Some(Ok(_)), Some(_)) => Ok(()),
        _ => Err(MISSING_FIELDS.to_string()),
    };
    record.settle(verdict)
}

fn summarize_items(items: &[OcrItem]) -> String {
    items
        .iter()
        .map(|item| match item.quantity {
            Some(qty) if qty != 1.0 => format!("{} x{}", item.name, qty),
            _ => item.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn raw_fields(extraction: &OcrExtraction) -> Vec<RawField> {
    let mut fields = Vec::new();
    let mut push = |column: &str, value: Option<String>| {
        if let Some(value) = value {
            fields.push(RawField {
                column: column.to_string(),
                value,
            });
        }
    };
    push("date", extraction.date.clone());
    push("supplier", extraction.supplier.clone());
    push("total", extraction.total.map(|t| t.to_string()));
    push(
        "items",
        (!extraction.items.is_empty()).then(|| extraction.items.len().to_string()),
    );
    fields
}

/// Accepts a number, a numeric string ("Rp 65.000" style noise allowed) or
/// null.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => parse_amount(&s),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_extraction_is_valid() {
        let outcome = OcrOutcome::from_response_text(
            r#"{"date":"2024-03-15","supplier":"Toko Makmur","total":150000,
                "items":[{"name":"Rice","price":65000,"quantity":2},{"name":"Tea","price":20000}]}"#,
        );
        let record = stage_ocr(outcome, Utc::now());

        assert!(record.is_valid());
        assert_eq!(record.source, SourceKind::Ocr);
        assert_eq!(record.total_amount.minor(), 150_000);
        assert_eq!(record.counterparty, "Toko Makmur");
        assert_eq!(record.item_summary, "Rice x2, Tea");
        assert_eq!(record.field("total"), Some("150000"));
    }

    #[test]
    fn test_missing_total_or_date_is_error() {
        let no_total = OcrOutcome::from_response_text(r#"{"date":"2024-03-15"}"#);
        let record = stage_ocr(no_total, Utc::now());
        assert_eq!(record.status, RecordStatus::Error);
        assert_eq!(record.error.as_deref(), Some(MISSING_FIELDS));
        assert_eq!(record.counterparty, UNKNOWN_SUPPLIER);

        let bad_date = OcrOutcome::from_response_text(r#"{"date":"yesterday","total":"Rp 9000"}"#);
        let record = stage_ocr(bad_date, Utc::now());
        assert_eq!(record.status, RecordStatus::Error);
        assert_eq!(record.total_amount.minor(), 9_000);
    }

    #[test]
    fn test_unbounded_totals_are_errors() {
        let negative = OcrOutcome::from_response_text(r#"{"date":"2024-03-15","total":-500}"#);
        let record = stage_ocr(negative, Utc::now());
        assert_eq!(record.error.as_deref(), Some("total must not be negative"));

        let absurd = OcrOutcome::from_response_text(r#"{"date":"2024-03-15","total":1e20}"#);
        let record = stage_ocr(absurd, Utc::now());
        assert_eq!(record.status, RecordStatus::Error);
        assert!(record.error.as_deref().unwrap().starts_with("total must be between"));
        assert_eq!(record.total_amount, Money::zero());
    }

    #[test]
    fn test_oracle_error_becomes_single_error_record() {
        let outcome = OcrOutcome::from_response_text(r#"{"error":"image is not a receipt"}"#);
        assert_eq!(
            outcome,
            OcrOutcome::Failed {
                error: "image is not a receipt".to_string()
            }
        );

        let record = stage_ocr(outcome, Utc::now());
        assert_eq!(record.status, RecordStatus::Error);
        assert_eq!(record.error.as_deref(), Some("image is not a receipt"));
    }

    #[test]
    fn test_code_fence_tolerated() {
        let text = "```json\n{\"date\":\"15/03/2024\",\"total\":12000}\n```";
        let record = stage_ocr(OcrOutcome::from_response_text(text), Utc::now());
        assert!(record.is_valid());

        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_garbage_response_is_failure() {
        match OcrOutcome::from_response_text("I could not read that image.") {
            OcrOutcome::Failed { error } => assert!(error.starts_with("unreadable")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
