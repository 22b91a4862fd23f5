//! CSV rows to staged records.
//!
//! The first record is the header row. Quoted fields (RFC 4180) are read by
//! the `csv` crate, so supplier names with commas survive.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::classifier::{FieldClassifier, FieldRole};
use super::{parse_amount, parse_date, DEFAULT_COUNTERPARTY};
use crate::error::{CoreResult, ImportError, ValidationError};
use crate::validation::validate_decimal_amount;
use crate::types::{RawField, RecordStatus, SourceKind, StagedRecord};

/// Parses CSV text into one staged record per non-blank data row.
///
/// Row problems never fail the call; they become ERROR records. Only an
/// unreadable file or a missing header row does.
pub fn parse_csv(
    input: &str,
    classifier: &FieldClassifier,
    now: DateTime<Utc>,
) -> CoreResult<Vec<StagedRecord>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Malformed(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ImportError::MissingHeader.into());
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ImportError::Malformed(e.to_string()))?;
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }

        let raw_fields: Vec<RawField> = headers
            .iter()
            .enumerate()
            .map(|(index, column)| RawField {
                column: column.clone(),
                value: row.get(index).unwrap_or_default().to_string(),
            })
            .collect();

        let overflow = (row.len() > headers.len())
            .then(|| format!("row has {} values but {} columns", row.len(), headers.len()));

        records.push(stage_row(raw_fields, overflow, classifier, now));
    }

    Ok(records)
}

/// Builds and judges one record from its header-aligned fields.
///
/// `rejection` settles the record as ERROR before any field is checked.
pub(crate) fn stage_row(
    raw_fields: Vec<RawField>,
    rejection: Option<String>,
    classifier: &FieldClassifier,
    now: DateTime<Utc>,
) -> StagedRecord {
    let columns: Vec<&str> = raw_fields.iter().map(|f| f.column.as_str()).collect();
    let amount_col = classifier.first_column(&columns, FieldRole::Amount);
    let date_col = classifier.first_column(&columns, FieldRole::Date);
    let description_col = classifier.first_column(&columns, FieldRole::Description);

    let value_at = |index: Option<usize>| index.map(|i| raw_fields[i].value.as_str());

    let total_amount = value_at(amount_col)
        .and_then(parse_amount)
        .and_then(|value| validate_decimal_amount("amount", value).ok())
        .unwrap_or_default();
    let date = value_at(date_col).and_then(parse_date).unwrap_or(now);
    let counterparty = value_at(description_col)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_COUNTERPARTY)
        .to_string();

    let mapped = [amount_col, date_col, description_col];
    let item_summary = raw_fields
        .iter()
        .enumerate()
        .filter(|(index, _)| !mapped.contains(&Some(*index)))
        .map(|(_, field)| format!("{}: {}", field.column, field.value))
        .collect::<Vec<_>>()
        .join(", ");

    let verdict = match rejection {
        Some(reason) => Err(reason),
        None => validate_row(&raw_fields, classifier),
    };

    StagedRecord {
        id: Uuid::new_v4().to_string(),
        source: SourceKind::Csv,
        date,
        counterparty,
        total_amount,
        item_summary,
        status: RecordStatus::Pending,
        error: None,
        raw_fields,
    }
    .settle(verdict)
}

/// Scans headers in order, applying rules in classifier order. The first
/// failing check names the column.
fn validate_row(fields: &[RawField], classifier: &FieldClassifier) -> Result<(), String> {
    for field in fields {
        for rule in classifier.rules() {
            if !rule.role.is_validated() || !rule.matches(&field.column) {
                continue;
            }
            check_value(rule.role, field).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn check_value(role: FieldRole, field: &RawField) -> Result<(), ValidationError> {
    let value = field.value.trim();
    match role {
        FieldRole::Identifier if value.is_empty() => Err(ValidationError::Required {
            field: field.column.clone(),
        }),
        FieldRole::Amount => match parse_amount(value) {
            None => Err(ValidationError::InvalidFormat {
                field: field.column.clone(),
                reason: format!("'{}' is not a number", value),
            }),
            Some(amount) => validate_decimal_amount(&field.column, amount).map(|_| ()),
        },
        FieldRole::Date if parse_date(value).is_none() => Err(ValidationError::InvalidFormat {
            field: field.column.clone(),
            reason: format!("'{}' is not a date", value),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::money::Money;
    use chrono::{Datelike, TimeZone};

    fn parse(input: &str) -> Vec<StagedRecord> {
        parse_csv(input, &FieldClassifier::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_product_row_is_valid() {
        let records = parse("sku,name,price,stock\nRICE-005,Premium Rice,65000,24\n");
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.status, RecordStatus::Valid);
        assert_eq!(record.error, None);
        assert_eq!(record.total_amount.minor(), 65_000);
        assert_eq!(record.counterparty, "Premium Rice");
        assert_eq!(record.item_summary, "sku: RICE-005, stock: 24");
        assert_eq!(record.source, SourceKind::Csv);
        let columns: Vec<_> = record.raw_fields.iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, vec!["sku", "name", "price", "stock"]);
    }

    #[test]
    fn test_negative_price_is_error() {
        let records = parse("sku,name,price,stock\nRICE-005,Premium Rice,-5,24\n");
        let record = &records[0];

        assert_eq!(record.status, RecordStatus::Error);
        let reason = record.error.as_deref().unwrap();
        assert!(reason.contains("price"), "{}", reason);
        assert_eq!(record.field("price"), Some("-5"));
    }

    #[test]
    fn test_first_failure_names_column() {
        let records = parse("id,tanggal,total\n,2024-01-05,100\nA1,someday,100\nA2,2024-01-05,abc\n");

        assert_eq!(records[0].error.as_deref(), Some("id is required"));
        assert!(records[1].error.as_deref().unwrap().starts_with("tanggal"));
        assert!(records[2].error.as_deref().unwrap().starts_with("total"));
    }

    #[test]
    fn test_mapping_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let records = parse_csv("code,qty\nX1,4\n", &FieldClassifier::default(), now).unwrap();

        let record = &records[0];
        assert!(record.is_valid());
        assert_eq!(record.date, now);
        assert_eq!(record.counterparty, DEFAULT_COUNTERPARTY);
        assert_eq!(record.total_amount, Money::zero());
        assert_eq!(record.item_summary, "code: X1, qty: 4");
    }

    #[test]
    fn test_expense_export_maps_date_and_supplier() {
        let input = "Tanggal,Supplier,Keterangan,Total\n\
                     15/03/2024,\"PT Sumber, Makmur\",Restock beras,\"Rp 1,250,000\"\n";
        let record = &parse(input)[0];

        assert!(record.is_valid(), "{:?}", record.error);
        assert_eq!(record.counterparty, "PT Sumber, Makmur");
        assert_eq!(record.total_amount.minor(), 1_250_000);
        assert_eq!((record.date.year(), record.date.month(), record.date.day()), (2024, 3, 15));
        assert_eq!(record.item_summary, "Keterangan: Restock beras");
    }

    #[test]
    fn test_ragged_rows() {
        let records = parse("sku,name,price\nA1,Tea\nA2,Milk,100,extra\n\n");
        assert_eq!(records.len(), 2);

        // Missing trailing value is blank; blank price is not a number
        assert_eq!(records[0].field("price"), Some(""));
        assert_eq!(records[0].status, RecordStatus::Error);

        assert_eq!(records[1].status, RecordStatus::Error);
        assert_eq!(
            records[1].error.as_deref(),
            Some("row has 4 values but 3 columns")
        );
    }

    #[test]
    fn test_amount_too_large_is_error() {
        let records =
            parse("supplier,date,amount\nGrosir Besar,2024-03-01,100000000000000000000\n");
        let record = &records[0];

        assert_eq!(record.status, RecordStatus::Error);
        let reason = record.error.as_deref().unwrap();
        assert!(reason.starts_with("amount must be between 0 and"), "{}", reason);
        assert_eq!(record.total_amount, Money::zero());
    }

    #[test]
    fn test_missing_header() {
        let err = parse_csv("", &FieldClassifier::default(), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Import(ImportError::MissingHeader)));
    }

    #[test]
    fn test_header_only_yields_no_records() {
        assert!(parse("sku,name,price\n").is_empty());
    }
}
