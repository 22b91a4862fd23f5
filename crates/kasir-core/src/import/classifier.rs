//! Header-name heuristics for imported columns.
//!
//! A header matches a rule when its lowercase form contains any of the
//! rule's terms. One header may match several rules ("name" is both an
//! identifier and a description).

use serde::{Deserialize, Serialize};

/// What a column is taken to mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Must be non-blank.
    Identifier,
    /// Must be a non-negative number; the first one is the record total.
    Amount,
    /// Must be a calendar date; the first one is the record date.
    Date,
    /// Mapping only; the first one is the counterparty.
    Description,
}

impl FieldRole {
    /// Roles that reject a row when the value is bad.
    pub fn is_validated(&self) -> bool {
        !matches!(self, FieldRole::Description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub role: FieldRole,
    pub terms: Vec<String>,
}

impl FieldRule {
    pub fn new(role: FieldRole, terms: &[&str]) -> Self {
        FieldRule {
            role,
            terms: terms.iter().map(|t| t.to_lowercase()).collect(),
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.terms.iter().any(|term| header.contains(term.as_str()))
    }
}

/// Ordered rule list. Validation applies rules in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldClassifier {
    rules: Vec<FieldRule>,
}

impl FieldClassifier {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        FieldClassifier { rules }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Roles a header plays, in rule order.
    pub fn roles_of(&self, header: &str) -> Vec<FieldRole> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(header))
            .map(|rule| rule.role)
            .collect()
    }

    pub fn has_role(&self, header: &str, role: FieldRole) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.role == role && rule.matches(header))
    }

    /// Index of the first header playing `role`.
    pub fn first_column<S: AsRef<str>>(&self, headers: &[S], role: FieldRole) -> Option<usize> {
        headers
            .iter()
            .position(|header| self.has_role(header.as_ref(), role))
    }
}

impl Default for FieldClassifier {
    fn default() -> Self {
        FieldClassifier::new(vec![
            FieldRule::new(FieldRole::Identifier, &["id", "name", "sku", "nama"]),
            FieldRule::new(FieldRole::Amount, &["amount", "price", "total", "gaji"]),
            FieldRule::new(FieldRole::Date, &["date", "tanggal"]),
            FieldRule::new(
                FieldRole::Description,
                &[
                    "name",
                    "nama",
                    "supplier",
                    "vendor",
                    "description",
                    "desc",
                    "keterangan",
                    "item",
                ],
            ),
        ])
    }
}
