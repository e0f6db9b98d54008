//! Transaction domain model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single financial movement in the canonical schema
///
/// Sign convention: positive amounts are credits (money received, or owed to
/// the person), negative amounts are debits (money paid or spent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Category name", default)]
    pub category: String,
    #[serde(rename = "Note", default)]
    pub note: String,
    #[serde(rename = "Amount")]
    pub amount: Decimal,
    /// Set only when the source table carried a person column
    #[serde(rename = "Person", default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
}

impl TransactionRecord {
    /// Create a new record with required fields
    pub fn new(date: NaiveDate, amount: Decimal) -> Self {
        Self {
            date,
            category: String::new(),
            note: String::new(),
            amount,
            person: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn with_person(mut self, person: impl Into<String>) -> Self {
        self.person = Some(person.into());
        self
    }

    /// Money in; zero amounts count with the debits
    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Whether this record belongs to `person`
    ///
    /// An empty filter matches everything. Records with a person field are
    /// compared case-insensitively against it; records without one match
    /// when the name appears in the category or note.
    pub fn matches_person(&self, person: &str) -> bool {
        let wanted = person.trim().to_lowercase();
        if wanted.is_empty() {
            return true;
        }
        match &self.person {
            Some(p) => p.trim().to_lowercase() == wanted,
            None => {
                self.category.to_lowercase().contains(&wanted)
                    || self.note.to_lowercase().contains(&wanted)
            }
        }
    }
}
