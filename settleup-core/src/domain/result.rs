//! Result and error types for the core library

use serde::Serialize;
use thiserror::Error;

use super::mapping::CanonicalField;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// No viable column mapping could be built from the header row
    #[error("Could not find required column(s) {} in header [{}]", format_fields(.missing), .headers.join(", "))]
    SchemaResolution {
        missing: Vec<CanonicalField>,
        headers: Vec<String>,
    },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a PDF error
    pub fn pdf(msg: impl Into<String>) -> Self {
        Self::Pdf(msg.into())
    }

    /// Fields the caller has to supply before the file can be normalized
    pub fn missing_fields(&self) -> &[CanonicalField] {
        match self {
            Self::SchemaResolution { missing, .. } => missing,
            _ => &[],
        }
    }
}

fn format_fields(fields: &[CanonicalField]) -> String {
    fields
        .iter()
        .map(|f| format!("'{}'", f.label()))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// A single row the normalizer had to drop
///
/// These are collected, never raised: the rows that did parse are still
/// returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowParseError {
    /// 1-based row in the source table, counting the header and any
    /// preamble rows above it; blank lines are not counted
    pub row: usize,
    pub reason: RowParseReason,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RowParseReason {
    InvalidDate(String),
    InvalidAmount(String),
    MissingAmount,
    /// Credit minus debit does not fit in a `Decimal`
    AmountOutOfRange { credit: String, debit: String },
}

impl std::fmt::Display for RowParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            RowParseReason::InvalidDate(v) => write!(f, "row {}: unrecognized date '{}'", self.row, v),
            RowParseReason::InvalidAmount(v) => write!(f, "row {}: unrecognized amount '{}'", self.row, v),
            RowParseReason::MissingAmount => write!(f, "row {}: amount is blank", self.row),
            RowParseReason::AmountOutOfRange { credit, debit } => write!(
                f,
                "row {}: credit '{}' minus debit '{}' is out of range",
                self.row, credit, debit
            ),
        }
    }
}
