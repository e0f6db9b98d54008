//! Normalize service - arbitrary statement tables to canonical records

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::mapping::normalize_header;
use crate::domain::{
    AliasTable, AmountColumns, ColumnMapping, RawTabularInput, Result, RowParseError, RowParseReason,
    TransactionRecord,
};
use crate::ports::StatementNormalizer;
use crate::services::parse::{parse_amount, parse_date};

/// Output of one normalization call
#[derive(Debug, Clone, Serialize)]
pub struct Normalized {
    /// Records in input row order
    pub records: Vec<TransactionRecord>,
    /// Rows dropped because their date or amount did not parse
    pub skipped: Vec<RowParseError>,
    pub mapping: ColumnMapping,
}

impl Normalized {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Header-alias driven normalizer
#[derive(Debug, Clone, Default)]
pub struct NormalizeService {
    aliases: AliasTable,
}

impl NormalizeService {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    fn parse_row(
        &self,
        line: usize,
        row: &[String],
        mapping: &ColumnMapping,
    ) -> std::result::Result<TransactionRecord, RowParseError> {
        let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");
        let fail = |reason| RowParseError {
            row: line,
            reason,
            cells: row.to_vec(),
        };

        let date_cell = cell(mapping.date);
        let date = parse_date(date_cell)
            .ok_or_else(|| fail(RowParseReason::InvalidDate(date_cell.to_string())))?;

        let amount = match mapping.amount {
            AmountColumns::Single(idx) => {
                let raw = cell(idx);
                if raw.is_empty() {
                    return Err(fail(RowParseReason::MissingAmount));
                }
                parse_amount(raw).ok_or_else(|| fail(RowParseReason::InvalidAmount(raw.to_string())))?
            }
            AmountColumns::Split { debit, credit } => {
                let side = |idx: usize| -> std::result::Result<Decimal, RowParseError> {
                    let raw = cell(idx);
                    if raw.is_empty() {
                        return Ok(Decimal::ZERO);
                    }
                    parse_amount(raw).ok_or_else(|| fail(RowParseReason::InvalidAmount(raw.to_string())))
                };
                // Debit cells are magnitudes whatever sign the bank printed
                side(credit)?
                    .checked_sub(side(debit)?.abs())
                    .ok_or_else(|| {
                        fail(RowParseReason::AmountOutOfRange {
                            credit: cell(credit).to_string(),
                            debit: cell(debit).to_string(),
                        })
                    })?
            }
        };

        let text = |idx: Option<usize>| idx.map(|i| cell(i).to_string()).unwrap_or_default();
        let person = mapping
            .person
            .map(|i| cell(i).to_string())
            .filter(|p| !p.is_empty());

        Ok(TransactionRecord {
            date,
            category: text(mapping.category),
            note: text(mapping.note),
            amount,
            person,
        })
    }
}

impl StatementNormalizer for NormalizeService {
    fn normalize(&self, raw: &RawTabularInput) -> Result<Normalized> {
        let header = raw.header();
        let mapping = self.aliases.resolve(header)?;
        info!(
            columns = ?mapping.columns(),
            split = mapping.is_split(),
            "resolved statement columns"
        );

        let header_key: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (line, row) in raw.data_rows() {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            // Multi-page statements repeat the header on every page
            if row.len() == header_key.len()
                && row.iter().zip(&header_key).all(|(c, h)| normalize_header(c) == *h)
            {
                continue;
            }
            match self.parse_row(line, row, &mapping) {
                Ok(record) => records.push(record),
                Err(err) => {
                    debug!("skipping {}", err);
                    skipped.push(err);
                }
            }
        }

        info!(
            records = records.len(),
            skipped = skipped.len(),
            "normalized statement"
        );

        Ok(Normalized {
            records,
            skipped,
            mapping,
        })
    }
}
