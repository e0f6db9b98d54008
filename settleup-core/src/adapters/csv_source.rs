//! CSV statements in, canonical CSV out

use std::io;
use std::path::Path;

use tracing::debug;

use crate::domain::{CanonicalField, RawTabularInput, Result, TransactionRecord};
use crate::services::parse::format_amount;

use super::files::write_atomic;

const DELIMITERS: &[u8] = b",;\t|";

/// Pick the delimiter that splits the first non-empty line the most
///
/// European bank exports use `;` because `,` is their decimal mark.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };
    let mut best = (b',', 0);
    let mut in_quotes = false;
    let mut counts = [0usize; DELIMITERS.len()];
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(i) = DELIMITERS.iter().position(|d| *d == b) {
                counts[i] += 1;
            }
        }
    }
    for (i, count) in counts.iter().enumerate() {
        if *count > best.1 {
            best = (DELIMITERS[i], *count);
        }
    }
    best.0
}

/// Parse CSV text into raw rows; ragged rows are kept as-is
pub fn read_table_str(text: &str) -> Result<RawTabularInput> {
    let delimiter = sniff_delimiter(text);
    debug!(delimiter = %(delimiter as char), "reading csv table");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTabularInput::new(rows))
}

/// Read a CSV statement from disk
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected;
/// older exports are often Windows-1252.
pub fn read_table_file(path: &Path) -> Result<RawTabularInput> {
    let bytes = std::fs::read(path)?;
    read_table_str(&String::from_utf8_lossy(&bytes))
}

/// Whether any record carries a person, so the Person column is written
fn has_person(records: &[TransactionRecord]) -> bool {
    records.iter().any(|r| r.person.is_some())
}

/// Write records in the canonical schema
///
/// Amounts go through [`format_amount`] so reading the file back gives the
/// same records.
pub fn write_canonical<W: io::Write>(writer: W, records: &[TransactionRecord]) -> Result<()> {
    let with_person = has_person(records);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec![
        CanonicalField::Date.label(),
        CanonicalField::Category.label(),
        CanonicalField::Note.label(),
        CanonicalField::Amount.label(),
    ];
    if with_person {
        header.push(CanonicalField::Person.label());
    }
    wtr.write_record(&header)?;

    for r in records {
        let date = r.date.format("%Y-%m-%d").to_string();
        let amount = format_amount(r.amount);
        let mut row = vec![date.as_str(), r.category.as_str(), r.note.as_str(), amount.as_str()];
        if with_person {
            row.push(r.person.as_deref().unwrap_or(""));
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Canonical CSV as bytes
pub fn canonical_bytes(records: &[TransactionRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_canonical(&mut buf, records)?;
    Ok(buf)
}

/// Write the canonical CSV cache with an atomic replace
pub fn write_canonical_file(path: &Path, records: &[TransactionRecord]) -> Result<()> {
    write_atomic(path, &canonical_bytes(records)?)
}
