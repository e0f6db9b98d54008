//! Tabular PDF statements
//!
//! Text is pulled out with `pdf-extract` and every line becomes a row.
//! Cells are runs of text separated by two or more spaces (or a tab). Blank
//! cells leave no trace in extracted text, so rows below the header are
//! re-aligned to the header columns by horizontal position.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::domain::{AliasTable, Error, RawTabularInput, Result};

/// A cell and its character columns within the line
#[derive(Debug, Clone, PartialEq)]
struct Span {
    text: String,
    start: usize,
    end: usize,
}

impl Span {
    fn center(&self) -> f32 {
        (self.start + self.end) as f32 / 2.0
    }
}

fn spans(line: &str, splitter: &Regex) -> Vec<Span> {
    let mut out = Vec::new();
    let mut from = 0;
    let mut push = |from: usize, to: usize| {
        let text = line[from..to].trim();
        if !text.is_empty() {
            let start = line[..from].chars().count() + (line[from..to].chars().count()
                - line[from..to].trim_start().chars().count());
            out.push(Span {
                text: text.to_string(),
                start,
                end: start + text.chars().count(),
            });
        }
    };
    for gap in splitter.find_iter(line) {
        push(from, gap.start());
        from = gap.end();
    }
    push(from, line.len());
    out
}

/// Place each cell under the header column whose center is closest
fn align(row: &[Span], header: &[Span]) -> Vec<String> {
    let mut cells = vec![String::new(); header.len()];
    for span in row {
        let nearest = header
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.center() - span.center())
                    .abs()
                    .total_cmp(&(b.center() - span.center()).abs())
            })
            .map(|(i, _)| i);
        if let Some(i) = nearest {
            if !cells[i].is_empty() {
                cells[i].push(' ');
            }
            cells[i].push_str(&span.text);
        }
    }
    cells
}

/// Turn extracted PDF text into rows of cells
pub fn table_from_text(text: &str, aliases: &AliasTable) -> Result<RawTabularInput> {
    let splitter = Regex::new(r"\s{2,}|\t").map_err(|e| Error::pdf(e.to_string()))?;
    let lines: Vec<Vec<Span>> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| spans(line, &splitter))
        .collect();

    let texts = |row: &[Span]| row.iter().map(|s| s.text.clone()).collect::<Vec<_>>();
    let header_idx = lines
        .iter()
        .position(|row| aliases.resolve(&texts(row)).is_ok());

    let skipped_above = header_idx.unwrap_or(0);
    let rows: Vec<Vec<String>> = match header_idx {
        Some(h) => {
            let header = &lines[h];
            lines[h..]
                .iter()
                .enumerate()
                .map(|(i, row)| if i == 0 || row.len() == header.len() { texts(row) } else { align(row, header) })
                .collect()
        }
        None => lines.iter().map(|row| texts(row)).collect(),
    };
    debug!(rows = rows.len(), header_found = header_idx.is_some(), "split pdf text into rows");
    Ok(RawTabularInput::new(rows).with_skipped_above(skipped_above))
}

pub fn read_table_file(path: &Path, aliases: &AliasTable) -> Result<RawTabularInput> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| Error::pdf(format!("{}: {e:?}", path.display())))?;
    table_from_text(&text, aliases)
}
