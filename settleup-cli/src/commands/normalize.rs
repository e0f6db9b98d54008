//! Normalize command - statement to canonical CSV

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use settleup_core::adapters::{csv_source, files};
use tracing::debug;

use super::get_context;
use crate::output;

/// Skipped rows shown before the rest are summarized
const SHOW_SKIPPED: usize = 10;

pub fn run(file: &Path, output_path: Option<&Path>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let normalized = ctx.load_statement(file)?;

    let out = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| files::canonical_path(file));
    if out == file {
        anyhow::bail!("Refusing to overwrite the input statement {}", file.display());
    }
    csv_source::write_canonical_file(&out, &normalized.records)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    debug!(output = %out.display(), "canonical csv written");

    if json {
        let result = json!({
            "input": file,
            "output": out,
            "records": normalized.records.len(),
            "skipped": normalized.skipped,
            "mapping": normalized.mapping,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let columns: Vec<String> = normalized
        .mapping
        .columns()
        .iter()
        .map(|(field, idx)| format!("{} <- column {}", field, idx + 1))
        .collect();
    println!("{}", "Columns".bold());
    for c in &columns {
        println!("  {}", c);
    }
    println!();

    output::success(&format!(
        "Wrote {} records to {}",
        normalized.records.len(),
        out.display()
    ));

    if !normalized.skipped.is_empty() {
        output::warning(&format!("Skipped {} rows:", normalized.skipped_count()));
        for err in normalized.skipped.iter().take(SHOW_SKIPPED) {
            println!("  {}", err);
        }
        if normalized.skipped_count() > SHOW_SKIPPED {
            println!("  ... and {} more", normalized.skipped_count() - SHOW_SKIPPED);
        }
    }
    Ok(())
}
