//! Compute command - settlement summary for a person

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::Cell;
use serde_json::json;
use settleup_core::adapters::files::{file_stem, write_atomic};
use settleup_core::services::export;
use settleup_core::{ExportFormat, Report};
use tracing::debug;

use super::{get_context, parse_cli_date, resolve_file};
use crate::output::{self, create_table, money, num_cell};

pub struct ComputeArgs {
    pub file: Option<PathBuf>,
    pub person: Option<String>,
    pub start: Option<String>,
    pub paid_on: Option<String>,
    pub export: Vec<String>,
    pub outdir: Option<PathBuf>,
    pub json: bool,
}

/// Parse `--export` values, keeping first-seen order without duplicates
fn parse_formats(values: &[String]) -> Result<Vec<ExportFormat>> {
    let mut formats = Vec::new();
    for v in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        let f: ExportFormat = v.parse()?;
        if !formats.contains(&f) {
            formats.push(f);
        }
    }
    Ok(formats)
}

pub fn run(args: ComputeArgs) -> Result<()> {
    let ctx = get_context()?;
    let formats = parse_formats(&args.export)?;
    let start = parse_cli_date("--start", args.start.as_deref())?;
    let paid_on = parse_cli_date("--paid-on", args.paid_on.as_deref())?;

    let file = resolve_file(args.file, &ctx.config.transactions_dir)?;
    let normalized = ctx.load_statement(&file)?;
    let params = ctx.parameters(args.person.as_deref(), start, paid_on);
    let (summary, detail) = ctx.compute(&normalized.records, &params);

    let source = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let report = Report::new(&source, &summary, &detail);

    let outdir = args.outdir.unwrap_or_else(|| ctx.config.export_dir_for(&file));
    let mut written = Vec::new();
    let mut unavailable = Vec::new();
    for format in formats {
        if !format.is_available() {
            unavailable.push(format);
            continue;
        }
        let path = outdir.join(format.file_name(&file_stem(&file), &summary.person));
        let bytes = export::render(format, &report)?;
        write_atomic(&path, &bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(%format, path = %path.display(), "exported summary");
        written.push(path);
    }

    if args.json {
        let result = json!({
            "source": source,
            "summary": summary,
            "detail": detail,
            "skipped": normalized.skipped,
            "exports": written,
            "unavailable": unavailable,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !normalized.skipped.is_empty() {
        output::warning(&format!(
            "Skipped {} unparseable rows (run `settle normalize` for details)",
            normalized.skipped_count()
        ));
    }
    if summary.saturated {
        output::warning("Some totals exceeded the supported range and were clamped");
    }
    print_report(&report);

    for path in &written {
        output::success(&format!("Exported {}", path.display()));
    }
    for format in &unavailable {
        output::warning(&format!(
            "{} export skipped: {}",
            format.label(),
            format.unavailable_reason().unwrap_or("not available")
        ));
    }
    Ok(())
}

fn print_report(report: &Report<'_>) {
    let summary = report.summary;
    println!("{}", report.title().bold());
    println!("Window: {}", report.window());
    println!();

    let mut totals = create_table();
    totals.add_row(vec![Cell::new("Balance at start"), num_cell(money(summary.balance_at_start))]);
    totals.add_row(vec![Cell::new("Total credits"), num_cell(money(summary.total_credits))]);
    totals.add_row(vec![Cell::new("Total debits"), num_cell(money(summary.total_debits))]);
    totals.add_row(vec![
        Cell::new("Balance at paid-on".bold()),
        num_cell(money(summary.balance_at_paid_on).bold()),
    ]);
    totals.add_row(vec![Cell::new("Transactions"), num_cell(summary.count)]);
    println!("{}", totals);

    if summary.count == 0 {
        output::info("No transactions in this window.");
        return;
    }

    println!();
    println!("{}", "By category".bold());
    let mut categories = create_table();
    categories.set_header(vec!["Category", "Credits", "Debits", "Net", "Count"]);
    for cat in &summary.by_category {
        let name = if cat.category.is_empty() { "-" } else { cat.category.as_str() };
        categories.add_row(vec![
            Cell::new(name),
            num_cell(money(cat.credits)),
            num_cell(money(cat.debits)),
            num_cell(money(cat.net)),
            num_cell(cat.count),
        ]);
    }
    println!("{}", categories);

    println!();
    println!("{}", "By date".bold());
    let mut days = create_table();
    days.set_header(vec!["Date", "Net", "Closing balance", "Count"]);
    for day in &summary.by_date {
        days.add_row(vec![
            Cell::new(day.date),
            num_cell(money(day.net)),
            num_cell(money(day.closing_balance)),
            num_cell(day.count),
        ]);
    }
    println!("{}", days);

    println!();
    println!("{}", "Detail".bold());
    let mut table = create_table();
    table.set_header(vec!["Date", "Category", "Note", "Amount", "Balance"]);
    for entry in report.detail {
        let r = &entry.record;
        table.add_row(vec![
            Cell::new(r.date),
            Cell::new(&r.category),
            Cell::new(&r.note),
            num_cell(money(r.amount)),
            num_cell(money(entry.running_balance)),
        ]);
    }
    println!("{}", table);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats_dedups_and_validates() {
        let values = vec!["csv".to_string(), " MD ".to_string(), "csv".to_string(), String::new()];
        assert_eq!(
            parse_formats(&values).unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Markdown]
        );
        assert!(parse_formats(&["xlsx".to_string()]).is_err());
    }
}
