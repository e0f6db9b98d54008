//! Export service - render a computed summary to CSV, JSON, Markdown or PDF

use std::fmt::Write as _;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{DetailEntry, Error, Result, Summary};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Markdown,
    Pdf,
}

impl ExportFormat {
    /// Every format, available or not, in menu order
    pub fn all() -> &'static [ExportFormat] {
        &[Self::Csv, Self::Json, Self::Markdown, Self::Pdf]
    }

    /// Capability query: whether this build can produce the format
    pub fn is_available(&self) -> bool {
        match self {
            Self::Csv | Self::Json | Self::Markdown => true,
            Self::Pdf => cfg!(feature = "pdf"),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Markdown => "Markdown",
            Self::Pdf => "PDF",
        }
    }

    /// Why the format is missing from this build
    pub fn unavailable_reason(&self) -> Option<&'static str> {
        match self {
            Self::Pdf if !self.is_available() => Some("rebuild with the 'pdf' feature"),
            _ => None,
        }
    }

    /// Output file name: `<stem>.<person|all>.summary.<ext>`
    pub fn file_name(&self, stem: &str, person: &str) -> String {
        let who: String = person
            .trim()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let who = if who.is_empty() { "all".to_string() } else { who };
        format!("{}.{}.summary.{}", stem, who, self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "pdf" => Ok(Self::Pdf),
            other => Err(Error::Unsupported(format!("export format '{}'", other))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A computed result ready for rendering
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Report<'a> {
    /// Statement the records came from (file name, shown in titles)
    pub source: &'a str,
    pub summary: &'a Summary,
    pub detail: &'a [DetailEntry],
}

impl<'a> Report<'a> {
    pub fn new(source: &'a str, summary: &'a Summary, detail: &'a [DetailEntry]) -> Self {
        Self { source, summary, detail }
    }

    pub fn title(&self) -> String {
        if self.summary.person.is_empty() {
            format!("Summary - {}", self.source)
        } else {
            format!("Summary for {} - {}", self.summary.person, self.source)
        }
    }

    pub fn window(&self) -> String {
        match (self.summary.start, self.summary.paid_on) {
            (Some(start), Some(paid_on)) => format!("{} to {}", start, paid_on),
            _ => "no transactions".to_string(),
        }
    }

    /// Label/value rows for the totals block, shared by every renderer
    pub fn totals(&self) -> Vec<(&'static str, String)> {
        let s = self.summary;
        vec![
            ("Balance at start", money(s.balance_at_start)),
            ("Total credits", money(s.total_credits)),
            ("Total debits", money(s.total_debits)),
            ("Balance at paid-on", money(s.balance_at_paid_on)),
            ("Transactions", s.count.to_string()),
        ]
    }
}

/// Two-decimal display; stored values keep full precision
pub fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Render a report into the bytes of the given format
pub fn render(format: ExportFormat, report: &Report<'_>) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => render_csv(report),
        ExportFormat::Json => render_json(report),
        ExportFormat::Markdown => Ok(render_markdown(report).into_bytes()),
        #[cfg(feature = "pdf")]
        ExportFormat::Pdf => crate::adapters::pdf_report::render(report),
        #[cfg(not(feature = "pdf"))]
        ExportFormat::Pdf => Err(Error::Unsupported(
            "PDF export is not available in this build".to_string(),
        )),
    }
}

/// Sectioned CSV: detail rows, category rows, date rows, then totals
pub fn render_csv(report: &Report<'_>) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    wtr.write_record(["section", "date", "category", "note", "amount", "running_balance", "person"])?;
    for entry in report.detail {
        let r = &entry.record;
        wtr.write_record([
            "detail",
            &r.date.to_string(),
            &r.category,
            &r.note,
            &r.amount.to_string(),
            &entry.running_balance.to_string(),
            r.person.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.write_record(["section", "category", "credits", "debits", "net", "count"])?;
    for cat in &report.summary.by_category {
        wtr.write_record([
            "category",
            &cat.category,
            &cat.credits.to_string(),
            &cat.debits.to_string(),
            &cat.net.to_string(),
            &cat.count.to_string(),
        ])?;
    }

    wtr.write_record(["section", "date", "net", "closing_balance", "count"])?;
    for day in &report.summary.by_date {
        wtr.write_record([
            "date",
            &day.date.to_string(),
            &day.net.to_string(),
            &day.closing_balance.to_string(),
            &day.count.to_string(),
        ])?;
    }

    let s = report.summary;
    let opt_date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    wtr.write_record(["section", "field", "value"])?;
    for (field, value) in [
        ("person", s.person.clone()),
        ("start", opt_date(s.start)),
        ("paid_on", opt_date(s.paid_on)),
        ("balance_at_start", s.balance_at_start.to_string()),
        ("total_credits", s.total_credits.to_string()),
        ("total_debits", s.total_debits.to_string()),
        ("balance_at_paid_on", s.balance_at_paid_on.to_string()),
        ("count", s.count.to_string()),
        ("saturated", s.saturated.to_string()),
    ] {
        wtr.write_record(["total", field, value.as_str()])?;
    }

    wtr.into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

pub fn render_json(report: &Report<'_>) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

fn md_cell(s: &str) -> String {
    if s.is_empty() {
        return "-".to_string();
    }
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}

pub fn render_markdown(report: &Report<'_>) -> String {
    let s = report.summary;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# {}\n", report.title());
    let _ = writeln!(out, "Window: {}\n", report.window());
    if s.saturated {
        out.push_str("> Some totals exceeded the supported range and were clamped.\n\n");
    }

    out.push_str("## Totals\n\n| | Amount |\n|---|---:|\n");
    for (label, value) in report.totals() {
        let _ = writeln!(out, "| {} | {} |", label, value);
    }

    if !s.by_category.is_empty() {
        out.push_str("\n## By category\n\n| category | credits | debits | net | count |\n|---|---:|---:|---:|---:|\n");
        for cat in &s.by_category {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                md_cell(&cat.category),
                money(cat.credits),
                money(cat.debits),
                money(cat.net),
                cat.count
            );
        }
    }

    if !s.by_date.is_empty() {
        out.push_str("\n## By date\n\n| date | net | closing balance | count |\n|---|---:|---:|---:|\n");
        for day in &s.by_date {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                day.date,
                money(day.net),
                money(day.closing_balance),
                day.count
            );
        }
    }

    out.push_str("\n## Detail\n\n| date | category | note | amount | running balance |\n|---|---|---|---:|---:|\n");
    for entry in report.detail {
        let r = &entry.record;
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            r.date,
            md_cell(&r.category),
            md_cell(&r.note),
            money(r.amount),
            money(entry.running_balance)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{LedgerParameters, TransactionRecord};
    use crate::ports::LedgerEngine;
    use crate::services::LedgerService;

    fn computed() -> (Summary, Vec<DetailEntry>) {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let records = vec![
            TransactionRecord::new(d(5), Decimal::new(-2000, 2))
                .with_category("Food")
                .with_note("pho | tea"),
            TransactionRecord::new(d(10), Decimal::new(50000, 2)).with_category("Salary"),
        ];
        LedgerService.compute_summary(&records, &LedgerParameters::new("Minh").with_start(d(1)))
    }

    #[test]
    fn test_format_parsing_and_capabilities() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert!(ExportFormat::Csv.is_available());
        assert_eq!(ExportFormat::Pdf.is_available(), cfg!(feature = "pdf"));
        assert_eq!(ExportFormat::all().len(), 4);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ExportFormat::Csv.file_name("jan", "Quân"), "jan.Quân.summary.csv");
        assert_eq!(ExportFormat::Markdown.file_name("jan", ""), "jan.all.summary.md");
        assert_eq!(ExportFormat::Json.file_name("jan", "a/b"), "jan.a_b.summary.json");
    }

    #[test]
    fn test_csv_sections() {
        let (records_summary, detail) = {
            let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            let records = vec![
                TransactionRecord::new(d(5), Decimal::new(-2000, 2)).with_category("Food"),
                TransactionRecord::new(d(10), Decimal::new(50000, 2)).with_category("Salary"),
            ];
            LedgerService.compute_summary(&records, &LedgerParameters::default())
        };
        let report = Report::new("jan.csv", &records_summary, &detail);
        let text = String::from_utf8(render_csv(&report).unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "section,date,category,note,amount,running_balance,person");
        assert_eq!(lines[1], "detail,2024-01-05,Food,,-20.00,-20.00,");
        assert_eq!(lines[2], "detail,2024-01-10,Salary,,500.00,480.00,");
        assert!(text.contains("category,Food,0,-20.00,-20.00,1"));
        assert!(text.contains("section,date,net,closing_balance,count\n"));
        assert!(text.contains("date,2024-01-05,-20.00,-20.00,1\n"));
        assert!(text.contains("date,2024-01-10,500.00,480.00,1\n"));
        assert!(text.contains("total,balance_at_paid_on,480.00"));
        assert!(text.contains("total,saturated,false"));
    }

    #[test]
    fn test_json_has_summary_and_detail() {
        let (summary, detail) = computed();
        let report = Report::new("jan.csv", &summary, &detail);
        let value: serde_json::Value = serde_json::from_slice(&render_json(&report).unwrap()).unwrap();
        assert_eq!(value["source"], "jan.csv");
        assert_eq!(value["summary"]["person"], "Minh");
        assert!(value["detail"].is_array());
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let records = vec![TransactionRecord::new(d(5), Decimal::new(-2000, 2))
            .with_category("Food")
            .with_note("pho | tea")];
        let (summary, detail) = LedgerService.compute_summary(&records, &LedgerParameters::default());
        let md = render_markdown(&Report::new("jan.csv", &summary, &detail));

        assert!(md.starts_with("# Summary - jan.csv"));
        assert!(md.contains("| Balance at paid-on | -20.00 |"));
        assert!(md.contains("pho \\| tea"));
        assert!(md.contains("| Food | 0.00 | -20.00 | -20.00 | 1 |"));
        assert!(md.contains("## By date"));
        assert!(md.contains("| 2024-01-05 | -20.00 | -20.00 | 1 |"));
        assert!(!md.contains("clamped"));
    }

    #[test]
    fn test_markdown_flags_saturated_totals() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let records = vec![
            TransactionRecord::new(d, Decimal::MAX),
            TransactionRecord::new(d, Decimal::MAX),
        ];
        let (summary, detail) = LedgerService.compute_summary(&records, &LedgerParameters::default());
        let md = render_markdown(&Report::new("big.csv", &summary, &detail));
        assert!(md.contains("were clamped"));
        let csv = String::from_utf8(render_csv(&Report::new("big.csv", &summary, &detail)).unwrap()).unwrap();
        assert!(csv.contains("total,saturated,true"));
    }
}
