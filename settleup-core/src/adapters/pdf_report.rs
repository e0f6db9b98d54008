//! Printable settlement report (printpdf, builtin Helvetica)

use std::io::BufWriter;

use printpdf::*;

use crate::domain::{Error, Result};
use crate::services::export::{money, Report};

// A4 portrait, millimetres
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const LINE_H: f32 = 5.0;
const BODY_PT: f32 = 9.0;
const HEADING_PT: f32 = 10.0;
const TITLE_PT: f32 = 15.0;
// Average Helvetica glyph width per point of font size, in mm
const GLYPH_MM_PER_PT: f32 = 0.18;

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_MM_PER_PT
}

// Builtin fonts only cover Latin-1; wider text is cut to fit its column
fn fit(text: &str, width: f32) -> String {
    let max = (width / (BODY_PT * GLYPH_MM_PER_PT)).floor() as usize;
    if text.chars().count() <= max || max < 2 {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('~');
    cut
}

/// One table column; numeric columns are right-aligned
struct Column {
    heading: &'static str,
    width: f32,
    numeric: bool,
}

const fn text_col(heading: &'static str, width: f32) -> Column {
    Column { heading, width, numeric: false }
}

const fn num_col(heading: &'static str, width: f32) -> Column {
    Column { heading, width, numeric: true }
}

/// Top-down writer; `y` is the distance from the top edge
struct ReportPdf {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    page: PdfPageIndex,
    layer: PdfLayerIndex,
    y: f32,
}

impl ReportPdf {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "report");
        let font = |f| doc.add_builtin_font(f).map_err(|e| Error::pdf(format!("{e:?}")));
        let regular = font(BuiltinFont::Helvetica)?;
        let bold = font(BuiltinFont::HelveticaBold)?;
        Ok(Self { doc, regular, bold, page, layer, y: MARGIN })
    }

    fn layer(&self) -> PdfLayerReference {
        self.doc.get_page(self.page).get_layer(self.layer)
    }

    /// Start a new page unless `height` still fits; true when it broke
    fn reserve(&mut self, height: f32) -> bool {
        if self.y + height <= PAGE_H - MARGIN {
            return false;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "report");
        self.page = page;
        self.layer = layer;
        self.y = MARGIN;
        true
    }

    fn write(&self, text: &str, x: f32, size: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer().use_text(text, size, Mm(x), Mm(PAGE_H - self.y), font);
    }

    fn rule(&mut self) {
        let y = Mm(PAGE_H - self.y);
        let layer = self.layer();
        layer.set_outline_thickness(0.5);
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), y), false),
                (Point::new(Mm(PAGE_W - MARGIN), y), false),
            ],
            is_closed: false,
        });
        self.y += 2.0;
    }

    fn title_block(&mut self, title: &str, window: &str) {
        self.write(title, MARGIN, TITLE_PT, true);
        self.y += 7.0;
        self.write(&format!("Window: {window}"), MARGIN, HEADING_PT, false);
        self.y += LINE_H;
        self.rule();
        self.y += 3.0;
    }

    fn cells(&mut self, columns: &[Column], values: &[String], bold: bool) {
        let mut x = MARGIN;
        for (col, value) in columns.iter().zip(values) {
            let value = fit(value, col.width - 1.0);
            let offset = if col.numeric { col.width - text_width(&value, BODY_PT) } else { 0.0 };
            self.write(&value, x + offset, BODY_PT, bold);
            x += col.width;
        }
        self.y += LINE_H;
    }

    fn headings(&mut self, columns: &[Column]) {
        let headings: Vec<String> = columns.iter().map(|c| c.heading.to_string()).collect();
        self.cells(columns, &headings, true);
        self.rule();
    }

    /// Labelled table; headings are repeated on every page it spans
    fn table(&mut self, label: &str, columns: &[Column], rows: Vec<Vec<String>>) {
        self.reserve(LINE_H * 4.0);
        self.y += 3.0;
        self.write(label, MARGIN, HEADING_PT, true);
        self.y += LINE_H + 1.0;
        self.headings(columns);
        for row in rows {
            if self.reserve(LINE_H) {
                self.headings(columns);
            }
            self.cells(columns, &row, false);
        }
    }

    fn finish(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| Error::pdf(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| Error::pdf(e.to_string()))
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() { "-".to_string() } else { s.to_string() }
}

/// Render the totals, category and date breakdowns, and detail ledger
pub fn render(report: &Report<'_>) -> Result<Vec<u8>> {
    let title = report.title();
    let mut pdf = ReportPdf::new(&title)?;
    pdf.title_block(&title, &report.window());

    let totals = [text_col("", 60.0), num_col("", 40.0)];
    for (label, value) in report.totals() {
        pdf.cells(&totals, &[label.to_string(), value], label == "Balance at paid-on");
    }
    let summary = report.summary;
    if summary.saturated {
        pdf.write("Some totals exceeded the supported range and were clamped.", MARGIN, BODY_PT, true);
        pdf.y += LINE_H;
    }

    if !summary.by_category.is_empty() {
        let columns = [
            text_col("Category", 74.0),
            num_col("Credits", 28.0),
            num_col("Debits", 28.0),
            num_col("Net", 28.0),
            num_col("Count", 16.0),
        ];
        let rows = summary
            .by_category
            .iter()
            .map(|c| vec![or_dash(&c.category), money(c.credits), money(c.debits), money(c.net), c.count.to_string()])
            .collect();
        pdf.table("By category", &columns, rows);
    }

    if !summary.by_date.is_empty() {
        let columns = [
            text_col("Date", 30.0),
            num_col("Net", 34.0),
            num_col("Closing balance", 40.0),
            num_col("Count", 16.0),
        ];
        let rows = summary
            .by_date
            .iter()
            .map(|d| vec![d.date.to_string(), money(d.net), money(d.closing_balance), d.count.to_string()])
            .collect();
        pdf.table("By date", &columns, rows);
    }

    let columns = [
        text_col("Date", 22.0),
        text_col("Category", 38.0),
        text_col("Note", 58.0),
        num_col("Amount", 28.0),
        num_col("Balance", 28.0),
    ];
    let rows = report
        .detail
        .iter()
        .map(|e| {
            let r = &e.record;
            vec![r.date.to_string(), r.category.clone(), r.note.clone(), money(r.amount), money(e.running_balance)]
        })
        .collect();
    pdf.table("Detail", &columns, rows);

    pdf.finish()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::{LedgerParameters, TransactionRecord};
    use crate::ports::LedgerEngine;
    use crate::services::LedgerService;

    #[test]
    fn test_fit_truncates_long_cells() {
        assert_eq!(fit("short", 30.0), "short");
        let cut = fit(&"x".repeat(100), 20.0);
        assert!(cut.ends_with('~'));
        assert!(cut.chars().count() < 100);
    }

    #[test]
    fn test_render_produces_pdf_over_several_pages() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<TransactionRecord> = (0..120)
            .map(|i| {
                TransactionRecord::new(start + chrono::Duration::days(i), Decimal::new(-(i + 1) * 100, 2))
                    .with_category(if i % 2 == 0 { "Food" } else { "Transport" })
            })
            .collect();
        let (summary, detail) = LedgerService.compute_summary(&records, &LedgerParameters::default());

        let bytes = render(&Report::new("jan.csv", &summary, &detail)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
