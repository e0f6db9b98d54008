//! Statement files on disk

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::{AliasTable, Error, RawTabularInput, Result};

/// Kind of statement file, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Csv,
    Pdf,
}

impl StatementKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" | "txt" | "tsv" => Some(Self::Csv),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A statement file found in the transactions directory
#[derive(Debug, Clone, Serialize)]
pub struct StatementFile {
    pub path: PathBuf,
    pub name: String,
    pub kind: StatementKind,
    pub size: u64,
}

/// List statement files in `dir`, sorted by name
///
/// Generated summaries (`*.summary.*`) are not statements and are left out.
pub fn list_statements(dir: &Path) -> Result<Vec<StatementFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(kind) = StatementKind::from_path(&path) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().to_string();
        if name.contains(".summary.") {
            continue;
        }
        files.push(StatementFile {
            size: entry.metadata()?.len(),
            path,
            name,
            kind,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Read any supported statement into a raw table with preamble rows dropped
pub fn read_statement(path: &Path, aliases: &AliasTable) -> Result<RawTabularInput> {
    let kind = StatementKind::from_path(path).ok_or_else(|| {
        Error::Unsupported(format!("statement type of '{}'", path.display()))
    })?;
    debug!(path = %path.display(), ?kind, "reading statement");

    let raw = match kind {
        StatementKind::Csv => super::csv_source::read_table_file(path)?,
        #[cfg(feature = "pdf")]
        StatementKind::Pdf => super::pdf_source::read_table_file(path, aliases)?,
        #[cfg(not(feature = "pdf"))]
        StatementKind::Pdf => {
            return Err(Error::Unsupported(
                "PDF statements are not available in this build".to_string(),
            ))
        }
    };
    Ok(raw.locate_header(aliases))
}

/// Default canonical CSV path for a statement
///
/// `<stem>.csv` next to a PDF; `<stem>.normalized.csv` next to a CSV so the
/// source is never overwritten.
pub fn canonical_path(input: &Path) -> PathBuf {
    let stem = file_stem(input);
    let name = match StatementKind::from_path(input) {
        Some(StatementKind::Pdf) => format!("{}.csv", stem),
        _ => format!("{}.normalized.csv", stem),
    };
    input.with_file_name(name)
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "statement".to_string())
}

/// Write-to-temp-then-rename so readers never see a partial file
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_statement_kind() {
        assert_eq!(StatementKind::from_path(Path::new("a/jan.CSV")), Some(StatementKind::Csv));
        assert_eq!(StatementKind::from_path(Path::new("jan.pdf")), Some(StatementKind::Pdf));
        assert_eq!(StatementKind::from_path(Path::new("jan.xlsx")), None);
        assert_eq!(StatementKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path(Path::new("/s/jan.pdf")), PathBuf::from("/s/jan.csv"));
        assert_eq!(canonical_path(Path::new("/s/jan.csv")), PathBuf::from("/s/jan.normalized.csv"));
    }

    #[test]
    fn test_list_statements_skips_summaries_and_others() {
        let dir = TempDir::new().unwrap();
        for name in ["b.csv", "a.pdf", "a.Lan.summary.csv", "notes.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.csv")).unwrap();

        let files = list_statements(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.csv"]);
        assert_eq!(files[0].kind, StatementKind::Pdf);
    }

    #[test]
    fn test_read_statement_drops_preamble() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.csv");
        std::fs::write(
            &path,
            "Account,12345\nPeriod,January\nDate,Description,Amount\n2024-01-05,Coffee,-3.50\n",
        )
        .unwrap();

        let raw = read_statement(&path, &AliasTable::default()).unwrap();
        assert_eq!(raw.header(), &["Date", "Description", "Amount"]);
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_read_statement_unknown_type() {
        let err = read_statement(Path::new("jan.xlsx"), &AliasTable::default()).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }
}
