//! Raw tabular input, before any column mapping is applied

use super::mapping::AliasTable;

/// Rows of text cells; the first row is the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTabularInput {
    rows: Vec<Vec<String>>,
    /// Source rows dropped above the header
    skipped_above: usize,
}

impl RawTabularInput {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows, skipped_above: 0 }
    }

    /// Rows that start `skipped_above` rows into the source
    pub fn with_skipped_above(mut self, skipped_above: usize) -> Self {
        self.skipped_above = skipped_above;
        self
    }

    /// Build from borrowed cells (mostly for tests and in-memory callers)
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
            skipped_above: 0,
        }
    }

    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Data rows paired with their 1-based row number in the source
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        let base = self.skipped_above + 1;
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(move |(i, row)| (i + base, row.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop preamble rows above the first row that resolves to a column mapping
    ///
    /// Statement exports often start with account details. If no row
    /// resolves, the input is returned unchanged so the normalizer reports
    /// the schema error against the first row as read.
    pub fn locate_header(self, aliases: &AliasTable) -> Self {
        let found = self
            .rows
            .iter()
            .position(|row| aliases.resolve(row).is_ok());
        match found {
            Some(0) | None => self,
            Some(idx) => Self {
                rows: self.rows.into_iter().skip(idx).collect(),
                skipped_above: self.skipped_above + idx,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_rows_are_numbered_from_two() {
        let raw = RawTabularInput::from_rows([
            vec!["Date", "Amount"],
            vec!["2024-01-01", "1"],
            vec!["2024-01-02", "2"],
        ]);
        let lines: Vec<usize> = raw.data_rows().map(|(i, _)| i).collect();
        assert_eq!(lines, vec![2, 3]);
        assert_eq!(raw.header(), &["Date".to_string(), "Amount".to_string()]);
    }

    #[test]
    fn test_locate_header_skips_preamble() {
        let raw = RawTabularInput::from_rows([
            vec!["Account Name: Checking", ""],
            vec!["Statement period", "Jan 2024"],
            vec!["Date", "Amount"],
            vec!["2024-01-01", "1"],
        ]);
        let located = raw.locate_header(&AliasTable::default());
        assert_eq!(located.len(), 2);
        assert_eq!(located.header()[0], "Date");
        // Row numbers still point into the source
        let lines: Vec<usize> = located.data_rows().map(|(i, _)| i).collect();
        assert_eq!(lines, vec![4]);
    }

    #[test]
    fn test_locate_header_keeps_unresolvable_input() {
        let raw = RawTabularInput::from_rows([vec!["foo", "bar"], vec!["1", "2"]]);
        let located = raw.clone().locate_header(&AliasTable::default());
        assert_eq!(located, raw);
    }
}
