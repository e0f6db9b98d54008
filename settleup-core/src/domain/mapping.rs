//! Canonical fields, the header alias table, and resolved column mappings

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Fields of the canonical transaction schema (plus the split amount pair)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CanonicalField {
    #[serde(rename = "Date", alias = "date")]
    Date,
    #[serde(rename = "Category name", alias = "category")]
    Category,
    #[serde(rename = "Note", alias = "note")]
    Note,
    #[serde(rename = "Amount", alias = "amount")]
    Amount,
    #[serde(rename = "Debit", alias = "debit")]
    Debit,
    #[serde(rename = "Credit", alias = "credit")]
    Credit,
    #[serde(rename = "Person", alias = "person")]
    Person,
}

impl CanonicalField {
    /// Header label used in canonical CSV output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Category => "Category name",
            Self::Note => "Note",
            Self::Amount => "Amount",
            Self::Debit => "Debit",
            Self::Credit => "Credit",
            Self::Person => "Person",
        }
    }
}

impl std::str::FromStr for CanonicalField {
    type Err = String;

    /// Accepts the canonical label or the short name, in any case
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "category" | "category name" => Ok(Self::Category),
            "note" => Ok(Self::Note),
            "amount" => Ok(Self::Amount),
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            "person" => Ok(Self::Person),
            other => Err(format!(
                "unknown field '{}' (expected date, category, note, amount, debit, credit or person)",
                other
            )),
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alias {
    text: String,
    /// Short aliases would match inside unrelated words ("dr" in "address")
    exact_only: bool,
}

/// Built-in aliases. Entries ending in '=' are exact-only.
const BUILTIN_ALIASES: &[(CanonicalField, &[&str])] = &[
    (CanonicalField::Date, &["date", "transaction date", "posting date", "ngày", "tanggal"]),
    (CanonicalField::Category, &["category", "category name", "danh mục", "loại=", "type="]),
    (
        CanonicalField::Note,
        &["note", "description", "memo", "details", "content", "narration", "ghi chú"],
    ),
    (CanonicalField::Amount, &["amount", "value", "total", "số tiền", "giá trị"]),
    (CanonicalField::Debit, &["debit", "withdrawal", "dr=", "chi=", "nợ="]),
    (CanonicalField::Credit, &["credit", "deposit", "cr=", "thu=", "có="]),
    (CanonicalField::Person, &["person", "payer", "paid by", "người"]),
];

/// Ordered alias table consulted with first-match-wins scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(CanonicalField, Vec<Alias>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|(field, aliases)| {
                let aliases = aliases
                    .iter()
                    .map(|a| match a.strip_suffix('=') {
                        Some(text) => Alias { text: text.to_string(), exact_only: true },
                        None => Alias { text: a.to_string(), exact_only: false },
                    })
                    .collect();
                (*field, aliases)
            })
            .collect();
        Self { entries }
    }
}

impl AliasTable {
    /// Built-in table with caller-supplied aliases merged in
    pub fn with_extra(extra: &BTreeMap<CanonicalField, BTreeSet<String>>) -> Self {
        let mut table = Self::default();
        table.extend(extra);
        table
    }

    /// Merge extra aliases additively; existing aliases are never removed
    pub fn extend(&mut self, extra: &BTreeMap<CanonicalField, BTreeSet<String>>) {
        for (field, names) in extra {
            let pos = match self.entries.iter().position(|(f, _)| f == field) {
                Some(pos) => pos,
                None => {
                    self.entries.push((*field, Vec::new()));
                    self.entries.len() - 1
                }
            };
            let aliases = &mut self.entries[pos].1;
            for name in names {
                let text = normalize_header(name);
                if !text.is_empty() && !aliases.iter().any(|a| a.text == text) {
                    aliases.push(Alias { text, exact_only: false });
                }
            }
        }
    }

    fn aliases(&self, field: CanonicalField) -> &[Alias] {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| a.as_slice())
            .unwrap_or(&[])
    }

    /// Leftmost unclaimed column matching `field`, exact matches first
    fn find(&self, field: CanonicalField, headers: &[String], claimed: &HashSet<usize>) -> Option<usize> {
        let aliases = self.aliases(field);
        let unclaimed = move || headers.iter().enumerate().filter(move |(i, _)| !claimed.contains(i));

        unclaimed()
            .find(|(_, h)| aliases.iter().any(|a| a.text == **h))
            .or_else(|| {
                unclaimed().find(|(_, h)| {
                    aliases.iter().any(|a| !a.exact_only && h.contains(a.text.as_str()))
                })
            })
            .map(|(i, _)| i)
    }

    /// Resolve a header row into a column mapping
    ///
    /// Resolution order is Date, Debit/Credit, Amount, Category, Note,
    /// Person; a column taken by one field is not offered to later ones. A
    /// Debit/Credit pair wins over a combined Amount column, and a lone
    /// Debit or Credit is released so Amount can still claim it.
    pub fn resolve(&self, header: &[String]) -> Result<ColumnMapping> {
        let headers: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
        let mut claimed = HashSet::new();

        let take = |field: CanonicalField, claimed: &mut HashSet<usize>| {
            let idx = self.find(field, &headers, claimed);
            if let Some(i) = idx {
                claimed.insert(i);
            }
            idx
        };

        let date = take(CanonicalField::Date, &mut claimed);
        let debit = take(CanonicalField::Debit, &mut claimed);
        let credit = take(CanonicalField::Credit, &mut claimed);

        let amount = match (debit, credit) {
            (Some(debit), Some(credit)) => Some(AmountColumns::Split { debit, credit }),
            (debit, credit) => {
                for idx in debit.into_iter().chain(credit) {
                    claimed.remove(&idx);
                }
                take(CanonicalField::Amount, &mut claimed).map(AmountColumns::Single)
            }
        };

        let (date, amount) = match (date, amount) {
            (Some(date), Some(amount)) => (date, amount),
            (date, amount) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push(CanonicalField::Date);
                }
                if amount.is_none() {
                    missing.push(CanonicalField::Amount);
                }
                return Err(Error::SchemaResolution {
                    missing,
                    headers: header.to_vec(),
                });
            }
        };

        let category = take(CanonicalField::Category, &mut claimed);
        let note = take(CanonicalField::Note, &mut claimed);
        let person = take(CanonicalField::Person, &mut claimed);

        Ok(ColumnMapping {
            date,
            amount,
            category,
            note,
            person,
        })
    }
}

/// Lowercase, strip a byte-order mark, collapse inner whitespace
pub(crate) fn normalize_header(h: &str) -> String {
    h.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Where the signed amount comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountColumns {
    Single(usize),
    Split { debit: usize, credit: usize },
}

/// Canonical field to column index, resolved once per input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub date: usize,
    pub amount: AmountColumns,
    pub category: Option<usize>,
    pub note: Option<usize>,
    pub person: Option<usize>,
}

impl ColumnMapping {
    /// Resolved fields paired with their column index, in schema order
    pub fn columns(&self) -> Vec<(CanonicalField, usize)> {
        let mut cols = vec![(CanonicalField::Date, self.date)];
        cols.extend(self.category.map(|i| (CanonicalField::Category, i)));
        cols.extend(self.note.map(|i| (CanonicalField::Note, i)));
        match self.amount {
            AmountColumns::Single(i) => cols.push((CanonicalField::Amount, i)),
            AmountColumns::Split { debit, credit } => {
                cols.push((CanonicalField::Debit, debit));
                cols.push((CanonicalField::Credit, credit));
            }
        }
        cols.extend(self.person.map(|i| (CanonicalField::Person, i)));
        cols
    }

    pub fn is_split(&self) -> bool {
        matches!(self.amount, AmountColumns::Split { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_resolves_canonical_header() {
        let mapping = AliasTable::default()
            .resolve(&header(&["Date", "Category name", "Note", "Amount"]))
            .unwrap();
        assert_eq!(mapping.date, 0);
        assert_eq!(mapping.category, Some(1));
        assert_eq!(mapping.note, Some(2));
        assert_eq!(mapping.amount, AmountColumns::Single(3));
        assert_eq!(mapping.person, None);
    }

    #[test]
    fn test_prefers_split_pair_over_amount() {
        let mapping = AliasTable::default()
            .resolve(&header(&["Posting Date", "Amount", "Withdrawal", "Deposit", "Description"]))
            .unwrap();
        assert_eq!(mapping.amount, AmountColumns::Split { debit: 2, credit: 3 });
        assert_eq!(mapping.note, Some(4));
        assert!(mapping.is_split());
    }

    #[test]
    fn test_lone_credit_column_is_released_to_amount() {
        let mapping = AliasTable::default()
            .resolve(&header(&["Date", "Credit Amount"]))
            .unwrap();
        assert_eq!(mapping.amount, AmountColumns::Single(1));
    }

    #[test]
    fn test_exact_match_beats_leftmost_substring() {
        // "Value Date" contains the "value" amount alias, but "Amount" is exact
        let mapping = AliasTable::default()
            .resolve(&header(&["Transaction Date", "Value Date", "Details", "Amount"]))
            .unwrap();
        assert_eq!(mapping.date, 0);
        assert_eq!(mapping.amount, AmountColumns::Single(3));
        assert_eq!(mapping.note, Some(2));
    }

    #[test]
    fn test_leftmost_wins_on_ambiguity() {
        let mapping = AliasTable::default()
            .resolve(&header(&["Booking Date", "Value Date", "Amount"]))
            .unwrap();
        assert_eq!(mapping.date, 0);
    }

    #[test]
    fn test_short_aliases_are_exact_only() {
        // "address" contains "dr" and "description" contains "cr"
        let err = AliasTable::default()
            .resolve(&header(&["Date", "Address", "Description"]))
            .unwrap_err();
        assert_eq!(err.missing_fields(), &[CanonicalField::Amount]);

        let mapping = AliasTable::default()
            .resolve(&header(&["Date", "Dr", "Cr"]))
            .unwrap();
        assert_eq!(mapping.amount, AmountColumns::Split { debit: 1, credit: 2 });
    }

    #[test]
    fn test_vietnamese_headers() {
        let mapping = AliasTable::default()
            .resolve(&header(&["Ngày giao dịch", "Ghi chú", "Nợ", "Có"]))
            .unwrap();
        assert_eq!(mapping.date, 0);
        assert_eq!(mapping.note, Some(1));
        assert_eq!(mapping.amount, AmountColumns::Split { debit: 2, credit: 3 });
    }

    #[test]
    fn test_missing_date_and_amount() {
        let err = AliasTable::default().resolve(&header(&["foo", "bar"])).unwrap_err();
        assert_eq!(err.missing_fields(), &[CanonicalField::Date, CanonicalField::Amount]);
    }

    #[test]
    fn test_extra_aliases_are_additive() {
        let mut extra = BTreeMap::new();
        extra.insert(CanonicalField::Amount, BTreeSet::from(["Betrag".to_string()]));
        extra.insert(CanonicalField::Date, BTreeSet::from(["Buchungstag".to_string()]));
        let table = AliasTable::with_extra(&extra);

        let mapping = table.resolve(&header(&["Buchungstag", "Betrag"])).unwrap();
        assert_eq!(mapping.date, 0);
        assert_eq!(mapping.amount, AmountColumns::Single(1));

        // Built-ins still work
        assert!(table.resolve(&header(&["Date", "Amount"])).is_ok());
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("Category name".parse::<CanonicalField>(), Ok(CanonicalField::Category));
        assert_eq!(" DEBIT ".parse::<CanonicalField>(), Ok(CanonicalField::Debit));
        assert!("when".parse::<CanonicalField>().is_err());
    }

    #[test]
    fn test_header_normalization() {
        assert_eq!(normalize_header("\u{feff}  Category   Name "), "category name");
    }

    #[test]
    fn test_extra_aliases_deserialize_from_labels() {
        let json = r#"{"Category name": ["Kategorie"], "amount": ["Betrag"]}"#;
        let extra: BTreeMap<CanonicalField, BTreeSet<String>> = serde_json::from_str(json).unwrap();
        assert!(extra.contains_key(&CanonicalField::Category));
        assert!(extra.contains_key(&CanonicalField::Amount));
    }
}
