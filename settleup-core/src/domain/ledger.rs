//! Ledger parameters and results

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionRecord;

/// Inputs to a single ledger computation
///
/// `start` and `paid_on` default to the earliest and latest dates of the
/// records that survive the person filter. `start > paid_on` is allowed and
/// produces an empty window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParameters {
    #[serde(default)]
    pub person: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

impl LedgerParameters {
    pub fn new(person: impl Into<String>) -> Self {
        Self {
            person: person.into(),
            ..Self::default()
        }
    }

    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_paid_on(mut self, paid_on: NaiveDate) -> Self {
        self.paid_on = Some(paid_on);
        self
    }
}

/// Aggregate figures for one person over one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Filter that was applied (empty means every record)
    pub person: String,
    pub start: Option<NaiveDate>,
    pub paid_on: Option<NaiveDate>,
    /// Carried-forward balance from records strictly before `start`
    pub balance_at_start: Decimal,
    pub total_credits: Decimal,
    pub total_debits: Decimal,
    pub balance_at_paid_on: Decimal,
    /// Records inside the window
    pub count: usize,
    pub by_category: Vec<CategoryTotal>,
    pub by_date: Vec<DailyTotal>,
    /// Some sum went past the `Decimal` range and was clamped to its bound
    pub saturated: bool,
}

impl Summary {
    /// All-zero summary, used for empty and unmatched input
    pub fn empty(person: impl Into<String>, start: Option<NaiveDate>, paid_on: Option<NaiveDate>) -> Self {
        Self {
            person: person.into(),
            start,
            paid_on,
            balance_at_start: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            total_debits: Decimal::ZERO,
            balance_at_paid_on: Decimal::ZERO,
            count: 0,
            by_category: Vec::new(),
            by_date: Vec::new(),
            saturated: false,
        }
    }

    /// Net movement inside the window
    pub fn window_net(&self) -> Decimal {
        self.total_credits + self.total_debits
    }

    pub fn is_zero(&self) -> bool {
        self.count == 0
            && self.balance_at_start.is_zero()
            && self.balance_at_paid_on.is_zero()
            && self.total_credits.is_zero()
            && self.total_debits.is_zero()
    }
}

/// Window totals for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub credits: Decimal,
    pub debits: Decimal,
    pub net: Decimal,
    pub count: usize,
}

impl CategoryTotal {
    pub(crate) fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            credits: Decimal::ZERO,
            debits: Decimal::ZERO,
            net: Decimal::ZERO,
            count: 0,
        }
    }

    /// Returns true when a total had to be clamped
    pub(crate) fn add(&mut self, amount: Decimal) -> bool {
        let side = if amount > Decimal::ZERO {
            accumulate(&mut self.credits, amount)
        } else {
            accumulate(&mut self.debits, amount)
        };
        let net = accumulate(&mut self.net, amount);
        self.count += 1;
        side | net
    }
}

/// `*total += amount`, clamped to the `Decimal` range
///
/// Returns true when the exact sum did not fit.
pub(crate) fn accumulate(total: &mut Decimal, amount: Decimal) -> bool {
    match total.checked_add(amount) {
        Some(sum) => {
            *total = sum;
            false
        }
        None => {
            *total = total.saturating_add(amount);
            true
        }
    }
}

/// Window totals for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub net: Decimal,
    /// Running balance after the last record of the day
    pub closing_balance: Decimal,
    pub count: usize,
}

/// One window record with the running balance after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailEntry {
    #[serde(flatten)]
    pub record: TransactionRecord,
    #[serde(rename = "Running balance")]
    pub running_balance: Decimal,
}

/// Chronological window records
pub type Detail = Vec<DetailEntry>;
