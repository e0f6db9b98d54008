//! Ledger service - settlement window computation

use std::collections::HashMap;

use tracing::{info, warn};

use crate::domain::{
    accumulate, CategoryTotal, DailyTotal, Detail, DetailEntry, LedgerParameters, Summary, TransactionRecord,
};
use crate::ports::LedgerEngine;

/// Running-balance ledger over a `[start, paid_on]` window
///
/// Records before `start` only feed the carried-forward balance; records
/// after `paid_on` are ignored. Sums that leave the `Decimal` range are
/// clamped to its bound and flagged with `Summary::saturated`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }
}

impl LedgerEngine for LedgerService {
    fn compute_summary(&self, records: &[TransactionRecord], params: &LedgerParameters) -> (Summary, Detail) {
        let person = params.person.trim();
        let mut filtered: Vec<&TransactionRecord> =
            records.iter().filter(|r| r.matches_person(person)).collect();
        // Stable: same-day records keep their input order
        filtered.sort_by_key(|r| r.date);

        let start = params.start.or_else(|| filtered.first().map(|r| r.date));
        let paid_on = params.paid_on.or_else(|| filtered.last().map(|r| r.date));
        let (Some(start), Some(paid_on)) = (start, paid_on) else {
            return (Summary::empty(person, start, paid_on), Vec::new());
        };

        let mut summary = Summary::empty(person, Some(start), Some(paid_on));
        let mut saturated = false;
        for record in filtered.iter().filter(|r| r.date < start) {
            saturated |= accumulate(&mut summary.balance_at_start, record.amount);
        }

        let mut running = summary.balance_at_start;
        let mut detail = Vec::new();
        let mut category_idx: HashMap<&str, usize> = HashMap::new();

        for record in filtered.iter().filter(|r| r.date >= start && r.date <= paid_on) {
            saturated |= accumulate(&mut running, record.amount);
            if record.is_credit() {
                saturated |= accumulate(&mut summary.total_credits, record.amount);
            } else {
                saturated |= accumulate(&mut summary.total_debits, record.amount);
            }
            summary.count += 1;

            let idx = *category_idx.entry(record.category.as_str()).or_insert_with(|| {
                summary.by_category.push(CategoryTotal::new(&record.category));
                summary.by_category.len() - 1
            });
            saturated |= summary.by_category[idx].add(record.amount);

            match summary.by_date.last_mut() {
                Some(day) if day.date == record.date => {
                    saturated |= accumulate(&mut day.net, record.amount);
                    day.closing_balance = running;
                    day.count += 1;
                }
                _ => summary.by_date.push(DailyTotal {
                    date: record.date,
                    net: record.amount,
                    closing_balance: running,
                    count: 1,
                }),
            }

            detail.push(DetailEntry {
                record: (*record).clone(),
                running_balance: running,
            });
        }
        summary.balance_at_paid_on = running;
        summary.saturated = saturated;
        if saturated {
            warn!(person = %person, "ledger totals exceeded the decimal range and were clamped");
        }

        info!(
            person = %person,
            %start,
            %paid_on,
            count = summary.count,
            balance = %summary.balance_at_paid_on,
            "computed ledger window"
        );

        (summary, detail)
    }
}
