//! The two entry points of the core

use crate::domain::{Detail, LedgerParameters, RawTabularInput, Result, Summary, TransactionRecord};
use crate::services::Normalized;

/// Turns an arbitrary table into canonical transaction records
///
/// Fails only when the header cannot be mapped; rows that do not parse are
/// reported in [`Normalized::skipped`].
pub trait StatementNormalizer: Send + Sync {
    fn normalize(&self, raw: &RawTabularInput) -> Result<Normalized>;
}

/// Computes the settlement summary for one person over one window
///
/// Never fails: empty input, unmatched filters and inverted windows all
/// have a defined, zeroed result.
pub trait LedgerEngine: Send + Sync {
    fn compute_summary(&self, records: &[TransactionRecord], params: &LedgerParameters) -> (Summary, Detail);
}
