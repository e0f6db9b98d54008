//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O.

mod ledger;
pub mod mapping;
pub mod result;
mod tabular;
mod transaction;

pub(crate) use ledger::accumulate;
pub use ledger::{CategoryTotal, DailyTotal, Detail, DetailEntry, LedgerParameters, Summary};
pub use mapping::{AliasTable, AmountColumns, CanonicalField, ColumnMapping};
pub use result::{Error, Result, RowParseError, RowParseReason};
pub use tabular::RawTabularInput;
pub use transaction::TransactionRecord;
