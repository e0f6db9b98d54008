//! Service layer - business logic orchestration
//!
//! Services implement the ports over domain types. Each service
//! focuses on a specific use case.

pub mod export;
mod ledger;
mod normalize;
pub mod parse;

pub use export::{ExportFormat, Report};
pub use ledger::LedgerService;
pub use normalize::{NormalizeService, Normalized};
