//! Adapter implementations
//!
//! Adapters move statements and reports between the filesystem and the
//! domain types:
//! - CSV statements in and canonical CSV out
//! - Tabular PDF statements in (feature `pdf`)
//! - Printable PDF reports out (feature `pdf`)
//! - Directory listing and atomic file writes

pub mod csv_source;
pub mod files;
#[cfg(feature = "pdf")]
pub mod pdf_report;
#[cfg(feature = "pdf")]
pub mod pdf_source;
