//! SettleUp Core - statement normalization and settlement ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (TransactionRecord, ColumnMapping, Summary, etc.)
//! - **ports**: Trait definitions for the two engines (StatementNormalizer, LedgerEngine)
//! - **services**: Engine implementations and report rendering
//! - **adapters**: Concrete I/O (CSV, PDF statements, PDF reports, files)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use config::Config;
use ports::{LedgerEngine, StatementNormalizer};
use services::{LedgerService, NormalizeService};

// Re-export commonly used types at crate root
pub use domain::{
    Detail, DetailEntry, LedgerParameters, RawTabularInput, RowParseError, Summary,
    TransactionRecord,
};
pub use domain::result::Error;
pub use services::{ExportFormat, Normalized, Report};

/// Main context for SettleUp operations
///
/// Holds the configuration and the two engines. Engines are shared behind
/// `Arc` and carry no per-call state, so one context serves any number of
/// computations.
pub struct SettleContext {
    pub config: Config,
    pub normalizer: Arc<dyn StatementNormalizer>,
    pub ledger: Arc<dyn LedgerEngine>,
}

impl SettleContext {
    /// Create a context from the settings in `settle_dir`
    pub fn new(settle_dir: &Path) -> Result<Self> {
        Ok(Self::from_config(Config::load(settle_dir)?))
    }

    /// Create a context with the built-in engines for an explicit config
    pub fn from_config(config: Config) -> Self {
        let normalizer = Arc::new(NormalizeService::new(config.alias_table()));
        Self::with_engines(config, normalizer, Arc::new(LedgerService::new()))
    }

    /// Create a context with caller-supplied engines
    pub fn with_engines(
        config: Config,
        normalizer: Arc<dyn StatementNormalizer>,
        ledger: Arc<dyn LedgerEngine>,
    ) -> Self {
        Self {
            config,
            normalizer,
            ledger,
        }
    }

    /// Read and normalize a CSV or PDF statement
    pub fn load_statement(&self, path: &Path) -> Result<Normalized> {
        let raw = adapters::files::read_statement(path, &self.config.alias_table())
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let normalized = self
            .normalizer
            .normalize(&raw)
            .with_context(|| format!("Failed to normalize {}", path.display()))?;
        Ok(normalized)
    }

    /// Ledger parameters with the configured default person filled in
    pub fn parameters(
        &self,
        person: Option<&str>,
        start: Option<NaiveDate>,
        paid_on: Option<NaiveDate>,
    ) -> LedgerParameters {
        let person = person
            .or(self.config.default_person.as_deref())
            .unwrap_or_default();
        LedgerParameters {
            person: person.trim().to_string(),
            start,
            paid_on,
        }
    }

    pub fn compute(&self, records: &[TransactionRecord], params: &LedgerParameters) -> (Summary, Detail) {
        self.ledger.compute_summary(records, params)
    }
}
