//! Port definitions (hexagonal architecture)
//!
//! The shell depends only on these traits. Concrete engines live in
//! `services` and are injected through `SettleContext`.

mod engine;

pub use engine::{LedgerEngine, StatementNormalizer};
