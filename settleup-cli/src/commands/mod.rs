//! CLI command implementations

pub mod compute;
pub mod config;
pub mod files;
pub mod formats;
pub mod normalize;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use dialoguer::Select;
use settleup_core::adapters::files::list_statements;
use settleup_core::services::parse::parse_date;
use settleup_core::SettleContext;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise warnings only, raised by `-v`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "settleup_core=debug,settle=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Get the SettleUp directory from environment or default
pub fn get_settle_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SETTLEUP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::home_dir()
        .context("Could not find home directory; set SETTLEUP_DIR")?
        .join(".settleup"))
}

/// Load settings and build the engines
pub fn get_context() -> Result<SettleContext> {
    let settle_dir = get_settle_dir()?;
    SettleContext::new(&settle_dir)
        .with_context(|| format!("Failed to load settings from {:?}", settle_dir))
}

/// Parse a date given on the command line, in any statement format
pub fn parse_cli_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(v) => match parse_date(v) {
            Some(d) => Ok(Some(d)),
            None => bail!("Invalid {} date '{}' (try YYYY-MM-DD)", flag, v),
        },
    }
}

/// Use the given file or let the user pick one from `dir`
pub fn resolve_file(file: Option<PathBuf>, dir: &Path) -> Result<PathBuf> {
    if let Some(file) = file {
        return Ok(file);
    }
    if atty::isnt(atty::Stream::Stdin) {
        bail!("No statement file given. Use --file or run interactively");
    }

    let statements = list_statements(dir)
        .with_context(|| format!("Failed to list statements in {}", dir.display()))?;
    if statements.is_empty() {
        bail!("No statement files in {}", dir.display());
    }
    let names: Vec<&str> = statements.iter().map(|s| s.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Statement file")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(statements[idx].path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_date() {
        assert_eq!(
            parse_cli_date("--start", Some("2024-01-31")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
        assert_eq!(parse_cli_date("--start", None).unwrap(), None);
        let err = parse_cli_date("--paid-on", Some("soon")).unwrap_err();
        assert!(err.to_string().contains("--paid-on"));
    }

    #[test]
    fn test_resolve_file_prefers_argument() {
        let path = resolve_file(Some(PathBuf::from("jan.csv")), Path::new("/nonexistent")).unwrap();
        assert_eq!(path, PathBuf::from("jan.csv"));
    }
}
