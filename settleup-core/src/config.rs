//! Configuration management
//!
//! Settings live in `settings.json` inside the SettleUp directory:
//! ```json
//! {
//!   "defaultPerson": "Minh",
//!   "transactionsDir": "/home/minh/statements",
//!   "exportDir": "/home/minh/statements/out",
//!   "normalizer": { "extraAliases": { "Date": ["value date"] } }
//! }
//! ```
//! Keys the CLI does not manage are kept untouched on save.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::{AliasTable, CanonicalField};

pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transactions_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
    #[serde(default)]
    normalizer: NormalizerSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NormalizerSettings {
    #[serde(default)]
    extra_aliases: BTreeMap<CanonicalField, BTreeSet<String>>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// SettleUp configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Person used when `--person` is not given
    pub default_person: Option<String>,
    /// Where statement files are listed from (defaults to the SettleUp dir)
    pub transactions_dir: PathBuf,
    /// Where exports land when `--outdir` is not given
    pub export_dir: Option<PathBuf>,
    pub extra_aliases: BTreeMap<CanonicalField, BTreeSet<String>>,
    // Keep the raw settings for preservation when saving
    raw_settings: SettingsFile,
}

impl Config {
    /// Defaults for a SettleUp directory with no settings file
    pub fn for_dir(settle_dir: &Path) -> Self {
        Self {
            default_person: None,
            transactions_dir: settle_dir.to_path_buf(),
            export_dir: None,
            extra_aliases: BTreeMap::new(),
            raw_settings: SettingsFile::default(),
        }
    }

    /// Load config from the SettleUp directory
    ///
    /// The default person can be overridden with `SETTLEUP_PERSON`.
    pub fn load(settle_dir: &Path) -> Result<Self> {
        let mut config = Self::read(settle_dir)?;
        if let Ok(person) = std::env::var("SETTLEUP_PERSON") {
            if !person.trim().is_empty() {
                config.default_person = Some(person.trim().to_string());
            }
        }
        Ok(config)
    }

    /// Settings exactly as stored, without environment overrides
    ///
    /// This is what `save` should start from, so an override never ends up
    /// written to disk.
    pub fn read(settle_dir: &Path) -> Result<Self> {
        let settings_path = settle_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        // Relative paths are relative to the SettleUp directory
        let resolve = |p: &PathBuf| if p.is_absolute() { p.clone() } else { settle_dir.join(p) };

        Ok(Self {
            default_person: raw.default_person.clone().filter(|p| !p.trim().is_empty()),
            transactions_dir: raw
                .transactions_dir
                .as_ref()
                .map(resolve)
                .unwrap_or_else(|| settle_dir.to_path_buf()),
            export_dir: raw.export_dir.as_ref().map(resolve),
            extra_aliases: raw.normalizer.extra_aliases.clone(),
            raw_settings: raw,
        })
    }

    /// Save config to the SettleUp directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, settle_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(settle_dir)
            .with_context(|| format!("Failed to create {}", settle_dir.display()))?;

        let mut settings = self.raw_settings.clone();
        settings.default_person = self.default_person.clone();
        settings.transactions_dir =
            (self.transactions_dir != settle_dir).then(|| self.transactions_dir.clone());
        settings.export_dir = self.export_dir.clone();
        settings.normalizer.extra_aliases = self.extra_aliases.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        let mut tmp = NamedTempFile::new_in(settle_dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(settle_dir.join(SETTINGS_FILE))
            .map_err(|e| e.error)
            .context("Failed to write settings")?;
        Ok(())
    }

    /// Add a header alias for `field`; false when it was already configured
    pub fn add_alias(&mut self, field: CanonicalField, alias: &str) -> bool {
        let alias = alias.trim().to_lowercase();
        if alias.is_empty() {
            return false;
        }
        self.extra_aliases.entry(field).or_default().insert(alias)
    }

    /// Remove a configured header alias; false when it was not there
    pub fn remove_alias(&mut self, field: CanonicalField, alias: &str) -> bool {
        let alias = alias.trim().to_lowercase();
        let Some(set) = self.extra_aliases.get_mut(&field) else {
            return false;
        };
        let removed = set.remove(&alias);
        if set.is_empty() {
            self.extra_aliases.remove(&field);
        }
        removed
    }

    /// Alias table for the normalizer, built-ins plus configured extras
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::with_extra(&self.extra_aliases)
    }

    /// Export directory for a given input file
    pub fn export_dir_for(&self, input: &Path) -> PathBuf {
        match &self.export_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
