//! Config command - view and edit settings.json

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;
use settleup_core::config::{Config, SETTINGS_FILE};
use settleup_core::domain::CanonicalField;

use super::get_settle_dir;
use crate::output::{self, create_table};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the stored settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Person used when --person is not given (no name clears it)
    SetPerson { name: Option<String> },
    /// Directory statement files are listed from (no path resets it)
    SetTransactionsDir { dir: Option<PathBuf> },
    /// Directory exports are written to (no path means next to the statement)
    SetExportDir { dir: Option<PathBuf> },
    /// Teach the normalizer another header name for a field
    AddAlias { field: CanonicalField, alias: String },
    /// Forget a configured header name
    RemoveAlias { field: CanonicalField, alias: String },
}

pub fn run(command: Option<ConfigCommands>) -> Result<()> {
    let settle_dir = get_settle_dir()?;
    // Stored values only; SETTLEUP_PERSON must not be written back
    let mut config = Config::read(&settle_dir)?;

    let command = command.unwrap_or(ConfigCommands::Show { json: false });
    if let ConfigCommands::Show { json } = command {
        return show(&config, &settle_dir, json);
    }

    let message = apply(&mut config, &settle_dir, command);
    config.save(&settle_dir)?;
    output::success(&message);
    Ok(())
}

/// Apply one edit and describe it
fn apply(config: &mut Config, settle_dir: &Path, command: ConfigCommands) -> String {
    match command {
        ConfigCommands::Show { .. } => String::new(),
        ConfigCommands::SetPerson { name } => {
            config.default_person = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
            match &config.default_person {
                Some(name) => format!("Default person set to {}", name),
                None => "Default person cleared".to_string(),
            }
        }
        ConfigCommands::SetTransactionsDir { dir } => {
            config.transactions_dir = dir.unwrap_or_else(|| settle_dir.to_path_buf());
            format!("Statements are listed from {}", config.transactions_dir.display())
        }
        ConfigCommands::SetExportDir { dir } => {
            config.export_dir = dir;
            match &config.export_dir {
                Some(dir) => format!("Exports go to {}", dir.display()),
                None => "Exports go next to each statement".to_string(),
            }
        }
        ConfigCommands::AddAlias { field, alias } => {
            if config.add_alias(field, &alias) {
                format!("'{}' now maps to {}", alias.trim(), field)
            } else {
                format!("'{}' was already an alias for {}", alias.trim(), field)
            }
        }
        ConfigCommands::RemoveAlias { field, alias } => {
            if config.remove_alias(field, &alias) {
                format!("'{}' no longer maps to {}", alias.trim(), field)
            } else {
                format!("'{}' was not a configured alias for {}", alias.trim(), field)
            }
        }
    }
}

fn show(config: &Config, settle_dir: &Path, json: bool) -> Result<()> {
    if json {
        let result = json!({
            "settingsFile": settle_dir.join(SETTINGS_FILE),
            "defaultPerson": config.default_person,
            "transactionsDir": config.transactions_dir,
            "exportDir": config.export_dir,
            "extraAliases": config.extra_aliases,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", settle_dir.join(SETTINGS_FILE).display().to_string().bold());
    let mut table = create_table();
    table.add_row(vec![
        "Default person".to_string(),
        config.default_person.clone().unwrap_or_else(|| "(everyone)".to_string()),
    ]);
    table.add_row(vec![
        "Transactions dir".to_string(),
        config.transactions_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Export dir".to_string(),
        config
            .export_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(next to statement)".to_string()),
    ]);
    println!("{}", table);

    if config.extra_aliases.is_empty() {
        output::info("No extra header aliases configured.");
        return Ok(());
    }
    let mut aliases = create_table();
    aliases.set_header(vec!["Field", "Extra aliases"]);
    for (field, names) in &config.extra_aliases {
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        aliases.add_row(vec![field.label().to_string(), names.join(", ")]);
    }
    println!("{}", aliases);
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_edits_change_config() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::for_dir(dir.path());

        let msg = apply(&mut config, dir.path(), ConfigCommands::SetPerson { name: Some(" Lan ".to_string()) });
        assert_eq!(config.default_person.as_deref(), Some("Lan"));
        assert_eq!(msg, "Default person set to Lan");

        apply(&mut config, dir.path(), ConfigCommands::SetPerson { name: None });
        assert_eq!(config.default_person, None);

        let msg = apply(
            &mut config,
            dir.path(),
            ConfigCommands::AddAlias { field: CanonicalField::Date, alias: "Booked".to_string() },
        );
        assert!(msg.contains("now maps to Date"));
        assert!(config.extra_aliases[&CanonicalField::Date].contains("booked"));

        apply(&mut config, dir.path(), ConfigCommands::SetTransactionsDir { dir: None });
        assert_eq!(config.transactions_dir, dir.path());
    }
}
