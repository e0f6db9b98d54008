//! Files command - list statement files

use anyhow::{Context, Result};
use colored::Colorize;
use settleup_core::adapters::files::list_statements;

use super::get_context;
use crate::output::{self, create_table, format_size};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let dir = &ctx.config.transactions_dir;
    let files = list_statements(dir)
        .with_context(|| format!("Failed to list statements in {}", dir.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        output::warning(&format!("No statement files in {}", dir.display()));
        return Ok(());
    }

    println!("{}", format!("Statements in {}", dir.display()).bold());
    let mut table = create_table();
    table.set_header(vec!["File", "Type", "Size"]);
    for file in &files {
        table.add_row(vec![
            file.name.clone(),
            format!("{:?}", file.kind).to_uppercase(),
            format_size(file.size),
        ]);
    }
    println!("{}", table);
    Ok(())
}
