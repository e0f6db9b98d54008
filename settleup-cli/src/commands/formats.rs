//! Formats command - export capabilities of this build

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use settleup_core::ExportFormat;

use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    if json {
        let formats: Vec<_> = ExportFormat::all()
            .iter()
            .map(|f| {
                json!({
                    "format": f,
                    "extension": f.extension(),
                    "available": f.is_available(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&formats)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Format", "Flag", "Status"]);
    for f in ExportFormat::all() {
        let status = match f.unavailable_reason() {
            None => "available".green().to_string(),
            Some(reason) => format!("unavailable ({})", reason).yellow().to_string(),
        };
        table.add_row(vec![f.label().to_string(), f.extension().to_string(), status]);
    }
    println!("{}", table);
    Ok(())
}
