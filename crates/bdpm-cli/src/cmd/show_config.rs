//! Config subcommand - print the effective configuration

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    eprintln!("\n{}", settings_table(config));
    Ok(())
}

fn settings_table(config: &Config) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec![
        "Data directory",
        &config.source.data_dir.display().to_string(),
    ]);
    table.add_row(vec!["Source encoding", &config.source.encoding]);
    table.add_row(vec!["Store", &config.store.path.display().to_string()]);
    for spec in &bdpm_ingest::EXTRACTS {
        table.add_row(vec![spec.table, spec.file]);
    }
    table
}
