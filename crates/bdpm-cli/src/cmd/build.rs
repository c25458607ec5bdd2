//! Build subcommand - full rebuild of the store from the registry extracts

use std::path::PathBuf;

use anyhow::{Context, Result};
use bdpm_core::{ProgressContext, fmt_num};
use bdpm_ingest::{PipelineSummary, TableOutcome};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Directory holding the extract files (CIS_bdpm.txt, ...)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// DuckDB file to (re)create
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Encoding label of the extracts (e.g. latin1, windows-1252)
    #[arg(long)]
    pub encoding: Option<String>,
}

pub fn run(args: BuildArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let mut ingest = config.ingest_config();
    if let Some(dir) = args.data_dir {
        ingest.data_dir = dir;
    }
    if let Some(db) = args.db {
        ingest.db_path = db;
    }
    if let Some(encoding) = args.encoding {
        ingest.encoding = encoding;
    }

    let summary = bdpm_ingest::run(&ingest, progress)
        .with_context(|| format!("Failed to build {}", ingest.db_path.display()))?;

    println!("\n{}", summary_table(&summary));
    println!(
        "Store written to {} in {:.1}s",
        summary.db_path.display(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}

fn summary_table(summary: &PipelineSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Table").fg(Color::Cyan),
            Cell::new("Rows").fg(Color::Cyan),
            Cell::new("Dropped lines").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
        ]);

    for report in &summary.tables {
        match &report.outcome {
            TableOutcome::Loaded { rows, stats } => {
                table.add_row(vec![
                    Cell::new(report.table),
                    Cell::new(fmt_num(*rows)),
                    Cell::new(fmt_num(stats.dropped())),
                    Cell::new("loaded").fg(Color::Green),
                ]);
            }
            TableOutcome::Skipped { path } => {
                table.add_row(vec![
                    Cell::new(report.table),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("missing {}", path.display())).fg(Color::Yellow),
                ]);
            }
        }
    }
    for failure in &summary.index_failures {
        table.add_row(vec![
            Cell::new(failure.index),
            Cell::new("-"),
            Cell::new("-"),
            Cell::new("index failed").fg(Color::Yellow),
        ]);
    }
    table
}
