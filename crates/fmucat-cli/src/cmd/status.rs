//! Status subcommand - summarize every table without running anything

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use fmucat_core::fmt_num;
use fmucat_fmi::ModelRecord;
use fmucat_github::{DownloadRecord, LicenseRecord, LinkRecord};
use fmucat_store::{KeyedResultStore, Record, Summary};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also list every failed record
    #[arg(long)]
    pub errors: bool,
}

struct TableStatus {
    stage: &'static str,
    path: String,
    summary: Option<Summary>,
}

fn load<R: Record>(stage: &'static str, path: &Path) -> Result<TableStatus> {
    let summary = if path.exists() {
        let store = KeyedResultStore::<R>::load(path)
            .with_context(|| format!("Failed to load {stage} table"))?;
        Some(store.summary())
    } else {
        None
    };
    Ok(TableStatus {
        stage,
        path: path.display().to_string(),
        summary,
    })
}

fn format_overview(tables: &[TableStatus]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Stage").fg(Color::Cyan),
            Cell::new("Table").fg(Color::Cyan),
            Cell::new("Records").fg(Color::Cyan),
            Cell::new("Succeeded").fg(Color::Green),
            Cell::new("Failed").fg(Color::Red),
        ]);
    for t in tables {
        let (records, succeeded, failed) = match &t.summary {
            Some(s) => (
                fmt_num(s.total),
                fmt_num(s.total_succeeded),
                fmt_num(s.failures.len()),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(t.stage),
            Cell::new(&t.path),
            Cell::new(records).set_alignment(CellAlignment::Right),
            Cell::new(succeeded).set_alignment(CellAlignment::Right),
            Cell::new(failed).set_alignment(CellAlignment::Right),
        ]);
    }
    table.to_string()
}

pub fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let store = &config.store;
    let tables = vec![
        load::<LinkRecord>("search", &store.links_path())?,
        load::<DownloadRecord>("download", &store.downloads_path())?,
        load::<ModelRecord>("validate", &store.models_path())?,
        load::<LicenseRecord>("licenses", &store.licenses_path())?,
    ];

    eprintln!("\n{}", format_overview(&tables));
    if args.errors {
        for t in &tables {
            if let Some(summary) = t.summary.as_ref().filter(|s| !s.failures.is_empty()) {
                summary.print(t.stage);
            }
        }
    }
    Ok(())
}
