//! Local record keeping: list, add, delete, import, export, clear.

use crate::OutputFormat;
use anyhow::{bail, Context};
use fig_obs::observation::{export_csv, Observation};
use fig_obs::table_parser::parse_table_report;
use fig_store::{ObservationStore, Slot};
use fig_utils::dates::format_date;
use log::{info, warn};

/// Render observations as a fixed-width table.
pub fn format_table(records: &[Observation]) -> String {
    let mut out = format!(
        "{:<36}  {:<10}  {:>4}  {:>4}  {:>6}\n",
        "ID", "DATE", "FIGS", "BATS", "LEAVES"
    );
    for obs in records {
        out.push_str(&format!(
            "{:<36}  {:<10}  {:>4}  {:>4}  {:>6}\n",
            obs.id,
            format_date(&obs.date),
            obs.figs,
            obs.bats,
            obs.leaves
        ));
    }
    out
}

pub fn run_list<S: Slot>(store: &ObservationStore<S>, format: OutputFormat) -> anyhow::Result<()> {
    let records = store.list();
    match format {
        OutputFormat::Table if records.is_empty() => println!("No observations stored."),
        OutputFormat::Table => print!("{}", format_table(&records)),
        OutputFormat::Csv => print!("{}", export_csv(&records)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

/// Upsert one manually entered observation and return it as stored.
pub fn add_observation<S: Slot>(
    store: &ObservationStore<S>,
    date: &str,
    figs: f64,
    bats: f64,
    leaves: f64,
) -> anyhow::Result<Observation> {
    let Some(obs) = Observation::from_input(date, figs, bats, leaves) else {
        bail!("Unrecognized date {date:?}. Use YYYY-MM-DD, DD/MM/YYYY or DDMMYYYY");
    };
    Ok(store.upsert(obs)?)
}

pub fn run_add<S: Slot>(
    store: &ObservationStore<S>,
    date: &str,
    figs: f64,
    bats: f64,
    leaves: f64,
) -> anyhow::Result<()> {
    let stored = add_observation(store, date, figs, bats, leaves)?;
    println!(
        "Saved {} (figs {}, bats {}, leaves {}) as {}",
        format_date(&stored.date),
        stored.figs,
        stored.bats,
        stored.leaves,
        stored.id
    );
    Ok(())
}

pub fn run_delete<S: Slot>(store: &ObservationStore<S>, id: &str) -> anyhow::Result<()> {
    if store.delete(id)? {
        println!("Deleted {id}");
    } else {
        println!("No observation with id {id}");
    }
    Ok(())
}

/// Outcome of a text import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows accepted by the parser
    pub accepted: usize,
    /// Rows the parser skipped
    pub skipped: usize,
    /// Records in the store afterwards
    pub stored: usize,
}

/// Parse delimited text and merge it into (or replace) the store.
///
/// Zero usable rows is reported as an error and leaves the store untouched.
pub fn import_text<S: Slot>(
    store: &ObservationStore<S>,
    text: &str,
    replace: bool,
) -> anyhow::Result<ImportSummary> {
    let report = parse_table_report(text);
    for row in &report.skipped {
        warn!("import: line {} skipped: {}", row.line, row.reason);
    }
    if report.records.is_empty() {
        bail!("No valid data rows found. Expected columns: Date, Figs, Bats, [Leaves]");
    }
    let accepted = report.records.len();
    let stored = if replace {
        store.replace_all(report.records)?.len()
    } else {
        store.merge(report.records)?
    };
    Ok(ImportSummary {
        accepted,
        skipped: report.skipped.len(),
        stored,
    })
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
}

pub fn run_import<S: Slot>(
    store: &ObservationStore<S>,
    path: &str,
    replace: bool,
) -> anyhow::Result<()> {
    let text = read_input(path)?;
    let summary = import_text(store, &text, replace)?;
    info!("import: {:?}", summary);
    println!(
        "Imported {} rows ({} skipped); {} observations stored",
        summary.accepted, summary.skipped, summary.stored
    );
    Ok(())
}

pub fn run_export<S: Slot>(store: &ObservationStore<S>, output: Option<&str>) -> anyhow::Result<()> {
    let records = store.list();
    let csv = export_csv(&records)?;
    match output {
        Some(path) => {
            std::fs::write(path, csv).with_context(|| format!("Failed to write {path}"))?;
            println!("Exported {} observations to {}", records.len(), path);
        }
        None => print!("{csv}"),
    }
    Ok(())
}

pub fn run_clear<S: Slot>(store: &ObservationStore<S>, yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to delete all observations without --yes");
    }
    store.clear()?;
    println!("All observations deleted");
    Ok(())
}
