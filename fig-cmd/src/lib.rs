//! Command implementations for the figwatch CLI.
//!
//! Provides subcommands for recording observations, bulk import from pasted
//! text or shared spreadsheets, CSV export, and weather-joined reports.

use clap::{Subcommand, ValueEnum};
use config::Settings;

pub mod config;
pub mod records;
pub mod sheet_import;
pub mod weather_report;

/// How `list` prints observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List stored observations, newest first
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Record a day's observation, replacing any existing entry for that date
    Add {
        /// Date as YYYY-MM-DD, DD/MM/YYYY or DDMMYYYY
        #[arg(short, long)]
        date: String,

        /// Ripe fig abundance, 0-100
        #[arg(long)]
        figs: f64,

        /// Fruit-bat activity, 0-100
        #[arg(long)]
        bats: f64,

        /// Leaf coverage, 0-100
        #[arg(long, default_value_t = 0.0)]
        leaves: f64,
    },

    /// Delete an observation by id
    Delete {
        id: String,
    },

    /// Import CSV/TSV rows (Date, Figs, Bats[, Leaves]) from a file or stdin
    Import {
        /// Input file, or "-" for stdin
        #[arg(default_value = "-")]
        path: String,

        /// Overwrite the stored data instead of merging by date
        #[arg(long)]
        replace: bool,
    },

    /// Replace stored data with the rows of a publicly shared spreadsheet
    ImportSheet {
        /// Share link (…/d/<id>/edit#gid=<tab>) or a CSV export link
        url: String,
    },

    /// Export observations as CSV (Date,Figs,Bats,Leaves)
    Export {
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show observations alongside daily rainfall and max temperature
    Weather {
        /// First day of the range; defaults to the earliest observation
        #[arg(long)]
        start: Option<String>,

        /// Last day of the range; defaults to the latest observation
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete every stored observation
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    let store = settings.open_store()?;
    match command {
        Command::List { format } => records::run_list(&store, format),
        Command::Add {
            date,
            figs,
            bats,
            leaves,
        } => records::run_add(&store, &date, figs, bats, leaves),
        Command::Delete { id } => records::run_delete(&store, &id),
        Command::Import { path, replace } => records::run_import(&store, &path, replace),
        Command::ImportSheet { url } => {
            let client = settings.http_client()?;
            sheet_import::run_import_sheet(&store, client, &url).await
        }
        Command::Export { output } => records::run_export(&store, output.as_deref()),
        Command::Weather { start, end } => {
            weather_report::run_weather(settings, &store, start.as_deref(), end.as_deref()).await
        }
        Command::Clear { yes } => records::run_clear(&store, yes),
    }
}
