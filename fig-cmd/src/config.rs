//! Runtime settings shared by every subcommand.
//!
//! All values are global CLI options with defaults, so `figwatch list` works
//! with no configuration at all.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Args, ValueEnum};
use fig_obs::weather::SiteLocation;
use fig_store::{FileSlot, ObservationStore, Slot, SqliteSlot};
use std::path::PathBuf;
use std::time::Duration;

/// Monitoring site coordinates (Brisbane, Queensland).
pub const DEFAULT_LATITUDE: f64 = -27.4698;
pub const DEFAULT_LONGITUDE: f64 = 153.0251;
pub const DEFAULT_TIMEZONE: &str = "Australia/Brisbane";

/// Historical daily weather, serves days older than a week.
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
/// Recent and upcoming daily weather.
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Name of the per-user data directory.
const APP_DIR: &str = "figwatch";
const SQLITE_FILE: &str = "figwatch.db";

/// Where observations are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One JSON file inside the store directory
    Json,
    /// A key-value table in a SQLite database file
    Sqlite,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Latitude of the monitoring site
    #[arg(long, global = true, default_value_t = DEFAULT_LATITUDE, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude of the monitoring site
    #[arg(long, global = true, default_value_t = DEFAULT_LONGITUDE, allow_negative_numbers = true)]
    pub longitude: f64,

    /// IANA timezone used for daily weather aggregation
    #[arg(long, global = true, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Weather archive endpoint
    #[arg(long, global = true, default_value = DEFAULT_ARCHIVE_URL)]
    pub archive_url: String,

    /// Weather forecast endpoint
    #[arg(long, global = true, default_value = DEFAULT_FORECAST_URL)]
    pub forecast_url: String,

    /// Storage backend
    #[arg(long, global = true, value_enum, default_value_t = Backend::Json)]
    pub backend: Backend,

    /// Data directory (json) or database file (sqlite); defaults to the user data dir
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Timeout for each remote request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            timezone: DEFAULT_TIMEZONE.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            backend: Backend::Json,
            store: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    pub fn location(&self) -> SiteLocation {
        SiteLocation {
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.clone(),
        }
    }

    /// Today's calendar date at the monitoring site.
    pub fn site_today(&self) -> anyhow::Result<NaiveDate> {
        date_in_timezone(&self.timezone, Utc::now())
    }

    /// Resolved store location for the selected backend.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store {
            return path.clone();
        }
        let dir = default_data_dir();
        match self.backend {
            Backend::Json => dir,
            Backend::Sqlite => dir.join(SQLITE_FILE),
        }
    }

    /// Open the observation store for the selected backend.
    pub fn open_store(&self) -> anyhow::Result<ObservationStore<Box<dyn Slot>>> {
        let path = self.store_path();
        log::info!("store: {:?} at {}", self.backend, path.display());
        let slot: Box<dyn Slot> = match self.backend {
            Backend::Json => Box::new(FileSlot::new(path)),
            Backend::Sqlite => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Box::new(SqliteSlot::open(&path)?)
            }
        };
        Ok(ObservationStore::new(slot))
    }

    /// HTTP client shared by the weather and sheet commands.
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?)
    }
}

/// Calendar date of `instant` in the named IANA timezone.
pub fn date_in_timezone(timezone: &str, instant: DateTime<Utc>) -> anyhow::Result<NaiveDate> {
    let tz: Tz = timezone
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("Unknown timezone {timezone:?}"))?;
    Ok(instant.with_timezone(&tz).date_naive())
}

/// The user's local data directory, falling back to the working directory.
fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(data_dir) => data_dir.join(APP_DIR),
        None => PathBuf::from(APP_DIR),
    }
}
