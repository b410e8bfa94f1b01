//! Daily weather for the monitoring site.
//!
//! Two remote sources cover different spans: the archive serves days up to
//! and including [`weather_cutoff`] (today minus 7 days), the forecast
//! serves everything after. [`plan_legs`] splits a requested range between
//! them and [`fetch_weather_range`] queries the legs concurrently, stitching
//! the results archive first. A failed leg contributes nothing; weather is
//! optional enrichment, so no error ever escapes the fetch.

use crate::observation::Observation;
use async_trait::async_trait;
use chrono::NaiveDate;
use fig_utils::{date_range::DateRange, dates::weather_cutoff};
use futures::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

#[cfg(feature = "api")]
use fig_utils::dates::format_date;
#[cfg(feature = "api")]
use reqwest::Client;

/// Daily series requested from both sources.
pub const DAILY_FIELDS: &str = "temperature_2m_max,precipitation_sum";

/// One day's weather summary. Identified by its date alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub date: NaiveDate,
    /// Precipitation in millimetres, never negative
    pub rain: f64,
    /// Maximum temperature in degrees Celsius, `None` when the source has no reading
    #[serde(rename = "tempMax")]
    pub temp_max: Option<f64>,
}

/// Which remote source serves a span of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherLeg {
    Archive,
    Forecast,
}

impl fmt::Display for WeatherLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherLeg::Archive => write!(f, "archive"),
            WeatherLeg::Forecast => write!(f, "forecast"),
        }
    }
}

/// A single query against one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegRequest {
    pub leg: WeatherLeg,
    pub range: DateRange,
}

impl LegRequest {
    pub fn start(&self) -> NaiveDate {
        self.range.0
    }

    pub fn end(&self) -> NaiveDate {
        self.range.1
    }
}

/// Decide which sources to query for `start..=end`, given today's date.
///
/// The legs never overlap: the cutoff day belongs to the archive and the
/// forecast leg starts the day after.
pub fn plan_legs(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Vec<LegRequest> {
    let cutoff = weather_cutoff(today);
    if start > cutoff {
        return vec![LegRequest {
            leg: WeatherLeg::Forecast,
            range: DateRange(start, end),
        }];
    }
    if end <= cutoff {
        return vec![LegRequest {
            leg: WeatherLeg::Archive,
            range: DateRange(start, end),
        }];
    }

    let mut legs = vec![LegRequest {
        leg: WeatherLeg::Archive,
        range: DateRange(start, cutoff),
    }];
    if let Some(forecast_start) = cutoff.succ_opt().filter(|d| *d <= end) {
        legs.push(LegRequest {
            leg: WeatherLeg::Forecast,
            range: DateRange(forecast_start, end),
        });
    }
    legs
}

/// A remote provider able to answer one leg of a weather query.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_leg(&self, request: &LegRequest) -> anyhow::Result<Vec<WeatherData>>;
}

/// Fetch daily weather for `start..=end`.
///
/// Legs run concurrently and are concatenated archive first. Each leg's
/// source returns ascending dates, so the result is chronological without a
/// re-sort. Any failure yields an empty contribution from that leg.
pub async fn fetch_weather_range<S>(
    source: &S,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Vec<WeatherData>
where
    S: WeatherSource + ?Sized,
{
    let legs = plan_legs(start, end, today);
    let results = join_all(legs.iter().map(|leg| fetch_leg_or_empty(source, leg))).await;
    let weather: Vec<WeatherData> = results.into_iter().flatten().collect();
    info!(
        "weather: {} days for {} to {} from {} leg(s)",
        weather.len(),
        start,
        end,
        legs.len()
    );
    weather
}

async fn fetch_leg_or_empty<S>(source: &S, request: &LegRequest) -> Vec<WeatherData>
where
    S: WeatherSource + ?Sized,
{
    match source.fetch_leg(request).await {
        Ok(days) => days,
        Err(e) => {
            warn!(
                "weather: {} leg {} to {} failed: {}",
                request.leg,
                request.start(),
                request.end(),
                e
            );
            Vec::new()
        }
    }
}

/// Response body shared by the archive and forecast endpoints.
#[derive(Debug, Deserialize)]
pub struct DailyResponse {
    pub daily: DailySeries,
}

/// Parallel arrays indexed by day.
#[derive(Debug, Deserialize)]
pub struct DailySeries {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

impl DailyResponse {
    pub fn from_json(body: &str) -> anyhow::Result<DailyResponse> {
        Ok(serde_json::from_str(body)?)
    }
}

impl DailySeries {
    /// Zip the parallel arrays into daily summaries.
    ///
    /// Every dated entry yields one day. A missing temperature stays `None`;
    /// missing precipitation counts as no rain.
    pub fn into_weather(self) -> Vec<WeatherData> {
        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, time)| {
                let date = NaiveDate::parse_from_str(time, fig_utils::dates::ISO_FORMAT).ok()?;
                let temp_max = self.temperature_2m_max.get(i).copied().flatten();
                let rain = self
                    .precipitation_sum
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0)
                    .max(0.0);
                Some(WeatherData {
                    date,
                    rain,
                    temp_max,
                })
            })
            .collect()
    }
}

/// Fixed coordinates and timezone of the monitoring site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// An observation with the same day's weather attached for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationWithWeather {
    #[serde(flatten)]
    pub observation: Observation,
    pub rain: Option<f64>,
    #[serde(rename = "tempMax")]
    pub temp_max: Option<f64>,
}

/// Attach weather to observations by date. Observations keep their order;
/// days without weather get `None`.
pub fn join_weather(
    observations: &[Observation],
    weather: &[WeatherData],
) -> Vec<ObservationWithWeather> {
    let by_date: HashMap<NaiveDate, &WeatherData> = weather.iter().map(|w| (w.date, w)).collect();
    observations
        .iter()
        .map(|obs| {
            let day = by_date.get(&obs.date);
            ObservationWithWeather {
                observation: obs.clone(),
                rain: day.map(|w| w.rain),
                temp_max: day.and_then(|w| w.temp_max),
            }
        })
        .collect()
}

/// Open-Meteo style client: one base URL per leg, same query parameters.
#[cfg(feature = "api")]
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    archive_url: String,
    forecast_url: String,
    location: SiteLocation,
}

#[cfg(feature = "api")]
impl OpenMeteoClient {
    pub fn new(
        client: Client,
        archive_url: impl Into<String>,
        forecast_url: impl Into<String>,
        location: SiteLocation,
    ) -> OpenMeteoClient {
        OpenMeteoClient {
            client,
            archive_url: archive_url.into(),
            forecast_url: forecast_url.into(),
            location,
        }
    }

    fn base_url(&self, leg: WeatherLeg) -> &str {
        match leg {
            WeatherLeg::Archive => &self.archive_url,
            WeatherLeg::Forecast => &self.forecast_url,
        }
    }
}

#[cfg(feature = "api")]
#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn fetch_leg(&self, request: &LegRequest) -> anyhow::Result<Vec<WeatherData>> {
        let query = [
            ("latitude", self.location.latitude.to_string()),
            ("longitude", self.location.longitude.to_string()),
            ("start_date", format_date(&request.start())),
            ("end_date", format_date(&request.end())),
            ("daily", DAILY_FIELDS.to_string()),
            ("timezone", self.location.timezone.clone()),
        ];
        let response = self
            .client
            .get(self.base_url(request.leg))
            .query(&query)
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("{} endpoint returned {}", request.leg, response.status());
        }
        let body = response.text().await?;
        Ok(DailyResponse::from_json(&body)?.daily.into_weather())
    }
}
