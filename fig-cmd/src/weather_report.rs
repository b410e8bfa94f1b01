//! Observations joined with daily weather for the monitoring site.

use crate::config::Settings;
use anyhow::bail;
use chrono::NaiveDate;
use fig_obs::observation::{date_span, Observation};
use fig_obs::weather::{
    fetch_weather_range, join_weather, ObservationWithWeather, OpenMeteoClient, WeatherSource,
};
use fig_store::{ObservationStore, Slot};
use fig_utils::date_range::DateRange;
use fig_utils::dates::{format_date, parse_date};

/// Pick the report range: explicit bounds win, otherwise the span of the
/// stored observations.
pub fn resolve_range(
    observations: &[Observation],
    start: Option<&str>,
    end: Option<&str>,
) -> anyhow::Result<DateRange> {
    let parse = |label: &str, text: &str| match parse_date(text) {
        Some(date) => Ok(date),
        None => bail!("Unrecognized {label} date {text:?}"),
    };
    let explicit_start = start.map(|s| parse("start", s)).transpose()?;
    let explicit_end = end.map(|s| parse("end", s)).transpose()?;

    let span = date_span(observations);
    let (Some(first), Some(last)) = (
        explicit_start.or(span.map(|(first, _)| first)),
        explicit_end.or(span.map(|(_, last)| last)),
    ) else {
        bail!("No observations stored; pass --start and --end to choose a range");
    };
    if first > last {
        bail!("Start date {} is after end date {}", first, last);
    }
    Ok(DateRange(first, last))
}

/// Fetch weather for `range` and attach it to the observations inside it.
///
/// Weather is optional: when nothing could be fetched the observations are
/// returned with empty weather columns.
pub async fn weather_rows<W>(
    source: &W,
    observations: &[Observation],
    range: DateRange,
    today: NaiveDate,
) -> Vec<ObservationWithWeather>
where
    W: WeatherSource + ?Sized,
{
    let in_range: Vec<Observation> = observations
        .iter()
        .filter(|obs| range.contains(&obs.date))
        .cloned()
        .collect();
    let weather = fetch_weather_range(source, range.0, range.1, today).await;
    if weather.is_empty() {
        log::warn!("weather: no data for {} to {}", range.0, range.1);
    }
    join_weather(&in_range, &weather)
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

pub fn format_weather_table(rows: &[ObservationWithWeather]) -> String {
    let mut out = format!(
        "{:<10}  {:>4}  {:>4}  {:>6}  {:>7}  {:>8}\n",
        "DATE", "FIGS", "BATS", "LEAVES", "RAIN_MM", "TMAX_C"
    );
    for row in rows {
        let obs = &row.observation;
        out.push_str(&format!(
            "{:<10}  {:>4}  {:>4}  {:>6}  {:>7}  {:>8}\n",
            format_date(&obs.date),
            obs.figs,
            obs.bats,
            obs.leaves,
            optional(row.rain),
            optional(row.temp_max)
        ));
    }
    out
}

pub async fn run_weather<S: Slot>(
    settings: &Settings,
    store: &ObservationStore<S>,
    start: Option<&str>,
    end: Option<&str>,
) -> anyhow::Result<()> {
    let observations = store.list();
    let range = resolve_range(&observations, start, end)?;
    let today = settings.site_today()?;
    let client = OpenMeteoClient::new(
        settings.http_client()?,
        settings.archive_url.clone(),
        settings.forecast_url.clone(),
        settings.location(),
    );
    let rows = weather_rows(&client, &observations, range, today).await;
    if rows.is_empty() {
        println!("No observations between {} and {}", range.0, range.1);
    } else {
        print!("{}", format_weather_table(&rows));
    }
    Ok(())
}
