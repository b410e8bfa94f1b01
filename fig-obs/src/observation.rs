use chrono::NaiveDate;
use csv::WriterBuilder;
use fig_utils::dates::{format_date, parse_date};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header row written by [`export_csv`].
pub const CSV_HEADER: [&str; 4] = ["Date", "Figs", "Bats", "Leaves"];

/// One day of fig-tree monitoring.
///
/// `bats`, `figs` and `leaves` are intensities on a 0-100 scale. The range is
/// not enforced; values are only rounded to whole numbers on the way in.
/// Serialized field order matches the persisted JSON layout:
/// `id`, `date`, `bats`, `figs`, `leaves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Opaque token assigned at creation, stable for the record's lifetime
    pub id: String,
    /// Calendar day, unique within a store
    pub date: NaiveDate,
    pub bats: i32,
    pub figs: i32,
    pub leaves: i32,
}

impl Observation {
    /// Create an observation with a freshly generated id.
    pub fn new(date: NaiveDate, figs: i32, bats: i32, leaves: i32) -> Observation {
        Observation {
            id: Uuid::new_v4().to_string(),
            date,
            bats,
            figs,
            leaves,
        }
    }

    /// Build an observation from manual entry, accepting any date text the
    /// normalizer understands. Returns `None` when the date is unreadable.
    pub fn from_input(date_text: &str, figs: f64, bats: f64, leaves: f64) -> Option<Observation> {
        let date = parse_date(date_text)?;
        Some(Observation::new(
            date,
            round_intensity(figs),
            round_intensity(bats),
            round_intensity(leaves),
        ))
    }

    /// Copy this record's values onto `id`, keeping everything else.
    pub fn with_id(self, id: String) -> Observation {
        Observation { id, ..self }
    }
}

/// Round a raw intensity to the nearest whole number, halves away from zero.
pub fn round_intensity(value: f64) -> i32 {
    value.round() as i32
}

/// Sort observations newest first. Equal dates keep their relative order.
pub fn sort_newest_first(observations: &mut [Observation]) {
    observations.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Earliest and latest observation dates, or `None` for an empty slice.
pub fn date_span(observations: &[Observation]) -> Option<(NaiveDate, NaiveDate)> {
    let first = observations.iter().map(|o| o.date).min()?;
    let last = observations.iter().map(|o| o.date).max()?;
    Some((first, last))
}

/// Render observations as `Date,Figs,Bats,Leaves` CSV, in the order given.
pub fn export_csv(observations: &[Observation]) -> anyhow::Result<String> {
    let mut wtr = WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for obs in observations {
        wtr.write_record([
            format_date(&obs.date),
            obs.figs.to_string(),
            obs.bats.to_string(),
            obs.leaves.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}
