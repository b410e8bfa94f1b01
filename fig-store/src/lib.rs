//! Observation store for fig-tree monitoring data.
//!
//! The whole record set lives in one named slot of a key-value backend and
//! is replaced as a unit on every write. There are no partial updates and no
//! migrations beyond the fixed [`STORAGE_KEY`].
//!
//! # Backends
//!
//! Anything implementing [`Slot`] can hold the data:
//! - [`MemorySlot`] - process-local, for tests and dry runs
//! - [`FileSlot`] - one JSON file per key inside a directory
//! - [`SqliteSlot`] - a `slots` key-value table in a SQLite database
//!
//! # Usage
//!
//! ```rust
//! use fig_obs::observation::Observation;
//! use fig_store::{MemorySlot, ObservationStore};
//!
//! let store = ObservationStore::new(MemorySlot::default());
//! let obs = Observation::from_input("01/10/2023", 20.0, 10.0, 0.0).unwrap();
//! store.upsert(obs).unwrap();
//! assert_eq!(store.list().len(), 1);
//! ```
//!
//! # Invariants
//!
//! - at most one observation per date
//! - writing a date that already exists replaces its values but keeps its `id`
//! - [`ObservationStore::list`] never fails: missing or corrupt state reads as empty
//! - a backend read error aborts upsert, merge, and delete before anything is written

pub mod error;
mod slot;
mod sqlite;

pub use error::{Result, StoreError};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use sqlite::{create_schema, SqliteSlot};

use fig_obs::observation::{sort_newest_first, Observation};
use log::{info, warn};

/// Key of the slot holding the serialized observation array.
pub const STORAGE_KEY: &str = "figwatch.observations.v1";

/// Upsert/delete repository over a single persisted slot.
pub struct ObservationStore<S: Slot> {
    slot: S,
}

impl<S: Slot> ObservationStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<Observation> {
        self.load().unwrap_or_else(|e| {
            warn!("store: failed to read {}: {}", STORAGE_KEY, e);
            Vec::new()
        })
    }

    /// Stored records for a read-modify-write. Missing or unparseable state
    /// is empty; a failing backend is an error so it is never overwritten.
    fn load(&self) -> Result<Vec<Observation>> {
        let Some(blob) = self.slot.read(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<Observation>>(&blob) {
            Ok(mut records) => {
                sort_newest_first(&mut records);
                Ok(records)
            }
            Err(e) => {
                warn!("store: ignoring unreadable {}: {}", STORAGE_KEY, e);
                Ok(Vec::new())
            }
        }
    }

    /// Insert a record, or replace the values of the record with the same date.
    ///
    /// Returns the record as stored, carrying the original `id` on replace.
    pub fn upsert(&self, record: Observation) -> Result<Observation> {
        let mut records = self.load()?;
        let stored = upsert_into(&mut records, record);
        self.save(records)?;
        Ok(stored)
    }

    /// Upsert every record in turn and persist once. Returns the stored count.
    pub fn merge(&self, incoming: Vec<Observation>) -> Result<usize> {
        let mut records = self.load()?;
        for record in incoming {
            upsert_into(&mut records, record);
        }
        let count = records.len();
        self.save(records)?;
        Ok(count)
    }

    /// Overwrite the stored set. Repeated dates collapse onto the first
    /// occurrence's `id` with the last occurrence's values.
    pub fn replace_all(&self, incoming: Vec<Observation>) -> Result<Vec<Observation>> {
        let mut records = Vec::with_capacity(incoming.len());
        for record in incoming {
            upsert_into(&mut records, record);
        }
        sort_newest_first(&mut records);
        self.save(records.clone())?;
        Ok(records)
    }

    /// Remove the record with `id`. Returns whether anything was removed;
    /// an unknown id leaves the store untouched.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(records)?;
        Ok(true)
    }

    /// Persist an empty set.
    pub fn clear(&self) -> Result<()> {
        self.save(Vec::new())
    }

    fn save(&self, mut records: Vec<Observation>) -> Result<()> {
        sort_newest_first(&mut records);
        let blob = serde_json::to_string(&records)?;
        self.slot.write(STORAGE_KEY, &blob)?;
        info!("store: saved {} observations", records.len());
        Ok(())
    }
}

fn upsert_into(records: &mut Vec<Observation>, record: Observation) -> Observation {
    match records.iter_mut().find(|r| r.date == record.date) {
        Some(existing) => {
            let id = existing.id.clone();
            *existing = record.with_id(id);
            existing.clone()
        }
        None => {
            records.push(record.clone());
            record
        }
    }
}
