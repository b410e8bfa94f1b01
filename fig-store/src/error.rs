use thiserror::Error;

/// Failure to persist the observation set.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The SQLite backend rejected a statement
    #[error("SQLite storage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The record set could not be serialized
    #[error("Failed to serialize observations: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Type alias for Results using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
