/// Error types for the figwatch core library
use thiserror::Error;

/// Why importing a shared spreadsheet failed.
///
/// Each variant carries a message meant to be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetImportError {
    /// No document id could be found in the link
    #[error("Invalid sheet URL: expected a link containing /d/<document-id>/")]
    InvalidUrl,

    /// The source answered with an HTML page instead of CSV
    #[error("Access denied: the sheet is not public. Share it as \"Anyone with the link can view\"")]
    AccessDenied,

    /// The source answered with a non-success status
    #[error("The sheet source returned an error status: {0}")]
    BadStatus(u16),

    /// The request never produced a response
    #[error("Failed to reach the sheet source: {0}")]
    Transport(String),

    /// The export parsed to zero usable rows
    #[error("No valid data rows found. Expected columns: Date, Figs, Bats, [Leaves]")]
    NoData,
}

/// Type alias for sheet import results
pub type Result<T> = std::result::Result<T, SheetImportError>;
