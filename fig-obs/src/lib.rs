//! Core types and data ingestion for fig-tree phenology monitoring.
//!
//! - [`observation`]: the canonical daily `Observation` record and CSV export
//! - [`table_parser`]: permissive parsing of pasted or fetched delimited text
//! - [`weather`]: daily weather summaries stitched from archive and forecast sources
//! - [`sheet`]: resolving shared spreadsheet links into CSV exports
//!
//! Remote clients backed by `reqwest` are only compiled with the `api` feature.

pub mod error;
pub mod observation;
pub mod sheet;
pub mod table_parser;
pub mod weather;
