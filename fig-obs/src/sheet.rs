//! Import from a shared spreadsheet link.
//!
//! A share link such as
//! `https://docs.google.com/spreadsheets/d/<id>/edit#gid=123` is rewritten to
//! the sheet's CSV export URL, fetched, and fed through the table parser.
//! Links that are already CSV exports (`output=csv`) are fetched as-is.

use crate::error::{Result, SheetImportError};
use crate::observation::Observation;
use crate::table_parser::parse_table;
use async_trait::async_trait;
use log::info;
use regex::Regex;
use std::sync::LazyLock;

#[cfg(feature = "api")]
use reqwest::{header::CONTENT_TYPE, Client};

/// Tab exported when the link does not name one.
pub const DEFAULT_TAB: &str = "0";

static DOCUMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)(?:[/?#]|$)").unwrap());

static TAB_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?#&]gid=([0-9]+)").unwrap());

/// Turn a share link into a direct CSV export URL without touching the network.
pub fn resolve_export_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.contains("output=csv") {
        return Ok(url.to_string());
    }
    let document_id = DOCUMENT_ID
        .captures(url)
        .map(|caps| caps[1].to_string())
        .ok_or(SheetImportError::InvalidUrl)?;
    let tab = TAB_ID
        .captures(url)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| DEFAULT_TAB.to_string());
    Ok(format!(
        "https://docs.google.com/spreadsheets/d/{document_id}/export?format=csv&gid={tab}"
    ))
}

/// What came back from an export URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedDocument {
    fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// Retrieves a document over the network.
#[async_trait]
pub trait CsvFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument>;
}

/// Resolve, fetch, and parse a shared sheet.
///
/// Failures are distinct so the caller can tell the user exactly what went
/// wrong: a bad link (no request is made), a private sheet, an error status,
/// or a sheet without usable rows.
pub async fn import_sheet<F>(fetcher: &F, url: &str) -> Result<Vec<Observation>>
where
    F: CsvFetcher + ?Sized,
{
    let export_url = resolve_export_url(url)?;
    info!("sheet import: fetching {}", export_url);
    let document = fetcher.fetch(&export_url).await?;
    if document.is_html() {
        return Err(SheetImportError::AccessDenied);
    }
    if !(200..300).contains(&document.status) {
        return Err(SheetImportError::BadStatus(document.status));
    }
    let records = parse_table(&document.body);
    if records.is_empty() {
        return Err(SheetImportError::NoData);
    }
    info!("sheet import: parsed {} observations", records.len());
    Ok(records)
}

/// Fetches export URLs with `reqwest`, following redirects.
#[cfg(feature = "api")]
#[derive(Debug, Clone, Default)]
pub struct HttpCsvFetcher {
    client: Client,
}

#[cfg(feature = "api")]
impl HttpCsvFetcher {
    pub fn new(client: Client) -> HttpCsvFetcher {
        HttpCsvFetcher { client }
    }
}

#[cfg(feature = "api")]
#[async_trait]
impl CsvFetcher for HttpCsvFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let transport = |e: reqwest::Error| SheetImportError::Transport(e.to_string());
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport)?;
        Ok(FetchedDocument {
            status,
            content_type,
            body,
        })
    }
}
