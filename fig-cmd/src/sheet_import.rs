//! Import from a publicly shared spreadsheet.

use fig_obs::observation::Observation;
use fig_obs::sheet::{import_sheet, CsvFetcher, HttpCsvFetcher};
use fig_store::{ObservationStore, Slot};
use log::info;

/// Fetch a shared sheet and overwrite the store with its rows.
///
/// On any failure the store is left as it was and the error carries the
/// user-facing reason.
pub async fn import_sheet_into<S, F>(
    store: &ObservationStore<S>,
    fetcher: &F,
    url: &str,
) -> anyhow::Result<Vec<Observation>>
where
    S: Slot,
    F: CsvFetcher + ?Sized,
{
    let records = import_sheet(fetcher, url).await?;
    let stored = store.replace_all(records)?;
    info!("sheet import: stored {} observations", stored.len());
    Ok(stored)
}

pub async fn run_import_sheet<S: Slot>(
    store: &ObservationStore<S>,
    client: reqwest::Client,
    url: &str,
) -> anyhow::Result<()> {
    let fetcher = HttpCsvFetcher::new(client);
    let stored = import_sheet_into(store, &fetcher, url).await?;
    println!("Imported {} observations from the sheet", stored.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fig_obs::error::SheetImportError;
    use fig_obs::sheet::FetchedDocument;
    use fig_store::MemorySlot;

    struct StaticFetcher(FetchedDocument);

    #[async_trait::async_trait]
    impl CsvFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> fig_obs::error::Result<FetchedDocument> {
            Ok(self.0.clone())
        }
    }

    fn csv_fetcher(body: &str) -> StaticFetcher {
        StaticFetcher(FetchedDocument {
            status: 200,
            content_type: Some("text/csv".to_string()),
            body: body.to_string(),
        })
    }

    fn seeded_store() -> ObservationStore<MemorySlot> {
        let store = ObservationStore::new(MemorySlot::default());
        let obs = Observation::from_input("2020-01-01", 1.0, 1.0, 1.0).unwrap();
        store.upsert(obs).unwrap();
        store
    }

    #[tokio::test]
    async fn sheet_import_overwrites_store() {
        let store = seeded_store();
        let fetcher = csv_fetcher("Date,Figs,Bats,Leaves\n01/10/2023,20,10,5\n");
        let stored = import_sheet_into(&store, &fetcher, "https://docs.google.com/spreadsheets/d/abc/edit")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(store.list(), stored);
    }

    #[tokio::test]
    async fn failed_sheet_import_keeps_store() {
        let store = seeded_store();
        let before = store.list();
        let fetcher = csv_fetcher("Date,Figs,Bats\n");

        let err = import_sheet_into(&store, &fetcher, "https://docs.google.com/spreadsheets/d/abc/")
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SheetImportError>(), Some(&SheetImportError::NoData));

        let err = import_sheet_into(&store, &fetcher, "not a link").await.unwrap_err();
        assert_eq!(err.downcast_ref::<SheetImportError>(), Some(&SheetImportError::InvalidUrl));
        assert_eq!(store.list(), before);
    }
}
