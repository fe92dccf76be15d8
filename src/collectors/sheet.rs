use crate::config::SheetConfig;
use crate::error::FetchError;
use indexmap::IndexMap;
use log::debug;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One sheet row: column name to cell text, in column order.
pub type RawRow = IndexMap<String, String>;

/// Read-only access to the table of readings.
pub trait SheetStore {
    fn fetch_all_rows(&self) -> impl Future<Output = Result<Vec<RawRow>, FetchError>> + Send;
}

/// Parse CSV text whose first line holds the column names.
pub fn rows_from_csv(text: &str) -> Result<Vec<RawRow>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Sheet published as CSV over HTTP(S), e.g. a spreadsheet `export?format=csv` link.
pub struct HttpSheetStore {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpSheetStore {
    pub fn new(url: String, token: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url, token })
    }
}

impl SheetStore for HttpSheetStore {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let start = Instant::now();
        let mut request = self.client.get(&self.url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        let rows = rows_from_csv(&body)?;
        debug!(
            "HTTP sheet fetch of {} rows took: {} ms",
            rows.len(),
            start.elapsed().as_millis()
        );
        Ok(rows)
    }
}

/// Sheet exported to a local CSV file, re-read on every fetch.
pub struct CsvFileStore {
    path: PathBuf,
}

impl CsvFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SheetStore for CsvFileStore {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        let start = Instant::now();
        let text = tokio::fs::read_to_string(&self.path).await?;
        let rows = rows_from_csv(&text)?;
        debug!(
            "CSV file fetch of {} rows took: {} ms",
            rows.len(),
            start.elapsed().as_millis()
        );
        Ok(rows)
    }
}

/// The store selected by `[SHEET]`.
pub enum SheetClient {
    Http(HttpSheetStore),
    File(CsvFileStore),
}

impl SheetClient {
    pub fn from_config(config: &SheetConfig, timeout: Duration) -> Result<Self, FetchError> {
        match (&config.url, &config.path) {
            (Some(url), _) => Ok(SheetClient::Http(HttpSheetStore::new(
                url.clone(),
                config.token.clone(),
                timeout,
            )?)),
            (None, Some(path)) => Ok(SheetClient::File(CsvFileStore::new(path.clone()))),
            (None, None) => Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no sheet url or path configured",
            ))),
        }
    }
}

impl SheetStore for SheetClient {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>, FetchError> {
        match self {
            SheetClient::Http(store) => store.fetch_all_rows().await,
            SheetClient::File(store) => store.fetch_all_rows().await,
        }
    }
}
