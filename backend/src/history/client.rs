use std::time::Duration;

use async_trait::async_trait;
use chart::PriceHistoryRecord;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use crate::history::PriceHistorySource;
use crate::history::errors::HistoryError;

/// HTTP adapter for the inventory history endpoint.
#[derive(Clone)]
pub struct HistoryClient {
    http: Client,
    url: String,
}

impl HistoryClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, HistoryError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
        })
    }

    pub fn history_url(&self, item_id: i64) -> String {
        format!("{}/inventory/product/{}/history", self.url, item_id)
    }
}

#[async_trait]
impl PriceHistorySource for HistoryClient {
    #[instrument(skip(self), fields(item_id = %item_id), level = "debug")]
    async fn price_history(&self, item_id: i64) -> Result<Vec<PriceHistoryRecord>, HistoryError> {
        let url = self.history_url(item_id);

        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(HistoryError::Status { item_id, status });
        }

        let records: Vec<PriceHistoryRecord> = resp.json().await?;

        debug!(records = records.len(), "price history fetched");

        Ok(records)
    }
}
