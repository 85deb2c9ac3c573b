// Order service repository implementation over HTTP
use crate::application::orders_repository::{FetchError, OrdersRepository};
use crate::domain::snapshot::{OverviewSnapshot, PopularSnapshot, TimeSeriesRow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

const OVERVIEW_PATH: &str = "/orders/overview";
const PER_MINUTE_PATH: &str = "/orders/ordersPerMinute";
const POPULAR_PATH: &str = "/orders/popular";

#[derive(Debug, Clone)]
pub struct HttpOrdersRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOrdersRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.build_url(path);
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::failure(path, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::failure(
                path,
                format!("status {}: {}", status, body.trim()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::failure(path, e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::malformed(path, e))
    }
}

#[async_trait]
impl OrdersRepository for HttpOrdersRepository {
    async fn fetch_overview(&self) -> Result<OverviewSnapshot, FetchError> {
        self.get_json(OVERVIEW_PATH).await
    }

    async fn fetch_orders_per_minute(&self) -> Result<Vec<TimeSeriesRow>, FetchError> {
        let rows: Vec<TimeSeriesRow> = self.get_json(PER_MINUTE_PATH).await?;
        tracing::debug!("Got {} per-minute rows", rows.len());
        Ok(rows)
    }

    async fn fetch_popular(&self) -> Result<PopularSnapshot, FetchError> {
        self.get_json(POPULAR_PATH).await
    }
}
