use reqwest::Client;
use tracing::{info, instrument};

use super::MapDataset;
use crate::Result;

impl MapDataset {
    /// Fetch the dataset over HTTP, bypassing intermediate caches.
    #[instrument(name = "Fetch map dataset", skip(client), level = "info")]
    pub async fn fetch(client: &Client, url: &str) -> Result<Self> {
        info!(url, "Starting dataset download");
        let bytes = client
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let dataset = Self::from_slice(&bytes)?;
        info!(items = dataset.len(), "Fetched map dataset");
        Ok(dataset)
    }
}
