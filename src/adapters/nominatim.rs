use crate::adapters::http::{build_client, ensure_success};
use crate::config::GeocodeConfig;
use crate::domain::ports::Geocoder;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Address search against OpenStreetMap Nominatim, first hit only.
pub struct NominatimClient {
    endpoint: String,
    client: Client,
}

impl NominatimClient {
    pub fn new(config: &GeocodeConfig) -> Result<Self> {
        // Nominatim 使用政策要求可識別的 User-Agent
        let client = build_client(Some(config.timeout_seconds), Some(&config.user_agent))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str) -> Result<Value> {
        tracing::debug!("📡 Nominatim search: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        let response = ensure_success("Nominatim", response).await?;
        Ok(response.json().await?)
    }
}
