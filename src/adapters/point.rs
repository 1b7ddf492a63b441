use crate::adapters::http::{build_client, ensure_success};
use crate::config::{PrimaryConfig, PrimaryContract};
use crate::domain::model::{
    attribute_text, Coordinate, Overlays, PlanningSummary, PrimaryAttributes, PrimaryOutcome,
};
use crate::domain::ports::PrimaryProvider;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const SOURCE_NAME: &str = "Point";

/// NSW Point client. The upstream contract decides which nested keys are read.
pub struct PointClient {
    config: PrimaryConfig,
    client: Client,
}

impl PointClient {
    pub fn new(config: PrimaryConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds, None)?;
        Ok(Self { config, client })
    }

    async fn fetch(&self, api_key: &str, coordinate: Coordinate) -> Result<Value> {
        let endpoint = self.config.endpoint();
        tracing::debug!("📡 Point request: {} ({}, {})", endpoint, coordinate.lat, coordinate.lon);

        let response = self
            .client
            .get(&endpoint)
            .header(self.config.header_name.as_str(), api_key)
            .query(&[
                ("lat", coordinate.lat.to_string()),
                ("lon", coordinate.lon.to_string()),
            ])
            .send()
            .await?;

        let response = ensure_success(SOURCE_NAME, response).await?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl PrimaryProvider for PointClient {
    fn is_configured(&self) -> bool {
        self.config.credential().is_some()
    }

    async fn lookup(&self, coordinate: Coordinate) -> PrimaryOutcome {
        let Some(api_key) = self.config.credential() else {
            return PrimaryOutcome::Failed {
                status: None,
                body: "no credential configured".to_string(),
            };
        };

        match self.fetch(api_key, coordinate).await {
            Ok(body) => PrimaryOutcome::Found(extract_attributes(self.config.contract, body)),
            Err(LookupError::Upstream { status, body, .. }) => {
                tracing::warn!("⚠️ Point upstream error: status={:?}", status);
                PrimaryOutcome::Failed { status, body }
            }
            Err(e) => {
                tracing::warn!("⚠️ Point request failed: {}", e);
                PrimaryOutcome::Failed {
                    status: None,
                    body: e.to_string(),
                }
            }
        }
    }
}

/// 依路徑 (例如 "planning.zoning") 取出巢狀欄位
fn value_at<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.as_object()?.get(key))
}

fn text_at(value: &Value, path: &str) -> Option<String> {
    value_at(value, path).and_then(attribute_text)
}

pub fn extract_attributes(contract: PrimaryContract, body: Value) -> PrimaryAttributes {
    match contract {
        // 僅供診斷；規劃欄位保持 null
        PrimaryContract::AdminBoundaries => PrimaryAttributes {
            raw: body,
            ..Default::default()
        },
        PrimaryContract::PlanningLookup => PrimaryAttributes {
            summary: PlanningSummary {
                zoning: text_at(&body, "planning.zoning"),
                fsr: text_at(&body, "planning.fsr"),
                hob: text_at(&body, "planning.hob"),
            },
            overlays: Overlays {
                bushfire: text_at(&body, "hazards.bushfire"),
                flood: text_at(&body, "hazards.flood"),
                heritage: text_at(&body, "heritage"),
                easements: text_at(&body, "cadastral.easements"),
            },
            full_address: text_at(&body, "address.fullAddress"),
            raw: body,
        },
    }
}
