use crate::adapters::http::{build_client, ensure_success};
use crate::config::FallbackConfig;
use crate::domain::model::{
    attribute_text, ControlType, Coordinate, FallbackAttributes, ProviderAttributes,
};
use crate::domain::ports::FallbackProvider;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const SOURCE_NAME: &str = "ArcGIS";

/// Public ArcGIS map-layer client, one point-intersection query per control.
pub struct ArcGisClient {
    config: FallbackConfig,
    client: Client,
}

impl ArcGisClient {
    pub fn new(config: FallbackConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds, None)?;
        Ok(Self { config, client })
    }

    /// 查詢單一圖層，回傳第一個相交要素的屬性
    pub async fn query_layer(
        &self,
        layer_url: &str,
        coordinate: Coordinate,
    ) -> Result<Option<ProviderAttributes>> {
        let geometry = point_geometry(coordinate).to_string();
        let query_url = format!("{}/query", layer_url);

        tracing::debug!("📡 ArcGIS query: {}", query_url);

        let response = self
            .client
            .get(&query_url)
            .query(&[
                ("f", "json"),
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryPoint"),
                ("inSR", "4326"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("outFields", "*"),
                ("returnGeometry", "false"),
            ])
            .send()
            .await?;

        let response = ensure_success(SOURCE_NAME, response).await?;
        let body: Value = response.json().await?;
        Ok(first_feature_attributes(body))
    }

    /// 失敗時回傳供診斷用的訊息
    async fn resolve(
        &self,
        control: ControlType,
        coordinate: Coordinate,
    ) -> std::result::Result<Option<String>, String> {
        let layer_url = self.config.layer_url(control);
        let attrs = self
            .query_layer(&layer_url, coordinate)
            .await
            .map_err(|e| describe_failure(&layer_url, &e))?;
        Ok(pick(attrs.as_ref(), self.config.candidate_fields(control)))
    }
}

#[async_trait]
impl FallbackProvider for ArcGisClient {
    async fn lookup(&self, coordinate: Coordinate) -> FallbackAttributes {
        let (zoning, fsr, hob) = futures::join!(
            self.resolve(ControlType::Zoning, coordinate),
            self.resolve(ControlType::Fsr, coordinate),
            self.resolve(ControlType::Hob, coordinate),
        );

        let mut result = FallbackAttributes::default();
        for (control, outcome) in [
            (ControlType::Zoning, zoning),
            (ControlType::Fsr, fsr),
            (ControlType::Hob, hob),
        ] {
            match outcome {
                Ok(value) => result.summary.set(control, value),
                Err(message) => {
                    // 單一圖層失敗不影響其他圖層
                    tracing::warn!("⚠️ {} layer unavailable: {}", control.as_str(), message);
                    result.errors.insert(control.as_str().to_string(), message);
                }
            }
        }

        tracing::debug!("📥 ArcGIS resolved: {:?}", result.summary);
        result
    }
}

fn describe_failure(layer_url: &str, error: &LookupError) -> String {
    match error {
        LookupError::Upstream {
            status: Some(status),
            ..
        } => format!("ArcGIS layer failed: {} status={}", layer_url, status),
        other => format!("ArcGIS layer failed: {} ({})", layer_url, other),
    }
}

/// Esri point geometry in WGS84.
pub fn point_geometry(coordinate: Coordinate) -> Value {
    json!({
        "x": coordinate.lon,
        "y": coordinate.lat,
        "spatialReference": {"wkid": 4326}
    })
}

pub fn first_feature_attributes(body: Value) -> Option<ProviderAttributes> {
    let Value::Object(mut root) = body else {
        return None;
    };
    let Some(Value::Array(features)) = root.remove("features") else {
        return None;
    };
    match features.into_iter().next()? {
        Value::Object(mut feature) => match feature.remove("attributes")? {
            Value::Object(attrs) => Some(attrs),
            _ => None,
        },
        _ => None,
    }
}

/// First candidate field holding a non-empty value wins.
pub fn pick(attrs: Option<&ProviderAttributes>, candidates: &[String]) -> Option<String> {
    let attrs = attrs?;
    candidates
        .iter()
        .find_map(|key| attrs.get(key).and_then(attribute_text))
}
