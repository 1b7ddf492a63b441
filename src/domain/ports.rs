use crate::domain::model::{Coordinate, FallbackAttributes, PrimaryOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Keyed planning lookup. Only consulted when a credential is configured.
#[async_trait]
pub trait PrimaryProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn lookup(&self, coordinate: Coordinate) -> PrimaryOutcome;
}

/// Public map-layer lookup. Never fails as a whole; each layer settles on its own.
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    async fn lookup(&self, coordinate: Coordinate) -> FallbackAttributes;
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<serde_json::Value>;
}
