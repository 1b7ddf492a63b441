use crate::core::assembler::{assemble, ReportParts};
use crate::core::coordinate::LookupQuery;
use crate::core::merge::{merge, needs_fallback};
use crate::domain::model::{LookupReport, Overlays, PrimaryOutcome};
use crate::domain::ports::{FallbackProvider, PrimaryProvider};
use crate::utils::error::{LookupError, Result};
use serde_json::json;
use std::sync::Arc;

/// validate → primary → (fallback) → merge → assemble
pub struct PlanningLookup {
    primary: Arc<dyn PrimaryProvider>,
    fallback: Arc<dyn FallbackProvider>,
    strict_upstream: bool,
}

impl PlanningLookup {
    pub fn new(primary: Arc<dyn PrimaryProvider>, fallback: Arc<dyn FallbackProvider>) -> Self {
        Self {
            primary,
            fallback,
            strict_upstream: false,
        }
    }

    /// 嚴格模式：主要供應商非成功回應直接回報 502
    pub fn with_strict_upstream(mut self, strict: bool) -> Self {
        self.strict_upstream = strict;
        self
    }

    pub async fn run(&self, query: &LookupQuery) -> Result<LookupReport> {
        let coordinate = query.coordinate()?;
        tracing::info!("🔍 Planning lookup at ({}, {})", coordinate.lat, coordinate.lon);

        let credential_configured = self.primary.is_configured();
        let primary = if credential_configured {
            Some(self.primary.lookup(coordinate).await)
        } else {
            tracing::debug!("Primary provider not configured, using public layers only");
            None
        };

        let point_diagnostics = match &primary {
            Some(PrimaryOutcome::Failed { status, body }) => {
                if self.strict_upstream {
                    tracing::warn!("❌ Point upstream error in strict mode: {:?}", status);
                    return Err(LookupError::Upstream {
                        source_name: "Point".to_string(),
                        status: *status,
                        body: body.clone(),
                    });
                }
                Some(json!({
                    "error": "upstream error (Point)",
                    "status": status,
                    "body": body,
                }))
            }
            Some(PrimaryOutcome::Found(attrs)) => Some(attrs.raw.clone()),
            None => None,
        };

        let primary_attrs = primary.as_ref().and_then(PrimaryOutcome::attributes);
        let primary_summary = primary_attrs.map(|attrs| &attrs.summary);

        let fallback = if needs_fallback(credential_configured, primary_summary) {
            tracing::debug!("Querying public layers");
            Some(self.fallback.lookup(coordinate).await)
        } else {
            tracing::debug!("Primary supplied planning controls, public layers skipped");
            None
        };

        let merged = merge(primary_summary, fallback.as_ref().map(|f| &f.summary));
        tracing::info!(
            "✅ Resolved zoning={:?} fsr={:?} hob={:?}",
            merged.summary.zoning,
            merged.summary.fsr,
            merged.summary.hob
        );

        Ok(assemble(ReportParts {
            coordinate,
            requested_address: query.display_address(),
            provider_address: primary_attrs.and_then(|attrs| attrs.full_address.as_deref()),
            merged,
            overlays: primary_attrs
                .map(|attrs| attrs.overlays.clone())
                .unwrap_or_else(Overlays::default),
            point_diagnostics,
            arcgis_diagnostics: fallback,
        }))
    }
}
