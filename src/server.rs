//! HTTP surface: planning lookup, geocode proxy and service info.

use crate::adapters::{ArcGisClient, NominatimClient, PointClient};
use crate::config::{InfoConfig, ServiceConfig};
use crate::core::coordinate::LookupQuery;
use crate::core::lookup::PlanningLookup;
use crate::domain::model::LookupReport;
use crate::domain::ports::Geocoder;
use crate::utils::error::{ErrorCategory, LookupError, Result};
use crate::utils::logger;
use axum::extract::{RawQuery, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::Instrument;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<PlanningLookup>,
    pub geocoder: Arc<dyn Geocoder>,
    pub info: InfoConfig,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let primary = PointClient::new(config.primary.clone())?;
        let fallback = ArcGisClient::new(config.fallback.clone())?;
        let lookup = PlanningLookup::new(Arc::new(primary), Arc::new(fallback))
            .with_strict_upstream(config.primary.strict_upstream);

        Ok(Self {
            lookup: Arc::new(lookup),
            geocoder: Arc::new(NominatimClient::new(&config.geocode)?),
            info: config.info.clone(),
        })
    }
}

/// `{ok:false, error}` response for a failed lookup.
pub struct ApiError(pub LookupError);

impl From<LookupError> for ApiError {
    fn from(error: LookupError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        match error.category() {
            ErrorCategory::Input => tracing::warn!("Rejected request: {}", error),
            ErrorCategory::Upstream => tracing::warn!("Upstream failure: {:?}", error),
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!("SERVER_ERROR handler crash: {:?}", error)
            }
        }

        let status =
            StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({"ok": false, "error": error.public_message()});
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/nswPlanningAtPoint", get(planning_at_point))
        .route("/api/info", get(info))
        .route("/geocode", get(geocode))
        .route("/health", get(health))
        .layer(middleware::from_fn(catch_panic))
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

pub async fn serve(config: &ServiceConfig) -> anyhow::Result<()> {
    let bind_address = config.bind_address()?;
    let state = AppState::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("🚀 Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

async fn planning_at_point(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> std::result::Result<Json<LookupReport>, ApiError> {
    let query = LookupQuery::from_query_string(raw.as_deref());
    let report = state.lookup.run(&query).await?;
    Ok(Json(report))
}

async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "url": state.info.url,
        "env": state.info.env,
        "sha": state.info.sha,
    }))
}

async fn geocode(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let address = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned());

    let Some(address) = address.as_deref().filter(|q| !q.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing address parameter"})),
        )
            .into_response();
    };

    match state.geocoder.search(address).await {
        Ok(results) => Json(results).into_response(),
        Err(e) => {
            tracing::warn!("Geocode failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn trace_request(request: Request, next: Next) -> Response {
    let request_id = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed).to_string();
    let span = logger::request_span(request.uri().path(), &request_id);
    next.run(request).instrument(span).await
}

// 處理器 panic 時回傳 500，細節只寫入伺服器日誌
async fn catch_panic(request: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            ApiError(LookupError::Internal { message: detail }).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Coordinate, FallbackAttributes, PlanningSummary, PrimaryOutcome};
    use crate::domain::ports::{FallbackProvider, PrimaryProvider};
    use async_trait::async_trait;
    use axum::body::Body;
    use tower::ServiceExt;

    struct Unconfigured;

    #[async_trait]
    impl PrimaryProvider for Unconfigured {
        fn is_configured(&self) -> bool {
            false
        }

        async fn lookup(&self, _coordinate: Coordinate) -> PrimaryOutcome {
            unreachable!("primary must not be called without a credential")
        }
    }

    struct FixedLayers;

    #[async_trait]
    impl FallbackProvider for FixedLayers {
        async fn lookup(&self, coordinate: Coordinate) -> FallbackAttributes {
            if coordinate.lat == 0.0 {
                panic!("layer query exploded");
            }
            FallbackAttributes {
                summary: PlanningSummary {
                    zoning: Some("R2".to_string()),
                    fsr: Some("0.5".to_string()),
                    hob: None,
                },
                ..Default::default()
            }
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn search(&self, _query: &str) -> Result<serde_json::Value> {
            Err(LookupError::Upstream {
                source_name: "Nominatim".to_string(),
                status: Some(503),
                body: String::new(),
            })
        }
    }

    fn app() -> Router {
        router(AppState {
            lookup: Arc::new(PlanningLookup::new(Arc::new(Unconfigured), Arc::new(FixedLayers))),
            geocoder: Arc::new(FailingGeocoder),
            info: InfoConfig {
                url: Some("planning.example.test".to_string()),
                env: Some("test".to_string()),
                sha: None,
            },
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_lookup_route_success() {
        let (status, body) =
            get_json("/api/nswPlanningAtPoint?lat=-33.8688&lon=151.2093&address=Town%20Hall").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["address"], "Town Hall");
        assert_eq!(body["coords"], json!({"lat": -33.8688, "lon": 151.2093}));
        assert_eq!(body["zoning"], "R2");
        assert_eq!(body["fsr"], "0.5");
        assert!(body["hob"].is_null());
        assert_eq!(body["diagnostics"]["arcgis"]["zoning"], "R2");
    }

    #[tokio::test]
    async fn test_lookup_route_validation_errors() {
        let (status, body) = get_json("/api/nswPlanningAtPoint?lat=-33.8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"ok": false, "error": "lat/lon required"}));

        let (status, body) = get_json("/api/nswPlanningAtPoint?lat=abc&lon=151&address=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"ok": false, "error": "lat/lon must be numbers"}));
    }

    #[tokio::test]
    async fn test_repeated_query_keys_use_first_value() {
        let (status, body) =
            get_json("/api/nswPlanningAtPoint?lat=-33.8&lat=-33.9&lon=151.2&lon=abc").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["coords"], json!({"lat": -33.8, "lon": 151.2}));
    }

    #[tokio::test]
    async fn test_odd_query_strings_still_answer_json() {
        for uri in [
            "/api/nswPlanningAtPoint?lat",
            "/api/nswPlanningAtPoint?&&=&lat=%ZZ&lon=1",
            "/api/nswPlanningAtPoint?lat[]=1&lon[]=2",
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["ok"], false, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_generic_500() {
        let (status, body) = get_json("/api/nswPlanningAtPoint?lat=0&lon=0").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"ok": false, "error": "handler crash"}));
    }

    #[tokio::test]
    async fn test_geocode_route() {
        let (status, body) = get_json("/geocode").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing address parameter"}));

        let (status, _) = get_json("/geocode?q=&q=Manly").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get_json("/geocode?q=Manly&q=Dee%20Why").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "upstream error (Nominatim)"}));
    }

    #[tokio::test]
    async fn test_info_and_health() {
        let (status, body) = get_json("/api/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["name"], "planning-at-point");
        assert_eq!(body["url"], "planning.example.test");
        assert_eq!(body["env"], "test");
        assert!(body["sha"].is_null());

        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
}
