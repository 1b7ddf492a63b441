use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use httpmock::prelude::*;
use planning_at_point::server::{router, AppState};
use planning_at_point::ServiceConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

/// 以 mock 伺服器取代 Point 與 ArcGIS 上游
fn config_for(server: &MockServer, api_key: Option<&str>, strict: bool) -> Result<ServiceConfig> {
    let key_line = api_key
        .map(|key| format!("api_key = \"{}\"", key))
        .unwrap_or_default();

    let toml_content = format!(
        r#"
[primary]
base_url = "{base}"
contract = "planning_lookup"
strict_upstream = {strict}
{key_line}

[fallback]
zoning_url = "{base}/layers/2"
fsr_url = "{base}/layers/1"
hob_url = "{base}/layers/5"

[geocode]
endpoint = "{base}/search"
"#,
        base = server.base_url(),
        strict = strict,
        key_line = key_line,
    );

    Ok(ServiceConfig::from_toml_str(&toml_content)?)
}

fn mock_layer(server: &MockServer, layer: u32, attributes: Value) {
    server.mock(move |when, then| {
        when.method(GET).path(format!("/layers/{}/query", layer));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"features": [{"attributes": attributes}]}));
    });
}

async fn call(config: &ServiceConfig, uri: &str) -> Result<(StatusCode, Value)> {
    let app = router(AppState::from_config(config)?);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_public_layers_only_without_credential() -> Result<()> {
    let server = MockServer::start();
    mock_layer(&server, 2, json!({"ZONE": "R2", "LABEL": "Low Density Residential"}));
    mock_layer(&server, 1, json!({"FSR": "0.5"}));
    mock_layer(&server, 5, json!({"MaxHeight": 12.0}));

    let point_mock = server.mock(|when, then| {
        when.method(GET).path("/v3/api/planningLookup");
        then.status(200).json_body(json!({}));
    });

    let config = config_for(&server, None, false)?;
    let (status, body) = call(&config, "/api/nswPlanningAtPoint?lat=-33.797&lon=151.285").await?;

    point_mock.assert_hits(0);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["address"], "Address TBC");
    assert_eq!(body["coords"], json!({"lat": -33.797, "lon": 151.285}));
    assert_eq!(body["zoning"], "R2");
    assert_eq!(body["fsr"], "0.5");
    assert_eq!(body["hob"], "12");
    assert_eq!(
        body["overlays"],
        json!({"bushfire": null, "flood": null, "heritage": null, "easements": null})
    );
    assert_eq!(body["diagnostics"]["arcgis"]["zoning"], "R2");
    assert!(body["diagnostics"].get("point").is_none());
    Ok(())
}

#[tokio::test]
async fn test_primary_fields_take_precedence_and_skip_layers() -> Result<()> {
    let server = MockServer::start();
    let point_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/api/planningLookup")
            .header("x-api-key", "test-key");
        then.status(200).json_body(json!({
            "planning": {"zoning": "E1", "fsr": null, "hob": null},
            "hazards": {"bushfire": "Buffer", "flood": null},
            "heritage": "Local item",
            "address": {"fullAddress": "5 Sydney Rd, Manly NSW 2095"}
        }));
    });
    let layer_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/layers/");
        then.status(200).json_body(json!({"features": []}));
    });

    let config = config_for(&server, Some("test-key"), false)?;
    let (status, body) = call(&config, "/api/nswPlanningAtPoint?lat=-33.79&lon=151.28").await?;

    point_mock.assert();
    layer_mock.assert_hits(0);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zoning"], "E1");
    assert!(body["fsr"].is_null());
    assert!(body["hob"].is_null());
    assert_eq!(body["address"], "5 Sydney Rd, Manly NSW 2095");
    assert_eq!(body["overlays"]["bushfire"], "Buffer");
    assert_eq!(body["overlays"]["heritage"], "Local item");
    assert_eq!(body["diagnostics"]["sources"]["zoning"], "primary");
    Ok(())
}

#[tokio::test]
async fn test_primary_error_falls_back_to_layers() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v3/api/planningLookup");
        then.status(401).body("invalid key");
    });
    mock_layer(&server, 2, json!({"ZoneCode": "B2"}));
    mock_layer(&server, 1, json!({}));
    server.mock(|when, then| {
        when.method(GET).path("/layers/5/query");
        then.status(502);
    });

    let config = config_for(&server, Some("expired"), false)?;
    let (status, body) = call(&config, "/api/nswPlanningAtPoint?lat=-33.8&lon=151.2").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["zoning"], "B2");
    assert!(body["fsr"].is_null());
    assert!(body["hob"].is_null());
    assert_eq!(
        body["diagnostics"]["point"],
        json!({"error": "upstream error (Point)", "status": 401, "body": "invalid key"})
    );
    let hob_error = body["diagnostics"]["arcgis"]["errors"]["hob"]
        .as_str()
        .unwrap_or_default();
    assert!(hob_error.contains("status=502"), "{}", hob_error);
    Ok(())
}

#[tokio::test]
async fn test_strict_mode_returns_bad_gateway() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v3/api/planningLookup");
        then.status(500).body("internal");
    });

    let config = config_for(&server, Some("key"), true)?;
    let (status, body) = call(&config, "/api/nswPlanningAtPoint?lat=-33.8&lon=151.2").await?;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"ok": false, "error": "upstream error (Point)"}));
    Ok(())
}

#[tokio::test]
async fn test_invalid_coordinates_never_reach_upstream() -> Result<()> {
    let server = MockServer::start();
    let any_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(json!({}));
    });

    let config = config_for(&server, Some("key"), false)?;
    for uri in [
        "/api/nswPlanningAtPoint",
        "/api/nswPlanningAtPoint?lat=-33.8",
        "/api/nswPlanningAtPoint?lat=&lon=151.2",
        "/api/nswPlanningAtPoint?lat=south&lon=151.2&address=Somewhere",
    ] {
        let (status, body) = call(&config, uri).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["ok"], false);
    }

    any_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_placeholders_do_not_depend_on_location() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("/layers/");
        then.status(200).json_body(json!({"features": []}));
    });

    let config = config_for(&server, None, false)?;
    let (_, first) = call(&config, "/api/nswPlanningAtPoint?lat=-33.8&lon=151.2").await?;
    let (_, second) = call(&config, "/api/nswPlanningAtPoint?lat=-28.6&lon=153.6").await?;

    assert_eq!(first["sepp_compliance"], second["sepp_compliance"]);
    assert_eq!(first["feasibility"], second["feasibility"]);
    assert_eq!(first["recommendations"], second["recommendations"]);
    assert_eq!(first["sepp_compliance"]["Townhouse"][0]["details"], "calc pending");
    Ok(())
}

#[tokio::test]
async fn test_geocode_proxy_returns_upstream_json() -> Result<()> {
    let server = MockServer::start();
    let search_mock = server.mock(|when, then| {
        when.method(GET).path("/search").query_param("q", "Manly Wharf");
        then.status(200)
            .json_body(json!([{"display_name": "Manly Wharf", "lat": "-33.80", "lon": "151.28"}]));
    });

    let config = config_for(&server, None, false)?;
    let (status, body) = call(&config, "/geocode?q=Manly%20Wharf").await?;

    search_mock.assert();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["display_name"], "Manly Wharf");
    Ok(())
}
