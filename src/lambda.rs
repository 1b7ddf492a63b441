#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use planning_at_point::server::AppState;
#[cfg(feature = "lambda")]
use planning_at_point::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use planning_at_point::{LookupQuery, ServiceConfig};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use serde_json::Value;
#[cfg(feature = "lambda")]
use tracing::Instrument;

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub address: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

#[cfg(feature = "lambda")]
async fn function_handler(state: &AppState, event: LambdaEvent<Request>) -> Result<Response, Error> {
    let span = logger::request_span("lambda", &event.context.request_id);
    let query = LookupQuery {
        lat: event.payload.lat,
        lon: event.payload.lon,
        address: event.payload.address,
    };

    match state.lookup.run(&query).instrument(span).await {
        Ok(report) => Ok(Response {
            status_code: 200,
            body: serde_json::to_value(report)?,
        }),
        Err(e) => {
            tracing::warn!("Lookup failed ({:?}): {}", e.category(), e);
            Ok(Response {
                status_code: e.status_code(),
                body: serde_json::json!({"ok": false, "error": e.public_message()}),
            })
        }
    }
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // Lambda 只從環境變數讀取設定
    let mut config = match std::env::var("PLANNING_CONFIG") {
        Ok(path) => ServiceConfig::from_file(path)?,
        Err(_) => ServiceConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;

    let state = AppState::from_config(&config)?;
    tracing::info!("Planning lookup Lambda ready");

    run(service_fn(|event| function_handler(&state, event))).await
}
