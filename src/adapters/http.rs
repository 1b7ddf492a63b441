use crate::utils::error::{LookupError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// 未設定逾時時使用 reqwest 預設行為
pub fn build_client(timeout_seconds: Option<u64>, user_agent: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout));
    }
    if let Some(agent) = user_agent {
        builder = builder.user_agent(agent.to_string());
    }
    Ok(builder.build()?)
}

/// Turn a non-success response into an upstream error carrying status and raw body.
pub async fn ensure_success(source_name: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("📡 {} responded {}: {}", source_name, status, body);
    Err(LookupError::Upstream {
        source_name: source_name.to_string(),
        status: Some(status.as_u16()),
        body,
    })
}
