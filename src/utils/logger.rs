//! Subscriber setup for the server binary and the Lambda handler.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "planning_at_point=info";
const VERBOSE_DIRECTIVE: &str = "planning_at_point=debug,info";

/// `RUST_LOG` takes precedence over the built-in directive.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let directive = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_target(verbose).compact())
        .init();
}

pub fn init_lambda_logger() {
    // CloudWatch 已有時間戳；request span 欄位平鋪到每筆事件
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Span carried by every event logged while a lookup request is handled.
pub fn request_span(route: &str, request_id: &str) -> tracing::Span {
    tracing::info_span!("request", route, request_id)
}
