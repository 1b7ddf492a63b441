use clap::Parser;
use planning_at_point::utils::{logger, validation::Validate};
use planning_at_point::{server, CliConfig, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting planning-at-point");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_service_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if config.primary.credential().is_some() {
        tracing::info!("🔑 Primary provider enabled: {}", config.primary.endpoint());
    } else {
        tracing::info!("🌐 No primary credential, public layers only");
    }

    if cli.dry_run {
        display_config_summary(&config);
        return Ok(());
    }

    server::serve(&config).await
}

fn display_config_summary(config: &ServiceConfig) {
    use planning_at_point::config::toml_config::DEFAULT_BIND;
    use planning_at_point::domain::model::ControlType;

    println!("📋 Resolved configuration");
    println!("  Bind: {}", config.server.bind.as_deref().unwrap_or(DEFAULT_BIND));
    println!("  Primary endpoint: {}", config.primary.endpoint());
    println!("  Primary contract: {:?}", config.primary.contract);
    println!(
        "  Primary credential: {}",
        if config.primary.credential().is_some() { "configured" } else { "absent" }
    );
    println!("  Strict upstream: {}", config.primary.strict_upstream);
    for control in ControlType::ALL {
        println!(
            "  {} layer: {} [{}]",
            control.as_str(),
            config.fallback.layer_url(control),
            config.fallback.candidate_fields(control).join(", ")
        );
    }
    println!("  Geocode endpoint: {}", config.geocode.endpoint);
}
