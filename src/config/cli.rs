use crate::config::toml_config::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "planning-at-point")]
#[command(about = "Planning controls lookup service for a WGS84 point")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the bind address, e.g. 127.0.0.1:8080
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// 檔案 → 環境變數 → 命令列，後者覆蓋前者
    pub fn load_service_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        config.apply_env_overrides();

        if let Some(bind) = &self.bind {
            config.server.bind = Some(bind.clone());
        }

        Ok(config)
    }
}
