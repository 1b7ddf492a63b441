use crate::domain::model::ControlType;
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_non_empty_string, validate_positive_number,
    validate_socket_addr, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const POINT_BASE_URL: &str = "https://point.digital.nsw.gov.au";
pub const ARCGIS_BASE_URL: &str =
    "https://mapprod3.environment.nsw.gov.au/arcgis/rest/services/Planning";
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub primary: PrimaryConfig,
    pub fallback: FallbackConfig,
    pub geocode: GeocodeConfig,
    pub info: InfoConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

/// 主要供應商的上游介面版本
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryContract {
    /// v3 point lookup returning nested planning/hazards/cadastral sections
    #[default]
    PlanningLookup,
    /// v2 admin boundaries; proves auth and location, carries no planning controls
    AdminBoundaries,
}

impl PrimaryContract {
    pub fn default_path(&self) -> &'static str {
        match self {
            PrimaryContract::PlanningLookup => "/v3/api/planningLookup",
            PrimaryContract::AdminBoundaries => "/v2/api/adminBoundaries",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub base_url: String,
    pub path: Option<String>,
    pub contract: PrimaryContract,
    pub api_key: Option<String>,
    pub header_name: String,
    pub strict_upstream: bool,
    pub timeout_seconds: Option<u64>,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: POINT_BASE_URL.to_string(),
            path: None,
            contract: PrimaryContract::default(),
            api_key: None,
            header_name: "x-api-key".to_string(),
            strict_upstream: false,
            timeout_seconds: None,
        }
    }
}

impl PrimaryConfig {
    pub fn endpoint(&self) -> String {
        let path = self
            .path
            .as_deref()
            .unwrap_or_else(|| self.contract.default_path());
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// 空白或未替換的 `${VAR}` 視為未設定
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSet {
    #[default]
    PlanningPortal,
    EpiPrimary,
}

impl LayerSet {
    fn service_url(&self) -> String {
        match self {
            LayerSet::PlanningPortal => format!("{}/Planning_Portal/MapServer", ARCGIS_BASE_URL),
            LayerSet::EpiPrimary => {
                format!("{}/EPI_Primary_Planning_Layers/MapServer", ARCGIS_BASE_URL)
            }
        }
    }

    fn layer_id(control: ControlType) -> u32 {
        match control {
            ControlType::Zoning => 2,
            ControlType::Fsr => 1,
            ControlType::Hob => 5,
        }
    }

    pub fn layer_url(&self, control: ControlType) -> String {
        format!("{}/{}", self.service_url(), Self::layer_id(control))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub layer_set: LayerSet,
    pub zoning_url: Option<String>,
    pub fsr_url: Option<String>,
    pub hob_url: Option<String>,
    pub zoning_fields: Vec<String>,
    pub fsr_fields: Vec<String>,
    pub hob_fields: Vec<String>,
    pub timeout_seconds: Option<u64>,
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            layer_set: LayerSet::default(),
            zoning_url: None,
            fsr_url: None,
            hob_url: None,
            zoning_fields: fields(&["ZONE", "ZONING", "ZoneCode", "Zone", "LABEL"]),
            fsr_fields: fields(&["FSR", "MAX_FSR", "Fsr", "RATIO", "LABEL"]),
            hob_fields: fields(&["HOB", "HEIGHT", "MaxHeight", "LABEL"]),
            timeout_seconds: None,
        }
    }
}

impl FallbackConfig {
    /// 明確設定的 URL 優先，否則使用圖層組預設
    pub fn layer_url(&self, control: ControlType) -> String {
        let explicit = match control {
            ControlType::Zoning => self.zoning_url.as_ref(),
            ControlType::Fsr => self.fsr_url.as_ref(),
            ControlType::Hob => self.hob_url.as_ref(),
        };
        explicit
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| self.layer_set.layer_url(control))
    }

    pub fn candidate_fields(&self, control: ControlType) -> &[String] {
        match control {
            ControlType::Zoning => &self.zoning_fields,
            ControlType::Fsr => &self.fsr_fields,
            ControlType::Hob => &self.hob_fields,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            user_agent: "northern-beaches-dev/1.0".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    /// Public deployment URL reported by `/api/info`
    pub url: Option<String>,
    pub env: Option<String>,
    pub sha: Option<String>,
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LookupError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POINT_API_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LookupError::Internal {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以環境變數補上檔案中未設定的值
    pub fn apply_env_overrides(&mut self) {
        if self.primary.credential().is_none() {
            if let Ok(key) = std::env::var("POINT_API_KEY") {
                self.primary.api_key = Some(key);
            }
        }
        if self.server.bind.is_none() {
            if let Ok(port) = std::env::var("PORT") {
                self.server.bind = Some(format!("0.0.0.0:{}", port.trim()));
            }
        }
        if self.info.url.is_none() {
            self.info.url = std::env::var("PUBLIC_URL").ok();
        }
        if self.info.env.is_none() {
            self.info.env = std::env::var("APP_ENV").ok();
        }
        if self.info.sha.is_none() {
            self.info.sha = std::env::var("GIT_COMMIT_SHA").ok();
        }
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", self.server.bind.as_deref().unwrap_or(DEFAULT_BIND))
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.bind_address()?;

        validate_url("primary.base_url", &self.primary.base_url)?;
        validate_url("primary endpoint", &self.primary.endpoint())?;
        validate_non_empty_string("primary.header_name", &self.primary.header_name)?;
        if let Some(timeout) = self.primary.timeout_seconds {
            validate_positive_number("primary.timeout_seconds", timeout, 1)?;
        }

        for control in ControlType::ALL {
            let field = format!("fallback.{}_url", control.as_str());
            validate_url(&field, &self.fallback.layer_url(control))?;

            let field = format!("fallback.{}_fields", control.as_str());
            validate_non_empty_list(&field, self.fallback.candidate_fields(control))?;
        }
        if let Some(timeout) = self.fallback.timeout_seconds {
            validate_positive_number("fallback.timeout_seconds", timeout, 1)?;
        }

        validate_url("geocode.endpoint", &self.geocode.endpoint)?;
        validate_non_empty_string("geocode.user_agent", &self.geocode.user_agent)?;
        validate_positive_number("geocode.timeout_seconds", self.geocode.timeout_seconds, 1)?;

        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
