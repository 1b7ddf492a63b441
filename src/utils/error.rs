use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("upstream error ({source_name})")]
    Upstream {
        source_name: String,
        status: Option<u16>,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// 錯誤分類，用於日誌與回應碼對應
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Upstream,
    Configuration,
    Internal,
}

impl LookupError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::Input,
            Self::Upstream { .. } | Self::Http(_) => ErrorCategory::Upstream,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::Io(_) | Self::Serialization(_) | Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// 對外回應使用的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Input => 400,
            ErrorCategory::Upstream => 502,
            ErrorCategory::Configuration | ErrorCategory::Internal => 500,
        }
    }

    /// 呼叫端可見的訊息；內部細節只留在伺服器日誌
    pub fn public_message(&self) -> String {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Upstream => self.to_string(),
            ErrorCategory::Configuration | ErrorCategory::Internal => "handler crash".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;
