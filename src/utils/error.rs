use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("{resource} not found: {key}")]
    NotFound { resource: String, key: String },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Settings store error: {message}")]
    StoreError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    NotFound,
    Data,
    Configuration,
    Storage,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PortalError {
    pub fn not_found(resource: &str, key: impl Into<String>) -> Self {
        PortalError::NotFound {
            resource: resource.to_string(),
            key: key.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        PortalError::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortalError::NotFound { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PortalError::ApiError(_) | PortalError::UpstreamStatus { .. } => ErrorCategory::Network,
            PortalError::NotFound { .. } => ErrorCategory::NotFound,
            PortalError::MalformedPayload { .. } | PortalError::SerializationError(_) => {
                ErrorCategory::Data
            }
            PortalError::ConfigError { .. }
            | PortalError::ConfigValidationError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PortalError::IoError(_) | PortalError::StoreError { .. } => ErrorCategory::Storage,
            PortalError::ValidationError { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息（葡萄牙文介面）
    pub fn user_friendly_message(&self) -> String {
        match self {
            PortalError::NotFound { resource, key } => {
                format!("{} não encontrado: {}", resource, key)
            }
            PortalError::ApiError(_) | PortalError::UpstreamStatus { .. } => {
                "Não foi possível carregar as notícias no momento.".to_string()
            }
            PortalError::MalformedPayload { .. } | PortalError::SerializationError(_) => {
                "O serviço de notícias respondeu com dados inválidos.".to_string()
            }
            PortalError::StoreError { .. } => {
                "Não foi possível salvar as configurações.".to_string()
            }
            PortalError::ValidationError { message } => format!("Dados inválidos: {}", message),
            other => format!("Erro de configuração: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the gateway base_url and network connectivity, then try again",
            ErrorCategory::NotFound => "Verify the slug or go back to the home page",
            ErrorCategory::Data => "The upstream payload changed shape; inspect it with --verbose",
            ErrorCategory::Configuration => "Review portal.toml and the referenced environment variables",
            ErrorCategory::Storage => "Check the settings store credentials and table name",
            ErrorCategory::Input => "Fix the command arguments and retry",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
