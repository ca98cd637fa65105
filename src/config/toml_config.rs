use crate::core::home::HomeLimits;
use crate::core::ConfigProvider;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub site: Option<SiteConfig>,
    pub gateway: GatewayConfig,
    pub store: StoreConfig,
    pub home: Option<HomeConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub freshness_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    pub hero_count: Option<usize>,
    pub latest_count: Option<usize>,
    pub trending_count: Option<usize>,
    pub related_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
    pub verbose: Option<bool>,
}

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_FRESHNESS_SECONDS: u64 = 30;
const DEFAULT_SETTINGS_TABLE: &str = "site_settings";
const DEFAULT_RELATED_COUNT: usize = 4;

impl PortalConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 沒有設定檔時改用環境變數
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| PortalError::MissingConfigError {
                field: name.to_string(),
            })
        };

        Ok(Self {
            site: None,
            gateway: GatewayConfig {
                base_url: required("PORTAL_API_URL")?,
                timeout_seconds: std::env::var("PORTAL_API_TIMEOUT")
                    .ok()
                    .and_then(|v| v.parse().ok()),
                freshness_seconds: None,
            },
            store: StoreConfig {
                base_url: required("PORTAL_STORE_URL")?,
                api_key: required("PORTAL_STORE_KEY")?,
                table: std::env::var("PORTAL_STORE_TABLE").ok(),
            },
            home: None,
            logging: None,
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_ANON_KEY})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortalError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("gateway.base_url", &self.gateway.base_url)?;
        validate_url("store.base_url", &self.store.base_url)?;
        validate_non_empty_string("store.api_key", &self.store.api_key)?;

        if self.store.api_key.contains("${") {
            return Err(PortalError::MissingConfigError {
                field: format!("store.api_key ({})", self.store.api_key),
            });
        }

        if let Some(table) = &self.store.table {
            validate_non_empty_string("store.table", table)?;
        }

        if let Some(timeout) = self.gateway.timeout_seconds {
            validate_range("gateway.timeout_seconds", timeout, 1, 120)?;
        }

        if let Some(home) = &self.home {
            for (field, value) in [
                ("home.hero_count", home.hero_count),
                ("home.latest_count", home.latest_count),
                ("home.trending_count", home.trending_count),
            ] {
                if let Some(value) = value {
                    validate_positive_number(field, value, 1)?;
                }
            }
        }

        if let Some(format) = self.logging.as_ref().and_then(|l| l.format.as_deref()) {
            if !["compact", "json"].contains(&format) {
                return Err(PortalError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn home_limits(&self) -> HomeLimits {
        let defaults = HomeLimits::default();
        match &self.home {
            Some(home) => HomeLimits {
                hero_count: home.hero_count.unwrap_or(defaults.hero_count),
                latest_count: home.latest_count.unwrap_or(defaults.latest_count),
                trending_count: home.trending_count.unwrap_or(defaults.trending_count),
            },
            None => defaults,
        }
    }

    pub fn related_count(&self) -> usize {
        self.home
            .as_ref()
            .and_then(|h| h.related_count)
            .unwrap_or(DEFAULT_RELATED_COUNT)
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .is_some_and(|f| f == "json")
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn site_name(&self) -> &str {
        self.site
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or("Portal de Notícias")
    }
}

impl ConfigProvider for PortalConfig {
    fn gateway_base_url(&self) -> &str {
        &self.gateway.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn freshness_window(&self) -> Duration {
        Duration::from_secs(
            self.gateway
                .freshness_seconds
                .unwrap_or(DEFAULT_FRESHNESS_SECONDS),
        )
    }

    fn store_base_url(&self) -> &str {
        &self.store.base_url
    }

    fn store_api_key(&self) -> &str {
        &self.store.api_key
    }

    fn settings_table(&self) -> &str {
        self.store.table.as_deref().unwrap_or(DEFAULT_SETTINGS_TABLE)
    }
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
