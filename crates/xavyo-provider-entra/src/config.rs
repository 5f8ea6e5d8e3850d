//! Entra ID provider configuration.
//!
//! Loaded from YAML (or built in code), then overridden from the environment
//! using the same variable names as other Azure tooling.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use xavyo_provider::logging::{self, LogFormat};

use crate::{EntraError, EntraResult};

/// Azure cloud the tenant lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntraCloudEnvironment {
    /// Azure public cloud.
    #[default]
    Global,
    /// Azure US Government.
    #[serde(alias = "usgov")]
    UsGovernment,
    /// Azure China (21Vianet).
    China,
}

impl EntraCloudEnvironment {
    /// Microsoft Graph endpoint for this cloud.
    #[must_use]
    pub fn graph_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://graph.microsoft.com",
            Self::UsGovernment => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
        }
    }

    /// Login (token) endpoint for this cloud.
    #[must_use]
    pub fn login_endpoint(&self) -> &'static str {
        match self {
            Self::Global => "https://login.microsoftonline.com",
            Self::UsGovernment => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
        }
    }

    fn parse(value: &str) -> EntraResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "global" | "public" => Ok(Self::Global),
            "usgovernment" | "usgov" => Ok(Self::UsGovernment),
            "china" => Ok(Self::China),
            other => Err(EntraError::Config(format!("unknown cloud environment: {other}"))),
        }
    }
}

/// Client credentials for the service principal.
#[derive(Debug, Clone)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl EntraCredentials {
    /// Reads `ARM_CLIENT_ID` and `ARM_CLIENT_SECRET`.
    pub fn from_env() -> EntraResult<Self> {
        let client_id = std::env::var("ARM_CLIENT_ID")
            .map_err(|_| EntraError::Config("ARM_CLIENT_ID is not set".to_string()))?;
        let client_secret = std::env::var("ARM_CLIENT_SECRET")
            .map_err(|_| EntraError::Config("ARM_CLIENT_SECRET is not set".to_string()))?;

        Ok(Self {
            client_id,
            client_secret: client_secret.into(),
        })
    }
}

/// Gateway retry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber for this configuration.
    pub fn init(&self) -> EntraResult<()> {
        logging::try_init_logging(&self.level, self.format).map_err(EntraError::Config)
    }
}

fn default_log_level() -> String {
    "info,xavyo_provider=debug".to_string()
}

/// Root provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EntraConfig {
    pub tenant_id: String,
    #[serde(default)]
    pub environment: EntraCloudEnvironment,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Overrides the cloud's Graph endpoint.
    #[serde(default)]
    pub graph_endpoint: Option<String>,
    /// Overrides the cloud's login endpoint.
    #[serde(default)]
    pub login_endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_api_version() -> String {
    "v1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl EntraConfig {
    /// Start building a configuration in code.
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> EntraResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            EntraError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> EntraResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| EntraError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> EntraResult<()> {
        if let Ok(tenant_id) = std::env::var("ARM_TENANT_ID") {
            self.tenant_id = tenant_id;
        }
        if let Ok(environment) = std::env::var("ARM_ENVIRONMENT") {
            self.environment = EntraCloudEnvironment::parse(&environment)?;
        }
        self.validate()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EntraResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(EntraError::Config("tenant_id is required".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(EntraError::Config("api_version must not be empty".to_string()));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(EntraError::Config(
                "retry.max_delay_ms must be >= retry.base_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Graph base URL including the API version.
    #[must_use]
    pub fn graph_base_url(&self) -> String {
        let endpoint = self
            .graph_endpoint
            .as_deref()
            .unwrap_or(self.environment.graph_endpoint())
            .trim_end_matches('/');
        format!("{}/{}", endpoint, self.api_version)
    }

    /// OAuth2 token URL for the tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        let endpoint = self
            .login_endpoint
            .as_deref()
            .unwrap_or(self.environment.login_endpoint())
            .trim_end_matches('/');
        format!("{}/{}/oauth2/v2.0/token", endpoint, self.tenant_id)
    }

    /// Scope requested for Graph tokens.
    #[must_use]
    pub fn token_scope(&self) -> String {
        format!("{}/.default", self.environment.graph_endpoint())
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    environment: EntraCloudEnvironment,
    api_version: Option<String>,
    graph_endpoint: Option<String>,
    login_endpoint: Option<String>,
    timeout_secs: Option<u64>,
    retry: Option<RetryConfig>,
}

impl EntraConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn environment(mut self, environment: EntraCloudEnvironment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Point both Graph and login endpoints at one base URL (mock servers).
    #[must_use]
    pub fn endpoint_override(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.graph_endpoint = Some(base_url.clone());
        self.login_endpoint = Some(base_url);
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let config = EntraConfig {
            tenant_id: self.tenant_id.unwrap_or_default(),
            environment: self.environment,
            api_version: self.api_version.unwrap_or_else(default_api_version),
            graph_endpoint: self.graph_endpoint,
            login_endpoint: self.login_endpoint,
            timeout_secs: self.timeout_secs.unwrap_or_else(default_timeout_secs),
            retry: self.retry.unwrap_or_default(),
            logging: LoggingConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }
}
