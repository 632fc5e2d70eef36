//! Configuration management for CLI, environment variables, and config files.
//!
//! Only the binary and [`create_client`](crate::api::create_client) read
//! this; the request functions take credentials as plain parameters.

use crate::api::{API_URL, DEFAULT_PROGRESS_INTERVAL};
use crate::error::{StreamableError, ValidationIssue};
use crate::types::Credentials;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MAX_TIMEOUT_SECS: u64 = 3600;

/// Main configuration for the streamable client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for the streamable API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in seconds, unset for no timeout
    pub timeout_secs: Option<u64>,
    pub progress_interval_ms: u64,
}

/// Configuration for logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: API_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: None,
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Credentials built from the configured pair. Missing values become empty,
    /// which leaves requests unauthenticated.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.username.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> Result<Self, StreamableError> {
        let content = std::fs::read_to_string(path)?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| StreamableError::Parse(e.to_string())),
            _ => Ok(toml::from_str(&content)?),
        }
    }

    pub fn from_default_locations() -> Result<Self, StreamableError> {
        let config_paths = [
            dirs::config_dir().map(|d| d.join("streamable/config.toml")),
            Some(PathBuf::from("./streamable.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    pub fn merge_from_env(mut self) -> Result<Self, StreamableError> {
        if let Ok(val) = std::env::var("STREAMABLE_API_URL") {
            self.api.url = val;
        }
        if let Ok(val) = std::env::var("STREAMABLE_USERNAME") {
            self.api.username = Some(val);
        }
        if let Ok(val) = std::env::var("STREAMABLE_PASSWORD") {
            self.api.password = Some(val);
        }
        if let Ok(val) = std::env::var("STREAMABLE_TIMEOUT") {
            if val.is_empty() || !val.chars().all(|c| c.is_ascii_digit()) {
                return Err(StreamableError::InvalidArgument(
                    "STREAMABLE_TIMEOUT has invalid format".into(),
                ));
            }
            self.api.timeout_secs = Some(val.parse().map_err(|_| {
                StreamableError::InvalidArgument("STREAMABLE_TIMEOUT has invalid format".into())
            })?);
        }
        if let Ok(val) = std::env::var("STREAMABLE_LOG_LEVEL") {
            self.logging.level = val;
        }

        Ok(self)
    }

    pub fn merge_from_cli(mut self, cli: &CliArgs) -> Self {
        if let Some(ref url) = cli.api_url {
            self.api.url = url.clone();
        }

        if let Some(ref username) = cli.username {
            self.api.username = Some(username.clone());
        }

        if let Some(ref password) = cli.password {
            self.api.password = Some(password.clone());
        }

        if let Some(timeout) = cli.timeout_secs {
            self.api.timeout_secs = Some(timeout);
        }

        self
    }

    pub fn load() -> Result<Self, StreamableError> {
        Self::from_default_locations()?.merge_from_env()
    }

    pub fn load_with_cli(cli: &CliArgs) -> Result<Self, StreamableError> {
        let base = match cli.config_file {
            Some(ref path) => Self::from_file(path)?,
            None => Self::from_default_locations()?,
        };
        Ok(base.merge_from_env()?.merge_from_cli(cli))
    }

    pub fn validate(&self) -> Result<(), StreamableError> {
        let mut issues = Vec::new();

        if self.api.url.is_empty() {
            issues.push(ValidationIssue {
                field: "api.url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        } else {
            match reqwest::Url::parse(&self.api.url) {
                Ok(url) if url.cannot_be_a_base() => issues.push(ValidationIssue {
                    field: "api.url".to_string(),
                    message: "URL cannot be used as a base URL".to_string(),
                }),
                Ok(_) => {}
                Err(e) => issues.push(ValidationIssue {
                    field: "api.url".to_string(),
                    message: format!("Invalid URL format: {}", e),
                }),
            }
        }

        if let Some(timeout) = self.api.timeout_secs {
            if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
                issues.push(ValidationIssue {
                    field: "api.timeout_secs".to_string(),
                    message: format!("Timeout must be between 1 and {} seconds", MAX_TIMEOUT_SECS),
                });
            }
        }

        if self.api.progress_interval_ms == 0 {
            issues.push(ValidationIssue {
                field: "api.progress_interval_ms".to_string(),
                message: "Progress interval must be greater than zero".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            issues.push(ValidationIssue {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(StreamableError::ValidationError(issues))
        }
    }
}

/// Command-line arguments that override configuration values.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub api_url: Option<String>,
    pub config_file: Option<PathBuf>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}
