//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dashboard::SkillPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Deployed,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Environment::Local),
            "deployed" | "prod" | "production" => Ok(Environment::Deployed),
            other => Err(ConfigError::Invalid(format!("unknown environment: {}", other))),
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_local_url")]
    pub local_url: String,

    #[serde(default = "default_deployed_url")]
    pub deployed_url: String,

    /// Explicit address; wins over the environment selection when set
    #[serde(default)]
    pub base_url: Option<String>,

    /// Unset means requests never time out
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_local_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_deployed_url() -> String {
    "https://api.learnpath.app".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            local_url: default_local_url(),
            deployed_url: default_deployed_url(),
            base_url: None,
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Resolve the active backend address, without a trailing slash
    pub fn base_url(&self) -> String {
        let url = match (&self.base_url, self.environment) {
            (Some(url), _) => url.as_str(),
            (None, Environment::Local) => self.local_url.as_str(),
            (None, Environment::Deployed) => self.deployed_url.as_str(),
        };
        url.trim_end_matches('/').to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Which route serves dashboard recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationsEndpoint {
    #[default]
    Dashboard,
    Legacy,
}

impl RecommendationsEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            RecommendationsEndpoint::Dashboard => "dashboard-recommendations",
            RecommendationsEndpoint::Legacy => "recommendations",
        }
    }
}

/// Dashboard assembly configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub recommendations_endpoint: RecommendationsEndpoint,

    #[serde(default)]
    pub skill_policy: SkillPolicy,
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_file")]
    pub file: String,
}

fn default_session_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("learnpath").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./learnpath_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Invalid(error) => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("learnpath").join("config.toml")),
            Some(PathBuf::from("./learnpath.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(env) = std::env::var("LEARNPATH_ENV") {
            match env.parse() {
                Ok(env) => self.api.environment = env,
                Err(e) => tracing::warn!("Ignoring LEARNPATH_ENV: {}", e),
            }
        }
        if let Ok(url) = std::env::var("LEARNPATH_API_URL") {
            self.api.base_url = Some(url);
        }
        if let Ok(secs) = std::env::var("LEARNPATH_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                self.api.request_timeout_secs = Some(secs);
            }
        }

        if let Ok(file) = std::env::var("LEARNPATH_SESSION_FILE") {
            self.session.file = file;
        }

        if let Ok(level) = std::env::var("LEARNPATH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LEARNPATH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Learnpath Configuration
#
# Environment variables override these settings:
# - LEARNPATH_ENV (local | deployed)
# - LEARNPATH_API_URL
# - LEARNPATH_REQUEST_TIMEOUT_SECS
# - LEARNPATH_SESSION_FILE
# - LEARNPATH_LOG_LEVEL
# - LEARNPATH_LOG_FORMAT

[api]
# Which backend to use: local or deployed
environment = "local"

local_url = "http://localhost:5000"
deployed_url = "https://api.learnpath.app"

# Explicit address, overrides the environment selection
# base_url = "http://localhost:5000"

# Request timeout in seconds (unset: wait indefinitely)
# request_timeout_secs = 30

[dashboard]
# Recommendation source: dashboard or legacy
recommendations_endpoint = "dashboard"

# Duplicate skill resolution: last_write or highest
skill_policy = "last_write"

[session]
# Where the logged-in user id and onboarding flag are kept
# file = "~/.local/share/learnpath/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}
