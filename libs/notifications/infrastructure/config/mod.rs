use crate::domain::ReadStrategy;
use livesockets::{
    DeploymentMode, Endpoint, ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy,
    DEFAULT_DEV_HOST,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarMissing(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Which server deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(Environment::Production),
            "development" | "dev" => Some(Environment::Development),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default)]
    pub mode: Environment,
    /// Server host (and port); required in production, defaults to the
    /// local loopback server in development
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectPolicy {
    /// Constant delay between attempts
    #[default]
    Fixed,
    /// Doubling delay capped at `max_delay_secs`
    Exponential,
    /// Stay down after an unexpected close
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default)]
    pub policy: ReconnectPolicy,
    #[serde(default = "default_reconnect_delay")]
    pub delay_secs: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
    /// None = retry for as long as the channel is wanted
    #[serde(default)]
    pub max_attempts: Option<usize>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::Fixed,
            delay_secs: default_reconnect_delay(),
            max_delay_secs: default_max_delay(),
            max_attempts: None,
        }
    }
}

/// Realtime client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    #[serde(default)]
    pub deployment: DeploymentConfig,
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    /// Also send heartbeats on chat connections
    #[serde(default)]
    pub chat_heartbeat: bool,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub read_strategy: ReadStrategy,
    /// Keep at most this many notifications (None = unbounded)
    #[serde(default)]
    pub max_notifications: Option<usize>,
    #[serde(default = "default_close_timeout")]
    pub close_timeout_secs: u64,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_heartbeat_interval() -> u64 {
    20
}

fn default_reconnect_delay() -> u64 {
    5
}

fn default_max_delay() -> u64 {
    60
}

fn default_close_timeout() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            deployment: DeploymentConfig::default(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            chat_heartbeat: false,
            reconnect: ReconnectConfig::default(),
            read_strategy: ReadStrategy::default(),
            max_notifications: None,
            close_timeout_secs: default_close_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl RealtimeConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;

        // Don't fail if .env doesn't exist
        dotenv::dotenv().ok();

        Self::from_yaml_with_env(&yaml_content)
    }

    /// Parse YAML, apply environment overrides and validate
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self> {
        let mut config: RealtimeConfig = serde_yaml::from_str(yaml)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REALTIME_ENV` / `REALTIME_HOST` from `lookup`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(mode) = lookup("REALTIME_ENV") {
            self.deployment.mode = Environment::parse(&mode).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "REALTIME_ENV must be production or development, got '{}'",
                    mode
                ))
            })?;
            info!("Overriding deployment mode from environment variable");
        }

        if let Some(host) = lookup("REALTIME_HOST") {
            info!("Overriding server host from environment variable");
            self.deployment.host = Some(host);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "heartbeat_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.policy != ReconnectPolicy::Never && self.reconnect.delay_secs == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect.delay_secs must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.policy == ReconnectPolicy::Exponential
            && self.reconnect.max_delay_secs < self.reconnect.delay_secs
        {
            return Err(ConfigError::ValidationError(
                "reconnect.max_delay_secs must be >= reconnect.delay_secs".to_string(),
            ));
        }

        if self.max_notifications == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_notifications must be greater than 0 when set".to_string(),
            ));
        }

        if self.deployment.mode == Environment::Production
            && self.deployment.host.as_deref().map_or(true, |h| h.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "deployment.host is required in production".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn deployment_mode(&self) -> DeploymentMode {
        match self.deployment.mode {
            Environment::Production => {
                DeploymentMode::production(self.deployment.host.clone().unwrap_or_default())
            }
            Environment::Development => DeploymentMode::Development {
                host: self
                    .deployment
                    .host
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DEV_HOST.to_string()),
            },
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.deployment_mode())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }

    /// Build the configured reconnection strategy
    pub fn reconnect_strategy(&self) -> Box<dyn ReconnectionStrategy> {
        let delay = Duration::from_secs(self.reconnect.delay_secs);
        match self.reconnect.policy {
            ReconnectPolicy::Fixed => Box::new(FixedDelay::new(delay, self.reconnect.max_attempts)),
            ReconnectPolicy::Exponential => Box::new(ExponentialBackoff::new(
                delay,
                Duration::from_secs(self.reconnect.max_delay_secs),
                self.reconnect.max_attempts,
            )),
            ReconnectPolicy::Never => Box::new(NeverReconnect),
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Deployment: {:?} ({})", self.deployment.mode, self.deployment_mode().host());
        info!(
            "  Heartbeat interval: {} seconds (chat: {})",
            self.heartbeat_interval_secs,
            if self.chat_heartbeat { "on" } else { "off" }
        );
        info!(
            "  Reconnect: {:?}, delay {}s, max attempts {}",
            self.reconnect.policy,
            self.reconnect.delay_secs,
            self.reconnect
                .max_attempts
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string())
        );
        info!("  Read strategy: {:?}", self.read_strategy);
        if let Some(max) = self.max_notifications {
            info!("  Max notifications: {}", max);
        }
        info!("  Log level: {}", self.log_level);
    }
}

/// Read a required environment variable
pub fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::EnvVarMissing(key.to_string()))
}
