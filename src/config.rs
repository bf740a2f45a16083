use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_service_overlap_weight")]
    pub service_overlap: u32,
    #[serde(default = "default_sla_baseline_hours")]
    pub sla_baseline_hours: u32,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            service_overlap: default_service_overlap_weight(),
            sla_baseline_hours: default_sla_baseline_hours(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            service_overlap: config.service_overlap,
            sla_baseline_hours: config.sla_baseline_hours,
        }
    }
}

fn default_service_overlap_weight() -> u32 { 2 }
fn default_sla_baseline_hours() -> u32 { 24 }

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationSettings {
    /// Webhook endpoint; notifications are only logged when unset
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_webhook_timeout(),
        }
    }
}

fn default_webhook_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 { 86_400 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VMATCH_)
    /// 5. DATABASE_URL / JWT_SECRET, when set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VMATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("VMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_well_known_env(settings)?.try_deserialize::<Self>()?.validated()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VMATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<Self>()?.validated()
    }

    /// Reject combinations that deserialize fine but cannot run
    fn validated(self) -> Result<Self, ConfigError> {
        if self.refresh.enabled && self.refresh.interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh.interval_secs must be greater than zero when refresh is enabled".to_string(),
            ));
        }

        Ok(self)
    }
}

/// Let the conventional DATABASE_URL and JWT_SECRET variables win over files
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(jwt_secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", jwt_secret)?;
    }

    builder.build()
}
