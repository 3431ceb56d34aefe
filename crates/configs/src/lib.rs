//! # configs
//!
//! Layered settings for the wish board binary.
//!
//! Precedence, lowest first:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. the file named by `WISHBOARD_CONFIG` (optional)
//! 4. `WISHBOARD_<SECTION>__<KEY>` environment variables
//! 5. the legacy `ADMIN_PASSWORD` and `CORS_ORIGINS` variables

use std::env;
use std::time::Duration;

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// Upper bound for the rate-limit window and token lifetime: ten years.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub admin: AdminSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Comma-separated origins, or `*`.
    pub cors_origins: String,
    #[serde(default)]
    pub static_dir: Option<String>,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `None` means any origin.
    pub fn allowed_origins(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Unset keeps wishes and the action log in memory.
    #[serde(default)]
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub create_per_window: u32,
    pub like_per_window: u32,
    pub compaction_interval_secs: u64,
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn compaction_interval(&self) -> Duration {
        Duration::from_secs(self.compaction_interval_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminSettings {
    #[serde(default)]
    password: Option<SecretString>,
    /// Zero disables expiry.
    pub token_ttl_secs: u64,
}

impl AdminSettings {
    /// The configured password; an empty value counts as unset.
    pub fn password(&self) -> Option<SecretString> {
        self.password
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|password| !password.is_empty())
            .map(|password| SecretString::from(password.to_owned()))
    }

    pub fn token_ttl(&self) -> Option<Duration> {
        (self.token_ttl_secs > 0).then(|| Duration::from_secs(self.token_ttl_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, then every source in precedence order.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let mut builder = Self::defaults()?.add_source(File::with_name("config/default").required(false));

        if let Ok(path) = env::var("WISHBOARD_CONFIG") {
            builder = builder.add_source(File::with_name(&path));
        }

        let builder = builder
            .add_source(
                Environment::with_prefix("WISHBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("admin.password", env::var("ADMIN_PASSWORD").ok())?
            .set_override_option("server.cors_origins", env::var("CORS_ORIGINS").ok())?;

        Self::finish(builder)
    }

    /// Defaults overlaid with a TOML document. No files or environment.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::finish(Self::defaults()?.add_source(File::from_str(source, FileFormat::Toml)))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.cors_origins", "*")?
            .set_default("database.max_connections", 5)?
            .set_default("rate_limit.window_secs", 3600)?
            .set_default("rate_limit.create_per_window", 10)?
            .set_default("rate_limit.like_per_window", 50)?
            .set_default("rate_limit.compaction_interval_secs", 300)?
            .set_default("admin.token_ttl_secs", 86400)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Logs the effective settings. Called once the subscriber is installed,
    /// since loading happens before logging is configured.
    pub fn log_summary(&self) {
        info!(
            bind = %self.server.bind_address(),
            cors_origins = %self.server.cors_origins,
            storage = if self.database.url.is_some() { "sqlite" } else { "memory" },
            window_secs = self.rate_limit.window_secs,
            create_per_window = self.rate_limit.create_per_window,
            like_per_window = self.rate_limit.like_per_window,
            "configuration loaded"
        );
        if self.admin.password().is_none() {
            warn!("ADMIN_PASSWORD is not set; the admin panel cannot be used");
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid("rate_limit.window_secs must be positive".into()));
        }
        if self.rate_limit.window_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "rate_limit.window_secs must be at most {MAX_DURATION_SECS}"
            )));
        }
        if self.admin.token_ttl_secs > MAX_DURATION_SECS {
            return Err(ConfigError::Invalid(format!(
                "admin.token_ttl_secs must be at most {MAX_DURATION_SECS}"
            )));
        }
        if self.rate_limit.compaction_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.compaction_interval_secs must be positive".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be positive".into()));
        }
        Ok(())
    }
}
