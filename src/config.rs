use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Port the server listens on
    pub port: ConfigValue<u16>,
    /// How long a login session stays valid
    pub session_ttl_minutes: ConfigValue<u64>,
    /// bcrypt cost used when registering users
    pub password_cost: ConfigValue<u32>,
    /// Mark the session cookie `Secure` (requires HTTPS in front)
    pub secure_cookies: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    port: Option<u16>,
    session_ttl_minutes: Option<u64>,
    password_cost: Option<u32>,
    secure_cookies: Option<bool>,
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_TTL_MINUTES: u64 = 24 * 60;
/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TTL_MINUTES: u64 = 365 * 24 * 60;

/// Accepted bcrypt cost range; bcrypt rejects anything outside it.
pub const MIN_PASSWORD_COST: u32 = 4;
pub const MAX_PASSWORD_COST: u32 = 31;

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    ///
    /// Without an explicit path, `DOCSHARE_CONFIG` is consulted before the
    /// platform default location.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_path = ConfigValue::new(
            Self::default_data_dir().join("docshare.db"),
            ConfigSource::Default,
        );
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut session_ttl_minutes =
            ConfigValue::new(DEFAULT_SESSION_TTL_MINUTES, ConfigSource::Default);
        let mut password_cost = ConfigValue::new(bcrypt::DEFAULT_COST, ConfigSource::Default);
        let mut secure_cookies = ConfigValue::new(false, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path
            .or_else(|| std::env::var("DOCSHARE_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(value) = file_config.port {
                port = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.session_ttl_minutes {
                session_ttl_minutes = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.password_cost {
                password_cost = ConfigValue::new(value, ConfigSource::File);
            }
            if let Some(value) = file_config.secure_cookies {
                secure_cookies = ConfigValue::new(value, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("DOCSHARE_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Some(value) = env_override("DOCSHARE_PORT")? {
            port = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Some(value) = env_override("DOCSHARE_SESSION_TTL_MINUTES")? {
            session_ttl_minutes = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Some(value) = env_override("DOCSHARE_PASSWORD_COST")? {
            password_cost = ConfigValue::new(value, ConfigSource::Environment);
        }
        if let Some(value) = env_override("DOCSHARE_SECURE_COOKIES")? {
            secure_cookies = ConfigValue::new(value, ConfigSource::Environment);
        }

        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes.value) {
            return Err(ConfigError::InvalidValue {
                key: "session_ttl_minutes",
                value: session_ttl_minutes.value.to_string(),
            });
        }
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&password_cost.value) {
            return Err(ConfigError::InvalidValue {
                key: "password_cost",
                value: password_cost.value.to_string(),
            });
        }

        Ok(Self {
            database_path,
            port,
            session_ttl_minutes,
            password_cost,
            secure_cookies,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/docshare/
    /// - macOS: ~/Library/Application Support/docshare/
    /// - Windows: %APPDATA%/docshare/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docshare")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/docshare/
    /// - macOS: ~/Library/Application Support/docshare/
    /// - Windows: %APPDATA%/docshare/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docshare")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn env_override<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
