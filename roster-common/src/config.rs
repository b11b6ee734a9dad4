//! Bootstrap configuration
//!
//! Each setting is resolved with the priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file at the default locations is not an error; the service
//! starts with defaults. A TOML file that exists but does not parse is a
//! configuration error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_CONFIG: &str = "ROSTER_CONFIG";
pub const ENV_HOST: &str = "ROSTER_HOST";
pub const ENV_PORT: &str = "ROSTER_PORT";
pub const ENV_DATABASE: &str = "ROSTER_DATABASE";
pub const ENV_ADMIN_EMAIL: &str = "ROSTER_ADMIN_EMAIL";
pub const ENV_CORS_ORIGIN: &str = "ROSTER_CORS_ORIGIN";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@club.local";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_BROADCAST_CAPACITY: usize = 64;

const APP_DIR: &str = "club-roster";

/// Settings read from the TOML file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Allowed browser origin, or "*" for any
    #[serde(default)]
    pub cors_origin: Option<String>,
    /// Snapshots buffered per subscriber before a slow one starts skipping
    #[serde(default)]
    pub broadcast_capacity: Option<usize>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub admin_email: Option<String>,
    pub cors_origin: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub admin_email: String,
    /// `None` allows any origin
    pub cors_origin: Option<String>,
    pub broadcast_capacity: usize,
    pub log_level: String,
    /// TOML file that contributed settings, if any
    pub config_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Resolve configuration from CLI, environment, TOML file and defaults
    ///
    /// Runs before logging is set up, so it does not log; `config_file`
    /// records which TOML file (if any) was used.
    pub fn resolve(cli: &ConfigOverrides) -> Result<Self> {
        let config_file = locate_config_file(cli.config_path.as_deref())?;
        let toml = match &config_file {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };

        Self::resolve_with(cli, toml, config_file)
    }

    /// Resolve against an already loaded TOML config
    pub fn resolve_with(
        cli: &ConfigOverrides,
        toml: TomlConfig,
        config_file: Option<PathBuf>,
    ) -> Result<Self> {
        let host = cli
            .host
            .clone()
            .or_else(|| env_var(ENV_HOST))
            .or(toml.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match cli.port {
            Some(port) => port,
            None => env_parse::<u16>(ENV_PORT)?
                .or(toml.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let database_path = cli
            .database_path
            .clone()
            .or_else(|| env_var(ENV_DATABASE).map(PathBuf::from))
            .or(toml.database_path)
            .unwrap_or_else(default_database_path);

        let admin_email = cli
            .admin_email
            .clone()
            .or_else(|| env_var(ENV_ADMIN_EMAIL))
            .or(toml.admin_email)
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());

        let cors_origin = cli
            .cors_origin
            .clone()
            .or_else(|| env_var(ENV_CORS_ORIGIN))
            .or(toml.cors_origin)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());
        let cors_origin = (cors_origin.trim() != "*").then(|| cors_origin.trim().to_string());

        let broadcast_capacity = toml
            .broadcast_capacity
            .unwrap_or(DEFAULT_BROADCAST_CAPACITY);
        if broadcast_capacity == 0 {
            return Err(Error::Config("broadcast_capacity must be at least 1".to_string()));
        }

        Ok(Self {
            host,
            port,
            database_path,
            admin_email,
            cors_origin,
            broadcast_capacity,
            log_level: toml.logging.level,
            config_file,
        })
    }

    /// `host:port` socket address string
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Find the TOML config file
///
/// An explicit path (CLI or `ROSTER_CONFIG`) must exist. Otherwise the
/// per-user config directory is tried, then `/etc/club-roster/config.toml`
/// on Linux.
pub fn locate_config_file(cli_path: Option<&Path>) -> Result<Option<PathBuf>> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| env_var(ENV_CONFIG).map(PathBuf::from));

    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(Error::Config(format!("Config file not found: {}", path.display())));
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }
    }

    Ok(None)
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("roster.db"))
        .unwrap_or_else(|| PathBuf::from("./roster_data/roster.db"))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| Error::Config(format!("Invalid {}='{}': {}", name, raw, e)))
        })
        .transpose()
}
