//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing default
//! config file is not an error: the services start on compiled defaults.
//! A config file named explicitly on the command line must exist.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application directory name under the platform config/data folders
pub const APP_DIR_NAME: &str = "prayer-timetable";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "prayer-timetable.db";

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "PTT_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the database (optional, see [`resolve_root_folder`])
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Lowest-priority secret values, keyed by secret name
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
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

/// Upstream publisher endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_london_url")]
    pub london_url: String,

    #[serde(default = "default_birmingham_url")]
    pub birmingham_url: String,

    #[serde(default = "default_manchester_url")]
    pub manchester_url: String,

    /// Upper bound on a single upstream fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            london_url: default_london_url(),
            birmingham_url: default_birmingham_url(),
            manchester_url: default_manchester_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Cron scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_port() -> u16 {
    4000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_london_url() -> String {
    "https://www.londonprayertimes.com/api/times/".to_string()
}

fn default_birmingham_url() -> String {
    "https://centralmosque.org.uk/wp-admin/admin-ajax.php".to_string()
}

fn default_manchester_url() -> String {
    "https://www.manchestercentralmosque.org/prayer-timetable".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("prayer-timetable/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_true() -> bool {
    true
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration
    ///
    /// With `explicit` set, the file must exist. Otherwise the platform
    /// default location is tried and compiled defaults are used if absent.
    /// Returns the config and the path it was read from, if any.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok((Self::default_values(), None)),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        Ok((config, Some(path)))
    }

    /// Compiled defaults (what an empty TOML file produces)
    pub fn default_values() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            logging: LoggingConfig::default(),
            sources: SourcesConfig::default(),
            scheduler: SchedulerConfig::default(),
            secrets: HashMap::new(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self::default_values()
    }
}

/// Platform config file location (`~/.config/prayer-timetable/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. `PTT_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./prayer_timetable_data"))
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE_NAME)
}
