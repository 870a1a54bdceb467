//! Configuration loading and data folder resolution
//!
//! Priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DATABASE_FILE: &str = "aih.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_PROFESSIONALS_TTL_SECS: u64 = 600;
pub const DEFAULT_GLOSA_TYPES_TTL_SECS: u64 = 300;

/// Optional TOML configuration file contents
///
/// Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub data_folder: Option<PathBuf>,
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CacheConfig {
    pub professionals_ttl_secs: Option<u64>,
    pub glosa_types_ttl_secs: Option<u64>,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from the platform config location, or defaults when absent
    ///
    /// A missing or unreadable file never stops startup.
    pub fn load_or_default() -> Self {
        let Some(path) = find_config_file() else {
            info!("No config file found, using defaults");
            return TomlConfig::default();
        };
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

/// Fully resolved settings for the server
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_folder: PathBuf,
    pub bind_addr: String,
    pub professionals_ttl: Duration,
    pub glosa_types_ttl: Duration,
}

impl AppConfig {
    /// Merge CLI values (clap already folds in environment variables) with
    /// the TOML file and compiled defaults
    pub fn resolve(
        cli_data_folder: Option<PathBuf>,
        cli_bind_addr: Option<String>,
        toml: TomlConfig,
    ) -> Self {
        let data_folder = cli_data_folder
            .or(toml.data_folder)
            .unwrap_or_else(default_data_folder);
        let bind_addr = cli_bind_addr
            .or(toml.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        AppConfig {
            data_folder,
            bind_addr,
            professionals_ttl: Duration::from_secs(
                toml.cache
                    .professionals_ttl_secs
                    .unwrap_or(DEFAULT_PROFESSIONALS_TTL_SECS),
            ),
            glosa_types_ttl: Duration::from_secs(
                toml.cache
                    .glosa_types_ttl_secs
                    .unwrap_or(DEFAULT_GLOSA_TYPES_TTL_SECS),
            ),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_folder.join(DATABASE_FILE)
    }
}

/// Platform config file, user location before system location
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("aih").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/aih/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default data folder path
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("aih"))
        .unwrap_or_else(|| PathBuf::from("./aih_data"))
}
