//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.brainstem/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::atlas::DEFAULT_BASE_URL;
use crate::console::menu::DEFAULT_PAGE_SIZE;
use crate::core::logger::LogLevel;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct BrainstemConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub atlas: AtlasConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_file: Option<String>,
    pub log_level: Option<String>,
    pub log_to_console: Option<bool>,
    pub page_size: Option<usize>,
    pub data_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AtlasConfig {
    pub base_url: Option<String>,
    pub product_catalog: Option<String>,
}

/// Values given on the command line. `None` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub page_size: Option<usize>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "logs/activity.log";
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Debug;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Catalog location relative to the data directory.
const CATALOG_RELATIVE_PATH: &str = "metadata/amba_products.json";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub log_file: PathBuf,
    pub log_level: LogLevel,
    pub log_to_console: bool,
    pub page_size: usize,
    pub data_dir: PathBuf,
    pub base_url: String,
    pub product_catalog: PathBuf,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.brainstem/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".brainstem").join("config.toml"))
}

/// Load config from `~/.brainstem/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `BrainstemConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<BrainstemConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(BrainstemConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(BrainstemConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<BrainstemConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: BrainstemConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Brainstem Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_file = "logs/activity.log"     # Or set BRAINSTEM_LOG_FILE
# log_level = "DEBUG"                # DEBUG, INFO, WARNING, ERROR, CRITICAL
# log_to_console = false
# page_size = 10                     # 0 shows every option on one page
# data_dir = "data"                  # Or set BRAINSTEM_DATA_DIR

# [atlas]
# base_url = "http://api.brain-map.org"          # Or set BRAINSTEM_API_BASE_URL
# product_catalog = "data/metadata/amba_products.json"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &BrainstemConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    // Log level: CLI → env → config → default
    let log_level = match cli
        .log_level
        .clone()
        .or_else(|| env_var("BRAINSTEM_LOG_LEVEL"))
        .or_else(|| config.general.log_level.clone())
    {
        Some(name) => name
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?,
        None => DEFAULT_LOG_LEVEL,
    };

    // Log file: env → config → default
    let log_file = env_var("BRAINSTEM_LOG_FILE")
        .or_else(|| config.general.log_file.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

    // Data dir: CLI → env → config → default
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| env_var("BRAINSTEM_DATA_DIR").map(PathBuf::from))
        .or_else(|| config.general.data_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env_var("BRAINSTEM_API_BASE_URL"))
        .or_else(|| config.atlas.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Catalog defaults to living under the data dir
    let product_catalog = config
        .atlas
        .product_catalog
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join(CATALOG_RELATIVE_PATH));

    Ok(ResolvedConfig {
        log_file: PathBuf::from(log_file),
        log_level,
        log_to_console: config.general.log_to_console.unwrap_or(false),
        page_size: cli
            .page_size
            .or(config.general.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        data_dir,
        base_url,
        product_catalog,
    })
}
