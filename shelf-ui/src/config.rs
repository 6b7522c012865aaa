//! Configuration file loading with precedence handling.
//!
//! Precedence (lowest to highest): built-in defaults, the TOML config file,
//! command-line flags. The config file itself is located by `--config`, then
//! `$ROMSHELF_CONFIG`, then `~/.config/romshelf/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ROMSHELF_CONFIG";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// A value parsed but is out of range.
    #[error("Invalid config value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// TOML configuration file structure.
///
/// All fields are optional; anything left out falls back to the default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory scanned for `.nes` ROMs.
    #[serde(default)]
    pub games_dir: Option<PathBuf>,

    /// Emulator executable, looked up on `PATH` when not absolute.
    #[serde(default)]
    pub emulator: Option<String>,

    #[serde(default)]
    pub font_path: Option<PathBuf>,

    #[serde(default)]
    pub font_size: Option<f32>,

    #[serde(default)]
    pub window_width: Option<u32>,

    #[serde(default)]
    pub window_height: Option<u32>,

    #[serde(default)]
    pub window_title: Option<String>,

    #[serde(default)]
    pub frame_interval_ms: Option<u64>,

    /// Label of the inline description link.
    #[serde(default)]
    pub link_label: Option<String>,

    /// Directory holding `<rom stem>.json` metadata sidecars.
    #[serde(default)]
    pub metadata_dir: Option<PathBuf>,

    /// Fallback location for fonts and images.
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub games_dir: PathBuf,
    pub emulator: String,
    pub font_path: PathBuf,
    pub font_size: f32,
    pub window_width: u32,
    pub window_height: u32,
    pub window_title: String,
    pub frame_interval: Duration,
    pub link_label: String,
    pub metadata_dir: PathBuf,
    pub assets_dir: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            games_dir: PathBuf::from("games"),
            emulator: "nestopia".to_string(),
            font_path: PathBuf::from("Urbanist-VariableFont_wght.ttf"),
            font_size: 18.0,
            window_width: 800,
            window_height: 600,
            window_title: "NES Game Launcher".to_string(),
            frame_interval: shelf::frame_timing::DEFAULT_FRAME_INTERVAL,
            link_label: shelf::DEFAULT_LINK_LABEL.to_string(),
            metadata_dir: PathBuf::from("metadata"),
            assets_dir: PathBuf::from("assets"),
        }
    }
}

/// Flags that override the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub games_dir: Option<PathBuf>,
    pub emulator: Option<String>,
    pub font_path: Option<PathBuf>,
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist (not an error - use defaults).
/// Returns `Err` if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Default config file path, `~/.config/romshelf/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("romshelf").join("config.toml"))
}

/// Pick the config file to read: explicit flag, then environment, then the
/// platform default.
pub fn config_path(explicit: Option<PathBuf>, env_value: Option<String>) -> Option<PathBuf> {
    explicit
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(default_config_path)
}

/// Load configuration with precedence handling and CLI overrides applied.
pub fn load(explicit: Option<PathBuf>, overrides: CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    let file = match config_path(explicit, std::env::var(CONFIG_ENV).ok()) {
        Some(path) => {
            let file = load_config_file(&path)?;
            match &file {
                Some(_) => tracing::debug!(path = %path.display(), "loaded config file"),
                None => tracing::debug!(path = %path.display(), "no config file, using defaults"),
            }
            file
        }
        None => None,
    };

    let config = apply_cli_overrides(merge_config(file), overrides);
    validate(&config)?;
    Ok(config)
}

/// Merge config file into defaults to create resolved config.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        games_dir: config.games_dir.unwrap_or(defaults.games_dir),
        emulator: config.emulator.unwrap_or(defaults.emulator),
        font_path: config.font_path.unwrap_or(defaults.font_path),
        font_size: config.font_size.unwrap_or(defaults.font_size),
        window_width: config.window_width.unwrap_or(defaults.window_width),
        window_height: config.window_height.unwrap_or(defaults.window_height),
        window_title: config.window_title.unwrap_or(defaults.window_title),
        frame_interval: config
            .frame_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.frame_interval),
        link_label: config.link_label.unwrap_or(defaults.link_label),
        metadata_dir: config.metadata_dir.unwrap_or(defaults.metadata_dir),
        assets_dir: config.assets_dir.unwrap_or(defaults.assets_dir),
    }
}

/// Apply CLI argument overrides. Only flags the user actually set apply.
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(dir) = overrides.games_dir {
        config.games_dir = dir;
    }
    if let Some(emulator) = overrides.emulator {
        config.emulator = emulator;
    }
    if let Some(font) = overrides.font_path {
        config.font_path = font;
    }
    config
}

fn validate(config: &ResolvedConfig) -> Result<(), ConfigError> {
    if !(config.font_size > 0.0) {
        return Err(ConfigError::InvalidValue {
            key: "font_size",
            reason: format!("must be positive, got {}", config.font_size),
        });
    }
    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::InvalidValue {
            key: "window_width/window_height",
            reason: "window dimensions must be non-zero".to_string(),
        });
    }
    Ok(())
}
