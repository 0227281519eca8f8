//src/config.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

use crate::modal::{Size, SizeConstraints};
use crate::window::{DEFAULT_WEEKS_BACK, DEFAULT_WEEKS_FORWARD, MAX_CONFIGURED_WEEKS};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "plancal";
const CONFIG_ENV_VAR: &str = "PLANCAL_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Where workout plans are read from and written to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Remote, // HTTP plans API
    Local, // SQLite file in the data dir
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

// Helper to parse a string into our StandardColor enum
pub fn parse_color(color_str: &str) -> Result<StandardColor, ConfigError> {
    for color in StandardColor::iter() {
        if format!("{:?}", color).eq_ignore_ascii_case(color_str) {
            return Ok(color);
        }
    }
    Err(ConfigError::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    pub api_url: String,
    pub backend: Backend,
    pub weeks_back: u32,
    pub weeks_forward: u32,
    pub scroll_throttle_ms: u64,
    /// Viewports narrower than this (in the front end's units) are compact.
    pub compact_width: u16,
    pub modal_min: Size,
    pub modal_max: Size,

    // Theming
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        let constraints = SizeConstraints::default();
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            backend: Backend::default(),
            weeks_back: DEFAULT_WEEKS_BACK,
            weeks_forward: DEFAULT_WEEKS_FORWARD,
            scroll_throttle_ms: 200,
            compact_width: 100,
            modal_min: constraints.min,
            modal_max: constraints.max,
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    pub fn modal_constraints(&self) -> SizeConstraints {
        SizeConstraints {
            min: self.modal_min,
            max: self.modal_max,
        }
    }

    /// Rejects values that would break the window or modal invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_url",
                reason: "must not be empty".into(),
            });
        }
        for (field, weeks) in [
            ("weeks_back", self.weeks_back),
            ("weeks_forward", self.weeks_forward),
        ] {
            if weeks > MAX_CONFIGURED_WEEKS {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be at most {}", MAX_CONFIGURED_WEEKS),
                });
            }
        }
        for (field, size) in [("modal_min", self.modal_min), ("modal_max", self.modal_max)] {
            let positive = |v: f64| v.is_finite() && v > 0.0;
            if !positive(size.width) || !positive(size.height) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "width and height must be finite and greater than 0".into(),
                });
            }
        }
        if self.modal_min.width > self.modal_max.width
            || self.modal_min.height > self.modal_max.height
        {
            return Err(ConfigError::InvalidValue {
                field: "modal_min",
                reason: "must not exceed modal_max".into(),
            });
        }
        parse_color(&self.theme.header_color)?;
        Ok(())
    }
}

/// Directory holding config.toml, ui_state.toml and the TUI log.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir_path = if let Ok(path_str) = std::env::var(CONFIG_ENV_VAR) {
        PathBuf::from(path_str)
    } else {
        let base_config_dir = dirs::config_dir().ok_or(ConfigError::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }
    Ok(config_dir_path)
}

/// Determines the path to the configuration file.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path.
/// Writes the defaults first if the file does not exist yet.
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
pub fn save(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
