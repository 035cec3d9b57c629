//! Configuration for the lister and the organizer.
//!
//! Settings are read from a TOML file. Every field is optional and falls
//! back to the built-in defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [lister]
//! output_file = "png_list.json"
//!
//! [organizer]
//! source_dir = "other"
//! destination_dir = "lalahs"
//! prefix = "lalahs-"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".pngtidyrc.toml";

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax, structure or values.
    ConfigInvalid(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, one table per utility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub lister: ListerSettings,

    #[serde(default)]
    pub organizer: OrganizerSettings,
}

/// Settings for `pngtidy list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListerSettings {
    /// File the JSON list is written to, relative to the working directory.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
}

/// Settings for `pngtidy organize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerSettings {
    /// Subdirectory the images are taken from.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Subdirectory the images are moved into.
    #[serde(default = "default_destination_dir")]
    pub destination_dir: String,

    /// Product prefix applied to every moved file name.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_output_file() -> PathBuf {
    PathBuf::from("png_list.json")
}

fn default_source_dir() -> String {
    "other".to_string()
}

fn default_destination_dir() -> String {
    "lalahs".to_string()
}

fn default_prefix() -> String {
    "lalahs-".to_string()
}

impl Default for ListerSettings {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
        }
    }
}

impl Default for OrganizerSettings {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            destination_dir: default_destination_dir(),
            prefix: default_prefix(),
        }
    }
}

impl OrganizerSettings {
    /// Product name used in console messages, i.e. the prefix without its
    /// trailing separator.
    pub fn product_name(&self) -> &str {
        self.prefix.trim_end_matches(['-', '_', ' '])
    }
}

impl ToolConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.pngtidyrc.toml` in the current directory
    /// 3. Look for `~/.config/pngtidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any loaded file fails validation.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("pngtidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        log::debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        log::debug!("loading configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that the utilities join into filesystem paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lister.output_file.as_os_str().is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "lister.output_file must not be empty".to_string(),
            ));
        }

        let organizer = &self.organizer;
        check_single_component("organizer.source_dir", &organizer.source_dir)?;
        check_single_component("organizer.destination_dir", &organizer.destination_dir)?;

        if organizer.source_dir == organizer.destination_dir {
            return Err(ConfigError::ConfigInvalid(format!(
                "organizer.source_dir and organizer.destination_dir are both '{}'",
                organizer.source_dir
            )));
        }

        if organizer.prefix.is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "organizer.prefix must not be empty".to_string(),
            ));
        }
        if organizer.prefix.contains(['/', '\\']) {
            return Err(ConfigError::ConfigInvalid(format!(
                "organizer.prefix '{}' must not contain a path separator",
                organizer.prefix
            )));
        }

        Ok(())
    }
}

/// A directory setting must name exactly one plain child of the base directory.
fn check_single_component(field: &str, value: &str) -> Result<(), ConfigError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !value.contains('\\') => Ok(()),
        _ => Err(ConfigError::ConfigInvalid(format!(
            "{} must be a single directory name, got '{}'",
            field, value
        ))),
    }
}
