//! Configuration management for qd.
//!
//! Parses `qd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [render]
//! escape_text = true
//! line_breaks = true
//! class_prefix = "ql-"
//!
//! [formats.highlight]
//! place = "class"
//! value = "hl-{}"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override text escaping.
    pub escape_text: Option<bool>,
    /// Override line break emission.
    pub line_breaks: Option<bool>,
    /// Override the built-in class prefix.
    pub class_prefix: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "qd.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Custom attribute formats, keyed by attribute name.
    pub formats: BTreeMap<String, FormatConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Escape special HTML characters in text.
    pub escape_text: bool,
    /// Emit a newline between lines without list formatting.
    pub line_breaks: bool,
    /// Prefix of built-in class names (`font`, `size`, `align`).
    pub class_prefix: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            escape_text: true,
            line_breaks: true,
            class_prefix: "ql-".to_owned(),
        }
    }
}

/// Custom attribute format.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    /// Markup category.
    pub place: FormatPlace,
    /// Format value; `{}` is replaced with the attribute value.
    pub value: String,
}

/// Markup category of a custom format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FormatPlace {
    Tag,
    Class,
    Style,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `qd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(_) => None,
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_from(&cwd)),
        };
        Self::load_with(config_path, discovered.as_deref(), cli_settings)
    }

    fn load_with(
        config_path: Option<&Path>,
        discovered: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(path) = discovered {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(escape_text) = settings.escape_text {
            self.render.escape_text = escape_text;
        }
        if let Some(line_breaks) = settings.line_breaks {
            self.render.line_breaks = line_breaks;
        }
        if let Some(class_prefix) = &settings.class_prefix {
            self.render.class_prefix.clone_from(class_prefix);
        }
    }

    /// Search for config file in `start` and its parents.
    #[must_use]
    pub fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_formats()?;
        Ok(())
    }

    /// Validate render configuration.
    fn validate_render(&self) -> Result<(), ConfigError> {
        let prefix = &self.render.class_prefix;
        if prefix
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'')
        {
            return Err(ConfigError::Validation(
                "render.class_prefix cannot contain whitespace or quotes".to_owned(),
            ));
        }
        Ok(())
    }

    /// Validate custom formats.
    fn validate_formats(&self) -> Result<(), ConfigError> {
        for (name, format) in &self.formats {
            require_non_empty(name, "formats.<name>")?;
            let field = format!("formats.{name}.value");
            require_non_empty(&format.value, &field)?;

            // Tag values become element names in both the opening and the
            // closing tag, so they cannot carry attributes.
            if format.place == FormatPlace::Tag
                && !format
                    .value
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
            {
                return Err(ConfigError::Validation(format!(
                    "{field} must be an element name for place = \"tag\""
                )));
            }
        }
        Ok(())
    }
}
