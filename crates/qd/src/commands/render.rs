//! `qd render` command implementation.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use qd_config::{CliSettings, Config};
use qd_renderer::{RenderOptions, RenderResult, render_delta};

use super::registry_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Delta JSON file (default: read stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover qd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Class prefix for built-in class formats (overrides config).
    #[arg(long)]
    class_prefix: Option<String>,

    /// Emit text as-is without HTML escaping.
    #[arg(long)]
    no_escape: bool,

    /// Do not emit newlines between plain lines.
    #[arg(long)]
    no_line_breaks: bool,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the input cannot be read,
    /// the delta is malformed, or the output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            escape_text: self.no_escape.then_some(false),
            line_breaks: self.no_line_breaks.then_some(false),
            class_prefix: self.class_prefix,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::debug!(path = %path.display(), "Loaded configuration");
        }

        let json = read_input(self.input.as_deref())?;
        let result = render_with_config(&json, &config)?;

        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(result.html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Read delta JSON from `path`, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    if let Some(path) = path {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut json = String::new();
    io::stdin().read_to_string(&mut json)?;
    Ok(json)
}

/// Render delta JSON with the registry and options described by `config`.
fn render_with_config(json: &str, config: &Config) -> Result<RenderResult, CliError> {
    let mut registry = registry_from_config(config);
    let options = RenderOptions {
        escape_text: config.render.escape_text,
        line_breaks: config.render.line_breaks,
    };
    Ok(render_delta(json, &mut registry, &options)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use qd_config::{FormatConfig, FormatPlace};

    use super::*;

    #[test]
    fn test_render_with_default_config() {
        let json = r#"[{"insert":"a<b","attributes":{"bold":true}},{"insert":"\n"}]"#;
        let result = render_with_config(json, &Config::default()).unwrap();
        assert_eq!(result.html, "<strong>a&lt;b</strong>\n");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_render_without_escaping() {
        let mut config = Config::default();
        config.render.escape_text = false;
        let result = render_with_config(r#"[{"insert":"<br>"}]"#, &config).unwrap();
        assert_eq!(result.html, "<br>");
    }

    #[test]
    fn test_render_with_custom_format() {
        let mut config = Config::default();
        config.formats.insert(
            "mark".to_owned(),
            FormatConfig {
                place: FormatPlace::Tag,
                value: "mark".to_owned(),
            },
        );
        let json = r#"[{"insert":"hi","attributes":{"mark":true}}]"#;
        let result = render_with_config(json, &config).unwrap();
        assert_eq!(result.html, "<mark>hi</mark>");
    }

    #[test]
    fn test_render_invalid_json() {
        let err = render_with_config("{", &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::Delta(_)));
        assert!(err.to_string().starts_with("Invalid delta: "));
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "[]").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "[]");
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
