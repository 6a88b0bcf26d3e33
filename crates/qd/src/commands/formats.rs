//! `qd formats` command implementation.

use std::path::PathBuf;

use clap::Args;
use qd_config::Config;
use qd_renderer::AttributeInfo;

use super::registry_from_config;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the formats command.
#[derive(Args)]
pub(crate) struct FormatsArgs {
    /// Path to configuration file (default: auto-discover qd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl FormatsArgs {
    /// Execute the formats command.
    ///
    /// The listing goes to stdout so it can be redirected.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails to load.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::stdout();
        let config = Config::load(self.config.as_deref(), None)?;
        let attributes = registry_from_config(&config).attributes();

        for line in report(&attributes) {
            match line {
                Line::Heading(text) => output.highlight(&text),
                Line::Entry(text) => output.info(&text),
            }
        }

        Ok(())
    }
}

/// One line of the formats listing.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Heading(String),
    Entry(String),
}

/// Built-in attributes, then custom ones under their own heading if any.
fn report(attributes: &[AttributeInfo]) -> Vec<Line> {
    let (custom, builtin): (Vec<_>, Vec<_>) = attributes.iter().partition(|a| a.custom);

    let mut lines = vec![Line::Heading("Built-in attributes:".to_owned())];
    lines.extend(listing(&builtin).into_iter().map(Line::Entry));
    if !custom.is_empty() {
        lines.push(Line::Heading("Custom attributes:".to_owned()));
        lines.extend(listing(&custom).into_iter().map(Line::Entry));
    }
    lines
}

/// Format attributes as aligned `name  description` lines.
fn listing(attributes: &[&AttributeInfo]) -> Vec<String> {
    let width = attributes.iter().map(|a| a.name.len()).max().unwrap_or(0);
    attributes
        .iter()
        .map(|a| format!("  {:<width$}  {}", a.name, a.description))
        .collect()
}
