//! CLI error types.

use qd_config::ConfigError;
use qd_renderer::DeltaError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid delta: {0}")]
    Delta(#[from] DeltaError),
}
