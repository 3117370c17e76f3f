//! CLI error types.

use mdpress_assemble::DimensionError;
use mdpress_config::ConfigError;
use mdpress_pipeline::{ConfigurationError, MarginError, WorkerPoolError};
use mdpress_state::StateStoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    #[error("{0}")]
    Margins(#[from] MarginError),

    #[error("{0}")]
    Dimension(#[from] DimensionError),

    #[error("{0}")]
    State(#[from] StateStoreError),

    #[error("{0}")]
    Pool(#[from] WorkerPoolError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0} document(s) failed")]
    DocumentsFailed(usize),
}
