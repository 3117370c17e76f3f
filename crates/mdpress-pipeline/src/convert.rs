//! External format converter contract.

use std::path::Path;
use std::time::Duration;

use mdpress_state::OutputKind;

use crate::margins::Margins;
use crate::profile::Profile;

/// Inputs for converting one assembled document into its final artifact.
pub struct ConvertRequest<'a> {
    /// Assembled, converter-ready markdown on disk.
    pub assembled_markdown: &'a Path,
    /// Final artifact path; the converter writes exactly this file.
    pub output_path: &'a Path,
    pub output_kind: OutputKind,
    pub title: &'a str,
    pub profile: &'static Profile,
    pub margins: &'a Margins,
}

/// Error from an external converter invocation.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The tool ran and failed, or could not be started.
    #[error("{tool}: {detail}")]
    Tool { tool: String, detail: String },
    #[error("converter exceeded {0:?}")]
    Timeout(Duration),
    #[error("converter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a final artifact from assembled text.
///
/// Implementations wrap external tooling; success means the artifact exists
/// at the requested path. Callers treat any error as a per-document failure.
pub trait DocumentConverter: Send + Sync {
    fn convert(&self, request: &ConvertRequest<'_>) -> Result<(), ConvertError>;
}
