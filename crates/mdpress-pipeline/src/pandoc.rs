//! Pandoc-backed converter.
//!
//! PDF and EPUB come straight from pandoc. MOBI has no direct pandoc target:
//! it is produced by converting the EPUB output through Calibre's
//! `ebook-convert`, chained inside the same conversion step so the caller
//! sees a single success or failure.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use mdpress_diagrams::exec::{ExecError, ExecOutput, run_with_timeout};
use mdpress_state::OutputKind;

use crate::convert::{ConvertError, ConvertRequest, DocumentConverter};

/// Default deadline for one external tool invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// [`DocumentConverter`] invoking pandoc (and `ebook-convert` for MOBI).
pub struct PandocConverter {
    pandoc: String,
    ebook_convert: String,
    timeout: Duration,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".to_owned(),
            ebook_convert: "ebook-convert".to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PandocConverter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the pandoc binary.
    #[must_use]
    pub fn pandoc_command(mut self, command: impl Into<String>) -> Self {
        self.pandoc = command.into();
        self
    }

    /// Override the Calibre `ebook-convert` binary.
    #[must_use]
    pub fn ebook_convert_command(mut self, command: impl Into<String>) -> Self {
        self.ebook_convert = command.into();
        self
    }

    /// Set the per-invocation deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, tool: &str, cmd: &mut Command) -> Result<ExecOutput, ConvertError> {
        let result = run_with_timeout(cmd, self.timeout).map_err(|e| match e {
            ExecError::Timeout(t) => ConvertError::Timeout(t),
            ExecError::Spawn { .. } => ConvertError::Tool {
                tool: tool.to_owned(),
                detail: e.to_string(),
            },
            ExecError::Io(io) => ConvertError::Io(io),
        })?;

        if !result.status.success() {
            return Err(ConvertError::Tool {
                tool: tool.to_owned(),
                detail: format!("exit {}: {}", result.status, result.stderr_text()),
            });
        }
        Ok(result)
    }

    fn run_pandoc(&self, request: &ConvertRequest<'_>, output: &Path) -> Result<(), ConvertError> {
        let mut cmd = Command::new(&self.pandoc);
        cmd.arg(request.assembled_markdown)
            .arg("--output")
            .arg(output)
            .arg("--standalone")
            .arg("--toc")
            .arg("--toc-depth=3")
            .arg(format!("--metadata=title:{}", request.title));

        if request.output_kind == OutputKind::Pdf {
            let margins = request.margins;
            cmd.arg(format!(
                "--variable=geometry:top={},right={},bottom={},left={}",
                margins.top, margins.right, margins.bottom, margins.left
            ));
            cmd.arg(format!(
                "--variable=fontsize:{}px",
                request.profile.effective_font_size_px()
            ));
        }

        self.run("pandoc", &mut cmd)?;
        Ok(())
    }

    fn run_ebook_convert(&self, epub: &Path, mobi: &Path) -> Result<(), ConvertError> {
        let mut cmd = Command::new(&self.ebook_convert);
        cmd.arg(epub)
            .arg(mobi)
            .arg("--mobi-file-type")
            .arg("both")
            .arg("--personal-doc")
            .arg("--no-inline-toc");
        self.run("ebook-convert", &mut cmd)?;
        Ok(())
    }
}

impl DocumentConverter for PandocConverter {
    fn convert(&self, request: &ConvertRequest<'_>) -> Result<(), ConvertError> {
        match request.output_kind {
            OutputKind::Pdf | OutputKind::Epub => self.run_pandoc(request, request.output_path),
            OutputKind::Mobi => {
                // Intermediate EPUB lands next to the assembled markdown so
                // it is cleaned up with the rest of the scratch artifacts.
                let epub = request.assembled_markdown.with_extension("epub");
                self.run_pandoc(request, &epub)?;
                self.run_ebook_convert(&epub, request.output_path)
            }
        }
    }
}
