//! Mermaid renderer backed by the mermaid CLI.
//!
//! The CLI (`mmdc`) drives a headless browser to lay out the diagram and
//! screenshot it as PNG. An optional style configuration file (theme colors,
//! fonts) is passed to every invocation so all blocks in a run are styled
//! consistently; without one, the CLI's built-in defaults apply.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use crate::exec::{ExecError, run_with_timeout};
use crate::kind::DiagramKind;
use crate::png::png_dimensions;
use crate::render::{DiagramRenderer, RenderError, RenderErrorCause};

/// Default time allowed for one browser-backed render.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// [`DiagramRenderer`] for [`DiagramKind::Mermaid`] invoking an external CLI.
pub struct MermaidCliRenderer {
    command: PathBuf,
    style_config: Option<PathBuf>,
    timeout: Duration,
}

impl MermaidCliRenderer {
    /// Create a renderer invoking the given CLI binary (typically `mmdc`).
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            style_config: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Apply a style configuration file to every rendered block.
    #[must_use]
    pub fn style_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.style_config = Some(path.into());
        self
    }

    /// Set the per-render deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn error(&self, cause: RenderErrorCause) -> RenderError {
        RenderError::new(DiagramKind::Mermaid, cause)
    }
}

impl DiagramRenderer for MermaidCliRenderer {
    fn kind(&self) -> DiagramKind {
        DiagramKind::Mermaid
    }

    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let workdir = tempfile::tempdir()
            .map_err(|e| self.error(RenderErrorCause::Io(e.to_string())))?;
        let input = workdir.path().join("diagram.mmd");
        let output = workdir.path().join("diagram.png");
        std::fs::write(&input, source)
            .map_err(|e| self.error(RenderErrorCause::Io(e.to_string())))?;

        let mut cmd = Command::new(&self.command);
        cmd.arg("--input").arg(&input).arg("--output").arg(&output);
        if let Some(style) = &self.style_config {
            cmd.arg("--configFile").arg(style);
        }

        let result = run_with_timeout(&mut cmd, self.timeout).map_err(|e| match e {
            ExecError::Timeout(t) => self.error(RenderErrorCause::Timeout(t)),
            ExecError::Spawn { .. } => self.error(RenderErrorCause::Process(e.to_string())),
            ExecError::Io(io) => self.error(RenderErrorCause::Io(io.to_string())),
        })?;

        if !result.status.success() {
            let stderr = result.stderr_text();
            // The CLI reports malformed diagram text as a parse error on stderr.
            let cause = if stderr.contains("Parse error") || stderr.contains("Syntax error") {
                RenderErrorCause::Syntax(stderr)
            } else {
                RenderErrorCause::Process(format!("exit {}: {stderr}", result.status))
            };
            return Err(self.error(cause));
        }

        let bytes = std::fs::read(&output)
            .map_err(|e| self.error(RenderErrorCause::Io(e.to_string())))?;
        if png_dimensions(&bytes).is_none() {
            return Err(self.error(RenderErrorCause::Process(
                "renderer produced invalid PNG data".to_owned(),
            )));
        }
        Ok(bytes)
    }
}
