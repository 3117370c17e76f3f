//! Uniform rendering contract and per-kind dispatch.

use std::time::Duration;

use crate::kind::DiagramKind;

/// Why a diagram failed to render.
#[derive(Debug, thiserror::Error)]
pub enum RenderErrorCause {
    #[error("invalid diagram syntax: {0}")]
    Syntax(String),
    #[error("renderer process failed: {0}")]
    Process(String),
    #[error("renderer service error: {0}")]
    Http(String),
    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),
    #[error("I/O error: {0}")]
    Io(String),
}

/// A single diagram's rendering failure.
#[derive(Debug, thiserror::Error)]
#[error("{kind} diagram: {cause}")]
pub struct RenderError {
    /// Notation of the failing diagram.
    pub kind: DiagramKind,
    pub cause: RenderErrorCause,
}

impl RenderError {
    pub(crate) fn new(kind: DiagramKind, cause: RenderErrorCause) -> Self {
        Self { kind, cause }
    }
}

/// Converts one diagram description into raster image bytes (PNG).
///
/// Implementations wrap an external mechanism (a CLI process, an HTTP
/// service). Callers must not depend on which mechanism backs a kind, and
/// must treat identical inputs as visually equivalent but not necessarily
/// byte-identical: skip decisions never hash rendered output.
pub trait DiagramRenderer: Send + Sync {
    /// The notation this renderer handles.
    fn kind(&self) -> DiagramKind;

    /// Render a diagram description to PNG bytes.
    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError>;
}

/// Fixed per-kind renderer table.
///
/// One renderer per [`DiagramKind`]; dispatch is a closed match, not an open
/// registry.
pub struct RendererSet {
    mermaid: Box<dyn DiagramRenderer>,
    plantuml: Box<dyn DiagramRenderer>,
}

impl RendererSet {
    /// Build the table from one renderer per kind.
    ///
    /// Each renderer must report the kind of its slot.
    #[must_use]
    pub fn new(mermaid: Box<dyn DiagramRenderer>, plantuml: Box<dyn DiagramRenderer>) -> Self {
        debug_assert_eq!(mermaid.kind(), DiagramKind::Mermaid);
        debug_assert_eq!(plantuml.kind(), DiagramKind::PlantUml);
        Self { mermaid, plantuml }
    }

    /// Renderer for the given kind.
    #[must_use]
    pub fn renderer_for(&self, kind: DiagramKind) -> &dyn DiagramRenderer {
        match kind {
            DiagramKind::Mermaid => self.mermaid.as_ref(),
            DiagramKind::PlantUml => self.plantuml.as_ref(),
        }
    }
}
