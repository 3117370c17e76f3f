//! Diagram extraction and rendering for mdpress.
//!
//! Markdown documents embed diagrams as fenced code blocks. This crate finds
//! those blocks and turns each one into raster image bytes:
//!
//! - [`kind`]: the closed set of supported diagram notations
//! - [`locator`]: single-pass fenced-block scanner producing [`DiagramBlock`]s
//!   with exact source spans and sizing modifiers
//! - [`render`]: the uniform [`DiagramRenderer`] contract and per-kind
//!   dispatch table ([`RendererSet`])
//! - [`mermaid`]: renderer backed by the mermaid CLI (browser automation
//!   under the hood)
//! - [`plantuml`]: renderer backed by an HTTP diagram service
//!
//! Callers dispatch through [`RendererSet`] and never learn which mechanism
//! backs a given kind.

pub mod exec;
mod kind;
mod locator;
mod mermaid;
mod plantuml;
mod png;
mod render;

pub use kind::DiagramKind;
pub use locator::{BlockModifier, DiagramBlock, locate_blocks};
pub use mermaid::MermaidCliRenderer;
pub use plantuml::PlantUmlServerRenderer;
pub use png::png_dimensions;
pub use render::{DiagramRenderer, RenderError, RenderErrorCause, RendererSet};
