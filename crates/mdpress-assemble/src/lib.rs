//! Document assembly for mdpress.
//!
//! Turns raw markdown into converter-ready text in one atomic pass:
//!
//! - [`pagebreak`]: rewrites every recognized page-break syntax into the one
//!   canonical marker the downstream converter understands
//! - [`sections`]: drops hand-written "Table of contents" sections for
//!   profiles whose converter generates its own
//! - [`sizing`]: dimension values and the image sizing policy
//!   (no-resize > explicit per-run dimensions > format default)
//! - [`assembler`]: renders each diagram block, substitutes its exact span
//!   with a sized image reference, and rewrites local image paths into the
//!   per-document scratch directory
//!
//! Assembly either produces the full output text or fails with the first
//! diagram error; partial results are never returned.

mod assembler;
mod pagebreak;
mod sections;
mod sizing;

pub use assembler::{AssembleError, AssembleRequest, assemble};
pub use pagebreak::{PAGE_BREAK_MARKER, normalize_page_breaks};
pub use sections::strip_toc_sections;
pub use sizing::{Dimension, DimensionError, SizingPolicy, image_reference};
