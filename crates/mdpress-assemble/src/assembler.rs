//! Document assembly: normalization, diagram substitution, image rewriting.
//!
//! Steps run in a fixed order: normalize page breaks, drop profile-excluded
//! sections, locate diagram blocks,
//! render every block, substitute each block's exact span with a sized image
//! reference, then rewrite local image paths into the scratch directory.
//! Rendering happens before anything is written, so a failing block aborts
//! the document without leaving partial output.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use mdpress_diagrams::{
    DiagramBlock, RenderError, RendererSet, locate_blocks, png_dimensions,
};

use crate::pagebreak::normalize_page_breaks;
use crate::sections::strip_toc_sections;
use crate::sizing::{SizingPolicy, image_reference};

/// Markdown image reference: `![alt](path)`.
static MD_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());

/// HTML image tag: `<img src="path">`.
static HTML_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).unwrap());

/// Inputs for assembling one document.
pub struct AssembleRequest<'a> {
    /// Stable document key, used for collision-free image filenames.
    pub identity: &'a str,
    /// Raw document text.
    pub source_text: &'a str,
    /// Directory of the source document, for resolving relative image paths.
    pub source_dir: &'a Path,
    /// Per-document scratch directory; rendered and embedded images land here.
    pub scratch_dir: &'a Path,
    /// Sizing policy for substituted diagram images.
    pub sizing: &'a SizingPolicy,
    /// Drop hand-written "Table of contents" sections; set for profiles
    /// whose converter generates its own table of contents page.
    pub strip_toc_sections: bool,
}

/// Error assembling a document.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    /// A diagram block failed to render; `line` is its position in the
    /// normalized document.
    #[error("diagram at line {line}: {source}")]
    Render {
        line: usize,
        #[source]
        source: RenderError,
    },
    #[error("scratch I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One-based line number of a byte offset.
fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Stable rendered-image filename for a block.
///
/// Derived from `(identity, kind, sequence_index)` only, so naming is
/// deterministic across runs and regardless of render completion order.
fn image_filename(identity: &str, block: &DiagramBlock) -> String {
    let safe: String = identity
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{safe}_{}_{}.png", block.kind, block.sequence_index)
}

/// Assemble one document into converter-ready text.
pub fn assemble(renderers: &RendererSet, req: &AssembleRequest<'_>) -> Result<String, AssembleError> {
    let mut text = normalize_page_breaks(req.source_text);
    if req.strip_toc_sections {
        text = strip_toc_sections(&text);
    }
    let blocks = locate_blocks(&text);

    // Blocks render in parallel; results come back in block order.
    let rendered: Vec<Result<Vec<u8>, RenderError>> = blocks
        .par_iter()
        .map(|block| renderers.renderer_for(block.kind).render(&block.source))
        .collect();

    let mut images = Vec::with_capacity(blocks.len());
    for (block, result) in blocks.iter().zip(rendered) {
        match result {
            Ok(bytes) => images.push(bytes),
            Err(source) => {
                return Err(AssembleError::Render {
                    line: line_of(&text, block.span.start),
                    source,
                });
            }
        }
    }

    // All renders succeeded: now touch the filesystem and the text.
    std::fs::create_dir_all(req.scratch_dir)?;
    let mut replacements: Vec<(Range<usize>, String)> = Vec::with_capacity(blocks.len());
    for (block, bytes) in blocks.iter().zip(&images) {
        let path = req.scratch_dir.join(image_filename(req.identity, block));
        std::fs::write(&path, bytes)?;
        tracing::debug!("rendered {} block to {}", block.kind, path.display());

        let reference = image_reference(
            &path.display().to_string(),
            block.modifier,
            req.sizing,
            png_dimensions(bytes),
        );
        replacements.push((block.span.clone(), reference));
    }

    // Spans are disjoint and ordered; apply back-to-front so earlier offsets
    // stay valid.
    for (span, reference) in replacements.into_iter().rev() {
        text.replace_range(span, &reference);
    }

    Ok(rewrite_local_images(&text, req.source_dir, req.scratch_dir))
}

/// Copy referenced local images into the scratch directory and point the
/// references there, so the assembled text resolves without the source tree.
///
/// Remote (`http`, `data:`) references and paths already inside the scratch
/// directory pass through. A missing image is logged and left untouched.
fn rewrite_local_images(text: &str, source_dir: &Path, scratch_dir: &Path) -> String {
    let scratch_prefix = scratch_dir.display().to_string();
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    for re in [&*MD_IMAGE_RE, &*HTML_IMAGE_RE] {
        for caps in re.captures_iter(text) {
            let Some(group) = caps.get(1) else { continue };
            let path_str = group.as_str();

            if path_str.starts_with("http://")
                || path_str.starts_with("https://")
                || path_str.starts_with("data:")
                || path_str.starts_with(&scratch_prefix)
            {
                continue;
            }

            let full = if Path::new(path_str).is_absolute() {
                PathBuf::from(path_str)
            } else {
                source_dir.join(path_str)
            };
            if !full.exists() {
                tracing::warn!("referenced image not found: {}", full.display());
                continue;
            }

            let Some(name) = full.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let target = scratch_dir.join(format!("embedded_{name}"));
            if let Err(e) = std::fs::copy(&full, &target) {
                tracing::warn!("failed to embed image {}: {e}", full.display());
                continue;
            }
            edits.push((group.range(), target.display().to_string()));
        }
    }

    edits.sort_by_key(|(range, _)| range.start);
    let mut out = text.to_owned();
    for (range, replacement) in edits.into_iter().rev() {
        out.replace_range(range, &replacement);
    }
    out
}
