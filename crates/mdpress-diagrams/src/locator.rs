//! Single-pass scanner for fenced diagram blocks.
//!
//! Recognizes fences tagged with a supported [`DiagramKind`] and records the
//! exact byte span of each block so substitution is lossless for the
//! surrounding text. A sizing modifier comment applies to a block only when
//! it is the nearest preceding non-blank line above the opening fence; when
//! present, the marker line is folded into the block's span so it is consumed
//! by substitution.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::kind::DiagramKind;

static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!--\s*(?:(no-resize)|upscale:(\d+)%|downscale:(\d+)%)\s*-->$").unwrap()
});

/// Per-block sizing modifier, written as an HTML comment above the fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockModifier {
    /// `<!-- no-resize -->`: pass the rendered image through untouched.
    NoResize,
    /// `<!-- upscale:N% -->`: display the image at N percent of its rendered
    /// size, where N is above 100.
    Upscale(u32),
    /// `<!-- downscale:N% -->`: display the image at N percent of its
    /// rendered size, where N is 1-99.
    Downscale(u32),
}

/// One diagram block found in a document.
///
/// Ephemeral: created per conversion pass, consumed by rendering and
/// substitution, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Diagram notation of this block.
    pub kind: DiagramKind,
    /// Inner text of the fence, without the fence lines.
    pub source: String,
    /// Byte span in the original document covering the whole block
    /// (modifier line included when one applies).
    pub span: Range<usize>,
    /// Sizing modifier from the adjacent marker, if any.
    pub modifier: Option<BlockModifier>,
    /// Position among same-kind blocks, used for stable image filenames.
    pub sequence_index: usize,
}

impl DiagramBlock {
    /// Whether the block opted out of resizing.
    #[must_use]
    pub fn no_resize(&self) -> bool {
        self.modifier == Some(BlockModifier::NoResize)
    }
}

fn parse_modifier(line: &str) -> Option<BlockModifier> {
    let caps = MODIFIER_RE.captures(line.trim())?;
    if caps.get(1).is_some() {
        return Some(BlockModifier::NoResize);
    }
    if let Some(pct) = caps.get(2) {
        return pct.as_str().parse().ok().map(BlockModifier::Upscale);
    }
    caps.get(3)
        .and_then(|pct| pct.as_str().parse().ok())
        .map(BlockModifier::Downscale)
}

/// Split text into `(byte_offset, line)` pairs; lines keep a trailing `\r`
/// but never the `\n`.
fn line_offsets(text: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for segment in text.split_inclusive('\n') {
        let line = segment.strip_suffix('\n').unwrap_or(segment);
        lines.push((offset, line));
        offset += segment.len();
    }
    lines
}

/// Scan a document for diagram blocks, in source order.
///
/// Blocks never overlap. Zero-content blocks are skipped rather than treated
/// as errors. An unterminated fence ends the scan; nothing after it is a
/// well-formed block.
#[must_use]
pub fn locate_blocks(text: &str) -> Vec<DiagramBlock> {
    let lines = line_offsets(text);
    let mut blocks = Vec::new();
    let mut mermaid_count = 0;
    let mut plantuml_count = 0;

    let mut i = 0;
    while i < lines.len() {
        let (offset, line) = lines[i];
        let Some(kind) = line
            .trim_end()
            .strip_prefix("```")
            .and_then(DiagramKind::parse)
        else {
            i += 1;
            continue;
        };

        // Find the closing fence.
        let Some(close) = (i + 1..lines.len()).find(|&j| lines[j].1.trim_end() == "```") else {
            tracing::warn!("unterminated {kind} fence at byte {offset}, ignoring");
            break;
        };

        let source: String = lines[i + 1..close]
            .iter()
            .map(|(_, l)| l.strip_suffix('\r').unwrap_or(l))
            .collect::<Vec<_>>()
            .join("\n");

        // Modifier applies only from the nearest preceding non-blank line.
        let mut span_start = offset;
        let mut modifier = None;
        if let Some(k) = (0..i).rev().find(|&k| !lines[k].1.trim().is_empty())
            && let Some(m) = parse_modifier(lines[k].1)
        {
            modifier = Some(m);
            span_start = lines[k].0;
        }

        let (close_offset, close_line) = lines[close];
        let span_end = close_offset + close_line.len();

        if source.trim().is_empty() {
            tracing::debug!("skipping empty {kind} block at byte {offset}");
        } else {
            let counter = match kind {
                DiagramKind::Mermaid => &mut mermaid_count,
                DiagramKind::PlantUml => &mut plantuml_count,
            };
            blocks.push(DiagramBlock {
                kind,
                source,
                span: span_start..span_end,
                modifier,
                sequence_index: *counter,
            });
            *counter += 1;
        }

        i = close + 1;
    }

    blocks
}
