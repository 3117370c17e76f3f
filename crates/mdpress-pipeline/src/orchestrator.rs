//! Per-document conversion state machine.
//!
//! Each document moves `Pending -> Skipped`, or
//! `Pending -> Assembling -> Converting -> Committed`, or `-> Failed` from
//! any non-terminal state. Failure writes no state record, so the next run
//! retries the document from scratch. The state record is committed only
//! after the converter has produced the artifact.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use mdpress_assemble::{AssembleError, AssembleRequest, SizingPolicy, assemble};
use mdpress_diagrams::RendererSet;
use mdpress_state::{DocumentRecord, OutputKind, StateStore, fingerprint_file};

use crate::convert::{ConvertError, ConvertRequest, DocumentConverter};
use crate::margins::Margins;
use crate::profile::Profile;
use crate::title::extract_title;

/// One document to convert.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    /// Stable document key, usually the source path relative to the source
    /// directory.
    pub identity: String,
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub output_kind: OutputKind,
}

/// Everything a worker needs, constructed once before the run and shared
/// read-only across workers.
pub struct PipelineContext<'a> {
    pub store: &'a dyn StateStore,
    pub renderers: &'a RendererSet,
    pub converter: &'a dyn DocumentConverter,
    pub profile: &'static Profile,
    pub margins: Margins,
    pub sizing: SizingPolicy,
    /// Root under which each document gets its own scratch directory.
    pub scratch_root: PathBuf,
    /// Keep scratch artifacts after a successful conversion.
    pub keep_intermediates: bool,
}

/// Why a document failed, with the stage attached.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("reading source: {0}")]
    Input(#[source] std::io::Error),
    #[error("assembling: {0}")]
    Assemble(#[from] AssembleError),
    #[error("converting: {0}")]
    Convert(#[from] ConvertError),
}

/// Terminal state of one document.
#[derive(Debug)]
pub enum DocumentOutcome {
    /// Up to date; nothing was written.
    Skipped,
    Converted,
    Failed(PipelineError),
}

/// One document's result after its state machine finished.
#[derive(Debug)]
pub struct DocumentResult {
    pub identity: String,
    pub outcome: DocumentOutcome,
}

fn scratch_dir(root: &Path, identity: &str) -> PathBuf {
    let safe: String = identity
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    root.join(safe)
}

/// A prior record justifies skipping only if the fingerprint and profile
/// match and the recorded artifact is still present and untampered.
fn up_to_date(ctx: &PipelineContext<'_>, task: &ConversionTask, fingerprint: &str) -> bool {
    let Some(record) = ctx.store.lookup(&task.identity, task.output_kind) else {
        return false;
    };
    if record.content_fingerprint != fingerprint || record.profile != ctx.profile.name {
        return false;
    }
    let Some(recorded_output) = record.output_fingerprint else {
        return false;
    };
    match fingerprint_file(&task.output_path) {
        Ok(actual) => actual == recorded_output,
        Err(_) => {
            tracing::info!("{}: recorded artifact missing, regenerating", task.identity);
            false
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn convert_document(
    ctx: &PipelineContext<'_>,
    task: &ConversionTask,
    fingerprint: &str,
    scratch: &Path,
) -> Result<(), PipelineError> {
    let source_text =
        std::fs::read_to_string(&task.source_path).map_err(PipelineError::Input)?;
    let source_dir = task.source_path.parent().unwrap_or(Path::new("."));

    // Assembling
    let assembled = assemble(
        ctx.renderers,
        &AssembleRequest {
            identity: &task.identity,
            source_text: &source_text,
            source_dir,
            scratch_dir: scratch,
            sizing: &ctx.sizing,
            strip_toc_sections: ctx.profile.strip_toc_sections,
        },
    )?;
    let assembled_path = scratch.join("assembled.md");
    std::fs::write(&assembled_path, &assembled).map_err(AssembleError::Io)?;

    // Converting
    let stem = task
        .source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| task.identity.clone());
    let title = extract_title(&stem, &source_text);

    if let Some(parent) = task.output_path.parent() {
        std::fs::create_dir_all(parent).map_err(ConvertError::Io)?;
    }
    ctx.converter.convert(&ConvertRequest {
        assembled_markdown: &assembled_path,
        output_path: &task.output_path,
        output_kind: task.output_kind,
        title: &title,
        profile: ctx.profile,
        margins: &ctx.margins,
    })?;

    // Committed
    let output_fingerprint = match fingerprint_file(&task.output_path) {
        Ok(fp) => Some(fp),
        Err(e) => {
            tracing::warn!("{}: cannot fingerprint artifact: {e}", task.identity);
            None
        }
    };
    let record = DocumentRecord {
        identity: task.identity.clone(),
        output_kind: task.output_kind,
        content_fingerprint: fingerprint.to_owned(),
        profile: ctx.profile.name.to_owned(),
        output_fingerprint,
        updated_at: unix_now(),
    };
    // The artifact exists either way; a failed record write only costs a
    // redundant reconvert next run.
    if let Err(e) = ctx.store.upsert(&record) {
        tracing::warn!("{}: state record not written: {e}", task.identity);
    }
    Ok(())
}

/// Run one document's state machine to a terminal state.
pub fn run_document(ctx: &PipelineContext<'_>, task: &ConversionTask) -> DocumentResult {
    // Pending
    let fingerprint = match fingerprint_file(&task.source_path) {
        Ok(fp) => fp,
        Err(e) => {
            tracing::error!("{}: unreadable source: {e}", task.identity);
            return DocumentResult {
                identity: task.identity.clone(),
                outcome: DocumentOutcome::Failed(PipelineError::Input(e)),
            };
        }
    };

    if up_to_date(ctx, task, &fingerprint) {
        tracing::info!("{}: up to date, skipping", task.identity);
        return DocumentResult {
            identity: task.identity.clone(),
            outcome: DocumentOutcome::Skipped,
        };
    }

    let scratch = scratch_dir(&ctx.scratch_root, &task.identity);
    let outcome = match convert_document(ctx, task, &fingerprint, &scratch) {
        Ok(()) => {
            if !ctx.keep_intermediates {
                if let Err(e) = std::fs::remove_dir_all(&scratch) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!("{}: scratch not removed: {e}", task.identity);
                    }
                }
            }
            tracing::info!("{}: converted to {}", task.identity, task.output_kind);
            DocumentOutcome::Converted
        }
        Err(e) => {
            tracing::error!("{}: {e}", task.identity);
            DocumentOutcome::Failed(e)
        }
    };

    DocumentResult {
        identity: task.identity.clone(),
        outcome,
    }
}
