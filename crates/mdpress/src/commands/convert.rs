//! `mdpress convert` command implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use mdpress_config::{CliSettings, Config};
use mdpress_diagrams::{MermaidCliRenderer, PlantUmlServerRenderer, RendererSet};
use mdpress_pipeline::{
    ConversionTask, DocumentOutcome, PandocConverter, PipelineContext, Profile, RunSummary,
    run_all,
};
use mdpress_state::{FileStateStore, OutputKind};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Source directory with markdown files (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for generated artifacts (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Style profile (a4-print, a4-screen, kindle-basic, kindle-large,
    /// kindle-paperwhite-11).
    #[arg(short, long)]
    profile: Option<String>,

    /// Output format (pdf, epub, mobi).
    #[arg(short, long)]
    format: Option<String>,

    /// Number of documents converted concurrently.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Page margins, CSS shorthand (e.g. "1in 0.75in").
    #[arg(long)]
    margins: Option<String>,

    /// Diagram width override: pixels ("1200") or percentage ("80%").
    #[arg(long)]
    diagram_width: Option<String>,

    /// Keep per-document scratch artifacts after conversion.
    #[arg(long)]
    keep_intermediates: bool,

    /// PlantUML server URL (overrides config).
    #[arg(long)]
    plantuml_url: Option<String>,

    /// Mermaid CLI command (overrides config).
    #[arg(long)]
    mermaid_command: Option<String>,

    /// Path to configuration file (default: auto-discover mdpress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            profile: self.profile.clone(),
            format: self.format.clone(),
            workers: self.workers,
            page_margins: self.margins.clone(),
            keep_intermediates: self.keep_intermediates.then_some(true),
            plantuml_url: self.plantuml_url.clone(),
            mermaid_command: self.mermaid_command.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let conversion = &config.conversion_resolved;

        // Configuration errors are global: resolved before any document runs.
        let profile = Profile::find(&conversion.profile)?;
        let output_kind = OutputKind::parse(&conversion.format).ok_or_else(|| {
            CliError::Validation(format!(
                "unknown output format '{}'; available: pdf, epub, mobi",
                conversion.format
            ))
        })?;
        profile.require_support(output_kind)?;

        let margins = conversion
            .page_margins
            .as_deref()
            .unwrap_or(profile.margins)
            .parse()?;
        let width = self
            .diagram_width
            .as_deref()
            .map(mdpress_assemble::Dimension::parse)
            .transpose()?;

        let store = FileStateStore::open(conversion.state_dir())?;
        let renderers = build_renderers(&config);
        let converter = PandocConverter::new()
            .timeout(Duration::from_secs(config.rendering.convert_timeout_secs));

        let tasks = discover_tasks(
            &conversion.source_dir,
            &conversion.output_dir,
            output_kind,
        )?;
        if tasks.is_empty() {
            output.warning(&format!(
                "No markdown files found in {}",
                conversion.source_dir.display()
            ));
            return Ok(());
        }

        output.highlight(&format!(
            "Converting {} document(s) to {} with profile '{}'",
            tasks.len(),
            output_kind,
            profile.name
        ));

        tracing::debug!(
            source = %conversion.source_dir.display(),
            output = %conversion.output_dir.display(),
            workers = conversion.workers,
            "conversion run configured"
        );
        let ctx = PipelineContext {
            store: &store,
            renderers: &renderers,
            converter: &converter,
            profile,
            margins,
            sizing: profile.sizing_policy(width),
            scratch_root: conversion.scratch_dir(),
            keep_intermediates: conversion.keep_intermediates,
        };
        let summary = run_all(&ctx, tasks, conversion.workers)?;

        print_summary(&output, &summary);
        if summary.has_failures() {
            return Err(CliError::DocumentsFailed(summary.failed()));
        }
        Ok(())
    }
}

/// Build the per-kind renderer table from the rendering configuration.
fn build_renderers(config: &Config) -> RendererSet {
    let rendering = &config.rendering;
    let timeout = Duration::from_secs(rendering.render_timeout_secs);

    let mut mermaid = MermaidCliRenderer::new(&rendering.mermaid_command).timeout(timeout);
    if let Some(style) = &rendering.mermaid_style_config {
        mermaid = mermaid.style_config(style);
    }
    let plantuml = PlantUmlServerRenderer::with_timeout(&rendering.plantuml_url, timeout);

    RendererSet::new(Box::new(mermaid), Box::new(plantuml))
}

/// Collect one task per `*.md` file in the source directory.
///
/// The identity is the file stem; artifacts land in a per-format
/// subdirectory of the output directory.
fn discover_tasks(
    source_dir: &Path,
    output_dir: &Path,
    output_kind: OutputKind,
) -> Result<Vec<ConversionTask>, CliError> {
    let mut tasks = Vec::new();
    for entry in std::fs::read_dir(source_dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        tasks.push(ConversionTask {
            identity: stem.to_owned(),
            source_path: path.clone(),
            output_path: output_dir
                .join(output_kind.as_str())
                .join(format!("{stem}.{output_kind}")),
            output_kind,
        });
    }
    tasks.sort_by(|a, b| a.identity.cmp(&b.identity));
    Ok(tasks)
}

fn print_summary(output: &Output, summary: &RunSummary) {
    for result in &summary.results {
        match &result.outcome {
            DocumentOutcome::Skipped => {
                output.info(&format!("  {} (up to date)", result.identity));
            }
            DocumentOutcome::Converted => {
                output.success(&format!("  {} converted", result.identity));
            }
            DocumentOutcome::Failed(e) => {
                output.error(&format!("  {} failed: {e}", result.identity));
            }
        }
    }
    output.info(&format!(
        "\n{} converted, {} skipped, {} failed",
        summary.converted(),
        summary.skipped(),
        summary.failed()
    ));
}
