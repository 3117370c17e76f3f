//! Bounded worker pool over the document set.

use rayon::prelude::*;

use crate::orchestrator::{
    ConversionTask, DocumentOutcome, DocumentResult, PipelineContext, run_document,
};

/// The worker pool could not be started.
#[derive(Debug, thiserror::Error)]
#[error("failed to start worker pool: {0}")]
pub struct WorkerPoolError(#[from] rayon::ThreadPoolBuildError);

/// Per-document results of one full pass.
#[derive(Debug)]
pub struct RunSummary {
    pub results: Vec<DocumentResult>,
}

impl RunSummary {
    #[must_use]
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Converted))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Skipped))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed(_)))
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Convert every task with at most `workers` documents in flight.
///
/// Each worker runs one document's state machine to completion before taking
/// the next. Failures never cancel sibling documents; the summary is returned
/// only after every document reached a terminal state. `workers == 0` lets
/// the pool pick a thread count.
pub fn run_all(
    ctx: &PipelineContext<'_>,
    tasks: Vec<ConversionTask>,
    workers: usize,
) -> Result<RunSummary, WorkerPoolError> {
    let total = tasks.len();
    tracing::info!(
        "converting {total} document(s) with profile '{}'",
        ctx.profile.name
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let results = pool.install(|| {
        tasks
            .into_par_iter()
            .map(|task| run_document(ctx, &task))
            .collect()
    });

    let summary = RunSummary { results };
    tracing::info!(
        "done: {} converted, {} skipped, {} failed",
        summary.converted(),
        summary.skipped(),
        summary.failed()
    );
    Ok(summary)
}
