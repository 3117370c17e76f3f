//! Conversion orchestration.
//!
//! Ties the other crates together: style profiles, margin parsing, title
//! extraction, the external converter contract and its pandoc-backed
//! implementation, the per-document state machine, and the bounded worker
//! pool that drives a whole document set.

mod convert;
mod margins;
mod orchestrator;
mod pandoc;
mod profile;
mod run;
mod title;

pub use convert::{ConvertError, ConvertRequest, DocumentConverter};
pub use margins::{Length, MarginError, Margins, Unit};
pub use orchestrator::{
    ConversionTask, DocumentOutcome, DocumentResult, PipelineContext, PipelineError, run_document,
};
pub use pandoc::PandocConverter;
pub use profile::{ConfigurationError, Profile};
pub use run::{RunSummary, WorkerPoolError, run_all};
pub use title::extract_title;
