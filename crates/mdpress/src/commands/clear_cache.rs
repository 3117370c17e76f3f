//! `mdpress clear-cache` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdpress_config::Config;
use mdpress_state::{FileStateStore, StateStore};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the clear-cache command.
#[derive(Args)]
pub(crate) struct ClearCacheArgs {
    /// Path to configuration file (default: auto-discover mdpress.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ClearCacheArgs {
    /// Execute the clear-cache command.
    ///
    /// Every document is reconverted on the next run, regardless of content.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let store = FileStateStore::open(config.conversion_resolved.state_dir())?;

        let removed = store.clear_all()?;
        output.success(&format!("Cleared {removed} conversion record(s)"));
        Ok(())
    }
}
