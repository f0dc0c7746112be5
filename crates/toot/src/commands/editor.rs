//! `toot editor` command implementation.

use std::path::PathBuf;

use clap::Args;
use toot_config::Config;
use toot_content::convert_content_html;

use super::{custom_emojis, read_input};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the editor command.
#[derive(Args)]
pub(crate) struct EditorArgs {
    /// HTML file to read (default: stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover toot.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Custom emoji JSON, as returned by the server's custom emoji API.
    #[arg(long)]
    emojis: Option<PathBuf>,
}

impl EditorArgs {
    /// Execute the editor command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or conversion fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let emojis = custom_emojis(&config, self.emojis.as_deref())?;

        let html = read_input(self.input.as_deref())?;
        output.result(&convert_content_html(&html, emojis)?)?;
        Ok(())
    }
}
