//! `toot text` command implementation.

use std::path::PathBuf;

use clap::Args;
use toot_content::html_to_text;

use super::read_input;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the text command.
#[derive(Args)]
pub(crate) struct TextArgs {
    /// HTML file to read (default: stdin).
    input: Option<PathBuf>,
}

impl TextArgs {
    /// Execute the text command.
    ///
    /// Unparseable input prints an empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let html = read_input(self.input.as_deref())?;
        output.result(&html_to_text(&html))?;
        Ok(())
    }
}
