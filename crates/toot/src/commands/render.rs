//! `toot render` command implementation.

use std::path::PathBuf;

use clap::Args;
use toot_config::{CliSettings, Config};
use toot_content::{ContentOptions, Mention, TwemojiResolver, render_content_html};

use super::{custom_emojis, read_input, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// HTML file to read (default: stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover toot.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Local server name used for mention links (overrides config).
    #[arg(long)]
    server: Option<String>,

    /// Custom emoji JSON, as returned by the server's custom emoji API.
    #[arg(long)]
    emojis: Option<PathBuf>,

    /// Status mentions JSON, as found in a status's `mentions` field.
    #[arg(long)]
    mentions: Option<PathBuf>,

    /// Disable inline markup and code fences.
    #[arg(long)]
    no_markdown: bool,

    /// Keep Unicode emoji as text.
    #[arg(long)]
    no_unicode_emoji: bool,

    /// Turn mention links into editor mention spans.
    #[arg(long)]
    convert_mention_links: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or rendering fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            server: self.server,
            markdown: self.no_markdown.then_some(false),
            replace_unicode_emoji: self.no_unicode_emoji.then_some(false),
            convert_mention_link: self.convert_mention_links.then_some(true),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let mut options = ContentOptions::new()
            .with_emojis(custom_emojis(&config, self.emojis.as_deref())?)
            .with_markdown(config.content.markdown)
            .with_unicode_emoji(config.content.replace_unicode_emoji)
            .with_mention_links(config.content.convert_mention_link)
            .with_emoji_resolver(TwemojiResolver::new(config.emoji.base_url.as_str()));

        if let Some(path) = &self.mentions {
            let mentions: Vec<Mention> = read_json(path)?;
            if !mentions.is_empty() {
                let server = config.require_server_name()?;
                if config.content.convert_mention_link {
                    output.warning("Mention list given; mention links are rewritten to local profiles instead");
                }
                options = options.with_mentions(server, mentions);
            }
        }

        let html = read_input(self.input.as_deref())?;
        let rendered = render_content_html(&html, &options)?;
        output.result(&rendered)?;
        Ok(())
    }
}
