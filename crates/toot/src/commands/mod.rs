//! CLI command implementations.

pub(crate) mod editor;
pub(crate) mod render;
pub(crate) mod text;

pub(crate) use editor::EditorArgs;
pub(crate) use render::RenderArgs;
pub(crate) use text::TextArgs;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use toot_config::Config;
use toot_content::{CustomEmoji, index_emojis};

use crate::error::CliError;

/// Read the HTML input from a file, or from stdin when `path` is `None` or `-`.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut html = String::new();
            std::io::stdin().read_to_string(&mut html)?;
            Ok(html)
        }
    }
}

/// Read a JSON document in the server API shape.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Custom emoji from the config file, overridden by an emoji JSON file.
fn custom_emojis(
    config: &Config,
    emojis_file: Option<&Path>,
) -> Result<HashMap<String, CustomEmoji>, CliError> {
    let mut emojis = index_emojis(config.emojis.iter().map(|(shortcode, emoji)| CustomEmoji {
        shortcode: shortcode.clone(),
        url: emoji.url.clone(),
        static_url: emoji.static_url.clone(),
    }));

    if let Some(path) = emojis_file {
        let listed: Vec<CustomEmoji> = read_json(path)?;
        tracing::info!(count = listed.len(), path = %path.display(), "Loaded custom emoji");
        emojis.extend(index_emojis(listed));
    }

    Ok(emojis)
}
