//! Configuration management for the toot tools.
//!
//! Parses `toot.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [server]
//! name = "${TOOT_SERVER:-mastodon.social}"
//!
//! [content]
//! markdown = true
//! replace_unicode_emoji = true
//! convert_mention_link = false
//!
//! [emoji]
//! base_url = "/emojis/twemoji"
//!
//! [emojis.blobcat]
//! url = "https://files.example/blobcat.png"
//! static_url = "https://files.example/blobcat_static.png"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `server.name` and `emoji.base_url` support `${VAR}` (error if unset) and
//! `${VAR:-default}`.

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "toot.toml";

/// Default base URL for Twemoji assets.
const DEFAULT_EMOJI_BASE_URL: &str = "/emojis/twemoji";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the local server name.
    pub server: Option<String>,
    /// Override inline markup processing.
    pub markdown: Option<bool>,
    /// Override Unicode emoji replacement.
    pub replace_unicode_emoji: Option<bool>,
    /// Override mention link conversion.
    pub convert_mention_link: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local server identity.
    pub server: ServerConfig,
    /// Content pipeline switches.
    pub content: ContentConfig,
    /// Unicode emoji assets.
    pub emoji: EmojiConfig,
    /// Custom emoji keyed by shortcode.
    pub emojis: BTreeMap<String, CustomEmojiConfig>,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Local server identity.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name of the server the user is signed in to, e.g. `mastodon.social`.
    ///
    /// Empty when not configured.
    pub name: String,
}

/// Content pipeline switches.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Parse inline markup and code fences.
    pub markdown: bool,
    /// Replace Unicode emoji with images.
    pub replace_unicode_emoji: bool,
    /// Turn mention links into editor mention spans.
    pub convert_mention_link: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            markdown: true,
            replace_unicode_emoji: true,
            convert_mention_link: false,
        }
    }
}

/// Unicode emoji assets.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EmojiConfig {
    /// Base URL of the Twemoji SVG files.
    pub base_url: String,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMOJI_BASE_URL.to_owned(),
        }
    }
}

/// A custom emoji declared in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomEmojiConfig {
    /// Image URL.
    pub url: String,
    /// Non-animated image URL.
    #[serde(default)]
    pub static_url: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable ${{{var}}} in {field}: {source}")]
    EnvVar {
        /// Config field path (e.g. `server.name`).
        field: String,
        /// Variable name.
        var: String,
        /// Lookup failure.
        source: std::env::VarError,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Whether `shortcode` can appear between colons in status text.
fn is_valid_shortcode(shortcode: &str) -> bool {
    !shortcode.is_empty()
        && shortcode
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `toot.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(server) = &settings.server {
            self.server.name.clone_from(server);
        }
        if let Some(markdown) = settings.markdown {
            self.content.markdown = markdown;
        }
        if let Some(replace) = settings.replace_unicode_emoji {
            self.content.replace_unicode_emoji = replace;
        }
        if let Some(convert) = settings.convert_mention_link {
            self.content.convert_mention_link = convert;
        }
    }

    /// Get the local server name.
    ///
    /// Use this instead of reading `server.name` when the command needs a
    /// server identity (for example to rewrite mentions).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no server name is configured.
    pub fn require_server_name(&self) -> Result<&str, ConfigError> {
        if self.server.name.is_empty() {
            return Err(ConfigError::Validation(
                "server.name required (set [server] name or pass --server)".to_owned(),
            ));
        }
        Ok(&self.server.name)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        require_non_empty(&self.emoji.base_url, "emoji.base_url")?;
        self.validate_emojis()?;
        Ok(())
    }

    /// An empty name is allowed; a set one must be a bare host name.
    fn validate_server(&self) -> Result<(), ConfigError> {
        let name = &self.server.name;
        if name.contains(['/', ':']) || name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "server.name must be a host name, got {name:?}"
            )));
        }
        Ok(())
    }

    fn validate_emojis(&self) -> Result<(), ConfigError> {
        for (shortcode, emoji) in &self.emojis {
            if !is_valid_shortcode(shortcode) {
                return Err(ConfigError::Validation(format!(
                    "emojis.{shortcode}: shortcode may only contain letters, digits, '_' and '-'"
                )));
            }
            require_non_empty(&emoji.url, &format!("emojis.{shortcode}.url"))?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_in_place(&mut self.server.name, "server.name")?;
        expand::expand_in_place(&mut self.emoji.base_url, "emoji.base_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.name, "");
        assert!(config.content.markdown);
        assert!(config.content.replace_unicode_emoji);
        assert!(!config.content.convert_mention_link);
        assert_eq!(config.emoji.base_url, "/emojis/twemoji");
        assert!(config.emojis.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.content.markdown);
        assert_eq!(config.emoji.base_url, "/emojis/twemoji");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
name = "mastodon.social"

[content]
markdown = false
convert_mention_link = true

[emoji]
base_url = "https://cdn.example/twemoji"

[emojis.blobcat]
url = "https://files.example/blobcat.png"
static_url = "https://files.example/blobcat_static.png"

[emojis.party-parrot]
url = "https://files.example/parrot.gif"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.name, "mastodon.social");
        assert!(!config.content.markdown);
        assert!(config.content.replace_unicode_emoji);
        assert!(config.content.convert_mention_link);
        assert_eq!(config.emoji.base_url, "https://cdn.example/twemoji");
        assert_eq!(config.emojis.len(), 2);
        assert_eq!(
            config.emojis["blobcat"],
            CustomEmojiConfig {
                url: "https://files.example/blobcat.png".to_owned(),
                static_url: Some("https://files.example/blobcat_static.png".to_owned()),
            }
        );
        assert_eq!(config.emojis["party-parrot"].static_url, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_emoji_without_url_fails_to_parse() {
        let toml = r#"
[emojis.blob]
static_url = "x"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            server: Some("social.example".to_owned()),
            markdown: Some(false),
            replace_unicode_emoji: None,
            convert_mention_link: Some(true),
        });
        assert_eq!(config.server.name, "social.example");
        assert!(!config.content.markdown);
        assert!(config.content.replace_unicode_emoji);
        assert!(config.content.convert_mention_link);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.server.name, "");
        assert!(config.content.markdown);
    }

    #[test]
    fn test_require_server_name() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_server_name(),
            Err(ConfigError::Validation(_))
        ));
        config.server.name = "mastodon.social".to_owned();
        assert_eq!(config.require_server_name().unwrap(), "mastodon.social");
    }

    #[test]
    fn test_validate_server_name_rejects_url() {
        let mut config = Config::default();
        config.server.name = "https://mastodon.social".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.name"));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.emoji.base_url = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("emoji.base_url cannot be empty"));
    }

    #[test]
    fn test_validate_bad_shortcode() {
        let mut config = Config::default();
        config.emojis.insert(
            "bad:code".to_owned(),
            CustomEmojiConfig {
                url: "https://x/y.png".to_owned(),
                static_url: None,
            },
        );
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_empty_emoji_url() {
        let mut config = Config::default();
        config.emojis.insert(
            "blob".to_owned(),
            CustomEmojiConfig {
                url: String::new(),
                static_url: None,
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("emojis.blob.url"));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::set_var("TOOT_TEST_CONFIG_SERVER", "social.example");
        }
        let toml = r#"
[server]
name = "${TOOT_TEST_CONFIG_SERVER}"

[emoji]
base_url = "${TOOT_TEST_CONFIG_EMOJI_URL:-/static/twemoji}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.server.name, "social.example");
        assert_eq!(config.emoji.base_url, "/static/twemoji");
        unsafe {
            std::env::remove_var("TOOT_TEST_CONFIG_SERVER");
        }
    }

    #[test]
    fn test_expand_env_vars_missing() {
        // SAFETY: each test uses its own variable name
        unsafe {
            std::env::remove_var("TOOT_TEST_CONFIG_MISSING");
        }
        let toml = r#"
[server]
name = "${TOOT_TEST_CONFIG_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "server.name"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toot.toml");
        std::fs::write(
            &path,
            r#"
[server]
name = "mastodon.social"

[emojis.blob]
url = "https://files.example/blob.png"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.server.name, "mastodon.social");
        assert_eq!(config.emojis["blob"].url, "https://files.example/blob.png");
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toot.toml");
        std::fs::write(&path, "[server]\nname = \"a.example\"\n").unwrap();

        let settings = CliSettings {
            server: Some("b.example".to_owned()),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.server.name, "b.example");
    }

    #[test]
    fn test_load_rejects_invalid_cli_server() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toot.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            server: Some("https://b.example/".to_owned()),
            ..CliSettings::default()
        };
        assert!(matches!(
            Config::load(Some(&path), Some(&settings)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toot.toml");
        std::fs::write(&path, "[server\nname = 1").unwrap();
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_valid_shortcodes() {
        assert!(is_valid_shortcode("blob_cat-2"));
        assert!(!is_valid_shortcode(""));
        assert!(!is_valid_shortcode("a b"));
        assert!(!is_valid_shortcode("ünï"));
    }
}
