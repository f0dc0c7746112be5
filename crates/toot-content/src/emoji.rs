//! Emoji substitution.
//!
//! Two passes live here:
//!
//! - [`UnicodeEmoji`] replaces Unicode emoji in text with images supplied by
//!   an [`EmojiResolver`] (Twemoji SVGs by default).
//! - [`CustomEmojis`] replaces `:shortcode:` references to server-defined
//!   emoji with `img.custom-emoji` elements.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use toot_tree::{NodeId, Tree, attributes};

use crate::transform::{Child, Replacement, Transform};

/// Default base URL for Twemoji SVG assets.
pub const DEFAULT_TWEMOJI_BASE_URL: &str = "/emojis/twemoji";

/// Class set on images produced by [`TwemojiResolver`].
const TWEMOJI_CLASS: &str = "iconify-emoji iconify-emoji--twemoji";

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR_16: char = '\u{FE0F}';

/// Flag pairs, keycaps and pictographic sequences with modifiers and ZWJ chains.
static EMOJI_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\x{1F1E6}-\x{1F1FF}]{2}",
        r"|[#*0-9]\x{FE0F}?\x{20E3}",
        r"|(?:\p{Emoji_Presentation}|\p{Extended_Pictographic}\x{FE0F})\p{Emoji_Modifier}?",
        r"(?:\x{200D}\p{Extended_Pictographic}\x{FE0F}?\p{Emoji_Modifier}?)*",
    ))
    .expect("invalid emoji regex")
});

static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([a-zA-Z0-9_-]+?):").expect("invalid shortcode regex"));

/// Image attributes for one Unicode emoji.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiAttributes {
    pub src: String,
    pub alt: String,
    pub class: String,
}

/// Finds Unicode emoji in text and says how to draw them.
pub trait EmojiResolver: Send + Sync {
    /// Pattern matching a single emoji.
    fn pattern(&self) -> &Regex;

    /// Image attributes for a matched emoji.
    fn attributes(&self, emoji: &str) -> EmojiAttributes;
}

/// Resolver pointing at Twemoji SVG files named by code point.
///
/// # Example
///
/// ```
/// use toot_content::{EmojiResolver, TwemojiResolver};
///
/// let resolver = TwemojiResolver::default();
/// let attrs = resolver.attributes("😀");
/// assert_eq!(attrs.src, "/emojis/twemoji/1f600.svg");
/// assert_eq!(attrs.alt, "😀");
/// ```
#[derive(Clone, Debug)]
pub struct TwemojiResolver {
    base_url: String,
}

impl TwemojiResolver {
    /// Create a resolver serving files from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Base URL of the SVG files.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for TwemojiResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TWEMOJI_BASE_URL)
    }
}

impl EmojiResolver for TwemojiResolver {
    fn pattern(&self) -> &Regex {
        &EMOJI_SEQUENCE
    }

    fn attributes(&self, emoji: &str) -> EmojiAttributes {
        EmojiAttributes {
            src: format!("{}/{}.svg", self.base_url, twemoji_codepoints(emoji)),
            alt: emoji.to_owned(),
            class: TWEMOJI_CLASS.to_owned(),
        }
    }
}

/// Twemoji file stem: lowercase hex code points joined by `-`.
///
/// Variation selectors are dropped unless the sequence contains a zero-width
/// joiner.
fn twemoji_codepoints(emoji: &str) -> String {
    let keep_selectors = emoji.contains(ZERO_WIDTH_JOINER);
    emoji
        .chars()
        .filter(|&ch| keep_selectors || ch != VARIATION_SELECTOR_16)
        .map(|ch| format!("{:x}", u32::from(ch)))
        .collect::<Vec<_>>()
        .join("-")
}

/// Replaces Unicode emoji in text nodes with images.
pub struct UnicodeEmoji<'a> {
    resolver: &'a dyn EmojiResolver,
}

impl<'a> UnicodeEmoji<'a> {
    pub fn new(resolver: &'a dyn EmojiResolver) -> Self {
        Self { resolver }
    }
}

impl Transform for UnicodeEmoji<'_> {
    fn name(&self) -> &'static str {
        "unicode-emoji"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        let Some(value) = tree.text(node).map(str::to_owned) else {
            return Replacement::Unchanged;
        };

        let mut parts = Vec::new();
        let mut start = 0;
        for found in self.resolver.pattern().find_iter(&value) {
            let attrs = self.resolver.attributes(found.as_str());
            parts.push(Child::from(&value[start..found.start()]));
            let img = tree.create_element(
                "img",
                attributes([
                    ("src", attrs.src.as_str()),
                    ("alt", attrs.alt.as_str()),
                    ("class", attrs.class.as_str()),
                ]),
            );
            parts.push(Child::Node(img));
            start = found.end();
        }
        if parts.is_empty() {
            return Replacement::Unchanged;
        }

        parts.push(Child::from(&value[start..]));
        parts.retain(|part| !part.is_empty_text());
        Replacement::Many(parts)
    }
}

/// A server-defined emoji, as returned by the server's custom emoji API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CustomEmoji {
    pub shortcode: String,
    pub url: String,
    #[serde(default)]
    pub static_url: Option<String>,
}

impl CustomEmoji {
    pub fn new(shortcode: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            shortcode: shortcode.into(),
            url: url.into(),
            static_url: None,
        }
    }
}

/// Key a list of emoji by shortcode. Later entries win on duplicates.
pub fn index_emojis<I>(emojis: I) -> HashMap<String, CustomEmoji>
where
    I: IntoIterator<Item = CustomEmoji>,
{
    emojis
        .into_iter()
        .map(|emoji| (emoji.shortcode.clone(), emoji))
        .collect()
}

/// Replaces `:shortcode:` in text nodes with custom emoji images.
///
/// Unknown shortcodes stay as literal text.
///
/// # Example
///
/// ```
/// use toot_content::{CustomEmoji, CustomEmojis, apply_transforms, index_emojis};
///
/// let emojis = index_emojis([CustomEmoji::new("blob", "https://x.y/blob.png")]);
/// let mut tree = toot_tree::parse("<p>:blob:</p>").unwrap();
/// apply_transforms(&mut tree, &[&CustomEmojis::new(&emojis)]);
/// assert_eq!(
///     toot_tree::render(&tree),
///     r#"<p><img alt=":blob:" class="custom-emoji" data-emoji-id="blob" src="https://x.y/blob.png"></p>"#
/// );
/// ```
pub struct CustomEmojis<'a> {
    emojis: &'a HashMap<String, CustomEmoji>,
}

impl<'a> CustomEmojis<'a> {
    pub fn new(emojis: &'a HashMap<String, CustomEmoji>) -> Self {
        Self { emojis }
    }
}

impl Transform for CustomEmojis<'_> {
    fn name(&self) -> &'static str {
        "custom-emoji"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        let Some(value) = tree.text(node).map(str::to_owned) else {
            return Replacement::Unchanged;
        };

        let mut parts = Vec::new();
        let mut start = 0;
        for caps in SHORTCODE.captures_iter(&value) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            parts.push(Child::from(&value[start..whole.start()]));
            parts.push(match self.emojis.get(name) {
                Some(emoji) => Child::Node(tree.create_element(
                    "img",
                    attributes([
                        ("src", emoji.url.as_str()),
                        ("alt", whole.as_str()),
                        ("class", "custom-emoji"),
                        ("data-emoji-id", name),
                    ]),
                )),
                None => Child::from(whole.as_str()),
            });
            start = whole.end();
        }
        if parts.is_empty() {
            return Replacement::Unchanged;
        }

        parts.push(Child::from(&value[start..]));
        parts.retain(|part| !part.is_empty_text());
        Replacement::Many(parts)
    }
}
