//! Pipeline driver: options, pass ordering and the public entry points.

use std::borrow::Cow;
use std::collections::HashMap;

use toot_tree::Tree;

use crate::code_block::preprocess_code_blocks;
use crate::emoji::{CustomEmoji, CustomEmojis, EmojiResolver, TwemojiResolver, UnicodeEmoji};
use crate::error::ContentError;
use crate::markdown::InlineMarkup;
use crate::mention::{Mention, MentionLinks, NamedMentions};
use crate::paragraph::ParagraphSpacing;
use crate::sanitize::Sanitizer;
use crate::transform::{Transform, apply_transforms};

/// Options for [`parse_content_html`].
///
/// # Example
///
/// ```
/// use toot_content::{ContentOptions, render_content_html};
///
/// let options = ContentOptions::new().with_unicode_emoji(false);
/// let html = render_content_html("<p>**hi** 👋</p>", &options).unwrap();
/// assert_eq!(html, "<p><b>hi</b> 👋</p>");
/// ```
pub struct ContentOptions {
    emojis: HashMap<String, CustomEmoji>,
    server: String,
    mentions: Vec<Mention>,
    markdown: bool,
    replace_unicode_emoji: bool,
    convert_mention_link: bool,
    transforms: Vec<Box<dyn Transform>>,
    emoji_resolver: Box<dyn EmojiResolver>,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentOptions {
    /// Default options: markup and Unicode emoji on, mention links off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            emojis: HashMap::new(),
            server: String::new(),
            mentions: Vec::new(),
            markdown: true,
            replace_unicode_emoji: true,
            convert_mention_link: false,
            transforms: Vec::new(),
            emoji_resolver: Box::new(TwemojiResolver::default()),
        }
    }

    /// Set the custom emoji available to `:shortcode:` references.
    #[must_use]
    pub fn with_emojis(mut self, emojis: HashMap<String, CustomEmoji>) -> Self {
        self.emojis = emojis;
        self
    }

    /// Rewrite links to the given mentioned accounts to local profile routes
    /// on `server`.
    ///
    /// A non-empty mention list takes precedence over
    /// [`with_mention_links`](Self::with_mention_links).
    #[must_use]
    pub fn with_mentions(mut self, server: impl Into<String>, mentions: Vec<Mention>) -> Self {
        self.server = server.into();
        self.mentions = mentions;
        self
    }

    /// Enable or disable inline markup and code fences.
    #[must_use]
    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.markdown = enabled;
        self
    }

    /// Enable or disable Unicode emoji images.
    #[must_use]
    pub fn with_unicode_emoji(mut self, enabled: bool) -> Self {
        self.replace_unicode_emoji = enabled;
        self
    }

    /// Enable or disable turning mention links into editor mention spans.
    #[must_use]
    pub fn with_mention_links(mut self, enabled: bool) -> Self {
        self.convert_mention_link = enabled;
        self
    }

    /// Add a pass that runs right after sanitizing.
    ///
    /// Extra passes run in the order they were added.
    #[must_use]
    pub fn with_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Replace the default Twemoji resolver.
    #[must_use]
    pub fn with_emoji_resolver<R: EmojiResolver + 'static>(mut self, resolver: R) -> Self {
        self.emoji_resolver = Box::new(resolver);
        self
    }

    /// Whether inline markup is enabled.
    #[must_use]
    pub fn markdown(&self) -> bool {
        self.markdown
    }

    /// Whether Unicode emoji are replaced.
    #[must_use]
    pub fn replace_unicode_emoji(&self) -> bool {
        self.replace_unicode_emoji
    }

    /// Whether mention links are converted.
    #[must_use]
    pub fn convert_mention_link(&self) -> bool {
        self.convert_mention_link
    }

    fn named_mentions(&self) -> Option<NamedMentions<'_>> {
        if self.mentions.is_empty() {
            None
        } else {
            Some(NamedMentions::new(&self.server, &self.mentions))
        }
    }
}

/// Parse status HTML into a sanitized, normalized tree.
///
/// Passes run in this order:
///
/// 1. sanitizer
/// 2. extra passes from [`ContentOptions::with_transform`]
/// 3. Unicode emoji, if enabled
/// 4. inline markup, if enabled
/// 5. named mentions if a mention list is set, otherwise mention links if
///    enabled
/// 6. custom emoji
/// 7. paragraph spacing
///
/// # Errors
///
/// Returns an error if the HTML cannot be parsed.
pub fn parse_content_html(html: &str, options: &ContentOptions) -> Result<Tree, ContentError> {
    let html = if options.markdown {
        Cow::Owned(preprocess_code_blocks(html))
    } else {
        Cow::Borrowed(html)
    };
    let mut tree = toot_tree::parse(&html)?;

    let sanitizer = Sanitizer::default();
    let unicode_emoji = UnicodeEmoji::new(options.emoji_resolver.as_ref());
    let named_mentions = options.named_mentions();
    let custom_emojis = CustomEmojis::new(&options.emojis);

    let mut passes: Vec<&dyn Transform> = vec![&sanitizer];
    passes.extend(options.transforms.iter().map(AsRef::as_ref));
    if options.replace_unicode_emoji {
        passes.push(&unicode_emoji);
    }
    if options.markdown {
        passes.push(&InlineMarkup);
    }
    if let Some(named_mentions) = &named_mentions {
        passes.push(named_mentions);
    } else if options.convert_mention_link {
        passes.push(&MentionLinks);
    }
    passes.push(&custom_emojis);
    passes.push(&ParagraphSpacing);

    tracing::debug!(passes = passes.len(), "Transforming content tree");
    apply_transforms(&mut tree, &passes);
    Ok(tree.compact())
}

/// Parse and serialize status HTML for read-only display.
///
/// # Errors
///
/// Returns an error if the HTML cannot be parsed.
pub fn render_content_html(html: &str, options: &ContentOptions) -> Result<String, ContentError> {
    let tree = parse_content_html(html, options)?;
    Ok(toot_tree::render(&tree))
}

/// Convert status HTML to the markup the composer edits.
///
/// Inline markup is on, Unicode emoji stay as text and mention links become
/// editor mention spans.
///
/// # Errors
///
/// Returns an error if the HTML cannot be parsed.
pub fn convert_content_html(
    html: &str,
    emojis: HashMap<String, CustomEmoji>,
) -> Result<String, ContentError> {
    let options = ContentOptions::new()
        .with_emojis(emojis)
        .with_markdown(true)
        .with_unicode_emoji(false)
        .with_mention_links(true);
    render_content_html(html, &options)
}
