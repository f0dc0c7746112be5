//! Transform pipeline for status HTML from federated social servers.
//!
//! Server HTML is untrusted. This crate turns it into a sanitized tree that is
//! safe to render, and into the markup the composer edits. The work is split
//! into independent passes over a [`toot_tree::Tree`]:
//!
//! - [`Sanitizer`]: allow-list of elements and attributes
//! - [`InlineMarkup`]: `**bold**`, `*italic*`, `~~strike~~`, `` `code` ``
//! - [`UnicodeEmoji`] and [`CustomEmojis`]: emoji images
//! - [`NamedMentions`] and [`MentionLinks`]: mention rewriting
//! - [`ParagraphSpacing`]: editor paragraph gaps
//!
//! [`parse_content_html`] runs them in a fixed order; [`apply_transforms`]
//! runs any list of passes, including your own.
//!
//! # Example
//!
//! ```
//! use toot_content::{ContentOptions, render_content_html};
//!
//! let html = render_content_html(
//!     r#"<p onclick="steal()">Hello **world**</p>"#,
//!     &ContentOptions::new(),
//! )
//! .unwrap();
//! assert_eq!(html, "<p>Hello <b>world</b></p>");
//! ```

mod code_block;
mod emoji;
mod error;
mod markdown;
mod mention;
mod paragraph;
mod pipeline;
mod sanitize;
mod text;
mod transform;

pub use code_block::preprocess_code_blocks;
pub use emoji::{
    CustomEmoji, CustomEmojis, DEFAULT_TWEMOJI_BASE_URL, EmojiAttributes, EmojiResolver,
    TwemojiResolver, UnicodeEmoji, index_emojis,
};
pub use error::ContentError;
pub use markdown::{InlineMarkup, parse_inline_markup};
pub use mention::{Mention, MentionLinks, NamedMentions};
pub use paragraph::ParagraphSpacing;
pub use pipeline::{ContentOptions, convert_content_html, parse_content_html, render_content_html};
pub use sanitize::{AttributeRule, Sanitizer, filter_classes, filter_href};
pub use text::{html_to_text, tree_to_text};
pub use transform::{Child, FnTransform, Replacement, Transform, apply_transforms, build_element};
