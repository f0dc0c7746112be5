//! Code fence and inline code preprocessing.
//!
//! Runs on the raw HTML string before parsing, since a fence usually spans
//! several paragraphs and line breaks of the server's markup.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::text::html_to_text;

/// A ```` ``` ```` or `~~~` fence opening right after a tag, with an optional
/// language, up to the next fence of the same kind.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">(?:```(\w*)((?s:.+?))```|~~~(\w*)((?s:.+?))~~~)")
        .expect("invalid code fence regex")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]*)`").expect("invalid inline code regex"));

/// Turn fenced code blocks and backtick spans into `pre`/`code` markup.
///
/// Fence bodies and inline code are reduced to their plain text, so markup
/// the server put inside them (paragraphs, line breaks, links) is flattened.
///
/// # Example
///
/// ```
/// use toot_content::preprocess_code_blocks;
///
/// assert_eq!(
///     preprocess_code_blocks("<p>```rust<br>let x = 1;```</p>"),
///     r#"<p><pre><code class="language-rust">let x = 1;</code></pre></p>"#
/// );
/// assert_eq!(preprocess_code_blocks("<p>run `ls`</p>"), "<p>run <code>ls</code></p>");
/// ```
pub fn preprocess_code_blocks(html: &str) -> String {
    let fenced = CODE_FENCE.replace_all(html, |caps: &Captures| {
        let (lang, raw) = match (caps.get(1), caps.get(2)) {
            (Some(lang), Some(raw)) => (lang.as_str(), raw.as_str()),
            _ => (
                caps.get(3).map_or("", |m| m.as_str()),
                caps.get(4).map_or("", |m| m.as_str()),
            ),
        };
        let code = escape_angles(&html_to_text(raw)).replacen('`', "&#96;", 1);
        if lang.is_empty() {
            format!("><pre><code>{code}</code></pre>")
        } else {
            format!(r#"><pre><code class="language-{lang}">{code}</code></pre>"#)
        }
    });

    INLINE_CODE
        .replace_all(&fenced, |caps: &Captures| {
            let raw = caps.get(1).map_or("", |m| m.as_str());
            if raw.is_empty() {
                String::new()
            } else {
                format!("<code>{}</code>", escape_angles(&html_to_text(raw)))
            }
        })
        .into_owned()
}

fn escape_angles(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
