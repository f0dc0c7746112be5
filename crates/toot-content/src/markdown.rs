//! Inline markup in text nodes.
//!
//! Recognizes a small subset of lightweight markup typed into statuses:
//!
//! | Syntax            | Element                 |
//! |-------------------|-------------------------|
//! | `***text***`      | `<b><em>text</em></b>`  |
//! | `**text**`        | `<b>text</b>`           |
//! | `*text*`          | `<em>text</em>`         |
//! | `~~text~~`        | `<del>text</del>`       |
//! | `` `text` ``      | `<code>text</code>`     |
//! | `@user@twitter.com` | external mention link |
//!
//! The earliest match in the text wins; when two patterns start at the same
//! position the one listed first wins. Captured text is parsed again so markup
//! nests, except for code and mentions which keep their text verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use toot_tree::{Attributes, NodeId, Tree, attributes};

use crate::transform::{Child, Replacement, Transform, build_element};

/// Inline markup kinds, in match priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Markup {
    BoldItalic,
    Bold,
    Italic,
    Strikethrough,
    Code,
    TwitterMention,
}

static PATTERNS: LazyLock<Vec<(Markup, Regex)>> = LazyLock::new(|| {
    [
        // `.` stops at both `\r` and `\n`.
        (Markup::BoldItalic, r"(?R)\*\*\*(.*?)\*\*\*"),
        (Markup::Bold, r"(?R)\*\*(.*?)\*\*"),
        (Markup::Italic, r"(?R)\*(.*?)\*"),
        (Markup::Strikethrough, r"(?R)~~(.*?)~~"),
        (Markup::Code, r"`([^`]+?)`"),
        // Only the domain is case-insensitive; folding the handle class would admit `ſ` and `K`.
        (Markup::TwitterMention, r"\B@([a-zA-Z0-9_]+)@(?i:twitter\.com)\b"),
    ]
    .into_iter()
    .map(|(markup, pattern)| {
        let regex = Regex::new(pattern).expect("invalid inline markup regex");
        (markup, regex)
    })
    .collect()
});

impl Markup {
    /// Build the element for a match whose captured text is `inner`.
    fn build(self, tree: &mut Tree, inner: &str) -> NodeId {
        match self {
            Self::BoldItalic => {
                let children = parse_inline_markup(tree, inner);
                let em = build_element(tree, "em", Attributes::new(), children);
                tree.create_element_with("b", Attributes::new(), vec![em])
            }
            Self::Bold => self.wrap(tree, "b", inner),
            Self::Italic => self.wrap(tree, "em", inner),
            Self::Strikethrough => self.wrap(tree, "del", inner),
            Self::Code => {
                let text = tree.create_text(inner);
                tree.create_element_with("code", Attributes::new(), vec![text])
            }
            Self::TwitterMention => {
                let href = format!("https://twitter.com/{inner}");
                let text = tree.create_text(format!("@{inner}@twitter.com"));
                tree.create_element_with(
                    "a",
                    attributes([
                        ("href", href.as_str()),
                        ("target", "_blank"),
                        ("rel", "nofollow noopener noreferrer"),
                        ("class", "mention external"),
                    ]),
                    vec![text],
                )
            }
        }
    }

    fn wrap(self, tree: &mut Tree, name: &str, inner: &str) -> NodeId {
        let children = parse_inline_markup(tree, inner);
        build_element(tree, name, Attributes::new(), children)
    }
}

/// Convert inline markup in `text` to a list of text segments and elements.
///
/// Empty text segments are omitted, so plain empty input yields an empty list.
///
/// # Example
///
/// ```
/// use toot_content::{Child, parse_inline_markup};
/// use toot_tree::Tree;
///
/// let mut tree = Tree::new();
/// let parts = parse_inline_markup(&mut tree, "a **b**");
/// assert_eq!(parts.len(), 2);
/// assert_eq!(parts[0], Child::from("a "));
/// ```
pub fn parse_inline_markup(tree: &mut Tree, text: &str) -> Vec<Child> {
    let mut results = Vec::new();
    let mut start = 0;

    while let Some((markup, caps)) = earliest_match(text, start) {
        let whole = caps.get(0).expect("group 0 always participates");
        let inner = caps.get(1).map_or("", |m| m.as_str());

        results.push(Child::from(&text[start..whole.start()]));
        results.push(Child::Node(markup.build(tree, inner)));
        start = whole.end();
    }

    results.push(Child::from(&text[start..]));
    results.retain(|child| !child.is_empty_text());
    results
}

/// Find the match with the smallest start at or after `start`.
fn earliest_match(text: &str, start: usize) -> Option<(Markup, Captures<'_>)> {
    let mut found: Option<(Markup, Captures<'_>)> = None;
    for (markup, regex) in PATTERNS.iter() {
        let Some(caps) = regex.captures_at(text, start) else {
            continue;
        };
        let index = match_start(&caps);
        if found.as_ref().is_none_or(|(_, best)| index < match_start(best)) {
            found = Some((*markup, caps));
        }
    }
    found
}

fn match_start(caps: &Captures<'_>) -> usize {
    caps.get(0).map_or(usize::MAX, |m| m.start())
}

/// Inline markup transform.
///
/// Only text nodes are rewritten. Text directly inside a `code` element is
/// left verbatim: fenced and inline code blocks are built before this pass
/// runs, and their bodies routinely contain `*` and `~~` that must not turn
/// into emphasis.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineMarkup;

impl Transform for InlineMarkup {
    fn name(&self) -> &'static str {
        "inline-markup"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        let Some(value) = tree.text(node).map(str::to_owned) else {
            return Replacement::Unchanged;
        };
        if tree.parent(node).is_some_and(|p| tree.is_element(p, "code")) {
            return Replacement::Unchanged;
        }

        let children = parse_inline_markup(tree, &value);
        match children.as_slice() {
            [Child::Text(text)] if *text == value => Replacement::Unchanged,
            _ => Replacement::Many(children),
        }
    }
}
