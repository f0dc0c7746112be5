//! Mention link rewriting.
//!
//! Servers render mentions as `a.mention` links to the remote profile. Two
//! rewrites exist, picked by the caller:
//!
//! - [`NamedMentions`] matches links against the status's mention list and
//!   points them at the local profile route.
//! - [`MentionLinks`] turns any profile-shaped mention link into an editor
//!   mention node.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use toot_tree::{NodeId, Tree, attributes};

use crate::transform::{Replacement, Transform};

/// Profile URL: `http(s)://<server>/@<user>`.
static USER_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://([^/]+)/@([^/]+)$").expect("invalid user link regex"));

/// Splits a host of three or more labels before its last two.
static SUBDOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+\.)(.+\..+)").expect("invalid subdomain regex"));

/// An account mentioned by a status, as returned by the server API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Mention {
    /// Profile URL; matched exactly against link targets.
    pub url: String,
    /// `user` for local accounts, `user@domain` for remote ones.
    pub acct: String,
    pub username: String,
}

/// Rewrites mention links that appear in a known mention list.
///
/// A matching link keeps its other attributes, gets `href` set to
/// `/<server>/@<acct>` and its content replaced by an editor mention span.
///
/// # Example
///
/// ```
/// use toot_content::{Mention, NamedMentions, apply_transforms};
///
/// let mentions = vec![Mention {
///     url: "https://a.example/@bob".to_owned(),
///     acct: "bob@a.example".to_owned(),
///     username: "bob".to_owned(),
/// }];
/// let mut tree = toot_tree::parse(
///     r#"<a class="mention" href="https://a.example/@bob">@bob</a>"#,
/// ).unwrap();
/// apply_transforms(&mut tree, &[&NamedMentions::new("home.example", &mentions)]);
/// assert_eq!(
///     toot_tree::render(&tree),
///     r#"<a class="mention" href="/home.example/@bob@a.example"><span data-id="bob@a.example" data-type="mention">@bob</span></a>"#
/// );
/// ```
pub struct NamedMentions<'a> {
    server: &'a str,
    mentions: &'a [Mention],
}

impl<'a> NamedMentions<'a> {
    /// Create the pass for the given local server name.
    pub fn new(server: &'a str, mentions: &'a [Mention]) -> Self {
        Self { server, mentions }
    }

    fn find(&self, href: &str) -> Option<&'a Mention> {
        self.mentions.iter().find(|mention| mention.url == href)
    }
}

impl Transform for NamedMentions<'_> {
    fn name(&self) -> &'static str {
        "named-mentions"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        if !is_mention_link(tree, node) {
            return Replacement::Unchanged;
        }
        let Some(mention) = tree.attribute(node, "href").and_then(|href| self.find(href)) else {
            return Replacement::Unchanged;
        };

        let text = tree.create_text(format!("@{}", mention.username));
        let span = tree.create_element_with(
            "span",
            attributes([("data-type", "mention"), ("data-id", mention.acct.as_str())]),
            vec![text],
        );
        if let Some(element) = tree.element_mut(node) {
            element.set_attribute("href", format!("/{}/@{}", self.server, mention.acct));
        }
        tree.set_children(node, vec![span]);
        Replacement::Unchanged
    }
}

/// Replaces profile-shaped mention links with editor mention spans.
///
/// `https://social.example.com/@alice` becomes
/// `<span data-type="mention" data-id="alice@example.com">alice@example.com</span>`;
/// hosts with three or more labels are shortened to their last two.
#[derive(Clone, Copy, Debug, Default)]
pub struct MentionLinks;

impl Transform for MentionLinks {
    fn name(&self) -> &'static str {
        "mention-links"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        if !is_mention_link(tree, node) {
            return Replacement::Unchanged;
        }
        let Some(handle) = tree.attribute(node, "href").and_then(mention_handle) else {
            return Replacement::Unchanged;
        };

        let text = tree.create_text(handle.as_str());
        Replacement::Node(tree.create_element_with(
            "span",
            attributes([("data-type", "mention"), ("data-id", handle.as_str())]),
            vec![text],
        ))
    }
}

fn is_mention_link(tree: &Tree, node: NodeId) -> bool {
    tree.is_element(node, "a") && tree.has_class(node, "mention")
}

/// `user@host` handle for a profile URL, if `href` is one.
fn mention_handle(href: &str) -> Option<String> {
    let caps = USER_LINK.captures(href)?;
    let server = caps.get(1)?.as_str();
    let username = caps.get(2)?.as_str();
    Some(format!("{username}@{}", SUBDOMAIN.replace(server, "$2")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_transforms;
    use pretty_assertions::assert_eq;
    use toot_tree::{parse, render};

    fn mentions() -> Vec<Mention> {
        vec![Mention {
            url: "https://remote.example/@alice".to_owned(),
            acct: "alice@remote.example".to_owned(),
            username: "alice".to_owned(),
        }]
    }

    #[test]
    fn test_named_mention_rewrite() {
        let mentions = mentions();
        let mut tree = parse(
            r#"<p><a class="u-url mention" href="https://remote.example/@alice">@<span>alice</span></a></p>"#,
        )
        .unwrap();
        apply_transforms(&mut tree, &[&NamedMentions::new("home.example", &mentions)]);

        let p = tree.children(tree.root())[0];
        let a = tree.children(p)[0];
        assert_eq!(
            tree.attribute(a, "href"),
            Some("/home.example/@alice@remote.example")
        );
        let children = tree.children(a).to_vec();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.attribute(children[0], "data-type"), Some("mention"));
        assert_eq!(
            tree.attribute(children[0], "data-id"),
            Some("alice@remote.example")
        );
        assert_eq!(tree.parent(children[0]), Some(a));
        assert_eq!(
            render(&tree),
            r#"<p><a class="u-url mention" href="/home.example/@alice@remote.example"><span data-id="alice@remote.example" data-type="mention">@alice</span></a></p>"#
        );
    }

    #[test]
    fn test_named_mention_needs_exact_url() {
        let mentions = mentions();
        let html = r#"<a class="mention" href="https://remote.example/@alice/">x</a>"#;
        let mut tree = parse(html).unwrap();
        apply_transforms(&mut tree, &[&NamedMentions::new("home.example", &mentions)]);
        assert_eq!(render(&tree), html);
    }

    #[test]
    fn test_named_mention_needs_mention_class() {
        let mentions = mentions();
        let html = r#"<a class="hashtag" href="https://remote.example/@alice">x</a>"#;
        let mut tree = parse(html).unwrap();
        apply_transforms(&mut tree, &[&NamedMentions::new("home.example", &mentions)]);
        assert_eq!(render(&tree), html);
    }

    #[test]
    fn test_mention_handle_collapses_subdomains() {
        assert_eq!(
            mention_handle("https://social.example.com/@alice"),
            Some("alice@example.com".to_owned())
        );
        assert_eq!(
            mention_handle("https://a.b.example.com/@bob"),
            Some("bob@example.com".to_owned())
        );
        assert_eq!(
            mention_handle("http://example.com/@carol"),
            Some("carol@example.com".to_owned())
        );
    }

    #[test]
    fn test_mention_handle_rejects_other_links() {
        assert_eq!(mention_handle("https://example.com/users/alice"), None);
        assert_eq!(mention_handle("https://example.com/@alice/123"), None);
        assert_eq!(mention_handle("ftp://example.com/@alice"), None);
    }

    #[test]
    fn test_mention_link_becomes_span() {
        let mut tree = parse(
            r#"<p>hi <a class="u-url mention" href="https://social.example.com/@alice">@alice</a></p>"#,
        )
        .unwrap();
        apply_transforms(&mut tree, &[&MentionLinks]);
        assert_eq!(
            render(&tree),
            r#"<p>hi <span data-id="alice@example.com" data-type="mention">alice@example.com</span></p>"#
        );
    }

    #[test]
    fn test_mention_link_ignores_plain_links() {
        let html = r#"<a href="https://example.com/@alice">x</a>"#;
        let mut tree = parse(html).unwrap();
        apply_transforms(&mut tree, &[&MentionLinks]);
        assert_eq!(render(&tree), html);
    }

    #[test]
    fn test_mention_deserialize_server_shape() {
        let json = r#"{"id":"1","username":"alice","url":"https://remote.example/@alice","acct":"alice@remote.example"}"#;
        let mention: Mention = serde_json::from_str(json).unwrap();
        assert_eq!(mention, mentions()[0]);
    }
}
