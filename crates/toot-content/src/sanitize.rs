//! Allow-list sanitizer.
//!
//! Every element not on the list is removed together with its subtree. Kept
//! elements lose every attribute that has no rule; attributes with a rule are
//! rewritten by it, and dropped when the rule yields nothing.

use std::sync::LazyLock;

use regex::Regex;
use toot_tree::{Attributes, NodeId, Tree};
use url::Url;

use crate::transform::{Replacement, Transform};

/// URL schemes links may use.
const LINK_PROTOCOLS: &[&str] = &[
    "http", "https", "dat", "dweb", "ipfs", "ipns", "ssb", "gopher", "xmpp", "magnet", "gemini",
];

/// Microformat, mention and hashtag classes allowed on `a` and `span`.
static BASIC_CLASSES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(h-\S*|p-\S*|u-\S*|dt-\S*|e-\S*|mention|hashtag|ellipsis|invisible)$")
        .expect("invalid basic class regex")
});

/// Code language classes allowed on `code`.
static LANGUAGE_CLASSES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^language-\w+$").expect("invalid language class regex"));

/// How a single attribute is sanitized.
#[derive(Clone, Debug)]
pub enum AttributeRule {
    /// Keep relative links and absolute links with an allowed scheme.
    Href,
    /// Keep only class tokens matching the pattern.
    Classes(Regex),
    /// Always set the attribute to this value.
    Set(String),
}

impl AttributeRule {
    /// Apply the rule to an attribute value (`None` when absent).
    ///
    /// Returns `None` when the attribute should not be present.
    #[must_use]
    pub fn sanitize(&self, value: Option<&str>) -> Option<String> {
        match self {
            Self::Href => filter_href(value),
            Self::Classes(allowed) => filter_classes(allowed, value),
            Self::Set(constant) => Some(constant.clone()),
        }
    }
}

/// Sanitize a link target.
///
/// - Values starting with `/`, `.` or `#` are relative and kept as-is.
/// - Values that do not parse as an absolute URL are dropped.
/// - URLs with a scheme outside the allow-list become `#`.
///
/// # Example
///
/// ```
/// use toot_content::filter_href;
///
/// assert_eq!(filter_href(Some("/tags/rust")), Some("/tags/rust".to_owned()));
/// assert_eq!(filter_href(Some("javascript:alert(1)")), Some("#".to_owned()));
/// assert_eq!(filter_href(Some("not a url")), None);
/// ```
#[must_use]
pub fn filter_href(value: Option<&str>) -> Option<String> {
    let href = value?;

    // `#` is this filter's own output for disallowed schemes.
    if href.starts_with(['/', '.']) || href == "#" {
        return Some(href.to_owned());
    }

    let url = Url::parse(href).ok()?;
    if LINK_PROTOCOLS.contains(&url.scheme()) {
        Some(url.into())
    } else {
        Some("#".to_owned())
    }
}

/// Keep only the class tokens matching `allowed`, joined by single spaces.
///
/// An absent value or an empty result yields `None`.
#[must_use]
pub fn filter_classes(allowed: &Regex, value: Option<&str>) -> Option<String> {
    let kept: Vec<&str> = value?
        .split_whitespace()
        .filter(|class| allowed.is_match(class))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join(" "))
    }
}

/// Allow-list sanitizing transform.
///
/// # Example
///
/// ```
/// use toot_content::{Sanitizer, apply_transforms};
///
/// let mut tree = toot_tree::parse(r#"<p onclick="x()">hi<script>bad()</script></p>"#).unwrap();
/// apply_transforms(&mut tree, &[&Sanitizer::default()]);
/// assert_eq!(toot_tree::render(&tree), "<p>hi</p>");
/// ```
#[derive(Clone, Debug)]
pub struct Sanitizer {
    allowed: Vec<(String, Vec<(String, AttributeRule)>)>,
}

impl Sanitizer {
    /// Create a sanitizer that allows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed: Vec::new(),
        }
    }

    /// Allow an element with the given attribute rules.
    ///
    /// Allowing the same element twice replaces the earlier rules.
    #[must_use]
    pub fn allow<I>(mut self, element: &str, rules: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, AttributeRule)>,
    {
        let rules = rules
            .into_iter()
            .map(|(name, rule)| (name.to_owned(), rule))
            .collect();
        self.allowed.retain(|(name, _)| name != element);
        self.allowed.push((element.to_owned(), rules));
        self
    }

    fn rules(&self, element: &str) -> Option<&[(String, AttributeRule)]> {
        self.allowed
            .iter()
            .find(|(name, _)| name == element)
            .map(|(_, rules)| rules.as_slice())
    }
}

impl Default for Sanitizer {
    /// The status policy: basic text elements, links and code.
    fn default() -> Self {
        let basic_classes = || AttributeRule::Classes(BASIC_CLASSES.clone());
        Self::new()
            .allow("br", [])
            .allow("p", [])
            .allow(
                "a",
                [
                    ("href", AttributeRule::Href),
                    ("class", basic_classes()),
                    (
                        "rel",
                        AttributeRule::Set("nofollow noopener noreferrer".to_owned()),
                    ),
                    ("target", AttributeRule::Set("_blank".to_owned())),
                ],
            )
            .allow("span", [("class", basic_classes())])
            .allow("pre", [])
            .allow(
                "code",
                [("class", AttributeRule::Classes(LANGUAGE_CLASSES.clone()))],
            )
    }
}

impl Transform for Sanitizer {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        let Some(element) = tree.element_mut(node) else {
            return Replacement::Unchanged;
        };

        let Some(rules) = self.rules(&element.name) else {
            tracing::trace!(tag = %element.name, "Removing disallowed element");
            return Replacement::Remove;
        };

        let mut attrs = Attributes::new();
        for (name, rule) in rules {
            if let Some(value) = rule.sanitize(element.attribute(name)) {
                attrs.insert(name.clone(), value);
            }
        }
        element.attributes = attrs;
        Replacement::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_transforms;
    use pretty_assertions::assert_eq;
    use toot_tree::{parse, render};

    fn sanitize(html: &str) -> String {
        let mut tree = parse(html).unwrap();
        apply_transforms(&mut tree, &[&Sanitizer::default()]);
        render(&tree)
    }

    #[test]
    fn test_href_javascript_becomes_hash() {
        assert_eq!(filter_href(Some("javascript:alert(1)")), Some("#".to_owned()));
    }

    #[test]
    fn test_href_relative_unchanged() {
        assert_eq!(
            filter_href(Some("/local/path")),
            Some("/local/path".to_owned())
        );
        assert_eq!(filter_href(Some("./x")), Some("./x".to_owned()));
    }

    #[test]
    fn test_href_invalid_is_dropped() {
        assert_eq!(filter_href(Some("not a url")), None);
    }

    #[test]
    fn test_href_absent_stays_absent() {
        assert_eq!(filter_href(None), None);
    }

    #[test]
    fn test_href_allowed_scheme_unchanged() {
        assert_eq!(
            filter_href(Some("https://example.com/x")),
            Some("https://example.com/x".to_owned())
        );
        assert_eq!(
            filter_href(Some("gemini://example.org/")),
            Some("gemini://example.org/".to_owned())
        );
    }

    #[test]
    fn test_href_is_canonicalized() {
        assert_eq!(
            filter_href(Some("HTTPS://Example.COM")),
            Some("https://example.com/".to_owned())
        );
    }

    #[test]
    fn test_href_disallowed_scheme() {
        assert_eq!(filter_href(Some("ftp://example.com/")), Some("#".to_owned()));
        assert_eq!(filter_href(Some("data:text/html,x")), Some("#".to_owned()));
    }

    #[test]
    fn test_filter_classes() {
        assert_eq!(
            filter_classes(&BASIC_CLASSES, Some("mention evil-script")),
            Some("mention".to_owned())
        );
        assert_eq!(
            filter_classes(&BASIC_CLASSES, Some("  u-url   mention ")),
            Some("u-url mention".to_owned())
        );
        assert_eq!(filter_classes(&BASIC_CLASSES, Some("evil")), None);
        assert_eq!(filter_classes(&BASIC_CLASSES, Some("")), None);
        assert_eq!(filter_classes(&BASIC_CLASSES, None), None);
    }

    #[test]
    fn test_set_ignores_input() {
        let rule = AttributeRule::Set("_blank".to_owned());
        assert_eq!(rule.sanitize(Some("_self")), Some("_blank".to_owned()));
        assert_eq!(rule.sanitize(None), Some("_blank".to_owned()));
    }

    #[test]
    fn test_sanitize_link_attributes() {
        assert_eq!(
            sanitize(
                r#"<a href="https://example.com/x" class="mention evil-script" onclick="x()" target="_self">l</a>"#
            ),
            r#"<a class="mention" href="https://example.com/x" rel="nofollow noopener noreferrer" target="_blank">l</a>"#
        );
    }

    #[test]
    fn test_sanitize_link_without_href() {
        assert_eq!(
            sanitize(r#"<a href="not a url">l</a>"#),
            r#"<a rel="nofollow noopener noreferrer" target="_blank">l</a>"#
        );
    }

    #[test]
    fn test_sanitize_code_language_class() {
        assert_eq!(
            sanitize(r#"<pre><code class="language-rust highlight">x</code></pre>"#),
            r#"<pre><code class="language-rust">x</code></pre>"#
        );
    }

    #[test]
    fn test_sanitize_strips_paragraph_attributes() {
        assert_eq!(sanitize(r#"<p class="x" style="y">a<br class="z">b</p>"#), "<p>a<br>b</p>");
    }

    #[test]
    fn test_disallowed_elements_lose_subtree() {
        for tag in ["div", "script", "b", "em", "h1", "ul", "blockquote"] {
            let html = format!("<p>keep<{tag}>drop<span>child</span></{tag}></p>");
            assert_eq!(sanitize(&html), "<p>keep</p>", "tag {tag}");
        }
    }

    #[test]
    fn test_disallowed_void_element_removed() {
        assert_eq!(sanitize(r#"<p>keep<img src="x.png"></p>"#), "<p>keep</p>");
    }

    #[test]
    fn test_href_fragment_kept() {
        assert_eq!(filter_href(Some("#")), Some("#".to_owned()));
    }

    #[test]
    fn test_href_named_fragment_dropped() {
        assert_eq!(filter_href(Some("#section")), None);
        assert_eq!(
            sanitize(r##"<p><a href="#section">x</a></p>"##),
            r#"<p><a rel="nofollow noopener noreferrer" target="_blank">x</a></p>"#
        );
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let html = r#"<p>Hi <span class="h-card"><a href="https://x.y/@a" class="u-url mention">@a</a></span> <a href="javascript:x">j</a><br><code class="language-js">c</code></p><pre>p</pre>"#;
        let once = sanitize(html);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_policy() {
        let sanitizer = Sanitizer::new().allow("b", []);
        let mut tree = parse("<b>x</b><i>y</i>").unwrap();
        apply_transforms(&mut tree, &[&sanitizer]);
        assert_eq!(render(&tree), "<b>x</b>");
    }
}
