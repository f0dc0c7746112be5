//! Plain-text projection of status content.
//!
//! Used for previews, notifications and to feed code blocks back through the
//! markup preprocessor. Formatting elements are written back as the inline
//! markup that would produce them, so text from [`html_to_text`] can be
//! pasted into the composer and rendered again.

use toot_tree::{NodeId, NodeKind, Tree};

/// Convert an HTML fragment to plain text.
///
/// The result is trimmed. Markup that cannot be parsed is logged and yields an
/// empty string.
///
/// # Example
///
/// ```
/// use toot_content::html_to_text;
///
/// assert_eq!(html_to_text("<p>Hello <b>world</b></p>"), "Hello **world**");
/// ```
pub fn html_to_text(html: &str) -> String {
    let tree = match toot_tree::parse(html) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse HTML for text extraction");
            return String::new();
        }
    };

    let root = tree.root();
    tree.children(root)
        .iter()
        .map(|&child| tree_to_text(&tree, child))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Convert one node and its subtree to plain text.
pub fn tree_to_text(tree: &Tree, node: NodeId) -> String {
    let element = match tree.kind(node) {
        NodeKind::Text(value) => return value.clone(),
        NodeKind::Document => return children_text(tree, node),
        NodeKind::Element(element) => element,
    };

    match element.name.as_str() {
        "br" => return "\n".to_owned(),
        "img" if element.has_class("custom-emoji") => {
            return format!(":{}:", element.attribute("data-emoji-id").unwrap_or_default());
        }
        "img" if element.has_class("iconify-emoji") => {
            return element.attribute("alt").unwrap_or_default().to_owned();
        }
        _ => {}
    }

    let (pre, post) = match element.name.as_str() {
        "p" | "pre" => ("\n".to_owned(), String::new()),
        "code" if tree.parent(node).is_some_and(|p| tree.is_element(p, "pre")) => {
            let lang = element
                .attribute("class")
                .map(|class| class.replacen("language-", "", 1))
                .unwrap_or_default();
            (format!("```{lang}\n"), "\n```".to_owned())
        }
        "code" => ("`".to_owned(), "`".to_owned()),
        "b" | "strong" => ("**".to_owned(), "**".to_owned()),
        "i" | "em" => ("*".to_owned(), "*".to_owned()),
        "del" => ("~~".to_owned(), "~~".to_owned()),
        _ => (String::new(), String::new()),
    };

    format!("{pre}{}{post}", children_text(tree, node))
}

fn children_text(tree: &Tree, node: NodeId) -> String {
    tree.children(node)
        .iter()
        .map(|&child| tree_to_text(tree, child))
        .collect()
}
