//! HTML serializer for [`Tree`].

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::fmt::Write;

use crate::node::{NodeId, NodeKind, Tree, is_void_element};

/// Serialize a [`Tree`] back to HTML.
///
/// Attributes are written in name order, void elements are written without a
/// closing tag, and every other element gets an explicit end tag.
pub struct HtmlSerializer;

impl HtmlSerializer {
    /// Create a new serializer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Serialize the whole document.
    pub fn serialize(&self, tree: &Tree) -> String {
        self.serialize_node(tree, tree.root())
    }

    /// Serialize a single node and its subtree.
    ///
    /// For the document root only the children are written.
    pub fn serialize_node(&self, tree: &Tree, id: NodeId) -> String {
        let mut out = String::with_capacity(1024);
        serialize_node(tree, id, &mut out);
        out
    }
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Document => {
            for &child in tree.children(id) {
                serialize_node(tree, child, out);
            }
        }
        NodeKind::Text(value) => out.push_str(&escape_text(value)),
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (key, value) in &element.attributes {
                write!(out, r#" {}="{}""#, key, escape_attr(value)).unwrap();
            }
            out.push('>');

            if is_void_element(&element.name) {
                return;
            }

            for &child in tree.children(id) {
                serialize_node(tree, child, out);
            }
            write!(out, "</{}>", element.name).unwrap();
        }
    }
}

/// Escape text content.
fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

/// Escape an attribute value.
fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            '\'' if escape_quotes => result.push_str("&#39;"),
            _ => result.push(ch),
        }
    }
    result
}
