//! Document tree for status HTML.
//!
//! This crate provides the shared data structure every content pass works on:
//!
//! - [`Tree`]: an index arena of [`NodeKind::Document`], [`NodeKind::Element`]
//!   and [`NodeKind::Text`] nodes with non-owning parent links
//! - [`HtmlParser`]: a lenient parser for the HTML fragments servers send
//! - [`HtmlSerializer`]: writes a tree back to HTML
//!
//! # Example
//!
//! ```
//! use toot_tree::{parse, render};
//!
//! let tree = parse("<p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(render(&tree), "<p>Hello <b>world</b></p>");
//! ```

mod entities;
mod error;
mod node;
mod parser;
mod serializer;

pub use error::ParseError;
pub use node::{Attributes, Element, NodeId, NodeKind, Tree, attributes, is_void_element};
pub use parser::HtmlParser;
pub use serializer::HtmlSerializer;

/// Parse an HTML fragment with the default [`HtmlParser`].
///
/// # Errors
///
/// Returns an error if the markup cannot be tokenized.
pub fn parse(html: &str) -> Result<Tree, ParseError> {
    HtmlParser::new().parse(html)
}

/// Serialize a tree with the default [`HtmlSerializer`].
pub fn render(tree: &Tree) -> String {
    HtmlSerializer::new().serialize(tree)
}
