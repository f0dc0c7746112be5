//! Lenient HTML fragment parser.
//!
//! Status HTML from federated servers is close to XHTML but not quite: void
//! elements are not self-closed, named HTML entities appear in text, and end
//! tags are sometimes missing or stray. The parser normalizes entities, then
//! drives `quick-xml` with end-name checking disabled and keeps its own stack
//! of open elements to recover from mismatched markup.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_reference, normalize_entities};
use crate::error::ParseError;
use crate::node::{Attributes, NodeId, Tree, is_void_element};

/// Parse HTML fragments into a [`Tree`].
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new parser.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML fragment.
    ///
    /// Tag and attribute names are lowercased. Entity references are decoded
    /// into text values. Comments, doctypes and processing instructions are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized (for example an
    /// unterminated tag or attribute quote).
    pub fn parse(&self, html: &str) -> Result<Tree, ParseError> {
        let html = normalize_entities(html);

        let mut reader = Reader::from_str(&html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut tree = Tree::new();
        let mut open = vec![tree.root()];
        let mut buf = Vec::new();

        loop {
            let current = *open.last().unwrap_or(&tree.root());
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let id = self.create_element(&reader, &e, &mut tree);
                    tree.append_child(current, id);
                    if !tree.element(id).is_some_and(|el| is_void_element(&el.name)) {
                        open.push(id);
                    }
                }
                Event::Empty(e) => {
                    let id = self.create_element(&reader, &e, &mut tree);
                    tree.append_child(current, id);
                    if let Some((key, value)) = self.slash_terminated_value(&reader, &e)
                        && let Some(el) = tree.element_mut(id)
                    {
                        el.set_attribute(key, value);
                        if !is_void_element(&el.name) {
                            open.push(id);
                        }
                    }
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    append_text(&mut tree, current, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?;
                    append_text(&mut tree, current, &decode_reference(&entity));
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_text(&mut tree, current, &text);
                }
                Event::End(e) => {
                    let name = self.decode_name(&reader, e.name().as_ref());
                    close_element(&tree, &mut open, &name);
                }
                Event::Eof => break,
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }

        Ok(tree)
    }

    fn create_element<R: BufRead>(
        &self,
        reader: &Reader<R>,
        e: &BytesStart,
        tree: &mut Tree,
    ) -> NodeId {
        let name = self.decode_name(reader, e.name().as_ref());
        let attrs = self.decode_attrs(reader, e);
        tree.create_element(name, attrs)
    }

    fn decode_name<R: BufRead>(&self, reader: &Reader<R>, name: &[u8]) -> String {
        reader
            .decoder()
            .decode(name)
            .map_or_else(
                |_| String::from_utf8_lossy(name).into_owned(),
                std::borrow::Cow::into_owned,
            )
            .to_ascii_lowercase()
    }

    fn decode_attrs<R: BufRead>(&self, reader: &Reader<R>, e: &BytesStart) -> Attributes {
        let mut attrs = Attributes::new();
        for attr in e.html_attributes().flatten() {
            let key = self.decode_name(reader, attr.key.as_ref());
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            // First occurrence wins, as in browsers.
            attrs.entry(key).or_insert(value);
        }
        attrs
    }

    /// The last attribute of `<a href=x/>`, with its `/` restored.
    ///
    /// `quick-xml` reads the trailing slash as a self-closing marker. In HTML
    /// it ends the unquoted value instead, and the tag stays open.
    fn slash_terminated_value<R: BufRead>(
        &self,
        reader: &Reader<R>,
        e: &BytesStart,
    ) -> Option<(String, String)> {
        let attr = e.html_attributes().flatten().last()?;
        let raw = e.attributes_raw();
        let value_start = raw.len().checked_sub(attr.value.len() + 1)?;
        if attr.value.is_empty() || raw[value_start] != b'=' || !raw.ends_with(&attr.value[..]) {
            return None;
        }

        let key = self.decode_name(reader, attr.key.as_ref());
        let mut value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        value.push('/');
        Some((key, value))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Append text to `parent`, merging with a trailing text child.
fn append_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(&last) = tree.children(parent).last()
        && let Some(value) = tree.text_mut(last)
    {
        value.push_str(text);
        return;
    }
    let id = tree.create_text(text);
    tree.append_child(parent, id);
}

/// Pop the innermost open element named `name` and everything opened after it.
///
/// End tags with no matching open element are ignored.
fn close_element(tree: &Tree, open: &mut Vec<NodeId>, name: &str) {
    let position = open
        .iter()
        .skip(1)
        .rposition(|&id| tree.is_element(id, name));
    match position {
        Some(index) => open.truncate(index + 1),
        None => tracing::debug!(tag = %name, "Ignoring unmatched end tag"),
    }
}
