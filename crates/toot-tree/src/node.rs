//! Arena-backed document tree.
//!
//! Nodes live in a flat table owned by [`Tree`] and refer to each other by
//! [`NodeId`]. Parent links are plain indices, so they never own anything and
//! are rewritten every time a node is attached to a new child list.

use std::collections::BTreeMap;

/// Element attributes, ordered by name so serialization is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Check whether `name` is an HTML void element (`br`, `img`, ...).
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Build an attribute map from string pairs.
///
/// # Example
///
/// ```
/// use toot_tree::attributes;
///
/// let attrs = attributes([("src", "a.png"), ("alt", "a")]);
/// assert_eq!(attrs.get("src").map(String::as_str), Some("a.png"));
/// ```
#[must_use]
pub fn attributes<const N: usize>(pairs: [(&str, &str); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

/// Index of a node inside its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload: tag name and attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Attribute map. A missing key means the attribute is not present.
    pub attributes: Attributes,
}

impl Element {
    /// Create an element payload.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .into_iter()
            .flat_map(str::split_whitespace)
    }

    /// Check whether the `class` attribute contains `class` as a whole token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Node payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Root container.
    Document,
    /// Element with tag name and attributes.
    Element(Element),
    /// Text with its decoded value.
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeRecord {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

/// Document tree stored as an index arena.
///
/// The root is always a [`NodeKind::Document`]. Nodes dropped from the tree
/// stay in the arena until [`Tree::compact`] copies the reachable part into a
/// fresh one.
///
/// All accessors panic when given a [`NodeId`] that was not created by the
/// same tree.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<NodeRecord>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree containing only the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeRecord::new(NodeKind::Document)],
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena, including unreachable ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Node payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Parent of a node, `None` for the root and for detached nodes.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Whether the node can hold children (document or element).
    #[must_use]
    pub fn allows_children(&self, id: NodeId) -> bool {
        self.nodes[id.0].allows_children()
    }

    /// Whether the node is the document root kind.
    #[must_use]
    pub fn is_document(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Document)
    }

    /// Element payload, if the node is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element payload, if the node is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text value, if the node is a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Mutable text value, if the node is a text node.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the node is an element named `name`.
    #[must_use]
    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.name == name)
    }

    /// Attribute value of an element node.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attribute(name))
    }

    /// Whether an element node carries `class` as a class token.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, name: impl Into<String>, attributes: Attributes) -> NodeId {
        self.push(NodeKind::Element(Element::new(name, attributes)))
    }

    /// Allocate a detached element and attach `children` to it.
    pub fn create_element_with(
        &mut self,
        name: impl Into<String>,
        attributes: Attributes,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.create_element(name, attributes);
        self.set_children(id, children);
        id
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(value.into()))
    }

    /// Append `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.allows_children(parent), "text nodes have no children");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Replace `parent`'s child list, pointing every child back at `parent`.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        debug_assert!(self.allows_children(parent), "text nodes have no children");
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    /// Copy the part of the tree reachable from the root into a fresh arena.
    ///
    /// Node ids are renumbered in document order.
    #[must_use]
    pub fn compact(&self) -> Tree {
        let mut out = Tree::new();
        let root = out.root();
        self.copy_children(self.root(), &mut out, root);
        out
    }

    fn copy_children(&self, from: NodeId, out: &mut Tree, to: NodeId) {
        for &child in self.children(from) {
            let id = match self.kind(child) {
                NodeKind::Element(element) => {
                    out.create_element(element.name.clone(), element.attributes.clone())
                }
                NodeKind::Text(value) => out.create_text(value.clone()),
                NodeKind::Document => continue,
            };
            out.append_child(to, id);
            self.copy_children(child, out, id);
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord::new(kind));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_document_root() {
        let tree = Tree::new();
        assert!(tree.is_document(tree.root()));
        assert!(tree.parent(tree.root()).is_none());
        assert!(tree.children(tree.root()).is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_append_child_sets_parent() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", Attributes::new());
        let text = tree.create_text("hi");
        tree.append_child(tree.root(), p);
        tree.append_child(p, text);

        assert_eq!(tree.children(tree.root()), &[p]);
        assert_eq!(tree.parent(p), Some(tree.root()));
        assert_eq!(tree.parent(text), Some(p));
        assert_eq!(tree.text(text), Some("hi"));
    }

    #[test]
    fn test_set_children_moves_parent_links() {
        let mut tree = Tree::new();
        let a = tree.create_element("span", Attributes::new());
        let b = tree.create_element("span", Attributes::new());
        let text = tree.create_text("x");
        tree.set_children(a, vec![text]);
        assert_eq!(tree.parent(text), Some(a));

        tree.set_children(b, vec![text]);
        assert_eq!(tree.parent(text), Some(b));
        assert_eq!(tree.children(b), &[text]);
    }

    #[test]
    fn test_has_class_matches_whole_tokens() {
        let mut tree = Tree::new();
        let a = tree.create_element("a", attributes([("class", "u-url  mention")]));
        assert!(tree.has_class(a, "mention"));
        assert!(tree.has_class(a, "u-url"));
        assert!(!tree.has_class(a, "ment"));
    }

    #[test]
    fn test_attribute_absent_vs_empty() {
        let mut tree = Tree::new();
        let a = tree.create_element("a", attributes([("href", "")]));
        assert_eq!(tree.attribute(a, "href"), Some(""));
        assert_eq!(tree.attribute(a, "class"), None);
    }

    #[test]
    fn test_element_mut_updates_attributes() {
        let mut tree = Tree::new();
        let a = tree.create_element("a", Attributes::new());
        tree.element_mut(a).unwrap().set_attribute("href", "/x");
        assert_eq!(tree.attribute(a, "href"), Some("/x"));

        let text = tree.create_text("t");
        assert!(tree.element_mut(text).is_none());
    }

    #[test]
    fn test_compact_drops_unreachable_nodes() {
        let mut tree = Tree::new();
        let p = tree.create_element("p", Attributes::new());
        let kept = tree.create_text("kept");
        let _orphan = tree.create_text("orphan");
        tree.append_child(tree.root(), p);
        tree.append_child(p, kept);
        assert_eq!(tree.len(), 4);

        let compact = tree.compact();
        assert_eq!(compact.len(), 3);
        let p = compact.children(compact.root())[0];
        assert!(compact.is_element(p, "p"));
        let text = compact.children(p)[0];
        assert_eq!(compact.text(text), Some("kept"));
        assert_eq!(compact.parent(text), Some(p));
    }

    #[test]
    fn test_is_void_element() {
        assert!(is_void_element("br"));
        assert!(is_void_element("img"));
        assert!(!is_void_element("p"));
    }
}
