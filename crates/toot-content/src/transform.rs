//! Tree transform passes.
//!
//! A [`Transform`] looks at one node and says what should take its place.
//! [`apply_transforms`] runs a list of transforms over a tree, one full
//! post-order pass per transform: a node is offered to the transform only
//! after all of its children were offered and its child list was rebuilt
//! from their replacements.

use toot_tree::{Attributes, NodeId, Tree};

/// A replacement entry produced by a transform.
///
/// Strings become text nodes attached to the new parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Child {
    /// An existing or newly created node.
    Node(NodeId),
    /// Literal text.
    Text(String),
}

impl Child {
    /// Materialize the entry as a node of `tree`.
    pub fn into_node(self, tree: &mut Tree) -> NodeId {
        match self {
            Self::Node(id) => id,
            Self::Text(value) => tree.create_text(value),
        }
    }

    /// Whether the entry is an empty string.
    #[must_use]
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(value) if value.is_empty())
    }
}

impl From<NodeId> for Child {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// What a transform wants in place of the node it was given.
///
/// # Example
///
/// ```
/// use toot_content::{Child, Replacement};
///
/// // Drop the node
/// let removed = Replacement::Remove;
///
/// // Replace it with two text nodes
/// let many = Replacement::many(["a", "b"]);
/// assert_eq!(many, Replacement::Many(vec![Child::from("a"), Child::from("b")]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// Keep the node (it may have been mutated in place).
    Unchanged,
    /// Replace the node with another single node.
    Node(NodeId),
    /// Replace the node with zero or more nodes and strings, in order.
    Many(Vec<Child>),
    /// Remove the node and its subtree.
    Remove,
}

impl Replacement {
    /// Build a [`Replacement::Many`] from anything convertible to [`Child`].
    pub fn many<I, C>(children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Child>,
    {
        Self::Many(children.into_iter().map(Into::into).collect())
    }
}

/// A single pass over the tree.
///
/// Implementations must be pure apart from mutating the node they are given
/// (and creating new nodes). They are called once per non-root node.
pub trait Transform: Send + Sync {
    /// Transform name, used in logs.
    fn name(&self) -> &str;

    /// Decide what replaces `node`.
    ///
    /// The node's children have already been transformed. Its parent still
    /// holds the child list from before this pass.
    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement;
}

/// Adapter turning a closure into a [`Transform`].
///
/// # Example
///
/// ```
/// use toot_content::{FnTransform, Replacement, apply_transforms};
///
/// let strip_links = FnTransform::new("strip-links", |tree, node| {
///     if tree.is_element(node, "a") {
///         Replacement::Remove
///     } else {
///         Replacement::Unchanged
///     }
/// });
///
/// let mut tree = toot_tree::parse(r#"<p>a<a href="/x">b</a></p>"#).unwrap();
/// apply_transforms(&mut tree, &[&strip_links]);
/// assert_eq!(toot_tree::render(&tree), "<p>a</p>");
/// ```
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> FnTransform<F>
where
    F: Fn(&mut Tree, NodeId) -> Replacement + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(&mut Tree, NodeId) -> Replacement + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        (self.f)(tree, node)
    }
}

/// Create an element from replacement entries.
pub fn build_element(
    tree: &mut Tree,
    name: &str,
    attributes: Attributes,
    children: Vec<Child>,
) -> NodeId {
    let children = children
        .into_iter()
        .map(|child| child.into_node(tree))
        .collect();
    tree.create_element_with(name, attributes, children)
}

/// Run `transforms` over `tree`, one full pass each, in order.
///
/// The document root itself is never replaced; only its descendants are.
pub fn apply_transforms(tree: &mut Tree, transforms: &[&dyn Transform]) {
    for transform in transforms {
        tracing::debug!(transform = transform.name(), "Applying transform");
        let root = tree.root();
        visit(tree, root, *transform, true);
    }
}

fn visit(tree: &mut Tree, node: NodeId, transform: &dyn Transform, is_root: bool) -> Replacement {
    if tree.allows_children(node) {
        let old = tree.children(node).to_vec();
        let mut next = Vec::with_capacity(old.len());
        for child in old {
            match visit(tree, child, transform, false) {
                Replacement::Unchanged => next.push(child),
                Replacement::Node(id) => next.push(id),
                Replacement::Many(list) => {
                    next.extend(list.into_iter().map(|c| c.into_node(tree)));
                }
                Replacement::Remove => {}
            }
        }
        tree.set_children(node, next);
    }

    if is_root {
        Replacement::Unchanged
    } else {
        transform.apply(tree, node)
    }
}
