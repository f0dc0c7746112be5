//! Top-level paragraph spacing for the editor.

use toot_tree::{Attributes, NodeId, Tree};

use crate::transform::{Child, Replacement, Transform};

/// Inserts an empty `p` after every top-level paragraph except the last.
///
/// The editor collapses adjacent paragraphs; the empty ones keep the visual
/// gap between status paragraphs.
///
/// # Example
///
/// ```
/// use toot_content::{ParagraphSpacing, apply_transforms};
///
/// let mut tree = toot_tree::parse("<p>a</p><p>b</p>").unwrap();
/// apply_transforms(&mut tree, &[&ParagraphSpacing]);
/// assert_eq!(toot_tree::render(&tree), "<p>a</p><p></p><p>b</p>");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ParagraphSpacing;

impl Transform for ParagraphSpacing {
    fn name(&self) -> &'static str {
        "paragraph-spacing"
    }

    fn apply(&self, tree: &mut Tree, node: NodeId) -> Replacement {
        let Some(parent) = tree.parent(node) else {
            return Replacement::Unchanged;
        };
        if !tree.is_document(parent)
            || !tree.is_element(node, "p")
            || tree.children(parent).last() == Some(&node)
        {
            return Replacement::Unchanged;
        }

        let spacer = tree.create_element("p", Attributes::new());
        Replacement::many([Child::Node(node), Child::Node(spacer)])
    }
}
