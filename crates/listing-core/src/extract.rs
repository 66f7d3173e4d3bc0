//! Field extraction over listing node trees
//!
//! Traversal only depends on [`ListingNode`], so any document tree can back a
//! listing. The XML feed implements it for `roxmltree` nodes.

/// Minimal read-only view of one node in a listing tree
pub trait ListingNode: Sized {
    /// First direct child element with the given tag name
    fn child(&self, name: &str) -> Option<Self>;

    /// All direct child elements with the given tag name, in document order
    fn children_named(&self, name: &str) -> Vec<Self>;

    /// Text content of the node, if any
    fn text(&self) -> Option<&str>;
}

impl<'a, 'input: 'a> ListingNode for roxmltree::Node<'a, 'input> {
    fn child(&self, name: &str) -> Option<Self> {
        self.children()
            .find(|n| n.is_element() && n.tag_name().name() == name)
    }

    fn children_named(&self, name: &str) -> Vec<Self> {
        self.children()
            .filter(|n| n.is_element() && n.tag_name().name() == name)
            .collect()
    }

    fn text(&self) -> Option<&str> {
        roxmltree::Node::text(self)
    }
}

/// Walk `pointer` from `node` and return the trimmed terminal text.
///
/// An empty pointer, a missing segment or a terminal without text all give an
/// empty string.
pub fn extract<N: ListingNode>(node: &N, pointer: &[String]) -> String {
    if pointer.is_empty() {
        return String::new();
    }
    descend(node, pointer)
        .as_ref()
        .and_then(ListingNode::text)
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn descend<N: ListingNode>(node: &N, pointer: &[String]) -> Option<N> {
    let (first, rest) = pointer.split_first()?;
    let mut current = node.child(first)?;
    for segment in rest {
        current = current.child(segment)?;
    }
    Some(current)
}

/// Same as [`extract`] for a single child tag
pub fn child_text<N: ListingNode>(node: &N, name: &str) -> String {
    node.child(name)
        .as_ref()
        .and_then(ListingNode::text)
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}
