//! Arena-backed HTML tree used by the table preprocessing stages.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Parent
//! links exist only for upward queries ("is this table nested?"); rewrites
//! never mutate a node in place but rebuild the parent's child list with the
//! replacement id swapped in.

mod parse;
mod serialize;

pub use parse::{MAX_HTML_NESTING_DEPTH, MAX_HTML_SIZE};
pub use serialize::{SLOT_ATTR, SLOT_TAG, SlotTable};

/// Index of a node inside an [`HtmlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic container for the parsed fragment
    Root,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    /// Opaque serialized markup standing in for an isolated table
    Placeholder { markup: String },
}

#[derive(Debug, Clone)]
pub struct HtmlNode {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HtmlNode {
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Lower-case tag name for element nodes
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }
}

/// An HTML fragment stored as an index arena
#[derive(Debug, Clone)]
pub struct HtmlTree {
    nodes: Vec<HtmlNode>,
    root: NodeId,
}

impl Default for HtmlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTree {
    /// Create a tree holding only an empty root
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![HtmlNode {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node. Ids are only ever produced by this tree, so lookup cannot miss.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &HtmlNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node(self.root).children.is_empty()
    }

    /// Append a new node as the last child of `parent`
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HtmlNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Replace `old` in its parent's child list with a fresh detached node.
    ///
    /// The parent's child list is rebuilt with the new id at the old position;
    /// `old` stays in the arena but is no longer reachable from the root.
    /// Returns `None` when `old` is the root.
    pub fn replace_with(&mut self, old: NodeId, kind: NodeKind) -> Option<NodeId> {
        let parent = self.nodes[old.0].parent?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(HtmlNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });

        let rebuilt: Vec<NodeId> = self.nodes[parent.0]
            .children
            .iter()
            .map(|&child| if child == old { id } else { child })
            .collect();
        self.nodes[parent.0].children = rebuilt;
        self.nodes[old.0].parent = None;
        Some(id)
    }

    /// Walk parent links upwards, nearest ancestor first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |&current| {
            self.node(current).parent
        })
    }

    /// All nodes below `id` in document order (excluding `id` itself)
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    /// Concatenated text of the subtree rooted at `id`
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in std::iter::once(id).chain(self.descendants(id)) {
            if let NodeKind::Text(t) = &self.node(node).kind {
                text.push_str(t);
            }
        }
        text
    }
}
