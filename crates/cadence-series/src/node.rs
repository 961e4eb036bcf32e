//! Parent links for composing series into a larger forecast tree.
//!
//! Series only need to know *which* node they hang under, never to own or
//! traverse it. Nodes are therefore plain indices into a [`NodeRegistry`]
//! arena, which keeps children from holding references to their parents.

use std::fmt;

/// Identifier of a node in a [`NodeRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Anything that can sit under a parent node.
pub trait Node {
    /// The parent this value was bound to, or `None` for a root.
    fn parent(&self) -> Option<NodeId>;

    /// Returns true if the value has no parent.
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }
}

#[derive(Debug, Clone)]
struct NodeRecord {
    label: String,
    parent: Option<NodeId>,
}

/// Arena of composition nodes.
///
/// # Example
///
/// ```rust
/// use cadence_series::node::NodeRegistry;
///
/// let mut registry = NodeRegistry::new();
/// let deal = registry.root("deal");
/// let tranche = registry.child(deal, "tranche-a");
/// assert_eq!(registry.parent_of(tranche), Some(deal));
/// assert_eq!(registry.label(tranche), Some("tranche-a"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeRecord>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node with no parent.
    pub fn root(&mut self, label: impl Into<String>) -> NodeId {
        self.insert(label.into(), None)
    }

    /// Registers a node under `parent`.
    pub fn child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        debug_assert!(self.contains(parent), "unknown parent {parent}");
        self.insert(label.into(), Some(parent))
    }

    fn insert(&mut self, label: String, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord { label, parent });
        id
    }

    /// Returns true if `id` was issued by this registry.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Parent of `id`, or `None` for roots and unknown ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Label of `id`.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|n| n.label.as_str())
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent_of(id), move |&p| self.parent_of(p))
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no node has been registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
