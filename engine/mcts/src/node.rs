//! Search-tree node and edge representation.
//!
//! Each node wraps one game position together with the player to move there.
//! Per-move statistics (traversal count, accumulated evaluation, mean value)
//! live on the edge from a parent to a child, one edge per parent→child
//! relation, stored on the parent in insertion order.

use game_core::other_player;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// Statistics for one parent→child edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edge {
    /// Number of backpropagations that passed through this edge
    pub traversals: u32,

    /// Sum of all evaluations backpropagated through this edge
    pub value_sum: f64,

    /// `value_sum / traversals`, recomputed on every update so it can
    /// never drift; 0.0 while the edge is untraversed
    pub mean_value: f64,
}

impl Edge {
    /// Fold one backpropagated evaluation into the edge statistics.
    pub fn record(&mut self, value: f64) {
        self.traversals += 1;
        self.value_sum += value;
        self.mean_value = self.value_sum / self.traversals as f64;
    }
}

/// A node in the search tree.
#[derive(Debug, Clone)]
pub struct Node<S> {
    /// Parent node index (NONE for a root). Upward traversal only,
    /// never ownership; the arena owns every node.
    pub parent: NodeId,

    /// Game position at this node
    pub state: S,

    /// Player to move at this node (0 or 1). Set at attach time to the
    /// opposite of the parent's player.
    pub player: u8,

    /// Number of times this node was entered during selection and
    /// backpropagation, direct evaluations included
    pub visits: u32,

    /// Children with their edge statistics, in insertion order.
    /// Empty until the node is expanded; expansion runs at most once.
    pub children: Vec<(NodeId, Edge)>,
}

impl<S> Node<S> {
    /// Create a root node with an explicitly assigned player.
    pub fn new_root(state: S, player: u8) -> Self {
        Self {
            parent: NodeId::NONE,
            state,
            player,
            visits: 0,
            children: Vec::new(),
        }
    }

    /// Create a child of a node whose player is `parent_player`.
    pub fn new_child(parent: NodeId, state: S, parent_player: u8) -> Self {
        Self {
            parent,
            state,
            player: other_player(parent_player),
            visits: 0,
            children: Vec::new(),
        }
    }

    /// Whether this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }
}
