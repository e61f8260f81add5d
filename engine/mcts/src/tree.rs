//! Search tree with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices.
//! The parent back-reference is an index, not an owning pointer, so the
//! upward links used by backpropagation cannot form ownership cycles.
//!
//! One `SearchTree` is one tree generation: committing a real move clones
//! the chosen child into a brand-new single-node tree and drops the old
//! generation wholesale, which bounds memory across an episode.

use thiserror::Error;

use crate::node::{Edge, Node, NodeId};

/// Structural errors. All of these are programmer errors, not runtime
/// conditions; none is retryable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {child} is not a child of node {parent}")]
    NotAChild { parent: u32, child: u32 },
}

/// Search tree for one generation of the real game.
#[derive(Debug)]
pub struct SearchTree<S> {
    /// Arena storing all nodes
    nodes: Vec<Node<S>>,

    /// Root node index (always 0 after construction)
    root: NodeId,
}

impl<S> SearchTree<S> {
    /// Create a new tree whose root wraps the current real position, with
    /// `player` to move.
    pub fn new(state: S, player: u8) -> Self {
        Self {
            nodes: vec![Node::new_root(state, player)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<S> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<S> {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node for `state` and append it under `parent` with a
    /// fresh zero-valued edge. The child's player is set to the opposite
    /// of the parent's and its back-reference to `parent`.
    ///
    /// The child is created inside the arena, so it cannot already be
    /// attached elsewhere.
    pub fn attach_child(&mut self, parent: NodeId, state: S) -> NodeId {
        let parent_player = self.get(parent).player;
        let child = Node::new_child(parent, state, parent_player);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(child);
        self.get_mut(parent).children.push((id, Edge::default()));
        id
    }

    /// Attach one child per state, preserving the given order. The order
    /// is significant: selection breaks ties by insertion index.
    pub fn attach_children(&mut self, parent: NodeId, states: impl IntoIterator<Item = S>) {
        for state in states {
            self.attach_child(parent, state);
        }
    }

    /// Ordered child IDs of a node.
    pub fn children_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id).children.iter().map(|(child, _)| *child)
    }

    /// Edge statistics of a node's children, parallel to [`children_of`].
    ///
    /// [`children_of`]: SearchTree::children_of
    pub fn edges_of(&self, id: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.get(id).children.iter().map(|(_, edge)| edge)
    }

    /// The edge from `parent` to `child`.
    pub fn edge_to(&self, parent: NodeId, child: NodeId) -> Result<&Edge, TreeError> {
        self.get(parent)
            .children
            .iter()
            .find(|(id, _)| *id == child)
            .map(|(_, edge)| edge)
            .ok_or(TreeError::NotAChild {
                parent: parent.0,
                child: child.0,
            })
    }

    fn edge_to_mut(&mut self, parent: NodeId, child: NodeId) -> Result<&mut Edge, TreeError> {
        let (parent_idx, child_idx) = (parent.0, child.0);
        self.get_mut(parent)
            .children
            .iter_mut()
            .find(|(id, _)| *id == child)
            .map(|(_, edge)| edge)
            .ok_or(TreeError::NotAChild {
                parent: parent_idx,
                child: child_idx,
            })
    }

    /// Propagate an evaluation from `from` up to `root`.
    ///
    /// Starting at `from`, increments the visit counter; on every node above
    /// the evaluated one, records `value` on the edge leading back down the
    /// path. Stops after processing `root` (or a parent-less node), so stale
    /// ancestors from a previous generation are never touched.
    pub fn backpropagate(
        &mut self,
        from: NodeId,
        value: f64,
        root: NodeId,
    ) -> Result<(), TreeError> {
        let mut current = from;
        let mut below = NodeId::NONE;

        loop {
            self.get_mut(current).visits += 1;
            if below.is_some() {
                self.edge_to_mut(current, below)?.record(value);
            }

            let node = self.get(current);
            if current == root || node.parent.is_none() {
                return Ok(());
            }
            below = current;
            current = node.parent;
        }
    }

    /// The robust child: highest edge traversal count, ties to the lowest
    /// insertion index. `None` for a childless node.
    pub fn most_traversed_child(&self, id: NodeId) -> Option<NodeId> {
        let mut best: Option<(NodeId, u32)> = None;
        for (child, edge) in &self.get(id).children {
            // strict comparison keeps the first child on ties
            match best {
                Some((_, traversals)) if edge.traversals <= traversals => {}
                _ => best = Some((*child, edge.traversals)),
            }
        }
        best.map(|(child, _)| child)
    }

    /// Clone a node into a fresh single-node tree: same state and player,
    /// no parent, no children, visit count zero. Used when committing a
    /// real move; the previous generation is dropped by the caller.
    pub fn detach_as_new_root(&self, id: NodeId) -> SearchTree<S>
    where
        S: Clone,
    {
        let node = self.get(id);
        SearchTree::new(node.state.clone(), node.player)
    }

    /// Get statistics about the tree for diagnostics.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            max_depth: self.compute_max_depth(self.root, 0),
            root_edges: root.children.iter().map(|(_, edge)| *edge).collect(),
        }
    }

    fn compute_max_depth(&self, id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(id);
        node.children
            .iter()
            .map(|(child, _)| self.compute_max_depth(*child, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub max_depth: u32,
    /// Edge statistics of the root's children, in insertion order
    pub root_edges: Vec<Edge>,
}
