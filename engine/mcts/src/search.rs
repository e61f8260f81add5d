//! The four MCTS phases.
//!
//! One simulation cycle is:
//! 1. Selection: walk the tree policy from the root to a leaf
//! 2. Expansion: attach all successor positions of the leaf (unless terminal)
//! 3. Rollout: play a random continuation to a terminal state
//! 4. Backpropagation: fold the outcome into the path back to the root
//!
//! The functions here operate on one tree generation; the episode driver in
//! [`crate::episode`] strings cycles together and re-roots between real moves.

use game_core::StateManager;
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::trace;

use crate::node::NodeId;
use crate::policy::{RolloutPolicy, TreePolicy};
use crate::tree::{SearchTree, TreeError};

/// Errors that can occur during search. None of these is transient or
/// retryable: invariant violations are programmer errors, and contract
/// violations mean the state manager is broken.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("node {0} has already been expanded")]
    AlreadyExpanded(u32),

    #[error("cannot select a child of node {0}: it has none")]
    NoChildren(u32),

    #[error("player {0} is out of range for a two-player game")]
    PlayerOutOfRange(u8),

    #[error("state manager returned no successors for a non-terminal state")]
    SuccessorContract,

    #[error("terminal state reached by rollout resolved to no winner")]
    NoWinner,
}

/// Walk from `root` to a leaf using the tree policy.
///
/// Stops as soon as the current node has no children, whether that leaf is
/// unexpanded or terminal.
pub fn select_leaf<S>(
    tree: &SearchTree<S>,
    root: NodeId,
    policy: &dyn TreePolicy<S>,
) -> Result<NodeId, SearchError> {
    let mut current = root;
    while tree.get(current).is_expanded() {
        current = policy.select_child(tree, current)?;
    }
    Ok(current)
}

/// Attach all successor positions of `leaf` as new children.
///
/// Returns `Ok(false)` without touching the tree when the leaf is terminal.
/// Expanding a node twice is a logic error, not a recoverable condition.
pub fn expand<M: StateManager>(
    tree: &mut SearchTree<M::State>,
    manager: &M,
    leaf: NodeId,
) -> Result<bool, SearchError> {
    if tree.get(leaf).is_expanded() {
        return Err(SearchError::AlreadyExpanded(leaf.0));
    }
    if manager.is_terminal(&tree.get(leaf).state) {
        return Ok(false);
    }

    let successors = manager.successor_states(&tree.get(leaf).state);
    if successors.is_empty() {
        return Err(SearchError::SuccessorContract);
    }

    tree.attach_children(leaf, successors);
    Ok(true)
}

/// Play `state` out to a terminal position with the rollout policy and
/// return the winning player.
pub fn rollout<M: StateManager>(
    manager: &M,
    state: &M::State,
    policy: &dyn RolloutPolicy<M>,
    rng: &mut ChaCha20Rng,
) -> Result<u8, SearchError> {
    let mut current = state.clone();
    while !manager.is_terminal(&current) {
        current = policy.select_next(manager, &current, rng)?;
    }
    manager.winner(&current).ok_or(SearchError::NoWinner)
}

/// Rollout from `state` converted to a scalar from player 0's perspective:
/// `+1.0` if player 0 won, `-1.0` otherwise.
pub fn rollout_evaluation<M: StateManager>(
    manager: &M,
    state: &M::State,
    policy: &dyn RolloutPolicy<M>,
    rng: &mut ChaCha20Rng,
) -> Result<f64, SearchError> {
    let winner = rollout(manager, state, policy, rng)?;
    Ok(if winner == 0 { 1.0 } else { -1.0 })
}

/// Run one full simulation cycle rooted at `root`, mutating the tree.
///
/// The evaluated node is a uniformly random new child of the selected leaf,
/// or the leaf itself when it is terminal and expansion did nothing.
pub fn run_simulation<M: StateManager>(
    tree: &mut SearchTree<M::State>,
    manager: &M,
    root: NodeId,
    tree_policy: &dyn TreePolicy<M::State>,
    rollout_policy: &dyn RolloutPolicy<M>,
    rng: &mut ChaCha20Rng,
) -> Result<(), SearchError> {
    let leaf = select_leaf(tree, root, tree_policy)?;
    let expanded = expand(tree, manager, leaf)?;

    let eval_node = if expanded {
        let count = tree.get(leaf).children.len();
        let pick = rng.gen_range(0..count);
        tree.get(leaf).children[pick].0
    } else {
        leaf
    };

    let value = rollout_evaluation(manager, &tree.get(eval_node).state, rollout_policy, rng)?;
    tree.backpropagate(eval_node, value, root)?;

    trace!(
        leaf = leaf.0,
        eval_node = eval_node.0,
        expanded,
        value,
        "simulation cycle complete"
    );

    Ok(())
}
