//! Pluggable selection policies.
//!
//! The tree policy descends an already-built tree during selection; the
//! rollout policy picks moves during simulation playouts. Both are traits
//! with a single operation so alternative strategies can be swapped in
//! behind the episode driver.

use game_core::StateManager;
use rand::Rng;
use rand_chacha::ChaCha20Rng;

use crate::node::NodeId;
use crate::search::SearchError;
use crate::tree::SearchTree;

/// Policy used during selection to pick a child of an internal node.
pub trait TreePolicy<S> {
    fn select_child(&self, tree: &SearchTree<S>, node: NodeId) -> Result<NodeId, SearchError>;
}

/// Policy used during rollout to pick the next position.
pub trait RolloutPolicy<M: StateManager> {
    fn select_next(
        &self,
        manager: &M,
        state: &M::State,
        rng: &mut ChaCha20Rng,
    ) -> Result<M::State, SearchError>;
}

/// UCB-style exploration bonus.
///
/// `log2(0)` is treated as 0 so the bonus is well-defined before the node
/// has ever been visited.
fn uct_bonus(exploration: f64, visits: u32, traversals: u32) -> f64 {
    let log_visits = if visits == 0 {
        0.0
    } else {
        (visits as f64).log2()
    };
    exploration * (log_visits / (1.0 + traversals as f64)).sqrt()
}

/// The UCT tree policy.
///
/// Scores each child as `mean_value + sign * bonus`, where the sign is `+1`
/// when player 0 is to move (maximizing) and `-1` for player 1 (minimizing).
/// Player 0 picks the maximum score, player 1 the minimum. Ties resolve to
/// the first child in insertion order; the strict comparisons below make
/// that a documented, reproducible tie-break rather than an accident.
#[derive(Debug, Clone)]
pub struct UctPolicy {
    exploration: f64,
}

impl UctPolicy {
    pub fn new(exploration: f64) -> Self {
        Self { exploration }
    }
}

impl<S> TreePolicy<S> for UctPolicy {
    fn select_child(&self, tree: &SearchTree<S>, node: NodeId) -> Result<NodeId, SearchError> {
        let node_ref = tree.get(node);
        if node_ref.player > 1 {
            return Err(SearchError::PlayerOutOfRange(node_ref.player));
        }

        let maximizing = node_ref.player == 0;
        let sign = if maximizing { 1.0 } else { -1.0 };

        let mut best: Option<(NodeId, f64)> = None;
        for (child, edge) in &node_ref.children {
            let score =
                edge.mean_value + sign * uct_bonus(self.exploration, node_ref.visits, edge.traversals);
            let better = match best {
                None => true,
                Some((_, best_score)) => {
                    if maximizing {
                        score > best_score
                    } else {
                        score < best_score
                    }
                }
            };
            if better {
                best = Some((*child, score));
            }
        }

        best.map(|(child, _)| child)
            .ok_or(SearchError::NoChildren(node.0))
    }
}

/// Uniform-random rollout policy over the state manager's successors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRollout;

impl RandomRollout {
    pub fn new() -> Self {
        Self
    }
}

impl<M: StateManager> RolloutPolicy<M> for RandomRollout {
    fn select_next(
        &self,
        manager: &M,
        state: &M::State,
        rng: &mut ChaCha20Rng,
    ) -> Result<M::State, SearchError> {
        let mut successors = manager.successor_states(state);
        if successors.is_empty() {
            return Err(SearchError::SuccessorContract);
        }
        let pick = rng.gen_range(0..successors.len());
        Ok(successors.swap_remove(pick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Edge;
    use rand::SeedableRng;

    fn seed_edge(tree: &mut SearchTree<u32>, parent: NodeId, child: NodeId, edge: Edge) {
        // direct poke at edge statistics for policy tests
        let slot = tree
            .get_mut(parent)
            .children
            .iter_mut()
            .find(|(id, _)| *id == child)
            .unwrap();
        slot.1 = edge;
    }

    #[test]
    fn test_uct_bonus_zero_visits() {
        assert_eq!(uct_bonus(1.0, 0, 0), 0.0);
        assert!(uct_bonus(1.0, 2, 0) > 0.0);
    }

    #[test]
    fn test_uct_bonus_decreases_with_traversals() {
        let fresh = uct_bonus(1.0, 16, 0);
        let worn = uct_bonus(1.0, 16, 10);
        assert!(fresh > worn);
    }

    #[test]
    fn test_player_zero_maximizes() {
        let mut tree: SearchTree<u32> = SearchTree::new(0, 0);
        let root = tree.root();
        let low = tree.attach_child(root, 1);
        let high = tree.attach_child(root, 2);
        seed_edge(
            &mut tree,
            root,
            low,
            Edge {
                traversals: 5,
                value_sum: -2.5,
                mean_value: -0.5,
            },
        );
        seed_edge(
            &mut tree,
            root,
            high,
            Edge {
                traversals: 5,
                value_sum: 2.5,
                mean_value: 0.5,
            },
        );
        tree.get_mut(tree.root()).visits = 10;

        let policy = UctPolicy::new(1.0);
        assert_eq!(policy.select_child(&tree, tree.root()).unwrap(), high);
    }

    #[test]
    fn test_player_one_minimizes() {
        let mut tree: SearchTree<u32> = SearchTree::new(0, 1);
        let root = tree.root();
        let low = tree.attach_child(root, 1);
        let high = tree.attach_child(root, 2);
        seed_edge(
            &mut tree,
            root,
            low,
            Edge {
                traversals: 5,
                value_sum: -2.5,
                mean_value: -0.5,
            },
        );
        seed_edge(
            &mut tree,
            root,
            high,
            Edge {
                traversals: 5,
                value_sum: 2.5,
                mean_value: 0.5,
            },
        );
        tree.get_mut(tree.root()).visits = 10;

        let policy = UctPolicy::new(1.0);
        assert_eq!(policy.select_child(&tree, tree.root()).unwrap(), low);
    }

    #[test]
    fn test_tie_breaks_to_first_inserted() {
        // identical statistics on every child, both player perspectives
        for player in [0u8, 1] {
            let mut tree: SearchTree<u32> = SearchTree::new(0, player);
            let first = tree.attach_child(tree.root(), 1);
            tree.attach_child(tree.root(), 2);
            tree.attach_child(tree.root(), 3);
            tree.get_mut(tree.root()).visits = 9;

            let policy = UctPolicy::new(1.0);
            for _ in 0..10 {
                assert_eq!(policy.select_child(&tree, tree.root()).unwrap(), first);
            }
        }
    }

    #[test]
    fn test_no_children_is_an_error() {
        let tree: SearchTree<u32> = SearchTree::new(0, 0);
        let policy = UctPolicy::new(1.0);
        assert!(matches!(
            policy.select_child(&tree, tree.root()),
            Err(SearchError::NoChildren(_))
        ));
    }

    #[test]
    fn test_out_of_range_player_is_an_error() {
        let mut tree: SearchTree<u32> = SearchTree::new(0, 2);
        let root = tree.root();
        tree.attach_child(root, 1);

        let policy = UctPolicy::new(1.0);
        assert!(matches!(
            policy.select_child(&tree, root),
            Err(SearchError::PlayerOutOfRange(2))
        ));
    }

    #[test]
    fn test_exploration_pulls_toward_untried_child() {
        // a heavily traversed strong child vs an untried one: with a large
        // exploration constant the untried child must eventually win out
        let mut tree: SearchTree<u32> = SearchTree::new(0, 0);
        let root = tree.root();
        let strong = tree.attach_child(root, 1);
        let untried = tree.attach_child(root, 2);
        seed_edge(
            &mut tree,
            root,
            strong,
            Edge {
                traversals: 100,
                value_sum: 60.0,
                mean_value: 0.6,
            },
        );
        tree.get_mut(tree.root()).visits = 100;

        let greedy = UctPolicy::new(0.0);
        assert_eq!(greedy.select_child(&tree, tree.root()).unwrap(), strong);

        let curious = UctPolicy::new(2.0);
        assert_eq!(curious.select_child(&tree, tree.root()).unwrap(), untried);
    }

    #[test]
    fn test_random_rollout_uses_manager_successors() {
        use games_nim::{NimConfig, NimStateManager};

        let manager = NimStateManager::new(NimConfig {
            initial_stones: 5,
            max_remove: 3,
            starting_player: 0,
        });
        let policy = RandomRollout::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let state = manager.initial_state();
        for _ in 0..20 {
            let next = policy.select_next(&manager, &state, &mut rng).unwrap();
            let removed = state.stones - next.stones;
            assert!((1..=3).contains(&removed));
        }
    }

    #[test]
    fn test_random_rollout_rejects_empty_successors() {
        /// Non-terminal states with no successors break the manager contract.
        #[derive(Debug)]
        struct Stuck;

        impl StateManager for Stuck {
            type State = u8;

            fn initial_state(&self) -> u8 {
                0
            }

            fn successor_states(&self, _state: &u8) -> Vec<u8> {
                Vec::new()
            }

            fn is_terminal(&self, _state: &u8) -> bool {
                false
            }

            fn winner(&self, _state: &u8) -> Option<u8> {
                None
            }

            fn describe_transition(&self, _state: &u8, _previous: Option<&u8>) -> String {
                String::new()
            }
        }

        let policy = RandomRollout::new();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        assert!(matches!(
            policy.select_next(&Stuck, &0, &mut rng),
            Err(SearchError::SuccessorContract)
        ));
    }
}
