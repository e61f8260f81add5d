//! Episode and batch drivers.
//!
//! An episode plays one real game move by move. For each real move the
//! driver runs a configured number of simulation cycles rooted at the
//! current real position, commits the robust child (highest edge traversal
//! count), snapshots the finished tree for diagnostics, and re-roots into a
//! fresh single-node tree so only one tree generation is ever alive.
//!
//! A batch repeats whole episodes and aggregates player-0 win statistics.

use game_core::StateManager;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info};

use crate::config::{ConfigError, SearchConfig};
use crate::policy::{RandomRollout, RolloutPolicy, TreePolicy, UctPolicy};
use crate::search::{run_simulation, SearchError};
use crate::tree::{SearchTree, TreeStats};

/// Diagnostics snapshot of one finished tree generation, captured right
/// before the generation is discarded by a committed move.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// Tree statistics at commit time
    pub stats: TreeStats,

    /// Insertion index of the committed child among the root's children
    pub chosen: usize,
}

/// One finished episode.
#[derive(Debug, Clone)]
pub struct EpisodeRecord<S> {
    /// Every real position the game passed through, initial state first
    pub history: Vec<S>,

    /// One snapshot per committed move
    pub snapshots: Vec<TreeSnapshot>,

    /// Winner of the final position
    pub winner: Option<u8>,
}

/// One finished batch.
#[derive(Debug, Clone)]
pub struct BatchRecord<S> {
    pub episodes: Vec<EpisodeRecord<S>>,

    /// Fraction of episodes won by player 0
    pub player_zero_win_rate: f64,
}

/// Plays real games using repeated tree search.
pub struct EpisodeDriver<'a, M: StateManager> {
    manager: &'a M,
    config: SearchConfig,
    tree_policy: Box<dyn TreePolicy<M::State> + 'a>,
    rollout_policy: Box<dyn RolloutPolicy<M> + 'a>,
}

impl<'a, M: StateManager> EpisodeDriver<'a, M> {
    /// Create a driver with the default policies: UCT selection with the
    /// configured exploration constant, uniform-random rollouts.
    pub fn new(manager: &'a M, config: SearchConfig) -> Result<Self, ConfigError> {
        let exploration = config.exploration_constant;
        Self::with_policies(
            manager,
            config,
            Box::new(UctPolicy::new(exploration)),
            Box::new(RandomRollout::new()),
        )
    }

    /// Create a driver with custom policies.
    pub fn with_policies(
        manager: &'a M,
        config: SearchConfig,
        tree_policy: Box<dyn TreePolicy<M::State> + 'a>,
        rollout_policy: Box<dyn RolloutPolicy<M> + 'a>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            manager,
            config,
            tree_policy,
            rollout_policy,
        })
    }

    /// Play one full episode.
    pub fn run_episode(
        &self,
        rng: &mut ChaCha20Rng,
    ) -> Result<EpisodeRecord<M::State>, SearchError> {
        let starting_player = self.config.starting_player.resolve(rng);
        let mut tree = SearchTree::new(self.manager.initial_state(), starting_player);
        let mut history = Vec::new();
        let mut snapshots = Vec::new();

        loop {
            // AwaitingMove
            let root = tree.root();
            history.push(tree.get(root).state.clone());
            if self.manager.is_terminal(&tree.get(root).state) {
                break;
            }

            // RunningSimulations
            for _ in 0..self.config.simulations_per_move {
                run_simulation(
                    &mut tree,
                    self.manager,
                    root,
                    self.tree_policy.as_ref(),
                    self.rollout_policy.as_ref(),
                    rng,
                )?;
            }

            // MoveCommitted: the robust child becomes the next real position
            let chosen = tree
                .most_traversed_child(root)
                .ok_or(SearchError::NoChildren(root.0))?;
            let chosen_index = tree
                .children_of(root)
                .position(|c| c == chosen)
                .unwrap_or_default();

            debug!(
                move_number = history.len(),
                chosen_index,
                traversals = tree.edge_to(root, chosen)?.traversals,
                nodes = tree.len(),
                "move committed"
            );

            // snapshot before the generation is discarded
            snapshots.push(TreeSnapshot {
                stats: tree.stats(),
                chosen: chosen_index,
            });
            tree = tree.detach_as_new_root(chosen);
        }

        let winner = history.last().and_then(|state| self.manager.winner(state));
        info!(moves = history.len() - 1, ?winner, "episode finished");

        Ok(EpisodeRecord {
            history,
            snapshots,
            winner,
        })
    }

    /// Play a whole batch of episodes and aggregate the outcome.
    pub fn run_batch(&self, rng: &mut ChaCha20Rng) -> Result<BatchRecord<M::State>, SearchError> {
        let total = self.config.episodes_per_batch;
        let mut episodes = Vec::with_capacity(total as usize);

        for episode in 0..total {
            debug!(episode, "starting episode");
            episodes.push(self.run_episode(rng)?);
        }

        let player_zero_wins = episodes
            .iter()
            .filter(|episode| episode.winner == Some(0))
            .count();
        let player_zero_win_rate = player_zero_wins as f64 / total as f64;

        info!(
            wins = player_zero_wins,
            total, player_zero_win_rate, "batch finished"
        );

        Ok(BatchRecord {
            episodes,
            player_zero_win_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StartingPlayer;
    use games_nim::{NimConfig, NimStateManager};
    use rand::SeedableRng;

    /// Manager whose initial state is already terminal, won by player 0.
    #[derive(Debug)]
    struct InstantWin;

    impl StateManager for InstantWin {
        type State = u8;

        fn initial_state(&self) -> u8 {
            0
        }

        fn successor_states(&self, _state: &u8) -> Vec<u8> {
            Vec::new()
        }

        fn is_terminal(&self, _state: &u8) -> bool {
            true
        }

        fn winner(&self, _state: &u8) -> Option<u8> {
            Some(0)
        }

        fn describe_transition(&self, _state: &u8, _previous: Option<&u8>) -> String {
            String::new()
        }
    }

    /// One forced move into a terminal state won by `winner`.
    #[derive(Debug)]
    struct OneMove {
        winner: u8,
    }

    impl StateManager for OneMove {
        type State = u8; // 0 = start, 1 = done

        fn initial_state(&self) -> u8 {
            0
        }

        fn successor_states(&self, state: &u8) -> Vec<u8> {
            if *state == 0 {
                vec![1]
            } else {
                Vec::new()
            }
        }

        fn is_terminal(&self, state: &u8) -> bool {
            *state == 1
        }

        fn winner(&self, state: &u8) -> Option<u8> {
            (*state == 1).then_some(self.winner)
        }

        fn describe_transition(&self, _state: &u8, _previous: Option<&u8>) -> String {
            String::new()
        }
    }

    #[test]
    fn test_terminal_short_circuit() {
        let manager = InstantWin;
        let driver = EpisodeDriver::new(&manager, SearchConfig::for_testing()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let record = driver.run_episode(&mut rng).unwrap();
        assert_eq!(record.history.len(), 1);
        assert!(record.snapshots.is_empty());
        assert_eq!(record.winner, Some(0));
    }

    #[test]
    fn test_batch_aggregation_all_player_zero_wins() {
        let manager = OneMove { winner: 0 };
        let config = SearchConfig::for_testing().with_episodes(10);
        let driver = EpisodeDriver::new(&manager, config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let batch = driver.run_batch(&mut rng).unwrap();
        assert_eq!(batch.episodes.len(), 10);
        assert_eq!(batch.player_zero_win_rate, 1.0);
    }

    #[test]
    fn test_batch_aggregation_all_player_one_wins() {
        let manager = OneMove { winner: 1 };
        let config = SearchConfig::for_testing().with_episodes(4);
        let driver = EpisodeDriver::new(&manager, config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let batch = driver.run_batch(&mut rng).unwrap();
        assert_eq!(batch.player_zero_win_rate, 0.0);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_any_simulation() {
        let manager = InstantWin;
        let config = SearchConfig::default().with_simulations(0);
        assert!(EpisodeDriver::new(&manager, config).is_err());
    }

    #[test]
    fn test_nim_base_case_single_stone() {
        // 1 stone, removing up to 3, player 0 to move: the unique legal move
        // takes the last stone and wins for player 0, with any simulation count
        let manager = NimStateManager::new(NimConfig {
            initial_stones: 1,
            max_remove: 3,
            starting_player: 0,
        });
        let config = SearchConfig::default()
            .with_simulations(1)
            .with_starting_player(StartingPlayer::Fixed(0));
        let driver = EpisodeDriver::new(&manager, config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let record = driver.run_episode(&mut rng).unwrap();
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.history[1].stones, 0);
        assert_eq!(record.winner, Some(0));
    }

    #[test]
    fn test_episode_history_is_a_legal_line_of_play() {
        let manager = NimStateManager::new(NimConfig {
            initial_stones: 10,
            max_remove: 3,
            starting_player: 0,
        });
        let driver = EpisodeDriver::new(&manager, SearchConfig::for_testing()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let record = driver.run_episode(&mut rng).unwrap();

        for pair in record.history.windows(2) {
            let removed = pair[0].stones - pair[1].stones;
            assert!((1..=3).contains(&removed));
        }
        assert!(manager.is_terminal(record.history.last().unwrap()));
        assert!(record.winner.is_some());

        // one snapshot per committed move
        assert_eq!(record.snapshots.len(), record.history.len() - 1);
        for snapshot in &record.snapshots {
            assert!(snapshot.chosen < snapshot.stats.root_edges.len());
            let total: u32 = snapshot.stats.root_edges.iter().map(|e| e.traversals).sum();
            assert_eq!(total, driver.config.simulations_per_move);
        }
    }

    #[test]
    fn test_search_prefers_winning_nim_move() {
        // 3 stones, max remove 3: taking all three stones wins immediately,
        // and enough simulations must find that line
        let manager = NimStateManager::new(NimConfig {
            initial_stones: 3,
            max_remove: 3,
            starting_player: 0,
        });
        let config = SearchConfig::default().with_simulations(400);
        let driver = EpisodeDriver::new(&manager, config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(42);

        let record = driver.run_episode(&mut rng).unwrap();
        assert_eq!(record.history[1].stones, 0, "should take all three stones");
        assert_eq!(record.winner, Some(0));
    }

    #[test]
    fn test_random_starting_player_is_reproducible() {
        let manager = NimStateManager::new(NimConfig {
            initial_stones: 6,
            max_remove: 3,
            starting_player: 0,
        });
        let config = SearchConfig::for_testing().with_starting_player(StartingPlayer::Random);

        let run = || {
            let driver = EpisodeDriver::new(&manager, config.clone()).unwrap();
            let mut rng = ChaCha20Rng::seed_from_u64(11);
            let record = driver.run_episode(&mut rng).unwrap();
            (record.history.len(), record.winner)
        };
        assert_eq!(run(), run());
    }
}
