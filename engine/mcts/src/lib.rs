//! UCT Monte Carlo Tree Search for two-player zero-sum games.
//!
//! This crate is game-agnostic: it works with any game implementing the
//! `game-core` [`StateManager`](game_core::StateManager) trait.
//!
//! # Overview
//!
//! Each simulation cycle runs four phases against the current tree:
//!
//! 1. **Selection**: Descend from the root with the tree policy (UCT by
//!    default) until reaching a childless node
//! 2. **Expansion**: Attach all successor positions of that leaf, unless
//!    the leaf is terminal
//! 3. **Rollout**: Play a uniformly random continuation from a fresh child
//!    (or the terminal leaf itself) to the end of the game
//! 4. **Backpropagation**: Fold the outcome, `+1` for a player-0 win and
//!    `-1` otherwise, into every edge on the path back to the root
//!
//! The episode driver repeats cycles for each real move, commits the most
//! traversed child, and re-roots the tree so that only one generation of
//! nodes is ever alive. The batch driver repeats episodes and reports the
//! player-0 win rate.
//!
//! # Usage
//!
//! ```rust
//! use mcts::{EpisodeDriver, SearchConfig};
//! use games_nim::{NimConfig, NimStateManager};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let manager = NimStateManager::new(NimConfig::default());
//! let driver = EpisodeDriver::new(&manager, SearchConfig::for_testing()).unwrap();
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let batch = driver.run_batch(&mut rng).unwrap();
//! println!("player 0 won {:.0}%", batch.player_zero_win_rate * 100.0);
//! ```
//!
//! Every randomized choice draws from the caller-supplied seeded RNG, so
//! whole batches are reproducible.

pub mod config;
pub mod episode;
pub mod node;
pub mod policy;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{ConfigError, SearchConfig, StartingPlayer};
pub use episode::{BatchRecord, EpisodeDriver, EpisodeRecord, TreeSnapshot};
pub use node::{Edge, Node, NodeId};
pub use policy::{RandomRollout, RolloutPolicy, TreePolicy, UctPolicy};
pub use search::{expand, rollout, rollout_evaluation, run_simulation, select_leaf, SearchError};
pub use tree::{SearchTree, TreeError, TreeStats};
