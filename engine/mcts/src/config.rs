//! Search configuration parameters.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors. All are surfaced by [`SearchConfig::validate`]
/// before any simulation starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("simulations_per_move must be positive")]
    ZeroSimulations,

    #[error("episodes_per_batch must be positive")]
    ZeroEpisodes,

    #[error("exploration_constant must be a positive finite number, got {0}")]
    InvalidExploration(f64),

    #[error("starting_player must be 0, 1 or \"random\", got {0}")]
    InvalidStartingPlayer(u8),
}

/// Who moves first in the real game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartingPlayer {
    Fixed(u8),
    Random,
}

impl StartingPlayer {
    /// Resolve to a concrete player, drawing from `rng` for `Random`.
    pub fn resolve(self, rng: &mut ChaCha20Rng) -> u8 {
        match self {
            StartingPlayer::Fixed(player) => player,
            StartingPlayer::Random => rng.gen_range(0..2),
        }
    }
}

impl fmt::Display for StartingPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartingPlayer::Fixed(player) => write!(f, "{player}"),
            StartingPlayer::Random => write!(f, "random"),
        }
    }
}

impl FromStr for StartingPlayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(StartingPlayer::Random),
            _ => s
                .parse::<u8>()
                .map(StartingPlayer::Fixed)
                .map_err(|_| format!("expected 0, 1 or \"random\", got {s:?}")),
        }
    }
}

// Accepts `0`, `1` or the string `"random"` in config files.
impl<'de> Deserialize<'de> for StartingPlayer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(u8),
            Keyword(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(player) => Ok(StartingPlayer::Fixed(player)),
            Repr::Keyword(word) if word == "random" => Ok(StartingPlayer::Random),
            Repr::Keyword(word) => Err(de::Error::custom(format!(
                "expected 0, 1 or \"random\", got {word:?}"
            ))),
        }
    }
}

/// Configuration for the episode and batch drivers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Simulation cycles run per real move
    pub simulations_per_move: u32,

    /// Exploration constant `c` in the UCT formula. Higher values
    /// explore more, lower values exploit known-good moves.
    pub exploration_constant: f64,

    /// Who moves first in each episode
    pub starting_player: StartingPlayer,

    /// Episodes run per batch
    pub episodes_per_batch: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            simulations_per_move: 100,
            exploration_constant: 1.0,
            starting_player: StartingPlayer::Fixed(0),
            episodes_per_batch: 10,
        }
    }
}

impl SearchConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            simulations_per_move: 25,
            episodes_per_batch: 3,
            ..Self::default()
        }
    }

    /// Builder pattern: set simulation cycles per move.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.simulations_per_move = n;
        self
    }

    /// Builder pattern: set the UCT exploration constant.
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Builder pattern: set the starting player.
    pub fn with_starting_player(mut self, player: StartingPlayer) -> Self {
        self.starting_player = player;
        self
    }

    /// Builder pattern: set episodes per batch.
    pub fn with_episodes(mut self, n: u32) -> Self {
        self.episodes_per_batch = n;
        self
    }

    /// Reject configurations the drivers cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulations_per_move == 0 {
            return Err(ConfigError::ZeroSimulations);
        }
        if self.episodes_per_batch == 0 {
            return Err(ConfigError::ZeroEpisodes);
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant <= 0.0 {
            return Err(ConfigError::InvalidExploration(self.exploration_constant));
        }
        if let StartingPlayer::Fixed(player) = self.starting_player {
            if player > 1 {
                return Err(ConfigError::InvalidStartingPlayer(player));
            }
        }
        Ok(())
    }
}
