//! Command line configuration.
//!
//! Defaults come from config.toml (with TREELINE_* environment overrides);
//! CLI arguments take highest priority.

use anyhow::{anyhow, Result};
use clap::Parser;
use games_ledge::LedgeConfig;
use games_nim::NimConfig;
use mcts::{SearchConfig, StartingPlayer};
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;

use crate::central_config::{load_config, CentralConfig};

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_game() -> String {
    CENTRAL_CONFIG.game.name.clone()
}

fn default_episodes() -> u32 {
    CENTRAL_CONFIG.search.episodes_per_batch
}

fn default_simulations() -> u32 {
    CENTRAL_CONFIG.search.simulations_per_move
}

fn default_exploration() -> f64 {
    CENTRAL_CONFIG.search.exploration_constant
}

fn default_starting_player() -> StartingPlayer {
    CENTRAL_CONFIG.search.starting_player
}

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "treeline")]
#[command(about = "Treeline - Monte Carlo tree search batch runner")]
#[command(
    long_about = "Plays batches of two-player game episodes, choosing every move
with UCT Monte Carlo tree search, and reports the player 0 win rate.

Configuration is loaded from config.toml with environment variable overrides.
CLI arguments take highest priority."
)]
pub struct Config {
    /// Game to play (nim, ledge)
    #[arg(long, default_value_t = default_game())]
    pub game: String,

    /// Episodes to play in the batch
    #[arg(long, default_value_t = default_episodes())]
    pub episodes: u32,

    /// Simulation cycles per real move
    #[arg(long, default_value_t = default_simulations())]
    pub simulations: u32,

    /// UCT exploration constant
    #[arg(long, default_value_t = default_exploration())]
    pub exploration: f64,

    /// Who moves first: 0, 1 or "random"
    #[arg(long, default_value_t = default_starting_player())]
    pub starting_player: StartingPlayer,

    /// RNG seed for reproducible runs (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Suppress the per-episode move transcript
    #[arg(long)]
    pub quiet: bool,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.game.as_str(), "nim" | "ledge") {
            return Err(anyhow!(
                "unknown game '{}', expected one of nim, ledge",
                self.game
            ));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.search_config().validate()?;
        Ok(())
    }

    /// The search parameters this run was asked for.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_simulations(self.simulations)
            .with_exploration(self.exploration)
            .with_starting_player(self.starting_player)
            .with_episodes(self.episodes)
    }

    /// Nim parameters from config.toml, first move by `starting_player`.
    pub fn nim_config(&self, starting_player: u8) -> NimConfig {
        NimConfig {
            starting_player,
            ..CENTRAL_CONFIG.nim
        }
    }

    /// Ledge parameters from config.toml, first move by `starting_player`.
    pub fn ledge_config(&self, starting_player: u8) -> LedgeConfig {
        LedgeConfig {
            starting_player,
            ..CENTRAL_CONFIG.ledge.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            game: "nim".into(),
            episodes: 10,
            simulations: 100,
            exploration: 1.0,
            starting_player: StartingPlayer::Fixed(0),
            seed: Some(42),
            log_level: "info".into(),
            quiet: false,
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_game() {
        let mut cfg = base_config();
        cfg.game = "chess".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("unknown game"));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_zero_simulations() {
        let mut cfg = base_config();
        cfg.simulations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn search_config_carries_cli_values() {
        let mut cfg = base_config();
        cfg.simulations = 250;
        cfg.starting_player = StartingPlayer::Random;

        let search = cfg.search_config();
        assert_eq!(search.simulations_per_move, 250);
        assert_eq!(search.starting_player, StartingPlayer::Random);
        assert_eq!(search.episodes_per_batch, 10);
    }

    #[test]
    fn game_configs_take_the_resolved_starting_player() {
        let cfg = base_config();
        assert_eq!(cfg.nim_config(1).starting_player, 1);
        assert_eq!(cfg.ledge_config(1).starting_player, 1);
    }
}
