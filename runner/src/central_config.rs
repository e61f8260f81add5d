//! Configuration loading from config.toml.
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Command line arguments
//! 2. Environment variables (`TREELINE_<SECTION>_<KEY>`)
//! 3. config.toml file
//! 4. Built-in defaults

use std::path::PathBuf;

use games_ledge::LedgeConfig;
use games_nim::NimConfig;
use mcts::SearchConfig;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",    // Current directory
    "../config.toml", // Parent directory (when running from a member crate)
];

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub nim: NimConfig,
    #[serde(default)]
    pub ledge: LedgeConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Settings shared by every run
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

/// Which game to play
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    /// "nim" or "ledge"
    pub name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { name: "nim".into() }
    }
}

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by TREELINE_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("TREELINE_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from TREELINE_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "TREELINE_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, StartingPlayer, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: TREELINE_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "TREELINE_COMMON_LOG_LEVEL");

    // Game
    env_override!(config, game.name, "TREELINE_GAME_NAME");

    // Nim
    env_override!(
        config,
        nim.initial_stones,
        "TREELINE_NIM_INITIAL_STONES",
        parse
    );
    env_override!(config, nim.max_remove, "TREELINE_NIM_MAX_REMOVE", parse);
    env_override!(
        config,
        nim.starting_player,
        "TREELINE_NIM_STARTING_PLAYER",
        parse
    );

    // Ledge: the board is a comma separated cell list, e.g. "0,0,1,0,1,0,2"
    if let Ok(cells) = std::env::var("TREELINE_LEDGE_BOARD") {
        let parsed: Result<Vec<u8>, _> = cells.split(',').map(|c| c.trim().parse()).collect();
        match parsed {
            Ok(board) => config.ledge.board = board,
            Err(e) => warn!("Ignoring unparseable TREELINE_LEDGE_BOARD: {}", e),
        }
    }
    env_override!(
        config,
        ledge.starting_player,
        "TREELINE_LEDGE_STARTING_PLAYER",
        parse
    );

    // Search
    env_override!(
        config,
        search.simulations_per_move,
        "TREELINE_SEARCH_SIMULATIONS_PER_MOVE",
        parse
    );
    env_override!(
        config,
        search.exploration_constant,
        "TREELINE_SEARCH_EXPLORATION_CONSTANT",
        parse
    );
    env_override!(
        config,
        search.starting_player,
        "TREELINE_SEARCH_STARTING_PLAYER",
        parse
    );
    env_override!(
        config,
        search.episodes_per_batch,
        "TREELINE_SEARCH_EPISODES_PER_BATCH",
        parse
    );

    config
}
