//! Stone-pile subtraction game (a Nim variant).
//!
//! A pile starts with a configured number of stones. Players alternate
//! removing between one and `max_remove` stones; whoever takes the last
//! stone wins. Small enough to verify search behavior by hand, which is why
//! the engine's own tests lean on it.

use game_core::{other_player, StateManager};
use serde::Deserialize;

/// Game parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NimConfig {
    /// Stones on the pile at the start of the game
    pub initial_stones: u32,

    /// Most stones one move may remove
    pub max_remove: u32,

    /// Player who moves first
    pub starting_player: u8,
}

impl Default for NimConfig {
    fn default() -> Self {
        Self {
            initial_stones: 10,
            max_remove: 3,
            starting_player: 0,
        }
    }
}

/// One position of the pile game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NimState {
    /// Stones remaining on the pile
    pub stones: u32,

    /// The player who made the move leading here. In the initial state this
    /// is the non-starting player, so the starting player moves first.
    pub player: u8,

    /// Whether this is the pristine initial position
    pub initial: bool,
}

/// State manager for the pile game.
#[derive(Debug, Clone)]
pub struct NimStateManager {
    config: NimConfig,
}

impl NimStateManager {
    pub fn new(config: NimConfig) -> Self {
        Self { config }
    }
}

impl StateManager for NimStateManager {
    type State = NimState;

    fn initial_state(&self) -> NimState {
        NimState {
            stones: self.config.initial_stones,
            player: other_player(self.config.starting_player),
            initial: true,
        }
    }

    fn successor_states(&self, state: &NimState) -> Vec<NimState> {
        let takeable = state.stones.min(self.config.max_remove);
        (1..=takeable)
            .map(|removed| NimState {
                stones: state.stones - removed,
                player: other_player(state.player),
                initial: false,
            })
            .collect()
    }

    fn is_terminal(&self, state: &NimState) -> bool {
        state.stones == 0
    }

    fn winner(&self, state: &NimState) -> Option<u8> {
        // the player who emptied the pile wins
        self.is_terminal(state).then_some(state.player)
    }

    fn describe_transition(&self, state: &NimState, previous: Option<&NimState>) -> String {
        if state.initial {
            return format!("Start Pile: {} stones", state.stones);
        }

        let mut line = match previous {
            Some(previous) => format!(
                "Player {} selects {}: Remaining stones = {}",
                state.player,
                previous.stones - state.stones,
                state.stones
            ),
            None => format!("Remaining stones = {}", state.stones),
        };
        if self.is_terminal(state) {
            line.push_str(&format!("\nPlayer {} wins", state.player));
        }
        line
    }
}
