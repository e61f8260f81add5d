//! Coin-ledge game.
//!
//! A row of cells holds copper coins, one gold coin, and empty slots. A move
//! either picks up the coin sitting on the ledge (cell 0) or slides any coin
//! left into an empty cell, without jumping over another coin. Whoever picks
//! up the gold coin wins.

use game_core::{other_player, StateManager};
use serde::Deserialize;

/// Empty cell marker.
pub const EMPTY: u8 = 0;
/// A copper coin.
pub const COPPER: u8 = 1;
/// The gold coin.
pub const GOLD: u8 = 2;

/// Game parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgeConfig {
    /// Initial board, cell 0 is the ledge. Cells hold [`EMPTY`], [`COPPER`]
    /// or [`GOLD`]; exactly one cell should hold the gold coin.
    pub board: Vec<u8>,

    /// Player who moves first
    pub starting_player: u8,
}

impl Default for LedgeConfig {
    fn default() -> Self {
        Self {
            board: vec![0, 0, 1, 0, 1, 0, 2],
            starting_player: 0,
        }
    }
}

/// One position of the ledge game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgeState {
    /// Whether this is the pristine initial position
    pub initial: bool,

    /// Current board
    pub board: Vec<u8>,

    /// Coin picked up by the move leading here, if any
    pub picked: Option<u8>,

    /// The player who made the move leading here. In the initial state this
    /// is the non-starting player, so the starting player moves first.
    pub player: u8,
}

/// State manager for the ledge game.
#[derive(Debug, Clone)]
pub struct LedgeStateManager {
    config: LedgeConfig,
}

impl LedgeStateManager {
    pub fn new(config: LedgeConfig) -> Self {
        Self { config }
    }
}

impl StateManager for LedgeStateManager {
    type State = LedgeState;

    fn initial_state(&self) -> LedgeState {
        LedgeState {
            initial: true,
            board: self.config.board.clone(),
            picked: None,
            player: other_player(self.config.starting_player),
        }
    }

    fn successor_states(&self, state: &LedgeState) -> Vec<LedgeState> {
        if self.is_terminal(state) {
            return Vec::new();
        }

        let mut successors = Vec::new();
        let next_player = other_player(state.player);

        // picking up the coin on the ledge
        if state.board[0] != EMPTY {
            let mut board = state.board.clone();
            let coin = std::mem::replace(&mut board[0], EMPTY);
            successors.push(LedgeState {
                initial: false,
                board,
                picked: Some(coin),
                player: next_player,
            });
        }

        // sliding coins left; targets scan right to left, stopping at the
        // previous coin so no coin ever jumps another
        let mut prev_coin: Option<usize> = None;
        for (index, &coin) in state.board.iter().enumerate() {
            if coin == EMPTY {
                continue;
            }
            let lower = prev_coin.map_or(0, |p| p + 1);
            for target in (lower..index).rev() {
                let mut board = state.board.clone();
                board[index] = EMPTY;
                board[target] = coin;
                successors.push(LedgeState {
                    initial: false,
                    board,
                    picked: None,
                    player: next_player,
                });
            }
            prev_coin = Some(index);
        }

        successors
    }

    fn is_terminal(&self, state: &LedgeState) -> bool {
        state.picked == Some(GOLD)
    }

    fn winner(&self, state: &LedgeState) -> Option<u8> {
        // whoever picked up the gold coin wins
        self.is_terminal(state).then_some(state.player)
    }

    fn describe_transition(&self, state: &LedgeState, previous: Option<&LedgeState>) -> String {
        if state.initial {
            return format!("Start Board: {:?}", state.board);
        }
        match state.picked {
            Some(GOLD) => {
                return format!(
                    "Player {} picks up gold: {:?}\nPlayer {} wins",
                    state.player, state.board, state.player
                );
            }
            Some(_) => {
                return format!(
                    "Player {} picks up copper: {:?}",
                    state.player, state.board
                );
            }
            None => {}
        }

        let Some(previous) = previous else {
            return format!("Player {}: {:?}", state.player, state.board);
        };

        // a coin was moved: the lower changed cell is the destination, the
        // higher one the source
        let mut destination = None;
        let mut source = None;
        let mut moved_coin = EMPTY;
        for (index, (&cell, &prev_cell)) in
            state.board.iter().zip(previous.board.iter()).enumerate()
        {
            if cell != prev_cell {
                if destination.is_none() {
                    destination = Some(index);
                    moved_coin = cell;
                } else {
                    source = Some(index);
                    break;
                }
            }
        }

        let coin_name = if moved_coin == GOLD { "gold" } else { "copper" };
        format!(
            "player {} moves {} from cell {} to {}: {:?}",
            state.player,
            coin_name,
            source.unwrap_or_default(),
            destination.unwrap_or_default(),
            state.board
        )
    }
}
