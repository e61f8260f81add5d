//! Core game abstraction for the Treeline search engine
//!
//! The search core never knows the rules of a concrete game. It consumes a
//! [`StateManager`], which answers exactly the questions the four MCTS phases
//! need: what is the initial position, what positions follow a given one, is a
//! position terminal, and who won a terminal position. Everything else (move
//! formatting, board printing) is presentation and lives behind
//! [`StateManager::describe_transition`].
//!
//! Players are identified by `0` and `1`. Turns alternate strictly, which is
//! why [`other_player`] is the only player arithmetic the engine ever does.

use std::fmt::Debug;

/// The opponent of `player` in a two-player game.
#[inline]
pub fn other_player(player: u8) -> u8 {
    (player + 1) % 2
}

/// Capability exposed by a concrete game to the search core.
///
/// Contract: `successor_states` returns an empty vector exactly when
/// `is_terminal` is true. The search core depends on this for its
/// selection/expansion reasoning and fails fatally when it is broken.
pub trait StateManager {
    /// Opaque game position. Cloned when a committed move starts a fresh
    /// tree generation, so it should be cheap to copy.
    type State: Clone + Debug;

    /// The position the real game starts from.
    fn initial_state(&self) -> Self::State;

    /// All positions reachable in one move, in a deterministic order.
    /// The order is significant: the search breaks ties by it.
    fn successor_states(&self, state: &Self::State) -> Vec<Self::State>;

    /// Whether the game is over in `state`.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// The winning player of a terminal `state`, `None` otherwise.
    /// Only meaningful when `is_terminal(state)` is true.
    fn winner(&self, state: &Self::State) -> Option<u8>;

    /// Human-readable description of arriving at `state` from `previous`
    /// (`None` for the initial position). Presentation only; the search
    /// never calls this.
    fn describe_transition(&self, state: &Self::State, previous: Option<&Self::State>) -> String;
}
