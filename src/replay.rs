//! The public façade (§4.7): `initial`, `apply`, `replay`, plus the JSON
//! wire-form helpers the host actually talks over the network.

use crate::action::Action;
use crate::error::GameError;
use crate::kernel;
use crate::state::GameState;

/// A fresh game, Setup phase, Player 1 to move first.
pub fn initial() -> GameState {
    GameState::new()
}

/// Applies one action to `state`, returning a new, independently-owned
/// state on success. `state` is never mutated — on error it is untouched
/// and the error is returned alone (§5 "Implementations must not mutate
/// inputs").
///
/// Atomicity for multi-step actions (Sacrifice) comes for free: the whole
/// kernel transition runs against a private clone, which is discarded
/// wholesale on any `Err`.
pub fn apply(state: &GameState, action: Action) -> Result<GameState, GameError> {
    let mut working = state.clone();
    kernel::apply_action(&mut working, &action)?;
    working.history.push(action);
    Ok(working)
}

/// Applies `actions` in order starting from `initial()`. Stops at the
/// first rejected action, reporting its index alongside the error.
pub fn replay(actions: Vec<Action>) -> Result<GameState, (usize, GameError)> {
    let mut state = initial();
    for (index, action) in actions.into_iter().enumerate() {
        state = apply(&state, action).map_err(|err| (index, err))?;
    }
    Ok(state)
}

impl GameState {
    /// Serializes to the JSON wire form (§6): `{phase, active_player,
    /// homeworlds, systems, bank, winner, history}`.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("GameState serialization is infallible")
    }

    /// Reconstructs a state from its wire form. The result is
    /// observationally equivalent to the state that produced it: equal
    /// outputs for every read-only projection.
    pub fn from_wire(value: serde_json::Value) -> Result<GameState, serde_json::Error> {
        serde_json::from_value(value)
    }
}
