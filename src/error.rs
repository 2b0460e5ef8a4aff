//! The error taxonomy (§7): tagged kinds with stable, host-keyable
//! messages. Every failure is recovered locally — `apply` returns the
//! error and the prior state is untouched. Internal invariant violations
//! (conservation, bank cap) are not represented here; they panic, per §7.

use thiserror::Error;

use crate::piece::{Color, PieceId, Player};
use crate::system::SystemId;

fn capitalize(color: Color) -> String {
    let s = color.to_string();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => s,
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game has already ended")]
    GameEnded,

    #[error("wrong phase for this action")]
    WrongPhase,

    #[error("not your turn")]
    NotYourTurn { expected: Player, actual: Player },

    #[error("piece {0} not found in bank")]
    PieceNotInBank(PieceId),

    #[error("ship {0} not found")]
    ShipNotFound(PieceId),

    #[error("system {0} not found")]
    SystemNotFound(SystemId),

    #[error("ship {ship} is not owned by {actual}")]
    WrongOwner { ship: PieceId, actual: Player },

    #[error("{} ({ability}) action not available", capitalize(*color))]
    ColorUnavailable { color: Color, ability: &'static str },

    #[error("origin and destination have different sizes in common: move rejected")]
    MoveSizeConflict,

    #[error("move destination ambiguous: specify exactly one of to_system or new_star_piece_id")]
    MoveDestinationAmbiguous,

    #[error("Cannot capture your own ship")]
    CaptureOwnShip,

    #[error("attacker is smaller than target: capture size too small")]
    CaptureSizeTooSmall,

    #[error("new ship must share the same color as acting ship")]
    GrowWrongColor,

    #[error("grow piece is not the smallest available size of its color in the bank")]
    GrowNotSmallest,

    #[error("trade piece must have a different color than the ship being traded")]
    TradeSameColor,

    #[error("trade piece must be the same size as the ship being traded")]
    TradeSizeMismatch,

    #[error("sacrifice followup must be of the color's keyed action kind, got {got}")]
    SacrificeFollowupColorMismatch { got: &'static str },

    #[error("sacrifice followup count must equal sacrificed ship size (expected {expected}, got {got})")]
    SacrificeFollowupCountMismatch { expected: u8, got: u8 },

    #[error("a sacrifice that ends the game must have zero followup actions")]
    SacrificeTerminalFollowupsPresent,

    #[error("no overpopulation of {0} present at that system")]
    OverpopulationNotPresent(Color),
}

impl GameError {
    pub fn color_unavailable(color: Color) -> Self {
        let ability = match color.ability() {
            crate::piece::Ability::Move => "move",
            crate::piece::Ability::Grow => "grow",
            crate::piece::Ability::Trade => "trade",
            crate::piece::Ability::Capture => "capture",
        };
        GameError::ColorUnavailable { color, ability }
    }
}
