//! The discriminated action type. One variant per action kind; both the
//! validator and the kernel match on this exhaustively. Deliberately not
//! polymorphic dispatch — the point is to keep every action's fields typed.

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Player, PieceId};
use crate::system::SystemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupRole {
    Star1,
    Star2,
    Ship,
}

/// One action submitted to `apply`. `timestamp` is host-assigned and opaque
/// to the engine beyond audit-log persistence (§6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub player: Player,
    pub timestamp: u64,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(player: Player, timestamp: u64, kind: ActionKind) -> Self {
        Self {
            player,
            timestamp,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Setup {
        piece_id: PieceId,
        role: SetupRole,
    },
    Move {
        ship_id: PieceId,
        from_system: SystemId,
        destination: MoveDestination,
    },
    Capture {
        attacker_id: PieceId,
        target_id: PieceId,
        system: SystemId,
    },
    Grow {
        acting_ship_id: PieceId,
        system: SystemId,
        new_ship_piece_id: PieceId,
    },
    Trade {
        ship_id: PieceId,
        system: SystemId,
        new_piece_id: PieceId,
    },
    Sacrifice {
        sacrificed_ship_id: PieceId,
        system: SystemId,
        followups: Vec<ActionKind>,
    },
    Overpopulation {
        system: SystemId,
        color: Color,
    },
}

/// A Move targets either an existing system or establishes a new one
/// around a bank piece; never both, never neither (§4.5.2,
/// `MoveDestinationAmbiguous`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveDestination {
    ExistingSystem(SystemId),
    NewSystem { new_star_piece_id: PieceId },
}

impl ActionKind {
    /// Short machine-stable tag, used for error messages and for the
    /// Sacrifice-followup color constraint check (§4.5.6).
    pub fn tag(&self) -> &'static str {
        match self {
            ActionKind::Setup { .. } => "setup",
            ActionKind::Move { .. } => "move",
            ActionKind::Capture { .. } => "capture",
            ActionKind::Grow { .. } => "grow",
            ActionKind::Trade { .. } => "trade",
            ActionKind::Sacrifice { .. } => "sacrifice",
            ActionKind::Overpopulation { .. } => "overpopulation",
        }
    }

    /// Whether this action advances the turn once applied (§4.6). Only
    /// Overpopulation skips turn advancement.
    pub fn advances_turn(&self) -> bool {
        !matches!(self, ActionKind::Overpopulation { .. })
    }
}
