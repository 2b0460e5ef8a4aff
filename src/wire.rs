//! JSON wire schema (§6). The host speaks this shape — opaque
//! `to_system_id?` / `new_star_piece_id?` pairs on Move, piece ids as
//! canonical strings — and we convert it into the internal, ambiguity-free
//! `Action` type at the boundary.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, MoveDestination, SetupRole};
use crate::error::GameError;
use crate::piece::{Color, PieceId, PieceIdParseError, Player};
use crate::system::SystemId;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error(transparent)]
    InvalidPiece(#[from] PieceIdParseError),
    #[error(transparent)]
    Game(#[from] GameError),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireSetupRole {
    Star1,
    Star2,
    Ship,
}

impl From<WireSetupRole> for SetupRole {
    fn from(role: WireSetupRole) -> Self {
        match role {
            WireSetupRole::Star1 => SetupRole::Star1,
            WireSetupRole::Star2 => SetupRole::Star2,
            WireSetupRole::Ship => SetupRole::Ship,
        }
    }
}

impl From<SetupRole> for WireSetupRole {
    fn from(role: SetupRole) -> Self {
        match role {
            SetupRole::Star1 => WireSetupRole::Star1,
            SetupRole::Star2 => WireSetupRole::Star2,
            SetupRole::Ship => WireSetupRole::Ship,
        }
    }
}

fn move_destination_from_wire(
    to_system_id: Option<SystemId>,
    new_star_piece_id: Option<String>,
) -> Result<MoveDestination, WireError> {
    match (to_system_id, new_star_piece_id) {
        (Some(to), None) => Ok(MoveDestination::ExistingSystem(to)),
        (None, Some(piece)) => Ok(MoveDestination::NewSystem {
            new_star_piece_id: piece.parse::<PieceId>()?,
        }),
        _ => Err(WireError::Game(GameError::MoveDestinationAmbiguous)),
    }
}

fn move_destination_to_wire(destination: &MoveDestination) -> (Option<SystemId>, Option<String>) {
    match destination {
        MoveDestination::ExistingSystem(id) => (Some(id.clone()), None),
        MoveDestination::NewSystem { new_star_piece_id } => {
            (None, Some(new_star_piece_id.to_string()))
        }
    }
}

/// A followup nested inside a `sacrifice` action's `followup_actions` array;
/// the same shapes as the top-level actions, minus `player`/`timestamp`
/// (implicit from the enclosing Sacrifice).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireFollowup {
    Move {
        ship_id: String,
        from_system_id: SystemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_system_id: Option<SystemId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_star_piece_id: Option<String>,
    },
    Capture {
        attacking_ship_id: String,
        target_ship_id: String,
        system_id: SystemId,
    },
    Grow {
        acting_ship_id: String,
        system_id: SystemId,
        new_ship_piece_id: String,
    },
    Trade {
        ship_id: String,
        system_id: SystemId,
        new_piece_id: String,
    },
}

impl TryFrom<WireFollowup> for ActionKind {
    type Error = WireError;

    fn try_from(wire: WireFollowup) -> Result<Self, Self::Error> {
        Ok(match wire {
            WireFollowup::Move {
                ship_id,
                from_system_id,
                to_system_id,
                new_star_piece_id,
            } => ActionKind::Move {
                ship_id: ship_id.parse()?,
                from_system: from_system_id,
                destination: move_destination_from_wire(to_system_id, new_star_piece_id)?,
            },
            WireFollowup::Capture {
                attacking_ship_id,
                target_ship_id,
                system_id,
            } => ActionKind::Capture {
                attacker_id: attacking_ship_id.parse()?,
                target_id: target_ship_id.parse()?,
                system: system_id,
            },
            WireFollowup::Grow {
                acting_ship_id,
                system_id,
                new_ship_piece_id,
            } => ActionKind::Grow {
                acting_ship_id: acting_ship_id.parse()?,
                system: system_id,
                new_ship_piece_id: new_ship_piece_id.parse()?,
            },
            WireFollowup::Trade {
                ship_id,
                system_id,
                new_piece_id,
            } => ActionKind::Trade {
                ship_id: ship_id.parse()?,
                system: system_id,
                new_piece_id: new_piece_id.parse()?,
            },
        })
    }
}

impl From<&ActionKind> for WireFollowup {
    fn from(kind: &ActionKind) -> Self {
        match kind {
            ActionKind::Move {
                ship_id,
                from_system,
                destination,
            } => {
                let (to_system_id, new_star_piece_id) = move_destination_to_wire(destination);
                WireFollowup::Move {
                    ship_id: ship_id.to_string(),
                    from_system_id: from_system.clone(),
                    to_system_id,
                    new_star_piece_id,
                }
            }
            ActionKind::Capture {
                attacker_id,
                target_id,
                system,
            } => WireFollowup::Capture {
                attacking_ship_id: attacker_id.to_string(),
                target_ship_id: target_id.to_string(),
                system_id: system.clone(),
            },
            ActionKind::Grow {
                acting_ship_id,
                system,
                new_ship_piece_id,
            } => WireFollowup::Grow {
                acting_ship_id: acting_ship_id.to_string(),
                system_id: system.clone(),
                new_ship_piece_id: new_ship_piece_id.to_string(),
            },
            ActionKind::Trade {
                ship_id,
                system,
                new_piece_id,
            } => WireFollowup::Trade {
                ship_id: ship_id.to_string(),
                system_id: system.clone(),
                new_piece_id: new_piece_id.to_string(),
            },
            other => unreachable!("a sacrifice followup can't itself be a {}", other.tag()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireAction {
    Setup {
        player: Player,
        timestamp: u64,
        piece_id: String,
        role: WireSetupRole,
    },
    Move {
        player: Player,
        timestamp: u64,
        ship_id: String,
        from_system_id: SystemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to_system_id: Option<SystemId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_star_piece_id: Option<String>,
    },
    Capture {
        player: Player,
        timestamp: u64,
        attacking_ship_id: String,
        target_ship_id: String,
        system_id: SystemId,
    },
    Grow {
        player: Player,
        timestamp: u64,
        acting_ship_id: String,
        system_id: SystemId,
        new_ship_piece_id: String,
    },
    Trade {
        player: Player,
        timestamp: u64,
        ship_id: String,
        system_id: SystemId,
        new_piece_id: String,
    },
    Sacrifice {
        player: Player,
        timestamp: u64,
        sacrificed_ship_id: String,
        system_id: SystemId,
        followup_actions: Vec<WireFollowup>,
    },
    Overpopulation {
        player: Player,
        timestamp: u64,
        system_id: SystemId,
        color: Color,
    },
}

impl TryFrom<WireAction> for Action {
    type Error = WireError;

    fn try_from(wire: WireAction) -> Result<Self, Self::Error> {
        let (player, timestamp, kind) = match wire {
            WireAction::Setup {
                player,
                timestamp,
                piece_id,
                role,
            } => (
                player,
                timestamp,
                ActionKind::Setup {
                    piece_id: piece_id.parse()?,
                    role: role.into(),
                },
            ),
            WireAction::Move {
                player,
                timestamp,
                ship_id,
                from_system_id,
                to_system_id,
                new_star_piece_id,
            } => (
                player,
                timestamp,
                ActionKind::Move {
                    ship_id: ship_id.parse()?,
                    from_system: from_system_id,
                    destination: move_destination_from_wire(to_system_id, new_star_piece_id)?,
                },
            ),
            WireAction::Capture {
                player,
                timestamp,
                attacking_ship_id,
                target_ship_id,
                system_id,
            } => (
                player,
                timestamp,
                ActionKind::Capture {
                    attacker_id: attacking_ship_id.parse()?,
                    target_id: target_ship_id.parse()?,
                    system: system_id,
                },
            ),
            WireAction::Grow {
                player,
                timestamp,
                acting_ship_id,
                system_id,
                new_ship_piece_id,
            } => (
                player,
                timestamp,
                ActionKind::Grow {
                    acting_ship_id: acting_ship_id.parse()?,
                    system: system_id,
                    new_ship_piece_id: new_ship_piece_id.parse()?,
                },
            ),
            WireAction::Trade {
                player,
                timestamp,
                ship_id,
                system_id,
                new_piece_id,
            } => (
                player,
                timestamp,
                ActionKind::Trade {
                    ship_id: ship_id.parse()?,
                    system: system_id,
                    new_piece_id: new_piece_id.parse()?,
                },
            ),
            WireAction::Sacrifice {
                player,
                timestamp,
                sacrificed_ship_id,
                system_id,
                followup_actions,
            } => {
                let followups = followup_actions
                    .into_iter()
                    .map(ActionKind::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                (
                    player,
                    timestamp,
                    ActionKind::Sacrifice {
                        sacrificed_ship_id: sacrificed_ship_id.parse()?,
                        system: system_id,
                        followups,
                    },
                )
            }
            WireAction::Overpopulation {
                player,
                timestamp,
                system_id,
                color,
            } => (
                player,
                timestamp,
                ActionKind::Overpopulation {
                    system: system_id,
                    color,
                },
            ),
        };
        Ok(Action::new(player, timestamp, kind))
    }
}

impl From<&Action> for WireAction {
    fn from(action: &Action) -> Self {
        let player = action.player;
        let timestamp = action.timestamp;
        match &action.kind {
            ActionKind::Setup { piece_id, role } => WireAction::Setup {
                player,
                timestamp,
                piece_id: piece_id.to_string(),
                role: (*role).into(),
            },
            ActionKind::Move {
                ship_id,
                from_system,
                destination,
            } => {
                let (to_system_id, new_star_piece_id) = move_destination_to_wire(destination);
                WireAction::Move {
                    player,
                    timestamp,
                    ship_id: ship_id.to_string(),
                    from_system_id: from_system.clone(),
                    to_system_id,
                    new_star_piece_id,
                }
            }
            ActionKind::Capture {
                attacker_id,
                target_id,
                system,
            } => WireAction::Capture {
                player,
                timestamp,
                attacking_ship_id: attacker_id.to_string(),
                target_ship_id: target_id.to_string(),
                system_id: system.clone(),
            },
            ActionKind::Grow {
                acting_ship_id,
                system,
                new_ship_piece_id,
            } => WireAction::Grow {
                player,
                timestamp,
                acting_ship_id: acting_ship_id.to_string(),
                system_id: system.clone(),
                new_ship_piece_id: new_ship_piece_id.to_string(),
            },
            ActionKind::Trade {
                ship_id,
                system,
                new_piece_id,
            } => WireAction::Trade {
                player,
                timestamp,
                ship_id: ship_id.to_string(),
                system_id: system.clone(),
                new_piece_id: new_piece_id.to_string(),
            },
            ActionKind::Sacrifice {
                sacrificed_ship_id,
                system,
                followups,
            } => WireAction::Sacrifice {
                player,
                timestamp,
                sacrificed_ship_id: sacrificed_ship_id.to_string(),
                system_id: system.clone(),
                followup_actions: followups.iter().map(WireFollowup::from).collect(),
            },
            ActionKind::Overpopulation { system, color } => WireAction::Overpopulation {
                player,
                timestamp,
                system_id: system.clone(),
                color: *color,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Size;

    #[test]
    fn move_requires_exactly_one_destination() {
        let err = move_destination_from_wire(None, None).unwrap_err();
        assert!(matches!(
            err,
            WireError::Game(GameError::MoveDestinationAmbiguous)
        ));
        let err =
            move_destination_from_wire(Some("system-1".into()), Some("red-1-0".into())).unwrap_err();
        assert!(matches!(
            err,
            WireError::Game(GameError::MoveDestinationAmbiguous)
        ));
    }

    #[test]
    fn action_round_trips_through_wire() {
        let action = Action::new(
            Player::P1,
            42,
            ActionKind::Grow {
                acting_ship_id: PieceId::new(Color::Green, Size::Small, 0),
                system: "system-1".into(),
                new_ship_piece_id: PieceId::new(Color::Green, Size::Medium, 0),
            },
        );
        let wire = WireAction::from(&action);
        let json = serde_json::to_string(&wire).unwrap();
        let parsed_wire: WireAction = serde_json::from_str(&json).unwrap();
        let round_tripped = Action::try_from(parsed_wire).unwrap();
        assert_eq!(round_tripped, action);
    }
}
