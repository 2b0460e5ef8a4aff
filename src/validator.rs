//! ActionValidator: legality checks for every action kind. Pure — takes
//! `&GameState`, never mutates, and is safe to call against an
//! intermediate state produced mid-sacrifice (§4.5.6).

use crate::action::{Action, ActionKind, MoveDestination, SetupRole};
use crate::error::GameError;
use crate::piece::{Ability, Color, Player, PieceId};
use crate::state::{GamePhase, GameState};

/// Gate rules applied before any per-kind validation (§4.5 preamble).
pub(crate) fn validate_gates(state: &GameState, action: &Action) -> Result<(), GameError> {
    if state.is_ended() {
        return Err(GameError::GameEnded);
    }

    let is_overpopulation = matches!(action.kind, ActionKind::Overpopulation { .. });
    if !is_overpopulation && action.player != state.active_player {
        return Err(GameError::NotYourTurn {
            expected: state.active_player,
            actual: action.player,
        });
    }

    match (&state.phase, &action.kind) {
        (GamePhase::Setup(_), ActionKind::Setup { .. }) => {}
        (GamePhase::Normal, ActionKind::Setup { .. }) => return Err(GameError::WrongPhase),
        (GamePhase::Setup(_), _) => return Err(GameError::WrongPhase),
        (GamePhase::Normal, _) => {}
        (GamePhase::Ended, _) => unreachable!("handled above"),
    }

    Ok(())
}

/// §4.5.1 Setup.
pub(crate) fn validate_setup(
    state: &GameState,
    player: Player,
    piece_id: PieceId,
    role: SetupRole,
) -> Result<(), GameError> {
    if !state.bank.contains(piece_id) {
        return Err(GameError::PieceNotInBank(piece_id));
    }
    let GamePhase::Setup(progress) = &state.phase else {
        return Err(GameError::WrongPhase);
    };
    match progress.current() {
        Some((expected_player, expected_role)) if expected_player == player && expected_role == role => {
            Ok(())
        }
        _ => Err(GameError::WrongPhase),
    }
}

fn ability_label(ability: Ability) -> &'static str {
    match ability {
        Ability::Move => "move",
        Ability::Grow => "grow",
        Ability::Trade => "trade",
        Ability::Capture => "capture",
    }
}

fn require_available(
    state: &GameState,
    system_id: &str,
    player: Player,
    color: Color,
    skip_availability: bool,
) -> Result<(), GameError> {
    if skip_availability {
        return Ok(());
    }
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    if system.color_available_for(player, color) {
        Ok(())
    } else {
        Err(GameError::ColorUnavailable {
            color,
            ability: ability_label(color.ability()),
        })
    }
}

/// §4.5.2 Move (yellow). `skip_availability` implements the sacrifice
/// relaxation (§4.5.6) — only ever `true` for a Move followup inside a
/// yellow sacrifice.
pub(crate) fn validate_move(
    state: &GameState,
    player: Player,
    ship_id: PieceId,
    from_system: &str,
    destination: &MoveDestination,
    skip_availability: bool,
) -> Result<(), GameError> {
    let origin = state
        .system(from_system)
        .ok_or_else(|| GameError::SystemNotFound(from_system.to_string()))?;
    let ship = origin
        .find_ship(ship_id)
        .ok_or(GameError::ShipNotFound(ship_id))?;
    if ship.owner != player {
        return Err(GameError::WrongOwner {
            ship: ship_id,
            actual: ship.owner,
        });
    }

    require_available(state, from_system, player, Color::Yellow, skip_availability)?;

    let origin_sizes = origin.star_sizes();
    let dest_sizes = match destination {
        MoveDestination::ExistingSystem(to_id) => {
            let dest = state
                .system(to_id)
                .ok_or_else(|| GameError::SystemNotFound(to_id.clone()))?;
            dest.star_sizes()
        }
        MoveDestination::NewSystem { new_star_piece_id } => {
            if !state.bank.contains(*new_star_piece_id) {
                return Err(GameError::PieceNotInBank(*new_star_piece_id));
            }
            std::iter::once(new_star_piece_id.size).collect()
        }
    };

    if !origin_sizes.is_disjoint(&dest_sizes) {
        return Err(GameError::MoveSizeConflict);
    }

    Ok(())
}

/// §4.5.3 Capture (red).
pub(crate) fn validate_capture(
    state: &GameState,
    player: Player,
    attacker_id: PieceId,
    target_id: PieceId,
    system_id: &str,
    skip_availability: bool,
) -> Result<(), GameError> {
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    let attacker = system
        .find_ship(attacker_id)
        .ok_or(GameError::ShipNotFound(attacker_id))?;
    let target = system
        .find_ship(target_id)
        .ok_or(GameError::ShipNotFound(target_id))?;

    if attacker.owner != player {
        return Err(GameError::WrongOwner {
            ship: attacker_id,
            actual: attacker.owner,
        });
    }
    if target.owner == player {
        return Err(GameError::CaptureOwnShip);
    }
    if attacker.size() < target.size() {
        return Err(GameError::CaptureSizeTooSmall);
    }

    require_available(state, system_id, player, Color::Red, skip_availability)
}

/// §4.5.4 Grow (green).
pub(crate) fn validate_grow(
    state: &GameState,
    player: Player,
    acting_ship_id: PieceId,
    system_id: &str,
    new_ship_piece_id: PieceId,
    skip_availability: bool,
) -> Result<(), GameError> {
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    let acting = system
        .find_ship(acting_ship_id)
        .ok_or(GameError::ShipNotFound(acting_ship_id))?;
    if acting.owner != player {
        return Err(GameError::WrongOwner {
            ship: acting_ship_id,
            actual: acting.owner,
        });
    }

    require_available(state, system_id, player, Color::Green, skip_availability)?;

    if !state.bank.contains(new_ship_piece_id) {
        return Err(GameError::PieceNotInBank(new_ship_piece_id));
    }
    if new_ship_piece_id.color != acting.color() {
        return Err(GameError::GrowWrongColor);
    }
    let smallest = smallest_available(state, acting.color())
        .ok_or(GameError::GrowNotSmallest)?;
    if smallest != new_ship_piece_id {
        return Err(GameError::GrowNotSmallest);
    }
    Ok(())
}

/// Peek at the smallest-size, smallest-ordinal available piece of `color`
/// in the bank without removing it (mirrors `Bank::take_smallest`'s
/// tie-break, pinned per §9's open-question resolution).
pub(crate) fn smallest_available(state: &GameState, color: Color) -> Option<PieceId> {
    for size in crate::piece::Size::ALL {
        for ordinal in 0..3u8 {
            let candidate = PieceId::new(color, size, ordinal);
            if state.bank.contains(candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// §4.5.5 Trade (blue).
pub(crate) fn validate_trade(
    state: &GameState,
    player: Player,
    ship_id: PieceId,
    system_id: &str,
    new_piece_id: PieceId,
    skip_availability: bool,
) -> Result<(), GameError> {
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    let ship = system
        .find_ship(ship_id)
        .ok_or(GameError::ShipNotFound(ship_id))?;
    if ship.owner != player {
        return Err(GameError::WrongOwner {
            ship: ship_id,
            actual: ship.owner,
        });
    }

    require_available(state, system_id, player, Color::Blue, skip_availability)?;

    if !state.bank.contains(new_piece_id) {
        return Err(GameError::PieceNotInBank(new_piece_id));
    }
    if new_piece_id.color == ship.color() {
        return Err(GameError::TradeSameColor);
    }
    if new_piece_id.size != ship.size() {
        return Err(GameError::TradeSizeMismatch);
    }
    Ok(())
}

/// §4.5.6 Sacrifice — only the opening checks (ship exists, owned by
/// player). No availability check: sacrifice grants the color ability
/// independent of the local star/ship.
pub(crate) fn validate_sacrifice_start(
    state: &GameState,
    player: Player,
    sacrificed_ship_id: PieceId,
    system_id: &str,
) -> Result<(), GameError> {
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    let ship = system
        .find_ship(sacrificed_ship_id)
        .ok_or(GameError::ShipNotFound(sacrificed_ship_id))?;
    if ship.owner != player {
        return Err(GameError::WrongOwner {
            ship: sacrificed_ship_id,
            actual: ship.owner,
        });
    }
    Ok(())
}

/// The followup-color constraint (§4.5.6): every followup must be of the
/// action kind keyed to the sacrificed ship's color.
pub(crate) fn followup_tag_for_color(color: Color) -> &'static str {
    match color.ability() {
        Ability::Move => "move",
        Ability::Grow => "grow",
        Ability::Trade => "trade",
        Ability::Capture => "capture",
    }
}

pub(crate) fn validate_followup_kind(color: Color, followup: &ActionKind) -> Result<(), GameError> {
    let expected = followup_tag_for_color(color);
    let got = followup.tag();
    if got != expected {
        return Err(GameError::SacrificeFollowupColorMismatch { got });
    }
    Ok(())
}

/// §4.5.7 Overpopulation.
pub(crate) fn validate_overpopulation(
    state: &GameState,
    system_id: &str,
    color: Color,
) -> Result<(), GameError> {
    let system = state
        .system(system_id)
        .ok_or_else(|| GameError::SystemNotFound(system_id.to_string()))?;
    if !system.is_overpopulated(color) {
        return Err(GameError::OverpopulationNotPresent(color));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceId, Ship, Size};
    use crate::system::System;

    fn piece(color: Color, size: Size, ordinal: u8) -> PieceId {
        PieceId::new(color, size, ordinal)
    }

    fn state_with_systems(systems: Vec<System>) -> GameState {
        let mut state = GameState::new();
        state.phase = GamePhase::Normal;
        for sys in systems {
            state.systems.push(sys);
        }
        state
    }

    #[test]
    fn move_rejected_when_star_sizes_intersect() {
        let origin = System::new_free("origin".into(), piece(Color::Blue, Size::Medium, 0));
        let mut origin = origin;
        origin.add_star(piece(Color::Yellow, Size::Large, 0));
        origin.add_ship(Ship::new(piece(Color::Yellow, Size::Small, 0), Player::P1));
        let dest = System::new_free("dest".into(), piece(Color::Red, Size::Medium, 0));
        let state = state_with_systems(vec![origin, dest]);

        let err = validate_move(
            &state,
            Player::P1,
            piece(Color::Yellow, Size::Small, 0),
            "origin",
            &MoveDestination::ExistingSystem("dest".into()),
            false,
        )
        .unwrap_err();
        assert_eq!(err, GameError::MoveSizeConflict);
        assert!(err.to_string().contains("different sizes"));
    }

    #[test]
    fn capture_own_ship_rejected() {
        let mut sys = System::new_free("sys".into(), piece(Color::Red, Size::Small, 0));
        let a = piece(Color::Red, Size::Large, 0);
        let b = piece(Color::Red, Size::Medium, 0);
        sys.add_ship(Ship::new(a, Player::P1));
        sys.add_ship(Ship::new(b, Player::P1));
        let state = state_with_systems(vec![sys]);

        let err = validate_capture(&state, Player::P1, a, b, "sys", false).unwrap_err();
        assert_eq!(err, GameError::CaptureOwnShip);
        assert!(err.to_string().contains("Cannot capture your own ship"));
    }

    #[test]
    fn grow_rejected_without_green_access() {
        let mut sys = System::new_free("sys".into(), piece(Color::Red, Size::Small, 0));
        let ship = piece(Color::Blue, Size::Medium, 0);
        sys.add_ship(Ship::new(ship, Player::P1));
        let state = state_with_systems(vec![sys]);

        let err = validate_grow(
            &state,
            Player::P1,
            ship,
            "sys",
            piece(Color::Blue, Size::Small, 0),
            false,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GameError::ColorUnavailable {
                color: Color::Green,
                ability: "grow"
            }
        );
        assert!(err.to_string().contains("Green (grow) action not available"));
    }

    #[test]
    fn trade_rejected_on_size_mismatch_then_color_mismatch() {
        let mut sys = System::new_free("sys".into(), piece(Color::Blue, Size::Small, 0));
        let ship = piece(Color::Yellow, Size::Medium, 0);
        sys.add_ship(Ship::new(ship, Player::P1));
        let state = state_with_systems(vec![sys]);

        let err = validate_trade(
            &state,
            Player::P1,
            ship,
            "sys",
            piece(Color::Green, Size::Small, 0),
            false,
        )
        .unwrap_err();
        assert_eq!(err, GameError::TradeSizeMismatch);
        assert!(err.to_string().contains("same size"));

        let err = validate_trade(
            &state,
            Player::P1,
            ship,
            "sys",
            piece(Color::Yellow, Size::Medium, 1),
            false,
        )
        .unwrap_err();
        assert_eq!(err, GameError::TradeSameColor);
        assert!(err.to_string().contains("different color"));
    }
}
