//! TransitionKernel: deterministic mutation given a validated action,
//! including sacrifice expansion, cleanup, turn advancement, and
//! game-end detection. Every function here assumes its accompanying
//! `validator` check has already passed.

use crate::action::{Action, ActionKind, MoveDestination};
use crate::error::GameError;
use crate::piece::{Color, PieceId, Player, Ship};
use crate::state::{homeworld_id, GamePhase, GameState};
use crate::system::{evaluate_cleanup, CleanupOutcome, System};
use crate::validator;

/// Entry point used by the replay façade. Mutates `state` in place;
/// callers that need atomicity (the façade) operate on a clone and
/// discard it on `Err`.
pub(crate) fn apply_action(state: &mut GameState, action: &Action) -> Result<(), GameError> {
    validator::validate_gates(state, action)?;

    match &action.kind {
        ActionKind::Setup { piece_id, role } => {
            validator::validate_setup(state, action.player, *piece_id, *role)?;
            apply_setup(state, action.player, *piece_id, *role);
        }
        ActionKind::Overpopulation { system, color } => {
            validator::validate_overpopulation(state, system, *color)?;
            apply_overpopulation(state, system, *color);
            check_end_of_game(state, action.player);
        }
        ActionKind::Sacrifice {
            sacrificed_ship_id,
            system,
            followups,
        } => {
            apply_sacrifice(state, action.player, *sacrificed_ship_id, system, followups)?;
            advance_turn(state);
        }
        other => {
            validate_and_apply(state, action.player, other, false)?;
            check_end_of_game(state, action.player);
            advance_turn(state);
        }
    }

    // Every action kind above only moves pieces between bank and board; a
    // mismatch here is a kernel bug, not a user-facing error (§7).
    state.assert_conservation();
    Ok(())
}

fn advance_turn(state: &mut GameState) {
    if !state.is_ended() {
        state.active_player = state.active_player.other();
    }
}

fn cleanup_system(state: &mut GameState, system_id: &str) {
    let Some(system) = state.system(system_id) else {
        return;
    };
    match evaluate_cleanup(system) {
        CleanupOutcome::Survives => {}
        CleanupOutcome::DestroyedNoStars { returned_ships } => {
            for ship in returned_ships {
                state
                    .bank
                    .return_piece(ship.id)
                    .expect("conservation: returned ship identity already in bank");
            }
            remove_system(state, system_id);
        }
        CleanupOutcome::DestroyedNoShips { returned_stars } => {
            for star in returned_stars {
                state
                    .bank
                    .return_piece(star)
                    .expect("conservation: returned star identity already in bank");
            }
            remove_system(state, system_id);
        }
    }
}

fn remove_system(state: &mut GameState, system_id: &str) {
    let homeworld_player = state
        .homeworlds
        .iter()
        .find(|(_, s)| s.id == system_id)
        .map(|(p, _)| *p);
    if let Some(player) = homeworld_player {
        state.homeworlds.remove(&player);
    } else {
        state.systems.retain(|s| s.id != system_id);
    }
}

fn player_has_lost(state: &GameState, player: Player) -> bool {
    match state.home_system(player) {
        None => true,
        Some(sys) => sys.stars.is_empty() || !sys.has_ships_owned_by(player),
    }
}

/// §4.6 end-of-game detection, run after every non-Setup action. If both
/// players have lost simultaneously, the non-acting player wins — the
/// acting player "moved last into the loss."
fn check_end_of_game(state: &mut GameState, acting_player: Player) {
    if state.is_ended() {
        return;
    }
    let p1_lost = player_has_lost(state, Player::P1);
    let p2_lost = player_has_lost(state, Player::P2);
    let winner = match (p1_lost, p2_lost) {
        (true, true) => Some(acting_player.other()),
        (true, false) => Some(Player::P2),
        (false, true) => Some(Player::P1),
        (false, false) => None,
    };
    if let Some(winner) = winner {
        state.winner = Some(winner);
        state.phase = GamePhase::Ended;
    }
}

fn apply_setup(state: &mut GameState, player: Player, piece_id: PieceId, role: crate::action::SetupRole) {
    use crate::action::SetupRole;

    state
        .bank
        .take(piece_id)
        .expect("validated: piece present in bank");

    match role {
        SetupRole::Star1 => {
            let id = homeworld_id(player);
            state
                .homeworlds
                .insert(player, System::new_homeworld(id, player, piece_id));
        }
        SetupRole::Star2 => {
            state
                .home_system_mut(player)
                .expect("homeworld exists after Star1")
                .add_star(piece_id);
        }
        SetupRole::Ship => {
            state
                .home_system_mut(player)
                .expect("homeworld exists")
                .add_ship(Ship::new(piece_id, player));
        }
    }

    let (phase_complete, next_player) = {
        let GamePhase::Setup(progress) = &mut state.phase else {
            unreachable!("apply_setup only called during Setup phase")
        };
        progress.advance();
        if progress.is_complete() {
            (true, Player::P1)
        } else {
            let (next_player, _) = progress.current().expect("checked not complete");
            (false, next_player)
        }
    };

    if phase_complete {
        state.phase = GamePhase::Normal;
    }
    state.active_player = next_player;
}

fn apply_move(
    state: &mut GameState,
    player: Player,
    ship_id: PieceId,
    from_system: &str,
    destination: &MoveDestination,
) {
    let ship = state
        .system_mut(from_system)
        .expect("validated: origin system exists")
        .remove_ship(ship_id)
        .expect("validated: ship present in origin");
    debug_assert_eq!(ship.owner, player);

    let dest_id = match destination {
        MoveDestination::ExistingSystem(id) => id.clone(),
        MoveDestination::NewSystem { new_star_piece_id } => {
            let star = state
                .bank
                .take(*new_star_piece_id)
                .expect("validated: star piece present in bank");
            let id = state.fresh_system_id();
            state.systems.push(System::new_free(id.clone(), star));
            id
        }
    };

    state
        .system_mut(&dest_id)
        .expect("destination system just ensured to exist")
        .add_ship(ship);

    cleanup_system(state, from_system);
}

fn apply_capture(state: &mut GameState, target_id: PieceId, system_id: &str, new_owner: Player) {
    state
        .system_mut(system_id)
        .expect("validated: system exists")
        .change_owner(target_id, new_owner);
}

fn apply_grow(state: &mut GameState, system_id: &str, new_ship_piece_id: PieceId, owner: Player) {
    let piece = state
        .bank
        .take(new_ship_piece_id)
        .expect("validated: piece present in bank");
    state
        .system_mut(system_id)
        .expect("validated: system exists")
        .add_ship(Ship::new(piece, owner));
}

fn apply_trade(state: &mut GameState, ship_id: PieceId, system_id: &str, new_piece_id: PieceId) {
    let old_id = state
        .system(system_id)
        .expect("validated: system exists")
        .find_ship(ship_id)
        .expect("validated: ship present")
        .id;
    let taken = state
        .bank
        .take(new_piece_id)
        .expect("validated: piece present in bank");
    state
        .bank
        .return_piece(old_id)
        .expect("conservation: traded-away identity returns to bank");
    state
        .system_mut(system_id)
        .expect("validated: system exists")
        .find_ship_mut(ship_id)
        .expect("validated: ship present")
        .id = taken;
}

fn apply_overpopulation(state: &mut GameState, system_id: &str, color: Color) {
    let removed = state
        .system_mut(system_id)
        .expect("validated: system exists")
        .remove_all_of_color(color);
    for piece in removed {
        state
            .bank
            .return_piece(piece)
            .expect("conservation: overpopulated pieces return to bank");
    }
    cleanup_system(state, system_id);
}

/// Dispatches and applies a Move/Capture/Grow/Trade action, validating
/// first. `skip_availability` threads the sacrifice-followup relaxation
/// (§4.5.6) through to the validator.
fn validate_and_apply(
    state: &mut GameState,
    player: Player,
    kind: &ActionKind,
    skip_availability: bool,
) -> Result<(), GameError> {
    match kind {
        ActionKind::Move {
            ship_id,
            from_system,
            destination,
        } => {
            validator::validate_move(
                state,
                player,
                *ship_id,
                from_system,
                destination,
                skip_availability,
            )?;
            apply_move(state, player, *ship_id, from_system, destination);
            Ok(())
        }
        ActionKind::Capture {
            attacker_id,
            target_id,
            system,
        } => {
            validator::validate_capture(
                state,
                player,
                *attacker_id,
                *target_id,
                system,
                skip_availability,
            )?;
            apply_capture(state, *target_id, system, player);
            Ok(())
        }
        ActionKind::Grow {
            acting_ship_id,
            system,
            new_ship_piece_id,
        } => {
            validator::validate_grow(
                state,
                player,
                *acting_ship_id,
                system,
                *new_ship_piece_id,
                skip_availability,
            )?;
            apply_grow(state, system, *new_ship_piece_id, player);
            Ok(())
        }
        ActionKind::Trade {
            ship_id,
            system,
            new_piece_id,
        } => {
            validator::validate_trade(
                state,
                player,
                *ship_id,
                system,
                *new_piece_id,
                skip_availability,
            )?;
            apply_trade(state, *ship_id, system, *new_piece_id);
            Ok(())
        }
        ActionKind::Setup { .. }
        | ActionKind::Sacrifice { .. }
        | ActionKind::Overpopulation { .. } => {
            unreachable!("validate_and_apply only handles Move/Capture/Grow/Trade")
        }
    }
}

/// §4.5.6 / §4.6 Sacrifice expansion.
fn apply_sacrifice(
    state: &mut GameState,
    player: Player,
    sacrificed_ship_id: PieceId,
    system_id: &str,
    followups: &[ActionKind],
) -> Result<(), GameError> {
    validator::validate_sacrifice_start(state, player, sacrificed_ship_id, system_id)?;

    let ship = *state
        .system(system_id)
        .expect("validated above")
        .find_ship(sacrificed_ship_id)
        .expect("validated above");
    let color = ship.color();
    let size = ship.size();

    let removed = state
        .system_mut(system_id)
        .expect("validated above")
        .remove_ship(sacrificed_ship_id)
        .expect("validated above");
    state
        .bank
        .return_piece(removed.id)
        .expect("conservation: sacrificed identity returns to bank");
    cleanup_system(state, system_id);

    if player_has_lost(state, player) {
        if !followups.is_empty() {
            return Err(GameError::SacrificeTerminalFollowupsPresent);
        }
        check_end_of_game(state, player);
        return Ok(());
    }

    let expected = size.value();
    if followups.len() != expected as usize {
        return Err(GameError::SacrificeFollowupCountMismatch {
            expected,
            got: followups.len() as u8,
        });
    }

    for followup in followups {
        validator::validate_followup_kind(color, followup)?;
        validate_and_apply(state, player, followup, true)?;
    }

    check_end_of_game(state, player);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceId, Size};

    fn piece(color: Color, size: Size, ordinal: u8) -> PieceId {
        PieceId::new(color, size, ordinal)
    }

    /// Installs minimally-valid homeworlds for both players (two stars, one
    /// owned ship each) using piece identities the caller guarantees are
    /// otherwise unused, so neither player is already "lost" for the
    /// purposes of `check_end_of_game` in tests that exercise unrelated
    /// systems.
    fn install_placeholder_homeworlds(state: &mut GameState) {
        let p1_star1 = piece(Color::Yellow, Size::Small, 0);
        let p1_star2 = piece(Color::Yellow, Size::Small, 1);
        let p1_ship = piece(Color::Yellow, Size::Small, 2);
        for id in [p1_star1, p1_star2, p1_ship] {
            state.bank.take(id).unwrap();
        }
        let mut p1_home = System::new_homeworld(homeworld_id(Player::P1), Player::P1, p1_star1);
        p1_home.add_star(p1_star2);
        p1_home.add_ship(Ship::new(p1_ship, Player::P1));
        state.homeworlds.insert(Player::P1, p1_home);

        let p2_star1 = piece(Color::Blue, Size::Small, 0);
        let p2_star2 = piece(Color::Blue, Size::Small, 1);
        let p2_ship = piece(Color::Blue, Size::Small, 2);
        for id in [p2_star1, p2_star2, p2_ship] {
            state.bank.take(id).unwrap();
        }
        let mut p2_home = System::new_homeworld(homeworld_id(Player::P2), Player::P2, p2_star1);
        p2_home.add_star(p2_star2);
        p2_home.add_ship(Ship::new(p2_ship, Player::P2));
        state.homeworlds.insert(Player::P2, p2_home);
    }

    #[test]
    fn overpopulation_cascade_dissolves_starless_system() {
        let mut state = GameState::new();
        state.phase = GamePhase::Normal;
        install_placeholder_homeworlds(&mut state);

        let star = piece(Color::Red, Size::Large, 0);
        state.bank.take(star).unwrap();
        let mut sys = System::new_free("sys".into(), star);
        for (p, color, size, ordinal) in [
            (Player::P1, Color::Red, Size::Medium, 0),
            (Player::P2, Color::Red, Size::Medium, 1),
            (Player::P1, Color::Red, Size::Small, 0),
            (Player::P2, Color::Red, Size::Small, 1),
            (Player::P2, Color::Yellow, Size::Medium, 0),
        ] {
            let id = piece(color, size, ordinal);
            state.bank.take(id).unwrap();
            sys.add_ship(Ship::new(id, p));
        }
        state.systems.push(sys);
        assert_eq!(state.bank.total(), 24);

        let action = Action::new(
            Player::P1,
            1,
            ActionKind::Overpopulation {
                system: "sys".into(),
                color: Color::Red,
            },
        );
        apply_action(&mut state, &action).expect("overpopulation succeeds");

        assert!(state.system("sys").is_none());
        assert_eq!(state.bank.total(), 30);
    }

    #[test]
    fn sacrifice_expands_into_three_moves() {
        let mut state = GameState::new();
        state.phase = GamePhase::Normal;
        install_placeholder_homeworlds(&mut state);

        let src_star = piece(Color::Blue, Size::Medium, 0);
        state.bank.take(src_star).unwrap();
        let sacrificed = piece(Color::Yellow, Size::Large, 0);
        state.bank.take(sacrificed).unwrap();
        let mut src = System::new_free("src".into(), src_star);
        src.add_ship(Ship::new(sacrificed, Player::P1));
        state.systems.push(src);

        let origin_a_star = piece(Color::Green, Size::Small, 0);
        let ship_a = piece(Color::Red, Size::Large, 0);
        let dest1_star = piece(Color::Red, Size::Medium, 0);
        let origin_b_star = piece(Color::Green, Size::Medium, 0);
        let ship_b = piece(Color::Red, Size::Large, 1);
        let dest2_star = piece(Color::Green, Size::Large, 0);
        let origin_c_star = piece(Color::Red, Size::Small, 0);
        let ship_c = piece(Color::Blue, Size::Large, 0);
        let dest3_star = piece(Color::Green, Size::Medium, 1);

        for id in [
            origin_a_star,
            ship_a,
            dest1_star,
            origin_b_star,
            ship_b,
            dest2_star,
            origin_c_star,
            ship_c,
            dest3_star,
        ] {
            state.bank.take(id).unwrap();
        }

        let mut origin_a = System::new_free("originA".into(), origin_a_star);
        origin_a.add_ship(Ship::new(ship_a, Player::P1));
        state.systems.push(origin_a);
        state.systems.push(System::new_free("destD1".into(), dest1_star));

        let mut origin_b = System::new_free("originB".into(), origin_b_star);
        origin_b.add_ship(Ship::new(ship_b, Player::P1));
        state.systems.push(origin_b);
        state.systems.push(System::new_free("destD2".into(), dest2_star));

        let mut origin_c = System::new_free("originC".into(), origin_c_star);
        origin_c.add_ship(Ship::new(ship_c, Player::P1));
        state.systems.push(origin_c);
        state.systems.push(System::new_free("destD3".into(), dest3_star));

        let action = Action::new(
            Player::P1,
            1,
            ActionKind::Sacrifice {
                sacrificed_ship_id: sacrificed,
                system: "src".into(),
                followups: vec![
                    ActionKind::Move {
                        ship_id: ship_a,
                        from_system: "originA".into(),
                        destination: MoveDestination::ExistingSystem("destD1".into()),
                    },
                    ActionKind::Move {
                        ship_id: ship_b,
                        from_system: "originB".into(),
                        destination: MoveDestination::ExistingSystem("destD2".into()),
                    },
                    ActionKind::Move {
                        ship_id: ship_c,
                        from_system: "originC".into(),
                        destination: MoveDestination::ExistingSystem("destD3".into()),
                    },
                ],
            },
        );

        apply_action(&mut state, &action).expect("three-move sacrifice succeeds");

        assert!(state.system("src").is_none());
        assert!(state.bank.contains(sacrificed));
        for (dest, ship) in [("destD1", ship_a), ("destD2", ship_b), ("destD3", ship_c)] {
            let sys = state.system(dest).expect("destination exists");
            assert_eq!(sys.ships.len(), 1);
            assert_eq!(sys.ships[0].id, ship);
        }
    }

    #[test]
    fn sacrifice_with_no_ships_left_at_home_ends_the_game() {
        let mut state = GameState::new();
        state.phase = GamePhase::Normal;

        let p1_star1 = piece(Color::Green, Size::Small, 0);
        let p1_star2 = piece(Color::Yellow, Size::Small, 0);
        let p1_ship = piece(Color::Yellow, Size::Medium, 0);
        for id in [p1_star1, p1_star2, p1_ship] {
            state.bank.take(id).unwrap();
        }
        let mut p1_home = System::new_homeworld(homeworld_id(Player::P1), Player::P1, p1_star1);
        p1_home.add_star(p1_star2);
        p1_home.add_ship(Ship::new(p1_ship, Player::P1));
        state.homeworlds.insert(Player::P1, p1_home);

        let p2_star1 = piece(Color::Blue, Size::Small, 0);
        let p2_star2 = piece(Color::Red, Size::Small, 0);
        let p2_ship = piece(Color::Blue, Size::Medium, 0);
        for id in [p2_star1, p2_star2, p2_ship] {
            state.bank.take(id).unwrap();
        }
        let mut p2_home = System::new_homeworld(homeworld_id(Player::P2), Player::P2, p2_star1);
        p2_home.add_star(p2_star2);
        p2_home.add_ship(Ship::new(p2_ship, Player::P2));
        state.homeworlds.insert(Player::P2, p2_home);

        let action = Action::new(
            Player::P1,
            1,
            ActionKind::Sacrifice {
                sacrificed_ship_id: p1_ship,
                system: homeworld_id(Player::P1),
                followups: vec![],
            },
        );

        apply_action(&mut state, &action).expect("terminal sacrifice succeeds");

        assert_eq!(state.phase, GamePhase::Ended);
        assert_eq!(state.winner, Some(Player::P2));
    }
}
