//! A star system: one or two stars plus zero or more ships, co-located.
//! Ships and stars are stored in insertion order; order is preserved only
//! for deterministic replay, never semantically significant.

use serde::{Deserialize, Serialize};

use crate::piece::{Color, Player, Ship};

pub type SystemId = String;

/// Overpopulation threshold: four or more pieces of one color at a system.
pub const OVERPOPULATION_THRESHOLD: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub id: SystemId,
    /// `Some(player)` for a homeworld, `None` for a free system.
    pub homeworld_owner: Option<Player>,
    pub stars: Vec<crate::piece::PieceId>,
    pub ships: Vec<Ship>,
}

impl System {
    pub fn new_free(id: SystemId, star: crate::piece::PieceId) -> Self {
        Self {
            id,
            homeworld_owner: None,
            stars: vec![star],
            ships: Vec::new(),
        }
    }

    pub fn new_homeworld(id: SystemId, owner: Player, first_star: crate::piece::PieceId) -> Self {
        Self {
            id,
            homeworld_owner: Some(owner),
            stars: vec![first_star],
            ships: Vec::new(),
        }
    }

    pub fn is_homeworld(&self) -> bool {
        self.homeworld_owner.is_some()
    }

    pub fn add_star(&mut self, star: crate::piece::PieceId) {
        self.stars.push(star);
    }

    pub fn add_ship(&mut self, ship: Ship) {
        self.ships.push(ship);
    }

    /// Removes a ship by piece id, returning it, or `None` if not present.
    pub fn remove_ship(&mut self, id: crate::piece::PieceId) -> Option<Ship> {
        let pos = self.ships.iter().position(|s| s.id == id)?;
        Some(self.ships.remove(pos))
    }

    pub fn find_ship(&self, id: crate::piece::PieceId) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    pub fn find_ship_mut(&mut self, id: crate::piece::PieceId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|s| s.id == id)
    }

    /// Reassigns `ship_id`'s owner in place (used by Capture).
    pub fn change_owner(&mut self, ship_id: crate::piece::PieceId, new_owner: Player) -> bool {
        if let Some(ship) = self.find_ship_mut(ship_id) {
            ship.owner = new_owner;
            true
        } else {
            false
        }
    }

    /// Removes every piece (star or ship) of `color`, returning the removed
    /// piece identities.
    pub fn remove_all_of_color(&mut self, color: Color) -> Vec<crate::piece::PieceId> {
        let mut removed = Vec::new();
        self.stars.retain(|s| {
            if s.color == color {
                removed.push(*s);
                false
            } else {
                true
            }
        });
        self.ships.retain(|s| {
            if s.color() == color {
                removed.push(s.id);
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn star_sizes(&self) -> std::collections::HashSet<crate::piece::Size> {
        self.stars.iter().map(|s| s.size).collect()
    }

    /// A color is available to `player` at this system iff a star here is
    /// that color, or a ship owned by `player` here is that color. Stars
    /// grant ability access to both players; own ships only to their owner.
    pub fn color_available_for(&self, player: Player, color: Color) -> bool {
        self.stars.iter().any(|s| s.color == color)
            || self
                .ships
                .iter()
                .any(|s| s.owner == player && s.color() == color)
    }

    /// Count of stars + ships of `color` present.
    pub fn color_count(&self, color: Color) -> usize {
        self.stars.iter().filter(|s| s.color == color).count()
            + self.ships.iter().filter(|s| s.color() == color).count()
    }

    pub fn is_overpopulated(&self, color: Color) -> bool {
        self.color_count(color) >= OVERPOPULATION_THRESHOLD
    }

    pub fn overpopulated_colors(&self) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|&c| self.is_overpopulated(c))
            .collect()
    }

    pub fn ships_owned_by(&self, player: Player) -> impl Iterator<Item = &Ship> {
        self.ships.iter().filter(move |s| s.owner == player)
    }

    pub fn has_ships_owned_by(&self, player: Player) -> bool {
        self.ships.iter().any(|s| s.owner == player)
    }
}

/// Outcome of applying the cleanup rule (§4.3) to a system after mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// System survives unchanged (still has >=1 star and >=1 ship, or is a
    /// homeworld that is neither starless nor shipless-for-its-owner).
    Survives,
    /// System had zero stars: it is destroyed and every remaining ship
    /// (of any owner) returns to the bank, along with the removed pieces.
    DestroyedNoStars { returned_ships: Vec<Ship> },
    /// A free system had zero ships: it is destroyed and its stars return
    /// to the bank.
    DestroyedNoShips { returned_stars: Vec<crate::piece::PieceId> },
}

/// Applies the cleanup rule to `system`. Homeworlds are never destroyed by
/// the zero-ships rule (losing all ships at home is terminal for the owner
/// but resolved by end-of-game detection, not system deletion) and are only
/// removed from play by the caller once both halves of the game-end
/// condition are confirmed (see `kernel`).
pub fn evaluate_cleanup(system: &System) -> CleanupOutcome {
    if system.stars.is_empty() {
        return CleanupOutcome::DestroyedNoStars {
            returned_ships: system.ships.clone(),
        };
    }
    if !system.is_homeworld() && system.ships.is_empty() {
        return CleanupOutcome::DestroyedNoShips {
            returned_stars: system.stars.clone(),
        };
    }
    CleanupOutcome::Survives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{PieceId, Size};

    fn piece(color: Color, size: Size, ordinal: u8) -> PieceId {
        PieceId::new(color, size, ordinal)
    }

    #[test]
    fn color_available_via_star_for_either_player() {
        let mut sys = System::new_free("system-1".into(), piece(Color::Red, Size::Large, 0));
        assert!(sys.color_available_for(Player::P1, Color::Red));
        assert!(sys.color_available_for(Player::P2, Color::Red));
        sys.add_ship(Ship::new(piece(Color::Blue, Size::Small, 0), Player::P1));
        assert!(sys.color_available_for(Player::P1, Color::Blue));
        assert!(!sys.color_available_for(Player::P2, Color::Blue));
    }

    #[test]
    fn overpopulation_counts_stars_and_ships() {
        let mut sys = System::new_free("system-1".into(), piece(Color::Red, Size::Large, 0));
        sys.add_ship(Ship::new(piece(Color::Red, Size::Medium, 0), Player::P1));
        sys.add_ship(Ship::new(piece(Color::Red, Size::Medium, 1), Player::P2));
        sys.add_ship(Ship::new(piece(Color::Red, Size::Small, 0), Player::P1));
        assert!(sys.is_overpopulated(Color::Red));
        assert_eq!(sys.overpopulated_colors(), vec![Color::Red]);
    }

    #[test]
    fn cleanup_destroys_free_system_with_no_ships() {
        let sys = System::new_free("system-1".into(), piece(Color::Red, Size::Large, 0));
        match evaluate_cleanup(&sys) {
            CleanupOutcome::DestroyedNoShips { returned_stars } => {
                assert_eq!(returned_stars, vec![piece(Color::Red, Size::Large, 0)]);
            }
            other => panic!("expected DestroyedNoShips, got {other:?}"),
        }
    }

    #[test]
    fn cleanup_destroys_any_system_with_no_stars() {
        let mut sys = System::new_free("system-1".into(), piece(Color::Red, Size::Large, 0));
        sys.add_ship(Ship::new(piece(Color::Blue, Size::Small, 0), Player::P1));
        sys.remove_all_of_color(Color::Red);
        match evaluate_cleanup(&sys) {
            CleanupOutcome::DestroyedNoStars { returned_ships } => {
                assert_eq!(returned_ships.len(), 1);
            }
            other => panic!("expected DestroyedNoStars, got {other:?}"),
        }
    }

    #[test]
    fn homeworld_with_no_ships_survives_cleanup() {
        let sys = System::new_homeworld(
            "player1-home".into(),
            Player::P1,
            piece(Color::Red, Size::Large, 0),
        );
        assert_eq!(evaluate_cleanup(&sys), CleanupOutcome::Survives);
    }
}
