//! `GameState`: phase, active player, home-system references, bank, free
//! systems, and history. Read-only projections live here; mutation lives in
//! `validator` (checks only) and `kernel` (the actual transitions).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, SetupRole};
use crate::bank::Bank;
use crate::piece::{Color, PieceId, Player};
use crate::system::{System, SystemId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Setup(SetupProgress),
    Normal,
    Ended,
}

/// Fixed setup turn order: Star1-P1, Star1-P2, Star2-P1, Star2-P2,
/// Ship-P1, Ship-P2 (§4.6). Tracked with a cursor for determinism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupProgress {
    cursor: usize,
}

const SETUP_STEPS: [(Player, SetupRole); 6] = [
    (Player::P1, SetupRole::Star1),
    (Player::P2, SetupRole::Star1),
    (Player::P1, SetupRole::Star2),
    (Player::P2, SetupRole::Star2),
    (Player::P1, SetupRole::Ship),
    (Player::P2, SetupRole::Ship),
];

impl SetupProgress {
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    pub fn current(&self) -> Option<(Player, SetupRole)> {
        SETUP_STEPS.get(self.cursor).copied()
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(SETUP_STEPS.len());
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= SETUP_STEPS.len()
    }
}

impl Default for SetupProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub active_player: Player,
    pub(crate) homeworlds: HashMap<Player, System>,
    pub(crate) systems: Vec<System>,
    pub bank: Bank,
    pub winner: Option<Player>,
    pub history: Vec<Action>,
    pub(crate) next_system_seq: u64,
}

pub fn homeworld_id(player: Player) -> SystemId {
    match player {
        Player::P1 => "player1-home".to_string(),
        Player::P2 => "player2-home".to_string(),
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Setup(SetupProgress::new()),
            active_player: Player::P1,
            homeworlds: HashMap::new(),
            systems: Vec::new(),
            bank: Bank::full(),
            winner: None,
            history: Vec::new(),
            next_system_seq: 1,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::Ended)
    }

    pub fn current_player(&self) -> Player {
        self.active_player
    }

    pub fn bank_pieces(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.bank.pieces()
    }

    /// All systems currently in play, homeworlds included, in a
    /// deterministic order (homeworlds first, by player, then free systems
    /// in creation order).
    pub fn systems(&self) -> impl Iterator<Item = &System> {
        let mut homeworlds: Vec<&System> = vec![
            self.homeworlds.get(&Player::P1),
            self.homeworlds.get(&Player::P2),
        ]
        .into_iter()
        .flatten()
        .collect();
        homeworlds.sort_by_key(|s| s.id.clone());
        homeworlds.into_iter().chain(self.systems.iter())
    }

    pub fn system(&self, id: &str) -> Option<&System> {
        self.homeworlds
            .values()
            .chain(self.systems.iter())
            .find(|s| s.id == id)
    }

    pub(crate) fn system_mut(&mut self, id: &str) -> Option<&mut System> {
        if let Some(sys) = self.homeworlds.values_mut().find(|s| s.id == id) {
            return Some(sys);
        }
        self.systems.iter_mut().find(|s| s.id == id)
    }

    pub fn home_system(&self, player: Player) -> Option<&System> {
        self.homeworlds.get(&player)
    }

    pub(crate) fn home_system_mut(&mut self, player: Player) -> Option<&mut System> {
        self.homeworlds.get_mut(&player)
    }

    pub fn find_ship(&self, id: PieceId) -> Option<(&crate::piece::Ship, &System)> {
        self.systems()
            .find_map(|sys| sys.find_ship(id).map(|ship| (ship, sys)))
    }

    pub fn overpopulated_systems(&self) -> Vec<(SystemId, Color)> {
        self.systems()
            .flat_map(|sys| {
                sys.overpopulated_colors()
                    .into_iter()
                    .map(move |c| (sys.id.clone(), c))
            })
            .collect()
    }

    pub(crate) fn fresh_system_id(&mut self) -> SystemId {
        let id = format!("system-{}", self.next_system_seq);
        self.next_system_seq += 1;
        id
    }

    /// The total piece count across bank + all systems. Used by the
    /// conservation-invariant assertion; a mismatch is a programming bug,
    /// not a user-facing error, and aborts with a diagnostic per §7.
    pub fn conservation_count(&self) -> usize {
        let board: usize = self
            .systems()
            .map(|s| s.stars.len() + s.ships.len())
            .sum();
        self.bank.total() + board
    }

    pub(crate) fn assert_conservation(&self) {
        let total = self.conservation_count();
        assert_eq!(
            total, 36,
            "conservation invariant violated: bank + board holds {total} pieces, expected 36"
        );
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
