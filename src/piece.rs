//! Piece identity: colors, sizes, and the stable (color, size, ordinal) key
//! that every physical piece carries across bank <-> board transitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The four piece colors. Each color keys exactly one ability:
/// yellow = move, green = grow, blue = trade, red = capture.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    Yellow,
    Green,
    Blue,
    Red,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Yellow, Color::Green, Color::Blue, Color::Red];

    /// The ability kept keyed to this color.
    pub fn ability(self) -> Ability {
        match self {
            Color::Yellow => Ability::Move,
            Color::Green => Ability::Grow,
            Color::Blue => Ability::Trade,
            Color::Red => Ability::Capture,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Move,
    Grow,
    Trade,
    Capture,
}

/// Piece size. Represented as a number 1..=3 for the canonical string form
/// and for the size-rule / size-comparison checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Size {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for Size {
    type Err = PieceIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Size::Small),
            "2" => Ok(Size::Medium),
            "3" => Ok(Size::Large),
            _ => Err(PieceIdParseError::BadSize(s.to_string())),
        }
    }
}

/// Ordinal among the three physical copies of a given (color, size), in
/// `0..=2`. Not semantically significant beyond tie-breaking in bank
/// operations and providing a stable wire identity.
pub type Ordinal = u8;

/// A stable piece identity: `(color, size, ordinal)`. The canonical string
/// form `"<color>-<size>-<ordinal>"` is the external identifier used by
/// actions and error messages (load-bearing for wire compatibility — never
/// replace it with a generated id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceId {
    pub color: Color,
    pub size: Size,
    pub ordinal: Ordinal,
}

impl PieceId {
    pub fn new(color: Color, size: Size, ordinal: Ordinal) -> Self {
        Self {
            color,
            size,
            ordinal,
        }
    }

    /// The 36 piece identities in the closed universe: 4 colors x 3 sizes x
    /// 3 ordinals.
    pub fn universe() -> impl Iterator<Item = PieceId> {
        Color::ALL.into_iter().flat_map(|color| {
            Size::ALL.into_iter().flat_map(move |size| {
                (0..3u8).map(move |ordinal| PieceId::new(color, size, ordinal))
            })
        })
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.color, self.size, self.ordinal)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PieceIdParseError {
    #[error("malformed piece id {0:?}: expected \"<color>-<size>-<ordinal>\"")]
    Malformed(String),
    #[error("unknown color in piece id: {0:?}")]
    BadColor(String),
    #[error("bad size in piece id: {0:?}")]
    BadSize(String),
    #[error("bad ordinal in piece id: {0:?}")]
    BadOrdinal(String),
}

impl FromStr for PieceId {
    type Err = PieceIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (Some(color_s), Some(size_s), Some(ordinal_s), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PieceIdParseError::Malformed(s.to_string()));
        };
        let color = Color::from_str(color_s)
            .map_err(|_| PieceIdParseError::BadColor(color_s.to_string()))?;
        let size = Size::from_str(size_s)?;
        let ordinal = ordinal_s
            .parse::<u8>()
            .ok()
            .filter(|o| *o < 3)
            .ok_or_else(|| PieceIdParseError::BadOrdinal(ordinal_s.to_string()))?;
        Ok(PieceId::new(color, size, ordinal))
    }
}

impl TryFrom<String> for PieceId {
    type Error = PieceIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PieceId::from_str(&value)
    }
}

impl From<PieceId> for String {
    fn from(value: PieceId) -> Self {
        value.to_string()
    }
}

/// A bare piece, not yet located anywhere (used for bank contents and as the
/// payload returned by pieces leaving a system).
pub type Piece = PieceId;

/// The two players. Binary Homeworlds is strictly two-player; variants are a
/// non-goal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
pub enum Player {
    #[strum(serialize = "player1")]
    P1,
    #[strum(serialize = "player2")]
    P2,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }
}

/// A ship on the board: a piece identity plus its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: PieceId,
    pub owner: Player,
}

impl Ship {
    pub fn new(id: PieceId, owner: Player) -> Self {
        Self { id, owner }
    }

    pub fn color(&self) -> Color {
        self.id.color
    }

    pub fn size(&self) -> Size {
        self.id.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_has_36_pieces() {
        let all: Vec<_> = PieceId::universe().collect();
        assert_eq!(all.len(), 36);
        let unique: std::collections::HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), 36);
    }

    #[test]
    fn canonical_string_round_trips() {
        for piece in PieceId::universe() {
            let s = piece.to_string();
            let parsed: PieceId = s.parse().expect("round trip parse");
            assert_eq!(parsed, piece);
        }
    }

    #[test]
    fn ability_mapping() {
        assert_eq!(Color::Yellow.ability(), Ability::Move);
        assert_eq!(Color::Green.ability(), Ability::Grow);
        assert_eq!(Color::Blue.ability(), Ability::Trade);
        assert_eq!(Color::Red.ability(), Ability::Capture);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("red-3".parse::<PieceId>().is_err());
        assert!("red-3-0-extra".parse::<PieceId>().is_err());
        assert!("mauve-1-0".parse::<PieceId>().is_err());
        assert!("red-9-0".parse::<PieceId>().is_err());
        assert!("red-1-9".parse::<PieceId>().is_err());
    }
}
