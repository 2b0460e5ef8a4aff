#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

//! A deterministic rules engine for Binary Homeworlds: a pure
//! `apply(state, action) -> Result<state, error>` state machine plus the
//! JSON wire form a host drives it with. See `replay` for the public
//! entry points.

pub mod action;
pub mod bank;
pub mod error;
mod kernel;
pub mod piece;
pub mod replay;
pub mod state;
pub mod system;
mod validator;
pub mod wire;

pub use action::{Action, ActionKind, MoveDestination, SetupRole};
pub use bank::{Bank, BankError};
pub use error::GameError;
pub use piece::{Ability, Color, Ordinal, Piece, PieceId, PieceIdParseError, Player, Ship, Size};
pub use replay::{apply, initial, replay};
pub use state::{GamePhase, GameState, SetupProgress};
pub use system::{CleanupOutcome, System, SystemId};
pub use wire::{WireAction, WireError, WireFollowup, WireSetupRole};
