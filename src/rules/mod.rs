//! Game rules for m,n,k games
//!
//! This module implements:
//! - Move kinds (simple placement, bomb power-up) and their undo records
//! - Win conditions (align to win, misère)

pub mod moves;
pub mod win;

// Re-exports for convenient access
pub use moves::{apply, revert, Move, MoveKind, MoveRecord};
pub use win::{Goal, Outcome, WinCondition, MIN_ALIGN_LENGTH};
