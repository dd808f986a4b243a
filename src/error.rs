//! Error types shared by every engine operation

use thiserror::Error;

/// Errors reported by the engine.
///
/// Every operation validates its input before touching any state, so an
/// `Err` always leaves the board, history and players exactly as they were.
/// Terminal game outcomes are not errors; they are returned by `play`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Board dimensions, win length or blocked-cell count out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Coordinate outside the board
    #[error("invalid coordinate: row {row}, column {col}")]
    InvalidCoordinate { row: i32, col: i32 },
    /// Move that cannot be played in the current position
    #[error("invalid move: {0}")]
    InvalidMove(String),
    /// Undo or cursor movement with nothing to step over
    #[error("no move to step over in history")]
    EmptyHistory,
    /// Player index or entity not known to the board
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, EngineError>;
