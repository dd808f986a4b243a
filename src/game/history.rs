//! Linear move history with an undo/redo cursor

use crate::error::{EngineError, Result};
use crate::rules::MoveRecord;

/// Moves in play order and a cursor on the last applied one.
///
/// The cursor is `None` before any move. Moves after the cursor form the
/// redo tail: [`go_back`](Self::go_back) keeps it so [`go_next`](Self::go_next)
/// can replay it, while [`add_move`](Self::add_move) discards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHistory<T = MoveRecord> {
    moves: Vec<T>,
    cursor: Option<usize>,
}

impl<T> Default for GameHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GameHistory<T> {
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            cursor: None,
        }
    }

    /// Number of stored moves, redo tail included
    #[inline]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Index of the last applied move
    #[inline]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// All stored moves, redo tail included
    pub fn moves(&self) -> &[T] {
        &self.moves
    }

    /// Moves up to and including the cursor
    pub fn played(&self) -> &[T] {
        match self.cursor {
            Some(i) => &self.moves[..=i],
            None => &[],
        }
    }

    /// Last applied move
    pub fn current(&self) -> Option<&T> {
        self.cursor.map(|i| &self.moves[i])
    }

    /// Move `go_next` would replay
    pub fn upcoming(&self) -> Option<&T> {
        self.moves.get(self.played_len())
    }

    /// Moves that `go_next` could replay
    #[inline]
    pub fn redo_len(&self) -> usize {
        self.moves.len() - self.played_len()
    }

    #[inline]
    fn played_len(&self) -> usize {
        self.cursor.map_or(0, |i| i + 1)
    }

    /// Drop the redo tail and append `mv` after the cursor
    pub fn add_move(&mut self, mv: T) {
        self.truncate_redo();
        self.moves.push(mv);
        self.cursor = Some(self.moves.len() - 1);
    }

    /// Drop every move after the cursor
    pub fn truncate_redo(&mut self) {
        let played = self.played_len();
        self.moves.truncate(played);
    }

    /// Remove the last stored move.
    ///
    /// The cursor moves back with it when it pointed at that move.
    pub fn undo(&mut self) -> Result<T> {
        let last = self.moves.pop().ok_or(EngineError::EmptyHistory)?;
        let len = self.moves.len();
        self.cursor = match self.cursor {
            Some(i) if i < len => Some(i),
            Some(_) => len.checked_sub(1),
            None => None,
        };
        Ok(last)
    }

    /// Step the cursor back, returning the move it leaves
    pub fn go_back(&mut self) -> Result<&T> {
        let i = self.cursor.ok_or(EngineError::EmptyHistory)?;
        self.cursor = i.checked_sub(1);
        Ok(&self.moves[i])
    }

    /// Step the cursor forward, returning the move it reaches
    pub fn go_next(&mut self) -> Result<&T> {
        let next = self.played_len();
        if next >= self.moves.len() {
            return Err(EngineError::EmptyHistory);
        }
        self.cursor = Some(next);
        Ok(&self.moves[next])
    }
}
