//! Win condition checking
//!
//! Two variants share the same alignment test:
//! 1. Align(k): the first player with k in a row wins
//! 2. Misère(k): a player completing k in a row hands the win to the next player
//!
//! A full board without a decisive alignment is a draw.

use std::fmt;

use crate::board::Board;
use crate::error::{EngineError, Result};
use crate::eval;

/// Shortest alignment a game may be played to
pub const MIN_ALIGN_LENGTH: usize = 3;

/// Result of checking a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Unfinished,
    Draw,
    /// Won by the player with this index
    Victory(usize),
}

impl Outcome {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::Unfinished)
    }

    #[inline]
    pub fn winner(self) -> Option<usize> {
        match self {
            Outcome::Victory(player) => Some(player),
            Outcome::Unfinished | Outcome::Draw => None,
        }
    }
}

/// What completing an alignment does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Goal {
    /// Aligning wins
    Align,
    /// Aligning loses; the next player wins
    Misere,
}

/// A goal together with its alignment length (at least 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WinCondition {
    goal: Goal,
    length: usize,
}

impl WinCondition {
    pub fn new(goal: Goal, length: usize) -> Result<Self> {
        if length < MIN_ALIGN_LENGTH {
            return Err(EngineError::InvalidConfiguration(format!(
                "alignment length must be at least {}, got {}",
                MIN_ALIGN_LENGTH, length
            )));
        }
        Ok(Self { goal, length })
    }

    /// Align `length` to win
    pub fn align(length: usize) -> Result<Self> {
        Self::new(Goal::Align, length)
    }

    /// Align `length` to lose
    pub fn misere(length: usize) -> Result<Self> {
        Self::new(Goal::Misere, length)
    }

    #[inline]
    pub fn goal(&self) -> Goal {
        self.goal
    }

    #[inline]
    pub fn align_length(&self) -> usize {
        self.length
    }

    /// Player credited with the win when `aligner` completes a run
    #[inline]
    fn winner_for(&self, aligner: usize, board: &Board) -> usize {
        match self.goal {
            Goal::Align => aligner,
            Goal::Misere => (aligner + 1) % board.player_count(),
        }
    }

    /// Outcome of the position, checking every player in index order
    pub fn check_win(&self, board: &Board) -> Outcome {
        match board.check_if_player_have_alignment(self.length) {
            Some(aligner) => Outcome::Victory(self.winner_for(aligner, board)),
            None if board.is_full() => Outcome::Draw,
            None => Outcome::Unfinished,
        }
    }

    /// Outcome of the position considering only alignments by `player`
    pub fn check_win_for_player(&self, player: usize, board: &Board) -> Result<Outcome> {
        Ok(if board.check_alignment_for_player(player, self.length)? {
            Outcome::Victory(self.winner_for(player, board))
        } else if board.is_full() {
            Outcome::Draw
        } else {
            Outcome::Unfinished
        })
    }

    /// Heuristic value of the position for `player`, strictly inside (-1, 1)
    pub fn evaluate_for_player(&self, player: usize, board: &Board) -> Result<f64> {
        board.check_player(player)?;
        let score = eval::evaluate(board, player, self.length);
        Ok(match self.goal {
            Goal::Align => score,
            Goal::Misere => -score,
        })
    }
}

impl fmt::Display for WinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.goal {
            Goal::Align => write!(f, "align {} to win", self.length),
            Goal::Misere => write!(f, "align {} to lose", self.length),
        }
    }
}
