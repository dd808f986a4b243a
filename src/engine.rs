//! Computer players built on the alpha-beta searcher
//!
//! Four strengths are available. `Impossible` always plays the best move found
//! at the configured depth. The other levels score every legal move and draw
//! one at random, favouring good moves more sharply as the level rises:
//!
//! ```text
//! p(m) = softmax(sign(s) * |s|^strength),  strength = 1 (easy), 2 (medium), 5 (hard)
//! ```
//!
//! # Example
//!
//! ```
//! use mnk::board::{Board, Symbol};
//! use mnk::engine::{AIEngine, AiLevel};
//! use mnk::game::{GameState, PlayerData};
//! use mnk::rules::WinCondition;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 3, 3).unwrap();
//! let state = GameState::new(
//!     board,
//!     WinCondition::align(3).unwrap(),
//!     vec![PlayerData::default(); 2],
//!     0,
//! )
//! .unwrap();
//!
//! let mut engine = AIEngine::new(AiLevel::Medium, 3);
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let result = engine.get_move(&state, &mut rng).unwrap();
//! assert!(result.best_move.is_some());
//! ```

use std::fmt;
use std::time::Instant;

use log::{debug, warn};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::GameState;
use crate::rules::Move;
use crate::search::{SearchResult, Searcher, TTStats};

/// Transposition table slots per engine
pub const DEFAULT_TT_ENTRIES: usize = 1 << 16;

/// Strength of a computer player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiLevel {
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl AiLevel {
    /// Exponent applied to move scores before sampling; `None` plays the best move
    #[inline]
    pub fn strength(self) -> Option<u32> {
        match self {
            AiLevel::Easy => Some(1),
            AiLevel::Medium => Some(2),
            AiLevel::Hard => Some(5),
            AiLevel::Impossible => None,
        }
    }
}

impl fmt::Display for AiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiLevel::Easy => "easy",
            AiLevel::Medium => "medium",
            AiLevel::Hard => "hard",
            AiLevel::Impossible => "impossible",
        };
        f.write_str(name)
    }
}

/// How the engine picked its move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Only one legal move
    ForcedMove,
    /// Best move of a full alpha-beta search
    AlphaBeta,
    /// Drawn from the weighted root scores
    Sampled,
}

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    /// Chosen move, if any
    pub best_move: Option<Move>,
    /// Score of the chosen move for the player to move
    pub score: f64,
    /// Type of search that found this move
    pub search_type: SearchType,
    /// Time taken in milliseconds
    pub time_ms: u64,
    /// Number of nodes searched
    pub nodes: u64,
}

impl MoveResult {
    #[inline]
    fn forced(mv: Move, time_ms: u64) -> Self {
        Self {
            best_move: Some(mv),
            score: 0.0,
            search_type: SearchType::ForcedMove,
            time_ms,
            nodes: 1,
        }
    }

    #[inline]
    fn from_alphabeta(result: SearchResult, time_ms: u64) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            search_type: SearchType::AlphaBeta,
            time_ms,
            nodes: result.nodes,
        }
    }
}

/// Pick a move from root scores.
///
/// Each score is raised to `strength` keeping its sign, then the move is
/// drawn from the softmax of those values. Returns `None` for an empty list.
pub fn sample_move<R: Rng + ?Sized>(
    scores: &[(Move, f64)],
    strength: u32,
    rng: &mut R,
) -> Option<Move> {
    let powered: Vec<f64> = scores
        .iter()
        .map(|&(_, s)| s.signum() * s.abs().powi(strength as i32))
        .collect();
    let max = powered.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Shifting by the maximum keeps exp() finite; the top move weighs 1
    let weights: Vec<f64> = powered.iter().map(|&v| (v - max).exp()).collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => Some(scores[dist.sample(rng)].0),
        Err(err) => {
            if !scores.is_empty() {
                warn!("cannot weight move scores ({}), playing the best one", err);
            }
            powered
                .iter()
                .position(|&v| v == max)
                .map(|i| scores[i].0)
        }
    }
}

/// Computer player.
///
/// Owns its searcher, so the transposition table persists between moves.
/// The game state passed in is never modified.
pub struct AIEngine {
    searcher: Searcher,
    level: AiLevel,
}

impl AIEngine {
    /// Engine searching `depth` plies (at least one) with a transposition table
    #[must_use]
    pub fn new(level: AiLevel, depth: u32) -> Self {
        Self::with_searcher(level, Searcher::with_tt(depth.max(1), DEFAULT_TT_ENTRIES))
    }

    #[must_use]
    pub fn with_searcher(level: AiLevel, searcher: Searcher) -> Self {
        Self { searcher, level }
    }

    #[inline]
    pub fn level(&self) -> AiLevel {
        self.level
    }

    pub fn set_level(&mut self, level: AiLevel) {
        self.level = level;
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.searcher.depth()
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.searcher.set_depth(depth.max(1));
    }

    /// Move for the player to move, chosen according to the engine's level
    pub fn get_move<R: Rng + ?Sized>(&mut self, state: &GameState, rng: &mut R) -> Result<MoveResult> {
        let start = Instant::now();

        let moves = state.possible_moves();
        if let [only] = moves.as_slice() {
            return Ok(MoveResult::forced(*only, elapsed_ms(start)));
        }

        let Some(strength) = self.level.strength() else {
            return self.advice(state);
        };

        let scores = self.searcher.moves_scores(state)?;
        let best_move = sample_move(&scores, strength, rng);
        let score = best_move
            .and_then(|mv| scores.iter().find(|(m, _)| *m == mv))
            .map_or(0.0, |&(_, s)| s);
        let result = MoveResult {
            best_move,
            score,
            search_type: SearchType::Sampled,
            time_ms: elapsed_ms(start),
            nodes: self.searcher.nodes(),
        };
        debug!(
            "{} engine sampled {:?} (score {:.3}) among {} moves",
            self.level,
            result.best_move,
            result.score,
            scores.len()
        );
        Ok(result)
    }

    /// Best move at the configured depth, whatever the level
    pub fn advice(&mut self, state: &GameState) -> Result<MoveResult> {
        let start = Instant::now();
        let result = self.searcher.search(state)?;
        Ok(MoveResult::from_alphabeta(result, elapsed_ms(start)))
    }

    /// Clear the transposition table.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
    }

    #[must_use]
    pub fn tt_stats(&self) -> Option<TTStats> {
        self.searcher.tt_stats()
    }
}

#[inline]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
