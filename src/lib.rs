//! Generalized m,n,k tic-tac-toe engine
//!
//! Two or more players take turns placing pieces on a W x H board (at most 64
//! cells, possibly with blocked cells). A player wins by aligning k pieces in a
//! row, column or diagonal, or under misère rules loses by doing so. Optional
//! bomb power-ups clear a 3x3 neighbourhood.
//!
//! # Architecture
//!
//! - [`board`]: bitboards, alignment detection, symmetric hashing, board shapes
//! - [`rules`]: moves (simple and bomb) and win conditions
//! - [`eval`]: line-strength heuristic
//! - [`game`]: game state with undo/redo history, JSON configuration
//! - [`search`]: alpha-beta search with an optional transposition table
//! - [`engine`]: computer players of four strengths
//!
//! # Quick Start
//!
//! ```
//! use mnk::{AIEngine, AiLevel, Game, GameConfig, Outcome};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let mut game = Game::new(&GameConfig::default(), &mut rng).unwrap();
//! let mut engine = AIEngine::new(AiLevel::Impossible, 9);
//!
//! // Perfect play on 3x3 is a draw
//! let outcome = loop {
//!     let result = engine.get_move(game.state(), &mut rng).unwrap();
//!     let outcome = game.play(result.best_move.unwrap()).unwrap();
//!     if outcome.is_terminal() {
//!         break outcome;
//!     }
//! };
//! assert_eq!(outcome, Outcome::Draw);
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, BoardBuilder, Cell, Pos, Shape, Symbol};
pub use engine::{AIEngine, AiLevel, MoveResult, SearchType};
pub use error::{EngineError, Result};
pub use game::{Game, GameConfig, GameState, PlayerData};
pub use rules::{Move, MoveKind, Outcome, WinCondition};
pub use search::Searcher;
