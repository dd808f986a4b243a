//! Search module for m,n,k games
//!
//! Contains:
//! - Zobrist signatures for verifying cached positions
//! - Transposition table for caching search results
//! - Alpha-beta minimax with centre-first move ordering

pub mod alphabeta;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{order_moves, SearchResult, SearchStats, Searcher};
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
