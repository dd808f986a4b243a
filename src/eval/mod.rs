//! Position evaluation
//!
//! Contains:
//! - Open-line strength heuristic used at the search horizon

pub mod heuristic;

pub use heuristic::{evaluate, line_strength, MAX_HEURISTIC};
