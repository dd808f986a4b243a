//! Transposition table for caching search results
//!
//! Entries are indexed by the symmetry-aware board hash and carry a Zobrist
//! signature; a lookup only succeeds when both match.
//!
//! # Example
//!
//! ```
//! use mnk::board::Pos;
//! use mnk::rules::Move;
//! use mnk::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1024);
//!
//! let (hash, signature) = (0x1234_5678_9ABC_DEF0, 42);
//! tt.put(hash, signature, 3, 0.5, EntryType::Exact, Some(Move::Simple(Pos::new(1, 1))));
//!
//! let entry = tt.get(hash, signature, 2).unwrap();
//! assert_eq!(entry.score, 0.5);
//! assert!(tt.get(hash, signature, 4).is_none());
//! ```

use crate::rules::Move;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - every move was searched inside the window
    Exact,
    /// Lower bound - the node failed high
    LowerBound,
    /// Upper bound - the node failed low
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    /// Symmetric board hash of the position
    pub hash: u64,
    /// Zobrist signature of the position
    pub signature: u64,
    /// Remaining depth the score was searched to
    pub depth: u32,
    /// Score from the root player's point of view
    pub score: f64,
    pub entry_type: EntryType,
    /// Best move found for this position
    pub best_move: Option<Move>,
}

/// Direct-mapped transposition table.
///
/// Each hash maps to exactly one slot, `hash % size`. A slot is overwritten
/// when empty or when the new result is searched at least as deep.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a table with `size` slots (at least one)
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            entries: vec![None; size],
            size,
        }
    }

    #[inline]
    fn slot(&self, hash: u64) -> usize {
        (hash % self.size as u64) as usize
    }

    /// Entry stored for this position, whatever its depth.
    ///
    /// Used for move ordering when the stored score is not usable.
    #[must_use]
    pub fn probe(&self, hash: u64, signature: u64) -> Option<&TTEntry> {
        self.entries[self.slot(hash)]
            .as_ref()
            .filter(|e| e.hash == hash && e.signature == signature)
    }

    /// Entry for this position searched at least `depth` deep
    #[must_use]
    pub fn get(&self, hash: u64, signature: u64, depth: u32) -> Option<&TTEntry> {
        self.probe(hash, signature).filter(|e| e.depth >= depth)
    }

    /// Store a search result using depth-preferred replacement
    pub fn put(
        &mut self,
        hash: u64,
        signature: u64,
        depth: u32,
        score: f64,
        entry_type: EntryType,
        best_move: Option<Move>,
    ) {
        let idx = self.slot(hash);

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => depth >= e.depth,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                signature,
                depth,
                score,
                entry_type,
                best_move,
            });
        }
    }

    /// Clear all entries in the table.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        TTStats {
            size: self.size,
            used,
            usage_percent: (used as f64 / self.size as f64 * 100.0) as u8,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn mv(row: u8, col: u8) -> Option<Move> {
        Some(Move::Simple(Pos::new(row, col)))
    }

    #[test]
    fn test_put_and_get() {
        let mut tt = TranspositionTable::new(64);
        tt.put(7, 100, 3, 1.5, EntryType::Exact, mv(0, 0));

        let entry = tt.get(7, 100, 3).unwrap();
        assert_eq!(entry.score, 1.5);
        assert_eq!(entry.best_move, mv(0, 0));
        assert!(tt.get(7, 100, 2).is_some());
        assert!(tt.get(7, 100, 4).is_none());
    }

    #[test]
    fn test_signature_mismatch_misses() {
        let mut tt = TranspositionTable::new(64);
        tt.put(7, 100, 3, 1.5, EntryType::Exact, mv(0, 0));
        assert!(tt.get(7, 101, 1).is_none());
        assert!(tt.probe(7, 101).is_none());
        // Same slot, different hash
        assert!(tt.probe(7 + 64, 100).is_none());
    }

    #[test]
    fn test_depth_preferred_replacement() {
        let mut tt = TranspositionTable::new(16);
        tt.put(1, 10, 4, 1.0, EntryType::Exact, mv(0, 0));

        // Shallower result for a colliding position does not replace
        tt.put(17, 20, 2, 2.0, EntryType::Exact, mv(1, 1));
        assert!(tt.probe(17, 20).is_none());
        assert_eq!(tt.probe(1, 10).unwrap().score, 1.0);

        // Equal depth replaces
        tt.put(17, 20, 4, 2.0, EntryType::LowerBound, mv(1, 1));
        assert!(tt.probe(1, 10).is_none());
        let entry = tt.probe(17, 20).unwrap();
        assert_eq!(entry.entry_type, EntryType::LowerBound);
        assert_eq!(entry.best_move, mv(1, 1));
    }

    #[test]
    fn test_probe_ignores_depth() {
        let mut tt = TranspositionTable::new(16);
        tt.put(5, 5, 1, -0.25, EntryType::UpperBound, mv(2, 2));
        assert!(tt.get(5, 5, 6).is_none());
        assert_eq!(tt.probe(5, 5).unwrap().best_move, mv(2, 2));
    }

    #[test]
    fn test_stats_and_clear() {
        let mut tt = TranspositionTable::new(4);
        assert_eq!(
            tt.stats(),
            TTStats {
                size: 4,
                used: 0,
                usage_percent: 0
            }
        );
        tt.put(0, 0, 1, 0.0, EntryType::Exact, None);
        tt.put(1, 0, 1, 0.0, EntryType::Exact, None);
        assert_eq!(tt.stats().used, 2);
        assert_eq!(tt.stats().usage_percent, 50);

        tt.clear();
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let mut tt = TranspositionTable::new(0);
        tt.put(3, 3, 1, 0.0, EntryType::Exact, None);
        assert_eq!(tt.stats().size, 1);
        assert!(tt.probe(3, 3).is_some());
    }
}
