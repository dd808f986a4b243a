//! Alpha-beta minimax with an optional transposition table
//!
//! The search maximises for the player to move at the root and minimises for
//! everybody else. Scores are from the root player's point of view:
//!
//! - heuristic leaves lie strictly inside (-1, 1)
//! - decided games score plus or minus the win reward, which shrinks as the
//!   board fills, so faster wins and slower losses are preferred
//!
//! Moves are tried centre first. A move that wins for the mover ends the node
//! at once, since no alternative can do better for them.
//!
//! # Example
//!
//! ```
//! use mnk::board::{Board, Pos, Symbol};
//! use mnk::game::{GameState, PlayerData};
//! use mnk::rules::{Move, WinCondition};
//! use mnk::search::Searcher;
//!
//! let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 3, 3).unwrap();
//! let mut state = GameState::new(
//!     board,
//!     WinCondition::align(3).unwrap(),
//!     vec![PlayerData::default(); 2],
//!     0,
//! )
//! .unwrap();
//! for m in ["a1", "a2", "b1", "b2"] {
//!     state.play(m.parse().unwrap()).unwrap();
//! }
//!
//! let mut searcher = Searcher::new(2);
//! let result = searcher.search(&state).unwrap();
//! assert_eq!(result.best_move, Some(Move::Simple(Pos::new(0, 2))));
//! ```

use std::time::Instant;

use log::{debug, trace};

use crate::board::Board;
use crate::error::Result;
use crate::game::GameState;
use crate::rules::{Move, Outcome};

use super::{EntryType, TTStats, TranspositionTable, ZobristTable};

/// Unbounded alpha-beta window
const INF: f64 = f64::INFINITY;

/// Divisor keeping the tiebreak far below one heuristic step
const TIEBREAK_SCALE: f64 = 1000.0;

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes where the window closed before every move was tried
    pub cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score
    pub tt_score_hits: u64,
    /// TT probes that only provided a move for ordering
    pub tt_move_hits: u64,
}

impl SearchStats {
    /// TT score hit rate
    pub fn tt_score_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_score_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Best move found, if any
    pub best_move: Option<Move>,
    /// Score of the best move for the player to move
    pub score: f64,
    /// Depth searched
    pub depth: u32,
    /// Total nodes searched
    pub nodes: u64,
    /// Search diagnostics
    pub stats: SearchStats,
}

/// Sort moves centre first, ties broken by (column, row).
///
/// The sort is stable, so moves on the same cell keep their relative order.
pub fn order_moves(moves: &mut [Move], board: &Board) {
    let (width, height) = (board.width(), board.height());
    moves.sort_by_key(|mv| {
        let pos = mv.pos();
        (pos.center_distance2(width, height), pos.col, pos.row)
    });
}

/// Fixed-depth alpha-beta searcher
pub struct Searcher {
    depth: u32,
    tt: Option<TranspositionTable>,
    zobrist: ZobristTable,
    nodes: u64,
    stats: SearchStats,
}

impl Searcher {
    /// Searcher without a transposition table
    #[must_use]
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            tt: None,
            zobrist: ZobristTable::new(),
            nodes: 0,
            stats: SearchStats::default(),
        }
    }

    /// Searcher caching results in a table of `entries` slots
    #[must_use]
    pub fn with_tt(depth: u32, entries: usize) -> Self {
        Self {
            tt: Some(TranspositionTable::new(entries)),
            ..Self::new(depth)
        }
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.depth = depth;
    }

    fn reset(&mut self) {
        self.nodes = 0;
        self.stats = SearchStats::default();
    }

    /// Best move for the player to move.
    ///
    /// Works on a copy of `state`; `best_move` is `None` when the depth is
    /// zero or nothing can be played.
    pub fn search(&mut self, state: &GameState) -> Result<SearchResult> {
        let start = Instant::now();
        self.reset();

        let mut work = state.clone();
        let root = work.current_player();
        let (score, best_move) = self.minimax(&mut work, self.depth, root, -INF, INF)?;

        debug!(
            "depth {} best {} score {:.4}: {} nodes, {} cutoffs, tt {}/{} in {:?}",
            self.depth,
            best_move.map_or_else(|| "-".to_string(), |m| m.to_string()),
            score,
            self.nodes,
            self.stats.cutoffs,
            self.stats.tt_score_hits,
            self.stats.tt_probes,
            start.elapsed()
        );

        Ok(SearchResult {
            best_move,
            score,
            depth: self.depth,
            nodes: self.nodes,
            stats: self.stats.clone(),
        })
    }

    /// Shorthand for the move of [`search`](Self::search)
    pub fn best_move(&mut self, state: &GameState) -> Result<Option<Move>> {
        Ok(self.search(state)?.best_move)
    }

    /// Score of every legal root move, searched one ply shallower with a full
    /// window, in search order
    pub fn moves_scores(&mut self, state: &GameState) -> Result<Vec<(Move, f64)>> {
        let start = Instant::now();
        self.reset();

        let mut work = state.clone();
        let root = work.current_player();
        let mut moves = work.possible_moves();
        order_moves(&mut moves, work.board());

        self.nodes += 1;
        let mut scores = Vec::with_capacity(moves.len());
        for mv in moves {
            let outcome = work.play(mv)?;
            let child = match terminal_score(&work, outcome, root) {
                Some(score) => Ok(score),
                None => self
                    .minimax(&mut work, self.depth.saturating_sub(1), root, -INF, INF)
                    .map(|(score, _)| score),
            };
            work.undo()?;
            let score = child?;

            trace!("{} -> {:.4}", mv, score);
            scores.push((mv, score));
        }

        debug!(
            "scored {} moves at depth {}: {} nodes in {:?}",
            scores.len(),
            self.depth,
            self.nodes,
            start.elapsed()
        );
        Ok(scores)
    }

    /// Nodes visited by the last [`search`](Self::search) or
    /// [`moves_scores`](Self::moves_scores)
    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> Option<TTStats> {
        self.tt.as_ref().map(TranspositionTable::stats)
    }

    /// Clear the transposition table.
    pub fn clear_tt(&mut self) {
        if let Some(tt) = self.tt.as_mut() {
            tt.clear();
        }
    }

    fn minimax(
        &mut self,
        state: &mut GameState,
        depth: u32,
        root: usize,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<(f64, Option<Move>)> {
        self.nodes += 1;

        if depth == 0 {
            return Ok((state.evaluate_for_player(root)?, None));
        }

        let mut moves = state.possible_moves();
        if moves.is_empty() {
            return Ok((state.evaluate_for_player(root)?, None));
        }

        // Probe: exact scores searched deep enough end the node, anything
        // else only promotes the stored move
        let key = self
            .tt
            .as_ref()
            .map(|_| (state.board().hash(), self.zobrist.signature(state, root)));
        let mut tt_move = None;
        if let (Some(tt), Some((hash, signature))) = (self.tt.as_ref(), key) {
            self.stats.tt_probes += 1;
            if let Some(entry) = tt
                .get(hash, signature, depth)
                .filter(|e| e.entry_type == EntryType::Exact)
            {
                self.stats.tt_score_hits += 1;
                return Ok((entry.score, entry.best_move));
            }
            if let Some(entry) = tt.probe(hash, signature) {
                self.stats.tt_move_hits += 1;
                tt_move = entry.best_move;
            }
        }

        order_moves(&mut moves, state.board());
        if let Some(first) = tt_move {
            if let Some(i) = moves.iter().position(|&mv| mv == first) {
                moves[..=i].rotate_right(1);
            }
        }

        let to_play = state.current_player();
        let maximize = to_play == root;
        let (alpha_orig, beta_orig) = (alpha, beta);
        let spread = TIEBREAK_SCALE * moves.len() as f64;

        let mut best_score = if maximize { -INF } else { INF };
        let mut best_move = None;
        let mut tiebreak = 0.0;

        for mv in moves {
            if alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }

            let outcome = state.play(mv)?;
            let child = match terminal_score(state, outcome, root) {
                Some(score) => Ok(score),
                None => self
                    .minimax(state, depth - 1, root, alpha, beta)
                    .map(|(score, _)| score),
            };
            state.undo()?;
            let score = child?;

            if outcome.winner() == Some(to_play) {
                self.store(key, depth, score, EntryType::Exact, Some(mv));
                return Ok((score, Some(mv)));
            }

            let improves = if maximize {
                score > best_score
            } else {
                score < best_score
            };
            if improves {
                best_score = score;
                best_move = Some(mv);
            } else {
                tiebreak += score / spread;
            }

            if maximize {
                alpha = alpha.max(best_score);
            } else {
                beta = beta.min(best_score);
            }
        }

        let entry_type = if best_score <= alpha_orig {
            EntryType::UpperBound
        } else if best_score >= beta_orig {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        // Only exact values carry the tiebreak; bounds stay on their side of the window
        let score = match entry_type {
            EntryType::Exact => best_score + tiebreak,
            _ => best_score,
        };
        self.store(key, depth, score, entry_type, best_move);

        Ok((score, best_move))
    }

    fn store(
        &mut self,
        key: Option<(u64, u64)>,
        depth: u32,
        score: f64,
        entry_type: EntryType,
        best_move: Option<Move>,
    ) {
        if let (Some(tt), Some((hash, signature))) = (self.tt.as_mut(), key) {
            tt.put(hash, signature, depth, score, entry_type, best_move);
        }
    }
}

/// Score of a finished game for `root`, `None` while play goes on
fn terminal_score(state: &GameState, outcome: Outcome, root: usize) -> Option<f64> {
    match outcome {
        Outcome::Unfinished => None,
        Outcome::Draw => Some(0.0),
        Outcome::Victory(winner) if winner == root => Some(state.win_reward()),
        Outcome::Victory(_) => Some(-state.win_reward()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Pos, Symbol};
    use crate::game::PlayerData;
    use crate::rules::{MoveKind, WinCondition};
    use pretty_assertions::assert_eq;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn state_with(
        width: usize,
        height: usize,
        win: WinCondition,
        pieces: &[(usize, u8, u8)],
        to_move: usize,
    ) -> GameState {
        let mut board = Board::new(vec![Symbol::Cross, Symbol::Circle], width, height).unwrap();
        for &(p, r, c) in pieces {
            board.place(p, Pos::new(r, c)).unwrap();
        }
        GameState::new(board, win, vec![PlayerData::default(); 2], to_move).unwrap()
    }

    fn searchers(depth: u32) -> [Searcher; 2] {
        [Searcher::new(depth), Searcher::with_tt(depth, 1 << 12)]
    }

    #[test]
    fn test_depth_one_tactical_win() {
        let state = state_with(
            3,
            3,
            WinCondition::align(3).unwrap(),
            &[(0, 0, 0), (0, 0, 1), (1, 1, 0), (1, 1, 1)],
            0,
        );
        for mut searcher in searchers(1) {
            let result = searcher.search(&state).unwrap();
            assert_eq!(result.best_move, Some(Move::Simple(Pos::new(0, 2))));
            assert!(result.score >= 1.0);
        }
    }

    #[test]
    fn test_forced_block() {
        let state = state_with(
            3,
            3,
            WinCondition::align(3).unwrap(),
            &[(1, 0, 0), (1, 0, 1)],
            0,
        );
        for mut searcher in searchers(3) {
            assert_eq!(
                searcher.best_move(&state).unwrap(),
                Some(Move::Simple(Pos::new(0, 2)))
            );
        }
    }

    #[test]
    fn test_prefers_faster_win() {
        // X can win now on the top row, or play elsewhere and win later
        let state = state_with(
            4,
            4,
            WinCondition::align(3).unwrap(),
            &[(0, 0, 0), (0, 0, 1), (1, 3, 0), (1, 3, 3)],
            0,
        );
        for mut searcher in searchers(3) {
            let result = searcher.search(&state).unwrap();
            assert_eq!(result.best_move, Some(Move::Simple(Pos::new(0, 2))));
            // Five pieces on sixteen cells
            assert_eq!(result.score, 7.0);
        }
    }

    #[test]
    fn test_misere_avoids_completing_a_run() {
        // Completing the top row would hand the game to O
        let state = state_with(
            3,
            3,
            WinCondition::misere(3).unwrap(),
            &[(0, 0, 0), (0, 0, 1), (1, 1, 1), (1, 2, 2)],
            0,
        );
        for mut searcher in searchers(2) {
            let scores = searcher.moves_scores(&state).unwrap();
            let top_right = scores
                .iter()
                .find(|(mv, _)| *mv == Move::Simple(Pos::new(0, 2)))
                .unwrap()
                .1;
            assert!(top_right <= -1.0);

            let best = searcher.best_move(&state).unwrap().unwrap();
            assert_ne!(best, Move::Simple(Pos::new(0, 2)));
        }
    }

    #[test]
    fn test_moves_scores_covers_every_move() {
        let state = state_with(
            3,
            3,
            WinCondition::align(3).unwrap(),
            &[(0, 1, 1), (1, 0, 0)],
            0,
        );
        let mut searcher = Searcher::new(2);
        let scores = searcher.moves_scores(&state).unwrap();
        assert_eq!(scores.len(), 7);

        // Search order: centre distance, then column, then row
        let order: Vec<String> = scores.iter().map(|(mv, _)| mv.to_string()).collect();
        assert_eq!(order, vec!["a2", "b1", "b3", "c2", "a3", "c1", "c3"]);
    }

    #[test]
    fn test_moves_scores_reports_immediate_wins() {
        let state = state_with(
            3,
            3,
            WinCondition::align(3).unwrap(),
            &[(0, 0, 0), (0, 0, 1), (1, 1, 0), (1, 1, 1)],
            0,
        );
        let mut searcher = Searcher::new(3);
        let scores = searcher.moves_scores(&state).unwrap();
        let (best, score) = scores
            .iter()
            .copied()
            .fold((None, -INF), |acc, (mv, s)| if s > acc.1 { (Some(mv), s) } else { acc });
        assert_eq!(best, Some(Move::Simple(Pos::new(0, 2))));
        // Five pieces on a 3x3 board
        assert_eq!(score, 3.0);
    }

    #[test]
    fn test_order_moves() {
        let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 4, 3).unwrap();
        let mut moves: Vec<Move> = board.positions().map(Move::Simple).collect();
        order_moves(&mut moves, &board);
        let first: Vec<String> = moves.iter().take(4).map(|m| m.to_string()).collect();
        assert_eq!(first, vec!["b2", "c2", "a2", "b1"]);
        assert_eq!(moves.last().unwrap().to_string(), "d3");

        let mut mixed = vec![
            Move::Bomb(Pos::new(0, 0)),
            Move::Simple(Pos::new(0, 0)),
            Move::Simple(Pos::new(1, 1)),
        ];
        order_moves(&mut mixed, &board);
        assert_eq!(mixed[0], Move::Simple(Pos::new(1, 1)));
        assert_eq!(mixed[1], Move::Bomb(Pos::new(0, 0)));
    }

    #[test]
    fn test_search_leaves_state_unchanged() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 4, 4).unwrap();
        let mut state = GameState::new(
            board,
            WinCondition::align(3).unwrap(),
            vec![PlayerData::new(&[MoveKind::Bomb]); 2],
            0,
        )
        .unwrap();
        for _ in 0..4 {
            let moves = state.possible_moves();
            state.play(*moves.choose(&mut rng).unwrap()).unwrap();
        }
        state.go_back().unwrap();

        let before = state.clone();
        for mut searcher in searchers(3) {
            searcher.search(&state).unwrap();
            assert_eq!(state, before);
            searcher.moves_scores(&state).unwrap();
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_tt_agrees_with_plain_search() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..10 {
            let mut state = state_with(4, 4, WinCondition::align(3).unwrap(), &[], 0);
            for _ in 0..3 {
                let moves = state.possible_moves();
                state.play(*moves.choose(&mut rng).unwrap()).unwrap();
            }
            if state.check_win().is_terminal() {
                continue;
            }

            let plain = Searcher::new(3).search(&state).unwrap();
            let cached = Searcher::with_tt(3, 1 << 12).search(&state).unwrap();
            assert!(
                (plain.score - cached.score).abs() < 0.1,
                "{} vs {}",
                plain.score,
                cached.score
            );
        }
    }

    #[test]
    fn test_tt_is_used_and_cleared() {
        let state = state_with(4, 4, WinCondition::align(3).unwrap(), &[(0, 1, 1)], 1);
        let mut searcher = Searcher::with_tt(4, 1 << 12);
        let result = searcher.search(&state).unwrap();
        assert!(result.nodes > 0);
        assert!(result.stats.tt_probes > 0);
        assert!(searcher.tt_stats().unwrap().used > 0);

        searcher.clear_tt();
        assert_eq!(searcher.tt_stats().unwrap().used, 0);
        assert_eq!(Searcher::new(2).tt_stats(), None);
    }

    #[test]
    fn test_depth_zero_returns_no_move() {
        let state = state_with(3, 3, WinCondition::align(3).unwrap(), &[], 0);
        let result = Searcher::new(0).search(&state).unwrap();
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_full_board_has_no_move() {
        // X O X / X O O / O X X
        let state = state_with(
            3,
            3,
            WinCondition::align(3).unwrap(),
            &[
                (0, 0, 0),
                (1, 0, 1),
                (0, 0, 2),
                (0, 1, 0),
                (1, 1, 1),
                (1, 1, 2),
                (1, 2, 0),
                (0, 2, 1),
                (0, 2, 2),
            ],
            0,
        );
        assert_eq!(Searcher::new(2).best_move(&state).unwrap(), None);
    }

    #[test]
    fn test_repeated_search_hits_the_table() {
        let state = state_with(4, 4, WinCondition::align(3).unwrap(), &[(0, 1, 1)], 1);
        let mut searcher = Searcher::with_tt(3, 1 << 12);
        let first = searcher.search(&state).unwrap();
        let second = searcher.search(&state).unwrap();
        assert_eq!(second.stats.tt_score_hits, 1);
        assert_eq!(second.nodes, 1);
        assert_eq!(second.best_move, first.best_move);
        assert_eq!(second.score, first.score);
    }

    /// Plain minimax over terminal rewards, no pruning and no tiebreak
    fn reference_value(state: &mut GameState, root: usize) -> f64 {
        let maximize = state.current_player() == root;
        let mut best = if maximize { f64::NEG_INFINITY } else { f64::INFINITY };
        let moves = state.possible_moves();
        if moves.is_empty() {
            return 0.0;
        }
        for mv in moves {
            let value = child_reference(state, mv, root);
            best = if maximize { best.max(value) } else { best.min(value) };
        }
        best
    }

    fn child_reference(state: &mut GameState, mv: Move, root: usize) -> f64 {
        let outcome = state.play(mv).unwrap();
        let value = match terminal_score(state, outcome, root) {
            Some(score) => score,
            None => reference_value(state, root),
        };
        state.undo().unwrap();
        value
    }

    fn random_positions(
        rng: &mut ChaCha8Rng,
        size: usize,
        win: WinCondition,
        plies: std::ops::RangeInclusive<usize>,
        count: usize,
    ) -> Vec<GameState> {
        let mut positions = Vec::with_capacity(count);
        while positions.len() < count {
            let mut state = state_with(size, size, win, &[], 0);
            let target = rng.gen_range(plies.clone());
            let mut finished = false;
            for _ in 0..target {
                let moves = state.possible_moves();
                if state.play(*moves.choose(rng).unwrap()).unwrap().is_terminal() {
                    finished = true;
                    break;
                }
            }
            if !finished {
                positions.push(state);
            }
        }
        positions
    }

    /// Full-depth search must agree with plain minimax once the tiebreak is
    /// rounded away, and must pick a move achieving that value
    fn assert_matches_reference(state: &GameState) {
        let mut work = state.clone();
        let root = work.current_player();
        let depth = work.board().available_mask().count_ones();
        let expected = reference_value(&mut work, root);

        for mut searcher in searchers(depth) {
            let result = searcher.search(state).unwrap();
            assert_eq!(result.score.round(), expected, "{}", state.board());
            let best = result.best_move.unwrap();
            assert_eq!(
                child_reference(&mut work, best, root),
                expected,
                "{} chosen on\n{}",
                best,
                state.board()
            );

            for (mv, score) in searcher.moves_scores(state).unwrap() {
                assert_eq!(
                    score.round(),
                    child_reference(&mut work, mv, root),
                    "{} on\n{}",
                    mv,
                    state.board()
                );
            }
        }
    }

    #[test]
    fn test_full_depth_matches_minimax_3x3() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x33);
        for win in [WinCondition::align(3).unwrap(), WinCondition::misere(3).unwrap()] {
            for state in random_positions(&mut rng, 3, win, 1..=5, 8) {
                assert_matches_reference(&state);
            }
        }
    }

    #[test]
    fn test_full_depth_matches_minimax_4x4() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x44);
        for state in random_positions(&mut rng, 4, WinCondition::align(3).unwrap(), 8..=9, 4) {
            assert_matches_reference(&state);
        }
    }

    #[test]
    fn test_does_not_walk_into_forced_loss() {
        // X b2, O c3, X b3, O b1; a3 lets O force a win
        let mut state = state_with(3, 3, WinCondition::align(3).unwrap(), &[], 0);
        for notation in ["b2", "c3", "b3", "b1"] {
            state.play(notation.parse().unwrap()).unwrap();
        }
        let a3: Move = "a3".parse().unwrap();
        let mut work = state.clone();
        assert!(child_reference(&mut work, a3, 0) < 0.0);
        let expected = reference_value(&mut work, 0);

        for mut searcher in searchers(5) {
            let best = searcher.best_move(&state).unwrap().unwrap();
            assert_ne!(best, a3);
            assert_eq!(child_reference(&mut work, best, 0), expected);
        }
        assert_matches_reference(&state);
    }

    #[test]
    fn test_perfect_self_play_draws() {
        for mut searcher in searchers(9) {
            let mut state = state_with(3, 3, WinCondition::align(3).unwrap(), &[], 0);
            let outcome = loop {
                let mv = searcher.best_move(&state).unwrap().unwrap();
                let outcome = state.play(mv).unwrap();
                if outcome.is_terminal() {
                    break outcome;
                }
            };
            assert_eq!(outcome, Outcome::Draw);
        }
    }
}
