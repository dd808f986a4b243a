//! Zobrist signatures for verifying transposition table hits
//!
//! The board hash used to index the table is shared by every rotation and
//! reflection of a position, so a slot may hold a different (if symmetric)
//! position. The Zobrist signature tells them apart: it XORs one random key
//! per (cell, player) token, per blocked cell, for the side to move, for the
//! player the search maximises and for each power-up still held.

use crate::board::{Symbol, MAX_CELLS};
use crate::game::GameState;
use crate::rules::MoveKind;

const MAX_PLAYERS: usize = Symbol::ALL.len();
/// Power-up counts above this share a key
const MAX_POWER_UPS: usize = 3;

/// Zobrist key table.
///
/// Keys come from a fixed-seed generator, so signatures are reproducible
/// across runs.
pub struct ZobristTable {
    pieces: [[u64; MAX_CELLS]; MAX_PLAYERS],
    blocked: [u64; MAX_CELLS],
    to_move: [u64; MAX_PLAYERS],
    root: [u64; MAX_PLAYERS],
    bombs: [[u64; MAX_POWER_UPS + 1]; MAX_PLAYERS],
    /// Salted by board dimensions so a table survives a change of board
    dimensions: [u64; MAX_CELLS + 1],
}

impl ZobristTable {
    #[must_use]
    pub fn new() -> Self {
        // Knuth's MMIX LCG
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            seed
        };

        let mut pieces = [[0u64; MAX_CELLS]; MAX_PLAYERS];
        for player in pieces.iter_mut() {
            for key in player.iter_mut() {
                *key = next_rand();
            }
        }
        let blocked = std::array::from_fn(|_| next_rand());
        let to_move = std::array::from_fn(|_| next_rand());
        let root = std::array::from_fn(|_| next_rand());
        let bombs = std::array::from_fn(|_| std::array::from_fn(|_| next_rand()));
        let dimensions = std::array::from_fn(|_| next_rand());

        Self {
            pieces,
            blocked,
            to_move,
            root,
            bombs,
            dimensions,
        }
    }

    /// Signature of `state` searched on behalf of `root`
    #[must_use]
    pub fn signature(&self, state: &GameState, root: usize) -> u64 {
        let board = state.board();
        let mut h = self.dimensions[board.width()] ^ self.dimensions[board.height()].rotate_left(1);

        for player in 0..board.player_count().min(MAX_PLAYERS) {
            if let Ok(pieces) = board.pieces(player) {
                for idx in pieces.iter_ones() {
                    h ^= self.pieces[player][idx];
                }
            }
        }
        for idx in board.blocked().iter_ones() {
            h ^= self.blocked[idx];
        }

        for (player, data) in state.players().iter().enumerate().take(MAX_PLAYERS) {
            let bombs = data
                .power_ups()
                .iter()
                .filter(|&&kind| kind == MoveKind::Bomb)
                .count();
            h ^= self.bombs[player][bombs.min(MAX_POWER_UPS)];
        }

        h ^ self.to_move[state.current_player() % MAX_PLAYERS] ^ self.root[root % MAX_PLAYERS]
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, Pos};
    use crate::game::PlayerData;
    use crate::rules::{Move, WinCondition};

    fn state(bombs: bool) -> GameState {
        let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 3, 3).unwrap();
        let power_ups: &[MoveKind] = if bombs { &[MoveKind::Bomb] } else { &[] };
        GameState::new(
            board,
            WinCondition::align(3).unwrap(),
            vec![PlayerData::new(power_ups); 2],
            0,
        )
        .unwrap()
    }

    fn play(s: &mut GameState, moves: &[&str]) {
        for m in moves {
            s.play(m.parse().unwrap()).unwrap();
        }
    }

    #[test]
    fn test_deterministic() {
        let s = state(false);
        assert_eq!(
            ZobristTable::new().signature(&s, 0),
            ZobristTable::new().signature(&s, 0)
        );
    }

    #[test]
    fn test_same_position_different_path() {
        let zt = ZobristTable::new();
        let mut a = state(false);
        let mut b = state(false);
        play(&mut a, &["a1", "b2", "c3"]);
        play(&mut b, &["c3", "b2", "a1"]);
        assert_eq!(zt.signature(&a, 0), zt.signature(&b, 0));
    }

    #[test]
    fn test_distinguishes_symmetric_positions() {
        let zt = ZobristTable::new();
        let mut a = state(false);
        let mut b = state(false);
        play(&mut a, &["a1"]);
        play(&mut b, &["c3"]);
        assert_eq!(a.board().hash(), b.board().hash());
        assert_ne!(zt.signature(&a, 0), zt.signature(&b, 0));
    }

    #[test]
    fn test_distinguishes_side_root_and_power_ups() {
        let zt = ZobristTable::new();
        let s = state(true);
        let base = zt.signature(&s, 0);
        assert_ne!(base, zt.signature(&s, 1));
        assert_ne!(base, zt.signature(&state(false), 0));

        let mut bombed = state(true);
        bombed.play(Move::Bomb(Pos::new(1, 1))).unwrap();
        let mut waited = state(true);
        play(&mut waited, &["a1"]);
        waited.undo().unwrap();
        // Same empty board, but the bomb is spent and the turn has passed
        assert_eq!(waited.board(), bombed.board());
        assert_ne!(zt.signature(&waited, 0), zt.signature(&bombed, 0));
    }

    #[test]
    fn test_blocked_cells_count() {
        let zt = ZobristTable::new();
        let board = Board::new(vec![Symbol::Cross, Symbol::Circle], 3, 3).unwrap();
        let mut blocked = board.clone();
        blocked.block(Pos::new(0, 0)).unwrap();

        let win = WinCondition::align(3).unwrap();
        let players = vec![PlayerData::default(); 2];
        let a = GameState::new(board, win, players.clone(), 0).unwrap();
        let b = GameState::new(blocked, win, players, 0).unwrap();
        assert_ne!(zt.signature(&a, 0), zt.signature(&b, 0));
    }
}
