//! Board structure with alignment detection

use std::fmt;

use super::bitboard::{grid_mask, mix64, BitBoard, Symmetry};
use super::{Pos, Symbol, MAX_CELLS};
use crate::error::{EngineError, Result};

/// Direction vectors for alignment checking, in mask order
const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal →
    (1, 0),  // Vertical ↓
    (1, -1), // Diagonal ↙
    (1, 1),  // Diagonal ↘
];

/// Content of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Blocked,
    /// Occupied by the player with this index
    Piece(usize),
}

/// Game board: one bitboard per player plus one for blocked cells.
///
/// Players are referred to by index into the entity list. Pieces and blocked
/// cells never overlap, and `piece_count` / `blocked_count` always equal the
/// popcounts of the corresponding bitboards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    entities: Vec<Symbol>,
    pieces: Vec<BitBoard>,
    blocked: BitBoard,
    piece_count: u32,
    blocked_count: u32,
    /// `masks[len][dir]`: cells from which a `len`-long run fits in direction `dir`
    masks: Vec<[u64; 4]>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Accepts any `width * height <= 64`; the 3..=7 limits of regular games
    /// are enforced by [`super::BoardBuilder`].
    pub fn new(entities: Vec<Symbol>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width * height > MAX_CELLS {
            return Err(EngineError::InvalidConfiguration(format!(
                "board {}x{} must have between 1 and {} cells",
                width, height, MAX_CELLS
            )));
        }
        if entities.len() < 2 {
            return Err(EngineError::InvalidConfiguration(
                "a board needs at least two players".to_string(),
            ));
        }
        for (i, entity) in entities.iter().enumerate() {
            if entities[..i].contains(entity) {
                return Err(EngineError::InvalidConfiguration(format!(
                    "symbol {} used by two players",
                    entity
                )));
            }
        }

        let pieces = vec![BitBoard::new(width, height); entities.len()];
        Ok(Self {
            width,
            height,
            entities,
            pieces,
            blocked: BitBoard::new(width, height),
            piece_count: 0,
            blocked_count: 0,
            masks: compute_direction_masks(width, height),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn player_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Symbol] {
        &self.entities
    }

    /// Symbol of player `player`
    pub fn entity(&self, player: usize) -> Result<Symbol> {
        self.entities
            .get(player)
            .copied()
            .ok_or_else(|| EngineError::UnknownPlayer(format!("index {}", player)))
    }

    /// Index of the player drawing `symbol`
    pub fn player_index(&self, symbol: Symbol) -> Result<usize> {
        self.entities
            .iter()
            .position(|&e| e == symbol)
            .ok_or_else(|| EngineError::UnknownPlayer(symbol.to_string()))
    }

    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.height as i32 && col >= 0 && col < self.width as i32
    }

    /// Bit index of `pos`, or `InvalidCoordinate` when it is off the board
    #[inline]
    pub fn index(&self, pos: Pos) -> Result<usize> {
        if (pos.row as usize) < self.height && (pos.col as usize) < self.width {
            Ok(pos.to_index(self.width))
        } else {
            Err(EngineError::InvalidCoordinate {
                row: pos.row as i32,
                col: pos.col as i32,
            })
        }
    }

    #[inline]
    pub fn pos_at(&self, idx: usize) -> Pos {
        Pos::from_index(idx, self.width)
    }

    /// All positions, row by row
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.cell_count()).map(move |idx| self.pos_at(idx))
    }

    #[inline]
    pub(crate) fn check_player(&self, player: usize) -> Result<()> {
        if player < self.pieces.len() {
            Ok(())
        } else {
            Err(EngineError::UnknownPlayer(format!("index {}", player)))
        }
    }

    /// Content of the cell at bit index `idx`
    #[inline]
    pub(crate) fn cell_at(&self, idx: usize) -> Cell {
        if self.blocked.get(idx) {
            return Cell::Blocked;
        }
        match self.pieces.iter().position(|bb| bb.get(idx)) {
            Some(player) => Cell::Piece(player),
            None => Cell::Empty,
        }
    }

    pub fn cell(&self, pos: Pos) -> Result<Cell> {
        Ok(self.cell_at(self.index(pos)?))
    }

    #[inline]
    pub(crate) fn is_available_index(&self, idx: usize) -> bool {
        (self.available_mask() >> idx) & 1 == 1
    }

    /// True when the cell holds no piece and is not blocked
    pub fn is_case_available(&self, pos: Pos) -> Result<bool> {
        Ok(self.is_available_index(self.index(pos)?))
    }

    /// Put a piece of `player` on an available cell
    pub fn place(&mut self, player: usize, pos: Pos) -> Result<()> {
        self.check_player(player)?;
        let idx = self.index(pos)?;
        if !self.is_available_index(idx) {
            return Err(EngineError::InvalidMove(format!("cell {} is not available", pos)));
        }
        self.pieces[player].set(idx);
        self.piece_count += 1;
        Ok(())
    }

    /// Remove whatever piece stands on `pos`, returning its owner
    pub fn remove(&mut self, pos: Pos) -> Result<Option<usize>> {
        let idx = self.index(pos)?;
        Ok(match self.cell_at(idx) {
            Cell::Piece(player) => {
                self.pieces[player].clear(idx);
                self.piece_count -= 1;
                Some(player)
            }
            Cell::Empty | Cell::Blocked => None,
        })
    }

    /// Make an available cell permanently unplayable
    pub fn block(&mut self, pos: Pos) -> Result<()> {
        let idx = self.index(pos)?;
        if !self.is_available_index(idx) {
            return Err(EngineError::InvalidMove(format!("cell {} is not available", pos)));
        }
        self.blocked.set(idx);
        self.blocked_count += 1;
        Ok(())
    }

    pub fn unblock(&mut self, pos: Pos) -> Result<()> {
        let idx = self.index(pos)?;
        if self.blocked.get(idx) {
            self.blocked.clear(idx);
            self.blocked_count -= 1;
        }
        Ok(())
    }

    /// Overwrite a cell, keeping the counters in step
    pub(crate) fn set_cell(&mut self, idx: usize, cell: Cell) {
        match self.cell_at(idx) {
            Cell::Empty => {}
            Cell::Blocked => {
                self.blocked.clear(idx);
                self.blocked_count -= 1;
            }
            Cell::Piece(player) => {
                self.pieces[player].clear(idx);
                self.piece_count -= 1;
            }
        }
        match cell {
            Cell::Empty => {}
            Cell::Blocked => {
                self.blocked.set(idx);
                self.blocked_count += 1;
            }
            Cell::Piece(player) => {
                self.pieces[player].set(idx);
                self.piece_count += 1;
            }
        }
    }

    /// Block every available cell in `mask`
    pub(crate) fn block_mask(&mut self, mask: u64) {
        let mask = mask & self.available_mask();
        self.blocked.or_with(mask);
        self.blocked_count = self.blocked.count();
    }

    /// Pieces of `player`
    pub fn pieces(&self, player: usize) -> Result<&BitBoard> {
        self.check_player(player)?;
        Ok(&self.pieces[player])
    }

    #[inline]
    pub fn blocked(&self) -> &BitBoard {
        &self.blocked
    }

    #[inline]
    pub fn piece_count(&self) -> u32 {
        self.piece_count
    }

    #[inline]
    pub fn blocked_count(&self) -> u32 {
        self.blocked_count
    }

    /// Cells holding any piece
    #[inline]
    pub fn occupied_mask(&self) -> u64 {
        self.pieces.iter().fold(0, |acc, bb| acc | bb.value())
    }

    /// Cells where a piece can still be placed
    #[inline]
    pub fn available_mask(&self) -> u64 {
        grid_mask(self.width, self.height) & !(self.occupied_mask() | self.blocked.value())
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.available_mask() == 0
    }

    /// Longest run that fits on the board
    #[inline]
    pub fn max_run(&self) -> usize {
        self.width.max(self.height)
    }

    /// Start cells of `len`-long runs in direction `dir` (0: →, 1: ↓, 2: ↙, 3: ↘)
    pub fn direction_mask(&self, len: usize, dir: usize) -> u64 {
        self.masks.get(len).map_or(0, |m| m[dir])
    }

    /// Bit distance between consecutive cells of a run in direction `dir`
    #[inline]
    fn shift(&self, dir: usize) -> u32 {
        let (dr, dc) = DIRECTIONS[dir];
        (dr * self.width as i32 + dc) as u32
    }

    /// Does `player` own `len` consecutive cells in some direction?
    pub fn check_alignment_for_player(&self, player: usize, len: usize) -> Result<bool> {
        self.check_player(player)?;
        Ok(self.has_alignment(player, len))
    }

    /// Shift-and-mask run detection: after `len - 1` rounds of
    /// `x &= x >> shift`, bit `b` survives iff a run of `len` starts at `b`.
    /// The direction mask drops runs that would wrap past a row end.
    pub(crate) fn has_alignment(&self, player: usize, len: usize) -> bool {
        let bits = self.pieces[player].value();
        if len <= 1 {
            return bits != 0;
        }
        let Some(masks) = self.masks.get(len) else {
            return false;
        };

        for (dir, &mask) in masks.iter().enumerate() {
            // No run fits; the shift may also reach the word size on wide boards
            if mask == 0 {
                continue;
            }
            let shift = self.shift(dir);
            let mut x = bits;
            for _ in 1..len {
                if x == 0 {
                    break;
                }
                x &= x >> shift;
            }
            if x & mask != 0 {
                return true;
            }
        }
        false
    }

    /// First player owning a `len`-long run, if any
    pub fn check_if_player_have_alignment(&self, len: usize) -> Option<usize> {
        (0..self.pieces.len()).find(|&player| self.has_alignment(player, len))
    }

    /// Count `len`-long segments holding at least `min_pieces` of `player`'s
    /// pieces and nothing that prevents `player` from completing them
    /// (opponent pieces or blocked cells).
    pub fn count_available_lines_of_at_least_given_piece(
        &self,
        player: usize,
        len: usize,
        min_pieces: u32,
    ) -> Result<u32> {
        self.check_player(player)?;
        Ok(self.count_open_lines(player, len, min_pieces))
    }

    pub(crate) fn count_open_lines(&self, player: usize, len: usize, min_pieces: u32) -> u32 {
        if len == 0 {
            return 0;
        }
        let Some(masks) = self.masks.get(len) else {
            return 0;
        };
        let mine = self.pieces[player].value();
        let obstacles = (self.occupied_mask() & !mine) | self.blocked.value();

        let mut count = 0;
        for (dir, &mask) in masks.iter().enumerate() {
            if mask == 0 {
                continue;
            }
            let shift = self.shift(dir);

            // Bit b of `spread` is set when any of b, b+s, .., b+(len-1)s is an obstacle
            let mut spread = obstacles;
            let mut shifted = obstacles;
            for _ in 1..len {
                shifted >>= shift;
                spread |= shifted;
            }

            let open_starts = mask & !spread;
            let mut bits = open_starts;
            while bits != 0 {
                let start = bits.trailing_zeros();
                bits &= bits - 1;

                let mut run = 0u64;
                for i in 0..len as u32 {
                    run |= 1u64 << (start + i * shift);
                }
                if (mine & run).count_ones() >= min_pieces {
                    count += 1;
                }
            }
        }
        count
    }

    /// Hash shared by every rotation / reflection of the position
    pub fn hash(&self) -> u64 {
        Symmetry::group(self.width, self.height)
            .iter()
            .fold(0u64, |acc, &sym| {
                let mut h = mix64(self.blocked.transform(sym).value());
                for bb in &self.pieces {
                    h = mix64(h ^ bb.transform(sym).value());
                }
                acc.wrapping_add(h)
            })
    }
}

fn compute_direction_masks(width: usize, height: usize) -> Vec<[u64; 4]> {
    let max_len = width.max(height);
    (0..=max_len)
        .map(|len| {
            let reach = len.saturating_sub(1) as i32;
            let mut masks = [0u64; 4];
            for (dir, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
                for r in 0..height {
                    for c in 0..width {
                        let end_r = r as i32 + dr * reach;
                        let end_c = c as i32 + dc * reach;
                        if end_r >= 0 && end_r < height as i32 && end_c >= 0 && end_c < width as i32 {
                            masks[dir] |= 1u64 << (r * width + c);
                        }
                    }
                }
            }
            masks
        })
        .collect()
}

/// Column letters on top, rows numbered from 1 downwards
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.width {
            write!(f, " {} ", (b'a' + col as u8) as char)?;
        }
        writeln!(f)?;

        for row in 0..self.height {
            write!(f, "{:>2} ", row + 1)?;
            for col in 0..self.width {
                let c = match self.cell_at(row * self.width + col) {
                    Cell::Empty => ' ',
                    Cell::Blocked => '#',
                    Cell::Piece(player) => self.entities[player].to_char(),
                };
                write!(f, "[{}]", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
