//! Board representation for m,n,k games

pub mod bitboard;
pub mod board;
pub mod builder;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// Re-exports
pub use bitboard::{BitBoard, Symmetry};
pub use board::{Board, Cell};
pub use builder::{shape_mask, BoardBuilder, Shape};

/// Largest number of cells a bitboard can hold
pub const MAX_CELLS: usize = 64;
/// Smallest side accepted by the board builder
pub const MIN_SIDE: usize = 3;
/// Largest side accepted by the board builder
pub const MAX_SIDE: usize = 7;
/// Columns are written as a single letter
pub const MAX_NOTATION_COLUMNS: usize = 26;

/// Player token drawn on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cross,
    Circle,
    Triangle,
    Hexagon,
    Star,
    Square,
    Rhombus,
}

impl Symbol {
    pub const ALL: [Symbol; 7] = [
        Symbol::Cross,
        Symbol::Circle,
        Symbol::Triangle,
        Symbol::Hexagon,
        Symbol::Star,
        Symbol::Square,
        Symbol::Rhombus,
    ];

    /// Character used by the console display
    #[inline]
    pub fn to_char(self) -> char {
        match self {
            Symbol::Cross => 'X',
            Symbol::Circle => 'O',
            Symbol::Triangle => '^',
            Symbol::Hexagon => 'H',
            Symbol::Star => '*',
            Symbol::Square => 'S',
            Symbol::Rhombus => 'R',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Cross => "cross",
            Symbol::Circle => "circle",
            Symbol::Triangle => "triangle",
            Symbol::Hexagon => "hexagon",
            Symbol::Star => "star",
            Symbol::Square => "square",
            Symbol::Rhombus => "rhombus",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Bit index of this cell on a board `width` cells wide
    #[inline]
    pub fn to_index(self, width: usize) -> usize {
        self.row as usize * width + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize, width: usize) -> Self {
        Self {
            row: (idx / width) as u8,
            col: (idx % width) as u8,
        }
    }

    /// Twice the Manhattan distance to the center of a `width` x `height` board.
    ///
    /// Doubling keeps the value integral on even-sized boards.
    #[inline]
    pub fn center_distance2(self, width: usize, height: usize) -> u32 {
        let dr = (2 * self.row as i32 - (height as i32 - 1)).unsigned_abs();
        let dc = (2 * self.col as i32 - (width as i32 - 1)).unsigned_abs();
        dr + dc
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

/// Written as column letter then 1-based row, e.g. `a1`
impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = (b'a' + self.col) as char;
        write!(f, "{}{}", letter, self.row as u32 + 1)
    }
}

impl FromStr for Pos {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMove(format!("cannot parse coordinate {:?}", s));

        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return Err(invalid());
        }
        let row: u32 = chars.as_str().parse().map_err(|_| invalid())?;
        if row == 0 || row > u8::MAX as u32 {
            return Err(invalid());
        }

        Ok(Pos::new((row - 1) as u8, letter as u8 - b'a'))
    }
}
