//! Move kinds and their effect on the board
//!
//! A move is a plain value. Applying it to a board yields a [`MoveRecord`]
//! holding everything needed to take it back, so the board never keeps a
//! reference to move objects.
//!
//! Notation: `a1` places a piece in column `a`, row 1; `bc3` drops a bomb
//! centred on `c3`.

use std::fmt;
use std::str::FromStr;

use crate::board::{Board, Cell, Pos};
use crate::error::{EngineError, Result};

/// Constructor of a move, used for power-up bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKind {
    /// Place the mover's piece on an available cell
    Simple,
    /// Clear the 3x3 neighbourhood of any cell, blocks included
    Bomb,
}

impl MoveKind {
    /// Kinds that must be granted to a player before use
    pub const POWER_UPS: [MoveKind; 1] = [MoveKind::Bomb];

    #[inline]
    pub fn is_power_up(self) -> bool {
        !matches!(self, MoveKind::Simple)
    }

    /// Can a move of this kind target `pos`?
    pub fn can_play(self, board: &Board, pos: Pos) -> bool {
        match self {
            MoveKind::Simple => board.is_case_available(pos).unwrap_or(false),
            MoveKind::Bomb => board.index(pos).is_ok(),
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Simple => f.write_str("simple"),
            MoveKind::Bomb => f.write_str("bomb"),
        }
    }
}

/// A move targeting one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Simple(Pos),
    Bomb(Pos),
}

impl Move {
    #[inline]
    pub fn new(kind: MoveKind, pos: Pos) -> Self {
        match kind {
            MoveKind::Simple => Move::Simple(pos),
            MoveKind::Bomb => Move::Bomb(pos),
        }
    }

    #[inline]
    pub fn pos(self) -> Pos {
        match self {
            Move::Simple(pos) | Move::Bomb(pos) => pos,
        }
    }

    #[inline]
    pub fn kind(self) -> MoveKind {
        match self {
            Move::Simple(_) => MoveKind::Simple,
            Move::Bomb(_) => MoveKind::Bomb,
        }
    }

    #[inline]
    pub fn can_play(self, board: &Board) -> bool {
        self.kind().can_play(board, self.pos())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Simple(pos) => write!(f, "{}", pos),
            Move::Bomb(pos) => write!(f, "b{}", pos),
        }
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim().to_ascii_lowercase();
        let bytes = text.as_bytes();
        // `b` followed by a column letter is a bomb; `b7` is a plain move in column b
        if bytes.len() > 2 && bytes[0] == b'b' && bytes[1].is_ascii_lowercase() {
            let pos = text[1..]
                .parse::<Pos>()
                .map_err(|_| EngineError::InvalidMove(format!("cannot parse move {:?}", s)))?;
            return Ok(Move::Bomb(pos));
        }
        text.parse::<Pos>()
            .map(Move::Simple)
            .map_err(|_| EngineError::InvalidMove(format!("cannot parse move {:?}", s)))
    }
}

/// Largest neighbourhood a bomb can clear
const BOMB_AREA: usize = 9;

/// An applied move and what it displaced.
///
/// For a bomb, `cleared` lists every on-board cell of the neighbourhood with
/// its content before the blast, in row-major order. Simple moves clear
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub mv: Move,
    pub player: usize,
    cleared: [(usize, Cell); BOMB_AREA],
    cleared_len: u8,
}

impl MoveRecord {
    fn new(mv: Move, player: usize) -> Self {
        Self {
            mv,
            player,
            cleared: [(0, Cell::Empty); BOMB_AREA],
            cleared_len: 0,
        }
    }

    #[inline]
    fn push(&mut self, idx: usize, cell: Cell) {
        self.cleared[self.cleared_len as usize] = (idx, cell);
        self.cleared_len += 1;
    }

    /// Cells overwritten by the move as (bit index, previous content)
    #[inline]
    pub fn cleared(&self) -> &[(usize, Cell)] {
        &self.cleared[..self.cleared_len as usize]
    }
}

/// Bit indices of the 3x3 block centred on `pos`, clipped to the grid
fn neighbourhood(board: &Board, pos: Pos) -> impl Iterator<Item = usize> + '_ {
    let (row, col) = (pos.row as i32, pos.col as i32);
    (-1..=1).flat_map(move |dr| {
        (-1..=1).filter_map(move |dc| {
            let (r, c) = (row + dr, col + dc);
            board
                .contains(r, c)
                .then(|| Pos::new(r as u8, c as u8).to_index(board.width()))
        })
    })
}

/// Play `mv` for `player`.
///
/// Fails without touching the board when the move cannot be played.
pub fn apply(board: &mut Board, mv: Move, player: usize) -> Result<MoveRecord> {
    board.check_player(player)?;
    let mut record = MoveRecord::new(mv, player);

    match mv {
        Move::Simple(pos) => board.place(player, pos)?,
        Move::Bomb(pos) => {
            board.index(pos)?;
            let cells: Vec<usize> = neighbourhood(board, pos).collect();
            for idx in cells {
                record.push(idx, board.cell_at(idx));
                board.set_cell(idx, Cell::Empty);
            }
        }
    }
    Ok(record)
}

/// Take back a move previously returned by [`apply`] on this board
pub fn revert(board: &mut Board, record: &MoveRecord) -> Result<()> {
    match record.mv {
        Move::Simple(pos) => match board.cell(pos)? {
            Cell::Piece(_) => {
                board.remove(pos)?;
                Ok(())
            }
            Cell::Empty | Cell::Blocked => Err(EngineError::InvalidMove(format!(
                "no piece to take back at {}",
                pos
            ))),
        },
        Move::Bomb(_) => {
            for &(idx, cell) in record.cleared().iter().rev() {
                board.set_cell(idx, cell);
            }
            Ok(())
        }
    }
}
