//! Board construction: dimensions, shape masks and random blocked cells

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use super::bitboard::BitBoard;
use super::{Board, Symbol, MAX_CELLS, MAX_SIDE, MIN_SIDE};
use crate::error::{EngineError, Result};

/// Playable region of a shaped board; cells outside it are blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Triangle widening from a single top cell to the full bottom row
    Pyramidal,
    /// Inscribed ellipse
    Circular,
    /// Inscribed rhombus
    Diamond,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Pyramidal, Shape::Circular, Shape::Diamond];
}

const EPSILON: f64 = 1e-9;

/// Mask of the cells a shape blocks on a `width` x `height` board
pub fn shape_mask(shape: Shape, width: usize, height: usize) -> u64 {
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;

    let mut mask = 0u64;
    for r in 0..height {
        for c in 0..width {
            let (rf, cf) = (r as f64, c as f64);
            let blocked = match shape {
                Shape::Pyramidal => {
                    let half = if height > 1 {
                        cx * rf / (height as f64 - 1.0) + 0.5
                    } else {
                        cx + 0.5
                    };
                    (cf - cx).abs() > half + EPSILON
                }
                Shape::Circular => {
                    let radius = (width as f64 - 0.9) / 2.0;
                    let dx = (cf - cx) / radius;
                    let dy = (rf - cy) / radius;
                    dx * dx + dy * dy > 1.0
                }
                Shape::Diamond => {
                    let rx = width as f64 / 2.0;
                    let ry = height as f64 / 2.0;
                    (cf - cx).abs() / rx + (rf - cy).abs() / ry >= 1.0 - EPSILON
                }
            };
            if blocked {
                mask |= 1u64 << (r * width + c);
            }
        }
    }
    mask
}

/// Builder for regular game boards (sides 3..=7)
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    entities: Vec<Symbol>,
    width: usize,
    height: usize,
    shape: Option<Shape>,
    random_blocks: usize,
}

impl BoardBuilder {
    pub fn new(entities: Vec<Symbol>, width: usize, height: usize) -> Self {
        Self {
            entities,
            width,
            height,
            shape: None,
            random_blocks: 0,
        }
    }

    #[must_use]
    pub fn shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Number of uniformly random available cells to block after shaping
    #[must_use]
    pub fn random_blocks(mut self, count: usize) -> Self {
        self.random_blocks = count;
        self
    }

    fn validate(&self) -> Result<()> {
        let side_ok = |n: usize| (MIN_SIDE..=MAX_SIDE).contains(&n);
        if !side_ok(self.width) || !side_ok(self.height) {
            return Err(EngineError::InvalidConfiguration(format!(
                "board sides must be between {} and {}, got {}x{}",
                MIN_SIDE, MAX_SIDE, self.width, self.height
            )));
        }
        if self.width * self.height > MAX_CELLS {
            return Err(EngineError::InvalidConfiguration(format!(
                "board {}x{} exceeds {} cells",
                self.width, self.height, MAX_CELLS
            )));
        }
        Ok(())
    }

    /// Build the board, drawing blocked cells from `rng`
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Board> {
        self.validate()?;

        let mut board = Board::new(self.entities, self.width, self.height)?;
        if let Some(shape) = self.shape {
            board.block_mask(shape_mask(shape, self.width, self.height));
        }

        if self.random_blocks > 0 {
            let mut available = BitBoard::new(self.width, self.height);
            available.or_with(board.available_mask());
            let candidates: Vec<usize> = available.iter_ones().collect();
            if self.random_blocks > candidates.len() {
                return Err(EngineError::InvalidConfiguration(format!(
                    "cannot block {} cells, only {} available",
                    self.random_blocks,
                    candidates.len()
                )));
            }
            let mask = candidates
                .choose_multiple(rng, self.random_blocks)
                .fold(0u64, |acc, &idx| acc | (1u64 << idx));
            board.block_mask(mask);
        }

        debug!(
            "built {}x{} board, shape {:?}, {} blocked cells",
            board.width(),
            board.height(),
            self.shape,
            board.blocked_count()
        );
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn players() -> Vec<Symbol> {
        vec![Symbol::Cross, Symbol::Circle]
    }

    fn render(mask: u64, width: usize, height: usize) -> Vec<String> {
        (0..height)
            .map(|r| {
                (0..width)
                    .map(|c| if mask >> (r * width + c) & 1 == 1 { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_rejects_out_of_range_sides() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for (w, h) in [(2, 3), (3, 2), (8, 3), (3, 8)] {
            let err = BoardBuilder::new(players(), w, h).build(&mut rng).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfiguration(_)), "{}x{}", w, h);
        }
    }

    #[test]
    fn test_smallest_and_largest_boards() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let small = BoardBuilder::new(players(), 3, 3).build(&mut rng).unwrap();
        assert_eq!(small.cell_count(), 9);
        let large = BoardBuilder::new(players(), 7, 7).build(&mut rng).unwrap();
        assert_eq!(large.cell_count(), 49);
        assert_eq!(large.blocked_count(), 0);
    }

    #[test]
    fn test_pyramid_shape() {
        assert_eq!(
            render(shape_mask(Shape::Pyramidal, 5, 5), 5, 5),
            vec!["##.##", "#...#", "#...#", ".....", "....."]
        );
    }

    #[test]
    fn test_diamond_shape() {
        assert_eq!(
            render(shape_mask(Shape::Diamond, 5, 5), 5, 5),
            vec!["##.##", "#...#", ".....", "#...#", "##.##"]
        );
        assert_eq!(
            render(shape_mask(Shape::Diamond, 3, 3), 3, 3),
            vec!["#.#", "...", "#.#"]
        );
    }

    #[test]
    fn test_circular_shape() {
        assert_eq!(
            render(shape_mask(Shape::Circular, 7, 7), 7, 7),
            vec![
                "###.###", "#.....#", "#.....#", ".......", "#.....#", "#.....#", "###.###"
            ]
        );
    }

    #[test]
    fn test_shapes_are_symmetric_left_right() {
        for shape in Shape::ALL {
            for (w, h) in [(3, 3), (4, 5), (6, 4), (7, 7)] {
                let rows = render(shape_mask(shape, w, h), w, h);
                for row in rows {
                    let reversed: String = row.chars().rev().collect();
                    assert_eq!(row, reversed, "{:?} {}x{}", shape, w, h);
                }
            }
        }
    }

    #[test]
    fn test_shape_sets_blocked_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let board = BoardBuilder::new(players(), 5, 5)
            .shape(Shape::Diamond)
            .build(&mut rng)
            .unwrap();
        assert_eq!(board.blocked().value(), shape_mask(Shape::Diamond, 5, 5));
        assert_eq!(board.blocked_count(), 12);
    }

    #[test]
    fn test_random_blocks() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let board = BoardBuilder::new(players(), 4, 4)
            .random_blocks(5)
            .build(&mut rng)
            .unwrap();
        assert_eq!(board.blocked_count(), 5);
        assert_eq!(board.blocked().count(), 5);
    }

    #[test]
    fn test_random_blocks_after_shape_avoid_shape_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let shape = shape_mask(Shape::Diamond, 5, 5);
        let board = BoardBuilder::new(players(), 5, 5)
            .shape(Shape::Diamond)
            .random_blocks(13)
            .build(&mut rng)
            .unwrap();
        assert_eq!(board.blocked_count(), 25);
        assert_eq!(board.blocked().value() & shape, shape);
    }

    #[test]
    fn test_too_many_random_blocks() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let err = BoardBuilder::new(players(), 3, 3)
            .random_blocks(10)
            .build(&mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration(_)));
    }
}
