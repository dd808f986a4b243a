//! Bitboard over a grid of at most 64 cells

/// Rigid motion of a rectangular grid.
///
/// Quarter turns and diagonal flips swap the grid's axes, so they only map a
/// board onto itself when it is square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    Rot90,
    Rot180,
    Rot270,
    FlipLR,
    FlipUD,
    Transpose,
    AntiTranspose,
}

impl Symmetry {
    /// Dihedral group of the square
    pub const SQUARE: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rot90,
        Symmetry::Rot180,
        Symmetry::Rot270,
        Symmetry::FlipLR,
        Symmetry::FlipUD,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    /// Symmetries of a non-square rectangle
    pub const RECTANGLE: [Symmetry; 4] = [
        Symmetry::Identity,
        Symmetry::Rot180,
        Symmetry::FlipLR,
        Symmetry::FlipUD,
    ];

    /// Motions mapping a `width` x `height` grid onto itself
    pub fn group(width: usize, height: usize) -> &'static [Symmetry] {
        if width == height {
            &Self::SQUARE
        } else {
            &Self::RECTANGLE
        }
    }

    /// True when the motion exchanges rows and columns
    #[inline]
    pub fn swaps_axes(self) -> bool {
        matches!(
            self,
            Symmetry::Rot90 | Symmetry::Rot270 | Symmetry::Transpose | Symmetry::AntiTranspose
        )
    }

    /// Image of cell (row, col) on a `width` x `height` grid
    #[inline]
    pub fn map(self, row: usize, col: usize, width: usize, height: usize) -> (usize, usize) {
        let (w, h) = (width - 1, height - 1);
        match self {
            Symmetry::Identity => (row, col),
            Symmetry::Rot90 => (col, h - row),
            Symmetry::Rot180 => (h - row, w - col),
            Symmetry::Rot270 => (w - col, row),
            Symmetry::FlipLR => (row, w - col),
            Symmetry::FlipUD => (h - row, col),
            Symmetry::Transpose => (col, row),
            Symmetry::AntiTranspose => (w - col, h - row),
        }
    }
}

/// SplitMix64 finalizer
#[inline]
pub(crate) fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Set of cells on a fixed `width` x `height` grid, bit `row * width + col`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitBoard {
    bits: u64,
    width: u8,
    height: u8,
}

impl BitBoard {
    /// Create an empty bitboard. The caller guarantees `width * height <= 64`.
    pub fn new(width: usize, height: usize) -> Self {
        debug_assert!(width * height <= 64);
        Self {
            bits: 0,
            width: width as u8,
            height: height as u8,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Mask with one bit per cell of the grid
    #[inline]
    pub fn full_mask(&self) -> u64 {
        grid_mask(self.width(), self.height())
    }

    /// Raw bitmap
    #[inline]
    pub fn value(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub fn or_with(&mut self, mask: u64) {
        self.bits |= mask & self.full_mask();
    }

    #[inline]
    pub fn and_with(&mut self, mask: u64) {
        self.bits &= mask;
    }

    #[inline]
    pub fn xor_with(&mut self, mask: u64) {
        self.bits ^= mask & self.full_mask();
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        debug_assert!(idx < self.width() * self.height());
        self.bits |= 1u64 << idx;
    }

    #[inline]
    pub fn clear(&mut self, idx: usize) {
        self.bits &= !(1u64 << idx);
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        (self.bits >> idx) & 1 == 1
    }

    /// Count set bits (popcount)
    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterate over indices of set bits, lowest first
    pub fn iter_ones(&self) -> BitIter {
        BitIter(self.bits)
    }

    /// Image of this set under a rigid motion.
    ///
    /// Axis-swapping motions produce a `height` x `width` bitboard.
    pub fn transform(&self, sym: Symmetry) -> BitBoard {
        let (width, height) = (self.width(), self.height());
        let (new_width, new_height) = if sym.swaps_axes() {
            (height, width)
        } else {
            (width, height)
        };

        let mut out = BitBoard::new(new_width, new_height);
        for idx in self.iter_ones() {
            let (r, c) = sym.map(idx / width, idx % width, width, height);
            out.set(r * new_width + c);
        }
        out
    }

    /// Hash invariant under every symmetry of the grid.
    ///
    /// Sums the same per-bitmap hash over the whole symmetry group, so two
    /// bitboards related by a rotation or flip collide on purpose. Distinct
    /// asymmetric positions may collide too; callers needing exactness must
    /// check a second signature.
    pub fn hash(&self) -> u64 {
        Symmetry::group(self.width(), self.height())
            .iter()
            .fold(0u64, |acc, &sym| acc.wrapping_add(mix64(self.transform(sym).bits)))
    }
}

/// Mask with the low `width * height` bits set
#[inline]
pub fn grid_mask(width: usize, height: usize) -> u64 {
    let cells = width * height;
    if cells >= 64 {
        u64::MAX
    } else {
        (1u64 << cells) - 1
    }
}

/// Iterator over set bit indices
pub struct BitIter(u64);

impl Iterator for BitIter {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        // Clear the bit we just found
        self.0 &= self.0 - 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}
