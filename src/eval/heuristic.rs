//! Heuristic evaluation of unfinished positions
//!
//! A player's strength counts the segments of winning length that they could
//! still complete, weighting each by how many pieces they already hold in it.
//! The score compares one player's strength with everybody else's:
//!
//! ```text
//! strength(q) = sum over l in 2..k of 2l * open_lines(q, k, l)
//! score(p)    = (strength(p) - others) / (strength(p) + others)
//! ```

use crate::board::Board;

/// Largest magnitude a heuristic score may take.
///
/// Keeps every heuristic value strictly inside (-1, 1), below any win reward.
pub const MAX_HEURISTIC: f64 = 0.99;

/// Weighted count of open segments of length `align_length` for `player`
#[must_use]
pub fn line_strength(board: &Board, player: usize, align_length: usize) -> f64 {
    (2..align_length)
        .map(|pieces| {
            let lines = board.count_open_lines(player, align_length, pieces as u32);
            2.0 * pieces as f64 * f64::from(lines)
        })
        .sum()
}

/// Score of the position for `player`, in `[-MAX_HEURISTIC, MAX_HEURISTIC]`.
///
/// Returns 0 when nobody has any open segment with two pieces or more.
/// The caller must pass a valid player index.
#[must_use]
pub fn evaluate(board: &Board, player: usize, align_length: usize) -> f64 {
    let mine = line_strength(board, player, align_length);
    let theirs: f64 = (0..board.player_count())
        .filter(|&other| other != player)
        .map(|other| line_strength(board, other, align_length))
        .sum();

    let total = mine + theirs;
    if total == 0.0 {
        return 0.0;
    }
    ((mine - theirs) / total).clamp(-MAX_HEURISTIC, MAX_HEURISTIC)
}
