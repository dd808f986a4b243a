use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mnk::board::{Board, Pos, Symbol};
use mnk::game::{GameState, PlayerData};
use mnk::rules::WinCondition;
use mnk::search::Searcher;

criterion_group!(benches, bench_alignment, bench_search);
criterion_main!(benches);

/// 7x7 board with a scattered midgame position
fn midgame_board() -> Board {
    let mut board = Board::new(vec![Symbol::Cross, Symbol::Circle], 7, 7).unwrap();
    let cells = [(3, 3), (2, 4), (4, 2), (3, 4), (2, 2), (4, 4), (1, 5), (5, 1)];
    for (i, &(r, c)) in cells.iter().enumerate() {
        board.place(i % 2, Pos::new(r, c)).unwrap();
    }
    board
}

pub fn bench_alignment(c: &mut Criterion) {
    let board = midgame_board();

    c.bench_function("alignment_7x7_k4", |b| {
        b.iter(|| black_box(&board).check_if_player_have_alignment(black_box(4)))
    });
    c.bench_function("open_lines_7x7_k4", |b| {
        b.iter(|| {
            black_box(&board).count_available_lines_of_at_least_given_piece(0, black_box(4), 2)
        })
    });
}

pub fn bench_search(c: &mut Criterion) {
    let state = GameState::new(
        midgame_board(),
        WinCondition::align(4).unwrap(),
        vec![PlayerData::default(); 2],
        0,
    )
    .unwrap();

    c.bench_function("search_7x7_depth3", |b| {
        b.iter(|| Searcher::new(3).search(black_box(&state)).unwrap())
    });
    c.bench_function("search_7x7_depth3_tt", |b| {
        b.iter(|| Searcher::with_tt(3, 1 << 16).search(black_box(&state)).unwrap())
    });
}
