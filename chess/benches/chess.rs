use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tilechess::{
    movegen::{self, legal, semilegal},
    Board, Color, Coord, Game,
};

const POSITIONS: &[(&str, &str)] = &[
    ("start", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
    (
        "kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    ),
    ("endgame_rooks", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"),
    (
        "promotions",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    ),
    (
        "checks",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    ),
    ("castling", "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"),
    ("lone_queen", "2k5/8/8/8/3Q4/8/8/R3K2R w KQ - 0 1"),
    ("mated", "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
];

fn boards() -> impl Iterator<Item = (&'static str, Board)> {
    POSITIONS
        .iter()
        .map(|&(name, fen)| (name, Board::from_fen(fen).unwrap()))
}

fn bench_gen_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_moves");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| black_box(semilegal::gen_all(&board).len()))
        });
    }
}

fn bench_gen_legal(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_legal");
    for (name, board) in boards() {
        group.bench_function(name, |b| b.iter(|| black_box(legal::gen_all(&board).len())));
    }
}

fn bench_gen_per_tile(c: &mut Criterion) {
    let mut group = c.benchmark_group("gen_per_tile");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| {
                for coord in Coord::iter() {
                    black_box(board.moves_from(coord).len());
                }
            })
        });
    }
}

fn bench_apply_unmake(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_unmake");
    for (name, board) in boards() {
        let moves = legal::gen_all(&board);
        let mut game = Game::from_board(board);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    game.apply(*mv).unwrap();
                    black_box(game.unmake_last());
                }
            })
        });
    }
}

fn bench_make_move_checked(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_move_checked");
    for (name, board) in boards() {
        let moves = semilegal::gen_all(&board);
        group.bench_function(name, |b| {
            b.iter(|| {
                for mv in &moves {
                    black_box(board.make_move(*mv).is_ok());
                }
            })
        });
    }
}

fn bench_is_attacked(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_attacked");
    for (name, board) in boards() {
        group.bench_function(name, |b| {
            b.iter(|| {
                for color in [Color::White, Color::Black] {
                    for coord in Coord::iter() {
                        black_box(movegen::is_cell_attacked(&board, coord, color));
                    }
                }
            })
        });
    }
}

fn bench_has_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_legal_moves");
    for (name, board) in boards() {
        group.bench_function(name, |b| b.iter(|| black_box(board.has_legal_moves())));
    }
}

criterion_group!(
    chess,
    bench_gen_moves,
    bench_gen_legal,
    bench_gen_per_tile,
    bench_apply_unmake,
    bench_make_move_checked,
    bench_is_attacked,
    bench_has_legal_moves,
);

criterion_main!(chess);
