//! End-to-end search scenarios.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use karst_core::{Board, Move, generate_all};
use karst_engine::search::{MATE_THRESHOLD, SearchResult, Searcher};
use karst_engine::{SearchControl, bench};

fn search_fen(fen: &str, depth: i32) -> SearchResult {
    let mut board: Board = fen.parse().unwrap();
    let mut searcher = Searcher::with_hash_mb(4);
    let control = SearchControl::infinite(Arc::new(AtomicBool::new(false)));
    searcher.search(&mut board, depth, &control, |_| {})
}

/// Two rooks against a bare king with castling still available: a depth-6
/// search must see the forced mate 1.Ra7 Kd8 (or Kf8) 2.Rh8#.
#[test]
fn finds_forced_mate_with_castling_available() {
    let result = search_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", 6);
    assert!(
        result.score >= MATE_THRESHOLD,
        "expected a mate score, got {}",
        result.score
    );
    assert!(result.mate_in.is_some());

    // The PV must actually deliver the mate.
    let mut board: Board = "4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1".parse().unwrap();
    for mv in &result.pv {
        assert!(board.is_legal(*mv), "illegal PV move {mv}");
        board.make_move(*mv);
    }
    assert!(board.in_check(), "PV should end in checkmate");
    assert!(generate_all(&mut board).is_empty(), "PV should end in checkmate");
}

/// `go depth 1` from the start position: one of the 20 legal moves, and at
/// least one node per move searched.
#[test]
fn depth_one_startpos() {
    let result = search_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1);
    let mut board = Board::starting_position();
    let legal = generate_all(&mut board);
    assert_eq!(legal.len(), 20);
    assert!(legal.contains(result.best_move));
    assert!(result.nodes >= 20, "nodes {}", result.nodes);
}

/// The engine never emits an illegal best move across a variety of
/// positions.
#[test]
fn best_move_is_always_legal() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "8/p2bk2p/1p3pp1/2pp4/5PP1/2PPKN1P/P1P5/8 b - - 5 35",
    ] {
        let result = search_fen(fen, 5);
        let mut board: Board = fen.parse().unwrap();
        assert!(board.is_legal(result.best_move), "{fen} gave {}", result.best_move);
    }
}

/// A position reached three times scores as a draw.
#[test]
fn repetition_scores_draw() {
    let mut board = Board::starting_position();
    let shuffle = [
        Move::from_uci("g1f3", &board).unwrap(),
        Move::from_uci("g8f6", &board).unwrap(),
        Move::from_uci("f3g1", &board).unwrap(),
        Move::from_uci("f6g8", &board).unwrap(),
    ];
    for _ in 0..2 {
        for mv in shuffle {
            board.make_move(mv);
        }
    }
    assert!(board.is_draw());

    let mut searcher = Searcher::with_hash_mb(1);
    let control = SearchControl::infinite(Arc::new(AtomicBool::new(false)));
    let result = searcher.search(&mut board, 4, &control, |_| {});
    assert_eq!(result.score, 0);
    // The protocol still needs a move.
    assert!(!result.best_move.is_null());
}

/// A hard deadline in the past aborts the search almost immediately and
/// still yields a legal move.
#[test]
fn expired_clock_aborts_quickly() {
    let mut board = Board::starting_position();
    let mut searcher = Searcher::with_hash_mb(1);
    let control = SearchControl::timed(
        Arc::new(AtomicBool::new(false)),
        Duration::ZERO,
        Duration::from_millis(50),
    );
    let result = searcher.search(&mut board, 64, &control, |_| {});
    assert!(result.depth < 64);
    assert!(!result.best_move.is_null());
}

/// An external stop request ends an infinite search.
#[test]
fn stop_flag_ends_infinite_search() {
    let mut board = Board::starting_position();
    let mut searcher = Searcher::with_hash_mb(4);
    let flag = Arc::new(AtomicBool::new(false));
    let control = SearchControl::infinite(Arc::clone(&flag));

    let setter = Arc::clone(&flag);
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        setter.store(true, Ordering::Release);
    });

    let result = searcher.search(&mut board, 99, &control, |_| {});
    handle.join().unwrap();
    assert!(result.depth < 99);
    assert!(!result.best_move.is_null());
}

/// Search state in the board is balanced: the board comes back unchanged.
#[test]
fn search_leaves_board_intact() {
    let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    let mut board: Board = fen.parse().unwrap();
    let before = board.clone();
    let mut searcher = Searcher::with_hash_mb(4);
    let control = SearchControl::infinite(Arc::new(AtomicBool::new(false)));
    searcher.search(&mut board, 5, &control, |_| {});
    assert_eq!(board, before);
}

/// Two bench runs produce the same node total.
#[test]
fn bench_is_deterministic() {
    let first = bench::run(4);
    let second = bench::run(4);
    assert_eq!(first.nodes, second.nodes);
    assert!(first.nodes > 0);
}
