//! Fixed-position benchmark. The node total doubles as a functional
//! signature of the search: any change to move ordering, pruning, or
//! evaluation shows up as a different count.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use karst_core::{Board, Move};

use crate::search::Searcher;
use crate::search::control::SearchControl;

/// Default bench depth.
pub const BENCH_DEPTH: i32 = 8;

/// A spread of openings, middlegames, endgames, and mates.
pub const BENCH_FENS: [&str; 12] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "rn1qkb1r/p4ppp/b1p1pn2/1p1p4/1P1P4/P1N1PN2/2P2PPP/R1BQKB1R w KQkq - 2 7",
    "4rrk1/p1p2p2/6p1/q1p4p/2P5/4P1PP/P4PQ1/2RR2K1 w - - 0 22",
    "6rk/1PP5/8/p2p4/4P1pp/4pP1P/8/1R4K1 w - - 1 38",
    "8/p2bk2p/1p3pp1/2pp4/5PP1/2PPKN1P/P1P5/8 b - - 5 35",
    "8/8/P5k1/3R2p1/7p/4K2P/8/r7 w - - 1 74",
    "r7/p5R1/b1ppr3/2Nq4/1k5P/8/4pBP1/R1Q3K1 w - - 7 43",
    "5Q2/7p/6pk/p3p3/4P3/6PP/6BK/5R2 b - - 2 45",
];

/// One searched bench position.
pub struct BenchPosition {
    pub fen: &'static str,
    pub best_move: Move,
    pub nodes: u64,
}

/// Aggregate bench outcome.
pub struct BenchResult {
    pub positions: Vec<BenchPosition>,
    pub nodes: u64,
    pub elapsed: Duration,
}

impl BenchResult {
    /// Nodes per second over the whole run.
    pub fn nps(&self) -> u64 {
        let millis = self.elapsed.as_millis().max(1) as u64;
        self.nodes * 1000 / millis
    }
}

/// Search every bench position to `depth` with a fresh searcher per
/// position, so the run is reproducible regardless of prior state.
pub fn run(depth: i32) -> BenchResult {
    let start = Instant::now();
    let mut positions = Vec::with_capacity(BENCH_FENS.len());
    let mut nodes = 0;

    for fen in BENCH_FENS {
        let mut board: Board = fen.parse().expect("bench FEN is valid");
        let mut searcher = Searcher::new();
        let control = SearchControl::infinite(Arc::new(AtomicBool::new(false)));
        let result = searcher.search(&mut board, depth, &control, |_| {});
        nodes += result.nodes;
        positions.push(BenchPosition {
            fen,
            best_move: result.best_move,
            nodes: result.nodes,
        });
    }

    BenchResult {
        positions,
        nodes,
        elapsed: start.elapsed(),
    }
}
