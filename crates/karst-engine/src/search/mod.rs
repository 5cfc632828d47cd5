//! Iterative-deepening search driver.

pub mod control;
pub mod heuristics;
mod negamax;
pub mod ordering;
pub mod tt;

use std::time::Duration;

use karst_core::{Board, Move, generate_all};

use crate::eval::Evaluator;
use control::SearchControl;
use heuristics::{HistoryTable, new_stack};
use negamax::{PvTable, SearchContext, aspiration};
pub use negamax::{DRAW_SCORE, INF, MATE_THRESHOLD};
use tt::TranspositionTable;

/// Progress of one completed iteration, for UCI `info` output.
pub struct IterationReport<'a> {
    pub depth: i32,
    pub seldepth: usize,
    pub score: i32,
    /// Signed full moves to mate, when `score` is a mate score.
    pub mate_in: Option<i32>,
    pub nodes: u64,
    pub elapsed: Duration,
    /// TT fill ratio in permille.
    pub hashfull: usize,
    pub pv: &'a [Move],
}

/// Final outcome of a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move of the deepest completed iteration; null when the position
    /// has no legal moves.
    pub best_move: Move,
    pub pv: Vec<Move>,
    pub score: i32,
    pub mate_in: Option<i32>,
    pub nodes: u64,
    pub depth: i32,
    pub seldepth: usize,
}

/// Signed moves-to-mate when `score` is a mate score.
fn mate_in(score: i32) -> Option<i32> {
    if score.abs() < MATE_THRESHOLD {
        return None;
    }
    let plies = INF - score.abs();
    let moves = (plies + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

/// Owns the state that outlives a single `go`: the transposition table and
/// the evaluator with its pawn cache.
pub struct Searcher {
    tt: TranspositionTable,
    eval: Evaluator,
}

impl Searcher {
    pub fn new() -> Searcher {
        Searcher::with_hash_mb(TranspositionTable::DEFAULT_MB)
    }

    pub fn with_hash_mb(mb: usize) -> Searcher {
        Searcher {
            tt: TranspositionTable::new(mb),
            eval: Evaluator::new(),
        }
    }

    /// Drop all cached search results (UCI `ucinewgame`).
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Replace the table with one of `mb` megabytes (UCI `Hash` option).
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Iteratively deepen up to `max_depth`, calling `on_iteration` after
    /// every completed depth. Returns the result of the deepest completed
    /// iteration.
    pub fn search<F>(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        control: &SearchControl,
        mut on_iteration: F,
    ) -> SearchResult
    where
        F: FnMut(&IterationReport<'_>),
    {
        let mut ctx = SearchContext {
            tt: &mut self.tt,
            eval: &mut self.eval,
            control,
            history: HistoryTable::new(),
            stack: new_stack(),
            pv: PvTable::new(),
            nodes: 0,
            seldepth: 0,
        };

        let mut result = SearchResult {
            best_move: Move::NULL,
            pv: Vec::new(),
            score: 0,
            mate_in: None,
            nodes: 0,
            depth: 0,
            seldepth: 0,
        };
        let mut prev_score = 0;

        for depth in 1..=max_depth.clamp(1, heuristics::MAX_PLY as i32 - 1) {
            let score = aspiration(board, &mut ctx, depth, prev_score);

            // An aborted iteration searched an arbitrary subset of the
            // tree; its results are discarded.
            if control.should_stop(ctx.nodes) {
                break;
            }
            prev_score = score;

            let pv = ctx.pv.root_line();
            if let Some(&first) = pv.first() {
                if !first.is_null() {
                    result.best_move = first;
                    result.pv = pv.iter().copied().take_while(|m| !m.is_null()).collect();
                }
            }
            result.score = score;
            result.mate_in = mate_in(score);
            result.nodes = ctx.nodes;
            result.depth = depth;
            result.seldepth = ctx.seldepth;

            on_iteration(&IterationReport {
                depth,
                seldepth: ctx.seldepth,
                score,
                mate_in: result.mate_in,
                nodes: ctx.nodes,
                elapsed: control.elapsed(),
                hashfull: ctx.tt.hashfull(),
                pv: &result.pv,
            });

            // The whole tree was shallower than the requested depth: no
            // deeper search can differ.
            if ctx.seldepth < depth as usize {
                break;
            }
            if control.soft_time_up() {
                break;
            }
        }

        // A root-level draw or an immediately-stopped search leaves no PV;
        // any legal move is better than forfeiting on protocol.
        if result.best_move.is_null() {
            let legal = generate_all(board);
            if !legal.is_empty() {
                tracing::warn!("no completed iteration, falling back to first legal move");
                result.best_move = legal[0];
                result.pv = vec![legal[0]];
            }
        }
        result.nodes = ctx.nodes;

        result
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
