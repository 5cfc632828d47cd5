//! Negamax alpha-beta search with aspiration windows and quiescence.

use karst_core::{Board, Move};

use crate::eval::Evaluator;
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, MAX_PLY, StackEntry};
use crate::search::ordering::{MovePicker, lmr_reduction};
use crate::search::tt::{Bound, TranspositionTable};

/// Upper bound on any real score; mate scores live just below it.
pub const INF: i32 = 31_000;

/// Scores at or beyond this magnitude are forced mates. A mate found at
/// ply `p` scores `INF - p`, so the gap below `INF` covers every reachable
/// ply.
pub const MATE_THRESHOLD: i32 = 30_000;

/// Score of a drawn position.
pub const DRAW_SCORE: i32 = 0;

/// Sentinel returned when the search aborts mid-node. Callers discard it
/// after checking the stop control; it never participates in comparisons.
pub(super) const NO_SCORE: i32 = -32_000;

// ---------------------------------------------------------------------------
// Node-type dispatch
// ---------------------------------------------------------------------------

/// Compile-time node classification. Root nodes drive the PV and never
/// prune the whole node; PV nodes re-search with full windows; null-move
/// nodes must not immediately re-enter null-move pruning.
pub(super) trait NodeType {
    const ROOT: bool;
    const PV: bool;
    const NMP: bool;
}

pub(super) struct Root;
impl NodeType for Root {
    const ROOT: bool = true;
    const PV: bool = true;
    const NMP: bool = false;
}

pub(super) struct Pv;
impl NodeType for Pv {
    const ROOT: bool = false;
    const PV: bool = true;
    const NMP: bool = false;
}

pub(super) struct NonPv;
impl NodeType for NonPv {
    const ROOT: bool = false;
    const PV: bool = false;
    const NMP: bool = false;
}

pub(super) struct Nmp;
impl NodeType for Nmp {
    const ROOT: bool = false;
    const PV: bool = false;
    const NMP: bool = true;
}

// ---------------------------------------------------------------------------
// Principal variation bookkeeping
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct PvLine {
    moves: [Move; MAX_PLY],
    len: usize,
}

/// Triangular PV table: line `p` holds the best continuation found from
/// ply `p`.
pub(super) struct PvTable {
    lines: Box<[PvLine]>,
}

impl PvTable {
    pub(super) fn new() -> PvTable {
        PvTable {
            lines: vec![
                PvLine {
                    moves: [Move::NULL; MAX_PLY],
                    len: 0,
                };
                MAX_PLY
            ]
            .into_boxed_slice(),
        }
    }

    /// Reset the line at `ply` on node entry.
    fn truncate(&mut self, ply: usize) {
        self.lines[ply].len = ply;
    }

    /// Record `mv` as the best move at `ply` and splice the child's line
    /// behind it.
    fn update(&mut self, ply: usize, mv: Move) {
        let child_len = if ply + 1 < MAX_PLY {
            self.lines[ply + 1].len.clamp(ply + 1, MAX_PLY)
        } else {
            ply + 1
        };
        self.lines[ply].moves[ply] = mv;
        for i in (ply + 1)..child_len {
            self.lines[ply].moves[i] = self.lines[ply + 1].moves[i];
        }
        self.lines[ply].len = child_len;
    }

    /// The best line from the root.
    pub(super) fn root_line(&self) -> &[Move] {
        &self.lines[0].moves[..self.lines[0].len]
    }
}

// ---------------------------------------------------------------------------
// Search context
// ---------------------------------------------------------------------------

/// Mutable state threaded through one root search.
pub(super) struct SearchContext<'a> {
    pub tt: &'a mut TranspositionTable,
    pub eval: &'a mut Evaluator,
    pub control: &'a SearchControl,
    pub history: HistoryTable,
    pub stack: [StackEntry; MAX_PLY],
    pub pv: PvTable,
    pub nodes: u64,
    pub seldepth: usize,
}

impl SearchContext<'_> {
    #[inline]
    fn should_stop(&self) -> bool {
        self.control.should_stop(self.nodes)
    }
}

// ---------------------------------------------------------------------------
// Aspiration windows
// ---------------------------------------------------------------------------

/// Search `depth` with a window seeded from the previous iteration's score.
/// Shallow depths are too unstable to aspire and get the full window. On a
/// fail, the delta doubles and the failed side widens until the score lands
/// inside.
pub(super) fn aspiration(
    board: &mut Board,
    ctx: &mut SearchContext<'_>,
    depth: i32,
    prev_score: i32,
) -> i32 {
    let mut delta = 40;
    let (mut alpha, mut beta) = if depth <= 6 {
        (-INF, INF)
    } else {
        (prev_score - delta, prev_score + delta)
    };

    loop {
        let score = search::<Root>(board, ctx, alpha, beta, depth, 0);
        if ctx.should_stop() || (alpha < score && score < beta) {
            return score;
        }
        delta *= 2;
        if score <= alpha {
            alpha = (alpha - delta).max(-INF);
        } else {
            beta = (beta + delta).min(INF);
        }
    }
}

// ---------------------------------------------------------------------------
// Main search
// ---------------------------------------------------------------------------

pub(super) fn search<N: NodeType>(
    board: &mut Board,
    ctx: &mut SearchContext<'_>,
    mut alpha: i32,
    beta: i32,
    mut depth: i32,
    ply: usize,
) -> i32 {
    ctx.pv.truncate(ply);

    if ctx.should_stop() {
        return NO_SCORE;
    }

    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply);

    if board.is_draw() {
        return DRAW_SCORE;
    }
    if ply >= MAX_PLY - 1 {
        return ctx.eval.evaluate(board);
    }
    if depth <= 0 {
        return qsearch(board, ctx, alpha, beta, ply);
    }

    let old_alpha = alpha;

    // Probe the transposition table. Outside the PV a deep-enough entry
    // answers the node outright; otherwise its move seeds ordering and its
    // score stands in for the static eval.
    let mut tt_move = Move::NULL;
    let static_eval;
    match ctx.tt.probe(board.hash(), ply) {
        Some(hit) => {
            if !N::PV
                && hit.depth >= depth
                && match hit.bound {
                    Bound::Exact => true,
                    Bound::Upper => hit.score <= alpha,
                    Bound::Lower => hit.score >= beta,
                    Bound::None => false,
                }
            {
                return hit.score;
            }
            tt_move = hit.mv;
            static_eval = hit.score;
        }
        None => static_eval = ctx.eval.evaluate(board),
    }

    // Internal iterative reduction: a deep node with no TT move is probably
    // not worth its full depth yet.
    if !N::ROOT && tt_move.is_null() && depth >= 6 {
        depth -= 1;
    }

    // Reverse futility pruning: eval so far above beta that the opponent
    // cannot catch up in the remaining depth.
    if !N::PV && depth < 5 && static_eval - 100 * depth >= beta {
        return beta;
    }

    let in_check = board.in_check();

    // Null-move pruning: hand the opponent a free move; if the reduced
    // search still clears beta, the real position will too. Skipped in
    // check, in zugzwang-prone pawn endings, and right after another null.
    if !N::NMP && !in_check && depth >= 2 && static_eval >= beta && board.has_non_pawn_material() {
        let reduction = 3 + depth / 4;
        board.make_null_move();
        ctx.tt.prefetch(board.hash());
        let null_score = -search::<Nmp>(board, ctx, -beta, -beta + 1, depth - reduction, ply + 1);
        board.unmake_null_move();

        if ctx.should_stop() {
            return NO_SCORE;
        }
        if null_score >= beta {
            // A mate score through a null move is not provable; fail at beta.
            return beta;
        }
    }

    let killer = ctx.stack[ply].killer;
    let mut picker = MovePicker::new(tt_move, killer);

    let mut best_score = -INF;
    let mut best_move = Move::NULL;
    let mut skip_quiets = false;
    let mut tried_quiets: Vec<Move> = Vec::new();

    while let Some(mv) = picker.next(board, &ctx.history) {
        let is_quiet = !picker.in_noisy_stage();

        // Late-move pruning: after enough moves, remaining quiets are
        // almost never best.
        if !N::PV && !in_check && picker.picked() >= 30 {
            skip_quiets = true;
        }
        if skip_quiets && is_quiet {
            continue;
        }

        board.make_move(mv);
        ctx.tt.prefetch(board.hash());
        let gives_check = board.in_check();

        let new_depth = depth - 1 + i32::from(gives_check);

        let mut score = 0;
        let full_null_search;

        // Late-move reductions: quiet, late, unforcing moves get a reduced
        // null-window look first, and only earn the full depth on a fail
        // high.
        if is_quiet && picker.picked() >= 4 && depth >= 3 && !gives_check {
            let reduced = new_depth - lmr_reduction(depth, picker.picked());
            score = -search::<NonPv>(board, ctx, -alpha - 1, -alpha, reduced, ply + 1);
            full_null_search = score > alpha && reduced < new_depth;
        } else {
            full_null_search = !N::PV || picker.picked() > 1;
        }

        if full_null_search {
            score = -search::<NonPv>(board, ctx, -alpha - 1, -alpha, new_depth, ply + 1);
        }

        // Principal variation search: the first move, and any move whose
        // null-window score lands inside the window, gets the full window.
        if N::PV && (picker.picked() == 1 || (score > alpha && score < beta)) {
            score = -search::<Pv>(board, ctx, -beta, -alpha, new_depth, ply + 1);
        }

        board.unmake_move();

        // A timed-out subtree returned garbage; keep the best completed
        // result.
        if ctx.should_stop() {
            return best_score;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
            if N::PV {
                ctx.pv.update(ply, mv);
            }
            if score > alpha {
                alpha = score;
                if score >= beta {
                    ctx.history.reward(mv, depth);
                    if is_quiet {
                        ctx.stack[ply].killer = mv;
                        for quiet in &tried_quiets {
                            ctx.history.punish(*quiet, depth);
                        }
                    }
                    break;
                }
            }
        }

        if is_quiet {
            tried_quiets.push(mv);
        }
    }

    // No move survived the picker: checkmate or stalemate.
    if picker.picked() == 0 {
        return if in_check {
            -INF + ply as i32
        } else {
            DRAW_SCORE
        };
    }

    if !best_move.is_null() {
        let bound = if best_score >= beta {
            Bound::Lower
        } else if alpha == old_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        ctx.tt
            .store(board.hash(), best_move, best_score, bound, depth, ply);
    }

    best_score
}

// ---------------------------------------------------------------------------
// Quiescence
// ---------------------------------------------------------------------------

/// Resolve captures at the horizon so the static eval is never taken in the
/// middle of an exchange. Stand-pat bounds the score from below; only noisy
/// moves are searched. Fail-hard.
pub(super) fn qsearch(
    board: &mut Board,
    ctx: &mut SearchContext<'_>,
    mut alpha: i32,
    beta: i32,
    ply: usize,
) -> i32 {
    if ctx.should_stop() {
        return NO_SCORE;
    }

    ctx.nodes += 1;
    ctx.seldepth = ctx.seldepth.max(ply);

    let stand_pat = ctx.eval.evaluate(board);
    if ply >= MAX_PLY - 1 {
        return stand_pat;
    }
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut picker = MovePicker::new_noisy();
    while let Some(mv) = picker.next(board, &ctx.history) {
        board.make_move(mv);
        ctx.tt.prefetch(board.hash());
        let score = -qsearch(board, ctx, -beta, -alpha, ply + 1);
        board.unmake_move();

        if ctx.should_stop() {
            return alpha;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}
