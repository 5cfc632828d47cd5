//! Tapered position evaluation.
//!
//! Terms: piece-square tables with material folded in, cached pawn
//! structure, mobility, the bishop pair, and a tempo bonus. The middlegame
//! and endgame components are blended by remaining non-pawn material, and
//! the result is reported from the side to move's perspective (negamax
//! convention).

mod mobility;
mod pawns;
mod phase;
mod pst;
mod score;

use karst_core::{Board, Color, PieceKind};

pub use pawns::PawnCache;
pub use score::{S, Score};

use mobility::mobility;
use phase::{MAX_PHASE, game_phase};
use pst::pst_value;

/// Bonus for owning both bishops.
const BISHOP_PAIR: Score = S(30, 45);

/// Flat bonus for having the move.
const TEMPO: i32 = 12;

/// Evaluation state: owns the pawn-structure cache.
pub struct Evaluator {
    pawn_cache: PawnCache,
}

impl Evaluator {
    pub fn new() -> Evaluator {
        Evaluator {
            pawn_cache: PawnCache::new(),
        }
    }

    /// Static evaluation in centipawns, positive when the side to move is
    /// better.
    pub fn evaluate(&mut self, board: &Board) -> i32 {
        let mut total = Score::ZERO;

        for kind in PieceKind::ALL {
            let bb = board.pieces(kind);
            for sq in bb & board.side(Color::White) {
                total += pst_value(kind, Color::White, sq);
            }
            for sq in bb & board.side(Color::Black) {
                total -= pst_value(kind, Color::Black, sq);
            }
        }

        total += self.pawn_cache.probe(board);
        total += mobility(board);

        let bishops = board.pieces(PieceKind::Bishop);
        if (bishops & board.side(Color::White)).count() >= 2 {
            total += BISHOP_PAIR;
        }
        if (bishops & board.side(Color::Black)).count() >= 2 {
            total -= BISHOP_PAIR;
        }

        let white_eval = total.taper(game_phase(board), MAX_PHASE);
        let eval = match board.side_to_move() {
            Color::White => white_eval,
            Color::Black => -white_eval,
        };
        eval + TEMPO
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
