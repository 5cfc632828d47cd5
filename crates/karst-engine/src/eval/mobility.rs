//! Mobility: how many useful squares each minor and rook can reach.
//!
//! A square counts when it is not occupied by a friendly piece and not
//! covered by an enemy pawn. The bonus is a per-piece table indexed by that
//! count rather than a linear weight, so the first few squares of freedom
//! matter more than the last.

use karst_core::{Bitboard, Board, Color, PieceKind, bishop_attacks, knight_attacks, rook_attacks};

use crate::eval::score::{S, Score};

#[rustfmt::skip]
const KNIGHT_MOBILITY: [Score; 9] = [
    S(-30, -40), S(-15, -20), S(-5, -8), S(0, 0), S(5, 6),
    S(10, 12), S(14, 16), S(18, 19), S(20, 22),
];

#[rustfmt::skip]
const BISHOP_MOBILITY: [Score; 14] = [
    S(-25, -35), S(-12, -16), S(-3, -5), S(3, 2), S(8, 8),
    S(12, 14), S(16, 19), S(19, 23), S(22, 26), S(24, 29),
    S(26, 31), S(28, 33), S(29, 34), S(30, 35),
];

#[rustfmt::skip]
const ROOK_MOBILITY: [Score; 15] = [
    S(-20, -40), S(-12, -18), S(-6, -6), S(-2, 2), S(2, 8),
    S(5, 14), S(8, 19), S(11, 24), S(14, 28), S(16, 32),
    S(18, 35), S(20, 38), S(22, 40), S(23, 42), S(24, 44),
];

/// Squares attacked by any pawn in `pawns`.
fn pawn_attack_span(pawns: Bitboard, color: Color) -> Bitboard {
    let left = pawns & !Bitboard::FILE_A;
    let right = pawns & !Bitboard::FILE_H;
    match color {
        Color::White => (left << 7) | (right << 9),
        Color::Black => (left >> 9) | (right >> 7),
    }
}

fn side_mobility(board: &Board, color: Color) -> Score {
    let occupied = board.occupied();
    let friendly = board.side(color);
    let enemy_pawns = board.pieces(PieceKind::Pawn) & board.side(color.flip());
    let useful = !friendly & !pawn_attack_span(enemy_pawns, color.flip());

    let mut score = Score::ZERO;

    for sq in board.pieces(PieceKind::Knight) & friendly {
        let reach = (knight_attacks(sq) & useful).count() as usize;
        score += KNIGHT_MOBILITY[reach];
    }
    for sq in board.pieces(PieceKind::Bishop) & friendly {
        let reach = (bishop_attacks(sq, occupied) & useful).count() as usize;
        score += BISHOP_MOBILITY[reach.min(BISHOP_MOBILITY.len() - 1)];
    }
    for sq in board.pieces(PieceKind::Rook) & friendly {
        let reach = (rook_attacks(sq, occupied) & useful).count() as usize;
        score += ROOK_MOBILITY[reach.min(ROOK_MOBILITY.len() - 1)];
    }

    score
}

/// Mobility difference from White's perspective.
pub fn mobility(board: &Board) -> Score {
    side_mobility(board, Color::White) - side_mobility(board, Color::Black)
}
