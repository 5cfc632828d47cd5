//! Zobrist hashing: per-feature random keys XORed into a position signature.

use crate::attacks::pawn_attacks;
use crate::board::Board;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::{File, Square};

const PIECE_KEYS: usize = 12 * 64;
const SIDE_INDEX: usize = PIECE_KEYS;
const CASTLING_BASE: usize = SIDE_INDEX + 1;
const EP_FILE_BASE: usize = CASTLING_BASE + 16;
const KEY_COUNT: usize = EP_FILE_BASE + 8;

/// Every key the hash can mix in, generated at compile time from a fixed
/// seed: 768 piece-square keys, one side-to-move key, 16 castling
/// configurations, 8 en-passant files.
static KEYS: [u64; KEY_COUNT] = {
    let mut keys = [0u64; KEY_COUNT];
    let mut state: u64 = 0xD6E8_FEB8_6659_FD93;
    let mut i = 0;
    while i < KEY_COUNT {
        let (key, next) = splitmix64(state);
        keys[i] = key;
        state = next;
        i += 1;
    }
    keys
};

/// SplitMix64 step: returns (output, next state).
const fn splitmix64(state: u64) -> (u64, u64) {
    let next = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next)
}

/// Key for a colored piece standing on a square.
#[inline]
pub(crate) fn piece_square(piece: Piece, sq: Square) -> u64 {
    KEYS[piece.index() * 64 + sq.index()]
}

/// Key mixed in when Black is the side to move.
#[inline]
pub(crate) fn side_to_move() -> u64 {
    KEYS[SIDE_INDEX]
}

/// Key for a castling-rights configuration (indexed by the 4-bit mask).
#[inline]
pub(crate) fn castling(bits: u8) -> u64 {
    KEYS[CASTLING_BASE + bits as usize]
}

/// Key for an en-passant target file.
#[inline]
pub(crate) fn en_passant_file(file: File) -> u64 {
    KEYS[EP_FILE_BASE + file.index()]
}

/// The en-passant contribution of the board's current state: the file key
/// when an en-passant capture is actually available to the side to move,
/// zero otherwise. Hashing an unusable target square would make transposed
/// positions spuriously distinct.
pub(crate) fn en_passant_hash(board: &Board) -> u64 {
    match board.en_passant() {
        Some(ep) => {
            let us = board.side_to_move();
            let our_pawns = board.pieces(PieceKind::Pawn) & board.side(us);
            if (pawn_attacks(us.flip(), ep) & our_pawns).is_nonempty() {
                en_passant_file(ep.file())
            } else {
                0
            }
        }
        None => 0,
    }
}

/// Full recomputation of the position key. The incremental updates in
/// `make_move` must always agree with this.
pub(crate) fn hash_from_scratch(board: &Board) -> u64 {
    let mut hash = 0u64;

    for piece in Piece::ALL {
        let mut bb = board.pieces(piece.kind()) & board.side(piece.color());
        while let Some(sq) = bb.pop_lsb() {
            hash ^= piece_square(piece, sq);
        }
    }

    if board.side_to_move() == Color::Black {
        hash ^= side_to_move();
    }
    hash ^= castling(board.castling().bits());
    hash ^= en_passant_hash(board);

    hash
}

/// Pawn-placement-only key, used by the pawn-structure cache.
pub(crate) fn pawn_hash_from_scratch(board: &Board) -> u64 {
    let mut hash = 0u64;
    for color in Color::ALL {
        let piece = Piece::new(PieceKind::Pawn, color);
        let mut bb = board.pieces(PieceKind::Pawn) & board.side(color);
        while let Some(sq) = bb.pop_lsb() {
            hash ^= piece_square(piece, sq);
        }
    }
    hash
}
