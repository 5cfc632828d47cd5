//! The board: piece placement, game state, and reversible move execution.

use std::fmt;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::castle_rights::CastleRights;
use crate::error::BoardError;
use crate::moves::{Move, MoveKind};
use crate::piece::{Color, Piece, PieceKind};
use crate::square::Square;
use crate::zobrist;

/// Castling rights that disappear when a move touches the given square,
/// indexed by square. Covers king departures, rook departures, and rook
/// captures in one lookup.
const CASTLE_REVOKE: [CastleRights; 64] = {
    let mut table = [CastleRights::NONE; 64];
    table[Square::E1.index()] = CastleRights::WHITE_BOTH;
    table[Square::A1.index()] = CastleRights::WHITE_QUEEN_SIDE;
    table[Square::H1.index()] = CastleRights::WHITE_KING_SIDE;
    table[Square::E8.index()] = CastleRights::BLACK_BOTH;
    table[Square::A8.index()] = CastleRights::BLACK_QUEEN_SIDE;
    table[Square::H8.index()] = CastleRights::BLACK_KING_SIDE;
    table
};

/// State a move destroys, recorded so `unmake_move` can restore it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undo {
    mv: Move,
    captured: Option<PieceKind>,
    castling: CastleRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    hash: u64,
    pawn_hash: u64,
}

/// A chess position plus the undo stack that makes moves reversible.
///
/// Mutation goes exclusively through [`make_move`](Board::make_move) /
/// [`unmake_move`](Board::unmake_move) and the null-move pair; every make is
/// exactly invertible, and the Zobrist key is maintained incrementally
/// through both.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    /// One bitboard per piece kind, both colors merged.
    pieces: [Bitboard; PieceKind::COUNT],
    /// One bitboard per color.
    sides: [Bitboard; Color::COUNT],
    /// Union of both sides, cached.
    occupied: Bitboard,
    side_to_move: Color,
    castling: CastleRights,
    en_passant: Option<Square>,
    /// Fifty-move-rule counter, in plies.
    halfmove_clock: u16,
    /// Starts at 1, incremented after Black moves.
    fullmove_number: u16,
    hash: u64,
    /// Pawn-placement-only key for the pawn-structure cache.
    pawn_hash: u64,
    history: Vec<Undo>,
}

impl Board {
    /// The standard starting position.
    pub fn starting_position() -> Board {
        crate::fen::STARTING_FEN
            .parse()
            .expect("starting FEN is valid")
    }

    /// Assemble a board from parsed FEN fields. Hashes are computed from
    /// scratch here; everything after goes through incremental updates.
    pub(crate) fn from_raw(
        pieces: [Bitboard; PieceKind::COUNT],
        sides: [Bitboard; Color::COUNT],
        side_to_move: Color,
        castling: CastleRights,
        en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> Board {
        let mut board = Board {
            pieces,
            sides,
            occupied: sides[Color::White.index()] | sides[Color::Black.index()],
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            hash: 0,
            pawn_hash: 0,
            history: Vec::with_capacity(64),
        };
        board.hash = zobrist::hash_from_scratch(&board);
        board.pawn_hash = zobrist::pawn_hash_from_scratch(&board);
        board
    }

    // --- Accessors ---

    /// Bitboard of the given piece kind, both colors.
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    /// Bitboard of all pieces of one side.
    #[inline]
    pub fn side(&self, color: Color) -> Bitboard {
        self.sides[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    /// The piece kind standing on `sq`, if any.
    pub fn piece_on(&self, sq: Square) -> Option<PieceKind> {
        if !self.occupied.contains(sq) {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|&kind| self.pieces[kind.index()].contains(sq))
    }

    /// The color of the piece on `sq`, if any.
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|&color| self.sides[color.index()].contains(sq))
    }

    /// The king square of `color`. Valid boards always have one.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        let kings = self.pieces[PieceKind::King.index()] & self.sides[color.index()];
        debug_assert!(kings.count() == 1);
        Square::from_index_unchecked(kings.inner().trailing_zeros() as u8)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastleRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// The position's Zobrist key.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The pawn-placement-only Zobrist key.
    #[inline]
    pub fn pawn_hash(&self) -> u64 {
        self.pawn_hash
    }

    /// Number of moves currently on the undo stack.
    #[inline]
    pub fn ply_from_start(&self) -> usize {
        self.history.len()
    }

    /// Whether the side to move still has a piece other than pawns and the
    /// king. Gates null-move pruning against zugzwang endings.
    pub fn has_non_pawn_material(&self) -> bool {
        let minors_and_majors = self.pieces(PieceKind::Knight)
            | self.pieces(PieceKind::Bishop)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        (minors_and_majors & self.side(self.side_to_move)).is_nonempty()
    }

    // --- Attack queries ---

    /// Whether `sq` is attacked by any piece of `by`, with a caller-supplied
    /// occupancy for the sliding rays.
    pub fn is_square_attacked_with_occ(
        &self,
        sq: Square,
        by: Color,
        occupied: Bitboard,
    ) -> bool {
        let them = self.side(by);

        if (knight_attacks(sq) & them & self.pieces(PieceKind::Knight)).is_nonempty() {
            return true;
        }
        if (king_attacks(sq) & them & self.pieces(PieceKind::King)).is_nonempty() {
            return true;
        }
        // A pawn of `by` attacks `sq` iff a pawn of the other color on `sq`
        // would attack the pawn's square.
        if (pawn_attacks(by.flip(), sq) & them & self.pieces(PieceKind::Pawn)).is_nonempty() {
            return true;
        }

        let rooks_queens = (self.pieces(PieceKind::Rook) | self.pieces(PieceKind::Queen)) & them;
        if (rook_attacks(sq, occupied) & rooks_queens).is_nonempty() {
            return true;
        }
        let bishops_queens =
            (self.pieces(PieceKind::Bishop) | self.pieces(PieceKind::Queen)) & them;
        (bishop_attacks(sq, occupied) & bishops_queens).is_nonempty()
    }

    /// Whether `sq` is attacked by any piece of `by`.
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_square_attacked_with_occ(sq, by, self.occupied)
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.is_square_attacked(self.king_square(self.side_to_move), self.side_to_move.flip())
    }

    // --- Move execution ---

    /// XOR a piece in or out of the position, folding the change into both
    /// hashes.
    #[inline]
    fn toggle(&mut self, sq: Square, kind: PieceKind, color: Color) {
        let mask = sq.bitboard();
        self.pieces[kind.index()] ^= mask;
        self.sides[color.index()] ^= mask;
        self.occupied ^= mask;

        let key = zobrist::piece_square(Piece::new(kind, color), sq);
        self.hash ^= key;
        if kind == PieceKind::Pawn {
            self.pawn_hash ^= key;
        }
    }

    /// Apply a pseudo-legal move. Whether the move leaves the mover's king
    /// attacked is not checked here; the generator's legality filter is
    /// responsible for that.
    pub fn make_move(&mut self, mv: Move) {
        let us = self.side_to_move;
        let them = us.flip();
        let from = mv.from();
        let to = mv.to();

        let Some(moving) = self.piece_on(from) else {
            debug_assert!(false, "make_move from empty square {from}");
            return;
        };

        let captured = match mv.kind() {
            MoveKind::EnPassant => Some(PieceKind::Pawn),
            MoveKind::Castle => None,
            _ => self.piece_on(to),
        };

        self.history.push(Undo {
            mv,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
            pawn_hash: self.pawn_hash,
        });

        // The en-passant contribution depends on the whole position, so it
        // leaves the hash before anything changes and re-enters at the end.
        self.hash ^= zobrist::en_passant_hash(self);
        self.en_passant = None;
        self.hash ^= zobrist::castling(self.castling.bits());

        match mv.kind() {
            MoveKind::Normal => {
                if let Some(kind) = captured {
                    self.toggle(to, kind, them);
                }
                self.toggle(from, moving, us);
                self.toggle(to, moving, us);

                if moving == PieceKind::Pawn && from.index().abs_diff(to.index()) == 16 {
                    let midpoint = (from.index() + to.index()) / 2;
                    self.en_passant = Square::from_index(midpoint as u8);
                }
            }
            MoveKind::Promotion => {
                if let Some(kind) = captured {
                    self.toggle(to, kind, them);
                }
                self.toggle(from, PieceKind::Pawn, us);
                self.toggle(to, mv.promotion_piece().kind(), us);
            }
            MoveKind::EnPassant => {
                self.toggle(from, PieceKind::Pawn, us);
                self.toggle(to, PieceKind::Pawn, us);
                // The captured pawn stands one rank behind the target square.
                let victim = match us {
                    Color::White => to.index() - 8,
                    Color::Black => to.index() + 8,
                };
                self.toggle(Square::from_index_unchecked(victim as u8), PieceKind::Pawn, them);
            }
            MoveKind::Castle => {
                self.toggle(from, PieceKind::King, us);
                self.toggle(to, PieceKind::King, us);
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.toggle(rook_from, PieceKind::Rook, us);
                self.toggle(rook_to, PieceKind::Rook, us);
            }
        }

        self.castling = self
            .castling
            .remove(CASTLE_REVOKE[from.index()])
            .remove(CASTLE_REVOKE[to.index()]);
        self.hash ^= zobrist::castling(self.castling.bits());

        if moving == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.side_to_move = them;
        self.hash ^= zobrist::side_to_move();
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.hash ^= zobrist::en_passant_hash(self);
    }

    /// Revert the most recent [`make_move`](Board::make_move).
    pub fn unmake_move(&mut self) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_move with empty history");
            return;
        };
        let mv = undo.mv;
        debug_assert!(!mv.is_null(), "unmake_move after make_null_move");

        let mover = self.side_to_move.flip();
        let opponent = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        match mv.kind() {
            MoveKind::Normal => {
                let Some(moving) = self.piece_on(to) else {
                    debug_assert!(false, "unmake_move with no piece on {to}");
                    return;
                };
                self.toggle(to, moving, mover);
                self.toggle(from, moving, mover);
                if let Some(kind) = undo.captured {
                    self.toggle(to, kind, opponent);
                }
            }
            MoveKind::Promotion => {
                self.toggle(to, mv.promotion_piece().kind(), mover);
                self.toggle(from, PieceKind::Pawn, mover);
                if let Some(kind) = undo.captured {
                    self.toggle(to, kind, opponent);
                }
            }
            MoveKind::EnPassant => {
                self.toggle(to, PieceKind::Pawn, mover);
                self.toggle(from, PieceKind::Pawn, mover);
                let victim = match mover {
                    Color::White => to.index() - 8,
                    Color::Black => to.index() + 8,
                };
                self.toggle(
                    Square::from_index_unchecked(victim as u8),
                    PieceKind::Pawn,
                    opponent,
                );
            }
            MoveKind::Castle => {
                self.toggle(to, PieceKind::King, mover);
                self.toggle(from, PieceKind::King, mover);
                let (rook_from, rook_to) = castle_rook_squares(to);
                self.toggle(rook_to, PieceKind::Rook, mover);
                self.toggle(rook_from, PieceKind::Rook, mover);
            }
        }

        self.side_to_move = mover;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        self.pawn_hash = undo.pawn_hash;
        if mover == Color::Black {
            self.fullmove_number -= 1;
        }
    }

    /// Pass the move: flip the side to move and drop the en-passant target,
    /// leaving every piece in place. Only the search uses this.
    pub fn make_null_move(&mut self) {
        self.history.push(Undo {
            mv: Move::NULL,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
            pawn_hash: self.pawn_hash,
        });

        self.hash ^= zobrist::en_passant_hash(self);
        self.en_passant = None;
        self.side_to_move = self.side_to_move.flip();
        self.hash ^= zobrist::side_to_move();
    }

    /// Revert the most recent [`make_null_move`](Board::make_null_move).
    pub fn unmake_null_move(&mut self) {
        let Some(undo) = self.history.pop() else {
            debug_assert!(false, "unmake_null_move with empty history");
            return;
        };
        debug_assert!(undo.mv.is_null(), "unmake_null_move after make_move");

        self.side_to_move = self.side_to_move.flip();
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        self.pawn_hash = undo.pawn_hash;
    }

    // --- Draw detection ---

    /// Fifty-move rule, threefold repetition over the recorded history, or
    /// insufficient mating material.
    pub fn is_draw(&self) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }
        self.is_repetition() || self.is_insufficient_material()
    }

    /// Whether the current position already occurred twice before. Only
    /// positions since the last irreversible move can repeat, so the scan is
    /// bounded by the halfmove clock.
    fn is_repetition(&self) -> bool {
        let span = (self.halfmove_clock as usize).min(self.history.len());
        let mut seen = 0;
        for undo in self.history.iter().rev().take(span) {
            if undo.hash == self.hash {
                seen += 1;
                if seen >= 2 {
                    return true;
                }
            }
        }
        false
    }

    /// K v K, K+minor v K, and same-colored-bishops endings cannot be won.
    fn is_insufficient_material(&self) -> bool {
        let majors_or_pawns = self.pieces(PieceKind::Pawn)
            | self.pieces(PieceKind::Rook)
            | self.pieces(PieceKind::Queen);
        if majors_or_pawns.is_nonempty() {
            return false;
        }

        let knights = self.pieces(PieceKind::Knight);
        let bishops = self.pieces(PieceKind::Bishop);
        if (knights | bishops).count() <= 1 {
            return true;
        }
        knights.is_empty()
            && ((bishops & Bitboard::LIGHT_SQUARES) == bishops
                || (bishops & Bitboard::DARK_SQUARES) == bishops)
    }

    // --- Validation ---

    /// Structural checks run after FEN parsing.
    pub fn validate(&self) -> Result<(), BoardError> {
        for color in Color::ALL {
            let kings = self.pieces(PieceKind::King) & self.side(color);
            if kings.count() != 1 {
                let name = match color {
                    Color::White => "white",
                    Color::Black => "black",
                };
                return Err(BoardError::KingCount {
                    color: name,
                    count: kings.count(),
                });
            }
        }

        if (self.pieces(PieceKind::Pawn) & (Bitboard::RANK_1 | Bitboard::RANK_8)).is_nonempty() {
            return Err(BoardError::PawnsOnBackRank);
        }

        for i in 0..PieceKind::COUNT {
            for j in (i + 1)..PieceKind::COUNT {
                if (self.pieces[i] & self.pieces[j]).is_nonempty() {
                    return Err(BoardError::OverlappingPieces);
                }
            }
        }

        let white = self.sides[Color::White.index()];
        let black = self.sides[Color::Black.index()];
        if (white & black).is_nonempty() || self.occupied != (white | black) {
            return Err(BoardError::InconsistentOccupancy);
        }

        // The mover could capture the opposite king outright.
        let them = self.side_to_move.flip();
        if self.is_square_attacked(self.king_square(them), self.side_to_move) {
            return Err(BoardError::OppositeKingInCheck);
        }

        Ok(())
    }
}

/// Rook source and destination for a castle, keyed by the king's landing
/// square.
const fn castle_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.index() {
        6 => (Square::H1, Square::F1),
        2 => (Square::A1, Square::D1),
        62 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board(\"{self}\")")
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::castle_rights::CastleRights;
    use crate::moves::{Move, Promotion};
    use crate::piece::{Color, PieceKind};
    use crate::square::Square;
    use crate::zobrist;

    fn assert_roundtrip(fen: &str, mv: Move) {
        let mut board: Board = fen.parse().unwrap();
        let before = board.clone();
        board.make_move(mv);
        assert_eq!(
            board.hash(),
            zobrist::hash_from_scratch(&board),
            "incremental hash diverged after {mv} on {fen}"
        );
        assert_eq!(
            board.pawn_hash(),
            zobrist::pawn_hash_from_scratch(&board),
            "incremental pawn hash diverged after {mv} on {fen}"
        );
        board.unmake_move();
        assert_eq!(board, before, "unmake did not restore {fen} after {mv}");
    }

    #[test]
    fn starting_position_is_sound() {
        let board = Board::starting_position();
        board.validate().unwrap();
        assert_eq!(board.occupied().count(), 32);
        assert_eq!(board.king_square(Color::White), Square::E1);
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn pawn_push_sets_en_passant() {
        let mut board = Board::starting_position();
        board.make_move(Move::new(Square::E2, Square::E4));
        assert_eq!(board.piece_on(Square::E4), Some(PieceKind::Pawn));
        assert_eq!(board.piece_on(Square::E2), None);
        assert_eq!(board.en_passant(), Some(Square::E3));
        assert_eq!(board.side_to_move(), Color::Black);
    }

    #[test]
    fn make_unmake_roundtrips() {
        assert_roundtrip(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            Move::new(Square::E2, Square::E4),
        );
        assert_roundtrip(
            "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
            Move::new(Square::E4, Square::D5), // capture
        );
        assert_roundtrip(
            "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3",
            Move::en_passant(Square::E5, Square::D6),
        );
        assert_roundtrip(
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            Move::castle(Square::E1, Square::G1),
        );
        assert_roundtrip(
            "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1",
            Move::castle(Square::E8, Square::C8),
        );
        assert_roundtrip(
            "3rk3/4P3/8/8/8/8/8/4K3 w - - 0 1",
            Move::promotion(Square::E7, Square::D8, Promotion::Queen), // capture-promotion
        );
        for promo in Promotion::ALL {
            assert_roundtrip(
                "4k3/4P3/8/8/8/8/8/4K3 w - - 0 1",
                Move::promotion(Square::E7, Square::E8, promo),
            );
        }
    }

    #[test]
    fn make_unmake_restores_through_a_line() {
        let mut board = Board::starting_position();
        let before = board.clone();
        let line = [
            Move::new(Square::E2, Square::E4),
            Move::new(Square::E7, Square::E5),
            Move::new(Square::G1, Square::F3),
            Move::new(Square::B8, Square::C6),
            Move::new(Square::F1, Square::B5),
            Move::new(Square::G8, Square::F6),
        ];
        for mv in line {
            board.make_move(mv);
            assert_eq!(board.hash(), zobrist::hash_from_scratch(&board));
        }
        for _ in line {
            board.unmake_move();
        }
        assert_eq!(board, before);
    }

    #[test]
    fn null_move_roundtrip_is_exact() {
        let mut board: Board = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3"
            .parse()
            .unwrap();
        let before = board.clone();
        board.make_null_move();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.en_passant(), None);
        assert_eq!(board.hash(), zobrist::hash_from_scratch(&board));
        board.unmake_null_move();
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_both_pieces() {
        let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        board.make_move(Move::castle(Square::E1, Square::G1));
        assert_eq!(board.piece_on(Square::G1), Some(PieceKind::King));
        assert_eq!(board.piece_on(Square::F1), Some(PieceKind::Rook));
        assert_eq!(board.piece_on(Square::E1), None);
        assert_eq!(board.piece_on(Square::H1), None);
        assert!(!board.castling().contains(CastleRights::WHITE_KING_SIDE));
        assert!(board.castling().contains(CastleRights::BLACK_KING_SIDE));
    }

    #[test]
    fn rook_moves_and_captures_revoke_rights() {
        let mut board: Board = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1".parse().unwrap();
        board.make_move(Move::new(Square::A1, Square::A8)); // RxR
        assert!(!board.castling().contains(CastleRights::WHITE_QUEEN_SIDE));
        assert!(!board.castling().contains(CastleRights::BLACK_QUEEN_SIDE));
        assert!(board.castling().contains(CastleRights::WHITE_KING_SIDE));
        assert!(board.castling().contains(CastleRights::BLACK_KING_SIDE));
    }

    #[test]
    fn halfmove_clock_rules() {
        let mut board = Board::starting_position();
        board.make_move(Move::new(Square::G1, Square::F3));
        assert_eq!(board.halfmove_clock(), 1); // quiet knight move
        board.make_move(Move::new(Square::D7, Square::D5));
        assert_eq!(board.halfmove_clock(), 0); // pawn move resets
    }

    #[test]
    fn fullmove_number_increments_after_black() {
        let mut board = Board::starting_position();
        board.make_move(Move::new(Square::E2, Square::E4));
        assert_eq!(board.fullmove_number(), 1);
        board.make_move(Move::new(Square::E7, Square::E5));
        assert_eq!(board.fullmove_number(), 2);
    }

    #[test]
    fn transpositions_share_a_hash() {
        let mut a = Board::starting_position();
        for mv in [
            Move::new(Square::G1, Square::F3),
            Move::new(Square::G8, Square::F6),
            Move::new(Square::B1, Square::C3),
            Move::new(Square::B8, Square::C6),
        ] {
            a.make_move(mv);
        }
        let mut b = Board::starting_position();
        for mv in [
            Move::new(Square::B1, Square::C3),
            Move::new(Square::B8, Square::C6),
            Move::new(Square::G1, Square::F3),
            Move::new(Square::G8, Square::F6),
        ] {
            b.make_move(mv);
        }
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn threefold_repetition_is_a_draw() {
        let mut board = Board::starting_position();
        let shuffle = [
            Move::new(Square::G1, Square::F3),
            Move::new(Square::G8, Square::F6),
            Move::new(Square::F3, Square::G1),
            Move::new(Square::F6, Square::G8),
        ];
        assert!(!board.is_draw());
        for mv in shuffle {
            board.make_move(mv);
        }
        // Start position has now occurred twice.
        assert!(!board.is_draw());
        for mv in shuffle {
            board.make_move(mv);
        }
        // Three occurrences.
        assert!(board.is_draw());
    }

    #[test]
    fn fifty_move_rule() {
        let board: Board = "4k3/8/8/8/8/8/8/4K2R w - - 100 80".parse().unwrap();
        assert!(board.is_draw());
        let board: Board = "4k3/8/8/8/8/8/8/4K2R w - - 99 80".parse().unwrap();
        assert!(!board.is_draw());
    }

    #[test]
    fn insufficient_material() {
        for fen in [
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1",      // K v K
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",     // K+N v K
            "4k3/8/8/8/8/8/8/4KB2 w - - 0 1",     // K+B v K
            "4k3/2b5/8/8/8/8/5B2/4K3 w - - 0 1",  // same-colored bishops
        ] {
            let board: Board = fen.parse().unwrap();
            assert!(board.is_draw(), "{fen} should be drawn");
        }
        for fen in [
            "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1",    // pawn can still win
            "4k3/8/8/8/8/8/8/4K2R w - - 0 1",     // rook
            "4k3/1b6/8/8/8/8/5B2/4K3 w - - 0 1",  // opposite-colored bishops
            "4k3/8/8/8/8/8/3N4/4KN2 w - - 0 1",   // two knights (not auto-draw here)
        ] {
            let board: Board = fen.parse().unwrap();
            assert!(!board.is_draw(), "{fen} should not be drawn");
        }
    }

    #[test]
    fn attack_queries() {
        let board = Board::starting_position();
        assert!(board.is_square_attacked(Square::F3, Color::White)); // Ng1
        assert!(board.is_square_attacked(Square::E2, Color::White));
        assert!(!board.is_square_attacked(Square::E4, Color::Black));
        assert!(!board.in_check());

        let check: Board = "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1".parse().unwrap();
        assert!(check.in_check());
    }

    #[test]
    fn non_pawn_material() {
        let board = Board::starting_position();
        assert!(board.has_non_pawn_material());
        let pawn_ending: Board = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
        assert!(!pawn_ending.has_non_pawn_material());
    }
}
