//! Forsyth-Edwards Notation parsing and emission for [`Board`].

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castle_rights::CastleRights;
use crate::error::FenError;
use crate::piece::{Color, Piece, PieceKind};
use crate::square::{File, Rank, Square};

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount {
                found: fields.len(),
            });
        }

        // Field 1: piece placement, rank 8 down to rank 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount { found: ranks.len() });
        }

        let mut pieces = [Bitboard::EMPTY; PieceKind::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = Rank::ALL[7 - row];
            let mut file_index: usize = 0;

            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    if !(1..=8).contains(&run) {
                        return Err(FenError::InvalidPiece { character: c });
                    }
                    file_index += run as usize;
                } else {
                    let piece = Piece::from_fen_char(c)
                        .ok_or(FenError::InvalidPiece { character: c })?;
                    if file_index >= 8 {
                        return Err(FenError::RankWidth {
                            rank: row,
                            squares: file_index + 1,
                        });
                    }
                    let sq = Square::new(File::ALL[file_index], rank);
                    pieces[piece.kind().index()] |= sq.bitboard();
                    sides[piece.color().index()] |= sq.bitboard();
                    file_index += 1;
                }
            }

            if file_index != 8 {
                return Err(FenError::RankWidth {
                    rank: row,
                    squares: file_index,
                });
            }
        }

        // Field 2: active color.
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidColor {
                    found: other.to_string(),
                });
            }
        };

        // Field 3: castling availability.
        let castling = CastleRights::from_fen(fields[2])?;

        // Field 4: en passant target.
        let en_passant = match fields[3] {
            "-" => None,
            s => Some(Square::from_algebraic(s).ok_or_else(|| FenError::InvalidEnPassant {
                found: s.to_string(),
            })?),
        };

        // Fields 5 and 6: move counters.
        let halfmove_clock = fields[4]
            .parse()
            .map_err(|_| FenError::InvalidCounter {
                field: "halfmove clock",
                found: fields[4].to_string(),
            })?;
        let fullmove_number = fields[5]
            .parse()
            .map_err(|_| FenError::InvalidCounter {
                field: "fullmove number",
                found: fields[5].to_string(),
            })?;

        let board = Board::from_raw(
            pieces,
            sides,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        );
        board.validate()?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            let rank = Rank::ALL[7 - row];
            let mut run = 0;
            for file in File::ALL {
                let sq = Square::new(file, rank);
                match (self.piece_on(sq), self.color_on(sq)) {
                    (Some(kind), Some(color)) => {
                        if run > 0 {
                            write!(f, "{run}")?;
                            run = 0;
                        }
                        write!(f, "{}", Piece::new(kind, color).fen_char())?;
                    }
                    _ => run += 1,
                }
            }
            if run > 0 {
                write!(f, "{run}")?;
            }
            if row < 7 {
                write!(f, "/")?;
            }
        }

        write!(f, " {}", self.side_to_move())?;
        write!(f, " {}", self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}

#[cfg(test)]
mod tests {
    use super::STARTING_FEN;
    use crate::board::Board;

    fn roundtrip(fen: &str) {
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_string(), fen);
        let reparsed: Board = board.to_string().parse().unwrap();
        assert_eq!(board, reparsed);
    }

    #[test]
    fn roundtrips() {
        roundtrip(STARTING_FEN);
        roundtrip("rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2");
        roundtrip("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        roundtrip("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1");
        roundtrip("4k3/8/8/8/8/8/8/4K3 b - - 12 34");
    }

    #[test]
    fn parse_counts_and_state() {
        let board: Board =
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".parse().unwrap();
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
        assert_eq!(board.en_passant().map(|s| s.to_string()), Some("e3".into()));
    }

    #[test]
    fn rejects_malformed_fens() {
        let bad = [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -", // 5 fields
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",      // 7 ranks
            "rnbqkbnr/ppppXppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // bad piece
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", // short rank
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1", // bad color
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KXkq - 0 1", // bad castling
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq j9 0 1", // bad ep
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",  // bad clock
            "8/8/8/8/8/8/8/8 w - - 0 1",                                 // no kings
            "kK6/8/8/8/8/8/8/P7 w - - 0 1 P8",                           // trailing junk
        ];
        for fen in bad {
            assert!(fen.parse::<Board>().is_err(), "accepted {fen:?}");
        }
    }

    #[test]
    fn rejects_pawns_on_back_rank() {
        assert!("P3k3/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().is_err());
    }

    #[test]
    fn rejects_capturable_king() {
        // Black is in check but White is to move.
        assert!("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().is_err());
        assert!("4k3/4R3/8/8/8/8/8/4K3 b - - 0 1".parse::<Board>().is_ok());
    }
}
