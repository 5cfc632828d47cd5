//! Error types for FEN parsing and board validation.

use thiserror::Error;

/// Failure to parse a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 FEN fields, found {found}")]
    FieldCount { found: usize },

    #[error("expected 8 ranks in piece placement, found {found}")]
    RankCount { found: usize },

    #[error("rank {rank} of the piece placement covers {squares} squares")]
    RankWidth { rank: usize, squares: usize },

    #[error("invalid piece character '{character}'")]
    InvalidPiece { character: char },

    #[error("active color must be 'w' or 'b', found \"{found}\"")]
    InvalidColor { found: String },

    #[error("invalid castling character '{character}'")]
    InvalidCastling { character: char },

    #[error("invalid en passant square \"{found}\"")]
    InvalidEnPassant { found: String },

    #[error("invalid {field} \"{found}\"")]
    InvalidCounter { field: &'static str, found: String },

    #[error("position fails validation: {source}")]
    InvalidPosition {
        #[from]
        source: BoardError,
    },
}

/// Structural problems with a board position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("expected exactly 1 {color} king, found {count}")]
    KingCount { color: &'static str, count: u32 },

    #[error("pawns on the first or eighth rank")]
    PawnsOnBackRank,

    #[error("piece bitboards overlap")]
    OverlappingPieces,

    #[error("side bitboards are inconsistent with the occupancy")]
    InconsistentOccupancy,

    #[error("the side not to move is in check")]
    OppositeKingInCheck,
}
