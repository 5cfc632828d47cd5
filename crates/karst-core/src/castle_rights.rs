//! Castling availability as a four-bit mask.

use std::fmt;

use crate::error::FenError;
use crate::piece::Color;

/// Castling rights: bit 0 = white king-side, bit 1 = white queen-side,
/// bit 2 = black king-side, bit 3 = black queen-side.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastleRights(u8);

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const ALL: CastleRights = CastleRights(0b1111);

    pub const WHITE_KING_SIDE: CastleRights = CastleRights(0b0001);
    pub const WHITE_QUEEN_SIDE: CastleRights = CastleRights(0b0010);
    pub const BLACK_KING_SIDE: CastleRights = CastleRights(0b0100);
    pub const BLACK_QUEEN_SIDE: CastleRights = CastleRights(0b1000);

    pub const WHITE_BOTH: CastleRights = CastleRights(0b0011);
    pub const BLACK_BOTH: CastleRights = CastleRights(0b1100);

    /// Raw bits in 0..16 — usable directly as a Zobrist table index.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, other: CastleRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn insert(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 | other.0)
    }

    #[inline]
    pub const fn remove(self, other: CastleRights) -> CastleRights {
        CastleRights(self.0 & !other.0)
    }

    /// Both rights for one color.
    #[inline]
    pub const fn both(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_BOTH,
            Color::Black => Self::BLACK_BOTH,
        }
    }

    /// King-side right for one color.
    #[inline]
    pub const fn king_side(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_KING_SIDE,
            Color::Black => Self::BLACK_KING_SIDE,
        }
    }

    /// Queen-side right for one color.
    #[inline]
    pub const fn queen_side(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_QUEEN_SIDE,
            Color::Black => Self::BLACK_QUEEN_SIDE,
        }
    }

    /// Parse the FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(s: &str) -> Result<CastleRights, FenError> {
        if s == "-" {
            return Ok(CastleRights::NONE);
        }
        let mut rights = CastleRights::NONE;
        for c in s.chars() {
            let flag = match c {
                'K' => Self::WHITE_KING_SIDE,
                'Q' => Self::WHITE_QUEEN_SIDE,
                'k' => Self::BLACK_KING_SIDE,
                'q' => Self::BLACK_QUEEN_SIDE,
                _ => return Err(FenError::InvalidCastling { character: c }),
            };
            rights = rights.insert(flag);
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (flag, c) in [
            (Self::WHITE_KING_SIDE, 'K'),
            (Self::WHITE_QUEEN_SIDE, 'Q'),
            (Self::BLACK_KING_SIDE, 'k'),
            (Self::BLACK_QUEEN_SIDE, 'q'),
        ] {
            if self.contains(flag) {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::CastleRights;
    use crate::piece::Color;

    #[test]
    fn insert_and_remove() {
        let rights = CastleRights::NONE
            .insert(CastleRights::WHITE_KING_SIDE)
            .insert(CastleRights::BLACK_QUEEN_SIDE);
        assert!(rights.contains(CastleRights::WHITE_KING_SIDE));
        assert!(!rights.contains(CastleRights::WHITE_QUEEN_SIDE));

        let rights = rights.remove(CastleRights::WHITE_KING_SIDE);
        assert!(!rights.contains(CastleRights::WHITE_KING_SIDE));
        assert!(rights.contains(CastleRights::BLACK_QUEEN_SIDE));
    }

    #[test]
    fn per_color_accessors() {
        assert_eq!(CastleRights::both(Color::White), CastleRights::WHITE_BOTH);
        assert_eq!(
            CastleRights::king_side(Color::Black),
            CastleRights::BLACK_KING_SIDE
        );
        assert_eq!(
            CastleRights::queen_side(Color::White),
            CastleRights::WHITE_QUEEN_SIDE
        );
    }

    #[test]
    fn fen_roundtrip() {
        for s in ["KQkq", "KQ", "kq", "Kq", "Qk", "-"] {
            let rights = CastleRights::from_fen(s).unwrap();
            let reparsed = CastleRights::from_fen(&rights.to_string()).unwrap();
            assert_eq!(rights, reparsed, "roundtrip failed for {s}");
        }
        assert_eq!(CastleRights::from_fen("KQkq").unwrap(), CastleRights::ALL);
        assert_eq!(CastleRights::from_fen("-").unwrap(), CastleRights::NONE);
    }

    #[test]
    fn fen_rejects_unknown_chars() {
        assert!(CastleRights::from_fen("KXkq").is_err());
        assert!(CastleRights::from_fen("0").is_err());
    }

    #[test]
    fn bits_fit_zobrist_index() {
        assert!(CastleRights::ALL.bits() < 16);
        assert_eq!(CastleRights::NONE.bits(), 0);
    }
}
