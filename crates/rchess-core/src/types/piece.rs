//! 駒（Piece / PieceType）

use super::Color;

/// 駒種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl PieceType {
    /// 駒種の数
    pub const NUM: usize = 6;

    /// キング以外の駒種の数（駒リスト用）
    pub const NUM_NON_KING: usize = 5;

    /// 全駒種
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// プロモーション先の駒種
    pub const PROMOTIONS: [PieceType; 4] =
        [PieceType::Queen, PieceType::Rook, PieceType::Bishop, PieceType::Knight];

    /// インデックスとして使用（配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// マテリアル値（centipawn）
    #[inline]
    pub const fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 325,
            PieceType::Bishop => 325,
            PieceType::Rook => 500,
            PieceType::Queen => 975,
            PieceType::King => 20000,
        }
    }

    /// ゲームフェーズへの寄与（ナイト/ビショップ=1, ルーク=2, クイーン=4）
    #[inline]
    pub const fn phase_weight(self) -> i32 {
        match self {
            PieceType::Knight | PieceType::Bishop => 1,
            PieceType::Rook => 2,
            PieceType::Queen => 4,
            _ => 0,
        }
    }

    /// プロモーション文字（UCI形式: q, r, b, n）
    pub const fn promotion_char(self) -> Option<char> {
        match self {
            PieceType::Knight => Some('n'),
            PieceType::Bishop => Some('b'),
            PieceType::Rook => Some('r'),
            PieceType::Queen => Some('q'),
            _ => None,
        }
    }

    /// プロモーション文字から駒種へ
    pub const fn from_promotion_char(c: char) -> Option<PieceType> {
        match c {
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'r' => Some(PieceType::Rook),
            'q' => Some(PieceType::Queen),
            _ => None,
        }
    }
}

/// 駒（手番 + 駒種）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceType,
}

impl Piece {
    /// 駒の種類数（白黒 x 6駒種）
    pub const NUM: usize = 12;

    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Piece {
        Piece { color, kind }
    }

    /// インデックスとして使用（Zobristテーブル等の配列アクセス用）
    #[inline]
    pub const fn index(self) -> usize {
        self.color.index() * PieceType::NUM + self.kind.index()
    }

    /// インデックスから駒へ（`index()`の逆変換）
    #[inline]
    pub const fn from_index(index: usize) -> Piece {
        let color = if index < PieceType::NUM { Color::White } else { Color::Black };
        let kind = match index % PieceType::NUM {
            0 => PieceType::Pawn,
            1 => PieceType::Knight,
            2 => PieceType::Bishop,
            3 => PieceType::Rook,
            4 => PieceType::Queen,
            _ => PieceType::King,
        };
        Piece::new(color, kind)
    }

    /// FEN文字から駒へ（大文字=白、小文字=黒）
    pub const fn from_fen_char(c: char) -> Option<Piece> {
        let (color, lower) = if c.is_ascii_uppercase() {
            (Color::White, c.to_ascii_lowercase())
        } else {
            (Color::Black, c)
        };
        let kind = match lower {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some(Piece::new(color, kind))
    }

    /// FEN文字へ
    pub const fn to_fen_char(self) -> char {
        let c = match self.kind {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_type_value() {
        assert_eq!(PieceType::Pawn.value(), 100);
        assert_eq!(PieceType::Queen.value(), 975);
        assert!(PieceType::King.value() > PieceType::Queen.value());
    }

    #[test]
    fn test_piece_index_unique() {
        let mut seen = [false; Piece::NUM];
        for color in [Color::White, Color::Black] {
            for kind in PieceType::ALL {
                let idx = Piece::new(color, kind).index();
                assert!(!seen[idx]);
                seen[idx] = true;
            }
        }
    }

    #[test]
    fn test_piece_fen_char_roundtrip() {
        for c in ['P', 'N', 'B', 'R', 'Q', 'K', 'p', 'n', 'b', 'r', 'q', 'k'] {
            let pc = Piece::from_fen_char(c).unwrap();
            assert_eq!(pc.to_fen_char(), c);
        }
        assert!(Piece::from_fen_char('x').is_none());
    }

    #[test]
    fn test_promotion_char() {
        assert_eq!(PieceType::Queen.promotion_char(), Some('q'));
        assert_eq!(PieceType::from_promotion_char('q'), Some(PieceType::Queen));
        assert_eq!(PieceType::from_promotion_char('k'), None);
        assert_eq!(PieceType::Pawn.promotion_char(), None);
    }
}
