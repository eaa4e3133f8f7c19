//! 指し手（Move）
//!
//! 6フィールドを1つのu32にパックする。ヒープ割り当てなし、
//! 等価判定は整数比較のみ。
//!
//! レイアウト:
//! - bits 0..3:   種別（MoveKind）
//! - bits 3..10:  移動元（0x88インデックス）
//! - bits 10..17: 移動先（0x88インデックス）
//! - bits 17..21: 動かす駒（Piece.index(), 0xF = なし）
//! - bits 21..25: 取られる駒（Piece.index(), 0xF = なし）
//! - bits 25..28: プロモーション駒種（PieceType.index(), 0x7 = なし）

use super::{Piece, PieceType, Square};

/// 指し手の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MoveKind {
    None = 0,
    Normal = 1,
    /// ポーンの2マス前進（アンパッサン対象を作る）
    PawnDouble = 2,
    EnPassant = 3,
    Castling = 4,
    Promotion = 5,
}

impl MoveKind {
    const fn from_bits(bits: u32) -> MoveKind {
        match bits {
            1 => MoveKind::Normal,
            2 => MoveKind::PawnDouble,
            3 => MoveKind::EnPassant,
            4 => MoveKind::Castling,
            5 => MoveKind::Promotion,
            _ => MoveKind::None,
        }
    }
}

const KIND_SHIFT: u32 = 0;
const FROM_SHIFT: u32 = 3;
const TO_SHIFT: u32 = 10;
const PIECE_SHIFT: u32 = 17;
const CAPTURED_SHIFT: u32 = 21;
const PROMOTION_SHIFT: u32 = 25;

const PIECE_NONE: u32 = 0xF;
const PROMOTION_NONE: u32 = 0x7;

/// パックされた指し手
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// 無効な指し手（番兵）
    pub const NONE: Move = Move(0);

    /// 指し手を生成
    #[inline]
    pub fn new(
        kind: MoveKind,
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        promotion: Option<PieceType>,
    ) -> Move {
        let captured_bits = match captured {
            Some(pc) => pc.index() as u32,
            None => PIECE_NONE,
        };
        let promotion_bits = match promotion {
            Some(pt) => pt.index() as u32,
            None => PROMOTION_NONE,
        };
        Move(
            ((kind as u32) << KIND_SHIFT)
                | ((from.index() as u32) << FROM_SHIFT)
                | ((to.index() as u32) << TO_SHIFT)
                | ((piece.index() as u32) << PIECE_SHIFT)
                | (captured_bits << CAPTURED_SHIFT)
                | (promotion_bits << PROMOTION_SHIFT),
        )
    }

    /// 指し手の種別
    #[inline]
    pub const fn kind(self) -> MoveKind {
        MoveKind::from_bits((self.0 >> KIND_SHIFT) & 0x7)
    }

    /// 移動元
    #[inline]
    pub const fn from(self) -> Square {
        match Square::from_index(((self.0 >> FROM_SHIFT) & 0x7F) as i16) {
            Some(sq) => sq,
            None => Square::A1, // 不正エンコードは is_valid で弾く
        }
    }

    /// 移動先
    #[inline]
    pub const fn to(self) -> Square {
        match Square::from_index(((self.0 >> TO_SHIFT) & 0x7F) as i16) {
            Some(sq) => sq,
            None => Square::A1,
        }
    }

    /// 動かす駒
    #[inline]
    pub fn piece(self) -> Option<Piece> {
        let bits = (self.0 >> PIECE_SHIFT) & 0xF;
        if bits == PIECE_NONE {
            None
        } else {
            Some(Piece::from_index(bits as usize))
        }
    }

    /// 取られる駒（なければNone）
    #[inline]
    pub fn captured(self) -> Option<Piece> {
        let bits = (self.0 >> CAPTURED_SHIFT) & 0xF;
        if bits == PIECE_NONE {
            None
        } else {
            Some(Piece::from_index(bits as usize))
        }
    }

    /// プロモーション先の駒種（なければNone）
    #[inline]
    pub const fn promotion(self) -> Option<PieceType> {
        let bits = (self.0 >> PROMOTION_SHIFT) & 0x7;
        if bits == PROMOTION_NONE {
            None
        } else {
            match bits {
                0 => Some(PieceType::Pawn),
                1 => Some(PieceType::Knight),
                2 => Some(PieceType::Bishop),
                3 => Some(PieceType::Rook),
                4 => Some(PieceType::Queen),
                _ => Some(PieceType::King),
            }
        }
    }

    /// 駒を取る手かどうか
    #[inline]
    pub fn is_capture(self) -> bool {
        (self.0 >> CAPTURED_SHIFT) & 0xF != PIECE_NONE
    }

    /// デコード結果の妥当性チェック
    ///
    /// 種別がNone、マスが盤外エンコード、駒が「なし」のいずれかで拒否する。
    pub fn is_valid(self) -> bool {
        if matches!(self.kind(), MoveKind::None) {
            return false;
        }
        let from_bits = ((self.0 >> FROM_SHIFT) & 0x7F) as i16;
        let to_bits = ((self.0 >> TO_SHIFT) & 0x7F) as i16;
        if Square::from_index(from_bits).is_none() || Square::from_index(to_bits).is_none() {
            return false;
        }
        self.piece().is_some()
    }
}

impl std::fmt::Display for Move {
    /// UCI形式（e2e4, d7d8q）で出力
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(pt) = self.promotion() {
            if let Some(c) = pt.promotion_char() {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn sq(s: &str) -> Square {
        Square::from_uci(s).unwrap()
    }

    #[test]
    fn test_move_pack_roundtrip() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let rook = Piece::new(Color::Black, PieceType::Rook);
        let m = Move::new(MoveKind::Promotion, sq("d7"), sq("d8"), pawn, Some(rook), Some(PieceType::Queen));
        assert_eq!(m.kind(), MoveKind::Promotion);
        assert_eq!(m.from(), sq("d7"));
        assert_eq!(m.to(), sq("d8"));
        assert_eq!(m.piece(), Some(pawn));
        assert_eq!(m.captured(), Some(rook));
        assert_eq!(m.promotion(), Some(PieceType::Queen));
        assert!(m.is_capture());
        assert!(m.is_valid());
    }

    #[test]
    fn test_move_none_invalid() {
        assert!(!Move::NONE.is_valid());
        assert_eq!(Move::NONE.kind(), MoveKind::None);
        assert!(!Move::NONE.is_capture());
    }

    #[test]
    fn test_move_uci_string() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let quiet = Move::new(MoveKind::Normal, sq("e2"), sq("e4"), pawn, None, None);
        assert_eq!(quiet.to_string(), "e2e4");

        let promo = Move::new(MoveKind::Promotion, sq("d7"), sq("d8"), pawn, None, Some(PieceType::Queen));
        assert_eq!(promo.to_string(), "d7d8q");
    }

    #[test]
    fn test_move_equality_is_integer() {
        let pawn = Piece::new(Color::White, PieceType::Pawn);
        let a = Move::new(MoveKind::Normal, sq("e2"), sq("e4"), pawn, None, None);
        let b = Move::new(MoveKind::Normal, sq("e2"), sq("e4"), pawn, None, None);
        assert_eq!(a, b);
    }
}
