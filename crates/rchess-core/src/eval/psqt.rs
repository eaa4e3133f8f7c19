//! Piece-Square Table（PST）
//!
//! 駒種ごとに中盤用と終盤用の64マステーブルを持つ。基本テーブルは
//! 白視点（ランク1が先頭行）で記述し、黒用はランク反転（`sq ^ 56`）で
//! 初回アクセス時に展開する。

use once_cell::sync::Lazy;

use crate::types::{Color, Piece, PieceType, Square};

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     10,  10,  10,  10,  10,  10,  10,  10,
     10,  10,  10,  10,  10,  10,  10,  10,
     15,  15,  15,  15,  15,  15,  15,  15,
     25,  25,  25,  25,  25,  25,  25,  25,
     45,  45,  45,  45,  45,  45,  45,  45,
     80,  80,  80,  80,  80,  80,  80,  80,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    -40, -30, -20, -20, -20, -20, -30, -40,
    -30, -10,   0,   0,   0,   0, -10, -30,
    -20,   0,   5,  10,  10,   5,   0, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -20,   0,  10,  15,  15,  10,   0, -20,
    -20,   0,   5,  10,  10,   5,   0, -20,
    -30, -10,   0,   0,   0,   0, -10, -30,
    -40, -30, -20, -20, -20, -20, -30, -40,
];

#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const BISHOP_EG: [i32; 64] = [
    -15, -10,  -5,  -5,  -5,  -5, -10, -15,
    -10,   0,   0,   0,   0,   0,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -15, -10,  -5,  -5,  -5,  -5, -10, -15,
];

#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const ROOK_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      5,   5,   5,   5,   5,   5,   5,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const QUEEN_EG: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,  10,  10,   5,   0,  -5,
     -5,   0,   5,  10,  10,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -50, -30, -30, -30, -30, -30, -30, -50,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -50, -40, -30, -20, -20, -30, -40, -50,
];

const MG_TABLES: [&[i32; 64]; PieceType::NUM] =
    [&PAWN_MG, &KNIGHT_MG, &BISHOP_MG, &ROOK_MG, &QUEEN_MG, &KING_MG];
const EG_TABLES: [&[i32; 64]; PieceType::NUM] =
    [&PAWN_EG, &KNIGHT_EG, &BISHOP_EG, &ROOK_EG, &QUEEN_EG, &KING_EG];

/// 両手番分に展開済みのPST
pub struct Psqt {
    pub mg: [[[i32; 64]; PieceType::NUM]; Color::NUM],
    pub eg: [[[i32; 64]; PieceType::NUM]; Color::NUM],
}

/// 展開済みテーブル（初回アクセス時に黒用のランク反転を済ませる）
pub static PSQT: Lazy<Psqt> = Lazy::new(|| {
    let mut psqt = Psqt {
        mg: [[[0; 64]; PieceType::NUM]; Color::NUM],
        eg: [[[0; 64]; PieceType::NUM]; Color::NUM],
    };
    for kind in PieceType::ALL {
        for sq64 in 0..64 {
            let k = kind.index();
            psqt.mg[Color::White.index()][k][sq64] = MG_TABLES[k][sq64];
            psqt.eg[Color::White.index()][k][sq64] = EG_TABLES[k][sq64];
            // 黒はランク反転
            psqt.mg[Color::Black.index()][k][sq64] = MG_TABLES[k][sq64 ^ 56];
            psqt.eg[Color::Black.index()][k][sq64] = EG_TABLES[k][sq64 ^ 56];
        }
    }
    psqt
});

/// 中盤のPST値
#[inline]
pub fn psqt_mg(pc: Piece, sq: Square) -> i32 {
    PSQT.mg[pc.color.index()][pc.kind.index()][sq.index64()]
}

/// 終盤のPST値
#[inline]
pub fn psqt_eg(pc: Piece, sq: Square) -> i32 {
    PSQT.eg[pc.color.index()][pc.kind.index()][sq.index64()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psqt_mirrored() {
        // 白e4と黒e5は鏡像なので同じ値
        let e4 = Square::from_uci("e4").unwrap();
        let e5 = Square::from_uci("e5").unwrap();
        let wp = Piece::new(Color::White, PieceType::Pawn);
        let bp = Piece::new(Color::Black, PieceType::Pawn);
        assert_eq!(psqt_mg(wp, e4), psqt_mg(bp, e5));
        assert_eq!(psqt_eg(wp, e4), psqt_eg(bp, e5));
    }

    #[test]
    fn test_psqt_center_pawn_preferred() {
        let e2 = Square::from_uci("e2").unwrap();
        let e4 = Square::from_uci("e4").unwrap();
        let wp = Piece::new(Color::White, PieceType::Pawn);
        assert!(psqt_mg(wp, e4) > psqt_mg(wp, e2));
    }
}
