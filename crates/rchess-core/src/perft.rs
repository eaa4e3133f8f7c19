//! Perft（指し手生成の検証用ノードカウント）
//!
//! 固定深さまでの合法手列を全列挙して数える。既知の参照値と比較する
//! ことで生成器の正しさを検証する。

use crate::movegen::legal_moves;
use crate::position::Position;

/// 深さ`depth`までの合法手列の数を数える
pub fn perft(pos: &mut Position, depth: i32) -> u64 {
    if depth <= 0 {
        return 1;
    }
    let moves = legal_moves(pos, false);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for &mv in moves.iter() {
        nodes += pos.with_move(mv, |p| perft(p, depth - 1));
    }
    nodes
}

/// ルートの指し手ごとの内訳（UCIの`go perft`出力用）
pub fn perft_divide(pos: &mut Position, depth: i32) -> Vec<(String, u64)> {
    let moves = legal_moves(pos, false);
    let mut result = Vec::with_capacity(moves.len());
    for &mv in moves.iter() {
        let nodes = pos.with_move(mv, |p| perft(p, depth - 1));
        result.push((mv.to_string(), nodes));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::FEN_STARTPOS;

    #[test]
    fn test_perft_startpos() {
        let mut pos = Position::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
        assert_eq!(perft(&mut pos, 4), 197_281);
    }

    #[test]
    fn test_perft_kiwipete() {
        // キャスリング・アンパッサン・プロモーションが絡む定番の検証局面
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2_039);
        assert_eq!(perft(&mut pos, 3), 97_862);
    }

    #[test]
    fn test_perft_en_passant_pin() {
        // アンパッサンで自玉が開き王手になる局面
        let mut pos = Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut pos, 1), 14);
        assert_eq!(perft(&mut pos, 2), 191);
        assert_eq!(perft(&mut pos, 3), 2_812);
    }

    #[test]
    fn test_perft_divide_sums_to_total() {
        let mut pos = Position::from_fen(FEN_STARTPOS).unwrap();
        let divide = perft_divide(&mut pos, 3);
        assert_eq!(divide.len(), 20);
        let total: u64 = divide.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 8_902);
    }
}
