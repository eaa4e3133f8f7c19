//! 局面操作のシナリオテスト
//!
//! FEN入出力・make/undo・Zobristキーの整合を、実戦的な手順で確認する。

use rchess_core::movegen::legal_moves;
use rchess_core::{Position, FEN_STARTPOS};

fn apply(pos: &mut Position, uci: &str) {
    let mv = legal_moves(pos, false)
        .iter()
        .copied()
        .find(|m| m.to_string() == uci)
        .unwrap_or_else(|| panic!("no legal move {uci} in {}", pos.to_fen()));
    pos.make_move(mv);
}

#[test]
fn test_scenario_e2e4() {
    let mut pos = Position::from_fen(FEN_STARTPOS).unwrap();
    apply(&mut pos, "e2e4");
    assert_eq!(pos.to_fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
}

#[test]
fn test_scenario_promotion() {
    let mut pos = Position::from_fen("8/3P4/6K1/8/8/1k6/8/8 w - - 0 0").unwrap();
    apply(&mut pos, "d7d8q");
    assert_eq!(pos.to_fen(), "3Q4/8/6K1/8/8/1k6/8/8 b - - 0 1");
}

#[test]
fn test_scenario_castling() {
    let mut pos = Position::from_fen(
        "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 0",
    )
    .unwrap();
    apply(&mut pos, "e1g1");
    assert_eq!(
        pos.to_fen(),
        "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 1 1"
    );
}

#[test]
fn test_make_undo_inverse_over_game() {
    // キャスリング・アンパッサン・プロモーションを含む手順を進めて
    // 全て巻き戻すと、キーとFENが各局面で元通りになる
    let line = [
        "e2e4", "e7e5", "g1f3", "g8f6", "f1c4", "f8c5", "e1g1", "e8g8", "d2d4", "e5d4", "e4e5",
        "d7d5", "e5d6", // en passant
    ];

    let mut pos = Position::from_fen(FEN_STARTPOS).unwrap();
    let mut keys = vec![pos.key()];
    let mut fens = vec![pos.to_fen()];

    for uci in line {
        apply(&mut pos, uci);
        keys.push(pos.key());
        fens.push(pos.to_fen());
    }

    for i in (0..line.len()).rev() {
        pos.undo_move();
        assert_eq!(pos.key(), keys[i], "key mismatch after undo to ply {i}");
        assert_eq!(pos.to_fen(), fens[i], "fen mismatch after undo to ply {i}");
    }
}

#[test]
fn test_transposition_same_key() {
    // 手順前後で同一局面に合流すればキーも一致する
    let mut a = Position::from_fen(FEN_STARTPOS).unwrap();
    for uci in ["g1f3", "g8f6", "b1c3"] {
        apply(&mut a, uci);
    }
    let mut b = Position::from_fen(FEN_STARTPOS).unwrap();
    for uci in ["b1c3", "g8f6", "g1f3"] {
        apply(&mut b, uci);
    }
    assert_eq!(a.key(), b.key());
    assert_eq!(a.to_fen(), b.to_fen());
}

#[test]
fn test_fen_roundtrip_along_line() {
    let mut pos = Position::from_fen(FEN_STARTPOS).unwrap();
    for uci in ["d2d4", "d7d5", "c2c4", "d5c4", "e2e4", "b7b5"] {
        apply(&mut pos, uci);
        let fen = pos.to_fen();
        let reparsed = Position::from_fen(&fen).unwrap();
        assert_eq!(reparsed.to_fen(), fen);
        assert_eq!(reparsed.key(), pos.key());
    }
}
