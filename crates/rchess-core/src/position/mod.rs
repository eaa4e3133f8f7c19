//! 局面表現モジュール
//!
//! チェスの局面を表現し、手の実行・巻き戻しを行う。
//!
//! - `Position`: 局面本体（0x88盤面配列・駒リスト・手番・キャスリング権・手数）
//! - `StateInfo`: 1ply分の巻き戻し情報（キャスリング権、アンパッサン、
//!   ハーフムーブクロック、Zobristキー、王手キャッシュ、指した手）
//! - `Zobrist`: Zobristハッシュ乱数テーブル（駒×升・キャスリング・アンパッサン・手番）
//! - `make_move` / `undo_move` / `make_null_move`: 手の実行と巻き戻し
//! - FEN形式の解析・出力
//!
//! 盤面配列・駒リスト・マテリアル・Zobristキーは `Position` のメソッド
//! （`put_piece` / `remove_piece` / `make_move` 系）を通じて更新されることを前提とし、
//! 常に互いに整合しているように保つ。

mod fen;
mod pos;
mod zobrist;

pub use fen::{FenError, FEN_STARTPOS};
pub use pos::{
    Position, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN,
    MAX_GAME_PLY,
};
pub use zobrist::{zobrist_castling, zobrist_en_passant, zobrist_psq, zobrist_side, ZOBRIST};
