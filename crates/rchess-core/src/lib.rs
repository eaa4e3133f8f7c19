//! # rchess-core
//!
//! UCI チェスエンジンのコアライブラリ。
//!
//! ## モジュール構成
//!
//! - `types`: 基本型（Color, Square, Piece, Move, Value, Bound）
//! - `position`: 局面表現と make_move / undo_move（0x88盤面・Zobristハッシュ）
//! - `movegen`: 疑似合法手・合法手の生成とフェーズ式ジェネレータ
//! - `eval`: 局面評価（マテリアル + PST + モビリティ）
//! - `tt`: 置換表（Transposition Table）と評価キャッシュ
//! - `search`: 反復深化 Alpha-Beta 探索と時間管理・スレッドライフサイクル
//! - `perft`: 指し手生成の検証用ノードカウント

pub mod types;

pub mod position;

pub mod movegen;

pub mod eval;

pub mod tt;

pub mod search;

pub mod perft;

pub use position::{FenError, Position, FEN_STARTPOS};
pub use types::{Bound, Color, Move, MoveKind, Piece, PieceType, Square, Value};
