//! キャッシュモジュール
//!
//! Zobristキーで引く固定容量のダイレクトマップ表が2つ。
//!
//! - `TranspositionTable`: 探索結果のキャッシュ。同一キーへの書き込みは
//!   深さ優先（浅い結果が深い結果を上書きしない）
//! - `EvaluationCache`: 静的評価のキャッシュ。常に上書き
//!
//! どちらもバイト予算から容量を1回だけ計算し、以後再割り当てしない。

mod eval_cache;
mod table;

pub use eval_cache::EvaluationCache;
pub use table::{TranspositionTable, TtEntry};

/// バイト予算の下限（これ未満は切り上げ）
pub const MIN_TABLE_BYTES: usize = 1024;
