//! エンジンの状態（UCIセッション1本分）

use std::sync::Arc;

use rchess_core::search::{Search, DEFAULT_HASH_MB};
use rchess_core::Position;

use crate::search::UciHandler;

/// `setoption`で設定できるオプション一式
#[derive(Clone, Debug)]
pub struct UciOptions {
    pub hash_mb: usize,
    pub ponder: bool,
    pub move_overhead_ms: u64,
}

impl Default for UciOptions {
    fn default() -> Self {
        Self { hash_mb: DEFAULT_HASH_MB, ponder: false, move_overhead_ms: 10 }
    }
}

pub struct EngineState {
    pub position: Position,
    pub search: Search,
    pub opts: UciOptions,
    pub debug: bool,
    /// `isready`で適用する保留中のキャッシュ予算
    pub pending_hash_mb: Option<usize>,
}

impl EngineState {
    pub fn new() -> EngineState {
        EngineState {
            position: Position::startpos(),
            search: Search::new(Arc::new(UciHandler)),
            opts: UciOptions::default(),
            debug: false,
            pending_hash_mb: None,
        }
    }

    /// 保留中のオプションを反映する（探索停止中に呼ぶこと）
    pub fn apply_pending_options(&mut self) {
        if let Some(mb) = self.pending_hash_mb.take() {
            self.search.set_hash_size(mb);
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        EngineState::new()
    }
}
