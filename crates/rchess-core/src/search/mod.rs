//! 探索モジュール
//!
//! 1インスタンスにつき専用ワーカースレッド1本の反復深化探索。
//!
//! - `Search`: 探索ドライバ。idle → running → (stopping) → idle の
//!   状態遷移を管理する
//! - `SearchLimits`: `go`コマンド相当の制約
//! - `TimeManager`: ソフト/ハードの2段階締め切り
//! - `SearchHandler`: 進捗と結果を受け取るコールバック
//!
//! 呼び出し側スレッドとワーカーは、readiness用のチャネル（`start`は
//! ワーカーが局面と制約のコピーを保持するまでブロックする）、協調的な
//! stopフラグ、`stop`でのjoinで同期する。置換表と評価キャッシュは
//! `Search`が所有し、探索中はワーカーだけが触るシングルライタ規律。

mod alpha_beta;
mod limits;
mod qsearch;
mod time_management;
mod worker;

pub use limits::SearchLimits;
pub use time_management::TimeManager;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::position::Position;
use crate::tt::{EvaluationCache, TranspositionTable};
use crate::types::{Depth, Move, Value};

use worker::SearchWorker;

/// キャッシュ予算の既定値（MB）
pub const DEFAULT_HASH_MB: usize = 16;
/// キャッシュ予算の下限（MB）
pub const MIN_HASH_MB: usize = 1;
/// キャッシュ予算の上限（MB）。超過分はここへクランプする
pub const MAX_HASH_MB: usize = 4096;

/// 深さ1つ分の反復が完了するたびの進捗
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: Depth,
    pub value: Value,
    pub nodes: u64,
    pub elapsed: Duration,
    pub pv: Vec<Move>,
}

impl SearchInfo {
    /// 秒あたりノード数
    pub fn nps(&self) -> u64 {
        let millis = self.elapsed.as_millis().max(1) as u64;
        self.nodes * 1000 / millis
    }
}

/// 探索の進捗と結果を受け取るコールバック
///
/// プロトコル層が実装する。ワーカースレッドから呼ばれる。
pub trait SearchHandler: Send + Sync {
    /// 深さ1つ分の反復が完了した
    fn on_iteration(&self, _info: &SearchInfo) {}

    /// 探索が終了した。`ponder_move`はPVの2手目（あれば）
    fn on_result(&self, best_move: Option<Move>, ponder_move: Option<Move>);
}

/// ワーカーと共有するフラグ一式
pub(crate) struct SharedState {
    /// 協調的な停止フラグ
    pub stop: AtomicBool,
    /// ponderhit受信フラグ
    pub ponder_hit: AtomicBool,
    /// ワーカー生存フラグ
    pub searching: AtomicBool,
}

struct Tables {
    tt: TranspositionTable,
    eval_cache: EvaluationCache,
}

impl Tables {
    fn new(hash_mb: usize) -> Tables {
        let bytes = hash_mb.clamp(MIN_HASH_MB, MAX_HASH_MB) << 20;
        // 置換表に3/4、評価キャッシュに1/4を配分
        Tables {
            tt: TranspositionTable::new(bytes / 4 * 3),
            eval_cache: EvaluationCache::new(bytes / 4),
        }
    }
}

/// 探索ドライバ
///
/// `start`で専用ワーカースレッドを1本起こし、`stop`でjoinする。
/// `stop`から戻った時点でエンジンはidleであることが保証される。
pub struct Search {
    handler: Arc<dyn SearchHandler>,
    shared: Arc<SharedState>,
    tables: Arc<Mutex<Tables>>,
    worker: Option<JoinHandle<()>>,
}

impl Search {
    pub fn new(handler: Arc<dyn SearchHandler>) -> Search {
        Search::with_hash_size(handler, DEFAULT_HASH_MB)
    }

    pub fn with_hash_size(handler: Arc<dyn SearchHandler>, hash_mb: usize) -> Search {
        Search {
            handler,
            shared: Arc::new(SharedState {
                stop: AtomicBool::new(false),
                ponder_hit: AtomicBool::new(false),
                searching: AtomicBool::new(false),
            }),
            tables: Arc::new(Mutex::new(Tables::new(hash_mb))),
            worker: None,
        }
    }

    /// キャッシュ予算を変更する（探索中なら先に停止する）
    pub fn set_hash_size(&mut self, hash_mb: usize) {
        self.stop();
        let mut tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        *tables = Tables::new(hash_mb);
        debug!("hash tables resized to {}MB", hash_mb.clamp(MIN_HASH_MB, MAX_HASH_MB));
    }

    /// ワーカーが生きているか
    pub fn is_searching(&self) -> bool {
        self.shared.searching.load(Ordering::SeqCst)
    }

    /// 探索を開始する
    ///
    /// 実行中の探索があれば警告を出して止めてから始める。局面は
    /// ディープコピーされ、以後呼び出し側が`position`をどう変更しても
    /// ワーカーと競合しない。ワーカーが入力を取り込むまでブロックする
    /// ので、直後の`stop`とも競合しない。
    pub fn start(&mut self, position: &Position, limits: SearchLimits) {
        if self.is_searching() {
            warn!("start requested while searching; stopping previous search");
            self.stop();
        }

        self.shared.stop.store(false, Ordering::SeqCst);
        self.shared.ponder_hit.store(false, Ordering::SeqCst);
        self.shared.searching.store(true, Ordering::SeqCst);

        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let tables = Arc::clone(&self.tables);
        let handler = Arc::clone(&self.handler);
        let pos = position.clone();

        let handle = thread::Builder::new()
            .name("rchess-search".to_string())
            .spawn(move || {
                let mut worker = SearchWorker::new(pos, limits, Arc::clone(&shared), handler);
                // 入力を取り込んだ。呼び出し側のブロックを解く
                let _ = ready_tx.send(());
                {
                    let mut tables = tables.lock().unwrap_or_else(|p| p.into_inner());
                    let Tables { tt, eval_cache } = &mut *tables;
                    worker.run(tt, eval_cache);
                }
                shared.searching.store(false, Ordering::SeqCst);
            })
            .expect("failed to spawn search thread");

        self.worker = Some(handle);

        // readinessゲート: ワーカーがコピーを保持するまで待つ
        let _ = ready_rx.recv();
    }

    /// 探索を停止し、ワーカーの終了を待つ
    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                log::error!("search worker panicked");
            }
            self.shared.searching.store(false, Ordering::SeqCst);
        }
    }

    /// ポンダーした手が実際に指された
    ///
    /// ポンダー意味論から通常の時間制探索へ、木を作り直さずに切り替える。
    pub fn ponder_hit(&self) {
        self.shared.ponder_hit.store(true, Ordering::SeqCst);
    }

    /// 新しい対局の開始。両キャッシュを消す（別対局間では無効なため）
    pub fn new_game(&mut self) {
        self.stop();
        let mut tables = self.tables.lock().unwrap_or_else(|p| p.into_inner());
        tables.tt.clear();
        tables.eval_cache.clear();
        debug!("caches cleared for new game");
    }
}

impl Drop for Search {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    /// 結果をチャネルで受けるテスト用ハンドラ
    struct TestHandler {
        tx: Mutex<mpsc::Sender<(Option<Move>, Option<Move>)>>,
    }

    fn test_search() -> (Search, mpsc::Receiver<(Option<Move>, Option<Move>)>) {
        let (tx, rx) = mpsc::channel();
        let handler = Arc::new(TestHandler { tx: Mutex::new(tx) });
        (Search::with_hash_size(handler, 4), rx)
    }

    impl SearchHandler for TestHandler {
        fn on_result(&self, best_move: Option<Move>, ponder_move: Option<Move>) {
            let _ = self.tx.lock().unwrap().send((best_move, ponder_move));
        }
    }

    fn recv_result(
        rx: &mpsc::Receiver<(Option<Move>, Option<Move>)>,
    ) -> (Option<Move>, Option<Move>) {
        rx.recv_timeout(Duration::from_secs(20)).expect("search result not delivered")
    }

    #[test]
    fn test_fixed_depth_finds_mate_in_one() {
        let (mut search, rx) = test_search();
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1").unwrap();
        search.start(&pos, SearchLimits { depth: Some(4), ..Default::default() });
        let (best, _) = recv_result(&rx);
        assert_eq!(best.unwrap().to_string(), "d1d8");
        assert!(!search.is_searching());
    }

    #[test]
    fn test_terminal_root_returns_empty_result() {
        let (mut search, rx) = test_search();
        // ステイルメイト局面
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        search.start(&pos, SearchLimits { depth: Some(3), ..Default::default() });
        let (best, ponder) = recv_result(&rx);
        assert!(best.is_none());
        assert!(ponder.is_none());
    }

    #[test]
    fn test_infinite_search_stops_on_request() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        search.start(&pos, SearchLimits { infinite: true, ..Default::default() });
        assert!(search.is_searching());
        thread::sleep(Duration::from_millis(100));

        let began = Instant::now();
        search.stop();
        assert!(began.elapsed() < Duration::from_secs(5));
        assert!(!search.is_searching());

        // ルートに合法手がある限り、結果はnoneでない
        let (best, _) = recv_result(&rx);
        assert!(best.is_some());
    }

    #[test]
    fn test_restart_stops_previous_search() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        search.start(&pos, SearchLimits { infinite: true, ..Default::default() });
        // 実行中の再スタートは暗黙のstopを伴う
        search.start(&pos, SearchLimits { depth: Some(2), ..Default::default() });
        let first = recv_result(&rx);
        let second = recv_result(&rx);
        assert!(first.0.is_some());
        assert!(second.0.is_some());
        assert!(!search.is_searching());
    }

    #[test]
    fn test_node_budget_bounds_search() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        search.start(&pos, SearchLimits { nodes: Some(10_000), ..Default::default() });
        let (best, _) = recv_result(&rx);
        assert!(best.is_some());
    }

    #[test]
    fn test_movetime_returns_in_time() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        let began = Instant::now();
        search.start(&pos, SearchLimits { move_time_ms: Some(100), ..Default::default() });
        let (best, _) = recv_result(&rx);
        // ハード制限 + 余裕
        assert!(began.elapsed() < Duration::from_secs(10));
        assert!(best.is_some());
    }

    #[test]
    fn test_ponder_holds_result_until_ponderhit() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        search.start(
            &pos,
            SearchLimits {
                move_time_ms: Some(50),
                ponder: true,
                ..Default::default()
            },
        );
        // ponderhitが来るまで結果は保留される
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        search.ponder_hit();
        let (best, _) = recv_result(&rx);
        assert!(best.is_some());
        search.stop();
    }

    #[test]
    fn test_new_game_clears_state() {
        let (mut search, rx) = test_search();
        let pos = Position::startpos();
        search.start(&pos, SearchLimits { depth: Some(3), ..Default::default() });
        let _ = recv_result(&rx);
        // idle状態で呼べること
        search.new_game();
        assert!(!search.is_searching());
    }
}
