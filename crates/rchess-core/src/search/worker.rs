//! 探索ワーカー（反復深化ドライバ）
//!
//! ワーカースレッド上で動く。ルート合法手を1回だけ生成し、深さを
//! 増やしながらルート探索を繰り返す。各深さの完了時に進捗を通知し、
//! 最後に最善手とポンダー候補をハンドラへ届ける。

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use super::alpha_beta::{PvLine, SearchRun};
use super::limits::SearchLimits;
use super::time_management::TimeManager;
use super::{SearchHandler, SearchInfo, SharedState};
use crate::movegen::{legal_moves, MoveList};
use crate::position::Position;
use crate::tt::{EvaluationCache, TranspositionTable};
use crate::types::{Depth, Move, MAX_PLY};

/// 結果保留中（infinite/ponder）のポーリング間隔
const HOLD_POLL_MS: u64 = 2;

pub(super) struct SearchWorker {
    pos: Position,
    limits: SearchLimits,
    time: TimeManager,
    shared: Arc<SharedState>,
    handler: Arc<dyn SearchHandler>,
}

impl SearchWorker {
    pub(super) fn new(
        pos: Position,
        limits: SearchLimits,
        shared: Arc<SharedState>,
        handler: Arc<dyn SearchHandler>,
    ) -> SearchWorker {
        let time = TimeManager::new(&limits, pos.side_to_move());
        SearchWorker { pos, limits, time, shared, handler }
    }

    pub(super) fn run(&mut self, tt: &mut TranspositionTable, eval_cache: &mut EvaluationCache) {
        let mut root_moves = legal_moves(&mut self.pos, false);

        // ルート手の部分集合指定
        if !self.limits.search_moves.is_empty() {
            let mut filtered = MoveList::new();
            for &mv in root_moves.iter() {
                if self.limits.search_moves.contains(&mv) {
                    filtered.push(mv);
                }
            }
            root_moves = filtered;
        }

        // 合法手なし: 探索ループに入らず空の結果を返す
        if root_moves.is_empty() {
            info!("no legal root moves (mate or stalemate)");
            self.hold_result();
            self.handler.on_result(None, None);
            return;
        }

        let (start_depth, max_depth) = self.depth_bounds();
        debug!(
            "search start: depth {start_depth}..={max_depth} root_moves={}",
            root_moves.len()
        );

        // 即座にstopされても返せる手を持っておく
        let mut best_move: Option<Move> = Some(root_moves[0]);
        let mut ponder_move: Option<Move> = None;

        let mut run = SearchRun::new(
            &mut self.pos,
            tt,
            eval_cache,
            &self.time,
            self.shared.as_ref(),
            &self.limits,
        );

        for depth in start_depth..=max_depth {
            let mut pv = PvLine::new();
            let value = run.search_root(&root_moves, depth, &mut pv);

            if let Some(&first) = pv.as_slice().first() {
                best_move = Some(first);
                ponder_move = pv.as_slice().get(1).copied();
                // 次の反復では前回の最善手を最初に探索する
                root_moves.move_to_front(first);

                if !run.aborted {
                    self.handler.on_iteration(&SearchInfo {
                        depth,
                        value,
                        nodes: run.nodes,
                        elapsed: self.time.elapsed(),
                        pv: pv.as_slice().to_vec(),
                    });
                }
            }

            if run.aborted {
                break;
            }
            // 強制詰みが見つかったらそれ以上深くしない
            if value.is_mate_score() {
                debug!("mate score at depth {depth}, stopping deepening");
                break;
            }
            if !self.limits.infinite && !run.pondering() && self.time.soft_limit_reached() {
                break;
            }
        }

        let nodes = run.nodes;
        drop(run);

        self.hold_result();

        info!(
            "search done: best={} nodes={nodes} elapsed={}ms",
            best_move.map(|m| m.to_string()).unwrap_or_else(|| "(none)".to_string()),
            self.time.elapsed().as_millis()
        );
        self.handler.on_result(best_move, ponder_move);
    }

    /// infinite/ponderではstop（またはponderhit）が来るまで結果を出さない
    fn hold_result(&self) {
        while !self.shared.stop.load(Ordering::SeqCst)
            && (self.limits.infinite
                || (self.limits.ponder && !self.shared.ponder_hit.load(Ordering::SeqCst)))
        {
            thread::sleep(Duration::from_millis(HOLD_POLL_MS));
        }
    }

    /// モードごとの開始深さと最大深さ
    ///
    /// - 詰み探索: 詰み距離で開始かつ打ち止め
    /// - 固定深さ: その深さで開始かつ打ち止め（時間制約と併用なら1から）
    /// - 時間制: 1から上限（深さキャップがあればそこ）まで
    fn depth_bounds(&self) -> (Depth, Depth) {
        let hard_cap = (MAX_PLY - 1) as Depth;
        let has_clock = self.limits.move_time_ms.is_some()
            || self.limits.time_for(self.pos.side_to_move()).is_some();

        if let Some(mate) = self.limits.mate {
            // N手詰み = 2N-1 ply
            let d = (2 * mate - 1).clamp(1, hard_cap);
            (d, d)
        } else if let Some(depth) = self.limits.depth {
            let d = depth.clamp(1, hard_cap);
            if has_clock {
                (1, d)
            } else {
                (d, d)
            }
        } else {
            (1, hard_cap)
        }
    }
}
