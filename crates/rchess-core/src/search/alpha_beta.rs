//! Alpha-Beta探索の本体
//!
//! fail-softのnegamax + Principal Variation Search。置換表のprobe/store、
//! mate distance pruning、null move pruning、王手延長、葉での静止探索を備える。
//!
//! 指し手は各plyに1個ずつ事前確保したフェーズ式ジェネレータから遅延で
//! 取り出し、カットオフ時に残りの生成コストを払わない。make/undoは
//! カットオフの分岐より前に必ず対で実行する。

use smallvec::SmallVec;

use super::limits::SearchLimits;
use super::time_management::TimeManager;
use super::SharedState;
use crate::movegen::MoveGenerator;
use crate::position::Position;
use crate::tt::{EvaluationCache, TranspositionTable};
use crate::types::{Bound, Depth, Move, Value, MAX_PLY};

use std::sync::atomic::Ordering;

/// 中断チェックの間隔（ノード数、2の冪）
const ABORT_CHECK_INTERVAL: u64 = 2048;

/// 主要変化（PV）
#[derive(Debug, Clone, Default)]
pub struct PvLine {
    moves: SmallVec<[Move; 32]>,
}

impl PvLine {
    pub fn new() -> PvLine {
        PvLine { moves: SmallVec::new() }
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// `first`に子ノードのPVを繋げる
    pub fn load(&mut self, first: Move, rest: &PvLine) {
        self.moves.clear();
        self.moves.push(first);
        self.moves.extend_from_slice(rest.as_slice());
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }
}

/// 詰みスコアをノード相対からルート相対に直して置換表へ
#[inline]
pub(super) fn value_to_tt(value: Value, ply: usize) -> Value {
    if value.is_win() {
        value + Value::new(ply as i32)
    } else if value.is_loss() {
        value - Value::new(ply as i32)
    } else {
        value
    }
}

/// 置換表の詰みスコアを現在のノード相対に戻す
#[inline]
pub(super) fn value_from_tt(value: Value, ply: usize) -> Value {
    if value.is_win() {
        value - Value::new(ply as i32)
    } else if value.is_loss() {
        value + Value::new(ply as i32)
    } else {
        value
    }
}

/// 1回の探索のコンテキスト
///
/// ワーカースレッドだけが触る。置換表と評価キャッシュはロック済みの
/// 可変参照で受け取る（シングルライタ規律）。
pub(crate) struct SearchRun<'a> {
    pub(super) pos: &'a mut Position,
    pub(super) tt: &'a mut TranspositionTable,
    pub(super) eval_cache: &'a mut EvaluationCache,
    pub(super) time: &'a TimeManager,
    pub(super) shared: &'a SharedState,
    pub(super) limits: &'a SearchLimits,
    /// plyごとのフェーズ式ジェネレータ（再確保しない）
    pub(super) generators: Vec<MoveGenerator>,
    pub(super) nodes: u64,
    pub(super) aborted: bool,
}

impl<'a> SearchRun<'a> {
    pub(super) fn new(
        pos: &'a mut Position,
        tt: &'a mut TranspositionTable,
        eval_cache: &'a mut EvaluationCache,
        time: &'a TimeManager,
        shared: &'a SharedState,
        limits: &'a SearchLimits,
    ) -> SearchRun<'a> {
        SearchRun {
            pos,
            tt,
            eval_cache,
            time,
            shared,
            limits,
            generators: (0..MAX_PLY).map(|_| MoveGenerator::new()).collect(),
            nodes: 0,
            aborted: false,
        }
    }

    /// ポンダー中か（ponderhitが来るまで時間制限を適用しない）
    #[inline]
    pub(super) fn pondering(&self) -> bool {
        self.limits.ponder && !self.shared.ponder_hit.load(Ordering::SeqCst)
    }

    /// 協調的な中断チェック
    ///
    /// stopフラグ・ノード予算は常に、ハード時間制限はポンダー中と
    /// infinite以外で確認する。
    pub(super) fn check_abort(&mut self) {
        if self.aborted {
            return;
        }
        if self.shared.stop.load(Ordering::SeqCst) {
            self.aborted = true;
            return;
        }
        if let Some(budget) = self.limits.nodes {
            if self.nodes >= budget {
                self.aborted = true;
                return;
            }
        }
        if !self.limits.infinite && !self.pondering() && self.time.hard_limit_reached() {
            self.aborted = true;
        }
    }

    #[inline]
    pub(super) fn count_node(&mut self) {
        self.nodes += 1;
        if self.nodes % ABORT_CHECK_INTERVAL == 0 {
            self.check_abort();
        }
    }

    /// 評価キャッシュを経由した静的評価
    pub(super) fn evaluate_cached(&mut self) -> Value {
        let key = self.pos.key();
        if let Some(value) = self.eval_cache.get(key) {
            return value;
        }
        let value = crate::eval::evaluate(self.pos);
        self.eval_cache.put(key, value);
        value
    }

    /// ルートの指し手を1深さぶん探索する
    ///
    /// `root_moves`は合法手のみ。alphaを更新した手が`pv`の先頭になる。
    pub(super) fn search_root(
        &mut self,
        root_moves: &crate::movegen::MoveList,
        depth: Depth,
        pv: &mut PvLine,
    ) -> Value {
        pv.clear();
        let mut alpha = -Value::INFINITE;
        let beta = Value::INFINITE;

        for i in 0..root_moves.len() {
            let mv = root_moves[i];
            self.check_abort();
            if self.aborted {
                break;
            }
            self.count_node();

            let mut child_pv = PvLine::new();
            self.pos.make_move(mv);
            let value = -self.alpha_beta(depth - 1, 1, -beta, -alpha, &mut child_pv);
            self.pos.undo_move();

            if self.aborted {
                break;
            }
            if value > alpha {
                alpha = value;
                pv.load(mv, &child_pv);
            }
        }

        alpha
    }

    /// negamax alpha-beta
    fn alpha_beta(
        &mut self,
        depth: Depth,
        ply: usize,
        mut alpha: Value,
        mut beta: Value,
        pv: &mut PvLine,
    ) -> Value {
        pv.clear();
        self.count_node();
        if self.aborted {
            return Value::ZERO;
        }
        if ply >= MAX_PLY {
            return self.evaluate_cached();
        }

        // 引き分け
        if self.pos.is_fifty_moves()
            || self.pos.is_repetition()
            || self.pos.has_insufficient_material()
        {
            return Value::DRAW;
        }

        // Mate distance pruning: これより良い/悪い詰みは到達不能
        alpha = alpha.max(Value::mated_in(ply as i32));
        beta = beta.min(Value::mate_in(ply as i32 + 1));
        if alpha >= beta {
            return alpha;
        }

        let in_check = self.pos.in_check();
        // 王手延長
        let depth = if in_check { depth + 1 } else { depth };
        if depth <= 0 {
            return self.qsearch(ply, alpha, beta);
        }

        let is_pv_node = beta.raw() - alpha.raw() > 1;

        // 置換表probe（エントリは指し手を持たないため順序付けには使わない）
        if !is_pv_node {
            if let Some(entry) = self.tt.get(self.pos.key()) {
                if entry.depth >= depth {
                    let value = value_from_tt(entry.value, ply);
                    match entry.bound {
                        Bound::Exact => return value,
                        Bound::Lower if value >= beta => return value,
                        Bound::Upper if value <= alpha => return value,
                        _ => {}
                    }
                }
            }
        }

        // Null move pruning
        if !is_pv_node
            && !in_check
            && depth >= 3
            && !beta.is_mate_score()
            && self.pos.has_non_pawn_material(self.pos.side_to_move())
        {
            let reduction = 2 + depth / 4;
            let mut null_pv = PvLine::new();
            self.pos.make_null_move();
            let value = -self.alpha_beta(
                depth - 1 - reduction,
                ply + 1,
                -beta,
                -beta + Value::new(1),
                &mut null_pv,
            );
            self.pos.undo_null_move();
            if self.aborted {
                return Value::ZERO;
            }
            if value >= beta {
                return if value.is_win() { beta } else { value };
            }
        }

        let us = self.pos.side_to_move();
        let mut best_value = -Value::INFINITE;
        let mut move_count = 0u32;
        let mut bound = Bound::Upper;

        loop {
            let Some(mv) = self.generators[ply].next_pseudo_legal(self.pos, false) else {
                break;
            };

            // 合法性プローブ: 指した後に自軍キングが取られる手は捨てる
            self.pos.make_move(mv);
            if self.pos.is_attacked(self.pos.side_to_move(), self.pos.king_square(us)) {
                self.pos.undo_move();
                continue;
            }

            move_count += 1;
            let mut child_pv = PvLine::new();
            // PVS: 最初の手は全幅、以降はnullウィンドウで検分して
            // alphaを超えたときだけ再探索する
            let value = if move_count == 1 {
                -self.alpha_beta(depth - 1, ply + 1, -beta, -alpha, &mut child_pv)
            } else {
                let scout = -self.alpha_beta(
                    depth - 1,
                    ply + 1,
                    -alpha - Value::new(1),
                    -alpha,
                    &mut child_pv,
                );
                if scout > alpha && scout < beta && !self.aborted {
                    -self.alpha_beta(depth - 1, ply + 1, -beta, -alpha, &mut child_pv)
                } else {
                    scout
                }
            };
            self.pos.undo_move();

            if self.aborted {
                return Value::ZERO;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    if value >= beta {
                        self.tt.put(self.pos.key(), value_to_tt(value, ply), Bound::Lower, depth);
                        return value;
                    }
                    alpha = value;
                    bound = Bound::Exact;
                    pv.load(mv, &child_pv);
                }
            }
        }

        // 合法手なし: 詰みまたはステイルメイト
        if move_count == 0 {
            return if in_check { Value::mated_in(ply as i32) } else { Value::DRAW };
        }

        self.tt.put(self.pos.key(), value_to_tt(best_value, ply), bound, depth);
        best_value
    }
}
