//! 静止探索（Quiescence Search）
//!
//! 葉ノードで戦術的に不安定な局面を誤評価しないよう、キャプチャと
//! プロモーションだけを延長して探索する。stand-patカットオフあり。

use super::alpha_beta::SearchRun;
use crate::types::{Value, MAX_PLY};

impl SearchRun<'_> {
    /// キャプチャ限定の静止探索
    pub(super) fn qsearch(&mut self, ply: usize, mut alpha: Value, beta: Value) -> Value {
        self.count_node();
        if self.aborted {
            return Value::ZERO;
        }
        if ply >= MAX_PLY {
            return self.evaluate_cached();
        }

        // stand-pat: 何も取らない選択肢の評価
        let stand_pat = self.evaluate_cached();
        if stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let us = self.pos.side_to_move();
        let mut best_value = stand_pat;

        loop {
            let Some(mv) = self.generators[ply].next_pseudo_legal(self.pos, true) else {
                break;
            };

            self.pos.make_move(mv);
            if self.pos.is_attacked(self.pos.side_to_move(), self.pos.king_square(us)) {
                self.pos.undo_move();
                continue;
            }

            let value = -self.qsearch(ply + 1, -beta, -alpha);
            self.pos.undo_move();

            if self.aborted {
                return Value::ZERO;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    if value >= beta {
                        return value;
                    }
                    alpha = value;
                }
            }
        }

        best_value
    }
}
