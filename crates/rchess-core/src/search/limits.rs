//! 探索制約（SearchLimits）
//!
//! UCIの`go`コマンド相当のパラメータ一式。

use crate::types::{Color, Depth, Move};

/// 1回の探索に与える制約
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    /// 白の残り時間（ms）
    pub white_time_ms: Option<u64>,
    /// 黒の残り時間（ms）
    pub black_time_ms: Option<u64>,
    /// 白の加算時間（ms）
    pub white_inc_ms: Option<u64>,
    /// 黒の加算時間（ms）
    pub black_inc_ms: Option<u64>,
    /// 次の時間管理境界までの手数
    pub moves_to_go: Option<u32>,
    /// 固定深さ
    pub depth: Option<Depth>,
    /// ノード予算
    pub nodes: Option<u64>,
    /// N手詰み探索
    pub mate: Option<i32>,
    /// 1手の固定思考時間（ms）
    pub move_time_ms: Option<u64>,
    /// stopが来るまで探索し続ける
    pub infinite: bool,
    /// ポンダーモードで開始する
    pub ponder: bool,
    /// ルートで探索する手の部分集合（空なら全合法手）
    pub search_moves: Vec<Move>,
    /// GUI往復などに備えて確保するオーバーヘッド（ms）
    pub move_overhead_ms: u64,
}

impl SearchLimits {
    /// 手番側の残り時間
    pub fn time_for(&self, color: Color) -> Option<u64> {
        match color {
            Color::White => self.white_time_ms,
            Color::Black => self.black_time_ms,
        }
    }

    /// 手番側の加算時間
    pub fn inc_for(&self, color: Color) -> Option<u64> {
        match color {
            Color::White => self.white_inc_ms,
            Color::Black => self.black_inc_ms,
        }
    }

    /// 時間・深さ・ノードのいずれの制約も持たないか
    pub fn is_unbounded(&self) -> bool {
        self.infinite
            || (self.move_time_ms.is_none()
                && self.white_time_ms.is_none()
                && self.black_time_ms.is_none()
                && self.depth.is_none()
                && self.nodes.is_none()
                && self.mate.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_time_for_side() {
        let limits = SearchLimits {
            white_time_ms: Some(60_000),
            black_time_ms: Some(30_000),
            white_inc_ms: Some(1_000),
            ..Default::default()
        };
        assert_eq!(limits.time_for(Color::White), Some(60_000));
        assert_eq!(limits.time_for(Color::Black), Some(30_000));
        assert_eq!(limits.inc_for(Color::White), Some(1_000));
        assert_eq!(limits.inc_for(Color::Black), None);
    }

    #[test]
    fn test_limits_unbounded() {
        assert!(SearchLimits::default().is_unbounded());
        assert!(SearchLimits { infinite: true, ..Default::default() }.is_unbounded());
        assert!(!SearchLimits { depth: Some(5), ..Default::default() }.is_unbounded());
    }
}
