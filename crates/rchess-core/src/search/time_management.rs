//! 時間管理
//!
//! 探索開始時に制約からソフト/ハードの2段階の締め切りを導出する。
//! ソフト制限は現在の深さを指し終えたら止まる目安、ハード制限は絶対の上限。

use std::time::{Duration, Instant};

use super::limits::SearchLimits;
use crate::types::Color;

/// 残り時間のうち温存する安全マージン（約20%）
const SAFETY_RESERVE_DIV: u64 = 5;
/// 時間管理境界までの手数が不明なときの既定値
const DEFAULT_MOVES_TO_GO: u64 = 30;

/// 1探索分の時間管理
pub struct TimeManager {
    start: Instant,
    soft_ms: Option<u64>,
    hard_ms: Option<u64>,
}

impl TimeManager {
    /// 制約から締め切りを導出する
    ///
    /// - 固定思考時間: ソフト = ハード = move_time
    /// - 持ち時間制: 残り時間の約20%を温存し、残りを moves_to_go で配分して
    ///   加算時間を足す。ソフト制限はハード制限の約80%。非常に小さい持ち時間
    ///   では配分を狭め、非常に大きい持ち時間では広げる。
    /// - どちらもなければ無制限
    pub fn new(limits: &SearchLimits, side: Color) -> TimeManager {
        let overhead = limits.move_overhead_ms;

        let (soft_ms, hard_ms) = if let Some(move_time) = limits.move_time_ms {
            let budget = move_time.saturating_sub(overhead).max(1);
            (Some(budget), Some(budget))
        } else if let Some(remaining) = limits.time_for(side) {
            let inc = limits.inc_for(side).unwrap_or(0);
            let usable = remaining.saturating_sub(remaining / SAFETY_RESERVE_DIV).max(1);
            let moves_to_go = limits.moves_to_go.map(u64::from).unwrap_or(DEFAULT_MOVES_TO_GO).max(1);

            let mut hard = usable / moves_to_go + inc;
            if remaining < 1_000 {
                // 秒読み寸前は配分を絞る
                hard /= 2;
            } else if remaining > 600_000 {
                // 持ち時間が潤沢なら広げる
                hard = hard * 3 / 2;
            }
            let hard = hard.clamp(1, usable).saturating_sub(overhead).max(1);
            let soft = (hard * 4 / 5).max(1);
            (Some(soft), Some(hard))
        } else {
            (None, None)
        };

        TimeManager { start: Instant::now(), soft_ms, hard_ms }
    }

    /// 探索開始からの経過時間
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// ソフト制限に達したか（現在の深さを終えたら止まる）
    pub fn soft_limit_reached(&self) -> bool {
        match self.soft_ms {
            Some(ms) => self.start.elapsed() >= Duration::from_millis(ms),
            None => false,
        }
    }

    /// ハード制限に達したか（木の内部からでも打ち切る）
    pub fn hard_limit_reached(&self) -> bool {
        match self.hard_ms {
            Some(ms) => self.start.elapsed() >= Duration::from_millis(ms),
            None => false,
        }
    }

    #[cfg(test)]
    fn limits_ms(&self) -> (Option<u64>, Option<u64>) {
        (self.soft_ms, self.hard_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_move_time() {
        let limits = SearchLimits { move_time_ms: Some(500), ..Default::default() };
        let tm = TimeManager::new(&limits, Color::White);
        assert_eq!(tm.limits_ms(), (Some(500), Some(500)));
    }

    #[test]
    fn test_clock_allocation() {
        let limits = SearchLimits {
            white_time_ms: Some(60_000),
            moves_to_go: Some(40),
            ..Default::default()
        };
        let tm = TimeManager::new(&limits, Color::White);
        let (soft, hard) = tm.limits_ms();
        let hard = hard.unwrap();
        let soft = soft.unwrap();
        // 48秒（80%）を40手で割った程度
        assert_eq!(hard, 1_200);
        assert_eq!(soft, 960);
        assert!(soft < hard);
    }

    #[test]
    fn test_increment_added() {
        let base = SearchLimits {
            black_time_ms: Some(60_000),
            moves_to_go: Some(40),
            ..Default::default()
        };
        let with_inc = SearchLimits { black_inc_ms: Some(2_000), ..base.clone() };
        let tm_base = TimeManager::new(&base, Color::Black);
        let tm_inc = TimeManager::new(&with_inc, Color::Black);
        assert!(tm_inc.limits_ms().1.unwrap() > tm_base.limits_ms().1.unwrap());
    }

    #[test]
    fn test_tiny_budget_narrowed() {
        let limits = SearchLimits { white_time_ms: Some(400), ..Default::default() };
        let tm = TimeManager::new(&limits, Color::White);
        let hard = tm.limits_ms().1.unwrap();
        // 残り400msなら1手に数msしか使わない
        assert!(hard <= 10);
    }

    #[test]
    fn test_no_limits_never_expire() {
        let tm = TimeManager::new(&SearchLimits::default(), Color::White);
        assert!(!tm.soft_limit_reached());
        assert!(!tm.hard_limit_reached());
    }

    #[test]
    fn test_hard_limit_never_exceeds_usable_time() {
        let limits = SearchLimits {
            white_time_ms: Some(1_000),
            white_inc_ms: Some(60_000),
            ..Default::default()
        };
        let tm = TimeManager::new(&limits, Color::White);
        // 加算時間が大きくても残り時間の80%を超えない
        assert!(tm.limits_ms().1.unwrap() <= 800);
    }
}
