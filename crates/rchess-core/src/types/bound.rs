//! 置換表スコアの境界種別（Bound）

/// 探索スコアの境界種別
///
/// - `Exact`: ウィンドウ内で確定したスコア
/// - `Lower`: beta cutoff による下界
/// - `Upper`: alpha を更新できなかった上界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    None = 0,
    Upper = 1,
    Lower = 2,
    Exact = 3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_eq() {
        assert_eq!(Bound::Exact, Bound::Exact);
        assert_ne!(Bound::Lower, Bound::Upper);
    }
}
