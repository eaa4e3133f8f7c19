//! `uci` / `setoption` の処理

use anyhow::Result;
use log::debug;

use rchess_core::search::{DEFAULT_HASH_MB, MAX_HASH_MB, MIN_HASH_MB};

use crate::io::{info_string, uci_println};
use crate::state::EngineState;

/// `uci`への応答: id行とオプション一覧
pub fn send_id_and_options() {
    uci_println(&format!("id name rchess {}", env!("CARGO_PKG_VERSION")));
    uci_println("id author the rchess developers");
    uci_println(&format!(
        "option name Hash type spin default {DEFAULT_HASH_MB} min {MIN_HASH_MB} max {MAX_HASH_MB}"
    ));
    uci_println("option name Ponder type check default false");
    uci_println("option name Move Overhead type spin default 10 min 0 max 5000");
}

/// `setoption name <name> value <value>`
///
/// 名前は空白を含み得る（Move Overhead）。Hashの変更は探索停止中に
/// 適用するため保留しておく。
pub fn handle_setoption(cmd: &str, state: &mut EngineState) -> Result<()> {
    let rest = cmd.trim_start_matches("setoption").trim();
    let Some(rest) = rest.strip_prefix("name") else {
        info_string("setoption requires a name");
        return Ok(());
    };

    let (name, value) = match rest.split_once("value") {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (rest.trim(), None),
    };

    match name.to_ascii_lowercase().as_str() {
        "hash" => {
            let Some(mb) = value.and_then(|v| v.parse::<usize>().ok()) else {
                info_string("Hash requires a numeric value");
                return Ok(());
            };
            // 範囲外は安全な予算へクランプ
            let mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
            state.opts.hash_mb = mb;
            state.pending_hash_mb = Some(mb);
            debug!("Hash set to {mb}MB (pending)");
        }
        "ponder" => {
            state.opts.ponder = value.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false);
        }
        "move overhead" => {
            if let Some(ms) = value.and_then(|v| v.parse::<u64>().ok()) {
                state.opts.move_overhead_ms = ms.min(5_000);
            } else {
                info_string("Move Overhead requires a numeric value");
            }
        }
        other => {
            info_string(format!("unknown option: {other}"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setoption_hash_clamped() {
        let mut state = EngineState::new();
        handle_setoption("setoption name Hash value 999999", &mut state).unwrap();
        assert_eq!(state.opts.hash_mb, MAX_HASH_MB);
        assert_eq!(state.pending_hash_mb, Some(MAX_HASH_MB));

        handle_setoption("setoption name Hash value 0", &mut state).unwrap();
        assert_eq!(state.opts.hash_mb, MIN_HASH_MB);
    }

    #[test]
    fn test_setoption_ponder() {
        let mut state = EngineState::new();
        handle_setoption("setoption name Ponder value true", &mut state).unwrap();
        assert!(state.opts.ponder);
        handle_setoption("setoption name Ponder value false", &mut state).unwrap();
        assert!(!state.opts.ponder);
    }

    #[test]
    fn test_setoption_move_overhead() {
        let mut state = EngineState::new();
        handle_setoption("setoption name Move Overhead value 80", &mut state).unwrap();
        assert_eq!(state.opts.move_overhead_ms, 80);
    }
}
