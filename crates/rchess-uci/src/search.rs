//! `position` / `go` の処理と探索コールバック

use anyhow::Result;
use log::debug;
use std::time::Instant;

use rchess_core::movegen::legal_moves;
use rchess_core::perft::perft_divide;
use rchess_core::search::{SearchHandler, SearchInfo, SearchLimits};
use rchess_core::{Move, Position, Value};

use crate::io::{info_string, uci_println};
use crate::state::EngineState;

/// 探索の進捗と結果をUCI行として出力するハンドラ
///
/// ワーカースレッドから呼ばれる。出力は行単位でフラッシュされるので
/// メインスレッドの出力と混ざらない。
pub struct UciHandler;

impl SearchHandler for UciHandler {
    fn on_iteration(&self, info: &SearchInfo) {
        let mut line = format!(
            "info depth {} score {} nodes {} nps {} time {}",
            info.depth,
            format_score(info.value),
            info.nodes,
            info.nps(),
            info.elapsed.as_millis()
        );
        if !info.pv.is_empty() {
            line.push_str(" pv");
            for mv in &info.pv {
                line.push(' ');
                line.push_str(&mv.to_string());
            }
        }
        uci_println(&line);
    }

    fn on_result(&self, best_move: Option<Move>, ponder_move: Option<Move>) {
        match (best_move, ponder_move) {
            (Some(best), Some(ponder)) => uci_println(&format!("bestmove {best} ponder {ponder}")),
            (Some(best), None) => uci_println(&format!("bestmove {best}")),
            _ => uci_println("bestmove (none)"),
        }
    }
}

/// スコアをUCI形式に（詰みは手数単位、それ以外はcentipawn）
fn format_score(value: Value) -> String {
    if value.is_mate_score() {
        let moves = (value.mate_ply() + 1) / 2;
        if value.is_win() {
            format!("mate {moves}")
        } else {
            format!("mate -{moves}")
        }
    } else {
        format!("cp {}", value.raw())
    }
}

/// 指し手文字列を現局面の合法手リストと照合して解決する
pub fn find_legal_move(pos: &mut Position, uci: &str) -> Option<Move> {
    legal_moves(pos, false).iter().copied().find(|mv| mv.to_string() == uci)
}

/// `position [startpos | fen <fen>] [moves ...]`
///
/// 作業用の局面に全ての指し手を適用できたときだけ差し替える。
/// 解決できない指し手は報告し、既存の局面を保つ。
pub fn parse_position(cmd: &str, state: &mut EngineState) -> Result<()> {
    let rest = cmd.trim_start_matches("position").trim();

    let (mut pos, moves_part) = if let Some(rest) = rest.strip_prefix("startpos") {
        (Position::startpos(), rest.trim())
    } else if let Some(rest) = rest.strip_prefix("fen") {
        let rest = rest.trim();
        let (fen_str, moves_part) = match rest.find("moves") {
            Some(idx) => (rest[..idx].trim(), rest[idx..].trim()),
            None => (rest, ""),
        };
        match Position::from_fen(fen_str) {
            Ok(pos) => (pos, moves_part),
            Err(err) => {
                info_string(format!("illegal fen: {err}"));
                return Ok(());
            }
        }
    } else {
        info_string("position requires startpos or fen");
        return Ok(());
    };

    if let Some(moves) = moves_part.strip_prefix("moves") {
        for token in moves.split_whitespace() {
            match find_legal_move(&mut pos, token) {
                Some(mv) => pos.make_move(mv),
                None => {
                    info_string(format!("no such legal move: {token}"));
                    return Ok(());
                }
            }
        }
    }

    state.position = pos;
    Ok(())
}

/// `go`のパラメータを読み取り探索を開始する
pub fn handle_go(cmd: &str, state: &mut EngineState) -> Result<()> {
    let mut limits =
        SearchLimits { move_overhead_ms: state.opts.move_overhead_ms, ..Default::default() };
    let mut tokens = cmd.split_whitespace().skip(1).peekable();

    while let Some(token) = tokens.next() {
        match token {
            "searchmoves" => {
                // 次のキーワードまでを指し手として解決する
                while let Some(&peek) = tokens.peek() {
                    let Some(mv) = find_legal_move(&mut state.position, peek) else { break };
                    limits.search_moves.push(mv);
                    tokens.next();
                }
            }
            "ponder" => limits.ponder = true,
            "infinite" => limits.infinite = true,
            "wtime" => limits.white_time_ms = next_number(&mut tokens),
            "btime" => limits.black_time_ms = next_number(&mut tokens),
            "winc" => limits.white_inc_ms = next_number(&mut tokens),
            "binc" => limits.black_inc_ms = next_number(&mut tokens),
            "movestogo" => limits.moves_to_go = next_number(&mut tokens).map(|n| n as u32),
            "depth" => limits.depth = next_number(&mut tokens).map(|n| n as i32),
            "nodes" => limits.nodes = next_number(&mut tokens),
            "mate" => limits.mate = next_number(&mut tokens).map(|n| n as i32),
            "movetime" => limits.move_time_ms = next_number(&mut tokens),
            "perft" => {
                let depth = next_number(&mut tokens).unwrap_or(1) as i32;
                run_perft(state, depth.max(1));
                return Ok(());
            }
            other => debug!("ignoring go token: {other}"),
        }
    }

    state.search.start(&state.position, limits);
    Ok(())
}

/// `go perft N`: ルート手ごとの内訳と合計ノード数を出力する
fn run_perft(state: &mut EngineState, depth: i32) {
    let began = Instant::now();
    let mut pos = state.position.clone();
    let mut total = 0u64;
    for (mv, nodes) in perft_divide(&mut pos, depth) {
        uci_println(&format!("{mv}: {nodes}"));
        total += nodes;
    }
    uci_println(&format!("Nodes searched: {total}"));
    debug!("perft({depth}) = {total} in {}ms", began.elapsed().as_millis());
}

fn next_number<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<u64> {
    tokens.next().and_then(|t| t.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_startpos_moves() {
        let mut state = EngineState::new();
        parse_position("position startpos moves e2e4", &mut state).unwrap();
        assert_eq!(
            state.position.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_parse_position_promotion() {
        let mut state = EngineState::new();
        parse_position("position fen 8/3P4/6K1/8/8/1k6/8/8 w - - 0 1 moves d7d8q", &mut state)
            .unwrap();
        assert_eq!(state.position.to_fen(), "3Q4/8/6K1/8/8/1k6/8/8 b - - 0 1");
    }

    #[test]
    fn test_parse_position_castling() {
        let mut state = EngineState::new();
        parse_position(
            "position fen r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1 moves e1g1",
            &mut state,
        )
        .unwrap();
        assert_eq!(
            state.position.to_fen(),
            "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq - 1 1"
        );
    }

    #[test]
    fn test_parse_position_rejects_illegal_move() {
        let mut state = EngineState::new();
        parse_position("position startpos moves e2e4", &mut state).unwrap();
        let before = state.position.to_fen();
        // e2e5は存在しない。局面は据え置き
        parse_position("position startpos moves e2e5", &mut state).unwrap();
        assert_eq!(state.position.to_fen(), before);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(Value::new(35)), "cp 35");
        assert_eq!(format_score(Value::mate_in(3)), "mate 2");
        assert_eq!(format_score(Value::mated_in(2)), "mate -1");
    }
}
