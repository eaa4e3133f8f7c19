//! rchess UCIフロントエンド
//!
//! 標準入力を行単位で読み、UCIコマンドをエンジンコアへ橋渡しする。
//! 探索の進捗と`bestmove`はワーカースレッドのコールバックが直接出力する。

mod io;
mod options;
mod search;
mod state;

use anyhow::Result;
use log::info;
use std::io::{self as stdio, BufRead};

use io::{info_string, uci_println};
use options::{handle_setoption, send_id_and_options};
use search::{handle_go, parse_position};
use state::EngineState;

fn main() -> Result<()> {
    env_logger::init();
    let stdin = stdio::stdin();
    let mut state = EngineState::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        if cmd == "uci" {
            send_id_and_options();
            uci_println("uciok");
            continue;
        }

        if cmd == "isready" {
            if !state.search.is_searching() {
                state.apply_pending_options();
            }
            uci_println("readyok");
            continue;
        }

        if cmd.starts_with("setoption") {
            handle_setoption(cmd, &mut state)?;
            continue;
        }

        if cmd.starts_with("position") {
            parse_position(cmd, &mut state)?;
            continue;
        }

        if cmd == "ucinewgame" {
            state.search.new_game();
            continue;
        }

        if cmd.starts_with("go") {
            handle_go(cmd, &mut state)?;
            continue;
        }

        if cmd == "stop" {
            state.search.stop();
            continue;
        }

        if cmd == "ponderhit" {
            state.search.ponder_hit();
            continue;
        }

        if cmd.starts_with("debug") {
            state.debug = cmd.ends_with("on");
            info_string(format!("debug={}", state.debug));
            continue;
        }

        if cmd == "quit" {
            state.search.stop();
            break;
        }

        info!("Ignoring command: {cmd}");
    }

    Ok(())
}
