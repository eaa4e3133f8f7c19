//! UCIフロントエンドのスモークテスト
//!
//! バイナリを起動してコマンド列を流し、主要な応答行を確認する。

use assert_cmd::Command;

fn run(input: &str) -> String {
    let mut cmd = Command::cargo_bin("rchess-uci").unwrap();
    let assert = cmd.write_stdin(input).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

#[test]
fn test_uci_handshake() {
    let out = run("uci\nisready\nquit\n");
    assert!(out.contains("id name rchess"));
    assert!(out.contains("option name Hash"));
    assert!(out.contains("uciok"));
    assert!(out.contains("readyok"));
}

#[test]
fn test_go_depth_produces_bestmove() {
    // quitはgoの直後に届くので、info行が出るかどうかはタイミング次第。
    // bestmoveはstop→join経由で必ず出る
    let out = run("uci\nisready\nposition startpos moves e2e4\ngo depth 3\nquit\n");
    assert!(out.contains("bestmove "));
}

#[test]
fn test_go_movetime_stopped_by_quit() {
    // quitはstop→joinを経由するのでbestmoveが必ず出る
    let out = run("position startpos\ngo movetime 10000\nquit\n");
    assert!(out.contains("bestmove "));
}

#[test]
fn test_go_perft() {
    let out = run("position startpos\ngo perft 2\nquit\n");
    assert!(out.contains("Nodes searched: 400"));
}

#[test]
fn test_illegal_move_reported() {
    let out = run("position startpos moves e2e5\nquit\n");
    assert!(out.contains("no such legal move: e2e5"));
}
