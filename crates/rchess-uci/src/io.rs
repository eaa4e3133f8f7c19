//! UCI出力ヘルパ

use std::io::Write;

/// 1行出力して即フラッシュする（GUIはバッファリングを待ってくれない）
pub fn uci_println(s: &str) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = writeln!(lock, "{s}");
    let _ = lock.flush();
}

/// `info string`行を出力する
pub fn info_string(s: impl AsRef<str>) {
    uci_println(&format!("info string {}", s.as_ref()));
}
