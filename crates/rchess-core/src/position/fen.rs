//! FEN形式の解析・出力
//!
//! パースは新しい`Position`を組み立ててから返す。失敗時に
//! 部分的に書き換わった局面が残ることはない。

use crate::types::{Color, Piece, PieceType, Square};

use super::pos::{
    Position, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN,
};

/// 標準の開始局面のFEN
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FENパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// フィールド数が足りない等、全体構造が不正
    Structure(String),
    /// 盤面の形式が不正
    Placement(String),
    /// 手番の形式が不正
    SideToMove(String),
    /// キャスリング権の形式が不正
    Castling(String),
    /// アンパッサンマスの形式が不正
    EnPassant(String),
    /// 手数カウンタの形式が不正
    Counter(String),
}

impl std::fmt::Display for FenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FenError::Structure(s) => write!(f, "Invalid FEN: {s}"),
            FenError::Placement(s) => write!(f, "Invalid placement: {s}"),
            FenError::SideToMove(s) => write!(f, "Invalid side to move: {s}"),
            FenError::Castling(s) => write!(f, "Invalid castling rights: {s}"),
            FenError::EnPassant(s) => write!(f, "Invalid en passant square: {s}"),
            FenError::Counter(s) => write!(f, "Invalid move counter: {s}"),
        }
    }
}

impl std::error::Error for FenError {}

impl Position {
    /// 標準の開始局面を生成
    pub fn startpos() -> Position {
        Position::from_fen(FEN_STARTPOS).expect("startpos FEN is valid")
    }

    /// FEN文字列から局面を生成
    ///
    /// 6フィールド形式。クロック2フィールドは省略可（0と1に既定）。
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::Structure(format!(
                "expected at least 4 fields, got {}",
                parts.len()
            )));
        }

        let mut pos = Position::empty();

        // 1. 盤面: ランク8→1、ファイルa→h
        parse_placement(&mut pos, parts[0])?;

        // 2. 手番
        let side = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(format!("expected 'w' or 'b', got '{other}'"))),
        };
        pos.set_side_to_move(side);

        // 3. キャスリング権
        pos.set_castling(parse_castling(parts[2])?);

        // 4. アンパッサン
        let ep = match parts[3] {
            "-" => None,
            s => Some(
                Square::from_uci(s).ok_or_else(|| FenError::EnPassant(s.to_string()))?,
            ),
        };
        pos.set_en_passant(ep);

        // 5-6. ハーフムーブクロックとフルムーブ番号（省略可）
        let halfmove_clock = match parts.get(4) {
            Some(s) => s.parse::<u32>().map_err(|_| FenError::Counter((*s).to_string()))?,
            None => 0,
        };
        let fullmove = match parts.get(5) {
            Some(s) => s.parse::<u32>().map_err(|_| FenError::Counter((*s).to_string()))?,
            None => 1,
        };
        // フルムーブ番号を内部のplyカウンタへ（手番のパリティを保つ）
        let game_ply = fullmove.max(1).saturating_sub(1) * 2
            + if side == Color::Black { 1 } else { 0 };
        pos.set_clocks(halfmove_clock, game_ply);

        pos.recompute_key();
        Ok(pos)
    }

    /// 現局面のFEN文字列を取得
    pub fn to_fen(&self) -> String {
        let mut result = String::new();

        // 1. 盤面
        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                let sq = Square::new(file, rank);
                match self.piece_on(sq) {
                    None => empty_count += 1,
                    Some(pc) => {
                        if empty_count > 0 {
                            result.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        result.push(pc.to_fen_char());
                    }
                }
            }
            if empty_count > 0 {
                result.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                result.push('/');
            }
        }

        // 2. 手番
        result.push(' ');
        result.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        // 3. キャスリング権
        result.push(' ');
        let rights = self.castling_rights();
        if rights == 0 {
            result.push('-');
        } else {
            for (bit, c) in [
                (CASTLE_WHITE_KING, 'K'),
                (CASTLE_WHITE_QUEEN, 'Q'),
                (CASTLE_BLACK_KING, 'k'),
                (CASTLE_BLACK_QUEEN, 'q'),
            ] {
                if rights & bit != 0 {
                    result.push(c);
                }
            }
        }

        // 4. アンパッサン
        result.push(' ');
        match self.en_passant() {
            Some(sq) => result.push_str(&sq.to_string()),
            None => result.push('-'),
        }

        // 5-6. クロック
        result.push_str(&format!(
            " {} {}",
            self.halfmove_clock(),
            self.game_ply() / 2 + 1
        ));

        result
    }
}

fn parse_placement(pos: &mut Position, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::Placement(format!("expected 8 ranks, got {}", ranks.len())));
    }

    let mut kings = [0usize; Color::NUM];
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(d) = c.to_digit(10) {
                if d == 0 || d > 8 {
                    return Err(FenError::Placement(format!("bad empty run '{c}'")));
                }
                file += d as u8;
            } else {
                let pc = Piece::from_fen_char(c)
                    .ok_or_else(|| FenError::Placement(format!("unknown piece '{c}'")))?;
                if file >= 8 {
                    return Err(FenError::Placement(format!("rank overflow in '{rank_str}'")));
                }
                if pc.kind == PieceType::King {
                    kings[pc.color.index()] += 1;
                }
                pos.put_piece(pc, Square::new(file, rank));
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::Placement(format!("rank '{rank_str}' covers {file} files")));
        }
    }

    if kings != [1, 1] {
        return Err(FenError::Placement("each side needs exactly one king".to_string()));
    }
    Ok(())
}

fn parse_castling(s: &str) -> Result<u8, FenError> {
    if s == "-" {
        return Ok(0);
    }
    let mut rights = 0u8;
    for c in s.chars() {
        rights |= match c {
            'K' => CASTLE_WHITE_KING,
            'Q' => CASTLE_WHITE_QUEEN,
            'k' => CASTLE_BLACK_KING,
            'q' => CASTLE_BLACK_QUEEN,
            _ => return Err(FenError::Castling(s.to_string())),
        };
    }
    Ok(rights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_startpos_roundtrip() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), FEN_STARTPOS);
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.castling_rights(), 0x0F);
        assert!(pos.en_passant().is_none());
    }

    #[test]
    fn test_fen_roundtrip_misc() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "8/3P4/6K1/8/8/1k6/8/8 w - - 0 1",
            "r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - 12 34",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), fen);
        }
    }

    #[test]
    fn test_fen_zobrist_deterministic() {
        let a = Position::from_fen(FEN_STARTPOS).unwrap();
        let b = Position::from_fen(FEN_STARTPOS).unwrap();
        assert_eq!(a.key(), b.key());

        let c = Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
            .unwrap();
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_fen_rejects_malformed() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8 w KQkq -").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1").is_err());
        assert!(Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1").is_err());
        // キングがいない
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_fen_fullmove_parity() {
        let white = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 10").unwrap();
        assert_eq!(white.game_ply(), 18);
        let black = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 10").unwrap();
        assert_eq!(black.game_ply(), 19);
        assert_eq!(white.to_fen().split(' ').last(), Some("10"));
        assert_eq!(black.to_fen().split(' ').last(), Some("10"));
    }
}
