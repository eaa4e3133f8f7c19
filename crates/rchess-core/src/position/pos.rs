//! 局面本体（Position）

use crate::movegen::{BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::types::{Color, Move, MoveKind, Piece, PieceType, Square};

use super::zobrist::{zobrist_castling, zobrist_en_passant, zobrist_psq, zobrist_side};

/// 1探索インスタンスで扱うゲーム長の上限（ply単位）
pub const MAX_GAME_PLY: usize = 1024;

pub const CASTLE_WHITE_KING: u8 = 0b0001;
pub const CASTLE_WHITE_QUEEN: u8 = 0b0010;
pub const CASTLE_BLACK_KING: u8 = 0b0100;
pub const CASTLE_BLACK_QUEEN: u8 = 0b1000;

/// マスごとのキャスリング権マスク
///
/// `rights &= MASK[from] & MASK[to]` の一括更新で、キング/ルークの移動と
/// ルークが初期位置で取られた場合の両方をカバーする。
const CASTLING_MASK: [u8; Square::NUM] = build_castling_mask();

const fn build_castling_mask() -> [u8; Square::NUM] {
    let mut mask = [0x0F; Square::NUM];
    mask[Square::E1.index()] = 0x0F & !(CASTLE_WHITE_KING | CASTLE_WHITE_QUEEN);
    mask[Square::H1.index()] = 0x0F & !CASTLE_WHITE_KING;
    mask[Square::A1.index()] = 0x0F & !CASTLE_WHITE_QUEEN;
    mask[Square::E8.index()] = 0x0F & !(CASTLE_BLACK_KING | CASTLE_BLACK_QUEEN);
    mask[Square::H8.index()] = 0x0F & !CASTLE_BLACK_KING;
    mask[Square::A8.index()] = 0x0F & !CASTLE_BLACK_QUEEN;
    mask
}

/// キング以外の駒の位置リスト（固定容量）
#[derive(Debug, Clone, Copy)]
struct PieceList {
    squares: [Square; 10],
    len: u8,
}

impl PieceList {
    const EMPTY: PieceList = PieceList { squares: [Square::A1; 10], len: 0 };

    #[inline]
    fn push(&mut self, sq: Square) {
        self.squares[self.len as usize] = sq;
        self.len += 1;
    }

    #[inline]
    fn remove(&mut self, sq: Square) {
        let len = self.len as usize;
        for i in 0..len {
            if self.squares[i] == sq {
                self.squares[i] = self.squares[len - 1];
                self.len -= 1;
                return;
            }
        }
        debug_assert!(false, "piece list out of sync with board");
    }

    #[inline]
    fn as_slice(&self) -> &[Square] {
        &self.squares[..self.len as usize]
    }
}

/// 1ply分の巻き戻し情報
#[derive(Debug, Clone, Copy)]
struct StateInfo {
    castling: u8,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    key: u64,
    check_flag: Option<bool>,
    mate_flag: Option<bool>,
    mv: Move,
}

/// 局面
///
/// FEN文字列からの生成（[`Position::from_fen`]）またはクローンで作られ、
/// 以後は `make_move` / `undo_move` / `make_null_move` / `undo_null_move`
/// でのみ変更される。探索側は開始時に自分専用のディープコピーを取る。
#[derive(Clone)]
pub struct Position {
    board: [Option<Piece>; Square::NUM],
    /// キング以外の駒リスト [Color][PieceType]
    piece_lists: [[PieceList; PieceType::NUM_NON_KING]; Color::NUM],
    king_sq: [Square; Color::NUM],
    /// キングを除くマテリアル合計 [Color]
    material: [i32; Color::NUM],
    side_to_move: Color,
    castling: u8,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    /// 内部手数カウンタ（ply単位、開始局面の白番 = 0）
    game_ply: u32,
    key: u64,
    history: Vec<StateInfo>,
    /// 手番側への王手キャッシュ（None = 未計算）
    check_flag: Option<bool>,
    /// 手番側の詰みキャッシュ（None = 未計算）
    mate_flag: Option<bool>,
}

impl Position {
    /// 空盤面（FENパーサ専用の中間状態）
    pub(crate) fn empty() -> Position {
        Position {
            board: [None; Square::NUM],
            piece_lists: [[PieceList::EMPTY; PieceType::NUM_NON_KING]; Color::NUM],
            king_sq: [Square::E1, Square::E8],
            material: [0; Color::NUM],
            side_to_move: Color::White,
            castling: 0,
            en_passant: None,
            halfmove_clock: 0,
            game_ply: 0,
            key: 0,
            history: Vec::with_capacity(MAX_GAME_PLY),
            check_flag: None,
            mate_flag: None,
        }
    }

    // ------------------------------------------------------------------
    // アクセサ
    // ------------------------------------------------------------------

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_sq[color.index()]
    }

    /// キング以外の駒の位置リスト
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceType) -> &[Square] {
        debug_assert!(kind != PieceType::King);
        self.piece_lists[color.index()][kind.index()].as_slice()
    }

    #[inline]
    pub fn piece_count(&self, color: Color, kind: PieceType) -> usize {
        self.pieces(color, kind).len()
    }

    /// キングを除くマテリアル合計
    #[inline]
    pub fn material(&self, color: Color) -> i32 {
        self.material[color.index()]
    }

    #[inline]
    pub fn castling_rights(&self) -> u8 {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// 内部手数カウンタ（ply単位）
    #[inline]
    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    /// 直前の手（履歴が空ならNone）
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|st| st.mv).filter(|mv| *mv != Move::NONE)
    }

    /// ポーン以外の駒を持つか（null move pruningのゲート）
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        self.material(color) > self.piece_count(color, PieceType::Pawn) as i32 * PieceType::Pawn.value()
    }

    // ------------------------------------------------------------------
    // 盤面更新プリミティブ
    // ------------------------------------------------------------------

    pub(crate) fn put_piece(&mut self, pc: Piece, sq: Square) {
        debug_assert!(self.board[sq.index()].is_none());
        self.board[sq.index()] = Some(pc);
        if pc.kind == PieceType::King {
            self.king_sq[pc.color.index()] = sq;
        } else {
            self.piece_lists[pc.color.index()][pc.kind.index()].push(sq);
            self.material[pc.color.index()] += pc.kind.value();
        }
        self.key ^= zobrist_psq(pc, sq);
    }

    pub(crate) fn remove_piece(&mut self, sq: Square) -> Piece {
        let pc = self.board[sq.index()].expect("remove_piece on empty square");
        self.board[sq.index()] = None;
        if pc.kind != PieceType::King {
            self.piece_lists[pc.color.index()][pc.kind.index()].remove(sq);
            self.material[pc.color.index()] -= pc.kind.value();
        }
        self.key ^= zobrist_psq(pc, sq);
        pc
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        let pc = self.remove_piece(from);
        self.put_piece(pc, to);
    }

    // ------------------------------------------------------------------
    // make / undo
    // ------------------------------------------------------------------

    /// 手を実行する
    ///
    /// 合法性の保証は呼び出し側の責任。疑似合法手を与えた場合でも
    /// 盤面整合性は保たれる（合法性フィルタはmake後の王手チェックで行う）。
    pub fn make_move(&mut self, mv: Move) {
        assert!(self.history.len() < MAX_GAME_PLY, "history stack overflow");
        self.history.push(StateInfo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            key: self.key,
            check_flag: self.check_flag,
            mate_flag: self.mate_flag,
            mv,
        });

        let us = self.side_to_move;
        let from = mv.from();
        let to = mv.to();
        let moved = mv.piece().expect("make_move with pieceless move");

        if let Some(ep) = self.en_passant.take() {
            self.key ^= zobrist_en_passant(ep);
        }

        let mut reset_clock = moved.kind == PieceType::Pawn || mv.is_capture();

        match mv.kind() {
            MoveKind::Normal => {
                if mv.is_capture() {
                    self.remove_piece(to);
                }
                self.move_piece(from, to);
            }
            MoveKind::PawnDouble => {
                self.move_piece(from, to);
                let ep = from.offset(us.pawn_direction()).expect("pawn double from invalid rank");
                self.en_passant = Some(ep);
                self.key ^= zobrist_en_passant(ep);
                reset_clock = true;
            }
            MoveKind::EnPassant => {
                self.move_piece(from, to);
                // 取られるポーンはターゲットマスの1つ後ろにいる
                let victim_sq = to.offset(-us.pawn_direction()).expect("en passant victim square");
                self.remove_piece(victim_sq);
                reset_clock = true;
            }
            MoveKind::Castling => {
                self.move_piece(from, to);
                let (rook_from, rook_to) = rook_castling_squares(to);
                self.move_piece(rook_from, rook_to);
            }
            MoveKind::Promotion => {
                self.remove_piece(from);
                if mv.is_capture() {
                    self.remove_piece(to);
                }
                let promoted = mv.promotion().expect("promotion move without piece type");
                self.put_piece(Piece::new(us, promoted), to);
                reset_clock = true;
            }
            MoveKind::None => unreachable!("make_move with MoveKind::None"),
        }

        let new_castling = self.castling & CASTLING_MASK[from.index()] & CASTLING_MASK[to.index()];
        if new_castling != self.castling {
            self.key ^= zobrist_castling(self.castling) ^ zobrist_castling(new_castling);
            self.castling = new_castling;
        }

        if reset_clock {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.game_ply += 1;
        self.side_to_move = !us;
        self.key ^= zobrist_side();
        self.check_flag = None;
        self.mate_flag = None;
    }

    /// 直前の手を巻き戻す
    ///
    /// キャスリング権・アンパッサン・クロック・Zobristキー・王手キャッシュは
    /// 履歴レコードからそのまま復元する（再計算しない）。
    pub fn undo_move(&mut self) {
        let st = self.history.pop().expect("undo_move with empty history");
        let mv = st.mv;
        debug_assert!(mv != Move::NONE, "undo_move on a null move record");

        self.side_to_move = !self.side_to_move;
        self.game_ply -= 1;
        let us = self.side_to_move;
        let from = mv.from();
        let to = mv.to();

        match mv.kind() {
            MoveKind::Normal => {
                self.move_piece(to, from);
                if let Some(captured) = mv.captured() {
                    self.put_piece(captured, to);
                }
            }
            MoveKind::PawnDouble => {
                self.move_piece(to, from);
            }
            MoveKind::EnPassant => {
                self.move_piece(to, from);
                let victim_sq = to.offset(-us.pawn_direction()).expect("en passant victim square");
                let captured = mv.captured().expect("en passant without captured pawn");
                self.put_piece(captured, victim_sq);
            }
            MoveKind::Castling => {
                let (rook_from, rook_to) = rook_castling_squares(to);
                self.move_piece(rook_to, rook_from);
                self.move_piece(to, from);
            }
            MoveKind::Promotion => {
                self.remove_piece(to);
                if let Some(captured) = mv.captured() {
                    self.put_piece(captured, to);
                }
                self.put_piece(Piece::new(us, PieceType::Pawn), from);
            }
            MoveKind::None => unreachable!(),
        }

        self.castling = st.castling;
        self.en_passant = st.en_passant;
        self.halfmove_clock = st.halfmove_clock;
        self.key = st.key;
        self.check_flag = st.check_flag;
        self.mate_flag = st.mate_flag;
    }

    /// パス（null move）を実行する。探索のnull move pruning用。
    pub fn make_null_move(&mut self) {
        assert!(self.history.len() < MAX_GAME_PLY, "history stack overflow");
        self.history.push(StateInfo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            key: self.key,
            check_flag: self.check_flag,
            mate_flag: self.mate_flag,
            mv: Move::NONE,
        });

        if let Some(ep) = self.en_passant.take() {
            self.key ^= zobrist_en_passant(ep);
        }
        self.halfmove_clock += 1;
        self.game_ply += 1;
        self.side_to_move = !self.side_to_move;
        self.key ^= zobrist_side();
        self.check_flag = None;
        self.mate_flag = None;
    }

    /// null moveを巻き戻す
    pub fn undo_null_move(&mut self) {
        let st = self.history.pop().expect("undo_null_move with empty history");
        debug_assert!(st.mv == Move::NONE);
        self.side_to_move = !self.side_to_move;
        self.game_ply -= 1;
        self.castling = st.castling;
        self.en_passant = st.en_passant;
        self.halfmove_clock = st.halfmove_clock;
        self.key = st.key;
        self.check_flag = st.check_flag;
        self.mate_flag = st.mate_flag;
    }

    /// 手を実行して`f`を評価し、必ず巻き戻してから結果を返すスコープヘルパ
    ///
    /// make/undoの対応漏れを型的に防ぐ。合法性フィルタと詰み判定が使う。
    #[inline]
    pub fn with_move<R>(&mut self, mv: Move, f: impl FnOnce(&mut Position) -> R) -> R {
        self.make_move(mv);
        let result = f(self);
        self.undo_move();
        result
    }

    // ------------------------------------------------------------------
    // 利き・王手・詰み
    // ------------------------------------------------------------------

    /// `by`側の駒が`sq`に利いているか
    ///
    /// ヒット頻度順にチェックする: ポーン → ルーク/クイーンの直線 →
    /// ビショップ/クイーンの斜め → ナイト → キング → アンパッサン固有の形。
    pub fn is_attacked(&self, by: Color, sq: Square) -> bool {
        // ポーン: sqへ斜めに利く位置にいるか
        let dir = by.pawn_direction();
        for side in [1, -1] {
            if let Some(s) = sq.offset(-dir + side) {
                if self.board[s.index()] == Some(Piece::new(by, PieceType::Pawn)) {
                    return true;
                }
            }
        }

        // ルーク/クイーンの直線（最初の駒で打ち切り）
        if self.slider_attacks(by, sq, &ROOK_DIRS, PieceType::Rook) {
            return true;
        }

        // ビショップ/クイーンの斜め
        if self.slider_attacks(by, sq, &BISHOP_DIRS, PieceType::Bishop) {
            return true;
        }

        // ナイト
        for delta in KNIGHT_OFFSETS {
            if let Some(s) = sq.offset(delta) {
                if self.board[s.index()] == Some(Piece::new(by, PieceType::Knight)) {
                    return true;
                }
            }
        }

        // キング
        for delta in KING_OFFSETS {
            if let Some(s) = sq.offset(delta) {
                if self.board[s.index()] == Some(Piece::new(by, PieceType::King)) {
                    return true;
                }
            }
        }

        // アンパッサン固有の形: 直前に2マス前進したポーンのマスには、
        // 隣のポーンがアンパッサンで利いている
        if let Some(ep) = self.en_passant {
            let pusher = !self.side_to_move;
            if by == self.side_to_move {
                if let Some(pushed_sq) = ep.offset(pusher.pawn_direction()) {
                    if pushed_sq == sq {
                        for side in [1, -1] {
                            if let Some(s) = sq.offset(side) {
                                if self.board[s.index()] == Some(Piece::new(by, PieceType::Pawn)) {
                                    return true;
                                }
                            }
                        }
                    }
                }
            }
        }

        false
    }

    fn slider_attacks(&self, by: Color, sq: Square, dirs: &[i16; 4], slider: PieceType) -> bool {
        for &dir in dirs {
            let mut cur = sq;
            while let Some(next) = cur.offset(dir) {
                if let Some(pc) = self.board[next.index()] {
                    if pc.color == by && (pc.kind == slider || pc.kind == PieceType::Queen) {
                        return true;
                    }
                    break;
                }
                cur = next;
            }
        }
        false
    }

    /// 手番側のキングに王手がかかっているか（キャッシュあり）
    pub fn in_check(&mut self) -> bool {
        if let Some(cached) = self.check_flag {
            return cached;
        }
        let us = self.side_to_move;
        let checked = self.is_attacked(!us, self.king_square(us));
        self.check_flag = Some(checked);
        checked
    }

    /// 手番側が詰んでいるか（キャッシュあり）
    ///
    /// 王手かつ合法手なしの判定で、意図的に重い。plyごとにメモ化される。
    pub fn is_checkmate(&mut self) -> bool {
        if let Some(cached) = self.mate_flag {
            return cached;
        }
        let mate = self.in_check() && !crate::movegen::has_legal_move(self);
        self.mate_flag = Some(mate);
        mate
    }

    // ------------------------------------------------------------------
    // 引き分け判定
    // ------------------------------------------------------------------

    /// 50手ルール（ハーフムーブクロック100以上）
    #[inline]
    pub fn is_fifty_moves(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// 3回同形
    ///
    /// 現在のキーと一致する過去の同手番キーを4スロット刻みで数える。
    /// 4ply刻みなら手番とマテリアルの一致が保証される。
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        let mut count = 0;
        let mut back = 4;
        while back <= len {
            if self.history[len - back].key == self.key {
                count += 1;
                if count >= 2 {
                    return true;
                }
            }
            back += 4;
        }
        false
    }

    /// 駒不足による引き分け
    ///
    /// 裸キング同士、キング+マイナー1枚、キング+ナイト2枚、
    /// または同色マスのビショップ同士。
    pub fn has_insufficient_material(&self) -> bool {
        for color in [Color::White, Color::Black] {
            if self.piece_count(color, PieceType::Pawn) > 0
                || self.piece_count(color, PieceType::Rook) > 0
                || self.piece_count(color, PieceType::Queen) > 0
            {
                return false;
            }
        }

        let wn = self.piece_count(Color::White, PieceType::Knight);
        let wb = self.piece_count(Color::White, PieceType::Bishop);
        let bn = self.piece_count(Color::Black, PieceType::Knight);
        let bb = self.piece_count(Color::Black, PieceType::Bishop);

        if wn + wb == 0 {
            return bn + bb <= 1 || (bn == 2 && bb == 0);
        }
        if bn + bb == 0 {
            return wn + wb <= 1 || (wn == 2 && wb == 0);
        }

        // 両者ビショップ1枚で同色マスなら引き分け
        if wn == 0 && bn == 0 && wb == 1 && bb == 1 {
            let ws = self.pieces(Color::White, PieceType::Bishop)[0];
            let bs = self.pieces(Color::Black, PieceType::Bishop)[0];
            return (ws.file() + ws.rank()) % 2 == (bs.file() + bs.rank()) % 2;
        }

        false
    }

    // ------------------------------------------------------------------
    // FENパーサ用の内部設定
    // ------------------------------------------------------------------

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub(crate) fn set_castling(&mut self, rights: u8) {
        self.castling = rights;
    }

    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        self.en_passant = sq;
    }

    pub(crate) fn set_clocks(&mut self, halfmove_clock: u32, game_ply: u32) {
        self.halfmove_clock = halfmove_clock;
        self.game_ply = game_ply;
    }

    /// Zobristキーを全要素から計算し直す（FENインポート時のみ使用）
    pub(crate) fn recompute_key(&mut self) {
        let mut key = 0u64;
        for sq in Square::all() {
            if let Some(pc) = self.board[sq.index()] {
                key ^= zobrist_psq(pc, sq);
            }
        }
        key ^= zobrist_castling(self.castling);
        if let Some(ep) = self.en_passant {
            key ^= zobrist_en_passant(ep);
        }
        if self.side_to_move == Color::Black {
            key ^= zobrist_side();
        }
        self.key = key;
    }
}

/// キングの到達マスからルークの移動元/移動先を求める
#[inline]
fn rook_castling_squares(king_to: Square) -> (Square, Square) {
    if king_to.file() == 6 {
        // キングサイド: h筋 → f筋
        (Square::new(7, king_to.rank()), Square::new(5, king_to.rank()))
    } else {
        // クイーンサイド: a筋 → d筋
        debug_assert_eq!(king_to.file(), 2);
        (Square::new(0, king_to.rank()), Square::new(3, king_to.rank()))
    }
}
