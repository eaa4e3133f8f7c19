//! 指し手生成器
//!
//! 疑似合法手を駒種ごとのフェーズ順（ポーン → ナイト → ビショップ → ルーク
//! → クイーン → キング → キャスリング）で生成する。各フェーズ内では
//! キャプチャ（MVV-LVA昇順）を静かな手より先に並べる。
//!
//! 合法性は make/undo プローブで判定する: 指した後に自軍キングが
//! 相手に取られる状態なら違法。

use super::movelist::MoveList;
use super::{BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::position::{
    Position, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN,
};
use crate::types::{Move, MoveKind, Piece, PieceType, Square};

// ============================================================================
// 一括生成
// ============================================================================

/// 疑似合法手を生成する
///
/// 自軍キングが王手に残るかどうかは無視する。キャプチャはMVV-LVA昇順
/// （安い駒で高い駒を取る手が先）に整列され、静かな手の前に置かれる。
pub fn pseudo_legal_moves(pos: &Position, captures_only: bool) -> MoveList {
    let mut captures = MoveList::new();
    let mut quiets = MoveList::new();

    generate_pawn_moves(pos, captures_only, &mut captures, &mut quiets);
    generate_leaper_moves(pos, PieceType::Knight, &KNIGHT_OFFSETS, captures_only, &mut captures, &mut quiets);
    generate_slider_moves(pos, PieceType::Bishop, &BISHOP_DIRS, captures_only, &mut captures, &mut quiets);
    generate_slider_moves(pos, PieceType::Rook, &ROOK_DIRS, captures_only, &mut captures, &mut quiets);
    generate_slider_moves(pos, PieceType::Queen, &KING_OFFSETS, captures_only, &mut captures, &mut quiets);
    generate_king_moves(pos, captures_only, &mut captures, &mut quiets);
    if !captures_only {
        generate_castling_moves(pos, &mut quiets);
    }

    captures.sort_by_score_ascending(mvv_lva_score);

    let mut all = captures;
    all.extend_from(&quiets);
    all
}

/// 合法手を生成する（疑似合法手を make/undo プローブでフィルタ）
pub fn legal_moves(pos: &mut Position, captures_only: bool) -> MoveList {
    let pseudo = pseudo_legal_moves(pos, captures_only);
    let mut legal = MoveList::new();
    for &mv in pseudo.iter() {
        if is_legal(pos, mv) {
            legal.push(mv);
        }
    }
    legal
}

/// 指した後に自軍キングが相手の利きに入らないか
pub(crate) fn is_legal(pos: &mut Position, mv: Move) -> bool {
    let us = pos.side_to_move();
    pos.with_move(mv, |p| !p.is_attacked(p.side_to_move(), p.king_square(us)))
}

/// 合法手が1つでも存在するか
///
/// ステイルメイト/チェックメイト判定用。列挙は不要なので、最初の合法手で
/// 即座に打ち切る。キング（リスト走査なしで最安）→ ポーン → ナイト →
/// クイーン → ルーク → ビショップの順に調べる。
pub fn has_legal_move(pos: &mut Position) -> bool {
    let mut captures = MoveList::new();
    let mut quiets = MoveList::new();

    generate_king_moves(pos, false, &mut captures, &mut quiets);
    if any_legal(pos, &captures) || any_legal(pos, &quiets) {
        return true;
    }

    for kind in [PieceType::Pawn, PieceType::Knight, PieceType::Queen, PieceType::Rook, PieceType::Bishop] {
        captures.clear();
        quiets.clear();
        match kind {
            PieceType::Pawn => generate_pawn_moves(pos, false, &mut captures, &mut quiets),
            PieceType::Knight => {
                generate_leaper_moves(pos, kind, &KNIGHT_OFFSETS, false, &mut captures, &mut quiets)
            }
            PieceType::Queen => {
                generate_slider_moves(pos, kind, &KING_OFFSETS, false, &mut captures, &mut quiets)
            }
            PieceType::Rook => {
                generate_slider_moves(pos, kind, &ROOK_DIRS, false, &mut captures, &mut quiets)
            }
            PieceType::Bishop => {
                generate_slider_moves(pos, kind, &BISHOP_DIRS, false, &mut captures, &mut quiets)
            }
            _ => unreachable!(),
        }
        if any_legal(pos, &captures) || any_legal(pos, &quiets) {
            return true;
        }
    }

    false
}

fn any_legal(pos: &mut Position, list: &MoveList) -> bool {
    list.iter().any(|&mv| is_legal(pos, mv))
}

// ============================================================================
// フェーズ式ジェネレータ
// ============================================================================

/// 生成フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenPhase {
    Pawns,
    Knights,
    Bishops,
    Rooks,
    Queens,
    King,
    Castling,
    Done,
}

impl GenPhase {
    fn next(self) -> GenPhase {
        match self {
            GenPhase::Pawns => GenPhase::Knights,
            GenPhase::Knights => GenPhase::Bishops,
            GenPhase::Bishops => GenPhase::Rooks,
            GenPhase::Rooks => GenPhase::Queens,
            GenPhase::Queens => GenPhase::King,
            GenPhase::King => GenPhase::Castling,
            GenPhase::Castling | GenPhase::Done => GenPhase::Done,
        }
    }
}

/// 再開可能なフェーズ式指し手ジェネレータ
///
/// 呼び出し側（探索）が指し手を遅延消費し、カットオフ時に残りの生成
/// コストを払わずに済む。Zobristキーまたはcaptures_onlyフラグが前回の
/// 呼び出しから変わるとサイクルを最初からやり直す。探索plyごとに1個を
/// 事前確保し、呼び出しをまたいで再利用する。
pub struct MoveGenerator {
    phase: GenPhase,
    queue: MoveList,
    cursor: usize,
    key: u64,
    captures_only: bool,
    started: bool,
}

impl MoveGenerator {
    pub fn new() -> MoveGenerator {
        MoveGenerator {
            phase: GenPhase::Pawns,
            queue: MoveList::new(),
            cursor: 0,
            key: 0,
            captures_only: false,
            started: false,
        }
    }

    /// 次の疑似合法手を返す（なくなればNone）
    pub fn next_pseudo_legal(&mut self, pos: &Position, captures_only: bool) -> Option<Move> {
        if !self.started || self.key != pos.key() || self.captures_only != captures_only {
            self.started = true;
            self.key = pos.key();
            self.captures_only = captures_only;
            self.phase = GenPhase::Pawns;
            self.queue.clear();
            self.cursor = 0;
            self.fill_queue(pos, GenPhase::Pawns);
        }

        loop {
            if self.cursor < self.queue.len() {
                let mv = self.queue[self.cursor];
                self.cursor += 1;
                return Some(mv);
            }
            if self.phase == GenPhase::Done {
                return None;
            }
            let phase = self.phase.next();
            self.queue.clear();
            self.cursor = 0;
            self.fill_queue(pos, phase);
        }
    }

    /// 1フェーズ分の指し手をキューに積む（キャプチャ整列済み → 静かな手）
    fn fill_queue(&mut self, pos: &Position, phase: GenPhase) {
        self.phase = phase;
        let mut captures = MoveList::new();
        let mut quiets = MoveList::new();

        match phase {
            GenPhase::Pawns => {
                generate_pawn_moves(pos, self.captures_only, &mut captures, &mut quiets)
            }
            GenPhase::Knights => generate_leaper_moves(
                pos,
                PieceType::Knight,
                &KNIGHT_OFFSETS,
                self.captures_only,
                &mut captures,
                &mut quiets,
            ),
            GenPhase::Bishops => generate_slider_moves(
                pos,
                PieceType::Bishop,
                &BISHOP_DIRS,
                self.captures_only,
                &mut captures,
                &mut quiets,
            ),
            GenPhase::Rooks => generate_slider_moves(
                pos,
                PieceType::Rook,
                &ROOK_DIRS,
                self.captures_only,
                &mut captures,
                &mut quiets,
            ),
            GenPhase::Queens => generate_slider_moves(
                pos,
                PieceType::Queen,
                &KING_OFFSETS,
                self.captures_only,
                &mut captures,
                &mut quiets,
            ),
            GenPhase::King => {
                generate_king_moves(pos, self.captures_only, &mut captures, &mut quiets)
            }
            GenPhase::Castling => {
                if !self.captures_only {
                    generate_castling_moves(pos, &mut quiets);
                }
            }
            GenPhase::Done => {}
        }

        captures.sort_by_score_ascending(mvv_lva_score);
        self.queue.extend_from(&captures);
        self.queue.extend_from(&quiets);
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        MoveGenerator::new()
    }
}

// ============================================================================
// 駒種別の移動生成
// ============================================================================

/// MVV-LVAスコア（動かす駒の価値 - 取る駒の価値、昇順で良い手が先）
fn mvv_lva_score(mv: Move) -> i32 {
    let attacker = mv.piece().map(|pc| pc.kind.value()).unwrap_or(0);
    let victim = mv.captured().map(|pc| pc.kind.value()).unwrap_or(0);
    attacker - victim
}

/// ポーンの指し手を生成
///
/// 前進・2マス前進・斜めのキャプチャ・アンパッサン・プロモーション
/// （4駒種すべて）。プロモーションはキャプチャでなくても戦術的な手
/// としてキャプチャ側のリストに積む。
fn generate_pawn_moves(
    pos: &Position,
    captures_only: bool,
    captures: &mut MoveList,
    quiets: &mut MoveList,
) {
    let us = pos.side_to_move();
    let them = !us;
    let dir = us.pawn_direction();
    let promo_rank = us.promotion_rank();
    let pawn = Piece::new(us, PieceType::Pawn);

    for &from in pos.pieces(us, PieceType::Pawn) {
        // 斜めのキャプチャ（アンパッサン含む）
        for side in [1i16, -1] {
            let Some(to) = from.offset(dir + side) else { continue };
            if let Some(target) = pos.piece_on(to) {
                if target.color != them {
                    continue;
                }
                if to.rank() == promo_rank {
                    for pt in PieceType::PROMOTIONS {
                        captures.push(Move::new(
                            MoveKind::Promotion,
                            from,
                            to,
                            pawn,
                            Some(target),
                            Some(pt),
                        ));
                    }
                } else {
                    captures.push(Move::new(MoveKind::Normal, from, to, pawn, Some(target), None));
                }
            } else if pos.en_passant() == Some(to) {
                let victim = Piece::new(them, PieceType::Pawn);
                captures.push(Move::new(MoveKind::EnPassant, from, to, pawn, Some(victim), None));
            }
        }

        // 前進
        let Some(to) = from.offset(dir) else { continue };
        if pos.piece_on(to).is_some() {
            continue;
        }
        if to.rank() == promo_rank {
            for pt in PieceType::PROMOTIONS {
                captures.push(Move::new(MoveKind::Promotion, from, to, pawn, None, Some(pt)));
            }
        } else if !captures_only {
            quiets.push(Move::new(MoveKind::Normal, from, to, pawn, None, None));

            // 初期ランクからの2マス前進
            if from.rank() == us.pawn_base_rank() {
                if let Some(to2) = to.offset(dir) {
                    if pos.piece_on(to2).is_none() {
                        quiets.push(Move::new(MoveKind::PawnDouble, from, to2, pawn, None, None));
                    }
                }
            }
        }
    }
}

/// 近接駒（ナイト）の指し手を生成
fn generate_leaper_moves(
    pos: &Position,
    kind: PieceType,
    offsets: &[i16],
    captures_only: bool,
    captures: &mut MoveList,
    quiets: &mut MoveList,
) {
    let us = pos.side_to_move();
    let piece = Piece::new(us, kind);

    for &from in pos.pieces(us, kind) {
        push_leaper_targets(pos, piece, from, offsets, captures_only, captures, quiets);
    }
}

/// キングの指し手を生成（キャスリングは別フェーズ）
fn generate_king_moves(
    pos: &Position,
    captures_only: bool,
    captures: &mut MoveList,
    quiets: &mut MoveList,
) {
    let us = pos.side_to_move();
    let piece = Piece::new(us, PieceType::King);
    let from = pos.king_square(us);
    push_leaper_targets(pos, piece, from, &KING_OFFSETS, captures_only, captures, quiets);
}

fn push_leaper_targets(
    pos: &Position,
    piece: Piece,
    from: Square,
    offsets: &[i16],
    captures_only: bool,
    captures: &mut MoveList,
    quiets: &mut MoveList,
) {
    for &delta in offsets {
        let Some(to) = from.offset(delta) else { continue };
        match pos.piece_on(to) {
            Some(target) if target.color != piece.color => {
                captures.push(Move::new(MoveKind::Normal, from, to, piece, Some(target), None));
            }
            None if !captures_only => {
                quiets.push(Move::new(MoveKind::Normal, from, to, piece, None, None));
            }
            _ => {}
        }
    }
}

/// スライディング駒（ビショップ/ルーク/クイーン）の指し手を生成
///
/// 方向オフセットテーブルを歩き、最初の駒（敵ならキャプチャ）または
/// 盤端（0x88マスクテスト）で打ち切る。
fn generate_slider_moves(
    pos: &Position,
    kind: PieceType,
    dirs: &[i16],
    captures_only: bool,
    captures: &mut MoveList,
    quiets: &mut MoveList,
) {
    let us = pos.side_to_move();
    let piece = Piece::new(us, kind);

    for &from in pos.pieces(us, kind) {
        for &dir in dirs {
            let mut cur = from;
            while let Some(to) = cur.offset(dir) {
                match pos.piece_on(to) {
                    Some(target) => {
                        if target.color != us {
                            captures.push(Move::new(
                                MoveKind::Normal,
                                from,
                                to,
                                piece,
                                Some(target),
                                None,
                            ));
                        }
                        break;
                    }
                    None => {
                        if !captures_only {
                            quiets.push(Move::new(MoveKind::Normal, from, to, piece, None, None));
                        }
                        cur = to;
                    }
                }
            }
        }
    }
}

/// キャスリングを生成
///
/// 条件: キングに王手がかかっていない、権利フラグが残っている、
/// キングの通過マスと到達マスが空いている、通過マスに相手の利きがない、
/// クイーンサイドはルークの通過マス（b筋）も空いている。
/// 到達マスの安全性は合法性フィルタに任せる。
fn generate_castling_moves(pos: &Position, quiets: &mut MoveList) {
    let us = pos.side_to_move();
    let them = !us;
    let king_from = pos.king_square(us);
    let rank = match us {
        crate::types::Color::White => 0,
        crate::types::Color::Black => 7,
    };
    let home = Square::new(4, rank);
    if king_from != home || pos.is_attacked(them, king_from) {
        return;
    }

    let (king_side, queen_side) = match us {
        crate::types::Color::White => (CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN),
        crate::types::Color::Black => (CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN),
    };
    let king = Piece::new(us, PieceType::King);
    let rights = pos.castling_rights();

    // キングサイド: f, g が空で f に利きがない
    if rights & king_side != 0 {
        let f = Square::new(5, rank);
        let g = Square::new(6, rank);
        if pos.piece_on(f).is_none() && pos.piece_on(g).is_none() && !pos.is_attacked(them, f) {
            quiets.push(Move::new(MoveKind::Castling, king_from, g, king, None, None));
        }
    }

    // クイーンサイド: d, c, b が空で d に利きがない
    if rights & queen_side != 0 {
        let d = Square::new(3, rank);
        let c = Square::new(2, rank);
        let b = Square::new(1, rank);
        if pos.piece_on(d).is_none()
            && pos.piece_on(c).is_none()
            && pos.piece_on(b).is_none()
            && !pos.is_attacked(them, d)
        {
            quiets.push(Move::new(MoveKind::Castling, king_from, c, king, None, None));
        }
    }
}
