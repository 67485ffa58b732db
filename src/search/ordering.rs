//! Move ordering tables and the scored move picker.

use crate::board::{Board, Color, Move, MoveList, Piece, MAX_PLY};

/// Hash move (from transposition table), tried first
pub(crate) const TT_MOVE_SCORE: i32 = 1 << 20;
/// Winning side of every capture and queen promotion
const CAPTURE_BASE: i32 = 1 << 16;
pub(crate) const KILLER1_SCORE: i32 = 20000;
pub(crate) const KILLER2_SCORE: i32 = 10000;
/// History scores stay below the killer slots
const HISTORY_MAX: i32 = 8192;

/// Material value used for MVV-LVA (centipawns)
pub(crate) fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight => 320,
        Piece::Bishop => 330,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 20000,
    }
}

/// Whether `mv` removes an enemy piece
#[inline]
pub(crate) fn is_capture(board: &Board, mv: Move) -> bool {
    mv.is_en_passant() || (!mv.is_castling() && board.piece_at(mv.to()).is_some())
}

/// Captures, en passant and promotions
#[inline]
pub(crate) fn is_tactical(board: &Board, mv: Move) -> bool {
    mv.is_promotion() || is_capture(board, mv)
}

/// Most valuable victim, least valuable attacker
fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let attacker = board.piece_at(mv.from()).map_or(0, |(_, p)| piece_value(p));
    let victim = if mv.is_en_passant() {
        piece_value(Piece::Pawn)
    } else {
        board.piece_at(mv.to()).map_or(0, |(_, p)| piece_value(p))
    };
    let promotion = mv.promotion_piece().map_or(0, piece_value);
    victim * 10 + promotion - attacker / 10
}

pub(crate) struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::NONE; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn primary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |row| row[0])
    }

    #[must_use]
    pub fn secondary(&self, ply: usize) -> Move {
        self.slots.get(ply).map_or(Move::NONE, |row| row[1])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        if self.slots[ply][0] != mv {
            self.slots[ply][1] = self.slots[ply][0];
            self.slots[ply][0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NONE; 2]; MAX_PLY];
    }
}

/// Butterfly history indexed by `[color][from][to]`
pub(crate) struct HistoryTable {
    entries: Box<[[[i32; 64]; 64]; 2]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            entries: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[must_use]
    pub fn score(&self, color: Color, mv: Move) -> i32 {
        self.entries[color.index()][mv.from().index()][mv.to().index()]
    }

    /// Reward a quiet move that caused a beta cutoff
    pub fn update(&mut self, color: Color, mv: Move, depth: i32) {
        self.apply(color, mv, depth * depth);
    }

    /// Penalize a quiet move that was tried before the cutoff move
    pub fn penalize(&mut self, color: Color, mv: Move, depth: i32) {
        self.apply(color, mv, -(depth * depth));
    }

    /// Gravity update: entries saturate towards `±HISTORY_MAX`
    fn apply(&mut self, color: Color, mv: Move, bonus: i32) {
        let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
        let entry = &mut self.entries[color.index()][mv.from().index()][mv.to().index()];
        *entry += bonus - *entry * bonus.abs() / HISTORY_MAX;
    }

    pub fn reset(&mut self) {
        *self.entries = [[[0; 64]; 64]; 2];
    }
}

/// Moves paired with ordering scores, handed out best first.
pub(crate) struct ScoredMoves {
    moves: [(Move, i32); 256],
    len: usize,
    next: usize,
}

impl ScoredMoves {
    /// Score a full move list for the main search
    pub fn new(
        board: &Board,
        moves: &MoveList,
        tt_move: Move,
        killers: [Move; 2],
        history: &HistoryTable,
    ) -> Self {
        let us = board.side_to_move();
        Self::build(moves, |mv| {
            if mv == tt_move {
                TT_MOVE_SCORE
            } else if is_tactical(board, mv) {
                let gain = mvv_lva(board, mv);
                // Under-promotions go behind the quiets
                if matches!(mv.promotion_piece(), Some(p) if p != Piece::Queen) {
                    -CAPTURE_BASE + gain
                } else {
                    CAPTURE_BASE + gain
                }
            } else if mv == killers[0] {
                KILLER1_SCORE
            } else if mv == killers[1] {
                KILLER2_SCORE
            } else {
                history.score(us, mv)
            }
        })
    }

    /// Score captures and evasions for quiescence search
    pub fn tactical(board: &Board, moves: &MoveList) -> Self {
        Self::build(moves, |mv| {
            if is_tactical(board, mv) {
                CAPTURE_BASE + mvv_lva(board, mv)
            } else {
                0
            }
        })
    }

    fn build(moves: &MoveList, mut score: impl FnMut(Move) -> i32) -> Self {
        let mut scored = ScoredMoves {
            moves: [(Move::NONE, 0); 256],
            len: 0,
            next: 0,
        };
        for &mv in moves {
            scored.moves[scored.len] = (mv, score(mv));
            scored.len += 1;
        }
        scored
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Selection sort step: swap the best remaining move to the front
    pub fn next_best(&mut self) -> Option<(Move, i32)> {
        if self.next >= self.len {
            return None;
        }
        let best = (self.next..self.len)
            .max_by_key(|&i| (self.moves[i].1, std::cmp::Reverse(i)))
            .unwrap_or(self.next);
        self.moves.swap(self.next, best);
        self.next += 1;
        Some(self.moves[self.next - 1])
    }
}
