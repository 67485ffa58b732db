//! Per-thread search: iterative deepening, PVS and quiescence.

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;

use super::ordering::{is_tactical, HistoryTable, KillerTable, ScoredMoves, KILLER2_SCORE};
use super::{
    mate_in, mated_in, sort_root_moves, value_from_tt, value_to_tt, RootMove, SearchLimits, VALUE_DRAW,
    VALUE_INFINITE, VALUE_MATE_IN_MAX_PLY, VALUE_NONE, VALUE_ZERO,
};
use crate::board::{Board, Color, Move, MAX_PLY};
use crate::sync::{StopFlag, ThreadCounters};
use crate::tablebase::{ProbeBound, ProbeSettings, Tablebases};
use crate::tt::{Bound, TranspositionTable};

/// Deepest iteration any thread starts
const MAX_DEPTH: i32 = MAX_PLY as i32 - 1;

/// LMR starts after this many moves (`idx > LMR_IDX_BASE + move_count / 4`)
const LMR_IDX_BASE: usize = 3;
const LMR_TABLE_MAX_DEPTH: usize = 32;
const LMR_TABLE_MAX_IDX: usize = 64;

static LMR_TABLE: Lazy<[[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = Lazy::new(|| {
    let mut table = [[0; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
    for (depth, row) in table.iter_mut().enumerate().skip(1) {
        for (idx, cell) in row.iter_mut().enumerate().skip(1) {
            let value = (0.53 + (depth as f64).ln() * (idx as f64).ln() / 2.44).floor();
            *cell = value.max(0.0) as i32;
        }
    }
    table
});

/// Depth offset for a worker thread.
///
/// Odd helpers start one iteration deeper so the threads spread over
/// neighbouring depths and fill the shared table for each other.
fn worker_depth_offset(worker_id: usize) -> i32 {
    i32::from(worker_id % 2 == 1)
}

/// Everything the threads share for one search.
pub(crate) struct SearchShared {
    pub tt: Arc<TranspositionTable>,
    pub tablebases: Arc<Tablebases>,
    pub stop: StopFlag,
    pub counters: Vec<Arc<ThreadCounters>>,
    pub limits: SearchLimits,
    pub multi_pv: usize,
    /// Draw aversion of the root side, in internal value units
    pub contempt: i32,
    pub probe: ProbeSettings,
    pub root_in_tb: bool,
    pub generation: u8,
}

impl SearchShared {
    /// State for a thread that has not searched yet
    pub fn idle(tt: Arc<TranspositionTable>, tablebases: Arc<Tablebases>, stop: StopFlag) -> Self {
        SearchShared {
            tt,
            tablebases,
            stop,
            counters: Vec::new(),
            limits: SearchLimits::default(),
            multi_pv: 1,
            contempt: 0,
            probe: ProbeSettings {
                cardinality: 0,
                probe_depth: 0,
                use_rule50: true,
            },
            root_in_tb: false,
            generation: 0,
        }
    }

    /// Nodes searched by all threads
    pub fn nodes_searched(&self) -> u64 {
        self.counters.iter().map(|c| c.nodes()).sum()
    }
}

/// Triangular principal variation table
struct PvTable {
    lines: Box<[[Move; MAX_PLY + 1]; MAX_PLY + 1]>,
    len: [usize; MAX_PLY + 1],
}

impl PvTable {
    fn new() -> Self {
        PvTable {
            lines: Box::new([[Move::NONE; MAX_PLY + 1]; MAX_PLY + 1]),
            len: [0; MAX_PLY + 1],
        }
    }

    fn clear(&mut self, ply: usize) {
        if ply <= MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// `mv` followed by the line found one ply deeper
    fn update(&mut self, ply: usize, mv: Move) {
        debug_assert!(ply < MAX_PLY);
        let child_len = self.len[ply + 1];
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        head[ply][0] = mv;
        head[ply][1..=child_len].copy_from_slice(&tail[0][..child_len]);
        self.len[ply] = child_len + 1;
    }

    fn line(&self, ply: usize) -> &[Move] {
        &self.lines[ply][..self.len[ply]]
    }
}

/// Search state of one thread. The main worker (id 0) also watches the
/// limits and its root moves are what callers read after a search.
pub struct Worker {
    id: usize,
    board: Board,
    root_moves: Vec<RootMove>,
    root_depth: i32,
    completed_depth: i32,
    pv_idx: usize,
    sel_depth: i32,
    root_color: Color,
    calls_cnt: u64,
    counters: Arc<ThreadCounters>,
    shared: Arc<SearchShared>,
    killers: KillerTable,
    history: HistoryTable,
    pv: PvTable,
}

impl Worker {
    pub(crate) fn new(id: usize, counters: Arc<ThreadCounters>, shared: Arc<SearchShared>) -> Self {
        Worker {
            id,
            board: Board::new(),
            root_moves: Vec::new(),
            root_depth: 0,
            completed_depth: 0,
            pv_idx: 0,
            sel_depth: 0,
            root_color: Color::White,
            calls_cnt: 0,
            counters,
            shared,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            pv: PvTable::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn is_main(&self) -> bool {
        self.id == 0
    }

    /// Root moves, best first, as left by the last search
    #[must_use]
    pub fn root_moves(&self) -> &[RootMove] {
        &self.root_moves
    }

    /// Depth of the iteration in progress when the search ended
    #[must_use]
    pub fn root_depth(&self) -> i32 {
        self.root_depth
    }

    #[must_use]
    pub fn completed_depth(&self) -> i32 {
        self.completed_depth
    }

    /// Index of the PV line in progress when the search ended
    #[must_use]
    pub fn pv_idx(&self) -> usize {
        self.pv_idx
    }

    /// Whether every root move was adjudicated by a tablebase
    #[must_use]
    pub fn root_in_tb(&self) -> bool {
        self.shared.root_in_tb
    }

    /// Milliseconds since the search was dispatched
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.shared.limits.elapsed_ms()
    }

    /// Forget killers and history
    pub(crate) fn clear(&mut self) {
        self.killers.reset();
        self.history.reset();
    }

    pub(crate) fn prepare(&mut self, board: Board, root_moves: Vec<RootMove>, shared: Arc<SearchShared>) {
        self.root_color = board.side_to_move();
        self.board = board;
        self.root_moves = root_moves;
        self.shared = shared;
        self.root_depth = 0;
        self.completed_depth = 0;
        self.pv_idx = 0;
        self.sel_depth = 0;
        self.calls_cnt = 0;
        self.killers.reset();
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.shared.stop.is_stopped()
    }

    /// Raise the stop flag once a limit is hit. Only the main worker checks,
    /// every `min(1024, nodes / 1024)` calls.
    fn check_time(&mut self) {
        if !self.is_main() {
            return;
        }
        if self.calls_cnt > 0 {
            self.calls_cnt -= 1;
            return;
        }
        let limits = self.shared.limits;
        self.calls_cnt = limits.nodes.map_or(1024, |n| (n / 1024).min(1024));

        let out_of_time = limits.movetime.is_some_and(|t| limits.elapsed_ms() >= t);
        let out_of_nodes = limits.nodes.is_some_and(|n| self.shared.nodes_searched() >= n);
        if out_of_time || out_of_nodes {
            self.shared.stop.stop();
        }
    }

    /// Draw score for the side to move, seen through the root side's contempt
    #[inline]
    fn draw_value(&self) -> i32 {
        if self.board.side_to_move() == self.root_color {
            VALUE_DRAW - self.shared.contempt
        } else {
            VALUE_DRAW + self.shared.contempt
        }
    }

    /// Iterative deepening over all PV lines until a limit or the stop flag
    pub(crate) fn iterative_deepening(&mut self) {
        if self.root_moves.is_empty() {
            return;
        }
        let multi_pv = self.shared.multi_pv.min(self.root_moves.len());
        let max_depth = if self.is_main() {
            self.shared.limits.depth.map_or(MAX_DEPTH, |d| d.min(MAX_DEPTH))
        } else {
            MAX_DEPTH
        };

        let first_depth = 1 + worker_depth_offset(self.id);
        for depth in first_depth..=max_depth {
            if self.stopped() {
                break;
            }
            self.root_depth = depth;
            for rm in &mut self.root_moves {
                rm.previous_score = rm.score;
            }

            self.pv_idx = 0;
            while self.pv_idx < multi_pv && !self.stopped() {
                self.sel_depth = 0;
                self.search_line(depth);
                sort_root_moves(&mut self.root_moves[..=self.pv_idx]);
                self.pv_idx += 1;
            }

            if !self.stopped() {
                self.completed_depth = depth;
                if self.is_main() {
                    self.log_iteration(depth);
                }
            }
        }
    }

    fn log_iteration(&self, depth: i32) {
        let best = &self.root_moves[0];
        let pv: Vec<String> = best.pv.iter().map(ToString::to_string).collect();
        debug!(
            "depth {} seldepth {} score {} nodes {} time {} pv {}",
            depth,
            best.sel_depth,
            best.score,
            self.shared.nodes_searched(),
            self.elapsed_ms(),
            pv.join(" ")
        );
    }

    /// Search the current PV line with an aspiration window around its
    /// previous score
    fn search_line(&mut self, depth: i32) {
        let previous = self.root_moves[self.pv_idx].previous_score;
        let mut delta = 20;
        let (mut alpha, mut beta) = if depth >= 5 {
            ((previous - delta).max(-VALUE_INFINITE), (previous + delta).min(VALUE_INFINITE))
        } else {
            (-VALUE_INFINITE, VALUE_INFINITE)
        };

        loop {
            let value = self.search_root(depth, alpha, beta);
            sort_root_moves(&mut self.root_moves[self.pv_idx..]);
            if self.stopped() {
                break;
            }
            if value <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (value - delta).max(-VALUE_INFINITE);
            } else if value >= beta {
                beta = (value + delta).min(VALUE_INFINITE);
            } else {
                break;
            }
            delta += delta / 4 + 5;
        }
    }

    /// Root node: walks the root moves from the current PV line onwards and
    /// records a score and line for each move that raised alpha.
    fn search_root(&mut self, depth: i32, mut alpha: i32, beta: i32) -> i32 {
        let mut best_value = -VALUE_INFINITE;
        let mut best_move = Move::NONE;
        let first = self.pv_idx;

        for i in first..self.root_moves.len() {
            let mv = self.root_moves[i].mv();
            self.pv.clear(1);
            self.counters.add_node();
            let info = self.board.make_move(mv);
            let new_depth = depth - 1 + i32::from(self.board.in_check());

            let value = if i == first {
                -self.search(true, new_depth, -beta, -alpha, 1, true)
            } else {
                let mut v = -self.search(false, new_depth, -alpha - 1, -alpha, 1, true);
                if v > alpha {
                    v = -self.search(true, new_depth, -beta, -alpha, 1, true);
                }
                v
            };
            self.board.unmake_move(mv, info);

            if self.stopped() {
                return VALUE_ZERO;
            }

            let rm = &mut self.root_moves[i];
            if i == first || value > alpha {
                rm.score = value;
                rm.sel_depth = self.sel_depth;
                rm.pv.truncate(1);
                rm.pv.extend_from_slice(self.pv.line(1));
            } else {
                rm.score = -VALUE_INFINITE;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if value >= beta {
                        break;
                    }
                    alpha = value;
                }
            }
        }

        if first == 0 {
            let bound = if best_value >= beta {
                Bound::Lower
            } else if best_move != Move::NONE {
                Bound::Exact
            } else {
                Bound::Upper
            };
            self.shared.tt.store(
                self.board.hash(),
                depth,
                value_to_tt(best_value, 0),
                VALUE_NONE,
                bound,
                (best_move != Move::NONE).then_some(best_move),
                self.shared.generation,
            );
        }
        best_value
    }

    /// Late move reduction for a quiet move
    #[allow(clippy::fn_params_excessive_bools)]
    fn reduction(depth: i32, move_idx: usize, move_count: usize, move_score: i32, pv_node: bool, gives_check: bool) -> i32 {
        let lmr_ok = move_idx > LMR_IDX_BASE + move_count / 4
            && move_score < KILLER2_SCORE
            && depth > 2
            && !pv_node
            && !gives_check;
        if !lmr_ok {
            return 0;
        }
        let d = (depth as usize).min(LMR_TABLE_MAX_DEPTH - 1);
        let i = move_idx.min(LMR_TABLE_MAX_IDX - 1);
        LMR_TABLE[d][i].min(depth - 2)
    }

    /// Alpha-beta search below the root
    #[allow(clippy::too_many_lines)]
    fn search(&mut self, pv_node: bool, depth: i32, mut alpha: i32, mut beta: i32, ply: usize, allow_null: bool) -> i32 {
        if depth <= 0 {
            return self.qsearch(pv_node, alpha, beta, ply);
        }
        if pv_node {
            self.pv.clear(ply);
            self.sel_depth = self.sel_depth.max(ply as i32 + 1);
        }
        self.check_time();
        let in_check = self.board.in_check();
        if self.stopped() {
            return VALUE_ZERO;
        }
        if ply >= MAX_PLY {
            return if in_check { self.draw_value() } else { self.board.evaluate() };
        }
        if self.board.is_draw() {
            return self.draw_value();
        }

        // Mate distance pruning
        alpha = alpha.max(mated_in(ply));
        beta = beta.min(mate_in(ply + 1));
        if alpha >= beta {
            return alpha;
        }

        let key = self.board.hash();
        let tt_entry = self.shared.tt.probe(key);
        let tt_value = tt_entry.map_or(VALUE_NONE, |e| value_from_tt(e.score, ply));
        if let Some(entry) = tt_entry {
            let cutoff = match entry.bound {
                Bound::Exact => true,
                Bound::Lower => tt_value >= beta,
                Bound::Upper => tt_value <= alpha,
            };
            if !pv_node && entry.depth >= depth && cutoff {
                return tt_value;
            }
        }

        if let Some(value) = self.probe_tablebases(depth, alpha, beta, ply) {
            return value;
        }

        let us = self.board.side_to_move();
        let static_eval = if in_check { VALUE_NONE } else { self.board.evaluate() };

        // Null move pruning
        if !pv_node
            && allow_null
            && !in_check
            && depth >= 2
            && static_eval >= beta
            && beta.abs() < VALUE_MATE_IN_MAX_PLY
            && self.board.has_non_pawn_material(us)
        {
            let r = 2 + depth / 4;
            let info = self.board.make_null_move();
            let value = -self.search(false, depth - 1 - r, -beta, -beta + 1, ply + 1, false);
            self.board.unmake_null_move(info);
            if self.stopped() {
                return VALUE_ZERO;
            }
            if value >= beta {
                return if value >= VALUE_MATE_IN_MAX_PLY { beta } else { value };
            }
        }

        let moves = self.board.generate_moves();
        if moves.is_empty() {
            return if in_check { mated_in(ply) } else { VALUE_DRAW };
        }

        let tt_move = tt_entry
            .and_then(|e| e.best_move)
            .filter(|&mv| moves.contains(mv))
            .unwrap_or(Move::NONE);
        let killers = [self.killers.primary(ply), self.killers.secondary(ply)];
        let mut picker = ScoredMoves::new(&self.board, &moves, tt_move, killers, &self.history);

        let move_total = moves.len();
        let mut best_value = -VALUE_INFINITE;
        let mut best_move = Move::NONE;
        let mut move_idx = 0usize;
        let mut quiets_tried = [Move::NONE; 64];
        let mut quiets_count = 0usize;

        while let Some((mv, move_score)) = picker.next_best() {
            let quiet = !is_tactical(&self.board, mv);
            self.pv.clear(ply + 1);
            self.counters.add_node();
            let info = self.board.make_move(mv);
            let gives_check = self.board.in_check();
            let new_depth = depth - 1 + i32::from(gives_check);

            let value = if move_idx == 0 {
                -self.search(pv_node, new_depth, -beta, -alpha, ply + 1, true)
            } else {
                let r = if quiet && !in_check {
                    Self::reduction(depth, move_idx, move_total, move_score, pv_node, gives_check)
                } else {
                    0
                };
                let mut v = -self.search(false, new_depth - r, -alpha - 1, -alpha, ply + 1, true);
                if r > 0 && v > alpha {
                    v = -self.search(false, new_depth, -alpha - 1, -alpha, ply + 1, true);
                }
                if pv_node && v > alpha && v < beta {
                    v = -self.search(true, new_depth, -beta, -alpha, ply + 1, true);
                }
                v
            };
            self.board.unmake_move(mv, info);
            move_idx += 1;

            if self.stopped() {
                return VALUE_ZERO;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = mv;
                    if pv_node {
                        self.pv.update(ply, mv);
                    }
                    if value >= beta {
                        if quiet {
                            self.killers.update(ply, mv);
                            self.history.update(us, mv, depth);
                            for &tried in &quiets_tried[..quiets_count] {
                                self.history.penalize(us, tried, depth);
                            }
                        }
                        break;
                    }
                    alpha = value;
                }
            }
            if quiet && quiets_count < quiets_tried.len() {
                quiets_tried[quiets_count] = mv;
                quiets_count += 1;
            }
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if pv_node && best_move != Move::NONE {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.shared.tt.store(
            key,
            depth,
            value_to_tt(best_value, ply),
            static_eval,
            bound,
            (best_move != Move::NONE).then_some(best_move),
            self.shared.generation,
        );
        best_value
    }

    /// In-tree tablebase probe right after a capture or pawn move
    fn probe_tablebases(&mut self, depth: i32, alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        let probe = self.shared.probe;
        if probe.cardinality == 0 {
            return None;
        }
        let pieces = self.board.piece_count();
        let eligible = pieces <= probe.cardinality
            && (pieces < probe.cardinality || depth >= probe.probe_depth)
            && self.board.halfmove_clock() == 0
            && self.board.castling_rights().is_empty();
        if !eligible {
            return None;
        }

        let wdl = self.shared.tablebases.probe_wdl(&self.board)?;
        self.counters.add_tb_hit();
        let (value, bound) = wdl.search_value(ply, probe.use_rule50);
        let (cutoff, tt_bound) = match bound {
            ProbeBound::Exact => (true, Bound::Exact),
            ProbeBound::Lower => (value >= beta, Bound::Lower),
            ProbeBound::Upper => (value <= alpha, Bound::Upper),
        };
        if !cutoff {
            return None;
        }
        self.shared.tt.store(
            self.board.hash(),
            (depth + 6).min(MAX_DEPTH),
            value_to_tt(value, ply),
            VALUE_NONE,
            tt_bound,
            None,
            self.shared.generation,
        );
        Some(value)
    }

    /// Quiescence search: captures and queen promotions, or every evasion
    /// when in check
    fn qsearch(&mut self, pv_node: bool, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        if pv_node {
            self.pv.clear(ply);
            self.sel_depth = self.sel_depth.max(ply as i32 + 1);
        }
        self.check_time();
        let in_check = self.board.in_check();
        if self.stopped() {
            return VALUE_ZERO;
        }
        if ply >= MAX_PLY {
            return if in_check { self.draw_value() } else { self.board.evaluate() };
        }
        if self.board.is_draw() {
            return self.draw_value();
        }

        let mut best_value = if in_check {
            -VALUE_INFINITE
        } else {
            let stand_pat = self.board.evaluate();
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
            stand_pat
        };

        let moves = if in_check {
            let evasions = self.board.generate_moves();
            if evasions.is_empty() {
                return mated_in(ply);
            }
            evasions
        } else {
            self.board.generate_captures()
        };

        let mut picker = ScoredMoves::tactical(&self.board, &moves);
        while let Some((mv, _)) = picker.next_best() {
            self.pv.clear(ply + 1);
            self.counters.add_node();
            let info = self.board.make_move(mv);
            let value = -self.qsearch(pv_node, -beta, -alpha, ply + 1);
            self.board.unmake_move(mv, info);

            if self.stopped() {
                return VALUE_ZERO;
            }
            if value > best_value {
                best_value = value;
                if value > alpha {
                    if pv_node {
                        self.pv.update(ply, mv);
                    }
                    if value >= beta {
                        return value;
                    }
                    alpha = value;
                }
            }
        }
        best_value
    }
}
