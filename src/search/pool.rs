//! Persistent pool of search threads (Lazy SMP).
//!
//! Every thread owns a [`Worker`] and sleeps in an idle loop until it is
//! handed a task. Thread 0 is the main thread: it starts the helpers, runs
//! its own search, then raises the stop flag and waits for the helpers
//! before reporting completion. All threads share the transposition table.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};
use parking_lot::{Condvar, Mutex};

use super::worker::{SearchShared, Worker};
use super::{RootMove, SearchLimits};
use crate::board::{Board, PAWN_VALUE_EG};
use crate::options::EngineConfig;
use crate::sync::{StopFlag, ThreadCounters};
use crate::tablebase::Tablebases;
use crate::tt::TranspositionTable;

/// Search thread stack size (32 MB to handle deep recursion)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Generations cycle through 1..=63 so a stored entry is never all zeroes
const MAX_GENERATION: u8 = 63;

struct SearchTask {
    board: Board,
    root_moves: Vec<RootMove>,
    shared: Arc<SearchShared>,
    /// Threads the main thread starts and waits for; empty for helpers
    helpers: Vec<Arc<ThreadInner>>,
}

enum Task {
    Search(Box<SearchTask>),
    ClearHistories,
}

struct ThreadState {
    searching: bool,
    exit: bool,
    task: Option<Task>,
}

struct ThreadInner {
    worker: Mutex<Worker>,
    state: Mutex<ThreadState>,
    condvar: Condvar,
}

impl ThreadInner {
    fn schedule(&self, task: Task) {
        let mut state = self.state.lock();
        while state.searching {
            self.condvar.wait(&mut state);
        }
        state.task = Some(task);
        state.searching = true;
        self.condvar.notify_all();
    }

    fn wait_for_search_finished(&self) {
        let mut state = self.state.lock();
        while state.searching {
            self.condvar.wait(&mut state);
        }
    }
}

struct SearchThread {
    inner: Arc<ThreadInner>,
    handle: Option<JoinHandle<()>>,
}

impl SearchThread {
    fn spawn(id: usize, worker: Worker) -> io::Result<Self> {
        let inner = Arc::new(ThreadInner {
            worker: Mutex::new(worker),
            state: Mutex::new(ThreadState {
                searching: true,
                exit: false,
                task: None,
            }),
            condvar: Condvar::new(),
        });
        let inner_clone = Arc::clone(&inner);
        let handle = thread::Builder::new()
            .name(format!("search-{id}"))
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || idle_loop(&inner_clone))?;

        let thread = SearchThread {
            inner,
            handle: Some(handle),
        };
        thread.inner.wait_for_search_finished();
        Ok(thread)
    }
}

impl Drop for SearchThread {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock();
            state.exit = true;
            state.searching = true;
            self.inner.condvar.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn idle_loop(inner: &ThreadInner) {
    loop {
        let task = {
            let mut state = inner.state.lock();
            state.searching = false;
            inner.condvar.notify_all();

            while !state.searching && !state.exit {
                inner.condvar.wait(&mut state);
            }
            if state.exit {
                return;
            }
            state.task.take()
        };

        match task {
            Some(Task::Search(task)) => run_search(inner, *task),
            Some(Task::ClearHistories) => inner.worker.lock().clear(),
            None => {}
        }
    }
}

fn run_search(inner: &ThreadInner, task: SearchTask) {
    let SearchTask {
        board,
        root_moves,
        shared,
        helpers,
    } = task;
    let mut worker = inner.worker.lock();

    if !worker.is_main() {
        worker.prepare(board, root_moves, shared);
        worker.iterative_deepening();
        return;
    }

    if !root_moves.is_empty() {
        for helper in &helpers {
            helper.schedule(Task::Search(Box::new(SearchTask {
                board: board.clone(),
                root_moves: root_moves.clone(),
                shared: Arc::clone(&shared),
                helpers: Vec::new(),
            })));
        }
    }
    worker.prepare(board, root_moves, Arc::clone(&shared));
    worker.iterative_deepening();

    shared.stop.stop();
    for helper in &helpers {
        helper.wait_for_search_finished();
    }
    debug!(
        "search finished: depth {} nodes {} time {} ms",
        worker.completed_depth(),
        shared.nodes_searched(),
        worker.elapsed_ms()
    );
}

/// The pool of search threads plus the resources they share.
pub struct ThreadPool {
    threads: Vec<SearchThread>,
    counters: Vec<Arc<ThreadCounters>>,
    stop: StopFlag,
    tt: Arc<TranspositionTable>,
    tablebases: Arc<Tablebases>,
    generation: u8,
}

impl ThreadPool {
    /// A pool with `threads` workers and a `hash_mb` transposition table
    pub fn new(threads: usize, hash_mb: usize) -> io::Result<Self> {
        let mut pool = ThreadPool {
            threads: Vec::new(),
            counters: Vec::new(),
            stop: StopFlag::new(),
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            tablebases: Arc::new(Tablebases::default()),
            generation: 0,
        };
        pool.set_size(threads)?;
        Ok(pool)
    }

    /// Number of live threads, main thread included
    #[must_use]
    pub fn size(&self) -> usize {
        self.threads.len()
    }

    /// Grow or shrink the pool. Zero joins every thread.
    pub fn set_size(&mut self, threads: usize) -> io::Result<()> {
        if threads == self.threads.len() {
            return Ok(());
        }
        self.wait_for_search_finished();
        self.threads.clear();
        self.counters.clear();

        for id in 0..threads {
            let counters = Arc::new(ThreadCounters::default());
            let shared = Arc::new(SearchShared::idle(
                Arc::clone(&self.tt),
                Arc::clone(&self.tablebases),
                self.stop.clone(),
            ));
            let worker = Worker::new(id, Arc::clone(&counters), shared);
            self.threads.push(SearchThread::spawn(id, worker)?);
            self.counters.push(counters);
        }
        info!("search threads: {threads}");
        Ok(())
    }

    #[must_use]
    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Replace the transposition table with an empty one of `hash_mb`
    pub fn resize_tt(&mut self, hash_mb: usize) {
        self.wait_for_search_finished();
        self.tt = Arc::new(TranspositionTable::new(hash_mb));
    }

    pub fn set_tablebases(&mut self, tablebases: Tablebases) {
        self.wait_for_search_finished();
        self.tablebases = Arc::new(tablebases);
    }

    /// Clear the transposition table and every worker's history tables
    pub fn clear(&mut self) {
        self.wait_for_search_finished();
        self.tt.clear();
        for thread in &self.threads {
            thread.inner.schedule(Task::ClearHistories);
        }
        for thread in &self.threads {
            thread.inner.wait_for_search_finished();
        }
        debug!("search state cleared");
    }

    /// Start searching `board` on every thread and return immediately.
    ///
    /// Root moves are generated and ranked by the tablebases here, so every
    /// thread starts from the same list.
    pub fn start_thinking(&mut self, board: &Board, limits: SearchLimits, config: &EngineConfig) {
        if self.threads.is_empty() {
            log::warn!("start_thinking on an empty thread pool");
            return;
        }
        self.wait_for_search_finished();
        self.stop.reset();
        for counters in &self.counters {
            counters.reset();
        }
        self.generation = self.generation % MAX_GENERATION + 1;

        let mut board = board.clone();
        let mut root_moves: Vec<RootMove> = board.generate_moves().iter().map(|&mv| RootMove::new(mv)).collect();
        let mut probe = self.tablebases.settings(config);
        let root_in_tb = self.tablebases.rank_root_moves(&mut board, &mut root_moves, &mut probe);

        let shared = Arc::new(SearchShared {
            tt: Arc::clone(&self.tt),
            tablebases: Arc::clone(&self.tablebases),
            stop: self.stop.clone(),
            counters: self.counters.clone(),
            limits,
            multi_pv: config.multi_pv,
            contempt: config.contempt_for(board.side_to_move()) * PAWN_VALUE_EG / 100,
            probe,
            root_in_tb,
            generation: self.generation,
        });
        debug!(
            "start search: {} root moves, {} threads, limits {:?}",
            root_moves.len(),
            self.threads.len(),
            limits
        );

        let helpers = self.threads[1..].iter().map(|t| Arc::clone(&t.inner)).collect();
        self.threads[0].inner.schedule(Task::Search(Box::new(SearchTask {
            board,
            root_moves,
            shared,
            helpers,
        })));
    }

    /// Block until the main thread reports completion
    pub fn wait_for_search_finished(&self) {
        if let Some(main) = self.threads.first() {
            main.inner.wait_for_search_finished();
        }
    }

    #[must_use]
    pub fn nodes_searched(&self) -> u64 {
        self.counters.iter().map(|c| c.nodes()).sum()
    }

    #[must_use]
    pub fn tb_hits(&self) -> u64 {
        self.counters.iter().map(|c| c.tb_hits()).sum()
    }

    /// Read the main worker's state after a search
    pub fn with_main_worker<R>(&self, f: impl FnOnce(&Worker) -> R) -> Option<R> {
        let main = self.threads.first()?;
        let worker = main.inner.worker.lock();
        Some(f(&worker))
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.wait_for_search_finished();
    }
}
