//! The UCI event loop.
//!
//! A reader thread turns stdin lines into parsed commands on a channel; the
//! main loop owns the engine state and dispatches. `go` hands the board and
//! the searcher to a worker thread so `stop` stays responsive; the worker
//! returns both through the same channel when the search ends.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use karst_core::{Board, divide};
use karst_engine::{
    IterationReport, SearchResult, Searcher, bench, limits_from_go,
};

use crate::command::{Command, GoParams, OptionChange, parse_command};
use crate::error::UciError;

enum EngineState {
    Idle,
    Searching,
}

enum EngineEvent {
    Input(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Worker-thread payload: the searcher travels with the result so the main
/// loop gets its transposition table back.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// UCI engine state machine.
pub struct UciEngine {
    board: Board,
    searcher: Option<Searcher>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    max_depth: i32,
    pending_clear_tt: bool,
    pending_hash_mb: Option<usize>,
}

impl UciEngine {
    pub fn new() -> UciEngine {
        UciEngine {
            board: Board::starting_position(),
            searcher: Some(Searcher::new()),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            max_depth: 128,
            pending_clear_tt: false,
            pending_hash_mb: None,
        }
    }

    /// Read commands until `quit` or end of input.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let reader_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received");
                        if reader_tx
                            .send(EngineEvent::Input(parse_command(trimmed)))
                            .is_err()
                        {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }
            let _ = reader_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::Input(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::NewGame => self.handle_newgame(),
                    Command::SetOption(change) => self.handle_setoption(change),
                    Command::Position(board) => self.board = board,
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::Stop => self.stop_flag.store(true, Ordering::Release),
                    Command::Bench => self.handle_bench(),
                    Command::Perft(depth) => self.handle_perft(depth),
                    Command::Quit => {
                        self.wind_down(&rx);
                        break;
                    }
                    Command::Unknown(cmd) => debug!(cmd, "ignoring unknown command"),
                },
                EngineEvent::Input(Err(err)) => warn!(error = %err, "rejected command"),
                EngineEvent::SearchDone(done) => self.finish_search(done),
                EngineEvent::InputClosed => {
                    self.wind_down(&rx);
                    break;
                }
            }
        }

        info!("karst shutting down");
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name karst {}", env!("CARGO_PKG_VERSION"));
        println!("id author the karst authors");
        println!("option name Hash type spin default 16 min 1 max 1024");
        println!("option name maxDepth type spin default 128 min 1 max 128");
        println!("uciok");
    }

    fn handle_newgame(&mut self) {
        self.board = Board::starting_position();
        match self.searcher.as_mut() {
            Some(searcher) => searcher.clear_tt(),
            // The search thread owns the searcher; clear when it returns.
            None => self.pending_clear_tt = true,
        }
    }

    fn handle_setoption(&mut self, change: OptionChange) {
        match change {
            OptionChange::HashMb(mb) => match self.searcher.as_mut() {
                Some(searcher) => searcher.resize_tt(mb),
                None => self.pending_hash_mb = Some(mb),
            },
            OptionChange::MaxDepth(depth) => self.max_depth = depth,
            OptionChange::Unknown(name) => warn!(name, "unknown option"),
        }
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go while already searching, ignoring");
            return;
        }
        let Some(mut searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return;
        };

        self.stop_flag = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            &params.times,
            self.board.side_to_move(),
            Arc::clone(&self.stop_flag),
        );
        let depth = params.depth.unwrap_or(self.max_depth).min(self.max_depth);

        let mut board = self.board.clone();
        let tx = tx.clone();

        std::thread::spawn(move || {
            let root = board.clone();
            let result = searcher.search(&mut board, depth, &control, |report| {
                print_info(report, &root);
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        });
        self.state = EngineState::Searching;
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut searcher = done.searcher;
        if self.pending_clear_tt {
            searcher.clear_tt();
            self.pending_clear_tt = false;
        }
        if let Some(mb) = self.pending_hash_mb.take() {
            searcher.resize_tt(mb);
        }
        self.searcher = Some(searcher);
        self.state = EngineState::Idle;

        if done.result.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", done.result.best_move.to_uci());
        }
    }

    /// Abort any running search and wait for the worker to hand back the
    /// searcher before exiting.
    fn wind_down(&mut self, rx: &mpsc::Receiver<EngineEvent>) {
        if matches!(self.state, EngineState::Idle) {
            return;
        }
        self.stop_flag.store(true, Ordering::Release);
        for event in rx {
            if let EngineEvent::SearchDone(done) = event {
                self.finish_search(done);
                break;
            }
        }
    }

    fn handle_bench(&mut self) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("bench while searching, ignoring");
            return;
        }
        let result = bench::run(bench::BENCH_DEPTH);
        for (i, position) in result.positions.iter().enumerate() {
            println!(
                "info string bench {}/{} bestmove {} nodes {}",
                i + 1,
                result.positions.len(),
                position.best_move.to_uci(),
                position.nodes,
            );
        }
        println!("{} nodes {} nps", result.nodes, result.nps());
    }

    fn handle_perft(&mut self, depth: u32) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("perft while searching, ignoring");
            return;
        }
        let mut board = self.board.clone();
        let rows = divide(&mut board, depth);
        let mut total = 0;
        for (mv, nodes) in &rows {
            println!("{mv}: {nodes}");
            total += nodes;
        }
        println!("nodes searched: {total}");
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit one `info` line for a completed iteration. The PV is replayed on a
/// scratch board first; an illegal continuation is logged and the line
/// truncated there.
fn print_info(report: &IterationReport<'_>, root: &Board) {
    let mut board = root.clone();
    let mut verified = Vec::with_capacity(report.pv.len());
    for &mv in report.pv {
        if !board.is_legal(mv) {
            warn!(mv = %mv, "illegal move in PV, truncating");
            break;
        }
        verified.push(mv.to_uci());
        board.make_move(mv);
    }

    let millis = report.elapsed.as_millis().max(1) as u64;
    let nps = report.nodes * 1000 / millis;
    let score = match report.mate_in {
        Some(mate) => format!("mate {mate}"),
        None => format!("cp {}", report.score),
    };

    println!(
        "info depth {} seldepth {} nodes {} time {} nps {} score {} hashfull {} pv {}",
        report.depth,
        report.seldepth,
        report.nodes,
        millis,
        nps,
        score,
        report.hashfull,
        verified.join(" "),
    );
}
