// Command-line front end for position analysis

use std::io::Write;

use anyhow::{bail, Context, Result};
use chess_analysis::analysis::{AnalysisLimit, AnalysisResult, SessionManager};
use chess_analysis::board::START_FEN;
use chess_analysis::options::DEFAULT_HASH_MB;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Position to analyse (defaults to the start position)
    fen: Option<String>,

    /// Search this many plies
    #[arg(short, long, conflicts_with_all = ["nodes", "movetime"])]
    depth: Option<u32>,

    /// Search this many nodes
    #[arg(short, long, conflicts_with = "movetime")]
    nodes: Option<u64>,

    /// Search this many milliseconds
    #[arg(short, long)]
    movetime: Option<u64>,

    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Transposition table size in MB
    #[arg(long, default_value_t = DEFAULT_HASH_MB)]
    hash: usize,

    /// Number of lines to report
    #[arg(long, default_value_t = 1)]
    multipv: usize,

    /// Contempt in centipawns, 0 disables it
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    contempt: i32,

    /// Read the position with Chess960 castling rules
    #[arg(long)]
    chess960: bool,

    /// Directories holding Syzygy tables
    #[arg(long)]
    syzygy_path: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn limit(&self) -> AnalysisLimit {
        match (self.depth, self.nodes, self.movetime) {
            (Some(depth), _, _) => AnalysisLimit::Depth(depth),
            (_, Some(nodes), _) => AnalysisLimit::Nodes(nodes),
            (_, _, Some(ms)) => AnalysisLimit::MoveTime(ms),
            (None, None, None) => AnalysisLimit::Depth(12),
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if args.threads == 0 {
        bail!("--threads must be at least 1");
    }
    let mut engine = SessionManager::new().context("starting engine")?;
    if args.chess960 {
        engine.set_option("UCI_Chess960", "true")?;
    }
    if let Some(path) = &args.syzygy_path {
        engine.set_option("SyzygyPath", path)?;
    }
    let id = engine.create(args.threads, args.hash, args.contempt, args.multipv)?;

    let fen = args.fen.as_deref().unwrap_or(START_FEN);
    let result = engine
        .analyze(id, fen, args.limit())
        .with_context(|| format!("analysing '{fen}'"))?;

    if args.json {
        print_json(&result)?;
    } else {
        print_result(&result);
    }
    engine.destroy(id)?;
    Ok(())
}

#[cfg(feature = "serde")]
fn print_json(result: &AnalysisResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn print_json(_result: &AnalysisResult) -> Result<()> {
    bail!("--json needs the `serde` feature")
}

fn print_result(result: &AnalysisResult) {
    for pv in &result.variations {
        println!(
            "D/SD: {}/{} {}KN/s",
            pv.depth,
            pv.selective_depth,
            result.nps() / 1000
        );
        println!("Score: {}", f64::from(pv.score) / 100.0);
        println!("Moves: {}", pv.moves_to_string());
    }
    println!(
        "Nodes: {} Time: {}ms TB hits: {}",
        result.nodes_searched, result.elapsed_ms, result.tablebase_hits
    );
}
