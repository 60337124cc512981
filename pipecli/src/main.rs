mod layout;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use pipebot_board::{Board, Round};
use pipebot_solver::{BreadthFirst, IterativeDeepening, Solver, DEFAULT_MAX_DEPTH};
use text_io::try_read;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::layout::Layout;

/// Finds the shortest solution of a sliding robot puzzle with deflectors.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Path to a JSON board layout. The line based layout is read from stdin if missing
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// The search used to find a solution
    #[arg(short, long, value_enum, default_value_t = SolverKind::Bfs)]
    solver: SolverKind,

    /// The maximum number of moves the iterative deepening search looks for
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the board and the path of every move
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverKind {
    /// Breadth first search
    Bfs,
    /// Iterative deepening depth first search
    Iddfs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    let board = match &args.board {
        Some(path) => Layout::load(path)?
            .into_board()
            .with_context(|| format!("Invalid board in '{}'", path.display()))?,
        None => read_stdin_board().context("Invalid board on stdin")?,
    };
    info!(
        side_length = board.side_length(),
        robots = board.robot_positions().len(),
        deflectors = board.deflectors().count(),
        goal = %board.target(),
        "Loaded board"
    );

    if args.verbose {
        println!("{:?}", board);
    }

    let round = Round::new(board);
    let start = round.start_positions().clone();
    let solution = match args.solver {
        SolverKind::Bfs => BreadthFirst::new().solve(&round, start),
        SolverKind::Iddfs => IterativeDeepening::new(args.max_depth).solve(&round, start),
    };

    let path = match solution {
        Some(path) => path,
        None => {
            info!("The target can't be reached");
            println!("unsolvable");
            return Ok(());
        }
    };

    info!(moves = path.len(), "Solved");
    println!("{}", path.len());
    for (move_n, m) in path.moves().iter().enumerate() {
        print!(" {:>2}  {:<8}{:<6}", move_n + 1, m.robot(), m.direction());
        if args.verbose {
            let bounces = m
                .replay()
                .bounces()
                .map(|pos| pos.to_string())
                .collect::<Vec<_>>();
            print!("{} -> {}", m.replay().start(), m.replay().end());
            if !bounces.is_empty() {
                print!(" via {}", bounces.join(", "));
            }
        }
        println!();
    }

    Ok(())
}

/// Reads the line based layout from stdin until the target line.
fn read_stdin_board() -> anyhow::Result<Board> {
    layout::read_board(|| {
        let line: Result<String, text_io::Error> = try_read!("{}\n");
        line
    })
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
