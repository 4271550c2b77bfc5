//! `stepviz`: run a backtracking visualizer headless and write its trace.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use stepviz_harness::bundle_dir::{verify_bundle_dir, write_bundle_dir};
use stepviz_harness::contract::ProblemAdapter;
use stepviz_harness::runner::run_adapter;
use stepviz_harness::worlds::n_queens::{NQueensAdapter, NQueensInput};
use stepviz_harness::worlds::permutations::{PermutationInput, PermutationsAdapter};
use stepviz_search::{DetailMode, RunResult};

#[derive(Parser, Debug)]
#[command(author, version, about = "Instrumented backtracking traces", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG still overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place n queens on an n x n board.
    NQueens {
        /// Board size.
        #[arg(short, long)]
        n: Option<usize>,

        /// Collapse rotations and reflections of the same placement.
        #[arg(long)]
        dedupe: bool,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Sequences of distinct values.
    Permutations {
        #[arg(short, long)]
        length: Option<usize>,

        /// Comma-separated candidate values.
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        candidates: Option<Vec<i64>>,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Verify a bundle directory written with `--out`.
    Verify {
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON input file; flags given on the command line override it.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Keep searching after the first solution.
    #[arg(long)]
    all: bool,

    /// Emit every choose/prune/backtrack step.
    #[arg(long)]
    detailed: bool,

    #[arg(long, value_name = "N")]
    max_steps: Option<u64>,

    /// Write the trace bundle to this directory.
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,
}

fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_target(false);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let outcome = match cli.command {
        Command::NQueens { n, dedupe, run } => {
            let adapter = NQueensAdapter;
            load_input(&adapter, run.input.as_deref()).and_then(|base| {
                let input = NQueensInput {
                    n: n.unwrap_or(base.n),
                    dedupe_symmetry: dedupe || base.dedupe_symmetry,
                    stop_after_first: base.stop_after_first && !run.all,
                    detail_mode: pick_mode(run.detailed, base.detail_mode),
                    max_steps: run.max_steps.unwrap_or(base.max_steps),
                };
                execute(&adapter, &input, run.out.as_deref())
            })
        }
        Command::Permutations {
            length,
            candidates,
            run,
        } => {
            let adapter = PermutationsAdapter;
            load_input(&adapter, run.input.as_deref()).and_then(|base| {
                let input = PermutationInput {
                    length: length.unwrap_or(base.length),
                    candidates: candidates.unwrap_or(base.candidates),
                    stop_after_first: base.stop_after_first && !run.all,
                    detail_mode: pick_mode(run.detailed, base.detail_mode),
                    max_steps: run.max_steps.unwrap_or(base.max_steps),
                };
                execute(&adapter, &input, run.out.as_deref())
            })
        }
        Command::Verify { dir } => verify(&dir),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            log::error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn pick_mode(detailed: bool, base: DetailMode) -> DetailMode {
    if detailed {
        DetailMode::Detailed
    } else {
        base
    }
}

fn load_input<A: ProblemAdapter>(adapter: &A, path: Option<&Path>) -> Result<A::Input, String> {
    let Some(path) = path else {
        return Ok(adapter.default_input());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    adapter
        .parse_input_text(&text)
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn execute<A: ProblemAdapter>(adapter: &A, input: &A::Input, out: Option<&Path>) -> Result<(), String> {
    log::debug!("{} input:\n{}", adapter.id(), adapter.serialize_input(input));
    let (result, bundle) = run_adapter(adapter, input).map_err(|e| e.to_string())?;
    print_result(adapter, &result);

    if let Some(dir) = out {
        write_bundle_dir(&bundle, dir).map_err(|e| e.to_string())?;
        log::info!("wrote bundle {} to {}", bundle.digest, dir.display());
    }
    Ok(())
}

fn print_result<A: ProblemAdapter>(adapter: &A, result: &RunResult) {
    let summary = adapter.summary(&result.final_snapshot);
    println!("{}", adapter.title());
    println!(
        "steps={} depth={} solutions={} visited={} pruned={} stopped_by={}",
        result.steps.len(),
        summary.depth,
        summary.solutions,
        summary.visited,
        summary.pruned,
        summary.stopped_by
    );
    for solution in result.solutions() {
        let cols: Vec<String> = solution.iter().map(ToString::to_string).collect();
        println!("  [{}]", cols.join(", "));
    }
    if let Some(message) = &result.final_snapshot.message {
        println!("{message}");
    }
}

fn verify(dir: &Path) -> Result<(), String> {
    let bundle = verify_bundle_dir(dir).map_err(|e| e.to_string())?;
    println!("ok {} ({} artifacts)", bundle.digest, bundle.artifacts.len());
    Ok(())
}
