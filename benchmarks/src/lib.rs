//! Shared cases for stepviz benchmark suites.
//!
//! A [`BenchCase`] pairs a world with the runtime options it is timed under.
//! Budgets are large enough that every case runs to its natural end, so the
//! numbers measure the engine rather than the step cap.

use stepviz_harness::worlds::n_queens::NQueensWorld;
use stepviz_harness::worlds::permutations::permutation_config;
use stepviz_search::{run, BacktrackWorld, DetailMode, RunResult, RuntimeOptions};

/// A named world plus the options it is benchmarked with.
pub struct BenchCase {
    pub name: &'static str,
    pub world: Box<dyn BacktrackWorld>,
    pub options: RuntimeOptions,
}

const UNBOUNDED: u64 = 10_000_000;

fn exhaustive(detail_mode: DetailMode) -> RuntimeOptions {
    RuntimeOptions {
        stop_after_first: false,
        detail_mode,
        max_steps: UNBOUNDED,
    }
}

/// The standard case set: first-solution and exhaustive searches in both
/// detail modes.
#[must_use]
pub fn bench_cases() -> Vec<BenchCase> {
    vec![
        BenchCase {
            name: "queens8_first",
            world: Box::new(NQueensWorld::new(8)),
            options: RuntimeOptions {
                stop_after_first: true,
                detail_mode: DetailMode::Detailed,
                max_steps: UNBOUNDED,
            },
        },
        BenchCase {
            name: "queens6_all_summary",
            world: Box::new(NQueensWorld::new(6)),
            options: exhaustive(DetailMode::Summary),
        },
        BenchCase {
            name: "queens6_all_detailed",
            world: Box::new(NQueensWorld::new(6)),
            options: exhaustive(DetailMode::Detailed),
        },
        BenchCase {
            name: "permutations5_all",
            world: Box::new(permutation_config(5, vec![1, 2, 3, 4, 5])),
            options: exhaustive(DetailMode::Summary),
        },
    ]
}

/// Run one case.
///
/// # Panics
///
/// Panics if the run fails. Benchmark setup failures are fatal.
#[must_use]
pub fn run_case(case: &BenchCase) -> RunResult {
    run(case.world.as_ref(), &case.options)
        .unwrap_or_else(|e| panic!("bench case {} failed: {e}", case.name))
}

/// All 92 placements of the 8-queens board, in search order.
///
/// # Panics
///
/// Panics if the run fails.
#[must_use]
pub fn eight_queens_solutions() -> Vec<Vec<i64>> {
    let result = run(&NQueensWorld::new(8), &exhaustive(DetailMode::Summary))
        .unwrap_or_else(|e| panic!("8-queens run failed: {e}"));
    result.final_snapshot.solutions
}
