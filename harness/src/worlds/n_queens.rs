//! N-Queens: one queen per row, no two sharing a column or diagonal.
//!
//! `partial[row]` is the column of the queen in `row`. The world attaches
//! `board_size` and `queen_cols` to every snapshot so a board renderer needs
//! nothing else.

use stepviz_search::symmetry::dedupe;
use stepviz_search::{
    BacktrackWorld, CallableFault, DetailMode, RunResult, RuntimeOptions, Snapshot,
};

use crate::contract::{InputError, ProblemAdapter, RunError};
use crate::input::{detail_mode, flag, parse_object, positive_int};

/// Appended to the final message when symmetric solutions were collapsed.
pub const COLLAPSED_SUFFIX: &str = " (symmetric solutions collapsed)";

/// The `n x n` queens search space.
#[derive(Debug, Clone, Copy)]
pub struct NQueensWorld {
    n: usize,
}

impl NQueensWorld {
    #[must_use]
    pub const fn new(n: usize) -> Self {
        Self { n }
    }

    #[must_use]
    pub const fn board_size(&self) -> usize {
        self.n
    }
}

impl BacktrackWorld for NQueensWorld {
    fn world_id(&self) -> &str {
        "n_queens"
    }

    fn length(&self) -> usize {
        self.n
    }

    fn candidates(&self, _partial: &[i64], _depth: usize) -> Result<Vec<i64>, CallableFault> {
        (0..self.n)
            .map(|c| i64::try_from(c).map_err(|_| CallableFault::new("board too large")))
            .collect()
    }

    fn is_valid(&self, partial: &[i64], depth: usize, choice: i64) -> Result<bool, CallableFault> {
        let depth = i64::try_from(depth).map_err(|_| CallableFault::new("depth overflow"))?;
        Ok(partial.iter().zip(0_i64..).all(|(&col, row)| {
            col != choice && (col - choice).abs() != (row - depth).abs()
        }))
    }

    fn is_goal(&self, _partial: &[i64], depth: usize) -> Result<bool, CallableFault> {
        Ok(depth == self.n)
    }

    fn enhance_snapshot(&self, snapshot: Snapshot) -> Snapshot {
        let cols = serde_json::json!(snapshot.partial);
        snapshot
            .annotate("board_size", serde_json::json!(self.n))
            .annotate("queen_cols", cols)
    }
}

/// Validated N-Queens input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NQueensInput {
    pub n: usize,
    /// Collapse rotations and reflections of the same placement.
    pub dedupe_symmetry: bool,
    pub stop_after_first: bool,
    pub detail_mode: DetailMode,
    pub max_steps: u64,
}

impl Default for NQueensInput {
    fn default() -> Self {
        Self {
            n: 8,
            dedupe_symmetry: false,
            stop_after_first: true,
            detail_mode: DetailMode::Summary,
            max_steps: 400,
        }
    }
}

/// Replace the solution lists with their symmetry-reduced form.
///
/// Leaves `result` untouched if nothing collapses. Otherwise both the final
/// snapshot and the last step's snapshot get the reduced list and the
/// [`COLLAPSED_SUFFIX`] message.
#[must_use]
pub fn collapse_symmetric(mut result: RunResult, n: usize) -> RunResult {
    let reduced = dedupe(&result.final_snapshot.solutions, n);
    if reduced.len() == result.final_snapshot.solutions.len() {
        return result;
    }

    let message = format!(
        "{}{COLLAPSED_SUFFIX}",
        result
            .final_snapshot
            .message
            .as_deref()
            .unwrap_or("Search complete.")
    );
    result.final_snapshot.solutions.clone_from(&reduced);
    result.final_snapshot.message = Some(message.clone());
    if let Some(last) = result.steps.last_mut() {
        last.snapshot.solutions = reduced;
        last.snapshot.message = Some(message);
    }
    result
}

/// Adapter for the N-Queens visualizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NQueensAdapter;

impl ProblemAdapter for NQueensAdapter {
    type Input = NQueensInput;

    fn id(&self) -> &'static str {
        "backtracking-n-queens"
    }

    fn title(&self) -> &'static str {
        "Backtracking N-Queens Trace"
    }

    fn description(&self) -> &'static str {
        "Step through the N-Queens backtracking search."
    }

    fn default_input(&self) -> NQueensInput {
        NQueensInput::default()
    }

    fn parse_input_text(&self, text: &str) -> Result<NQueensInput, InputError> {
        let obj = parse_object(text)?;
        let defaults = NQueensInput::default();
        let n = positive_int(&obj, "n", None)?;
        let n = usize::try_from(n).map_err(|_| InputError::InvalidField {
            field: "n",
            detail: "too large".into(),
        })?;
        Ok(NQueensInput {
            n,
            dedupe_symmetry: flag(&obj, "dedupe_symmetry", defaults.dedupe_symmetry),
            stop_after_first: flag(&obj, "stop_after_first", defaults.stop_after_first),
            detail_mode: detail_mode(&obj, "detail_mode", defaults.detail_mode),
            max_steps: positive_int(&obj, "max_steps", Some(defaults.max_steps))?,
        })
    }

    fn input_json(&self, input: &NQueensInput) -> serde_json::Value {
        serde_json::json!({
            "dedupe_symmetry": input.dedupe_symmetry,
            "detail_mode": input.detail_mode.as_str(),
            "max_steps": input.max_steps,
            "n": input.n,
            "stop_after_first": input.stop_after_first,
        })
    }

    fn runtime_options(&self, input: &NQueensInput) -> RuntimeOptions {
        RuntimeOptions {
            stop_after_first: input.stop_after_first,
            detail_mode: input.detail_mode,
            max_steps: input.max_steps,
        }
    }

    fn run(&self, input: &NQueensInput) -> Result<RunResult, RunError> {
        let world = NQueensWorld::new(input.n);
        let result = stepviz_search::run(&world, &self.runtime_options(input))?;
        if input.dedupe_symmetry {
            Ok(collapse_symmetric(result, input.n))
        } else {
            Ok(result)
        }
    }
}
