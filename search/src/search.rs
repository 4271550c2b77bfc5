//! Search entry point and the depth-first backtracking loop.

use std::panic::{catch_unwind, AssertUnwindSafe};

use stepviz_kernel::proof::canon::{canonical_json_bytes, CanonError};
use stepviz_kernel::trace::{TracePhase, TraceStep};

use crate::contract::BacktrackWorld;
use crate::emitter::{StepEmitter, StepEvent};
use crate::error::{panic_detail, PredicateKind, SearchError};
use crate::policy::{EventKind, RuntimeOptions};
use crate::snapshot::{Snapshot, StopReason};
use crate::state::SearchState;

/// Result of a backtracking run.
///
/// Always complete: budget exhaustion and first-solution stops are recorded
/// in `final_snapshot.stopped_by`, not reported as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub steps: Vec<TraceStep<Snapshot>>,
    pub final_snapshot: Snapshot,
}

impl RunResult {
    #[must_use]
    pub fn solutions(&self) -> &[Vec<i64>] {
        &self.final_snapshot.solutions
    }

    #[must_use]
    pub fn stopped_by(&self) -> StopReason {
        self.final_snapshot.stopped_by
    }

    /// Step by id.
    #[must_use]
    pub fn step(&self, id: u64) -> Option<&TraceStep<Snapshot>> {
        self.steps.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn steps_in_phase(&self, phase: TracePhase) -> usize {
        self.steps.iter().filter(|s| s.phase == phase).count()
    }

    /// Convert to a `serde_json::Value` for canonical serialization.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let steps: Vec<serde_json::Value> = self
            .steps
            .iter()
            .map(|s| s.to_json_value(Snapshot::to_json_value))
            .collect();
        serde_json::json!({
            "final_snapshot": self.final_snapshot.to_json_value(),
            "steps": steps,
        })
    }

    /// Canonical JSON bytes of the whole result.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if an annotation holds a non-integer number.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Canonical JSON bytes of each step, in order. Input to a step chain.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if an annotation holds a non-integer number.
    pub fn canonical_step_bytes(&self) -> Result<Vec<Vec<u8>>, CanonError> {
        self.steps
            .iter()
            .map(|s| canonical_json_bytes(&s.to_json_value(Snapshot::to_json_value)))
            .collect()
    }
}

/// Run depth-first backtracking over `world`.
///
/// # Errors
///
/// - [`SearchError::InvalidOptions`] / [`SearchError::InvalidConfig`] before
///   any step is taken.
/// - [`SearchError::MalformedCandidates`], [`SearchError::MalformedPredicate`],
///   [`SearchError::MalformedEnhancer`] when a callable fails or panics. The
///   run is abandoned.
pub fn run(world: &dyn BacktrackWorld, options: &RuntimeOptions) -> Result<RunResult, SearchError> {
    options.validate()?;
    if world.length() == 0 {
        return Err(SearchError::InvalidConfig {
            detail: "length must be at least 1".into(),
        });
    }

    log::debug!(
        "backtracking run: world={} length={} mode={} max_steps={} stop_after_first={}",
        world.world_id(),
        world.length(),
        options.detail_mode.as_str(),
        options.max_steps,
        options.stop_after_first
    );

    let mut state = SearchState::new();
    let mut emitter = StepEmitter::new(world, options);
    let mut search = Dfs {
        world,
        options,
        state: &mut state,
        emitter: &mut emitter,
    };
    search.visit(0)?;

    let depth = state.partial.len();
    let candidates = resolve_candidates(world, &state.partial, depth)?;
    let message = match state.stopped_by() {
        StopReason::FirstSolution => "Stopped after the first solution.".to_string(),
        StopReason::MaxSteps => format!("Stopped after reaching max_steps ({}).", options.max_steps),
        StopReason::None => "Search complete.".to_string(),
    };
    let base = state.snapshot(depth, None, &candidates, options.detail_mode, Some(message));
    let final_snapshot = emitter.enhance(base)?;

    if state.stopped_by() != StopReason::MaxSteps {
        emitter.finish(&mut state, final_snapshot.clone());
    }

    log::debug!(
        "backtracking run finished: stopped_by={} solutions={} steps_emitted={} visited={} pruned={}",
        state.stopped_by(),
        state.solutions.len(),
        state.steps_emitted,
        state.visited_nodes,
        state.pruned
    );

    Ok(RunResult {
        steps: emitter.into_steps(),
        final_snapshot,
    })
}

struct Dfs<'a, 'w> {
    world: &'w dyn BacktrackWorld,
    options: &'w RuntimeOptions,
    state: &'a mut SearchState,
    emitter: &'a mut StepEmitter<'w>,
}

impl Dfs<'_, '_> {
    fn emit(
        &mut self,
        kind: EventKind,
        depth: usize,
        choice: Option<i64>,
        candidates: &[i64],
    ) -> Result<(), SearchError> {
        self.emitter.emit(
            self.state,
            StepEvent {
                kind,
                depth,
                choice,
                candidates,
            },
        )
    }

    fn visit(&mut self, depth: usize) -> Result<(), SearchError> {
        if self.state.is_halted() {
            return Ok(());
        }
        debug_assert_eq!(self.state.partial.len(), depth);

        self.state.visited_nodes += 1;
        let candidates = resolve_candidates(self.world, &self.state.partial, depth)?;
        self.emit(EventKind::Enter, depth, None, &candidates)?;

        if self.goal_reached(depth)? {
            self.state.solutions.push(self.state.partial.clone());
            self.emit(EventKind::Solution, depth, None, &[])?;
            if self.options.stop_after_first {
                self.state.halt_after_solution();
            }
            return Ok(());
        }

        if depth >= self.world.length() {
            return Ok(());
        }

        for &choice in &candidates {
            if self.state.is_halted() {
                return Ok(());
            }
            self.emit(EventKind::Choose, depth, Some(choice), &candidates)?;

            if !self.is_valid(depth, choice)? {
                self.state.pruned += 1;
                self.emit(EventKind::Prune, depth, Some(choice), &candidates)?;
                continue;
            }

            self.state.partial.push(choice);
            let outcome = self.visit(depth + 1);
            self.state.partial.pop();
            outcome?;

            self.emit(EventKind::Backtrack, depth, Some(choice), &candidates)?;
        }
        Ok(())
    }

    fn goal_reached(&self, depth: usize) -> Result<bool, SearchError> {
        let world = self.world;
        let partial = &self.state.partial;
        match catch_unwind(AssertUnwindSafe(|| world.is_goal(partial, depth))) {
            Ok(Ok(goal)) => Ok(goal),
            Ok(Err(fault)) => Err(SearchError::MalformedPredicate {
                predicate: PredicateKind::Goal,
                depth,
                detail: fault.detail,
            }),
            Err(payload) => Err(SearchError::MalformedPredicate {
                predicate: PredicateKind::Goal,
                depth,
                detail: panic_detail(&*payload),
            }),
        }
    }

    fn is_valid(&self, depth: usize, choice: i64) -> Result<bool, SearchError> {
        let world = self.world;
        let partial = &self.state.partial;
        match catch_unwind(AssertUnwindSafe(|| world.is_valid(partial, depth, choice))) {
            Ok(Ok(valid)) => Ok(valid),
            Ok(Err(fault)) => Err(SearchError::MalformedPredicate {
                predicate: PredicateKind::Validity,
                depth,
                detail: fault.detail,
            }),
            Err(payload) => Err(SearchError::MalformedPredicate {
                predicate: PredicateKind::Validity,
                depth,
                detail: panic_detail(&*payload),
            }),
        }
    }
}

fn resolve_candidates(
    world: &dyn BacktrackWorld,
    partial: &[i64],
    depth: usize,
) -> Result<Vec<i64>, SearchError> {
    match catch_unwind(AssertUnwindSafe(|| world.candidates(partial, depth))) {
        Ok(Ok(candidates)) => Ok(candidates),
        Ok(Err(fault)) => Err(SearchError::MalformedCandidates {
            depth,
            detail: fault.detail,
        }),
        Err(payload) => Err(SearchError::MalformedCandidates {
            depth,
            detail: panic_detail(&*payload),
        }),
    }
}
