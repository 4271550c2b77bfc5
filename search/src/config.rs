//! Closure-backed search configuration.
//!
//! [`SearchConfig`] is the ad-hoc way to describe a problem: a target length,
//! a default candidate list, and a handful of closures. Named problems (see
//! the harness worlds) implement [`BacktrackWorld`] directly instead.

use crate::contract::{BacktrackWorld, CallableFault};
use crate::snapshot::Snapshot;

type CandidateGenerator = Box<dyn Fn(&[i64], usize, &[i64]) -> Result<Vec<i64>, CallableFault>>;
type ValidityFn = Box<dyn Fn(&[i64], usize, i64) -> bool>;
type GoalFn = Box<dyn Fn(&[i64], usize) -> bool>;
type EnhancerFn = Box<dyn Fn(Snapshot) -> Snapshot>;

/// Problem description built from closures.
///
/// Without a generator every depth offers `candidates`. Without a goal the
/// solution test is `depth == length`. Without an enhancer snapshots pass
/// through untouched.
pub struct SearchConfig {
    world_id: String,
    length: usize,
    candidates: Vec<i64>,
    generator: Option<CandidateGenerator>,
    is_valid: ValidityFn,
    is_goal: Option<GoalFn>,
    enhancer: Option<EnhancerFn>,
}

impl SearchConfig {
    pub fn new(
        length: usize,
        candidates: Vec<i64>,
        is_valid: impl Fn(&[i64], usize, i64) -> bool + 'static,
    ) -> Self {
        Self {
            world_id: "search_config".into(),
            length,
            candidates,
            generator: None,
            is_valid: Box::new(is_valid),
            is_goal: None,
            enhancer: None,
        }
    }

    /// Per-depth candidate generator. Receives `(partial, depth, defaults)`.
    #[must_use]
    pub fn with_generator(
        mut self,
        generator: impl Fn(&[i64], usize, &[i64]) -> Vec<i64> + 'static,
    ) -> Self {
        self.generator = Some(Box::new(move |partial, depth, defaults| {
            Ok(generator(partial, depth, defaults))
        }));
        self
    }

    /// Like [`SearchConfig::with_generator`], for generators that can refuse.
    #[must_use]
    pub fn with_checked_generator(
        mut self,
        generator: impl Fn(&[i64], usize, &[i64]) -> Result<Vec<i64>, CallableFault> + 'static,
    ) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    #[must_use]
    pub fn with_goal(mut self, is_goal: impl Fn(&[i64], usize) -> bool + 'static) -> Self {
        self.is_goal = Some(Box::new(is_goal));
        self
    }

    #[must_use]
    pub fn with_enhancer(mut self, enhancer: impl Fn(Snapshot) -> Snapshot + 'static) -> Self {
        self.enhancer = Some(Box::new(enhancer));
        self
    }

    #[must_use]
    pub fn with_world_id(mut self, world_id: impl Into<String>) -> Self {
        self.world_id = world_id.into();
        self
    }

    /// Default candidate list.
    #[must_use]
    pub fn default_candidates(&self) -> &[i64] {
        &self.candidates
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("world_id", &self.world_id)
            .field("length", &self.length)
            .field("candidates", &self.candidates)
            .field("has_generator", &self.generator.is_some())
            .field("has_goal", &self.is_goal.is_some())
            .field("has_enhancer", &self.enhancer.is_some())
            .finish_non_exhaustive()
    }
}

impl BacktrackWorld for SearchConfig {
    fn world_id(&self) -> &str {
        &self.world_id
    }

    fn length(&self) -> usize {
        self.length
    }

    fn candidates(&self, partial: &[i64], depth: usize) -> Result<Vec<i64>, CallableFault> {
        match &self.generator {
            Some(generator) => generator(partial, depth, &self.candidates),
            None => Ok(self.candidates.clone()),
        }
    }

    fn is_valid(&self, partial: &[i64], depth: usize, choice: i64) -> Result<bool, CallableFault> {
        Ok((self.is_valid)(partial, depth, choice))
    }

    fn is_goal(&self, partial: &[i64], depth: usize) -> Result<bool, CallableFault> {
        match &self.is_goal {
            Some(is_goal) => Ok(is_goal(partial, depth)),
            None => Ok(depth == self.length),
        }
    }

    fn enhance_snapshot(&self, snapshot: Snapshot) -> Snapshot {
        match &self.enhancer {
            Some(enhancer) => enhancer(snapshot),
            None => snapshot,
        }
    }
}
