//! Bounded adaptive expansion of hidden comment subtrees.
//!
//! A thread page hides most of its replies behind disclosure controls.
//! [`ExpansionController`] repeatedly reveals them under depth, top-level
//! and total budgets until the budget is met, nothing eligible remains,
//! the run is cancelled, or a hard iteration ceiling trips.

mod controller;
mod strategy;

pub use controller::ExpansionController;
pub use strategy::Strategy;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Budgets bounding one expansion run.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionBudget {
    pub max_depth: u32,
    pub max_top_level: usize,
    pub max_total: usize,
    pub strategy: Strategy,
}

impl Default for ExpansionBudget {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_top_level: 15,
            max_total: 60,
            strategy: Strategy::default(),
        }
    }
}

/// Tunables for the reveal loop. Tests zero the settle waits.
#[derive(Debug, Clone)]
pub struct ExpansionTuning {
    /// Rough yield estimate used to cap controls per iteration; a reveal
    /// tends to surface about this many nodes but nothing guarantees it.
    pub nodes_per_reveal: usize,
    /// Wait after each reveal batch for the document to update.
    pub batch_settle: Duration,
    /// Wait after a full iteration before re-counting.
    pub iteration_settle: Duration,
    /// Hard cap on iterations, independent of cancellation.
    pub iteration_ceiling: usize,
}

impl Default for ExpansionTuning {
    fn default() -> Self {
        Self {
            nodes_per_reveal: 7,
            batch_settle: Duration::from_millis(1000),
            iteration_settle: Duration::from_millis(800),
            iteration_ceiling: 50,
        }
    }
}

impl ExpansionTuning {
    /// Tuning with no settle waits, for deterministic tests.
    pub fn immediate() -> Self {
        Self {
            batch_settle: Duration::ZERO,
            iteration_settle: Duration::ZERO,
            ..Default::default()
        }
    }
}

/// Why an expansion run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Total node count reached the budget.
    BudgetReached,
    /// No admitted controls remained; everything reachable was revealed.
    Exhausted,
    /// The cooperative cancel flag was observed.
    Cancelled,
    /// The iteration ceiling tripped; soft failure, result still usable.
    IterationCeiling,
}

/// Final report of an expansion run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcome: RunOutcome,
    pub initial_total: usize,
    pub final_total: usize,
    pub final_top_level: usize,
    pub iterations: usize,
    pub reveals: usize,
}

impl RunResult {
    pub fn revealed(&self) -> usize {
        self.final_total.saturating_sub(self.initial_total)
    }
}

/// Shared, lock-free view of a running expansion, for progress queries.
#[derive(Debug, Default)]
pub struct RunProgress {
    target: AtomicUsize,
    observed: AtomicUsize,
}

impl RunProgress {
    pub fn begin(&self, target: usize, observed: usize) {
        self.target.store(target.max(1), Ordering::Relaxed);
        self.observed.store(observed, Ordering::Relaxed);
    }

    pub fn observe(&self, total: usize) {
        self.observed.store(total, Ordering::Relaxed);
    }

    /// Fraction of the total budget observed so far, clamped to [0, 1].
    pub fn fraction(&self) -> f32 {
        let target = self.target.load(Ordering::Relaxed);
        if target == 0 {
            return 0.0;
        }
        let observed = self.observed.load(Ordering::Relaxed) as f32;
        (observed / target as f32).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction_clamps() {
        let progress = RunProgress::default();
        assert_eq!(progress.fraction(), 0.0);

        progress.begin(10, 5);
        assert!((progress.fraction() - 0.5).abs() < f32::EPSILON);

        // Overshoot is possible; the fraction still tops out at 1.
        progress.observe(17);
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn test_run_result_revealed_saturates() {
        let result = RunResult {
            outcome: RunOutcome::BudgetReached,
            initial_total: 10,
            final_total: 8,
            final_top_level: 3,
            iterations: 1,
            reveals: 0,
        };
        assert_eq!(result.revealed(), 0);
    }
}
