use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::Result;
use crate::expansion::{ExpansionBudget, ExpansionTuning, RunOutcome, RunProgress, RunResult};
use crate::probe::DocumentProbe;

/// Drives reveal cycles against the live document until a budget boundary.
///
/// Revealing one subtree can surface further nested controls, so the loop
/// re-counts and re-enumerates every iteration instead of planning ahead.
/// Reveals are strictly additive; overshooting the total budget slightly is
/// reported, never corrected.
pub struct ExpansionController {
    probe: Arc<dyn DocumentProbe>,
    tuning: ExpansionTuning,
    cancel: Arc<AtomicBool>,
    progress: Arc<RunProgress>,
}

impl ExpansionController {
    pub fn new(probe: Arc<dyn DocumentProbe>) -> Self {
        Self {
            probe,
            tuning: ExpansionTuning::default(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(RunProgress::default()),
        }
    }

    pub fn with_tuning(mut self, tuning: ExpansionTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Share a cancel flag with the caller; setting it stops the run at the
    /// next iteration or batch boundary.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: Arc<RunProgress>) -> Self {
        self.progress = progress;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Run the reveal loop to completion.
    ///
    /// Returns immediately with zero reveals when the document already
    /// meets the total budget.
    pub async fn expand(&self, budget: &ExpansionBudget) -> Result<RunResult> {
        let initial = self.probe.counts().await?;
        self.progress.begin(budget.max_total, initial.total);

        let mut iterations = 0usize;
        let mut reveals = 0usize;

        let outcome = loop {
            if self.cancelled() {
                break RunOutcome::Cancelled;
            }

            let counts = self.probe.counts().await?;
            self.progress.observe(counts.total);

            if counts.total >= budget.max_total {
                break RunOutcome::BudgetReached;
            }
            if iterations >= self.tuning.iteration_ceiling {
                warn!(
                    iterations,
                    total = counts.total,
                    "Expansion hit the iteration ceiling; using what was revealed"
                );
                break RunOutcome::IterationCeiling;
            }

            let controls = self.probe.disclosure_controls().await?;
            let top_cap_hit = counts.top_level >= budget.strategy.top_level_cap(budget);
            let mut admitted: Vec<_> = controls
                .into_iter()
                .filter(|c| budget.strategy.admits(c, budget, top_cap_hit))
                .collect();

            // Reaching the top-level cap is not the same as being done:
            // deeper controls may still be eligible. Only an empty admitted
            // set means there is nothing left to do.
            if admitted.is_empty() {
                break RunOutcome::Exhausted;
            }

            budget.strategy.order(&mut admitted);

            let remaining = budget.max_total - counts.total;
            let cap = (remaining / self.tuning.nodes_per_reveal).max(1);
            admitted.truncate(cap);

            iterations += 1;
            debug!(
                iteration = iterations,
                admitted = admitted.len(),
                total = counts.total,
                top_level = counts.top_level,
                "Expansion iteration"
            );

            let mut stop = None;
            for batch in admitted.chunks(budget.strategy.batch_size()) {
                if self.cancelled() {
                    stop = Some(RunOutcome::Cancelled);
                    break;
                }

                self.probe.reveal(batch).await?;
                reveals += batch.len();

                tokio::time::sleep(self.tuning.batch_settle).await;

                let counts = self.probe.counts().await?;
                self.progress.observe(counts.total);
                if counts.total >= budget.max_total {
                    // Abort the remaining batches; the loop top reports it.
                    break;
                }
            }
            if let Some(outcome) = stop {
                break outcome;
            }

            tokio::time::sleep(self.tuning.iteration_settle).await;
        };

        let final_counts = self.probe.counts().await?;
        self.progress.observe(final_counts.total);

        info!(
            ?outcome,
            initial = initial.total,
            total = final_counts.total,
            top_level = final_counts.top_level,
            iterations,
            reveals,
            "Expansion finished"
        );

        Ok(RunResult {
            outcome,
            initial_total: initial.total,
            final_total: final_counts.total,
            final_top_level: final_counts.top_level,
            iterations,
            reveals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::Strategy;
    use crate::probe::fake::{FakeControl, FakeNode, FakeProbe};

    fn budget(strategy: Strategy, max_depth: u32, max_top_level: usize, max_total: usize) -> ExpansionBudget {
        ExpansionBudget {
            max_depth,
            max_top_level,
            max_total,
            strategy,
        }
    }

    fn controller(probe: Arc<FakeProbe>) -> ExpansionController {
        ExpansionController::new(probe).with_tuning(ExpansionTuning::immediate())
    }

    #[tokio::test]
    async fn test_already_satisfied_budget_performs_zero_reveals() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0), FakeNode::at_depth(0)])
                .with_controls(vec![FakeControl::yielding(0, 5)]),
        );

        let result = controller(probe.clone())
            .expand(&budget(Strategy::Balanced, 4, 10, 2))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::BudgetReached);
        assert_eq!(result.reveals, 0);
        assert_eq!(result.iterations, 0);
        assert_eq!(probe.reveal_count(), 0);
    }

    #[tokio::test]
    async fn test_reveals_until_no_controls_remain() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![
                    FakeControl::yielding(0, 2),
                    FakeControl::yielding(1, 3),
                ]),
        );

        let result = controller(probe.clone())
            .expand(&budget(Strategy::Balanced, 4, 10, 100))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::Exhausted);
        assert_eq!(result.final_total, 6);
        assert!(result.final_total >= result.initial_total);
        assert!(probe.reveal_count() >= 1);
    }

    #[tokio::test]
    async fn test_follow_up_controls_are_chased() {
        // Revealing the first control surfaces another one level down.
        let chain = FakeControl::yielding(0, 2).then(FakeControl::yielding(1, 2));
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![chain]),
        );

        let result = controller(probe)
            .expand(&budget(Strategy::Balanced, 4, 10, 100))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::Exhausted);
        assert_eq!(result.final_total, 5);
        assert!(result.iterations >= 2);
    }

    #[tokio::test]
    async fn test_breadth_never_reveals_below_its_ceiling() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![
                    FakeControl::yielding(1, 2),
                    FakeControl::yielding(3, 50),
                ]),
        );

        let result = controller(probe.clone())
            .expand(&budget(Strategy::Breadth, 10, 10, 100))
            .await
            .unwrap();

        // The depth-3 control was never admitted, so its 50 nodes stayed
        // hidden and one control is still unconsumed.
        assert_eq!(result.outcome, RunOutcome::Exhausted);
        assert_eq!(result.final_total, 3);
        assert_eq!(probe.disclosure_controls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_depth_strategy_respects_max_depth() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![
                    FakeControl::yielding(2, 2),
                    FakeControl::yielding(3, 40),
                ]),
        );

        let result = controller(probe)
            .expand(&budget(Strategy::Depth, 3, 10, 100))
            .await
            .unwrap();

        // effective depth 3 is not < max_depth 3.
        assert_eq!(result.outcome, RunOutcome::Exhausted);
        assert_eq!(result.final_total, 3);
    }

    #[tokio::test]
    async fn test_top_level_cap_leaves_deeper_controls_eligible() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0), FakeNode::at_depth(0)])
                .with_controls(vec![
                    FakeControl::yielding(0, 5),
                    FakeControl::yielding(2, 3),
                ]),
        );

        // Top-level cap of 2 is already hit, but the depth-2 control must
        // still be revealed before the run reports exhaustion.
        let result = controller(probe.clone())
            .expand(&budget(Strategy::Balanced, 4, 2, 100))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::Exhausted);
        assert_eq!(result.final_total, 5);
        assert_eq!(probe.disclosure_controls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancellation_before_start() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![FakeControl::yielding(0, 5)]),
        );
        let cancel = Arc::new(AtomicBool::new(true));

        let result = controller(probe.clone())
            .with_cancel_flag(cancel)
            .expand(&budget(Strategy::Balanced, 4, 10, 100))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::Cancelled);
        assert_eq!(result.reveals, 0);
        assert_eq!(probe.reveal_count(), 0);
    }

    #[tokio::test]
    async fn test_iteration_ceiling_is_a_soft_stop() {
        // A control that perpetually re-arms itself never converges.
        fn everlasting() -> FakeControl {
            FakeControl {
                effective_depth: 1,
                yields: vec![FakeNode::at_depth(1)],
                follow_up: vec![FakeControl {
                    effective_depth: 1,
                    yields: vec![FakeNode::at_depth(1)],
                    follow_up: Vec::new(),
                }],
            }
        }
        // Two levels of self-replenishment per reveal keeps a control
        // visible long enough to out-last a tiny ceiling.
        let mut root = everlasting();
        root.follow_up = vec![everlasting(), everlasting()];

        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![root, everlasting(), everlasting()]),
        );

        let mut tuning = ExpansionTuning::immediate();
        tuning.iteration_ceiling = 2;

        let result = ExpansionController::new(probe)
            .with_tuning(tuning)
            .expand(&budget(Strategy::Balanced, 4, 10, 1000))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::IterationCeiling);
        assert_eq!(result.iterations, 2);
        assert!(result.final_total > result.initial_total);
    }

    #[tokio::test]
    async fn test_remaining_budget_caps_controls_per_iteration() {
        let probe = Arc::new(
            FakeProbe::new().with_controls(vec![
                FakeControl::yielding(1, 5),
                FakeControl::yielding(1, 5),
                FakeControl::yielding(1, 5),
            ]),
        );

        // remaining = 8 admits floor(8/7) = 1 control in the first
        // iteration; the second iteration crosses the budget.
        let result = controller(probe)
            .expand(&budget(Strategy::Balanced, 4, 10, 8))
            .await
            .unwrap();

        assert_eq!(result.outcome, RunOutcome::BudgetReached);
        assert!(result.final_total >= 8);
        assert!(result.reveals <= 2);
    }

    #[tokio::test]
    async fn test_growth_is_monotonic() {
        let probe = Arc::new(
            FakeProbe::new()
                .with_nodes(vec![FakeNode::at_depth(0)])
                .with_controls(vec![
                    FakeControl::yielding(0, 3).then(FakeControl::yielding(1, 4)),
                    FakeControl::yielding(1, 2),
                ]),
        );

        let result = controller(probe)
            .expand(&budget(Strategy::Breadth, 4, 10, 100))
            .await
            .unwrap();

        assert!(result.final_total >= result.initial_total);
        assert_eq!(result.revealed(), result.final_total - result.initial_total);
    }
}
