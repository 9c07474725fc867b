use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::expansion::ExpansionBudget;
use crate::probe::DisclosureControl;

/// Breadth runs never chase controls deeper than this, whatever the budget.
const BREADTH_DEPTH_CEILING: u32 = 2;

/// Depth-first runs deliberately throttle how many top-level subtrees they
/// open, trading breadth for deeper chains.
const DEPTH_FIRST_TOP_LEVEL_THROTTLE: usize = 10;

/// Which hidden subtree to reveal next, and when to stop trying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Shallow controls first, never below depth 2.
    Breadth,
    /// Deep controls first, few top-level subtrees.
    Depth,
    /// Shallow-first ordering with the full configured depth range.
    #[default]
    Balanced,
}

impl Strategy {
    /// The top-level count at which depth-0 reveals stop being admitted.
    pub fn top_level_cap(self, budget: &ExpansionBudget) -> usize {
        match self {
            Strategy::Depth => DEPTH_FIRST_TOP_LEVEL_THROTTLE.min(budget.max_top_level),
            Strategy::Breadth | Strategy::Balanced => budget.max_top_level,
        }
    }

    /// Whether a control may be revealed in the current document state.
    pub fn admits(
        self,
        control: &DisclosureControl,
        budget: &ExpansionBudget,
        top_cap_hit: bool,
    ) -> bool {
        if top_cap_hit && control.effective_depth == 0 {
            return false;
        }
        match self {
            Strategy::Breadth => control.effective_depth <= BREADTH_DEPTH_CEILING.min(budget.max_depth),
            Strategy::Depth | Strategy::Balanced => control.effective_depth < budget.max_depth,
        }
    }

    /// Order admitted controls: shallow-first except for depth-first runs.
    pub fn order(self, controls: &mut [DisclosureControl]) {
        match self {
            Strategy::Depth => {
                controls.sort_by(|a, b| b.effective_depth.cmp(&a.effective_depth));
            }
            Strategy::Breadth | Strategy::Balanced => {
                controls.sort_by_key(|c| c.effective_depth);
            }
        }
    }

    /// How many controls to click before letting the document settle.
    pub fn batch_size(self) -> usize {
        match self {
            Strategy::Breadth => 3,
            Strategy::Depth | Strategy::Balanced => 2,
        }
    }
}
