use serde::Serialize;

use crate::problem::travel_cost_matrix::Cost;

pub type Penalty = i64;

/// Result of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PenaltyOutcome {
    /// The tour improved on the confirmed penalty; the cache now reflects it.
    Committed(Penalty),
    /// The tour does not improve; nothing outside per-call scratch changed.
    Rejected,
}

impl PenaltyOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, PenaltyOutcome::Committed(_))
    }

    pub fn committed_penalty(&self) -> Option<Penalty> {
        match self {
            PenaltyOutcome::Committed(penalty) => Some(*penalty),
            PenaltyOutcome::Rejected => None,
        }
    }

    /// Numeric form for drivers comparing penalties directly: the new total on
    /// commit, otherwise the confirmed penalty, plus one when the gain was
    /// positive so that the move never looks like an improvement.
    pub fn penalty_value(&self, confirmed: Penalty, gain: Cost) -> Penalty {
        match self {
            PenaltyOutcome::Committed(penalty) => *penalty,
            PenaltyOutcome::Rejected => confirmed + Penalty::from(gain > 0),
        }
    }
}

/// Acceptance rule shared by pruning and commit.
///
/// A total improves when it is strictly below the bound, or equal to it while
/// the move's gain is positive. Without a bound every total improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceBound {
    bound: Option<Penalty>,
    gain: Cost,
}

impl AcceptanceBound {
    pub fn new(bound: Penalty, gain: Cost) -> Self {
        AcceptanceBound {
            bound: Some(bound),
            gain,
        }
    }

    pub fn unbounded(gain: Cost) -> Self {
        AcceptanceBound { bound: None, gain }
    }

    #[inline(always)]
    pub fn is_improvement(&self, total: Penalty) -> bool {
        match self.bound {
            None => true,
            Some(bound) => total < bound || (total == bound && self.gain > 0),
        }
    }

    /// Penalties never decrease along a scan, so a pruned partial sum can only
    /// end in a pruned total.
    #[inline(always)]
    pub fn is_pruned(&self, partial: Penalty) -> bool {
        !self.is_improvement(partial)
    }
}
