use serde::Serialize;

use super::penalty_outcome::PenaltyOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationStatistics {
    pub evaluations: usize,
    pub incremental_evaluations: usize,
    pub full_scans: usize,
    pub commits: usize,
    pub rejections: usize,
    /// Evaluations aborted by a partial sum.
    pub pruned: usize,
    pub routes_rescanned: usize,
    pub stops_scanned: usize,
}

impl EvaluationStatistics {
    pub fn record(&mut self, outcome: PenaltyOutcome) {
        self.evaluations += 1;
        match outcome {
            PenaltyOutcome::Committed(_) => self.commits += 1,
            PenaltyOutcome::Rejected => self.rejections += 1,
        }
    }

    pub fn merge(&mut self, other: &EvaluationStatistics) {
        self.evaluations += other.evaluations;
        self.incremental_evaluations += other.incremental_evaluations;
        self.full_scans += other.full_scans;
        self.commits += other.commits;
        self.rejections += other.rejections;
        self.pruned += other.pruned;
        self.routes_rescanned += other.routes_rescanned;
        self.stops_scanned += other.stops_scanned;
    }

    pub fn stops_per_evaluation(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.stops_scanned as f64 / self.evaluations as f64
        }
    }
}
