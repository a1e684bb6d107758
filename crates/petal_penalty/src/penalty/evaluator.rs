use crate::{
    penalty::{
        evaluation_statistics::EvaluationStatistics,
        full_scan::FullScanPenalty,
        incremental::IncrementalPenalty,
        penalty_outcome::{Penalty, PenaltyOutcome},
        penalty_params::{PenaltyParams, PenaltyStrategy},
    },
    problem::{routing_instance::RoutingInstance, travel_cost_matrix::Cost},
    tour::{move_log::MoveLog, tour_oracle::TourOracle},
};

pub trait EvaluatePenalty {
    /// Evaluates `tour`, which the edits in `log` produced from the last
    /// committed tour. `gain` is the move's cost improvement and only breaks
    /// ties.
    fn evaluate<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        log: &MoveLog,
        gain: Cost,
    ) -> PenaltyOutcome;

    fn confirmed_penalty(&self) -> Option<Penalty>;

    /// Forgets the confirmed penalty, e.g. after the duals changed. The next
    /// evaluation rescans everything and commits unconditionally.
    fn invalidate(&mut self);

    fn statistics(&self) -> &EvaluationStatistics;
}

#[derive(Debug, Clone)]
pub enum PenaltyEvaluator {
    Incremental(IncrementalPenalty),
    FullScan(FullScanPenalty),
}

impl PenaltyEvaluator {
    pub fn new(params: &PenaltyParams) -> Self {
        match params.strategy {
            PenaltyStrategy::Incremental => {
                PenaltyEvaluator::Incremental(IncrementalPenalty::new(params))
            }
            PenaltyStrategy::FullScan => PenaltyEvaluator::FullScan(FullScanPenalty::new(params)),
        }
    }

    pub fn strategy(&self) -> PenaltyStrategy {
        match self {
            PenaltyEvaluator::Incremental(_) => PenaltyStrategy::Incremental,
            PenaltyEvaluator::FullScan(_) => PenaltyStrategy::FullScan,
        }
    }
}

impl EvaluatePenalty for PenaltyEvaluator {
    fn evaluate<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        log: &MoveLog,
        gain: Cost,
    ) -> PenaltyOutcome {
        match self {
            PenaltyEvaluator::Incremental(evaluator) => evaluator.evaluate(instance, tour, log, gain),
            PenaltyEvaluator::FullScan(evaluator) => evaluator.evaluate(instance, tour, log, gain),
        }
    }

    fn confirmed_penalty(&self) -> Option<Penalty> {
        match self {
            PenaltyEvaluator::Incremental(evaluator) => evaluator.confirmed_penalty(),
            PenaltyEvaluator::FullScan(evaluator) => evaluator.confirmed_penalty(),
        }
    }

    fn invalidate(&mut self) {
        match self {
            PenaltyEvaluator::Incremental(evaluator) => evaluator.invalidate(),
            PenaltyEvaluator::FullScan(evaluator) => evaluator.invalidate(),
        }
    }

    fn statistics(&self) -> &EvaluationStatistics {
        match self {
            PenaltyEvaluator::Incremental(evaluator) => evaluator.statistics(),
            PenaltyEvaluator::FullScan(evaluator) => evaluator.statistics(),
        }
    }
}
