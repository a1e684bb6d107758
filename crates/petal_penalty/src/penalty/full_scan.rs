use tracing::{debug, instrument, trace};

use crate::{
    penalty::{
        evaluation_statistics::EvaluationStatistics,
        evaluator::EvaluatePenalty,
        penalty_outcome::{AcceptanceBound, Penalty, PenaltyOutcome},
        penalty_params::PenaltyParams,
        route_scanner::{RouteScanner, RunningSums, ScanResult},
    },
    problem::{route_idx::RouteIdx, routing_instance::RoutingInstance, travel_cost_matrix::Cost},
    tour::{move_log::MoveLog, tour_oracle::TourOracle},
};

/// Scans every route from its opening marker, starting at `scan_start` and
/// wrapping around, and reports each finished route to `on_route`.
///
/// Returns the total, or `None` when a partial sum is pruned by `bound`. The
/// aborting route then becomes the next scan start.
pub fn full_scan<T, F>(
    scanner: &mut RouteScanner<'_, T>,
    scan_start: &mut RouteIdx,
    bound: &AcceptanceBound,
    mut on_route: F,
) -> Option<Penalty>
where
    T: TourOracle,
    F: FnMut(RouteIdx, Penalty),
{
    let instance = scanner.instance();
    let vehicles = instance.vehicles();
    let start = scan_start.get() % vehicles;

    let mut total = 0;
    for offset in 0..vehicles {
        let route = RouteIdx::new((start + offset) % vehicles);
        let marker = instance.depot_marker(route);

        match scanner.scan(marker, RunningSums::default(), total, bound) {
            ScanResult::Pruned => {
                trace!(route = route.get(), processed = total, "full scan pruned");
                *scan_start = route;
                return None;
            }
            ScanResult::Completed { penalty } => {
                on_route(route, penalty);
                total += penalty;
            }
        }
    }

    Some(total)
}

/// Penalty of every route, computed from scratch.
pub fn route_penalties<T: TourOracle>(instance: &RoutingInstance, tour: &T) -> Vec<Penalty> {
    let scanner = RouteScanner::new(instance, tour);
    instance
        .routes()
        .map(|route| scanner.walk(instance.depot_marker(route), |_, _, _| {}))
        .collect()
}

/// Total penalty of the tour, computed from scratch.
pub fn recompute_penalty<T: TourOracle>(instance: &RoutingInstance, tour: &T) -> Penalty {
    route_penalties(instance, tour).into_iter().sum()
}

/// Evaluator without cache: every call rescans the whole tour.
#[derive(Debug, Clone, Default)]
pub struct FullScanPenalty {
    confirmed: Option<Penalty>,
    scan_start: RouteIdx,
    statistics: EvaluationStatistics,
}

impl FullScanPenalty {
    pub fn new(_params: &PenaltyParams) -> Self {
        FullScanPenalty::default()
    }
}

impl EvaluatePenalty for FullScanPenalty {
    #[instrument(skip_all, level = "debug")]
    fn evaluate<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        _log: &MoveLog,
        gain: Cost,
    ) -> PenaltyOutcome {
        let bound = match self.confirmed {
            Some(confirmed) => AcceptanceBound::new(confirmed, gain),
            None => AcceptanceBound::unbounded(gain),
        };

        let mut scanner = RouteScanner::new(instance, tour);
        let mut completed = 0;
        let total = full_scan(&mut scanner, &mut self.scan_start, &bound, |_, _| completed += 1);

        self.statistics.full_scans += 1;
        self.statistics.stops_scanned += scanner.stops_scanned();
        self.statistics.routes_rescanned += completed + usize::from(total.is_none());

        let outcome = match total {
            Some(total) => {
                debug!(previous = ?self.confirmed, total, "full scan committed");
                self.confirmed = Some(total);
                PenaltyOutcome::Committed(total)
            }
            None => {
                self.statistics.pruned += 1;
                PenaltyOutcome::Rejected
            }
        };

        self.statistics.record(outcome);
        outcome
    }

    fn confirmed_penalty(&self) -> Option<Penalty> {
        self.confirmed
    }

    fn invalidate(&mut self) {
        debug!("full scan penalty invalidated");
        self.confirmed = None;
    }

    fn statistics(&self) -> &EvaluationStatistics {
        &self.statistics
    }
}
