use tracing::{debug, instrument, trace};

use crate::{
    penalty::{
        evaluation_statistics::EvaluationStatistics,
        evaluator::EvaluatePenalty,
        full_scan::{full_scan, recompute_penalty},
        penalty_outcome::{AcceptanceBound, Penalty, PenaltyOutcome},
        penalty_params::PenaltyParams,
        route_cache::RouteCache,
        route_scanner::{RouteScanner, ScanResult},
        touched_routes::discover_touched_routes,
    },
    problem::{route_idx::RouteIdx, routing_instance::RoutingInstance, travel_cost_matrix::Cost},
    tour::{move_log::MoveLog, tour_oracle::TourOracle},
};

/// Evaluator rescanning only the routes touched since the last commit.
///
/// The cache is allocated on the first call, which falls back to a full scan.
/// So do calls with an empty move log and the first call after
/// [`EvaluatePenalty::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct IncrementalPenalty {
    cache: Option<RouteCache>,
    confirmed: Option<Penalty>,
    scan_start: RouteIdx,
    verify_commits: bool,
    statistics: EvaluationStatistics,
}

impl IncrementalPenalty {
    pub fn new(params: &PenaltyParams) -> Self {
        IncrementalPenalty {
            verify_commits: params.debug_options.verify_commits,
            ..IncrementalPenalty::default()
        }
    }

    pub fn cache(&self) -> Option<&RouteCache> {
        self.cache.as_ref()
    }

    fn evaluate_touched<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        log: &MoveLog,
        gain: Cost,
        confirmed: Penalty,
    ) -> PenaltyOutcome {
        let cache = self
            .cache
            .get_or_insert_with(|| RouteCache::new(instance));
        self.statistics.incremental_evaluations += 1;

        let prior_sum = discover_touched_routes(cache, instance, log);
        let bound = AcceptanceBound::new(prior_sum, gain);
        let mut scanner = RouteScanner::new(instance, tour);

        let mut new_sum = 0;
        for index in (0..cache.touched().len()).rev() {
            let route = cache.touched()[index];
            let Some(anchor) = cache.route(route).anchor() else {
                panic!("touched route {route} has no anchor, the penalty cache is out of sync");
            };
            let prefix = *cache.label(anchor).prefix();

            self.statistics.routes_rescanned += 1;
            match scanner.scan(anchor, prefix, new_sum, &bound) {
                ScanResult::Pruned => {
                    trace!(route = route.get(), prior_sum, processed = new_sum, "pruned");
                    self.statistics.stops_scanned += scanner.stops_scanned();
                    self.statistics.pruned += 1;
                    return PenaltyOutcome::Rejected;
                }
                ScanResult::Completed { penalty } => {
                    cache.set_candidate(route, penalty);
                    new_sum += penalty;
                }
            }
        }
        self.statistics.stops_scanned += scanner.stops_scanned();

        if !bound.is_improvement(new_sum) {
            return PenaltyOutcome::Rejected;
        }

        for index in 0..cache.touched().len() {
            let route = cache.touched()[index];
            let recomputed = cache.commit_route(&scanner, route);
            if self.verify_commits || cfg!(debug_assertions) {
                assert_eq!(
                    recomputed,
                    cache.route(route).confirmed(),
                    "route {route} penalty differs from its committed candidate"
                );
            }
        }

        let total = confirmed - prior_sum + new_sum;
        trace!(prior_sum, new_sum, total, "committed");
        self.commit_total(instance, tour, total)
    }

    #[instrument(skip_all, level = "debug")]
    fn evaluate_full<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        gain: Cost,
    ) -> PenaltyOutcome {
        let cache = self
            .cache
            .get_or_insert_with(|| RouteCache::new(instance));
        self.statistics.full_scans += 1;

        let bound = match self.confirmed {
            Some(confirmed) => AcceptanceBound::new(confirmed, gain),
            None => AcceptanceBound::unbounded(gain),
        };
        let mut scanner = RouteScanner::new(instance, tour);
        let mut completed = 0;
        let total = full_scan(&mut scanner, &mut self.scan_start, &bound, |route, penalty| {
            cache.set_candidate(route, penalty);
            completed += 1;
        });
        self.statistics.stops_scanned += scanner.stops_scanned();
        // The aborting route counts as rescanned
        self.statistics.routes_rescanned += completed + usize::from(total.is_none());

        let Some(total) = total else {
            self.statistics.pruned += 1;
            return PenaltyOutcome::Rejected;
        };

        let recomputed = cache.commit_all(&scanner);
        debug_assert_eq!(recomputed, total);
        debug!(previous = ?self.confirmed, total, "full scan committed");

        self.commit_total(instance, tour, total)
    }

    fn commit_total<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        total: Penalty,
    ) -> PenaltyOutcome {
        if let Some(cache) = &self.cache {
            debug_assert_eq!(cache.confirmed_sum(), total);
        }

        if self.verify_commits {
            let expected = recompute_penalty(instance, tour);
            assert_eq!(
                total, expected,
                "committed penalty {total} differs from a full recomputation ({expected})"
            );
        }

        self.confirmed = Some(total);
        PenaltyOutcome::Committed(total)
    }
}

impl EvaluatePenalty for IncrementalPenalty {
    fn evaluate<T: TourOracle>(
        &mut self,
        instance: &RoutingInstance,
        tour: &T,
        log: &MoveLog,
        gain: Cost,
    ) -> PenaltyOutcome {
        let outcome = match self.confirmed {
            Some(confirmed) if self.cache.is_some() && !log.is_empty() => {
                self.evaluate_touched(instance, tour, log, gain, confirmed)
            }
            _ => self.evaluate_full(instance, tour, gain),
        };

        self.statistics.record(outcome);
        outcome
    }

    fn confirmed_penalty(&self) -> Option<Penalty> {
        self.confirmed
    }

    fn invalidate(&mut self) {
        debug!("incremental penalty invalidated");
        self.confirmed = None;
    }

    fn statistics(&self) -> &EvaluationStatistics {
        &self.statistics
    }
}
