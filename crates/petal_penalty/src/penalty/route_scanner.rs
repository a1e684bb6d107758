use serde::Serialize;

use crate::{
    penalty::penalty_outcome::{AcceptanceBound, Penalty},
    problem::{
        routing_instance::RoutingInstance,
        stop::{Demand, StopIdx},
        travel_cost_matrix::Time,
    },
    tour::tour_oracle::{ScanDirection, TourOracle},
};

/// Running sums of a route scan, as they stand on arrival at a stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunningSums {
    pub demand: Demand,
    pub time: Time,
    pub penalty: Penalty,
}

impl RunningSums {
    /// Loads the stop, starts its service and charges capacity and lateness.
    #[inline(always)]
    fn visit(&mut self, instance: &RoutingInstance, stop: StopIdx) {
        let stop = instance.stop(stop);

        self.demand += stop.demand();
        if self.demand > instance.capacity() {
            self.penalty += self.demand - instance.capacity();
        }

        let window = stop.time_window();
        self.time = window.service_start(self.time);
        self.penalty += window.overtime(self.time);
    }

    #[inline(always)]
    fn depart(&mut self, instance: &RoutingInstance, from: StopIdx, to: StopIdx) {
        self.time += instance.stop(from).service_duration() + instance.travel_time(from, to);
    }

    /// Charges a late return to the depot.
    #[inline(always)]
    fn close(&mut self, instance: &RoutingInstance) {
        self.penalty += instance.depot_window().overtime(self.time);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    Completed { penalty: Penalty },
    Pruned,
}

/// Walks single routes in the tour's travel direction.
pub struct RouteScanner<'a, T> {
    instance: &'a RoutingInstance,
    tour: &'a T,
    direction: ScanDirection,
    stops_scanned: usize,
}

impl<'a, T> RouteScanner<'a, T>
where
    T: TourOracle,
{
    pub fn new(instance: &'a RoutingInstance, tour: &'a T) -> Self {
        RouteScanner {
            instance,
            tour,
            direction: tour.orientation(),
            stops_scanned: 0,
        }
    }

    pub fn instance(&self) -> &'a RoutingInstance {
        self.instance
    }

    /// Stops visited by [`RouteScanner::scan`] so far.
    pub fn stops_scanned(&self) -> usize {
        self.stops_scanned
    }

    /// Scans from `start`, whose arrival sums are `sums`, to the end of its route.
    ///
    /// `processed` is the penalty of the routes already finished by the
    /// current evaluation. The scan stops as soon as `processed` plus the
    /// route's partial penalty is pruned by `bound`.
    pub fn scan(
        &mut self,
        start: StopIdx,
        mut sums: RunningSums,
        processed: Penalty,
        bound: &AcceptanceBound,
    ) -> ScanResult {
        let mut stop = start;
        loop {
            sums.visit(self.instance, stop);
            self.stops_scanned += 1;

            if bound.is_pruned(processed + sums.penalty) {
                return ScanResult::Pruned;
            }

            let next = self.tour.step(stop, self.direction);
            sums.depart(self.instance, stop, next);
            if self.instance.is_depot_marker(next) {
                break;
            }
            stop = next;
        }

        sums.close(self.instance);
        if bound.is_pruned(processed + sums.penalty) {
            return ScanResult::Pruned;
        }

        ScanResult::Completed {
            penalty: sums.penalty,
        }
    }

    /// Walks the whole route opened by `marker` without bound, reporting every
    /// stop with its rank and arrival sums. Returns the route penalty.
    pub fn walk<F>(&self, marker: StopIdx, mut visit: F) -> Penalty
    where
        F: FnMut(StopIdx, usize, &RunningSums),
    {
        debug_assert!(self.instance.is_depot_marker(marker));

        let mut sums = RunningSums::default();
        let mut stop = marker;
        let mut rank = 0;
        loop {
            visit(stop, rank, &sums);
            sums.visit(self.instance, stop);

            let next = self.tour.step(stop, self.direction);
            sums.depart(self.instance, stop, next);
            if self.instance.is_depot_marker(next) {
                break;
            }
            stop = next;
            rank += 1;
        }

        sums.close(self.instance);
        sums.penalty
    }
}
