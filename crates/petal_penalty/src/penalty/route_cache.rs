use smallvec::SmallVec;

use crate::{
    penalty::{penalty_outcome::Penalty, route_scanner::{RouteScanner, RunningSums}},
    problem::{route_idx::RouteIdx, routing_instance::RoutingInstance, stop::StopIdx},
    tour::tour_oracle::TourOracle,
};

/// Cached position of a stop in its route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopLabel {
    route: Option<RouteIdx>,
    rank: usize,
    prefix: RunningSums,
}

impl StopLabel {
    pub fn route(&self) -> Option<RouteIdx> {
        self.route
    }

    /// Position in the route, 0 for the opening marker.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Running sums on arrival at the stop.
    pub fn prefix(&self) -> &RunningSums {
        &self.prefix
    }
}

/// Per-route ("petal") summary.
///
/// `confirmed` survives between evaluations. `candidate`, `dirty` and
/// `anchor` are scratch of the evaluation in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteRecord {
    confirmed: Penalty,
    candidate: Penalty,
    dirty: bool,
    anchor: Option<StopIdx>,
}

impl RouteRecord {
    pub fn confirmed(&self) -> Penalty {
        self.confirmed
    }

    pub fn candidate(&self) -> Penalty {
        self.candidate
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Touched stop of lowest rank, where rescanning starts.
    pub fn anchor(&self) -> Option<StopIdx> {
        self.anchor
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCache {
    routes: Vec<RouteRecord>,
    labels: Vec<StopLabel>,
    touched: SmallVec<[RouteIdx; 8]>,
}

impl RouteCache {
    pub fn new(instance: &RoutingInstance) -> Self {
        RouteCache {
            routes: vec![RouteRecord::default(); instance.vehicles()],
            labels: vec![StopLabel::default(); instance.dimension()],
            touched: SmallVec::new(),
        }
    }

    pub fn route(&self, route: RouteIdx) -> &RouteRecord {
        &self.routes[route]
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    pub fn label(&self, stop: StopIdx) -> &StopLabel {
        &self.labels[stop]
    }

    /// Routes touched by the last discovery, in discovery order.
    pub fn touched(&self) -> &[RouteIdx] {
        &self.touched
    }

    pub fn confirmed_sum(&self) -> Penalty {
        self.routes.iter().map(RouteRecord::confirmed).sum()
    }

    /// Route owning `stop` as of the last commit.
    ///
    /// # Panics
    ///
    /// Panics when the stop was never labeled, which means the cache and the
    /// tour went out of sync.
    #[inline(always)]
    pub fn owning_route(&self, stop: StopIdx) -> RouteIdx {
        match self.labels[stop].route {
            Some(route) => route,
            None => panic!("stop {stop} has no owning route, the penalty cache is out of sync"),
        }
    }

    /// Clears the scratch left by the previous evaluation.
    pub(crate) fn reset_touched(&mut self) {
        for route in self.touched.drain(..) {
            let record = &mut self.routes[route];
            record.dirty = false;
            record.anchor = None;
        }
    }

    /// Marks `route` dirty. Returns `true` the first time it is seen.
    pub(crate) fn touch(&mut self, route: RouteIdx) -> bool {
        let record = &mut self.routes[route];
        if record.dirty {
            return false;
        }

        record.dirty = true;
        self.touched.push(route);
        true
    }

    /// Lowers the anchor of the route owning `stop` to it when its rank is
    /// smaller. Routes that are not dirty are left alone.
    pub(crate) fn offer_anchor(&mut self, stop: StopIdx) {
        let route = self.owning_route(stop);
        let rank = self.labels[stop].rank;
        let record = &mut self.routes[route];
        if !record.dirty {
            return;
        }

        match record.anchor {
            Some(anchor) if self.labels[anchor].rank <= rank => {}
            _ => record.anchor = Some(stop),
        }
    }

    pub(crate) fn set_candidate(&mut self, route: RouteIdx, penalty: Penalty) {
        self.routes[route].candidate = penalty;
    }

    /// Relabels the stops of `route` and confirms its candidate penalty.
    /// Returns the penalty recomputed by the relabeling walk.
    pub(crate) fn commit_route<T: TourOracle>(
        &mut self,
        scanner: &RouteScanner<'_, T>,
        route: RouteIdx,
    ) -> Penalty {
        let marker = scanner.instance().depot_marker(route);
        let labels = &mut self.labels;
        let recomputed = scanner.walk(marker, |stop, rank, sums| {
            labels[stop] = StopLabel {
                route: Some(route),
                rank,
                prefix: *sums,
            };
        });

        let record = &mut self.routes[route];
        record.confirmed = record.candidate;
        recomputed
    }

    /// Commits every route and clears the scratch. Returns the recomputed total.
    pub(crate) fn commit_all<T: TourOracle>(&mut self, scanner: &RouteScanner<'_, T>) -> Penalty {
        self.reset_touched();
        scanner
            .instance()
            .routes()
            .map(|route| self.commit_route(scanner, route))
            .sum()
    }
}
