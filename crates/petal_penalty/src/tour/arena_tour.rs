use std::iter;

use thiserror::Error;

use crate::{
    problem::{
        route_idx::RouteIdx, routing_instance::RoutingInstance, stop::StopIdx,
        travel_cost_matrix::Cost,
    },
    tour::{
        move_log::{MoveLog, SwapRecord},
        tour_oracle::{ScanDirection, TourOracle},
    },
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TourError {
    #[error("expected {expected} routes, got {actual}")]
    RouteCount { expected: usize, actual: usize },

    #[error("stop {0} is outside the instance")]
    UnknownStop(StopIdx),

    #[error("stop {0} is a depot marker, not a customer")]
    NotACustomer(StopIdx),

    #[error("customer {0} is visited more than once")]
    DuplicateCustomer(StopIdx),

    #[error("customer {0} is not visited")]
    MissingCustomer(StopIdx),

    #[error("{first}..={last} is not a run of customers within one route")]
    InvalidSegment { first: StopIdx, last: StopIdx },

    #[error("cannot insert the segment after stop {0}")]
    InvalidInsertion(StopIdx),

    #[error("stops {0} and {1} belong to the same route")]
    SameRoute(StopIdx, StopIdx),

    #[error("cannot swap stop {0} with itself")]
    SameStop(StopIdx),

    #[error("stops {0} and {1} are adjacent")]
    AdjacentStops(StopIdx, StopIdx),
}

/// Giant-tour representation over the stop arena.
///
/// `next`/`prev` always follow travel order: marker 0, the customers of route
/// 0, marker 1, ... and back to marker 0. The `reversed` bit only changes how
/// the tour answers [`TourOracle`] queries, mimicking a list whose
/// representation direction can be flipped in constant time.
///
/// Every edit pushes the stops bounding the exchanged edges onto the move log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaTour {
    next: Vec<StopIdx>,
    prev: Vec<StopIdx>,
    reversed: bool,
}

impl ArenaTour {
    pub fn from_routes(
        instance: &RoutingInstance,
        routes: &[Vec<StopIdx>],
    ) -> Result<Self, TourError> {
        if routes.len() != instance.vehicles() {
            return Err(TourError::RouteCount {
                expected: instance.vehicles(),
                actual: routes.len(),
            });
        }

        let mut visited = vec![false; instance.dimension()];
        for &stop in routes.iter().flatten() {
            if stop.get() >= instance.dimension() {
                return Err(TourError::UnknownStop(stop));
            }
            if instance.is_depot_marker(stop) {
                return Err(TourError::NotACustomer(stop));
            }
            if visited[stop.get()] {
                return Err(TourError::DuplicateCustomer(stop));
            }
            visited[stop.get()] = true;
        }

        if let Some(missing) = instance.customers().find(|stop| !visited[stop.get()]) {
            return Err(TourError::MissingCustomer(missing));
        }

        Ok(Self::link_routes(instance, routes))
    }

    /// Fills the vehicles in customer order, opening the next route whenever the
    /// load would exceed capacity. The last vehicle takes whatever remains.
    pub fn sequential(instance: &RoutingInstance) -> Self {
        let mut routes = vec![Vec::new(); instance.vehicles()];
        let mut route = 0;
        let mut load = 0;

        for customer in instance.customers() {
            let demand = instance.stop(customer).demand();
            if load + demand > instance.capacity()
                && !routes[route].is_empty()
                && route + 1 < instance.vehicles()
            {
                route += 1;
                load = 0;
            }

            load += demand;
            routes[route].push(customer);
        }

        Self::link_routes(instance, &routes)
    }

    fn link_routes(instance: &RoutingInstance, routes: &[Vec<StopIdx>]) -> Self {
        let dimension = instance.dimension();
        let mut tour = ArenaTour {
            next: vec![StopIdx::default(); dimension],
            prev: vec![StopIdx::default(); dimension],
            reversed: false,
        };

        let order: Vec<StopIdx> = routes
            .iter()
            .enumerate()
            .flat_map(|(route, stops)| {
                iter::once(instance.depot_marker(RouteIdx::new(route))).chain(stops.iter().copied())
            })
            .collect();

        for (index, &stop) in order.iter().enumerate() {
            tour.link(stop, order[(index + 1) % order.len()]);
        }

        tour
    }

    #[inline(always)]
    fn link(&mut self, from: StopIdx, to: StopIdx) {
        self.next[from] = to;
        self.prev[to] = from;
    }

    /// Next stop in travel order.
    #[inline(always)]
    pub fn next_stop(&self, stop: StopIdx) -> StopIdx {
        self.next[stop]
    }

    /// Previous stop in travel order.
    #[inline(always)]
    pub fn previous_stop(&self, stop: StopIdx) -> StopIdx {
        self.prev[stop]
    }

    /// Flips the representation direction. Travel order is unchanged.
    pub fn flip(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Customers of `route` in travel order.
    pub fn route(&self, instance: &RoutingInstance, route: RouteIdx) -> Vec<StopIdx> {
        let mut stops = Vec::new();
        let mut stop = self.next[instance.depot_marker(route)];
        while !instance.is_depot_marker(stop) {
            stops.push(stop);
            stop = self.next[stop];
        }
        stops
    }

    pub fn routes(&self, instance: &RoutingInstance) -> Vec<Vec<StopIdx>> {
        instance
            .routes()
            .map(|route| self.route(instance, route))
            .collect()
    }

    /// Route currently holding `stop`, found by walking back to its opening marker.
    pub fn route_of(&self, instance: &RoutingInstance, stop: StopIdx) -> RouteIdx {
        let mut current = stop;
        loop {
            if let Some(route) = instance.marker_route(current) {
                return route;
            }
            current = self.prev[current];
        }
    }

    /// Sum of the raw edge costs along the whole tour.
    pub fn travel_cost(&self, instance: &RoutingInstance) -> Cost {
        (0..instance.dimension())
            .map(StopIdx::new)
            .map(|stop| instance.cost(stop, self.next[stop]))
            .sum()
    }

    fn check_stop(&self, instance: &RoutingInstance, stop: StopIdx) -> Result<(), TourError> {
        if stop.get() >= instance.dimension() {
            return Err(TourError::UnknownStop(stop));
        }
        Ok(())
    }

    fn check_customer(&self, instance: &RoutingInstance, stop: StopIdx) -> Result<(), TourError> {
        self.check_stop(instance, stop)?;
        if instance.is_depot_marker(stop) {
            return Err(TourError::NotACustomer(stop));
        }
        Ok(())
    }

    /// Stops of the travel-order run `first..=last`, which may only hold customers.
    fn segment(
        &self,
        instance: &RoutingInstance,
        first: StopIdx,
        last: StopIdx,
    ) -> Result<Vec<StopIdx>, TourError> {
        self.check_customer(instance, first)?;
        self.check_customer(instance, last)?;

        let mut stops = vec![first];
        let mut stop = first;
        while stop != last {
            stop = self.next[stop];
            if instance.is_depot_marker(stop) {
                return Err(TourError::InvalidSegment { first, last });
            }
            stops.push(stop);
        }

        Ok(stops)
    }

    /// First and last customers between `stop` and the end of its route.
    fn tail(&self, instance: &RoutingInstance, stop: StopIdx) -> Option<(StopIdx, StopIdx)> {
        let first = self.next[stop];
        if instance.is_depot_marker(first) {
            return None;
        }

        let mut last = first;
        while !instance.is_depot_marker(self.next[last]) {
            last = self.next[last];
        }
        Some((first, last))
    }

    /// Moves the run `first..=last` between `after` and its successor.
    ///
    /// ```text
    /// BEFORE: (before) -x- [first .. last] -x- (following) ... (after) -x- (after_next)
    /// AFTER:  (before) --- (following) ... (after) --- [first .. last] --- (after_next)
    /// ```
    pub fn relocate_segment(
        &mut self,
        instance: &RoutingInstance,
        first: StopIdx,
        last: StopIdx,
        after: StopIdx,
        log: &mut MoveLog,
    ) -> Result<(), TourError> {
        let segment = self.segment(instance, first, last)?;
        self.check_stop(instance, after)?;

        let before = self.prev[first];
        if after == before || segment.contains(&after) {
            return Err(TourError::InvalidInsertion(after));
        }

        let following = self.next[last];
        let after_next = self.next[after];

        self.link(before, following);
        self.link(after, first);
        self.link(last, after_next);

        log.push(SwapRecord::new(before, first, last, following));
        log.push(SwapRecord::new(after, first, last, after_next));

        Ok(())
    }

    /// Reverses the run `first..=last` inside its route.
    ///
    /// The segment endpoints are logged through their paired references since
    /// they are now entered from their other side.
    pub fn reverse_segment(
        &mut self,
        instance: &RoutingInstance,
        first: StopIdx,
        last: StopIdx,
        log: &mut MoveLog,
    ) -> Result<(), TourError> {
        if first == last {
            return Err(TourError::InvalidSegment { first, last });
        }

        let segment = self.segment(instance, first, last)?;
        let before = self.prev[first];
        let following = self.next[last];

        for pair in segment.windows(2) {
            self.link(pair[1], pair[0]);
        }
        self.link(before, last);
        self.link(first, following);

        log.push(SwapRecord::new(
            before,
            instance.paired(first),
            instance.paired(last),
            following,
        ));

        Ok(())
    }

    /// 2-opt*: the customers following `a` and the customers following `b`
    /// trade routes. Either stop may be a depot marker, in which case its whole
    /// route is the tail.
    pub fn exchange_tails(
        &mut self,
        instance: &RoutingInstance,
        a: StopIdx,
        b: StopIdx,
        log: &mut MoveLog,
    ) -> Result<(), TourError> {
        self.check_stop(instance, a)?;
        self.check_stop(instance, b)?;
        if self.route_of(instance, a) == self.route_of(instance, b) {
            return Err(TourError::SameRoute(a, b));
        }

        let tail_a = self.tail(instance, a);
        let tail_b = self.tail(instance, b);

        if let Some((first, last)) = tail_b {
            self.relocate_segment(instance, first, last, a, log)?;
        }
        if let Some((first, last)) = tail_a {
            self.relocate_segment(instance, first, last, b, log)?;
        }

        Ok(())
    }

    /// Exchanges the positions of two non-adjacent customers.
    pub fn swap_stops(
        &mut self,
        instance: &RoutingInstance,
        a: StopIdx,
        b: StopIdx,
        log: &mut MoveLog,
    ) -> Result<(), TourError> {
        self.check_customer(instance, a)?;
        self.check_customer(instance, b)?;
        if a == b {
            return Err(TourError::SameStop(a));
        }
        if self.next[a] == b || self.next[b] == a {
            return Err(TourError::AdjacentStops(a, b));
        }

        let before_a = self.prev[a];
        self.relocate_segment(instance, a, a, b, log)?;
        self.relocate_segment(instance, b, b, before_a, log)
    }
}

impl TourOracle for ArenaTour {
    #[inline(always)]
    fn orientation(&self) -> ScanDirection {
        if self.reversed {
            ScanDirection::Backward
        } else {
            ScanDirection::Forward
        }
    }

    #[inline(always)]
    fn successor(&self, stop: StopIdx) -> StopIdx {
        if self.reversed {
            self.prev[stop]
        } else {
            self.next[stop]
        }
    }

    #[inline(always)]
    fn predecessor(&self, stop: StopIdx) -> StopIdx {
        if self.reversed {
            self.next[stop]
        } else {
            self.prev[stop]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::stop::StopRef,
        test_utils::{TestCustomer, create_line_instance, create_tour, customer_indices},
    };

    fn create_instance(vehicles: usize, customers: usize) -> RoutingInstance {
        let customers: Vec<_> = (0..customers)
            .map(|index| TestCustomer::at(index as i64 + 1).with_demand(1))
            .collect();
        create_line_instance(vehicles, 10, &customers)
    }

    #[test]
    fn test_from_routes_validates() {
        let instance = create_instance(2, 3);
        let c = |index| instance.customer_stop(index);

        assert_eq!(
            ArenaTour::from_routes(&instance, &[vec![c(0), c(1), c(2)]]).unwrap_err(),
            TourError::RouteCount {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            ArenaTour::from_routes(&instance, &[vec![c(0), c(1)], vec![c(1), c(2)]]).unwrap_err(),
            TourError::DuplicateCustomer(c(1))
        );
        assert_eq!(
            ArenaTour::from_routes(&instance, &[vec![c(0)], vec![c(2)]]).unwrap_err(),
            TourError::MissingCustomer(c(1))
        );
        assert_eq!(
            ArenaTour::from_routes(&instance, &[vec![StopIdx::new(1)], vec![c(0), c(1), c(2)]])
                .unwrap_err(),
            TourError::NotACustomer(StopIdx::new(1))
        );
    }

    #[test]
    fn test_from_routes_links_giant_tour() {
        let instance = create_instance(2, 3);
        let tour = create_tour(&instance, vec![vec![2], vec![0, 1]]);

        assert_eq!(customer_indices(&instance, &tour), vec![vec![2], vec![0, 1]]);
        assert_eq!(tour.next_stop(StopIdx::new(0)), instance.customer_stop(2));
        assert_eq!(tour.next_stop(instance.customer_stop(2)), StopIdx::new(1));
        assert_eq!(tour.next_stop(instance.customer_stop(1)), StopIdx::new(0));
        assert_eq!(tour.route_of(&instance, instance.customer_stop(1)), RouteIdx::new(1));
        assert_eq!(tour.route_of(&instance, StopIdx::new(1)), RouteIdx::new(1));
    }

    #[test]
    fn test_sequential_respects_capacity() {
        let customers: Vec<_> = [4, 4, 4, 4, 9]
            .iter()
            .enumerate()
            .map(|(index, &demand)| TestCustomer::at(index as i64 + 1).with_demand(demand))
            .collect();
        let instance = create_line_instance(3, 10, &customers);

        let tour = ArenaTour::sequential(&instance);

        assert_eq!(
            customer_indices(&instance, &tour),
            vec![vec![0, 1], vec![2, 3], vec![4]]
        );
    }

    #[test]
    fn test_sequential_overflows_into_last_vehicle() {
        let customers: Vec<_> = (0..4)
            .map(|index| TestCustomer::at(index + 1).with_demand(6))
            .collect();
        let instance = create_line_instance(2, 10, &customers);

        let tour = ArenaTour::sequential(&instance);

        assert_eq!(customer_indices(&instance, &tour), vec![vec![0], vec![1, 2, 3]]);
    }

    #[test]
    fn test_relocate_segment_between_routes() {
        let instance = create_instance(2, 5);
        let mut tour = create_tour(&instance, vec![vec![0, 1, 2], vec![3, 4]]);
        let c = |index| instance.customer_stop(index);
        let mut log = MoveLog::new();

        tour.relocate_segment(&instance, c(1), c(2), c(3), &mut log)
            .unwrap();

        assert_eq!(customer_indices(&instance, &tour), vec![vec![0], vec![3, 1, 2, 4]]);
        assert_eq!(
            log.records(),
            &[
                SwapRecord::new(c(0), c(1), c(2), StopIdx::new(1)),
                SwapRecord::new(c(3), c(1), c(2), c(4)),
            ]
        );
    }

    #[test]
    fn test_relocate_segment_rejects_invalid_arguments() {
        let instance = create_instance(2, 4);
        let mut tour = create_tour(&instance, vec![vec![0, 1], vec![2, 3]]);
        let c = |index| instance.customer_stop(index);
        let mut log = MoveLog::new();

        assert_eq!(
            tour.relocate_segment(&instance, c(1), c(2), c(3), &mut log),
            Err(TourError::InvalidSegment {
                first: c(1),
                last: c(2)
            })
        );
        assert_eq!(
            tour.relocate_segment(&instance, c(1), c(1), c(0), &mut log),
            Err(TourError::InvalidInsertion(c(0)))
        );
        assert_eq!(
            tour.relocate_segment(&instance, c(0), c(1), c(1), &mut log),
            Err(TourError::InvalidInsertion(c(1)))
        );
        assert!(log.is_empty());
        assert_eq!(customer_indices(&instance, &tour), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_relocate_to_route_start() {
        let instance = create_instance(2, 3);
        let mut tour = create_tour(&instance, vec![vec![0, 1], vec![2]]);
        let mut log = MoveLog::new();

        tour.relocate_segment(
            &instance,
            instance.customer_stop(1),
            instance.customer_stop(1),
            StopIdx::new(1),
            &mut log,
        )
        .unwrap();

        assert_eq!(customer_indices(&instance, &tour), vec![vec![0], vec![1, 2]]);
    }

    #[test]
    fn test_reverse_segment_logs_paired_endpoints() {
        let instance = create_instance(1, 4);
        let mut tour = create_tour(&instance, vec![vec![0, 1, 2, 3]]);
        let c = |index| instance.customer_stop(index);
        let mut log = MoveLog::new();

        tour.reverse_segment(&instance, c(1), c(3), &mut log).unwrap();

        assert_eq!(customer_indices(&instance, &tour), vec![vec![0, 3, 2, 1]]);
        assert_eq!(tour.previous_stop(c(1)), c(2));
        assert_eq!(tour.previous_stop(StopIdx::new(0)), c(1));

        let record = log.records()[0];
        assert_eq!(record.t1, StopRef::from(c(0)));
        assert_eq!(record.t4, StopRef::from(StopIdx::new(0)));
        assert_eq!(instance.normalize(record.t2), c(1));
        assert_eq!(instance.normalize(record.t3), c(3));
        assert_ne!(record.t2, StopRef::from(c(1)));
    }

    #[test]
    fn test_exchange_tails() {
        let instance = create_instance(3, 5);
        let mut tour = create_tour(&instance, vec![vec![0, 1], vec![2, 3, 4], vec![]]);
        let c = |index| instance.customer_stop(index);
        let mut log = MoveLog::new();

        tour.exchange_tails(&instance, c(0), c(2), &mut log).unwrap();
        assert_eq!(
            customer_indices(&instance, &tour),
            vec![vec![0, 3, 4], vec![2, 1], vec![]]
        );

        // A marker hands over its whole route
        tour.exchange_tails(&instance, StopIdx::new(2), c(2), &mut log)
            .unwrap();
        assert_eq!(
            customer_indices(&instance, &tour),
            vec![vec![0, 3, 4], vec![2], vec![1]]
        );

        assert_eq!(
            tour.exchange_tails(&instance, c(0), c(4), &mut log),
            Err(TourError::SameRoute(c(0), c(4)))
        );
    }

    #[test]
    fn test_swap_stops() {
        let instance = create_instance(2, 5);
        let mut tour = create_tour(&instance, vec![vec![0, 1, 2], vec![3, 4]]);
        let c = |index| instance.customer_stop(index);
        let mut log = MoveLog::new();

        tour.swap_stops(&instance, c(1), c(4), &mut log).unwrap();
        assert_eq!(customer_indices(&instance, &tour), vec![vec![0, 4, 2], vec![3, 1]]);

        tour.swap_stops(&instance, c(0), c(2), &mut log).unwrap();
        assert_eq!(customer_indices(&instance, &tour), vec![vec![2, 4, 0], vec![3, 1]]);

        assert_eq!(
            tour.swap_stops(&instance, c(3), c(1), &mut log),
            Err(TourError::AdjacentStops(c(3), c(1)))
        );
        assert_eq!(
            tour.swap_stops(&instance, c(3), c(3), &mut log),
            Err(TourError::SameStop(c(3)))
        );
    }

    #[test]
    fn test_flip_keeps_travel_order() {
        let instance = create_instance(2, 3);
        let mut tour = create_tour(&instance, vec![vec![0, 1], vec![2]]);
        let marker = StopIdx::new(0);

        let forward = tour.step(marker, tour.orientation());
        tour.flip();

        assert_eq!(tour.orientation(), ScanDirection::Backward);
        assert_eq!(tour.step(marker, tour.orientation()), forward);
        // Representation order is untouched, successor now reads the prev links
        assert_eq!(tour.successor(marker), tour.previous_stop(marker));
        assert_eq!(tour.successor(marker), StopIdx::new(4));
        assert_eq!(tour.predecessor(marker), forward);
    }

    #[test]
    fn test_travel_cost() {
        let instance = create_instance(1, 3);
        let tour = create_tour(&instance, vec![vec![0, 1, 2]]);

        // 0 -> 1 -> 2 -> 3 -> 0 on a line
        assert_eq!(tour.travel_cost(&instance), 6);
    }
}
