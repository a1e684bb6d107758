use crate::{
    penalty::{penalty_outcome::Penalty, route_cache::RouteCache},
    problem::routing_instance::RoutingInstance,
    tour::move_log::MoveLog,
};

/// Finds the routes changed by the edits in `log` since the last commit.
///
/// A route is touched when it owns the `t1` or `t4` end of an entry. Touched
/// routes are marked dirty and listed in discovery order (most recent entry
/// first), and each gets as anchor the lowest-rank stop any entry names in
/// it. Returns the sum of their confirmed penalties.
pub fn discover_touched_routes(
    cache: &mut RouteCache,
    instance: &RoutingInstance,
    log: &MoveLog,
) -> Penalty {
    cache.reset_touched();

    let mut prior_sum = 0;
    for record in log.iter_recent_first() {
        for stop in [record.t1, record.t4] {
            let route = cache.owning_route(instance.normalize(stop));
            if cache.touch(route) {
                prior_sum += cache.route(route).confirmed();
            }
        }
    }

    for record in log.iter_recent_first() {
        for stop in record.stops() {
            cache.offer_anchor(instance.normalize(stop));
        }
    }

    prior_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        penalty::route_scanner::RouteScanner,
        problem::{route_idx::RouteIdx, stop::StopIdx},
        test_utils::{TestCustomer, create_line_instance, create_tour},
        tour::move_log::SwapRecord,
    };

    fn create_cache(instance: &RoutingInstance, routes: Vec<Vec<usize>>) -> RouteCache {
        let tour = create_tour(instance, routes);
        let mut cache = RouteCache::new(instance);
        let scanner = RouteScanner::new(instance, &tour);
        for route in instance.routes() {
            let penalty = scanner.walk(instance.depot_marker(route), |_, _, _| {});
            cache.set_candidate(route, penalty);
        }
        cache.commit_all(&scanner);
        cache
    }

    fn create_instance() -> RoutingInstance {
        let customers: Vec<_> = (0..6)
            .map(|index| TestCustomer::at(index + 1).with_demand(4))
            .collect();
        create_line_instance(3, 10, &customers)
    }

    #[test]
    fn test_discovers_t1_and_t4_routes() {
        let instance = create_instance();
        let mut cache = create_cache(&instance, vec![vec![0, 1, 2], vec![3], vec![4, 5]]);
        let c = |index| instance.customer_stop(index);

        let mut log = MoveLog::new();
        log.push(SwapRecord::new(c(0), c(1), c(1), c(2)));
        log.push(SwapRecord::new(c(3), c(1), c(1), StopIdx::new(2)));

        let prior_sum = discover_touched_routes(&mut cache, &instance, &log);

        assert_eq!(cache.touched(), &[RouteIdx::new(1), RouteIdx::new(2), RouteIdx::new(0)]);
        assert_eq!(prior_sum, cache.confirmed_sum());
        assert_eq!(cache.route(RouteIdx::new(0)).anchor(), Some(c(0)));
        assert_eq!(cache.route(RouteIdx::new(1)).anchor(), Some(c(3)));
        assert_eq!(cache.route(RouteIdx::new(2)).anchor(), Some(StopIdx::new(2)));
    }

    #[test]
    fn test_repeated_routes_counted_once() {
        let instance = create_instance();
        let mut cache = create_cache(&instance, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        let c = |index| instance.customer_stop(index);

        let mut log = MoveLog::new();
        log.push(SwapRecord::new(c(1), c(2), c(0), c(1)));
        log.push(SwapRecord::new(c(0), c(1), c(1), c(2)));

        let prior_sum = discover_touched_routes(&mut cache, &instance, &log);

        assert_eq!(cache.touched(), &[RouteIdx::new(0)]);
        assert_eq!(prior_sum, cache.route(RouteIdx::new(0)).confirmed());
        assert_eq!(cache.route(RouteIdx::new(0)).anchor(), Some(c(0)));
        assert!(!cache.route(RouteIdx::new(1)).is_dirty());
    }

    #[test]
    fn test_paired_references_resolve_to_stops() {
        let instance = create_instance();
        let mut cache = create_cache(&instance, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        let c = |index| instance.customer_stop(index);

        let mut log = MoveLog::new();
        log.push(SwapRecord::new(
            c(3),
            instance.paired(c(4)),
            instance.paired(c(4)),
            StopIdx::new(2),
        ));

        discover_touched_routes(&mut cache, &instance, &log);

        assert_eq!(cache.touched(), &[RouteIdx::new(1), RouteIdx::new(2)]);
        assert_eq!(cache.route(RouteIdx::new(1)).anchor(), Some(c(3)));
    }

    #[test]
    fn test_previous_scratch_is_cleared() {
        let instance = create_instance();
        let mut cache = create_cache(&instance, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        let c = |index| instance.customer_stop(index);

        let mut log = MoveLog::new();
        log.push(SwapRecord::new(c(0), c(1), c(1), c(2)));
        discover_touched_routes(&mut cache, &instance, &log);

        log.clear();
        log.push(SwapRecord::new(c(5), c(5), c(5), StopIdx::new(0)));
        discover_touched_routes(&mut cache, &instance, &log);

        assert_eq!(cache.touched(), &[RouteIdx::new(2), RouteIdx::new(0)]);
        let first = cache.route(RouteIdx::new(0));
        assert!(first.is_dirty());
        assert_eq!(first.anchor(), Some(StopIdx::new(0)));
        assert!(!cache.route(RouteIdx::new(1)).is_dirty());
    }
}
