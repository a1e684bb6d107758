use std::{cell::Cell, iter};

use rand::Rng;

use crate::{
    problem::{
        routing_instance::{RoutingInstance, RoutingInstanceBuilder},
        stop::{Demand, StopBuilder, StopIdx},
        time_window::TimeWindow,
        travel_cost_matrix::{Time, TravelCostMatrix},
    },
    tour::{
        arena_tour::ArenaTour,
        tour_oracle::{ScanDirection, TourOracle},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct TestCustomer {
    x: i64,
    demand: Demand,
    service: Time,
    window: TimeWindow,
}

impl TestCustomer {
    pub fn at(x: i64) -> Self {
        TestCustomer {
            x,
            demand: 0,
            service: 0,
            window: TimeWindow::default(),
        }
    }

    pub fn with_demand(mut self, demand: Demand) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_service(mut self, service: Time) -> Self {
        self.service = service;
        self
    }

    pub fn with_window(mut self, earliest: Time, latest: Time) -> Self {
        self.window = TimeWindow::new(earliest, latest);
        self
    }
}

/// Instance on a line, depot at 0. Travel time is the distance.
pub fn create_line_instance(
    vehicles: usize,
    capacity: Demand,
    customers: &[TestCustomer],
) -> RoutingInstance {
    create_line_instance_with_depot(vehicles, capacity, TimeWindow::default(), customers)
}

pub fn create_line_instance_with_depot(
    vehicles: usize,
    capacity: Demand,
    depot_window: TimeWindow,
    customers: &[TestCustomer],
) -> RoutingInstance {
    let positions: Vec<i64> = iter::once(0)
        .chain(customers.iter().map(|customer| customer.x))
        .collect();
    let costs = positions
        .iter()
        .map(|&from| positions.iter().map(|&to| (from - to).abs()).collect())
        .collect();

    let mut builder = RoutingInstanceBuilder::default();
    builder
        .set_vehicles(vehicles)
        .set_capacity(capacity)
        .set_depot_location_id(0)
        .set_depot_time_window(depot_window)
        .set_travel_costs(TravelCostMatrix::new(costs).unwrap());

    for (index, customer) in customers.iter().enumerate() {
        let mut stop = StopBuilder::default();
        stop.set_location_id(index + 1)
            .set_demand(customer.demand)
            .set_service_duration(customer.service)
            .set_time_window(customer.window);
        builder.add_customer(stop.build());
    }

    builder.build().unwrap()
}

/// Random instance with tight windows and loads, so most tours carry penalty.
pub fn create_random_instance<R: Rng + ?Sized>(
    rng: &mut R,
    vehicles: usize,
    customers: usize,
) -> RoutingInstance {
    let coordinates: Vec<(f64, f64)> = (0..=customers)
        .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect();

    let mut builder = RoutingInstanceBuilder::default();
    builder
        .set_vehicles(vehicles)
        .set_capacity(((customers * 5) / vehicles.max(1)) as Demand)
        .set_depot_location_id(0)
        .set_depot_time_window(TimeWindow::new(0, 600))
        .set_precision(10)
        .set_travel_costs(TravelCostMatrix::from_euclidean(&coordinates, 10));

    for location_id in 1..=customers {
        let earliest = rng.random_range(0..300);
        let mut stop = StopBuilder::default();
        stop.set_location_id(location_id)
            .set_demand(rng.random_range(1..=10))
            .set_service_duration(rng.random_range(0..=10))
            .set_time_window(TimeWindow::new(earliest, earliest + rng.random_range(10..=60)));
        builder.add_customer(stop.build());
    }

    builder.build().unwrap()
}

/// Builds a tour from routes of 0-based customer indices.
pub fn create_tour(instance: &RoutingInstance, routes: Vec<Vec<usize>>) -> ArenaTour {
    let routes: Vec<Vec<StopIdx>> = routes
        .into_iter()
        .map(|route| {
            route
                .into_iter()
                .map(|index| instance.customer_stop(index))
                .collect()
        })
        .collect();
    ArenaTour::from_routes(instance, &routes).unwrap()
}

pub fn customer_indices(instance: &RoutingInstance, tour: &ArenaTour) -> Vec<Vec<usize>> {
    tour.routes(instance)
        .into_iter()
        .map(|route| {
            route
                .into_iter()
                .map(|stop| stop.get() - instance.vehicles())
                .collect()
        })
        .collect()
}

/// Oracle wrapper counting adjacency queries.
pub struct CountingTour<'a, T> {
    inner: &'a T,
    steps: Cell<usize>,
}

impl<'a, T: TourOracle> CountingTour<'a, T> {
    pub fn new(inner: &'a T) -> Self {
        CountingTour {
            inner,
            steps: Cell::new(0),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps.get()
    }
}

impl<T: TourOracle> TourOracle for CountingTour<'_, T> {
    fn orientation(&self) -> ScanDirection {
        self.inner.orientation()
    }

    fn successor(&self, stop: StopIdx) -> StopIdx {
        self.steps.set(self.steps.get() + 1);
        self.inner.successor(stop)
    }

    fn predecessor(&self, stop: StopIdx) -> StopIdx {
        self.steps.set(self.steps.get() + 1);
        self.inner.predecessor(stop)
    }
}
