use thiserror::Error;

use crate::problem::{
    route_idx::RouteIdx,
    stop::{Demand, Stop, StopIdx, StopRef},
    time_window::TimeWindow,
    travel_cost_matrix::{Cost, Time, TravelCostMatrix},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceError {
    #[error("an instance needs at least one vehicle")]
    NoVehicles,

    #[error("vehicle capacity is required")]
    MissingCapacity,

    #[error("travel cost matrix is required")]
    MissingTravelCosts,

    #[error("travel cost matrix is not square")]
    NonSquareMatrix,

    #[error("precision must be positive, got {0}")]
    InvalidPrecision(Cost),

    #[error("location {location} is outside the travel cost matrix ({num_locations} locations)")]
    UnknownLocation {
        location: usize,
        num_locations: usize,
    },

    #[error("expected {expected} dual values, got {actual}")]
    DualsLength { expected: usize, actual: usize },
}

/// Static data of a capacitated routing problem with time windows.
///
/// Stops live in a single arena. Indices `0..vehicles` are the depot boundary
/// markers (marker `k` opens route `k`, marker `0` stands for the depot
/// itself), the remaining indices are customers.
#[derive(Debug, Clone)]
pub struct RoutingInstance {
    stops: Vec<Stop>,
    vehicles: usize,
    capacity: Demand,
    depot_window: TimeWindow,
    precision: Cost,
    duals: Vec<Cost>,
    costs: TravelCostMatrix,
}

impl RoutingInstance {
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    #[inline(always)]
    pub fn stop(&self, stop: StopIdx) -> &Stop {
        &self.stops[stop]
    }

    /// Number of stops in the arena, markers included.
    pub fn dimension(&self) -> usize {
        self.stops.len()
    }

    pub fn vehicles(&self) -> usize {
        self.vehicles
    }

    pub fn customers_len(&self) -> usize {
        self.stops.len() - self.vehicles
    }

    pub fn customers(&self) -> impl Iterator<Item = StopIdx> + use<> {
        (self.vehicles..self.stops.len()).map(StopIdx::new)
    }

    /// Arena index of the `index`-th customer (0-based).
    pub fn customer_stop(&self, index: usize) -> StopIdx {
        StopIdx::new(self.vehicles + index)
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteIdx> + use<> {
        (0..self.vehicles).map(RouteIdx::new)
    }

    pub fn capacity(&self) -> Demand {
        self.capacity
    }

    pub fn depot_window(&self) -> &TimeWindow {
        &self.depot_window
    }

    pub fn precision(&self) -> Cost {
        self.precision
    }

    pub fn travel_costs(&self) -> &TravelCostMatrix {
        &self.costs
    }

    #[inline(always)]
    pub fn is_depot_marker(&self, stop: StopIdx) -> bool {
        stop.get() < self.vehicles
    }

    #[inline(always)]
    pub fn depot_marker(&self, route: RouteIdx) -> StopIdx {
        debug_assert!(route.get() < self.vehicles);
        StopIdx::new(route.get())
    }

    /// Route opened by `marker`, or `None` for customers.
    #[inline(always)]
    pub fn marker_route(&self, marker: StopIdx) -> Option<RouteIdx> {
        self.is_depot_marker(marker)
            .then(|| RouteIdx::new(marker.get()))
    }

    /// Maps a raw reference, possibly addressing a paired copy, to its arena index.
    #[inline(always)]
    pub fn normalize(&self, stop: StopRef) -> StopIdx {
        let dimension = self.stops.len();
        let raw = stop.raw();
        assert!(
            raw < 2 * dimension,
            "stop reference {stop} is outside the paired arena of dimension {dimension}"
        );

        if raw >= dimension {
            StopIdx::new(raw - dimension)
        } else {
            StopIdx::new(raw)
        }
    }

    /// Reference to the paired copy of `stop` in the two-sided representation.
    pub fn paired(&self, stop: StopIdx) -> StopRef {
        StopRef::from_raw(stop.get() + self.stops.len())
    }

    pub fn dual(&self, stop: StopIdx) -> Cost {
        self.duals[stop]
    }

    pub fn duals(&self) -> &[Cost] {
        &self.duals
    }

    /// Replaces the dual adjustments. Cached penalty state computed with the
    /// previous values becomes stale and must be invalidated by the caller.
    pub fn set_duals(&mut self, duals: Vec<Cost>) -> Result<(), InstanceError> {
        if duals.len() != self.stops.len() {
            return Err(InstanceError::DualsLength {
                expected: self.stops.len(),
                actual: duals.len(),
            });
        }

        self.duals = duals;
        Ok(())
    }

    /// Raw matrix cost of the edge between two stops.
    #[inline(always)]
    pub fn cost(&self, from: StopIdx, to: StopIdx) -> Cost {
        self.costs
            .cost(self.stops[from].location_id(), self.stops[to].location_id())
    }

    /// Travel time of an edge: its cost net of both endpoints' dual adjustments,
    /// scaled down to instance precision.
    #[inline(always)]
    pub fn travel_time(&self, from: StopIdx, to: StopIdx) -> Time {
        (self.cost(from, to) - self.duals[from] - self.duals[to]) / self.precision
    }
}

#[derive(Default)]
pub struct RoutingInstanceBuilder {
    vehicles: Option<usize>,
    capacity: Option<Demand>,
    depot_location_id: Option<usize>,
    depot_window: Option<TimeWindow>,
    precision: Option<Cost>,
    customers: Vec<Stop>,
    costs: Option<TravelCostMatrix>,
}

impl RoutingInstanceBuilder {
    pub fn set_vehicles(&mut self, vehicles: usize) -> &mut RoutingInstanceBuilder {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn set_capacity(&mut self, capacity: Demand) -> &mut RoutingInstanceBuilder {
        self.capacity = Some(capacity);
        self
    }

    pub fn set_depot_location_id(&mut self, location_id: usize) -> &mut RoutingInstanceBuilder {
        self.depot_location_id = Some(location_id);
        self
    }

    pub fn set_depot_time_window(&mut self, time_window: TimeWindow) -> &mut RoutingInstanceBuilder {
        self.depot_window = Some(time_window);
        self
    }

    pub fn set_precision(&mut self, precision: Cost) -> &mut RoutingInstanceBuilder {
        self.precision = Some(precision);
        self
    }

    pub fn set_customers(&mut self, customers: Vec<Stop>) -> &mut RoutingInstanceBuilder {
        self.customers = customers;
        self
    }

    pub fn add_customer(&mut self, customer: Stop) -> &mut RoutingInstanceBuilder {
        self.customers.push(customer);
        self
    }

    pub fn set_travel_costs(&mut self, costs: TravelCostMatrix) -> &mut RoutingInstanceBuilder {
        self.costs = Some(costs);
        self
    }

    pub fn build(self) -> Result<RoutingInstance, InstanceError> {
        let vehicles = match self.vehicles {
            Some(vehicles) if vehicles > 0 => vehicles,
            _ => return Err(InstanceError::NoVehicles),
        };
        let capacity = self.capacity.ok_or(InstanceError::MissingCapacity)?;
        let costs = self.costs.ok_or(InstanceError::MissingTravelCosts)?;
        let precision = self.precision.unwrap_or(1);
        if precision <= 0 {
            return Err(InstanceError::InvalidPrecision(precision));
        }

        let depot_location_id = self.depot_location_id.unwrap_or(0);
        let depot_window = self.depot_window.unwrap_or_default();

        let mut stops = Vec::with_capacity(vehicles + self.customers.len());
        stops.extend(
            (0..vehicles)
                .map(|route| Stop::depot_marker(RouteIdx::new(route), depot_location_id, depot_window)),
        );
        stops.extend(self.customers);

        let num_locations = costs.num_locations();
        if let Some(stop) = stops.iter().find(|stop| stop.location_id() >= num_locations) {
            return Err(InstanceError::UnknownLocation {
                location: stop.location_id(),
                num_locations,
            });
        }

        let duals = vec![0; stops.len()];

        Ok(RoutingInstance {
            stops,
            vehicles,
            capacity,
            depot_window,
            precision,
            duals,
            costs,
        })
    }
}
