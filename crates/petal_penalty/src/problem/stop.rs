use serde::{Deserialize, Serialize};

use crate::{
    define_index_newtype,
    penalty::route_cache::StopLabel,
    problem::{
        route_idx::RouteIdx,
        time_window::TimeWindow,
        travel_cost_matrix::{Cost, Time},
    },
};

pub type Demand = i64;

define_index_newtype!(StopIdx, Stop, StopLabel, StopIdx, Cost);

/// Raw stop identity as recorded in move log entries.
///
/// Values at or above the instance dimension address the paired copy of a stop
/// in the two-sided route representation. They must go through
/// [`RoutingInstance::normalize`](super::routing_instance::RoutingInstance::normalize)
/// before being used as an arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopRef(usize);

impl StopRef {
    pub const fn from_raw(raw: usize) -> Self {
        StopRef(raw)
    }

    pub const fn raw(&self) -> usize {
        self.0
    }
}

impl From<StopIdx> for StopRef {
    fn from(stop: StopIdx) -> Self {
        StopRef(stop.get())
    }
}

impl std::fmt::Display for StopRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    /// Boundary marker opening the given route.
    DepotMarker(RouteIdx),
    Customer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stop {
    external_id: String,
    location_id: usize,
    demand: Demand,
    service_duration: Time,
    time_window: TimeWindow,
    kind: StopKind,
}

impl Stop {
    pub(crate) fn depot_marker(
        route: RouteIdx,
        location_id: usize,
        time_window: TimeWindow,
    ) -> Self {
        Stop {
            external_id: format!("depot-{route}"),
            location_id,
            demand: 0,
            service_duration: 0,
            time_window,
            kind: StopKind::DepotMarker(route),
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn location_id(&self) -> usize {
        self.location_id
    }

    pub fn demand(&self) -> Demand {
        self.demand
    }

    pub fn service_duration(&self) -> Time {
        self.service_duration
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn kind(&self) -> StopKind {
        self.kind
    }

    pub fn is_depot_marker(&self) -> bool {
        matches!(self.kind, StopKind::DepotMarker(_))
    }

    pub fn depot_route(&self) -> Option<RouteIdx> {
        match self.kind {
            StopKind::DepotMarker(route) => Some(route),
            StopKind::Customer => None,
        }
    }
}

#[derive(Default)]
pub struct StopBuilder {
    external_id: Option<String>,
    location_id: Option<usize>,
    demand: Option<Demand>,
    service_duration: Option<Time>,
    time_window: Option<TimeWindow>,
}

impl StopBuilder {
    pub fn set_external_id(&mut self, external_id: String) -> &mut StopBuilder {
        self.external_id = Some(external_id);
        self
    }

    pub fn set_location_id(&mut self, location_id: usize) -> &mut StopBuilder {
        self.location_id = Some(location_id);
        self
    }

    pub fn set_demand(&mut self, demand: Demand) -> &mut StopBuilder {
        self.demand = Some(demand);
        self
    }

    pub fn set_service_duration(&mut self, service_duration: Time) -> &mut StopBuilder {
        self.service_duration = Some(service_duration);
        self
    }

    pub fn set_time_window(&mut self, time_window: TimeWindow) -> &mut StopBuilder {
        self.time_window = Some(time_window);
        self
    }

    pub fn build(self) -> Stop {
        let location_id = self.location_id.expect("Location ID is required");
        Stop {
            external_id: self
                .external_id
                .unwrap_or_else(|| location_id.to_string()),
            location_id,
            demand: self.demand.unwrap_or(0),
            service_duration: self.service_duration.unwrap_or(0),
            time_window: self.time_window.unwrap_or_default(),
            kind: StopKind::Customer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let mut builder = StopBuilder::default();
        builder.set_location_id(3).set_demand(7);
        let stop = builder.build();

        assert_eq!(stop.external_id(), "3");
        assert_eq!(stop.demand(), 7);
        assert_eq!(stop.service_duration(), 0);
        assert_eq!(stop.time_window(), &TimeWindow::default());
        assert!(!stop.is_depot_marker());
        assert_eq!(stop.depot_route(), None);
    }

    #[test]
    fn test_depot_marker() {
        let marker = Stop::depot_marker(RouteIdx::new(2), 0, TimeWindow::new(0, 100));

        assert!(marker.is_depot_marker());
        assert_eq!(marker.depot_route(), Some(RouteIdx::new(2)));
        assert_eq!(marker.demand(), 0);
        assert_eq!(marker.time_window().latest(), 100);
    }
}
