use std::path::Path;

use crate::{
    parsers::{parse_error::ParseError, parser::DatasetParser},
    problem::{
        routing_instance::{RoutingInstance, RoutingInstanceBuilder},
        stop::{Demand, StopBuilder},
        time_window::TimeWindow,
        travel_cost_matrix::{Cost, Time, TravelCostMatrix},
    },
};

/// Reader for Solomon VRPTW instances.
///
/// Row 0 of the customer table is the depot. Edge costs are Euclidean
/// distances multiplied by `precision` and rounded, and the instance divides
/// them back, so times stay in the file's units.
#[derive(Debug, Clone)]
pub struct SolomonParser {
    precision: Cost,
    vehicles: Option<usize>,
}

impl Default for SolomonParser {
    fn default() -> Self {
        SolomonParser {
            precision: 100,
            vehicles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Name,
    Vehicle,
    Customer,
}

#[derive(Debug)]
struct CustomerRow {
    id: String,
    x: f64,
    y: f64,
    demand: Demand,
    ready: Time,
    due: Time,
    service: Time,
}

impl SolomonParser {
    pub fn set_precision(&mut self, precision: Cost) -> &mut SolomonParser {
        self.precision = precision;
        self
    }

    /// Overrides the fleet size given in the file.
    pub fn set_vehicles(&mut self, vehicles: usize) -> &mut SolomonParser {
        self.vehicles = Some(vehicles);
        self
    }

    pub fn parse_str(&self, text: &str) -> Result<RoutingInstance, ParseError> {
        let mut section = Section::Name;
        let mut fleet: Option<(usize, Demand)> = None;
        let mut rows: Vec<CustomerRow> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let upper = line.to_uppercase();
            if upper.starts_with("VEHICLE") {
                section = Section::Vehicle;
                continue;
            }
            if upper.starts_with("CUSTOMER") {
                section = Section::Customer;
                continue;
            }

            // Names and column headers
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                continue;
            }

            match section {
                Section::Name => {}
                Section::Vehicle => fleet = Some(parse_vehicle_line(line, index + 1)?),
                Section::Customer => rows.push(parse_customer_line(line, index + 1)?),
            }
        }

        let (vehicles, capacity) = fleet.ok_or(ParseError::MissingSection("VEHICLE"))?;
        let Some((depot, customers)) = rows.split_first() else {
            return Err(ParseError::MissingSection("CUSTOMER"));
        };

        let coordinates: Vec<(f64, f64)> = rows.iter().map(|row| (row.x, row.y)).collect();

        let mut builder = RoutingInstanceBuilder::default();
        builder
            .set_vehicles(self.vehicles.unwrap_or(vehicles))
            .set_capacity(capacity)
            .set_precision(self.precision)
            .set_depot_location_id(0)
            .set_depot_time_window(TimeWindow::new(depot.ready, depot.due))
            .set_travel_costs(TravelCostMatrix::from_euclidean(&coordinates, self.precision));

        for (index, row) in customers.iter().enumerate() {
            let mut stop = StopBuilder::default();
            stop.set_external_id(row.id.clone())
                .set_location_id(index + 1)
                .set_demand(row.demand)
                .set_service_duration(row.service)
                .set_time_window(TimeWindow::new(row.ready, row.due));
            builder.add_customer(stop.build());
        }

        Ok(builder.build()?)
    }
}

impl DatasetParser for SolomonParser {
    fn parse<P: AsRef<Path>>(&self, file: P) -> Result<RoutingInstance, ParseError> {
        let content = std::fs::read_to_string(file)?;
        self.parse_str(&content)
    }
}

fn parse_number(value: &str, line: usize) -> Result<f64, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidLine {
        line,
        message: format!("invalid number: {value}"),
    })
}

fn parse_integer(value: &str, line: usize) -> Result<i64, ParseError> {
    parse_number(value, line).map(|number| number.round() as i64)
}

fn parse_vehicle_line(line: &str, line_number: usize) -> Result<(usize, Demand), ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 2 {
        return Err(ParseError::InvalidLine {
            line: line_number,
            message: format!("expected vehicle number and capacity, got {} fields", parts.len()),
        });
    }

    let vehicles = parse_integer(parts[0], line_number)?;
    if vehicles <= 0 {
        return Err(ParseError::InvalidLine {
            line: line_number,
            message: format!("invalid vehicle number: {vehicles}"),
        });
    }

    Ok((vehicles as usize, parse_integer(parts[1], line_number)?))
}

fn parse_customer_line(line: &str, line_number: usize) -> Result<CustomerRow, ParseError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 7 {
        return Err(ParseError::InvalidLine {
            line: line_number,
            message: format!("expected 7 customer fields, got {}", parts.len()),
        });
    }

    Ok(CustomerRow {
        id: parts[0].to_string(),
        x: parse_number(parts[1], line_number)?,
        y: parse_number(parts[2], line_number)?,
        demand: parse_integer(parts[3], line_number)?,
        ready: parse_integer(parts[4], line_number)?,
        due: parse_integer(parts[5], line_number)?,
        service: parse_integer(parts[6], line_number)?,
    })
}
