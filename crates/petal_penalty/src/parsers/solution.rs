use std::path::Path;

use fxhash::FxHashMap;

use crate::{
    parsers::parse_error::ParseError,
    problem::{routing_instance::RoutingInstance, stop::StopIdx},
    tour::arena_tour::ArenaTour,
};

/// Reads `Route #k: c1 c2 ...` lines, customers named by their external id.
/// Other lines are ignored and vehicles without a listed route stay empty.
pub fn parse_routes(
    instance: &RoutingInstance,
    text: &str,
) -> Result<Vec<Vec<StopIdx>>, ParseError> {
    let ids: FxHashMap<&str, StopIdx> = instance
        .customers()
        .map(|stop| (instance.stop(stop).external_id(), stop))
        .collect();

    let mut routes = vec![Vec::new(); instance.vehicles()];
    let mut route = 0;

    for (index, line) in text.lines().enumerate() {
        let Some((label, stops)) = line.split_once(':') else {
            continue;
        };
        if !label.trim().to_lowercase().starts_with("route") {
            continue;
        }

        if route >= instance.vehicles() {
            return Err(ParseError::InvalidLine {
                line: index + 1,
                message: format!("more routes than the {} available vehicles", instance.vehicles()),
            });
        }

        for id in stops.split_whitespace() {
            let stop = ids
                .get(id)
                .ok_or_else(|| ParseError::UnknownCustomer(id.to_string()))?;
            routes[route].push(*stop);
        }
        route += 1;
    }

    Ok(routes)
}

pub fn read_tour<P: AsRef<Path>>(instance: &RoutingInstance, file: P) -> Result<ArenaTour, ParseError> {
    let content = std::fs::read_to_string(file)?;
    let routes = parse_routes(instance, &content)?;
    Ok(ArenaTour::from_routes(instance, &routes)?)
}
