use std::path::Path;

use crate::{parsers::parse_error::ParseError, problem::routing_instance::RoutingInstance};

pub trait DatasetParser {
    fn parse<P: AsRef<Path>>(&self, file: P) -> Result<RoutingInstance, ParseError>;
}
