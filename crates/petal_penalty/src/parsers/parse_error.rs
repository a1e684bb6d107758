use thiserror::Error;

use crate::{problem::routing_instance::InstanceError, tour::arena_tour::TourError};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing {0} section")]
    MissingSection(&'static str),

    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },

    #[error("unknown customer {0}")]
    UnknownCustomer(String),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Tour(#[from] TourError),
}
