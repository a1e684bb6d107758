pub mod parse_error;
pub mod parser;
pub mod solomon;
pub mod solution;
