pub mod parsers;
pub mod penalty;
pub mod problem;
pub mod tour;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
