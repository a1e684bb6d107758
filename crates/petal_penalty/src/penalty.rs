pub mod evaluation_statistics;
pub mod evaluator;
pub mod full_scan;
pub mod incremental;
pub mod penalty_outcome;
pub mod penalty_params;
pub mod route_cache;
pub mod route_scanner;
pub mod touched_routes;
