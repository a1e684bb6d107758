pub mod route_idx;
pub mod routing_instance;
pub mod stop;
pub mod time_window;
pub mod travel_cost_matrix;
