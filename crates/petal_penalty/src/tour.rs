pub mod arena_tour;
pub mod move_log;
pub mod random_move;
pub mod tour_oracle;
