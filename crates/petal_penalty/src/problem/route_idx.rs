use crate::{define_index_newtype, penalty::route_cache::RouteRecord};

// A route is identified by the vehicle driving it; route `k` opens at depot marker `k`.
define_index_newtype!(RouteIdx, RouteRecord);
