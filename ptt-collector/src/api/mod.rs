//! HTTP API handlers for ptt-collector

pub mod collect;
pub mod health;
pub mod locations;
pub mod times;

pub use collect::collect_routes;
pub use health::health_routes;
pub use locations::location_routes;
pub use times::times_routes;
