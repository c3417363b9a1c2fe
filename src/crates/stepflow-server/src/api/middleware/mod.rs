//! API middleware layer

pub mod cors;

pub use cors::cors_layer;
