//! Domain types for the transit network.
//!
//! This module contains the core model types: stops, routes, and the
//! geographic primitives they are built from. Entities are immutable once
//! created and are referenced by stable arena ids rather than by name
//! wherever they cross module boundaries.

mod geo;
mod route;
mod stop;

pub use geo::Coordinates;
pub use route::{Route, RouteId};
pub use stop::{Stop, StopId};
