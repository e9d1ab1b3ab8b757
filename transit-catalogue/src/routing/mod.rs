//! Routing over the transit network.
//!
//! [`TransitGraph`] turns the catalogue into a directed weighted graph in
//! which every stop is a wait-edge-linked vertex pair and every reachable
//! (board, alight) combination on a route is a single ride edge. [`Router`]
//! answers point-to-point itinerary queries over that graph.

mod builder;
mod config;
mod router;

pub use builder::{BuildError, EdgeInfo, StopVertices, TransitGraph};
pub use config::RoutingSettings;
pub use router::{Itinerary, Router, Segment};
