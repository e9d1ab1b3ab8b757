//! Point-to-point itinerary queries.

use tracing::trace;

use crate::catalogue::Catalogue;
use crate::graph::shortest_path;

use super::{EdgeInfo, TransitGraph};

/// One step of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Waiting to board at a stop.
    Wait { stop: String, minutes: f64 },
    /// Riding a route past `span` stops.
    Ride {
        route: String,
        span: u32,
        minutes: f64,
    },
}

/// A complete itinerary between two stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Total travel time in minutes.
    pub total_minutes: f64,
    /// Wait and ride segments in travel order.
    pub segments: Vec<Segment>,
}

/// Answers shortest-itinerary queries over a built [`TransitGraph`].
///
/// Holds only shared references; queries never mutate the graph or the
/// catalogue, so a router may be used from multiple threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    catalogue: &'a Catalogue,
    graph: &'a TransitGraph,
}

impl<'a> Router<'a> {
    /// Creates a router over the given catalogue and graph.
    pub fn new(catalogue: &'a Catalogue, graph: &'a TransitGraph) -> Self {
        Self { catalogue, graph }
    }

    /// Finds the fastest itinerary from `from` to `to`.
    ///
    /// Returns `None` when either stop is unknown or no connection exists;
    /// absence is an ordinary query outcome, not an error.
    pub fn find_route(&self, from: &str, to: &str) -> Option<Itinerary> {
        let from_vertex = self
            .graph
            .stop_vertices(self.catalogue.stop_id(from)?)
            .arrival;
        let to_vertex = self
            .graph
            .stop_vertices(self.catalogue.stop_id(to)?)
            .arrival;

        let path = shortest_path(self.graph.graph(), from_vertex, to_vertex)?;
        trace!(from, to, minutes = path.total_weight, "itinerary found");

        let segments = path
            .edges
            .iter()
            .map(|&edge_id| {
                let edge = self.graph.graph().edge(edge_id);
                let from_stop = self.graph.vertex_stop(edge.from);
                let to_stop = self.graph.vertex_stop(edge.to);

                if from_stop == to_stop {
                    Segment::Wait {
                        stop: self.catalogue.stops()[from_stop.index()].name.clone(),
                        minutes: edge.weight,
                    }
                } else {
                    match *self.graph.edge_info(edge_id) {
                        EdgeInfo::Ride { route, span, minutes } => Segment::Ride {
                            route: self.catalogue.routes()[route.index()].name.clone(),
                            span,
                            minutes,
                        },
                        // A wait edge never joins two different stops.
                        EdgeInfo::Wait { .. } => unreachable!("wait edge between distinct stops"),
                    }
                }
            })
            .collect();

        Some(Itinerary {
            total_minutes: path.total_weight,
            segments,
        })
    }
}
