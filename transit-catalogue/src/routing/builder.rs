//! Construction of the routing graph from the catalogue.

use tracing::debug;

use crate::catalogue::Catalogue;
use crate::domain::{RouteId, StopId};
use crate::graph::{DirectedWeightedGraph, Edge, EdgeId, VertexId};

use super::RoutingSettings;

/// Errors from graph construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A route traverses a stop pair with no recorded road distance in
    /// either direction.
    #[error("no road distance recorded between \"{from}\" and \"{to}\"")]
    MissingDistance { from: String, to: String },
}

/// The two vertices contributed by one stop.
///
/// The wait edge runs `arrival -> departure` with the configured wait time;
/// ride edges leave from `departure` and enter at `arrival`. Itinerary
/// queries enter and exit the graph at `arrival`, which is what puts the
/// boarding wait in front of the first ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopVertices {
    pub arrival: VertexId,
    pub departure: VertexId,
}

/// What an edge of the routing graph represents.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeInfo {
    /// Boarding wait at a stop.
    Wait { stop: StopId },
    /// Riding a route past `span` stops, taking `minutes`.
    Ride {
        route: RouteId,
        span: u32,
        minutes: f64,
    },
}

/// The routing graph plus the metadata needed to translate paths back into
/// stop and route names.
///
/// Immutable once built (or restored from a snapshot); the router only ever
/// borrows it.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    graph: DirectedWeightedGraph,
    /// Vertex pair for each stop, indexed by [`StopId`].
    stop_vertices: Vec<StopVertices>,
    /// Owning stop of each vertex, indexed by [`VertexId`].
    vertex_stops: Vec<StopId>,
    /// Metadata for each edge, indexed by [`EdgeId`].
    edge_info: Vec<EdgeInfo>,
}

impl TransitGraph {
    /// Builds the routing graph for `catalogue`.
    ///
    /// Every stop contributes an (arrival, departure) vertex pair joined by a
    /// wait edge. Every route contributes one ride edge per ordered stop pair
    /// along its traversal (forward, plus the reverse direction for linear
    /// routes), so a single edge covers any boarding/alighting combination.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingDistance`] if a route uses a stop pair
    /// with no recorded distance; ingestion is expected to have recorded one
    /// for every consecutive pair in use.
    pub fn build(catalogue: &Catalogue, settings: &RoutingSettings) -> Result<Self, BuildError> {
        let stops = catalogue.stops();
        let mut builder = Self {
            graph: DirectedWeightedGraph::with_vertices(stops.len() * 2),
            stop_vertices: Vec::with_capacity(stops.len()),
            vertex_stops: Vec::with_capacity(stops.len() * 2),
            edge_info: Vec::new(),
        };

        let mut next_vertex: VertexId = 0;
        for (index, _) in stops.iter().enumerate() {
            let stop = StopId(index as u32);
            let vertices = StopVertices {
                arrival: next_vertex,
                departure: next_vertex + 1,
            };
            next_vertex += 2;

            builder.graph.add_edge(Edge {
                from: vertices.arrival,
                to: vertices.departure,
                weight: settings.bus_wait_time,
            });
            builder.edge_info.push(EdgeInfo::Wait { stop });
            builder.vertex_stops.extend([stop, stop]);
            builder.stop_vertices.push(vertices);
        }

        for (index, route) in catalogue.routes().iter().enumerate() {
            let id = RouteId(index as u32);
            builder.link_route(catalogue, id, &route.stops, settings)?;
            if !route.circular {
                let reversed: Vec<StopId> = route.stops.iter().rev().copied().collect();
                builder.link_route(catalogue, id, &reversed, settings)?;
            }
        }

        debug!(
            vertices = builder.graph.vertex_count(),
            edges = builder.graph.edge_count(),
            "routing graph built"
        );

        Ok(builder)
    }

    /// Reassembles a graph restored by the snapshot codec.
    pub fn from_parts(
        graph: DirectedWeightedGraph,
        stop_vertices: Vec<StopVertices>,
        vertex_stops: Vec<StopId>,
        edge_info: Vec<EdgeInfo>,
    ) -> Self {
        Self {
            graph,
            stop_vertices,
            vertex_stops,
            edge_info,
        }
    }

    /// Emits one ride edge per ordered stop pair along one traversal
    /// direction. Travel time accumulates leg by leg, so the edge for
    /// (i, j) costs exactly the sum of the legs between them.
    fn link_route(
        &mut self,
        catalogue: &Catalogue,
        route: RouteId,
        stops: &[StopId],
        settings: &RoutingSettings,
    ) -> Result<(), BuildError> {
        for start in 0..stops.len().saturating_sub(1) {
            let from = self.stop_vertices[stops[start].index()].departure;
            let mut minutes = 0.0;

            for next in start + 1..stops.len() {
                let leg = catalogue
                    .distance_between(stops[next - 1], stops[next])
                    .ok_or_else(|| BuildError::MissingDistance {
                        from: catalogue.stops()[stops[next - 1].index()].name.clone(),
                        to: catalogue.stops()[stops[next].index()].name.clone(),
                    })?;
                minutes += settings.ride_minutes(leg);

                let to = self.stop_vertices[stops[next].index()].arrival;
                self.graph.add_edge(Edge {
                    from,
                    to,
                    weight: minutes,
                });
                self.edge_info.push(EdgeInfo::Ride {
                    route,
                    span: (next - start) as u32,
                    minutes,
                });
            }
        }

        Ok(())
    }

    /// The underlying weighted graph.
    pub fn graph(&self) -> &DirectedWeightedGraph {
        &self.graph
    }

    /// The vertex pair of a stop.
    pub fn stop_vertices(&self, stop: StopId) -> StopVertices {
        self.stop_vertices[stop.index()]
    }

    /// The stop a vertex belongs to.
    pub fn vertex_stop(&self, vertex: VertexId) -> StopId {
        self.vertex_stops[vertex]
    }

    /// Metadata of an edge.
    pub fn edge_info(&self, edge: EdgeId) -> &EdgeInfo {
        &self.edge_info[edge]
    }

    /// All vertex pairs, indexed by stop id.
    pub fn all_stop_vertices(&self) -> &[StopVertices] {
        &self.stop_vertices
    }

    /// All vertex-to-stop assignments, indexed by vertex id.
    pub fn all_vertex_stops(&self) -> &[StopId] {
        &self.vertex_stops
    }

    /// All edge metadata, indexed by edge id.
    pub fn all_edge_info(&self) -> &[EdgeInfo] {
        &self.edge_info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, Stop};

    fn settings() -> RoutingSettings {
        RoutingSettings {
            bus_wait_time: 2.0,
            bus_velocity: 30.0,
        }
    }

    /// A, B, C in a line with 1 km of road per hop.
    fn line_catalogue() -> Catalogue {
        let mut cat = Catalogue::new();
        cat.add_stop(Stop::new("A", Coordinates::new(0.0, 0.0)));
        cat.add_stop(Stop::new("B", Coordinates::new(0.0, 1.0)));
        cat.add_stop(Stop::new("C", Coordinates::new(0.0, 2.0)));
        cat.add_distance("A", "B", 1000).unwrap();
        cat.add_distance("B", "C", 1000).unwrap();
        cat
    }

    #[test]
    fn two_vertices_per_stop() {
        let cat = line_catalogue();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        assert_eq!(graph.graph().vertex_count(), 6);
        for (index, pair) in graph.all_stop_vertices().iter().enumerate() {
            assert_eq!(graph.vertex_stop(pair.arrival), StopId(index as u32));
            assert_eq!(graph.vertex_stop(pair.departure), StopId(index as u32));
        }
    }

    #[test]
    fn wait_edges_run_arrival_to_departure() {
        let cat = line_catalogue();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        // The first three edges are the wait edges, in stop order.
        for stop in 0..3u32 {
            let pair = graph.stop_vertices(StopId(stop));
            let edge = graph.graph().edge(stop as usize);
            assert_eq!(edge.from, pair.arrival);
            assert_eq!(edge.to, pair.departure);
            assert_eq!(edge.weight, 2.0);
            assert_eq!(*graph.edge_info(stop as usize), EdgeInfo::Wait { stop: StopId(stop) });
        }
    }

    #[test]
    fn linear_route_edge_count() {
        let mut cat = line_catalogue();
        cat.add_route("1", false, &["A", "B", "C"]).unwrap();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        // 3 wait edges + K(K-1)/2 ride edges per direction, K = 3.
        assert_eq!(graph.graph().edge_count(), 3 + 3 + 3);
    }

    #[test]
    fn circular_route_edge_count() {
        let mut cat = line_catalogue();
        cat.add_distance("C", "A", 2500).unwrap();
        cat.add_route("14", true, &["A", "B", "C", "A"]).unwrap();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        // One pass only: 3 wait edges + 4*3/2 ride edges.
        assert_eq!(graph.graph().edge_count(), 3 + 6);
    }

    #[test]
    fn ride_weights_accumulate_per_leg() {
        let mut cat = line_catalogue();
        cat.add_route("1", false, &["A", "B", "C"]).unwrap();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        // Forward edges come right after the three wait edges:
        // (A,B) span 1, (A,C) span 2, (B,C) span 1.
        let a = graph.stop_vertices(StopId(0));
        let c = graph.stop_vertices(StopId(2));

        let edge = graph.graph().edge(4);
        assert_eq!(edge.from, a.departure);
        assert_eq!(edge.to, c.arrival);
        assert_eq!(edge.weight, 4.0);
        assert_eq!(
            *graph.edge_info(4),
            EdgeInfo::Ride { route: RouteId(0), span: 2, minutes: 4.0 }
        );
    }

    #[test]
    fn reverse_pass_uses_directional_fallback() {
        let mut cat = line_catalogue();
        // Make the return leg B -> A longer than the outbound one.
        cat.add_distance("B", "A", 2000).unwrap();
        cat.add_route("1", false, &["A", "B"]).unwrap();
        let graph = TransitGraph::build(&cat, &settings()).unwrap();

        // Edges: 2 wait, forward (A,B), reverse (B,A).
        assert_eq!(graph.graph().edge(2).weight, 2.0);
        assert_eq!(graph.graph().edge(3).weight, 4.0);
    }

    #[test]
    fn missing_distance_is_reported() {
        let mut cat = Catalogue::new();
        cat.add_stop(Stop::new("A", Coordinates::new(0.0, 0.0)));
        cat.add_stop(Stop::new("B", Coordinates::new(0.0, 1.0)));
        cat.add_route("1", false, &["A", "B"]).unwrap();

        let err = TransitGraph::build(&cat, &settings()).unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingDistance { from: "A".into(), to: "B".into() }
        );
    }
}
