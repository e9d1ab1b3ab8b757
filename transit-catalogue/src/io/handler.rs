//! Dispatch of stat requests onto the core.

use crate::catalogue::Catalogue;
use crate::routing::{Router, TransitGraph};

use super::{StatRequest, StatResponse};

/// Answers stat requests against a built (or restored) network.
///
/// Borrows the store and graph read-only; queries have no shared mutable
/// state, so one handler can serve any number of requests.
pub struct QueryHandler<'a> {
    catalogue: &'a Catalogue,
    router: Router<'a>,
}

impl<'a> QueryHandler<'a> {
    /// Creates a handler over the given catalogue and routing graph.
    pub fn new(catalogue: &'a Catalogue, graph: &'a TransitGraph) -> Self {
        Self {
            catalogue,
            router: Router::new(catalogue, graph),
        }
    }

    /// Answers a single stat request. Misses become the uniform
    /// not-found reply, never an error.
    pub fn handle(&self, request: &StatRequest) -> StatResponse {
        match request {
            StatRequest::Bus { id, name } => match self.catalogue.route_stats(name) {
                Some(stats) => StatResponse::route_metrics(*id, &stats),
                None => StatResponse::not_found(*id),
            },
            StatRequest::Stop { id, name } => match self.catalogue.routes_through_stop(name) {
                Some(buses) => StatResponse::stop_routes(
                    *id,
                    buses.into_iter().map(str::to_string).collect(),
                ),
                None => StatResponse::not_found(*id),
            },
            StatRequest::Route { id, from, to } => match self.router.find_route(from, to) {
                Some(itinerary) => StatResponse::itinerary(*id, itinerary),
                None => StatResponse::not_found(*id),
            },
        }
    }

    /// Answers every request in document order.
    pub fn handle_all(&self, requests: &[StatRequest]) -> Vec<StatResponse> {
        requests.iter().map(|request| self.handle(request)).collect()
    }
}
