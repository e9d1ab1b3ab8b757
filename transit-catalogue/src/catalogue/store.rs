//! Insertion-ordered store of stops, routes, and distances.

use std::collections::{BTreeSet, HashMap};

use crate::domain::{Route, RouteId, Stop, StopId};

/// Errors from populating the catalogue.
///
/// These only occur during ingestion; query methods report absence through
/// return values instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueError {
    /// A distance or route referenced a stop that was never added.
    #[error("unknown stop \"{0}\"")]
    UnknownStop(String),
}

/// Metrics derived from one route, computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStats {
    /// Stops visited over a full traversal (forward and back for linear routes).
    pub stop_count: usize,
    /// Distinct stops on the route.
    pub unique_stops: usize,
    /// Road distance traveled in meters, from the recorded distance table.
    pub length_meters: u64,
    /// Ratio of road distance to great-circle distance, or `-1.0` when the
    /// great-circle distance is zero (degenerate single-stop routes).
    pub curvature: f64,
}

/// The network store: stops, routes, and directed stop-to-stop distances.
///
/// Entities live in insertion-ordered arenas and are addressed by
/// [`StopId`]/[`RouteId`]; the ids are dense indices into those arenas, which
/// makes them directly usable as the snapshot format's table indices.
///
/// Distances are directed: a lookup for `(a, b)` falls back to `(b, a)` when
/// only the opposite direction was recorded.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    stops: Vec<Stop>,
    routes: Vec<Route>,
    stop_ids: HashMap<String, StopId>,
    route_ids: HashMap<String, RouteId>,
    distances: HashMap<(StopId, StopId), u32>,
    /// Routes serving each stop, parallel to `stops`.
    routes_by_stop: Vec<BTreeSet<RouteId>>,
}

impl Catalogue {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stop and returns its id.
    ///
    /// Stop names are expected to be unique; re-adding a name makes the new
    /// stop the one found by name lookups.
    pub fn add_stop(&mut self, stop: Stop) -> StopId {
        let id = StopId(self.stops.len() as u32);
        self.stop_ids.insert(stop.name.clone(), id);
        self.stops.push(stop);
        self.routes_by_stop.push(BTreeSet::new());
        id
    }

    /// Records the road distance in meters from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownStop`] if either stop has not been
    /// added yet; ingestion adds all stops before any distance.
    pub fn add_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<(), CatalogueError> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        self.distances.insert((from, to), meters);
        Ok(())
    }

    /// Adds a route over the named stops and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownStop`] if any stop name is unknown.
    pub fn add_route<S: AsRef<str>>(
        &mut self,
        name: &str,
        circular: bool,
        stops: &[S],
    ) -> Result<RouteId, CatalogueError> {
        let stop_ids = stops
            .iter()
            .map(|s| self.resolve(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let id = RouteId(self.routes.len() as u32);
        for &stop in &stop_ids {
            self.routes_by_stop[stop.index()].insert(id);
        }
        self.route_ids.insert(name.to_string(), id);
        self.routes.push(Route::new(name, circular, stop_ids));
        Ok(id)
    }

    /// Looks up a stop by name.
    pub fn stop(&self, name: &str) -> Option<&Stop> {
        self.stop_id(name).map(|id| &self.stops[id.index()])
    }

    /// Looks up a route by name.
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.route_ids.get(name).map(|id| &self.routes[id.index()])
    }

    /// Returns the id of a stop by name.
    pub fn stop_id(&self, name: &str) -> Option<StopId> {
        self.stop_ids.get(name).copied()
    }

    /// All stops in insertion order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// All routes in insertion order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Iterates the recorded directed distances in unspecified order.
    pub fn distances(&self) -> impl Iterator<Item = (StopId, StopId, u32)> + '_ {
        self.distances
            .iter()
            .map(|(&(from, to), &meters)| (from, to, meters))
    }

    /// Names of the routes serving a stop, sorted.
    ///
    /// Returns `None` when the stop itself is unknown, and an empty list when
    /// the stop exists but no route serves it, so callers can render the two
    /// cases differently.
    pub fn routes_through_stop(&self, name: &str) -> Option<Vec<&str>> {
        let id = self.stop_id(name)?;
        let mut names: Vec<&str> = self.routes_by_stop[id.index()]
            .iter()
            .map(|route| self.routes[route.index()].name.as_str())
            .collect();
        names.sort_unstable();
        Some(names)
    }

    /// Road distance in meters from `from` to `to`, trying both directions.
    pub fn distance_between(&self, from: StopId, to: StopId) -> Option<u32> {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
    }

    /// Computes the derived metrics for a route, or `None` if it is unknown.
    pub fn route_stats(&self, name: &str) -> Option<RouteStats> {
        let route = self.route(name)?;

        let length_meters = self.traveled_length(route);
        let geo_meters = self.geographic_length(route);

        let curvature = if geo_meters == 0.0 {
            -1.0
        } else {
            length_meters as f64 / geo_meters
        };

        Some(RouteStats {
            stop_count: route.total_stop_count(),
            unique_stops: route.unique_stop_count(),
            length_meters,
            curvature,
        })
    }

    /// Road distance of one full traversal, in meters.
    ///
    /// Linear routes add the return leg per segment; each leg prefers the
    /// distance recorded for its own direction of travel.
    fn traveled_length(&self, route: &Route) -> u64 {
        let mut meters = 0u64;

        for pair in route.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if let Some(d) = self.distance_between(from, to) {
                meters += u64::from(d);
            }
            if !route.circular {
                if let Some(d) = self.distance_between(to, from) {
                    meters += u64::from(d);
                }
            }
        }

        meters
    }

    /// Great-circle length of one full traversal, in meters.
    fn geographic_length(&self, route: &Route) -> f64 {
        let mut meters = 0.0;

        for pair in route.stops.windows(2) {
            let from = &self.stops[pair[0].index()];
            let to = &self.stops[pair[1].index()];
            meters += from.position.distance_to(&to.position);
        }

        if route.circular { meters } else { meters * 2.0 }
    }

    fn resolve(&self, name: &str) -> Result<StopId, CatalogueError> {
        self.stop_id(name)
            .ok_or_else(|| CatalogueError::UnknownStop(name.to_string()))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::Coordinates;
    use proptest::prelude::*;

    proptest! {
        /// A distance recorded in one direction only is readable both ways.
        #[test]
        fn directional_fallback(meters in 1u32..2_000_000) {
            let mut cat = Catalogue::new();
            let a = cat.add_stop(Stop::new("A", Coordinates::new(55.0, 37.0)));
            let b = cat.add_stop(Stop::new("B", Coordinates::new(55.1, 37.1)));
            cat.add_distance("A", "B", meters).unwrap();

            prop_assert_eq!(cat.distance_between(a, b), Some(meters));
            prop_assert_eq!(cat.distance_between(b, a), Some(meters));
        }

        /// Road legs at least as long as the straight line keep curvature >= 1.
        #[test]
        fn curvature_at_least_one(extra in 0u32..10_000) {
            let mut cat = Catalogue::new();
            let a = Coordinates::new(55.0, 37.0);
            let b = Coordinates::new(55.05, 37.0);
            cat.add_stop(Stop::new("A", a));
            cat.add_stop(Stop::new("B", b));

            let straight = a.distance_to(&b).ceil() as u32;
            cat.add_distance("A", "B", straight + extra).unwrap();
            cat.add_route("1", false, &["A", "B"]).unwrap();

            let stats = cat.route_stats("1").unwrap();
            prop_assert!(stats.curvature >= 1.0 - 1e-9);
        }
    }
}
