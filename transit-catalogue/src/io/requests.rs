//! Request documents and their application to the store.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::catalogue::{Catalogue, CatalogueError};
use crate::domain::{Coordinates, Stop};
use crate::render::RenderSettings;
use crate::routing::RoutingSettings;

/// A stop declaration from `base_requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Road distances to neighboring stops, in meters.
    #[serde(default)]
    pub road_distances: BTreeMap<String, u32>,
}

/// A route declaration from `base_requests`.
#[derive(Debug, Clone, Deserialize)]
pub struct BusRequest {
    pub name: String,
    pub stops: Vec<String>,
    pub is_roundtrip: bool,
}

/// One entry of `base_requests`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop(StopRequest),
    Bus(BusRequest),
}

/// One entry of `stat_requests`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum StatRequest {
    /// Route metrics by name.
    Bus { id: i64, name: String },
    /// Routes serving a stop.
    Stop { id: i64, name: String },
    /// Fastest itinerary between two stops.
    Route { id: i64, from: String, to: String },
}

/// The `serialization_settings` block naming the snapshot file.
#[derive(Debug, Clone, Deserialize)]
pub struct SerializationSettings {
    pub file: PathBuf,
}

/// The full build-phase input document.
#[derive(Debug, Deserialize)]
pub struct BuildDocument {
    pub base_requests: Vec<BaseRequest>,
    pub routing_settings: RoutingSettings,
    pub render_settings: RenderSettings,
    pub serialization_settings: SerializationSettings,
}

/// The full serve-phase input document.
#[derive(Debug, Deserialize)]
pub struct ServeDocument {
    pub serialization_settings: SerializationSettings,
    pub stat_requests: Vec<StatRequest>,
}

/// Populates a catalogue from `base_requests`.
///
/// All stops are added first, then every road distance, then the routes, so
/// declaration order inside the document does not matter.
///
/// # Errors
///
/// Returns the store's lookup error when a distance or route references a
/// stop that is declared nowhere in the document; referential integrity is
/// checked here, at ingestion, and nowhere later.
pub fn build_catalogue(requests: &[BaseRequest]) -> Result<Catalogue, CatalogueError> {
    let mut catalogue = Catalogue::new();

    for request in requests {
        if let BaseRequest::Stop(stop) = request {
            catalogue.add_stop(Stop::new(
                &stop.name,
                Coordinates::new(stop.latitude, stop.longitude),
            ));
        }
    }

    for request in requests {
        if let BaseRequest::Stop(stop) = request {
            for (to, &meters) in &stop.road_distances {
                catalogue.add_distance(&stop.name, to, meters)?;
            }
        }
    }

    for request in requests {
        if let BaseRequest::Bus(bus) = request {
            catalogue.add_route(&bus.name, bus.is_roundtrip, &bus.stops)?;
        }
    }

    debug!(
        stops = catalogue.stops().len(),
        routes = catalogue.routes().len(),
        "catalogue populated"
    );
    Ok(catalogue)
}
