//! Binary snapshot of the built network.
//!
//! The build phase captures the catalogue contents, the routing graph with
//! its metadata, and the render settings into one [`Snapshot`], encoded with
//! bincode. The serve phase decodes it and reconstructs equivalent in-memory
//! structures without re-parsing the original input.
//!
//! Stops are written as an implicit-index table; routes and distances refer
//! to stops by index rather than by name to keep the payload compact. Vertex
//! and edge ids are preserved exactly: the router's paths are sequences of
//! edge ids, and they must resolve to the same metadata after reload.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalogue::{Catalogue, CatalogueError};
use crate::domain::{Coordinates, RouteId, Stop, StopId};
use crate::graph::{DirectedWeightedGraph, Edge};
use crate::render::{Color, RenderSettings};
use crate::routing::{EdgeInfo, StopVertices, TransitGraph};

/// Errors from snapshot encoding, decoding, and file handling.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("snapshot decoding failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// A table in the payload referenced a stop index past the stop table.
    #[error("stop index {index} out of range (stop table has {stops} entries)")]
    StopIndexOutOfRange { index: u32, stops: usize },

    /// The graph block is internally inconsistent.
    #[error("malformed graph block: {0}")]
    MalformedGraph(&'static str),

    /// Rebuilding the catalogue from decoded tables failed.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StopRecord {
    name: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RouteRecord {
    name: String,
    circular: bool,
    /// Indices into the stop table.
    stops: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct DistanceRecord {
    from: u32,
    to: u32,
    meters: u32,
}

/// Tagged twin of [`Color`]; the wire format is not self-describing, so the
/// untagged JSON representation cannot be reused here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ColorRecord {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl From<&Color> for ColorRecord {
    fn from(color: &Color) -> Self {
        match *color {
            Color::Named(ref name) => ColorRecord::Named(name.clone()),
            Color::Rgb(r, g, b) => ColorRecord::Rgb(r, g, b),
            Color::Rgba(r, g, b, a) => ColorRecord::Rgba(r, g, b, a),
        }
    }
}

impl From<ColorRecord> for Color {
    fn from(record: ColorRecord) -> Self {
        match record {
            ColorRecord::Named(name) => Color::Named(name),
            ColorRecord::Rgb(r, g, b) => Color::Rgb(r, g, b),
            ColorRecord::Rgba(r, g, b, a) => Color::Rgba(r, g, b, a),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RenderRecord {
    width: f64,
    height: f64,
    padding: f64,
    line_width: f64,
    stop_radius: f64,
    bus_label_font_size: u32,
    bus_label_offset: (f64, f64),
    stop_label_font_size: u32,
    stop_label_offset: (f64, f64),
    underlayer_color: ColorRecord,
    underlayer_width: f64,
    color_palette: Vec<ColorRecord>,
}

impl From<&RenderSettings> for RenderRecord {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            padding: settings.padding,
            line_width: settings.line_width,
            stop_radius: settings.stop_radius,
            bus_label_font_size: settings.bus_label_font_size,
            bus_label_offset: settings.bus_label_offset,
            stop_label_font_size: settings.stop_label_font_size,
            stop_label_offset: settings.stop_label_offset,
            underlayer_color: ColorRecord::from(&settings.underlayer_color),
            underlayer_width: settings.underlayer_width,
            color_palette: settings.color_palette.iter().map(ColorRecord::from).collect(),
        }
    }
}

impl From<RenderRecord> for RenderSettings {
    fn from(record: RenderRecord) -> Self {
        Self {
            width: record.width,
            height: record.height,
            padding: record.padding,
            line_width: record.line_width,
            stop_radius: record.stop_radius,
            bus_label_font_size: record.bus_label_font_size,
            bus_label_offset: record.bus_label_offset,
            stop_label_font_size: record.stop_label_font_size,
            stop_label_offset: record.stop_label_offset,
            underlayer_color: record.underlayer_color.into(),
            underlayer_width: record.underlayer_width,
            color_palette: record.color_palette.into_iter().map(Color::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct EdgeRecord {
    from: u64,
    to: u64,
    weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct StopVerticesRecord {
    arrival: u64,
    departure: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum EdgeInfoRecord {
    Wait { stop: u32 },
    Ride { route: u32, span: u32, minutes: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GraphRecord {
    edges: Vec<EdgeRecord>,
    /// Outgoing edge ids per vertex; its length is the vertex count.
    incidence: Vec<Vec<u64>>,
    stop_vertices: Vec<StopVerticesRecord>,
    vertex_stops: Vec<u32>,
    edge_info: Vec<EdgeInfoRecord>,
}

/// Everything the serve phase needs, in one encodable container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    stops: Vec<StopRecord>,
    routes: Vec<RouteRecord>,
    distances: Vec<DistanceRecord>,
    render: RenderRecord,
    graph: GraphRecord,
}

impl Snapshot {
    /// Captures the full rebuildable state of a built network.
    pub fn capture(
        catalogue: &Catalogue,
        graph: &TransitGraph,
        render: &RenderSettings,
    ) -> Self {
        let stops = catalogue
            .stops()
            .iter()
            .map(|stop| StopRecord {
                name: stop.name.clone(),
                lat: stop.position.lat,
                lng: stop.position.lng,
            })
            .collect();

        let routes = catalogue
            .routes()
            .iter()
            .map(|route| RouteRecord {
                name: route.name.clone(),
                circular: route.circular,
                stops: route.stops.iter().map(|stop| stop.0).collect(),
            })
            .collect();

        // The distance table is a hash map; write it in key order so the
        // same network always produces the same bytes.
        let mut distances: Vec<DistanceRecord> = catalogue
            .distances()
            .map(|(from, to, meters)| DistanceRecord {
                from: from.0,
                to: to.0,
                meters,
            })
            .collect();
        distances.sort_unstable_by_key(|d| (d.from, d.to));

        let graph_record = GraphRecord {
            edges: graph
                .graph()
                .edges()
                .iter()
                .map(|edge| EdgeRecord {
                    from: edge.from as u64,
                    to: edge.to as u64,
                    weight: edge.weight,
                })
                .collect(),
            incidence: graph
                .graph()
                .incidence_lists()
                .iter()
                .map(|list| list.iter().map(|&id| id as u64).collect())
                .collect(),
            stop_vertices: graph
                .all_stop_vertices()
                .iter()
                .map(|pair| StopVerticesRecord {
                    arrival: pair.arrival as u64,
                    departure: pair.departure as u64,
                })
                .collect(),
            vertex_stops: graph.all_vertex_stops().iter().map(|stop| stop.0).collect(),
            edge_info: graph
                .all_edge_info()
                .iter()
                .map(|info| match *info {
                    EdgeInfo::Wait { stop } => EdgeInfoRecord::Wait { stop: stop.0 },
                    EdgeInfo::Ride { route, span, minutes } => EdgeInfoRecord::Ride {
                        route: route.0,
                        span,
                        minutes,
                    },
                })
                .collect(),
        };

        Self {
            stops,
            routes,
            distances,
            render: RenderRecord::from(render),
            graph: graph_record,
        }
    }

    /// Rebuilds the in-memory structures this snapshot was captured from.
    ///
    /// Stop order, route order, and vertex/edge ids are reproduced exactly.
    ///
    /// # Errors
    ///
    /// Fails when any table references an out-of-range index; a snapshot that
    /// does not validate is unusable and the serve phase must abort.
    pub fn restore(self) -> Result<(Catalogue, TransitGraph, RenderSettings), SnapshotError> {
        self.validate()?;

        let mut catalogue = Catalogue::new();
        for stop in &self.stops {
            catalogue.add_stop(Stop::new(&stop.name, Coordinates::new(stop.lat, stop.lng)));
        }
        for distance in &self.distances {
            catalogue.add_distance(
                &self.stops[distance.from as usize].name,
                &self.stops[distance.to as usize].name,
                distance.meters,
            )?;
        }
        for route in &self.routes {
            let stop_names: Vec<&str> = route
                .stops
                .iter()
                .map(|&index| self.stops[index as usize].name.as_str())
                .collect();
            catalogue.add_route(&route.name, route.circular, &stop_names)?;
        }

        let edges = self
            .graph
            .edges
            .iter()
            .map(|edge| Edge {
                from: edge.from as usize,
                to: edge.to as usize,
                weight: edge.weight,
            })
            .collect();
        let incidence = self
            .graph
            .incidence
            .iter()
            .map(|list| list.iter().map(|&id| id as usize).collect())
            .collect();

        let graph = TransitGraph::from_parts(
            DirectedWeightedGraph::from_parts(edges, incidence),
            self.graph
                .stop_vertices
                .iter()
                .map(|pair| StopVertices {
                    arrival: pair.arrival as usize,
                    departure: pair.departure as usize,
                })
                .collect(),
            self.graph.vertex_stops.iter().map(|&stop| StopId(stop)).collect(),
            self.graph
                .edge_info
                .iter()
                .map(|info| match *info {
                    EdgeInfoRecord::Wait { stop } => EdgeInfo::Wait { stop: StopId(stop) },
                    EdgeInfoRecord::Ride { route, span, minutes } => EdgeInfo::Ride {
                        route: RouteId(route),
                        span,
                        minutes,
                    },
                })
                .collect(),
        );

        Ok((catalogue, graph, self.render.into()))
    }

    /// Encodes the snapshot into one binary blob.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    /// Decodes a snapshot from bytes produced by [`Snapshot::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let (snapshot, consumed): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        if consumed != bytes.len() {
            return Err(SnapshotError::MalformedGraph("trailing bytes after payload"));
        }
        Ok(snapshot)
    }

    /// Writes the encoded snapshot to `path`, going through a temporary file
    /// so a crash mid-write never leaves a truncated snapshot behind.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let bytes = self.encode()?;

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");

        let file = File::create(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    /// Reads and decodes a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let snapshot = Self::decode(&bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "snapshot loaded");
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        let stops = self.stops.len();
        let check_stop = |index: u32| {
            if (index as usize) < stops {
                Ok(())
            } else {
                Err(SnapshotError::StopIndexOutOfRange { index, stops })
            }
        };

        for route in &self.routes {
            for &index in &route.stops {
                check_stop(index)?;
            }
        }
        for distance in &self.distances {
            check_stop(distance.from)?;
            check_stop(distance.to)?;
        }

        let vertices = self.graph.incidence.len();
        let edges = self.graph.edges.len();

        for edge in &self.graph.edges {
            if edge.from as usize >= vertices || edge.to as usize >= vertices {
                return Err(SnapshotError::MalformedGraph("edge endpoint out of range"));
            }
        }
        for list in &self.graph.incidence {
            for &id in list {
                if id as usize >= edges {
                    return Err(SnapshotError::MalformedGraph("incidence edge id out of range"));
                }
            }
        }
        if self.graph.vertex_stops.len() != vertices {
            return Err(SnapshotError::MalformedGraph("vertex-stop map length mismatch"));
        }
        for &stop in &self.graph.vertex_stops {
            check_stop(stop)?;
        }
        if self.graph.stop_vertices.len() != stops {
            return Err(SnapshotError::MalformedGraph("stop-vertex map length mismatch"));
        }
        for pair in &self.graph.stop_vertices {
            if pair.arrival as usize >= vertices || pair.departure as usize >= vertices {
                return Err(SnapshotError::MalformedGraph("stop vertex out of range"));
            }
        }
        if self.graph.edge_info.len() != edges {
            return Err(SnapshotError::MalformedGraph("edge metadata length mismatch"));
        }
        for info in &self.graph.edge_info {
            match *info {
                EdgeInfoRecord::Wait { stop } => check_stop(stop)?,
                EdgeInfoRecord::Ride { route, .. } => {
                    if route as usize >= self.routes.len() {
                        return Err(SnapshotError::MalformedGraph("ride route index out of range"));
                    }
                }
            }
        }

        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn color_record() -> impl Strategy<Value = ColorRecord> {
        prop_oneof![
            "[a-z]{1,8}".prop_map(ColorRecord::Named),
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| ColorRecord::Rgb(r, g, b)),
            (any::<(u8, u8, u8)>(), 0.0..1.0f64)
                .prop_map(|((r, g, b), a)| ColorRecord::Rgba(r, g, b, a)),
        ]
    }

    fn snapshot() -> impl Strategy<Value = Snapshot> {
        (
            proptest::collection::vec(("[A-Z][a-z]{0,6}", -85.0..85.0f64, -180.0..180.0f64), 1..6),
            color_record(),
            proptest::collection::vec(color_record(), 0..4),
        )
            .prop_map(|(raw_stops, underlayer, palette)| {
                let stops: Vec<StopRecord> = raw_stops
                    .into_iter()
                    .map(|(name, lat, lng)| StopRecord { name, lat, lng })
                    .collect();

                // A route over every stop and a distance chain along it.
                let indices: Vec<u32> = (0..stops.len() as u32).collect();
                let distances = indices
                    .windows(2)
                    .map(|pair| DistanceRecord { from: pair[0], to: pair[1], meters: 1000 })
                    .collect();

                let render = RenderRecord {
                    underlayer_color: underlayer,
                    color_palette: palette,
                    ..RenderRecord::from(&RenderSettings::default())
                };

                Snapshot {
                    routes: vec![RouteRecord {
                        name: "r".into(),
                        circular: false,
                        stops: indices,
                    }],
                    stops,
                    distances,
                    render,
                    graph: GraphRecord {
                        edges: vec![],
                        incidence: vec![],
                        stop_vertices: vec![],
                        vertex_stops: vec![],
                        edge_info: vec![],
                    },
                }
            })
    }

    proptest! {
        /// Encoding is lossless for any well-formed snapshot.
        #[test]
        fn encode_decode_identity(snapshot in snapshot()) {
            let bytes = snapshot.encode().unwrap();
            prop_assert_eq!(Snapshot::decode(&bytes).unwrap(), snapshot);
        }
    }
}
