//! Response payloads for stat requests.

use serde::Serialize;

use crate::catalogue::RouteStats;
use crate::routing::{Itinerary, Segment};

/// One step of an itinerary reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ItineraryItem {
    Wait { stop_name: String, time: f64 },
    Bus { bus: String, span_count: u32, time: f64 },
}

impl From<Segment> for ItineraryItem {
    fn from(segment: Segment) -> Self {
        match segment {
            Segment::Wait { stop, minutes } => ItineraryItem::Wait {
                stop_name: stop,
                time: minutes,
            },
            Segment::Ride { route, span, minutes } => ItineraryItem::Bus {
                bus: route,
                span_count: span,
                time: minutes,
            },
        }
    }
}

/// Reply to one stat request.
///
/// Every query that misses (unknown route, unknown stop, unreachable pair)
/// uses the same `NotFound` payload, so the formatting layer never needs to
/// distinguish why a lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatResponse {
    NotFound {
        request_id: i64,
        error_message: String,
    },
    RouteMetrics {
        request_id: i64,
        curvature: f64,
        route_length: u64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    StopRoutes {
        request_id: i64,
        buses: Vec<String>,
    },
    Itinerary {
        request_id: i64,
        total_time: f64,
        items: Vec<ItineraryItem>,
    },
}

impl StatResponse {
    /// The uniform miss reply.
    pub fn not_found(request_id: i64) -> Self {
        StatResponse::NotFound {
            request_id,
            error_message: "not found".to_string(),
        }
    }

    /// Reply for a route-metrics request.
    pub fn route_metrics(request_id: i64, stats: &RouteStats) -> Self {
        StatResponse::RouteMetrics {
            request_id,
            curvature: stats.curvature,
            route_length: stats.length_meters,
            stop_count: stats.stop_count,
            unique_stop_count: stats.unique_stops,
        }
    }

    /// Reply for a stop-routes request.
    pub fn stop_routes(request_id: i64, buses: Vec<String>) -> Self {
        StatResponse::StopRoutes { request_id, buses }
    }

    /// Reply for an itinerary request.
    pub fn itinerary(request_id: i64, itinerary: Itinerary) -> Self {
        StatResponse::Itinerary {
            request_id,
            total_time: itinerary.total_minutes,
            items: itinerary.segments.into_iter().map(ItineraryItem::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn not_found_payload() {
        let value = serde_json::to_value(StatResponse::not_found(7)).unwrap();
        assert_eq!(
            value,
            json!({"request_id": 7, "error_message": "not found"})
        );
    }

    #[test]
    fn route_metrics_payload() {
        let stats = RouteStats {
            stop_count: 5,
            unique_stops: 3,
            length_meters: 5950,
            curvature: 1.36,
        };

        let value = serde_json::to_value(StatResponse::route_metrics(12, &stats)).unwrap();
        assert_eq!(
            value,
            json!({
                "request_id": 12,
                "curvature": 1.36,
                "route_length": 5950,
                "stop_count": 5,
                "unique_stop_count": 3
            })
        );
    }

    #[test]
    fn stop_routes_payload_keeps_order() {
        let response = StatResponse::stop_routes(3, vec!["14".into(), "9".into()]);
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value, json!({"request_id": 3, "buses": ["14", "9"]}));
    }

    #[test]
    fn itinerary_payload_tags_item_types() {
        let itinerary = Itinerary {
            total_minutes: 6.0,
            segments: vec![
                Segment::Wait { stop: "A".into(), minutes: 2.0 },
                Segment::Ride { route: "1".into(), span: 2, minutes: 4.0 },
            ],
        };

        let value = serde_json::to_value(StatResponse::itinerary(5, itinerary)).unwrap();
        assert_eq!(
            value,
            json!({
                "request_id": 5,
                "total_time": 6.0,
                "items": [
                    {"type": "Wait", "stop_name": "A", "time": 2.0},
                    {"type": "Bus", "bus": "1", "span_count": 2, "time": 4.0}
                ]
            })
        );
    }
}
