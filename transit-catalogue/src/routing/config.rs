//! Routing parameters.

use serde::Deserialize;

/// Parameters governing wait- and ride-edge weights.
///
/// Parsed from the build document's `routing_settings` block. Validation of
/// nonsensical values (zero speed, negative wait) is the ingestion layer's
/// concern; the builder consumes these as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutingSettings {
    /// Minutes a passenger waits at a stop before boarding.
    pub bus_wait_time: f64,
    /// Vehicle speed in kilometers per hour.
    pub bus_velocity: f64,
}

impl RoutingSettings {
    /// Minutes needed to ride `meters` at the configured speed.
    pub fn ride_minutes(&self, meters: u32) -> f64 {
        const METERS_PER_KM: f64 = 1000.0;
        const MINUTES_PER_HOUR: f64 = 60.0;

        f64::from(meters) / METERS_PER_KM / self.bus_velocity * MINUTES_PER_HOUR
    }
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            bus_wait_time: 6.0,
            bus_velocity: 40.0,
        }
    }
}
