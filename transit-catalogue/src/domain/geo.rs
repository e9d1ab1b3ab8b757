//! Geographic coordinates and great-circle distance.

/// Mean Earth radius in meters, as used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A geographic position as (latitude, longitude) in degrees.
///
/// # Examples
///
/// ```
/// use transit_catalogue::domain::Coordinates;
///
/// let origin = Coordinates::new(55.611087, 37.20829);
/// let other = Coordinates::new(55.595884, 37.209755);
///
/// // Roughly 1.7 km apart.
/// let meters = origin.distance_to(&other);
/// assert!((meters - 1692.99).abs() < 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair from degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns the great-circle distance to `other` in meters.
    ///
    /// Uses the haversine formula on a spherical Earth model. Identical
    /// coordinates yield exactly zero.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        if self == other {
            return 0.0;
        }

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinates::new(55.611087, 37.20829);
        assert_eq!(p.distance_to(&p), 0.0);
    }

    #[test]
    fn known_distance() {
        // Two stops a couple of kilometers apart.
        let a = Coordinates::new(55.611087, 37.20829);
        let b = Coordinates::new(55.595884, 37.209755);

        let meters = a.distance_to(&b);
        assert!((meters - 1692.99).abs() < 1.0, "got {meters}");
    }

    #[test]
    fn one_degree_of_latitude() {
        // One degree of latitude is ~111.2 km on a 6371 km sphere.
        let a = Coordinates::new(0.0, 0.0);
        let b = Coordinates::new(1.0, 0.0);

        let meters = a.distance_to(&b);
        assert!((meters - 111_194.9).abs() < 10.0, "got {meters}");
    }

    #[test]
    fn antimeridian_neighbors_are_close() {
        let a = Coordinates::new(0.0, 179.95);
        let b = Coordinates::new(0.0, -179.95);

        // 0.1 degrees of longitude at the equator, not most of the planet.
        let meters = a.distance_to(&b);
        assert!(meters < 12_000.0, "got {meters}");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate() -> impl Strategy<Value = Coordinates> {
        (-85.0..85.0f64, -180.0..180.0f64).prop_map(|(lat, lng)| Coordinates::new(lat, lng))
    }

    proptest! {
        /// Distance is symmetric.
        #[test]
        fn symmetric(a in coordinate(), b in coordinate()) {
            let fwd = a.distance_to(&b);
            let rev = b.distance_to(&a);
            prop_assert!((fwd - rev).abs() < 1e-6);
        }

        /// Distance is never negative and never exceeds half the Earth's girth.
        #[test]
        fn bounded(a in coordinate(), b in coordinate()) {
            let d = a.distance_to(&b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_M * std::f64::consts::PI + 1.0);
        }
    }
}
