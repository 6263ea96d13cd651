//! Geodetic helpers: Haversine distance, local tangent-plane offsets, angle wrap
//!
//! The dispersion grid lives in scenario-local coordinates (x downwind,
//! y crosswind); contour vertices and receptor positions are WGS-84 decimal
//! degrees. The projection here is the small-offset equirectangular form:
//! one degree of latitude is 111 320 m and one degree of longitude is
//! `111 320 · cos φ` m, which is accurate to well under a metre over the few
//! tens of kilometres a hazard footprint spans.

use serde::{Deserialize, Serialize};

/// Mean Earth radius (m) used by the Haversine formula
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Metres per degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS-84 point with elevation above the ellipsoid (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees, north positive
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive
    pub longitude: f64,
    /// Elevation above mean sea level (m)
    pub elevation: f64,
}

impl GeoPoint {
    /// Create a point at the given coordinates with zero elevation
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, elevation: 0.0 }
    }
}

/// Great-circle distance (m) between two points by the Haversine formula.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Offset a geodetic origin by local east/north metres.
pub fn offset_geodetic(origin: &GeoPoint, east_m: f64, north_m: f64) -> GeoPoint {
    let lat = origin.latitude + north_m / METERS_PER_DEGREE;
    let lon = origin.longitude + east_m / (METERS_PER_DEGREE * origin.latitude.to_radians().cos());
    GeoPoint { latitude: lat, longitude: lon, elevation: origin.elevation }
}

/// Local east/north offset (m) of `point` relative to `origin`.
pub fn local_offset(origin: &GeoPoint, point: &GeoPoint) -> (f64, f64) {
    let north = (point.latitude - origin.latitude) * METERS_PER_DEGREE;
    let east = (point.longitude - origin.longitude)
        * METERS_PER_DEGREE
        * origin.latitude.to_radians().cos();
    (east, north)
}

/// Wrap an angle in degrees to `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Downwind azimuth in east-CCW convention for a meteorological wind direction.
///
/// Meteorological wind direction is the bearing the wind blows *from*
/// (0 = north, clockwise). The plume travels the opposite way; output angles
/// throughout the engine are measured from east, counter-clockwise positive.
pub fn downwind_azimuth_east_ccw(wind_from_deg: f64) -> f64 {
    // Bearing the plume travels toward, compass convention
    let toward_compass = wrap_degrees(wind_from_deg + 180.0);
    // Compass (N=0, CW) to math (E=0, CCW)
    wrap_degrees(90.0 - toward_compass)
}

/// Map plume-local coordinates (x downwind, y crosswind-left) to east/north
/// metres given the downwind azimuth in east-CCW degrees.
pub fn plume_to_east_north(x_downwind: f64, y_crosswind: f64, azimuth_east_ccw_deg: f64) -> (f64, f64) {
    let theta = azimuth_east_ccw_deg.to_radians();
    let east = x_downwind * theta.cos() - y_crosswind * theta.sin();
    let north = x_downwind * theta.sin() + y_crosswind * theta.cos();
    (east, north)
}

/// Map east/north metres to plume-local coordinates (inverse of
/// [`plume_to_east_north`]).
pub fn east_north_to_plume(east: f64, north: f64, azimuth_east_ccw_deg: f64) -> (f64, f64) {
    let theta = azimuth_east_ccw_deg.to_radians();
    let x = east * theta.cos() + north * theta.sin();
    let y = -east * theta.sin() + north * theta.cos();
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_haversine_identical_points_is_zero() {
        let p = GeoPoint::new(-31.95, 115.86);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_antipodes() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS;
        assert!(
            (haversine_distance(&a, &b) - expected).abs() < 1.0,
            "antipodal distance should be pi * R within 1 m"
        );
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let a = GeoPoint::new(45.0, 10.0);
        let b = GeoPoint::new(46.0, 10.0);
        // One degree of latitude is ~111.2 km on the mean sphere
        assert_relative_eq!(haversine_distance(&a, &b), 111_194.9, max_relative = 1e-3);
    }

    #[test]
    fn test_offset_round_trip() {
        let origin = GeoPoint::new(-32.1, 115.9);
        let moved = offset_geodetic(&origin, 1500.0, -750.0);
        let (east, north) = local_offset(&origin, &moved);
        assert_relative_eq!(east, 1500.0, max_relative = 1e-9);
        assert_relative_eq!(north, -750.0, max_relative = 1e-9);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn test_downwind_azimuth_westerly_wind() {
        // Wind from the west (270°) blows the plume east: azimuth 0 in east-CCW
        assert_relative_eq!(downwind_azimuth_east_ccw(270.0), 0.0);
        // Wind from the north (0°) blows the plume south: -90 -> 270 east-CCW
        assert_relative_eq!(downwind_azimuth_east_ccw(0.0), 270.0);
    }

    #[test]
    fn test_plume_rotation_round_trip() {
        let (east, north) = plume_to_east_north(800.0, -120.0, 37.0);
        let (x, y) = east_north_to_plume(east, north, 37.0);
        assert_relative_eq!(x, 800.0, max_relative = 1e-12);
        assert_relative_eq!(y, -120.0, max_relative = 1e-12);
    }
}
