//! Spherical coordinate helpers.
//!
//! The globe is a sphere of radius [`GLOBE_RADIUS`] centred on the origin with
//! +Y pointing at the north pole. Longitude 0 faces -X; longitude increases
//! towards -Z.

use glam::DVec3;

/// Radius of the rendered globe in scene units.
pub const GLOBE_RADIUS: f64 = 500.0;

/// Mean Earth radius in meters, used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Map a latitude/longitude pair in degrees onto the globe surface.
pub fn map_point(lat: f64, lon: f64) -> DVec3 {
    map_point_scaled(lat, lon, GLOBE_RADIUS)
}

/// Map a latitude/longitude pair in degrees onto a sphere of radius `scale`.
pub fn map_point_scaled(lat: f64, lon: f64, scale: f64) -> DVec3 {
    let phi = (90.0 - lat).to_radians();
    let theta = (180.0 - lon).to_radians();
    DVec3::new(
        scale * phi.sin() * theta.cos(),
        scale * phi.cos(),
        scale * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`map_point_scaled`]: recover `(lat, lon)` in degrees from a
/// point on (or off) the sphere. Longitude is normalized to `(-180, 180]`.
///
/// Longitude is meaningless at the poles; `0.0` is returned there.
pub fn unmap_point(point: DVec3) -> (f64, f64) {
    let r = point.length();
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let phi = (point.y / r).clamp(-1.0, 1.0).acos();
    let lat = 90.0 - phi.to_degrees();

    let horizontal = (point.x * point.x + point.z * point.z).sqrt();
    if horizontal < 1e-12 * r {
        return (lat, 0.0);
    }
    let theta = point.z.atan2(point.x).to_degrees();
    let mut lon = 180.0 - theta;
    if lon > 180.0 {
        lon -= 360.0;
    }
    (lat, lon)
}

/// Great-circle distance in meters between two lat/lon pairs (haversine).
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1r = lat1.to_radians();
    let lat2r = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1r.cos() * lat2r.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Position and radius of an annotation in the flat 180x360 collision space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionFootprint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Project a lat/lon onto the collision plane.
///
/// The radius grows towards the poles, where a degree of longitude covers
/// less of the screen and labels overlap sooner.
pub fn lat_lon_2d(lat: f64, lon: f64) -> CollisionFootprint {
    CollisionFootprint {
        x: lat + 90.0,
        y: lon + 180.0,
        radius: 2.0 + (lat.abs() / 90.0) * 15.0,
    }
}

/// Project a lat/lon onto an equirectangular pixel grid.
pub fn lat_lon_to_pixel(width: f64, height: f64, lat: f64, lon: f64) -> (i64, i64) {
    let x = (width / 2.0 + (width / 360.0) * lon).floor() as i64;
    let y = (height / 2.0 + (height / 180.0) * lat).floor() as i64;
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn test_north_pole_is_plus_y() {
        let p = map_point(90.0, 0.0);
        assert_close(p.x, 0.0, 1e-9);
        assert_close(p.y, GLOBE_RADIUS, 1e-9);
        assert_close(p.z, 0.0, 1e-9);
    }

    #[test]
    fn test_equator_prime_meridian_faces_negative_x() {
        let p = map_point(0.0, 0.0);
        assert_close(p.x, -GLOBE_RADIUS, 1e-9);
        assert_close(p.y, 0.0, 1e-9);
        assert_close(p.z, 0.0, 1e-9);
    }

    #[test]
    fn test_mapped_points_lie_on_sphere() {
        for &(lat, lon) in &[(12.5, -40.0), (-60.0, 170.0), (33.0, 0.5)] {
            assert_close(map_point(lat, lon).length(), GLOBE_RADIUS, 1e-9);
            assert_close(map_point_scaled(lat, lon, 2.0).length(), 2.0, 1e-12);
        }
    }

    #[test]
    fn test_unmap_recovers_lat_lon() {
        for lat in [-89.0, -45.0, -1.0, 0.0, 23.4, 60.0, 89.0] {
            for lon in [-179.0, -90.0, -12.3, 0.0, 45.0, 120.0, 180.0] {
                let (lat2, lon2) = unmap_point(map_point(lat, lon));
                assert_close(lat2, lat, 1e-9);
                assert_close(lon2, lon, 1e-9);
            }
        }
    }

    #[test]
    fn test_unmap_at_pole_reports_zero_longitude() {
        let (lat, lon) = unmap_point(map_point(-90.0, 77.0));
        assert_close(lat, -90.0, 1e-9);
        assert_eq!(lon, 0.0);
    }

    #[test]
    fn test_haversine_quarter_circumference() {
        let d = haversine_m(0.0, 0.0, 0.0, 90.0);
        assert_close(d, 10_007_543.4, 1.0);
    }

    #[test]
    fn test_haversine_is_symmetric_and_zero_on_identity() {
        assert_close(haversine_m(10.0, 20.0, 10.0, 20.0), 0.0, 1e-9);
        let a = haversine_m(51.5, -0.1, 40.7, -74.0);
        let b = haversine_m(40.7, -74.0, 51.5, -0.1);
        assert_close(a, b, 1e-6);
        assert!(a > 5_500_000.0 && a < 5_600_000.0, "london-nyc {a}");
    }

    #[test]
    fn test_footprint_radius_grows_towards_poles() {
        let eq = lat_lon_2d(0.0, 0.0);
        let pole = lat_lon_2d(-90.0, 0.0);
        assert_eq!(eq.x, 90.0);
        assert_eq!(eq.y, 180.0);
        assert_eq!(eq.radius, 2.0);
        assert_eq!(pole.radius, 17.0);
    }

    #[test]
    fn test_pixel_projection_centres_origin() {
        assert_eq!(lat_lon_to_pixel(360.0, 180.0, 0.0, 0.0), (180, 90));
        assert_eq!(lat_lon_to_pixel(360.0, 180.0, -90.0, -180.0), (0, 0));
    }
}
